use medi_hl7::prelude::*;
use pretty_assertions::assert_eq;
use tests::{ADT_A01, MINIMAL, ORU_R01};

#[test]
fn null_empty_and_absent_are_distinct() {
    let message = Message::parse_str(ADT_A01).unwrap();
    // PID-18 is the null sentinel
    assert_eq!(message.get("PID.18").unwrap(), None);
    assert!(message.segment("PID").unwrap().field(18).unwrap().is_null());
    // PID-2 is present and empty
    assert_eq!(message.get("PID.2").unwrap(), Some(String::new()));
    // PID-30 does not exist
    assert!(matches!(
        message.get("PID.30"),
        Err(Hl7Error::InvalidRequest(_))
    ));
    assert!(!message.exists("PID.30").unwrap());
}

#[test]
fn reads_are_decoded_and_stored_values_are_not() {
    let message = Message::parse_str(ADT_A01).unwrap();
    assert_eq!(message.get("PID.13").unwrap().as_deref(), Some("555|0100"));
    let raw = message.segment("PID").unwrap().field(13).unwrap().value();
    assert_eq!(raw, "555\\F\\0100");

    let oru = Message::parse_str(ORU_R01).unwrap();
    let note = oru
        .get_path(&Hl7Path::parse("OBX.5").unwrap().in_segment(1))
        .unwrap();
    assert_eq!(note.as_deref(), Some("fasting<BR>sample <B>ok</B>"));
}

#[test]
fn repetitions_put_get_and_remove() {
    let mut message = Message::parse_str(MINIMAL).unwrap();
    message.put("ZZ1.1(1)", Some("A")).unwrap();
    message.put("ZZ1.1(2)", Some("B")).unwrap();
    assert_eq!(message.get("ZZ1.1(1)").unwrap().as_deref(), Some("A"));
    assert_eq!(message.get("ZZ1.1(2)").unwrap().as_deref(), Some("B"));

    let field = message.segment_mut("ZZ1").unwrap().field_mut(1).unwrap();
    field.remove_repetition(1).unwrap();
    assert_eq!(field.repetition_count(), 1);
    assert!(!field.has_repetitions());
    assert_eq!(message.get("ZZ1.1").unwrap().as_deref(), Some("B"));
    assert!(message.serialize().unwrap().ends_with("ZZ1|B\r"));
}

#[test]
fn put_builds_structure_that_set_then_accepts() {
    let mut message = Message::parse_str(MINIMAL).unwrap();
    assert!(message.set("PV1.3.1", Some("WARD")).is_err());
    message.put("PV1.3.1", Some("WARD")).unwrap();
    message.set("PV1.3.1", Some("ICU")).unwrap();
    message.put("PV1.3.3", Some("B")).unwrap();
    assert_eq!(message.get("PV1.3").unwrap().as_deref(), Some("ICU^^B"));
    assert!(message.exists("PV1.3.2").unwrap());
    assert!(!message.exists("PV1.3.4").unwrap());
}

#[test]
fn pre_encoded_values_keep_delimiters_literal() {
    let mut message = Message::parse_str(MINIMAL).unwrap();
    let text = "a|b^c~d&e\\f";
    let encoded = message.encoding().borrow().encode(text);
    message.put("NTE.3", Some(&encoded)).unwrap();
    assert_eq!(message.get("NTE.3").unwrap().as_deref(), Some(text));
    let reparsed = Message::parse_str(&message.serialize().unwrap()).unwrap();
    assert_eq!(reparsed.get("NTE.3").unwrap().as_deref(), Some(text));
}

#[test]
fn segment_collection_management() {
    let mut message = Message::parse_str(ADT_A01).unwrap();
    assert_eq!(message.segments("NK1").len(), 2);
    let removed = message.remove_segment("NK1", 1).unwrap();
    assert_eq!(removed.field(2).unwrap().value(), "Doe^Baby");
    assert_eq!(message.segment_count(), 5);
    assert!(message.remove_segment("NK1", 1).is_err());

    message.add_new_segment("NK1").unwrap();
    let names: Vec<&str> = message.ordered_segments().iter().map(|s| s.name()).collect();
    assert_eq!(names, ["MSH", "EVN", "PID", "NK1", "PV1", "NK1"]);
}
