use medi_hl7::prelude::*;
use pretty_assertions::assert_eq;
use tests::{ADT_A01, ORU_R01};

#[test]
fn ack_mirrors_routing() {
    let original = Message::parse_str(ADT_A01).unwrap();
    let ack = original.get_ack().unwrap().expect("ack for a non-ack");
    for (ack_path, original_path) in [
        ("MSH.3", "MSH.5"),
        ("MSH.4", "MSH.6"),
        ("MSH.5", "MSH.3"),
        ("MSH.6", "MSH.4"),
        ("MSA.2", "MSH.10"),
        ("MSH.10", "MSH.10"),
        ("MSH.12", "MSH.12"),
    ] {
        assert_eq!(
            ack.get(ack_path).unwrap(),
            original.get(original_path).unwrap(),
            "{ack_path}"
        );
    }
    assert_eq!(ack.get("MSA.1").unwrap().as_deref(), Some("AA"));
    assert_eq!(ack.message_structure(), Some("ACK"));
    assert!(ack.get_ack().unwrap().is_none());
}

#[test]
fn nack_reports_the_error() {
    let original = Message::parse_str(ORU_R01).unwrap();
    let nack = original
        .get_nack(AckCode::CommitReject, "OBX-5 out of range")
        .unwrap()
        .unwrap();
    assert_eq!(nack.get("MSA.1").unwrap().as_deref(), Some("CR"));
    assert_eq!(nack.get("MSA.2").unwrap().as_deref(), Some("LAB777"));
    assert_eq!(
        nack.get("MSA.3").unwrap().as_deref(),
        Some("OBX-5 out of range")
    );
    let framed = nack.to_frame().unwrap();
    let text = medi_hl7::unframe(&framed).unwrap();
    assert_eq!(Message::parse_str(&text).unwrap().control_id(), Some("LAB777"));
}
