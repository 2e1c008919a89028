use medi_hl7::prelude::*;
use medi_hl7::ParseState;
use pretty_assertions::assert_eq;
use tests::{ADT_A01, MINIMAL, ORU_R01};

#[test]
fn fixtures_reserialize_unchanged() {
    for raw in [MINIMAL, ADT_A01, ORU_R01] {
        let message = Message::parse_str(raw).unwrap();
        assert_eq!(message.state(), ParseState::Parsed);
        assert_eq!(message.serialize().unwrap(), raw);
    }
}

#[test]
fn line_feed_messages_normalize_on_their_own_delimiter() {
    let raw = ADT_A01.replace('\r', "\n");
    let message = Message::parse_str(&format!("{raw}\n\n")).unwrap();
    assert_eq!(message.serialize().unwrap(), raw);
}

#[test]
fn header_metadata() {
    let adt = Message::parse_str(ADT_A01).unwrap();
    assert_eq!(adt.message_type(), Some("ADT^A01^ADT_A01"));
    assert_eq!(adt.message_structure(), Some("ADT_A01"));
    assert_eq!(adt.control_id(), Some("MSG00001"));
    assert_eq!(adt.version(), Some("2.5"));

    let oru = Message::parse_str(ORU_R01).unwrap();
    assert_eq!(oru.message_structure(), Some("ORU_R01"));
    assert_eq!(oru.version(), Some("2.5.1"));
}

#[test]
fn framing_wraps_the_serialized_text() {
    let message = Message::parse_str(ORU_R01).unwrap();
    let framed = message.to_frame().unwrap();
    assert_eq!(framed[0], 0x0B);
    assert_eq!(medi_hl7::unframe(&framed).unwrap(), ORU_R01);
}

#[test]
fn lossy_parse_is_caught_by_the_serialize_check() {
    // a bare escape character cannot be reproduced
    let raw = format!("{MINIMAL}ZZ1|C:\\temp\r");
    let err = Message::parse_str(&raw).unwrap_err();
    assert!(matches!(err, Hl7Error::ParsingError(_)));

    let mut lenient = Message::new(raw.as_str());
    lenient
        .parse_with(ParseOptions {
            validate: true,
            serialize_check: false,
        })
        .unwrap();
    assert_eq!(lenient.get("ZZ1.1").unwrap().as_deref(), Some("C:\\temp"));
}

#[test]
fn error_kinds_are_distinct() {
    use medi_hl7::ErrorKind;

    let cases = [
        ("", ErrorKind::BadMessage),
        ("MSH|^~\\&|A|B|C|D|E|||1|P|2.5\r", ErrorKind::UnsupportedMessageType),
        ("MSH|^~\\&|A|B|C|D|E||ADT^A01||P|2.5\r", ErrorKind::RequiredFieldMissing),
    ];
    for (raw, kind) in cases {
        assert_eq!(Message::parse_str(raw).unwrap_err().kind(), kind, "{raw:?}");
    }
}
