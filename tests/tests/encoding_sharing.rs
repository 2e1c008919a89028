use medi_hl7::prelude::*;
use pretty_assertions::assert_eq;
use tests::ADT_A01;

#[test]
fn changing_a_delimiter_rerenders_every_segment() {
    let message = Message::parse_str(ADT_A01).unwrap();
    let before: Vec<Option<String>> = ["PID.5.2", "NK1.2.1", "PV1.3.2"]
        .iter()
        .map(|p| message.get(p).unwrap())
        .collect();

    message.encoding().borrow_mut().field = '#';
    let text = message.serialize().unwrap();
    for line in text.split('\r').filter(|l| !l.is_empty()) {
        assert_eq!(line.chars().nth(3), Some('#'), "{line}");
        assert!(!line.contains('|'), "{line}");
    }

    let after: Vec<Option<String>> = ["PID.5.2", "NK1.2.1", "PV1.3.2"]
        .iter()
        .map(|p| message.get(p).unwrap())
        .collect();
    assert_eq!(before, after);
}

#[test]
fn header_write_changes_the_shared_encoding() {
    let mut message = Message::parse_str(ADT_A01).unwrap();
    message.set("MSH.2", Some("$*!@")).unwrap();
    assert_eq!(message.encoding().borrow().component, '$');
    let text = message.serialize().unwrap();
    assert!(text.starts_with("MSH|$*!@|SENDAPP"));
    assert!(text.contains("|Doe$Jane$Q$$Dr|"));
    // stored raw text is not rewritten
    assert!(text.contains("|555\\F\\0100|"));
}

#[test]
fn segments_added_later_share_the_encoding() {
    let mut message = Message::parse_str(ADT_A01).unwrap();
    message.put("ZZ1.1.2", Some("x")).unwrap();
    message.encoding().borrow_mut().component = '$';
    assert!(message.serialize().unwrap().contains("ZZ1|$x\r"));
}
