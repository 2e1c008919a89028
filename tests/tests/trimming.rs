use medi_hl7::prelude::*;
use pretty_assertions::assert_eq;
use tests::MINIMAL;

#[test]
fn trailing_components_and_fields_are_dropped() {
    let raw = format!("{MINIMAL}ZZ1|A^B^^|^^||\r");
    let mut message = Message::parse_str(&raw).unwrap();
    message.remove_trailing_delimiters(TrimOptions::default());
    assert!(message.serialize().unwrap().ends_with("ZZ1|A^B\r"));

    let field = message.segment("ZZ1").unwrap().field(1).unwrap();
    assert_eq!(field.value(), "A^B");
}

#[test]
fn all_empty_field_collapses_to_one_component() {
    let raw = format!("{MINIMAL}ZZ1|^^|X\r");
    let mut message = Message::parse_str(&raw).unwrap();
    message.remove_trailing_delimiters(TrimOptions {
        subcomponents: true,
        components: true,
        fields: false,
    });
    let field = message.segment("ZZ1").unwrap().field(1).unwrap();
    assert_eq!(field.value(), "");
    assert!(!field.is_componentized());
    assert!(message.serialize().unwrap().ends_with("ZZ1||X\r"));
}

#[test]
fn header_keeps_its_delimiter_fields() {
    let mut message = Message::empty();
    message.add_new_segment("MSH").unwrap();
    message.remove_trailing_delimiters(TrimOptions::default());
    assert_eq!(message.serialize().unwrap(), "MSH|^~\\&\r");
}
