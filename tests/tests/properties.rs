use medi_hl7::prelude::*;
use proptest::prelude::*;
use tests::MINIMAL;

proptest! {
    #[test]
    fn decode_inverts_encode_for_delimiter_heavy_text(s in "[|^~\\\\&\r\na-c]{0,24}") {
        let encoding = Encoding::default();
        prop_assert_eq!(encoding.decode(&encoding.encode(&s)), s);
    }

    #[test]
    fn values_survive_a_delimiter_change(s in "[a-z^&]{1,12}") {
        let mut message = Message::parse_str(MINIMAL).unwrap();
        message.put("ZZ1.2", Some(&s)).unwrap();
        let before = message.get("ZZ1.2").unwrap();
        message.encoding().borrow_mut().field = '#';
        prop_assert_eq!(message.get("ZZ1.2").unwrap(), before);
        let text = message.serialize().unwrap();
        let expected_tail = format!("ZZ1##{}\r", s);
        prop_assert!(text.ends_with(&expected_tail));
    }
}
