use hl7_codec::{Encoding, Hl7Error};
use proptest::prelude::*;

fn wire_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            '|', '^', '~', '\\', '&', '\r', '\n', 'a', 'Z', 'X', '0', 'F', '.', ' ', 'é',
        ]),
        0..64,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn decode_inverts_encode(text in wire_text()) {
        let enc = Encoding::default();
        prop_assert_eq!(enc.decode(&enc.encode(&text)), text);
    }

    #[test]
    fn encoded_text_has_no_bare_delimiters(text in wire_text()) {
        let enc = Encoding::default();
        let encoded = enc.encode(&text);
        for c in ['|', '^', '~', '&', '\r', '\n'] {
            prop_assert!(!encoded.contains(c));
        }
    }

    #[test]
    fn decode_accepts_arbitrary_input(text in ".{0,48}") {
        // must not panic whatever the input
        let _ = Encoding::default().decode(&text);
    }

    #[test]
    fn preserving_encode_is_stable_on_encoded_text(text in wire_text()) {
        let enc = Encoding::default();
        let encoded = enc.encode(&text);
        prop_assert_eq!(enc.encode_preserving(&encoded), encoded);
    }
}

#[test]
fn symmetry_holds_for_custom_sets() {
    let enc = Encoding::new('#', '$', '*', '!', '@').unwrap();
    let text = "#$*!@\r\n|^~\\&";
    assert_eq!(enc.decode(&enc.encode(text)), text);
}

#[test]
fn delimiter_detection_error_is_typed() {
    let mut enc = Encoding::default();
    assert!(matches!(
        enc.evaluate_segment_delimiter("no breaks here"),
        Err(Hl7Error::BadMessage(_))
    ));
}
