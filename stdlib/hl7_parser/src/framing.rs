//! Block framing for byte-stream transport.
//!
//! A framed message is `0x0B`, the message bytes, then `0x1C 0x0D`.

use hl7_codec::{Hl7Error, Hl7Result};

use crate::message::Message;

/// Start-of-block byte.
pub const START_BLOCK: u8 = 0x0B;
/// End-of-block byte.
pub const END_BLOCK: u8 = 0x1C;
/// Carriage return closing a frame.
pub const CARRIAGE_RETURN: u8 = 0x0D;

/// Wraps `message` in start and end markers.
pub fn frame(message: &str) -> Vec<u8> {
    let mut framed = Vec::with_capacity(message.len() + 3);
    framed.push(START_BLOCK);
    framed.extend_from_slice(message.as_bytes());
    framed.extend_from_slice(&[END_BLOCK, CARRIAGE_RETURN]);
    framed
}

/// Strips the markers from one framed message.
pub fn unframe(buffer: &[u8]) -> Hl7Result<String> {
    let body = buffer
        .strip_prefix(&[START_BLOCK])
        .ok_or_else(|| Hl7Error::bad_message("frame does not start with 0x0B"))?;
    let body = body
        .strip_suffix(&[END_BLOCK, CARRIAGE_RETURN])
        .ok_or_else(|| Hl7Error::bad_message("frame does not end with 0x1C 0x0D"))?;
    String::from_utf8(body.to_vec())
        .map_err(|err| Hl7Error::bad_message(format!("framed message is not UTF-8: {err}")))
}

impl Message {
    /// Serializes and frames the message.
    pub fn to_frame(&self) -> Hl7Result<Vec<u8>> {
        Ok(frame(&self.serialize()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn frame_and_unframe() {
        let framed = frame("MSH|^~\\&\r");
        assert_eq!(framed.first(), Some(&0x0B));
        assert_eq!(&framed[framed.len() - 2..], &[END_BLOCK, CARRIAGE_RETURN]);
        assert_eq!(unframe(&framed).unwrap(), "MSH|^~\\&\r");
    }

    #[test]
    fn missing_markers_are_bad_message() {
        for buffer in [&b"MSH|\x1c\r"[..], &b"\x0bMSH|"[..], &b"\x0bMSH|\x1c"[..], &[][..]] {
            assert!(matches!(unframe(buffer), Err(Hl7Error::BadMessage(_))));
        }
        assert!(matches!(
            unframe(&[START_BLOCK, 0xFF, END_BLOCK, CARRIAGE_RETURN]),
            Err(Hl7Error::BadMessage(_))
        ));
    }

    #[test]
    fn message_to_frame() {
        let raw = "MSH|^~\\&|A|B|C|D|20230101||ADT^A01|1|P|2.5\r";
        let message = Message::parse_str(raw).unwrap();
        assert_eq!(unframe(&message.to_frame().unwrap()).unwrap(), raw);
    }
}
