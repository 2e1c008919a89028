//! Acknowledgement synthesis.

use std::fmt;
use std::str::FromStr;

use chrono::Local;
use hl7_ast::{Element, Segment, MESSAGE_HEADER};
use hl7_codec::{Hl7Error, Hl7Result};
use log::debug;

use crate::message::Message;

/// Timestamp layout used for MSH-7 of a generated acknowledgement.
pub const ACK_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// MSA-1 acknowledgement codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AckCode {
    /// `AA`: application accept.
    ApplicationAccept,
    /// `AE`: application error.
    ApplicationError,
    /// `AR`: application reject.
    ApplicationReject,
    /// `CA`: commit accept.
    CommitAccept,
    /// `CE`: commit error.
    CommitError,
    /// `CR`: commit reject.
    CommitReject,
}

impl AckCode {
    /// The two-letter wire code.
    pub fn as_str(&self) -> &'static str {
        match self {
            AckCode::ApplicationAccept => "AA",
            AckCode::ApplicationError => "AE",
            AckCode::ApplicationReject => "AR",
            AckCode::CommitAccept => "CA",
            AckCode::CommitError => "CE",
            AckCode::CommitReject => "CR",
        }
    }

    /// Whether this code reports success.
    pub fn is_accept(&self) -> bool {
        matches!(self, AckCode::ApplicationAccept | AckCode::CommitAccept)
    }
}

impl fmt::Display for AckCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AckCode {
    type Err = Hl7Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AA" => Ok(AckCode::ApplicationAccept),
            "AE" => Ok(AckCode::ApplicationError),
            "AR" => Ok(AckCode::ApplicationReject),
            "CA" => Ok(AckCode::CommitAccept),
            "CE" => Ok(AckCode::CommitError),
            "CR" => Ok(AckCode::CommitReject),
            other => Err(Hl7Error::invalid_request(format!(
                "unknown acknowledgement code {other:?}"
            ))),
        }
    }
}

impl Message {
    /// Builds an `AA` acknowledgement. Returns `None` for a message that is
    /// itself an acknowledgement.
    pub fn get_ack(&self) -> Hl7Result<Option<Message>> {
        self.build_ack(AckCode::ApplicationAccept, None)
    }

    /// Builds an acknowledgement with `code` and `error_text` in MSA-3.
    /// Returns `None` for a message that is itself an acknowledgement.
    pub fn get_nack(&self, code: AckCode, error_text: &str) -> Hl7Result<Option<Message>> {
        self.build_ack(code, Some(error_text))
    }

    fn build_ack(&self, code: AckCode, error_text: Option<&str>) -> Hl7Result<Option<Message>> {
        self.ensure_parsed()?;
        if self.is_ack() {
            debug!("not acknowledging an acknowledgement");
            return Ok(None);
        }
        let original = self
            .segment(MESSAGE_HEADER)
            .ok_or_else(|| Hl7Error::bad_message("message has no MSH segment"))?;
        let wire = |position: usize| {
            original
                .field(position)
                .map(Element::serialize)
                .unwrap_or_default()
        };
        let control_id = wire(10);

        let mut ack = Message::with_encoding(self.encoding().borrow().clone());
        let timestamp = Local::now().format(ACK_TIMESTAMP_FORMAT).to_string();
        let header = ack.add_new_segment(MESSAGE_HEADER)?;
        for (position, value) in [
            (3, wire(5)),
            (4, wire(6)),
            (5, wire(3)),
            (6, wire(4)),
            (7, timestamp),
            (9, "ACK".to_string()),
            (10, control_id.clone()),
            (11, wire(11)),
            (12, wire(12)),
        ] {
            set_field(header, position, &value)?;
        }

        let msa = ack.add_new_segment("MSA")?;
        set_field(msa, 1, code.as_str())?;
        set_field(msa, 2, &control_id)?;
        if let Some(text) = error_text {
            let escaped = self.encoding().borrow().encode(text);
            set_field(msa, 3, &escaped)?;
        }

        let rendered = ack.serialize()?;
        ack.refresh_header(&rendered)?;
        debug!("built {code} acknowledgement for control id {control_id:?}");
        Ok(Some(ack))
    }
}

fn set_field(segment: &mut Segment, position: usize, raw: &str) -> Hl7Result<()> {
    segment.ensure_field(position, 1)?;
    let name = segment.name().to_string();
    segment
        .field_mut(position)
        .ok_or_else(|| Hl7Error::invalid_request(format!("{name}.{position} could not be created")))?
        .set_value(Some(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ADT: &str = "MSH|^~\\&|SEND^S&X|SFAC|RECV|RFAC|20230101||ADT^A01|X42|P|2.5\r\
                       PID|1||123\r";

    #[test]
    fn ack_swaps_routing_and_echoes_control_id() {
        let original = Message::parse_str(ADT).unwrap();
        let ack = original.get_ack().unwrap().unwrap();
        assert_eq!(ack.get("MSH.3").unwrap().as_deref(), Some("RECV"));
        assert_eq!(ack.get("MSH.4").unwrap().as_deref(), Some("RFAC"));
        assert_eq!(ack.get("MSH.5").unwrap().as_deref(), Some("SEND^S&X"));
        assert_eq!(ack.get("MSH.5.2.2").unwrap().as_deref(), Some("X"));
        assert_eq!(ack.get("MSH.6").unwrap().as_deref(), Some("SFAC"));
        assert_eq!(ack.get("MSH.9").unwrap().as_deref(), Some("ACK"));
        assert_eq!(ack.get("MSH.10").unwrap().as_deref(), Some("X42"));
        assert_eq!(ack.get("MSH.11").unwrap().as_deref(), Some("P"));
        assert_eq!(ack.get("MSA.1").unwrap().as_deref(), Some("AA"));
        assert_eq!(ack.get("MSA.2").unwrap().as_deref(), Some("X42"));
        assert!(!ack.exists("MSA.3").unwrap());
        assert_eq!(ack.get("MSH.7").unwrap().map(|t| t.len()), Some(14));
        assert!(ack.is_ack());
        assert_eq!(ack.message_structure(), Some("ACK"));
        assert_eq!(ack.version(), Some("2.5"));
    }

    #[test]
    fn ack_of_ack_is_none() {
        let original = Message::parse_str(ADT).unwrap();
        let ack = original.get_ack().unwrap().unwrap();
        assert!(ack.get_ack().unwrap().is_none());
        assert!(ack
            .get_nack(AckCode::ApplicationError, "x")
            .unwrap()
            .is_none());
    }

    #[test]
    fn ack_suppression_follows_message_structure() {
        let triggered = Message::parse_str(
            "MSH|^~\\&|A|B|C|D|20230101||ACK^A01|X1|P|2.5\rMSA|AA|X0\r",
        )
        .unwrap();
        assert_eq!(triggered.message_structure(), Some("ACK_A01"));
        assert!(!triggered.is_ack());
        assert!(triggered.get_ack().unwrap().is_some());

        let declared = Message::parse_str(
            "MSH|^~\\&|A|B|C|D|20230101||ADT^A01^ACK|X2|P|2.5\rMSA|AA|X0\r",
        )
        .unwrap();
        assert_eq!(declared.message_structure(), Some("ACK"));
        assert!(declared.is_ack());
        assert!(declared.get_ack().unwrap().is_none());
        assert!(declared
            .get_nack(AckCode::ApplicationError, "x")
            .unwrap()
            .is_none());
    }

    #[test]
    fn nack_carries_escaped_error_text() {
        let original = Message::parse_str(ADT).unwrap();
        let nack = original
            .get_nack(AckCode::ApplicationReject, "bad PID|3 ^ value")
            .unwrap()
            .unwrap();
        assert_eq!(nack.get("MSA.1").unwrap().as_deref(), Some("AR"));
        assert_eq!(
            nack.get("MSA.3").unwrap().as_deref(),
            Some("bad PID|3 ^ value")
        );
        let text = nack.serialize().unwrap();
        assert!(text.contains("MSA|AR|X42|bad PID\\F\\3 \\S\\ value\r"));
        // the reply parses on its own
        Message::parse_str(&text).unwrap();
    }

    #[test]
    fn codes_round_trip_through_text() {
        for code in [
            AckCode::ApplicationAccept,
            AckCode::ApplicationError,
            AckCode::ApplicationReject,
            AckCode::CommitAccept,
            AckCode::CommitError,
            AckCode::CommitReject,
        ] {
            assert_eq!(code.to_string().parse::<AckCode>().unwrap(), code);
        }
        assert!("ZZ".parse::<AckCode>().is_err());
        assert!(AckCode::CommitAccept.is_accept());
        assert!(!AckCode::ApplicationError.is_accept());
    }
}
