//! HL7 v2.x message parsing.
//!
//! [`Message`] validates raw text, builds the segment tree from
//! [`hl7_ast`], re-serializes it, and addresses values by path:
//!
//! ```
//! use hl7_parser::Message;
//!
//! let mut message = Message::parse_str(
//!     "MSH|^~\\&|A|B|C|D|20230101||ADT^A01|1|P|2.5\rPID|1||123^^^H\r",
//! ).unwrap();
//! assert_eq!(message.get("PID.3.1").unwrap().as_deref(), Some("123"));
//! message.put("PID.5.2", Some("Jane")).unwrap();
//! assert!(message.serialize().unwrap().contains("PID|1||123^^^H||^Jane\r"));
//! ```

pub mod access;
pub mod ack;
pub mod framing;
pub mod message;
pub mod path;
pub mod validate;

// Re-export commonly used types
pub use ack::{AckCode, ACK_TIMESTAMP_FORMAT};
pub use framing::{frame, unframe};
pub use message::{Message, ParseOptions, ParseState};
pub use path::Hl7Path;
pub use validate::{MessageHeader, MINIMUM_HEADER_DELIMITERS, MINIMUM_MESSAGE_LENGTH};
