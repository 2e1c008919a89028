//! HL7 v2.x messaging for the Medi standard library.
//!
//! Re-exports the codec, tree and message crates under one name:
//!
//! ```
//! use medi_hl7::prelude::*;
//!
//! let raw = "MSH|^~\\&|LAB|HOSP|EMR|HOSP|20230101||ORU^R01|42|P|2.5\rOBX|1|NM|GLU||95\r";
//! let message = Message::parse_str(raw).unwrap();
//! assert_eq!(message.get("OBX.5").unwrap().as_deref(), Some("95"));
//!
//! let ack = message.get_ack().unwrap().unwrap();
//! assert_eq!(ack.get("MSA.2").unwrap().as_deref(), Some("42"));
//! assert!(ack.get_ack().unwrap().is_none());
//! ```

pub use hl7_ast as ast;
pub use hl7_codec as codec;
pub use hl7_parser as parser;

pub use hl7_ast::{
    Component, DelimiterKind, Element, Field, FieldContent, Placement, Segment, SubComponent,
    TrimOptions,
};
pub use hl7_codec::{
    shared, Encoding, ErrorKind, Hl7Error, Hl7Result, SharedEncoding,
};
pub use hl7_parser::{
    frame, unframe, AckCode, Hl7Path, Message, MessageHeader, ParseOptions, ParseState,
};

/// The types most callers need.
pub mod prelude {
    pub use crate::{
        AckCode, Element, Encoding, Hl7Error, Hl7Path, Hl7Result, Message, ParseOptions,
        Placement, TrimOptions,
    };
}
