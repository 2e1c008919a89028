//! Tree model for HL7 v2.x messages.
//!
//! A segment holds fields, a field holds components or repetitions, a
//! component holds subcomponents. Every node shares the [`SharedEncoding`]
//! of its tree and implements [`Element`].
//!
//! ```
//! use hl7_ast::{Element, Segment};
//! use hl7_codec::{shared, Encoding};
//!
//! let enc = shared(Encoding::default());
//! let pid = Segment::parse("PID|1||123^^^H~456||Doe^Jane", &enc, 1).unwrap();
//! assert_eq!(pid.field(3).unwrap().repetition_count(), 2);
//! assert_eq!(pid.field(5).unwrap().component(2).unwrap().value(), "Jane");
//! ```

pub mod component;
pub mod element;
pub mod field;
pub mod segment;
pub mod sequence;
pub mod subcomponent;
pub mod trim;

// Re-export commonly used types
pub use component::Component;
pub use element::Element;
pub use field::{DelimiterKind, Field, FieldContent};
pub use hl7_codec::SharedEncoding;
pub use segment::{
    is_header_name, is_valid_segment_name, Segment, HEADER_SEGMENTS, MESSAGE_HEADER,
};
pub use sequence::{ensure_position, Placement};
pub use subcomponent::SubComponent;
pub use trim::TrimOptions;

/// Serializes a tree node to a pretty-printed JSON string.
///
/// The shared encoding is not part of the output.
#[cfg(feature = "serde")]
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}
