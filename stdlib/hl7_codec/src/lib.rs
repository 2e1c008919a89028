//! HL7 v2.x delimiter configuration and escape codec
//!
//! This crate holds the pieces every other HL7 crate builds on: the
//! [`Encoding`] delimiter set, the escape encoder/decoder and the
//! [`Hl7Error`] taxonomy.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod encoding;
pub mod error;
pub mod escape;

// Re-export the main types for convenience
pub use encoding::{detect_segment_delimiter, shared, Encoding, SharedEncoding};
pub use error::{ErrorKind, Hl7Error, Hl7Result};
