//! Error taxonomy shared by every HL7 crate in the workspace.

/// The result type used throughout the HL7 crates.
pub type Hl7Result<T> = Result<T, Hl7Error>;

/// An error raised while parsing, addressing or rendering an HL7 message.
///
/// Every failure is local and synchronous. Escape decoding is the only
/// operation that never produces one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Hl7Error {
    /// Structural failure: too short, missing header, inconsistent segment
    /// framing or no segment delimiter.
    #[error("bad message: {0}")]
    BadMessage(String),

    /// The message type field (MSH-9) is missing or cannot be interpreted.
    #[error("unsupported message type: {0}")]
    UnsupportedMessageType(String),

    /// The control id (MSH-10) or processing id (MSH-11) is missing.
    #[error("required field missing: {0}")]
    RequiredFieldMissing(String),

    /// A segment line is shorter than its three character name.
    #[error("segment too short: {0:?}")]
    SegmentTooShort(String),

    /// The freshly built tree did not re-serialize to its input, or tree
    /// construction failed unexpectedly.
    #[error("parsing error: {0}")]
    ParsingError(String),

    /// Rendering failed on the header segment.
    #[error("could not serialize header segment: {0}")]
    HeaderSerialization(String),

    /// Rendering failed on a non-header segment.
    #[error("could not serialize segment {segment}: {reason}")]
    Serialization {
        /// Name of the failing segment.
        segment: String,
        /// What went wrong.
        reason: String,
    },

    /// A malformed path or an out-of-range 1-based index.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// The fieldless kind of an [`Hl7Error`], for callers that only branch on
/// the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Hl7Error::BadMessage`].
    BadMessage,
    /// See [`Hl7Error::UnsupportedMessageType`].
    UnsupportedMessageType,
    /// See [`Hl7Error::RequiredFieldMissing`].
    RequiredFieldMissing,
    /// See [`Hl7Error::SegmentTooShort`].
    SegmentTooShort,
    /// See [`Hl7Error::ParsingError`].
    ParsingError,
    /// Either serialization variant.
    SerializationError,
    /// See [`Hl7Error::InvalidRequest`].
    InvalidRequest,
}

impl Hl7Error {
    /// Creates a [`Hl7Error::BadMessage`].
    pub fn bad_message<S: Into<String>>(msg: S) -> Self {
        Hl7Error::BadMessage(msg.into())
    }

    /// Creates a [`Hl7Error::InvalidRequest`].
    pub fn invalid_request<S: Into<String>>(msg: S) -> Self {
        Hl7Error::InvalidRequest(msg.into())
    }

    /// Creates a [`Hl7Error::ParsingError`].
    pub fn parsing<S: Into<String>>(msg: S) -> Self {
        Hl7Error::ParsingError(msg.into())
    }

    /// Returns the taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Hl7Error::BadMessage(_) => ErrorKind::BadMessage,
            Hl7Error::UnsupportedMessageType(_) => ErrorKind::UnsupportedMessageType,
            Hl7Error::RequiredFieldMissing(_) => ErrorKind::RequiredFieldMissing,
            Hl7Error::SegmentTooShort(_) => ErrorKind::SegmentTooShort,
            Hl7Error::ParsingError(_) => ErrorKind::ParsingError,
            Hl7Error::HeaderSerialization(_) | Hl7Error::Serialization { .. } => {
                ErrorKind::SerializationError
            }
            Hl7Error::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    /// Whether this error was raised while rendering the header segment.
    pub fn is_header_failure(&self) -> bool {
        matches!(self, Hl7Error::HeaderSerialization(_))
    }
}
