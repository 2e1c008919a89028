//! Delimiter configuration for a single HL7 message.
//!
//! An [`Encoding`] holds the five single-character delimiters, the segment
//! delimiter and the HL7-null sentinel. A parsed message hands the *same*
//! [`SharedEncoding`] to every node in its tree, so changing a delimiter
//! after parsing changes how the whole tree renders while leaving stored
//! values alone.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::error::{Hl7Error, Hl7Result};

/// Default field delimiter.
pub const DEFAULT_FIELD_DELIMITER: char = '|';
/// Default component delimiter.
pub const DEFAULT_COMPONENT_DELIMITER: char = '^';
/// Default repetition delimiter.
pub const DEFAULT_REPETITION_DELIMITER: char = '~';
/// Default escape character.
pub const DEFAULT_ESCAPE_CHARACTER: char = '\\';
/// Default subcomponent delimiter.
pub const DEFAULT_SUBCOMPONENT_DELIMITER: char = '&';
/// Default segment delimiter.
pub const DEFAULT_SEGMENT_DELIMITER: &str = "\r";
/// The HL7-null sentinel: a value that is present but explicitly null.
pub const DEFAULT_NULL_VALUE: &str = "\"\"";

/// Known segment delimiters. Two-character sequences come first so that a
/// `\r` followed by `\n` is never mistaken for a bare `\r`.
pub const SEGMENT_DELIMITERS: [&str; 4] = ["\r\n", "\n\r", "\r", "\n"];

/// Reference-counted handle to the encoding shared by a whole tree.
pub type SharedEncoding = Rc<RefCell<Encoding>>;

/// Wraps an encoding in a fresh shared handle.
pub fn shared(encoding: Encoding) -> SharedEncoding {
    Rc::new(RefCell::new(encoding))
}

/// The delimiter set of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    /// Separates fields within a segment.
    pub field: char,
    /// Separates components within a field.
    pub component: char,
    /// Separates repetitions of a field.
    pub repetition: char,
    /// Introduces and terminates escape sequences.
    pub escape: char,
    /// Separates subcomponents within a component.
    pub subcomponent: char,
    /// Separates segments.
    pub segment_delimiter: String,
    /// Sentinel for a present-but-null value.
    pub null_value: String,
}

impl Default for Encoding {
    fn default() -> Self {
        Self {
            field: DEFAULT_FIELD_DELIMITER,
            component: DEFAULT_COMPONENT_DELIMITER,
            repetition: DEFAULT_REPETITION_DELIMITER,
            escape: DEFAULT_ESCAPE_CHARACTER,
            subcomponent: DEFAULT_SUBCOMPONENT_DELIMITER,
            segment_delimiter: DEFAULT_SEGMENT_DELIMITER.to_string(),
            null_value: DEFAULT_NULL_VALUE.to_string(),
        }
    }
}

impl Encoding {
    /// Creates an encoding from the five delimiter characters, in wire order
    /// (field, component, repetition, escape, subcomponent).
    pub fn new(
        field: char,
        component: char,
        repetition: char,
        escape: char,
        subcomponent: char,
    ) -> Hl7Result<Self> {
        let delimiters: String = [field, component, repetition, escape, subcomponent]
            .iter()
            .collect();
        let mut encoding = Self::default();
        encoding.evaluate_delimiters(&delimiters)?;
        Ok(encoding)
    }

    /// The four encoding characters as they appear in MSH-2.
    pub fn encoding_characters(&self) -> String {
        [self.component, self.repetition, self.escape, self.subcomponent]
            .iter()
            .collect()
    }

    /// All five delimiters, field delimiter first.
    pub fn delimiters(&self) -> String {
        let mut out = String::with_capacity(5);
        out.push(self.field);
        out.push_str(&self.encoding_characters());
        out
    }

    /// Assigns the five delimiters positionally from `delimiters`
    /// (field, component, repetition, escape, subcomponent).
    pub fn evaluate_delimiters(&mut self, delimiters: &str) -> Hl7Result<()> {
        let chars: Vec<char> = delimiters.chars().collect();
        if chars.len() != 5 {
            return Err(Hl7Error::bad_message(format!(
                "expected five delimiter characters, found {:?}",
                delimiters
            )));
        }
        check_delimiters(&chars)?;
        self.field = chars[0];
        self.component = chars[1];
        self.repetition = chars[2];
        self.escape = chars[3];
        self.subcomponent = chars[4];
        Ok(())
    }

    /// Replaces the field delimiter, keeping the set distinct.
    pub fn set_field_delimiter(&mut self, field: char) -> Hl7Result<()> {
        let mut chars: Vec<char> = self.delimiters().chars().collect();
        chars[0] = field;
        check_delimiters(&chars)?;
        self.field = field;
        Ok(())
    }

    /// Replaces the four encoding characters (MSH-2), keeping the set
    /// distinct.
    pub fn set_encoding_characters(&mut self, characters: &str) -> Hl7Result<()> {
        let mut all = String::with_capacity(5);
        all.push(self.field);
        all.push_str(characters);
        self.evaluate_delimiters(&all)
    }

    /// Detects the segment delimiter used by `message` and stores it.
    pub fn evaluate_segment_delimiter(&mut self, message: &str) -> Hl7Result<()> {
        let delimiter = detect_segment_delimiter(message).ok_or_else(|| {
            Hl7Error::bad_message("no segment delimiter found in message")
        })?;
        #[cfg(feature = "logging")]
        log::debug!("detected segment delimiter {:?}", delimiter);
        self.segment_delimiter = delimiter.to_string();
        Ok(())
    }

    /// Checks that the delimiters are still distinct and the segment
    /// delimiter is a known one. The fields are public, so a caller can break
    /// either after parsing.
    pub fn check(&self) -> Hl7Result<()> {
        let chars: Vec<char> = self.delimiters().chars().collect();
        check_delimiters(&chars)?;
        if !SEGMENT_DELIMITERS.contains(&self.segment_delimiter.as_str()) {
            return Err(Hl7Error::bad_message(format!(
                "unknown segment delimiter {:?}",
                self.segment_delimiter
            )));
        }
        Ok(())
    }

    /// Whether `value` is the HL7-null sentinel.
    pub fn is_null(&self, value: &str) -> bool {
        value == self.null_value
    }
}

/// Finds the first occurring known segment delimiter in `message`.
pub fn detect_segment_delimiter(message: &str) -> Option<&'static str> {
    let start = message.find(['\r', '\n'])?;
    let tail = &message[start..];
    SEGMENT_DELIMITERS
        .iter()
        .copied()
        .find(|candidate| tail.starts_with(candidate))
}

fn check_delimiters(chars: &[char]) -> Hl7Result<()> {
    if let Some(c) = chars
        .iter()
        .find(|c| **c == '\r' || **c == '\n' || c.is_alphanumeric())
    {
        return Err(Hl7Error::bad_message(format!(
            "{:?} cannot be used as a delimiter",
            c
        )));
    }
    let unique: HashSet<&char> = chars.iter().collect();
    if unique.len() != chars.len() {
        return Err(Hl7Error::bad_message(format!(
            "delimiters must be distinct: {:?}",
            chars.iter().collect::<String>()
        )));
    }
    Ok(())
}
