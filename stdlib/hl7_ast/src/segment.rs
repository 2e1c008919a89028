//! Segments: a three character name followed by fields.
//!
//! Header segments (`MSH`, `FHS`, `BHS`) start with two delimiter-carrier
//! fields. Field 1 is the field delimiter itself and field 2 the four
//! encoding characters; both render from the shared encoding.

use std::rc::Rc;

use hl7_codec::{Hl7Error, Hl7Result, SharedEncoding};

use crate::element::Element;
use crate::field::{DelimiterKind, Field};
use crate::sequence::{ensure_position, place, Placement};
use crate::trim::{trim_trailing, TrimOptions};

/// Name of the message header segment.
pub const MESSAGE_HEADER: &str = "MSH";

/// Segments whose first two fields carry the delimiters.
pub const HEADER_SEGMENTS: [&str; 3] = ["MSH", "FHS", "BHS"];

/// Whether `name` is three ASCII alphanumerics starting with a letter.
pub fn is_valid_segment_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() == 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1..].iter().all(u8::is_ascii_alphanumeric)
}

/// Whether `name` is a header segment name.
pub fn is_header_name(name: &str) -> bool {
    HEADER_SEGMENTS.contains(&name)
}

/// A named, ordered sequence of fields.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Segment {
    name: String,
    sequence: usize,
    fields: Vec<Field>,
    #[cfg_attr(feature = "serde", serde(skip))]
    encoding: SharedEncoding,
}

impl Segment {
    /// Creates a segment with no fields (header segments get their two
    /// delimiter fields).
    pub fn new(name: &str, encoding: &SharedEncoding) -> Hl7Result<Self> {
        if !is_valid_segment_name(name) {
            return Err(Hl7Error::invalid_request(format!(
                "invalid segment name {name:?}"
            )));
        }
        let fields = if is_header_name(name) {
            vec![
                Field::delimiters(DelimiterKind::FieldSeparator, encoding),
                Field::delimiters(DelimiterKind::EncodingCharacters, encoding),
            ]
        } else {
            Vec::new()
        };
        Ok(Self {
            name: name.to_string(),
            sequence: 0,
            fields,
            encoding: Rc::clone(encoding),
        })
    }

    /// Parses one segment line.
    pub fn parse(line: &str, encoding: &SharedEncoding, sequence: usize) -> Hl7Result<Self> {
        if line.len() < 3 {
            return Err(Hl7Error::SegmentTooShort(line.to_string()));
        }
        let name = line
            .get(..3)
            .filter(|name| is_valid_segment_name(name))
            .ok_or_else(|| Hl7Error::bad_message(format!("invalid segment name in {line:?}")))?;
        let mut segment = Self::new(name, encoding)?;
        segment.sequence = sequence;
        segment.split(&line[3..])?;
        log::trace!(
            "parsed segment {} #{} with {} fields",
            segment.name,
            sequence,
            segment.fields.len()
        );
        Ok(segment)
    }

    fn split(&mut self, rest: &str) -> Hl7Result<()> {
        let header = self.is_header();
        if header {
            self.fields.truncate(2);
        } else {
            self.fields.clear();
        }
        if rest.is_empty() {
            return if header {
                Err(Hl7Error::SegmentTooShort(self.name.clone()))
            } else {
                Ok(())
            };
        }
        let delimiter = self.encoding.borrow().field;
        let body = rest.strip_prefix(delimiter).ok_or_else(|| {
            Hl7Error::bad_message(format!(
                "segment {} does not continue with the field delimiter {:?}",
                self.name, delimiter
            ))
        })?;
        let mut parts = body.split(delimiter);
        if header {
            // the encoding characters are carried by the synthetic field 2
            parts.next();
        }
        let encoding = Rc::clone(&self.encoding);
        self.fields
            .extend(parts.map(|part| Field::parse(part, &encoding)));
        Ok(())
    }

    /// The three character segment name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of this segment among all segments of its message.
    pub fn sequence(&self) -> usize {
        self.sequence
    }

    /// Sets the position of this segment among all segments of its message.
    pub fn set_sequence(&mut self, sequence: usize) {
        self.sequence = sequence;
    }

    /// Whether this is a header segment with delimiter-carrier fields.
    pub fn is_header(&self) -> bool {
        is_header_name(&self.name)
    }

    /// All fields in order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// The field at 1-based `position`, if it exists.
    pub fn field(&self, position: usize) -> Option<&Field> {
        position
            .checked_sub(1)
            .and_then(|index| self.fields.get(index))
    }

    /// Mutable access to the field at 1-based `position`.
    pub fn field_mut(&mut self, position: usize) -> Option<&mut Field> {
        position
            .checked_sub(1)
            .and_then(|index| self.fields.get_mut(index))
    }

    /// Returns repetition `repetition` of the field at `position`, creating
    /// the field, any gap before it and the repetition as needed.
    ///
    /// Repetition 0 collapses a repeating field to its first repetition and
    /// returns the whole field.
    pub fn ensure_field(&mut self, position: usize, repetition: usize) -> Hl7Result<&mut Field> {
        let encoding = Rc::clone(&self.encoding);
        let field = ensure_position(&mut self.fields, position, "field", || Field::new(&encoding))?;
        if repetition == 0 {
            field.strip_repetitions();
            return Ok(field);
        }
        field.ensure_repetition(repetition)
    }

    /// Inserts `field` according to `placement`.
    pub fn add_new_field(&mut self, mut field: Field, placement: Placement) -> Hl7Result<()> {
        if field.is_delimiters() {
            return Err(Hl7Error::invalid_request(
                "delimiter fields are created with the header segment",
            ));
        }
        if let Placement::At(position) = placement {
            self.check_not_delimiter(position)?;
        }
        field.rebind(&self.encoding);
        let encoding = Rc::clone(&self.encoding);
        place(&mut self.fields, field, placement, "field", || {
            Field::new(&encoding)
        })
    }

    /// Exchanges the fields at 1-based positions `a` and `b`.
    pub fn swap_fields(&mut self, a: usize, b: usize) -> Hl7Result<()> {
        let count = self.fields.len();
        for position in [a, b] {
            if position < 1 || position > count {
                return Err(Hl7Error::invalid_request(format!(
                    "field {position} is out of range for segment {} with {count} fields",
                    self.name
                )));
            }
            self.check_not_delimiter(position)?;
        }
        self.fields.swap(a - 1, b - 1);
        Ok(())
    }

    /// Drops trailing empty fields, components and subcomponents as enabled
    /// in `options`. A header segment keeps its delimiter fields.
    pub fn remove_trailing(&mut self, options: TrimOptions) {
        for field in self.fields.iter_mut() {
            field.remove_trailing(options);
        }
        if options.fields {
            let keep = if self.is_header() { 2 } else { 1 };
            trim_trailing(&mut self.fields, keep);
        }
    }

    fn check_not_delimiter(&self, position: usize) -> Hl7Result<()> {
        if self.field(position).is_some_and(Field::is_delimiters) {
            return Err(Hl7Error::invalid_request(format!(
                "{}.{position} carries delimiters and cannot be replaced",
                self.name
            )));
        }
        Ok(())
    }
}

impl Element for Segment {
    fn encoding(&self) -> &SharedEncoding {
        &self.encoding
    }

    fn value(&self) -> String {
        self.serialize()
    }

    /// Re-parses the segment from a full segment line, which must start
    /// with this segment's name.
    fn set_value(&mut self, value: Option<&str>) -> Hl7Result<()> {
        let line = value.ok_or_else(|| Hl7Error::invalid_request("a segment cannot be null"))?;
        let rest = line.strip_prefix(self.name.as_str()).ok_or_else(|| {
            Hl7Error::invalid_request(format!(
                "segment value must start with {}, got {line:?}",
                self.name
            ))
        })?;
        let mut replacement = self.clone();
        replacement.split(rest)?;
        *self = replacement;
        Ok(())
    }

    fn serialize(&self) -> String {
        let delimiter = self.encoding.borrow().field.to_string();
        let mut out = self.name.clone();
        // header field 1 is the separator just emitted, not a joined field
        let skip = usize::from(self.is_header());
        if self.fields.len() > skip {
            out.push_str(&delimiter);
            let rendered: Vec<String> = self.fields[skip..].iter().map(Element::serialize).collect();
            out.push_str(&rendered.join(&delimiter));
        }
        out
    }

    fn rebind(&mut self, encoding: &SharedEncoding) {
        self.encoding = Rc::clone(encoding);
        for field in self.fields.iter_mut() {
            field.rebind(encoding);
        }
    }
}
