//! The message: an encoding, its segments and the parse state machine.
//!
//! A [`Message`] starts out [`ParseState::Unparsed`] holding raw text.
//! [`Message::parse`] validates the text, builds the segment tree and
//! re-serializes it to check that nothing was lost. Only a parsed message
//! accepts reads and edits.

use std::collections::BTreeMap;
use std::str::FromStr;

use hl7_ast::{Element, Segment, TrimOptions, MESSAGE_HEADER};
use hl7_codec::{shared, Encoding, Hl7Error, Hl7Result, SharedEncoding};
use log::{debug, trace, warn};

use crate::validate::{
    extract_header, join_lines, message_structure, segment_delimiter_or_default, split_lines,
    validate, MessageHeader,
};

/// Where a message is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ParseState {
    /// Raw text only.
    Unparsed,
    /// Text passed validation; no tree yet.
    Validated,
    /// The segment tree is built and usable.
    Parsed,
}

/// Switches for [`Message::parse_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Run structural validation before building the tree.
    pub validate: bool,
    /// Re-serialize the built tree and compare it with the input.
    pub serialize_check: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            validate: true,
            serialize_check: true,
        }
    }
}

/// An HL7 v2.x message.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Message {
    #[cfg_attr(feature = "serde", serde(skip))]
    raw: String,
    #[cfg_attr(feature = "serde", serde(skip))]
    encoding: SharedEncoding,
    header: MessageHeader,
    state: ParseState,
    segments: BTreeMap<String, Vec<Segment>>,
    #[cfg_attr(feature = "serde", serde(skip))]
    next_sequence: usize,
}

impl Message {
    /// Wraps raw message text without parsing it.
    pub fn new<S: Into<String>>(raw: S) -> Self {
        Self {
            raw: raw.into(),
            encoding: shared(Encoding::default()),
            header: MessageHeader::default(),
            state: ParseState::Unparsed,
            segments: BTreeMap::new(),
            next_sequence: 0,
        }
    }

    /// Creates a parsed message with no segments, for building from scratch.
    pub fn empty() -> Self {
        Self::with_encoding(Encoding::default())
    }

    /// Creates a parsed message with no segments and the given delimiters.
    pub fn with_encoding(encoding: Encoding) -> Self {
        let mut message = Self::new(String::new());
        message.encoding = shared(encoding);
        message.state = ParseState::Parsed;
        message
    }

    /// Wraps and parses `raw` with the default options.
    pub fn parse_str(raw: &str) -> Hl7Result<Self> {
        let mut message = Self::new(raw);
        message.parse()?;
        Ok(message)
    }

    /// Parses with validation and the serialize check enabled.
    pub fn parse(&mut self) -> Hl7Result<()> {
        self.parse_with(ParseOptions::default())
    }

    /// Runs the enabled stages: validate, build the tree, check it.
    ///
    /// On failure the message is left unparsed and its tree is discarded.
    pub fn parse_with(&mut self, options: ParseOptions) -> Hl7Result<()> {
        debug!(
            "parsing message ({} bytes, validate={}, serialize_check={})",
            self.raw.len(),
            options.validate,
            options.serialize_check
        );
        let result = self.run_stages(options);
        if let Err(err) = &result {
            warn!("message rejected: {err}");
            self.segments.clear();
            self.next_sequence = 0;
            self.state = ParseState::Unparsed;
        }
        result
    }

    fn run_stages(&mut self, options: ParseOptions) -> Hl7Result<()> {
        if options.validate {
            self.validate()?;
        } else {
            self.prepare_unvalidated()?;
        }
        self.build_tree()?;
        if options.serialize_check {
            self.serialize_check()?;
        }
        Ok(())
    }

    /// Validates the raw text, settling encoding and header metadata.
    pub fn validate(&mut self) -> Hl7Result<()> {
        let validation = validate(&self.raw)?;
        *self.encoding.borrow_mut() = validation.encoding;
        self.raw = validation.normalized;
        self.header = validation.header;
        self.state = ParseState::Validated;
        debug!("message validated: {:?}", self.header.message_structure);
        Ok(())
    }

    /// Settles the encoding without structural checks.
    fn prepare_unvalidated(&mut self) -> Hl7Result<()> {
        let mut encoding = Encoding {
            segment_delimiter: segment_delimiter_or_default(&self.raw),
            ..Encoding::default()
        };
        if self.raw.starts_with(MESSAGE_HEADER) {
            let delimiters: String = self.raw.chars().skip(3).take(5).collect();
            encoding.evaluate_delimiters(&delimiters)?;
        }
        let lines = split_lines(&self.raw, &encoding.segment_delimiter);
        let header = lines
            .first()
            .filter(|line| line.starts_with(MESSAGE_HEADER))
            .and_then(|line| extract_header(line, &encoding).ok())
            .unwrap_or_default();
        self.raw = join_lines(&lines, &encoding.segment_delimiter);
        self.header = header;
        *self.encoding.borrow_mut() = encoding;
        Ok(())
    }

    fn build_tree(&mut self) -> Hl7Result<()> {
        self.segments.clear();
        self.next_sequence = 0;
        let delimiter = self.encoding.borrow().segment_delimiter.clone();
        let raw = self.raw.clone();
        for line in split_lines(&raw, &delimiter) {
            let sequence = self.next_sequence;
            let segment = Segment::parse(line, &self.encoding, sequence).map_err(|err| match err {
                Hl7Error::SegmentTooShort(_) => err,
                other => Hl7Error::parsing(format!("segment #{sequence}: {other}")),
            })?;
            self.next_sequence += 1;
            self.segments
                .entry(segment.name().to_string())
                .or_default()
                .push(segment);
        }
        self.state = ParseState::Parsed;
        debug!("built tree with {} segments", self.segment_count());
        Ok(())
    }

    /// Re-renders the tree and compares it, segment by segment, with the
    /// normalized input.
    fn serialize_check(&self) -> Hl7Result<()> {
        let rendered = self.render()?;
        let delimiter = self.encoding.borrow().segment_delimiter.clone();
        let expected = significant_lines(&self.raw, &delimiter);
        let found = significant_lines(&rendered, &delimiter);
        if let Some(index) = (0..expected.len().max(found.len()))
            .find(|&index| expected.get(index) != found.get(index))
        {
            return Err(Hl7Error::parsing(format!(
                "segment #{index} re-serialized as {:?}, expected {:?}",
                found.get(index).copied().unwrap_or_default(),
                expected.get(index).copied().unwrap_or_default()
            )));
        }
        trace!("serialize check passed");
        Ok(())
    }

    /// Renders the message to wire text.
    pub fn serialize(&self) -> Hl7Result<String> {
        self.ensure_parsed()?;
        self.render()
    }

    /// Renders the message, optionally re-validating the result. A passing
    /// validation refreshes the header metadata.
    pub fn serialize_with(&mut self, validate: bool) -> Hl7Result<String> {
        let rendered = self.serialize()?;
        if validate {
            self.refresh_header(&rendered)?;
        }
        Ok(rendered)
    }

    pub(crate) fn refresh_header(&mut self, rendered: &str) -> Hl7Result<()> {
        let validation = validate(rendered)?;
        self.header = validation.header;
        Ok(())
    }

    fn render(&self) -> Hl7Result<String> {
        self.encoding
            .borrow()
            .check()
            .map_err(|err| Hl7Error::HeaderSerialization(err.to_string()))?;
        let ordered = self.ordered_segments();
        match ordered.first() {
            Some(first) if first.name() == MESSAGE_HEADER => {}
            Some(first) => {
                return Err(Hl7Error::HeaderSerialization(format!(
                    "first segment is {}, not {MESSAGE_HEADER}",
                    first.name()
                )))
            }
            None => {
                return Err(Hl7Error::HeaderSerialization(
                    "message has no segments".to_string(),
                ))
            }
        }
        let delimiter = self.encoding.borrow().segment_delimiter.clone();
        let mut out = String::new();
        for (index, segment) in ordered.iter().enumerate() {
            if index > 0 && segment.name() == MESSAGE_HEADER {
                return Err(Hl7Error::Serialization {
                    segment: MESSAGE_HEADER.to_string(),
                    reason: format!("second message header at position {index}"),
                });
            }
            out.push_str(&segment.serialize());
            out.push_str(&delimiter);
        }
        Ok(out)
    }

    pub(crate) fn ensure_parsed(&self) -> Hl7Result<()> {
        if self.state != ParseState::Parsed {
            return Err(Hl7Error::invalid_request(format!(
                "message is {:?}; parse it first",
                self.state
            )));
        }
        Ok(())
    }

    /// Appends a new, empty segment named `name` with the next sequence
    /// number.
    pub fn add_new_segment(&mut self, name: &str) -> Hl7Result<&mut Segment> {
        let segment = Segment::new(name, &self.encoding)?;
        self.add_segment(segment)
    }

    /// Appends `segment`, rebinding it to this message's encoding.
    pub fn add_segment(&mut self, mut segment: Segment) -> Hl7Result<&mut Segment> {
        self.ensure_parsed()?;
        segment.rebind(&self.encoding);
        segment.set_sequence(self.next_sequence);
        self.next_sequence += 1;
        trace!("added segment {} #{}", segment.name(), segment.sequence());
        let group = self.segments.entry(segment.name().to_string()).or_default();
        let index = group.len();
        group.push(segment);
        Ok(&mut group[index])
    }

    /// Removes and returns the `index`-th (0-based) segment named `name`.
    pub fn remove_segment(&mut self, name: &str, index: usize) -> Hl7Result<Segment> {
        self.ensure_parsed()?;
        let group = self
            .segments
            .get_mut(name)
            .ok_or_else(|| Hl7Error::invalid_request(format!("no {name} segment")))?;
        if index >= group.len() {
            return Err(Hl7Error::invalid_request(format!(
                "{name} segment index {index} is out of range ({} present)",
                group.len()
            )));
        }
        let removed = group.remove(index);
        if group.is_empty() {
            self.segments.remove(name);
        }
        Ok(removed)
    }

    /// All segments named `name`, in insertion order.
    pub fn segments(&self, name: &str) -> &[Segment] {
        self.segments
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Mutable access to all segments named `name`.
    pub fn segments_mut(&mut self, name: &str) -> &mut [Segment] {
        self.segments
            .get_mut(name)
            .map(Vec::as_mut_slice)
            .unwrap_or_default()
    }

    /// The first segment named `name`.
    pub fn segment(&self, name: &str) -> Option<&Segment> {
        self.segments(name).first()
    }

    /// Mutable access to the first segment named `name`.
    pub fn segment_mut(&mut self, name: &str) -> Option<&mut Segment> {
        self.segments_mut(name).first_mut()
    }

    /// Every segment, ordered by sequence number.
    pub fn ordered_segments(&self) -> Vec<&Segment> {
        let mut all: Vec<&Segment> = self.segments.values().flatten().collect();
        all.sort_by_key(|segment| segment.sequence());
        all
    }

    /// Number of segments in the tree.
    pub fn segment_count(&self) -> usize {
        self.segments.values().map(Vec::len).sum()
    }

    /// Drops trailing empty elements in every segment.
    pub fn remove_trailing_delimiters(&mut self, options: TrimOptions) {
        for segment in self.segments.values_mut().flatten() {
            segment.remove_trailing(options);
        }
    }

    /// The encoding handle shared by every node of this message.
    pub fn encoding(&self) -> &SharedEncoding {
        &self.encoding
    }

    /// The stored raw text (normalized once validated).
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Lifecycle state.
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Header metadata as of the last validation.
    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    /// MSH-12.
    pub fn version(&self) -> Option<&str> {
        self.header.version.as_deref()
    }

    /// MSH-9 as it appeared on the wire.
    pub fn message_type(&self) -> Option<&str> {
        self.header.message_type.as_deref()
    }

    /// Message structure derived from MSH-9.
    pub fn message_structure(&self) -> Option<&str> {
        self.header.message_structure.as_deref()
    }

    /// MSH-10.
    pub fn control_id(&self) -> Option<&str> {
        self.header.control_id.as_deref()
    }

    /// MSH-11.
    pub fn processing_id(&self) -> Option<&str> {
        self.header.processing_id.as_deref()
    }

    /// Whether the structure of the current MSH-9 is `ACK`.
    pub fn is_ack(&self) -> bool {
        self.segment(MESSAGE_HEADER)
            .and_then(|msh| msh.field(9))
            .map(|field| field.serialize())
            .and_then(|message_type| {
                message_structure(&message_type, &self.encoding.borrow()).ok()
            })
            .is_some_and(|structure| structure == "ACK")
    }

    /// Pretty-printed JSON dump of the header and segment tree.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        hl7_ast::to_json(self)
    }
}

impl Clone for Message {
    /// Deep copy with its own encoding; edits to the copy's delimiters do
    /// not leak into the original.
    fn clone(&self) -> Self {
        let encoding = shared(self.encoding.borrow().clone());
        let mut segments = self.segments.clone();
        for segment in segments.values_mut().flatten() {
            segment.rebind(&encoding);
        }
        Self {
            raw: self.raw.clone(),
            encoding,
            header: self.header.clone(),
            state: self.state,
            segments,
            next_sequence: self.next_sequence,
        }
    }
}

impl FromStr for Message {
    type Err = Hl7Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

/// Lines of `text` with only leading and trailing blank entries removed.
fn significant_lines<'a>(text: &'a str, delimiter: &str) -> Vec<&'a str> {
    let lines: Vec<&str> = text.split(delimiter).collect();
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
    lines[start..end].to_vec()
}
