//! Structural validation of raw message text.
//!
//! Validation runs on text, before any tree exists. It settles the encoding,
//! normalizes the segment delimiter and extracts the header metadata.

use hl7_ast::{is_valid_segment_name, MESSAGE_HEADER};
use hl7_codec::{detect_segment_delimiter, Encoding, Hl7Error, Hl7Result};

/// Shortest text that can hold `MSH` and the five delimiters.
pub const MINIMUM_MESSAGE_LENGTH: usize = 8;

/// Field delimiters the header line must contain (up to MSH-12).
pub const MINIMUM_HEADER_DELIMITERS: usize = 11;

/// Routing and version metadata read from MSH.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MessageHeader {
    /// MSH-12, first component.
    pub version: Option<String>,
    /// MSH-9 as it appears on the wire.
    pub message_type: Option<String>,
    /// `TYPE_TRIGGER`, the explicit structure component, or `ACK`.
    pub message_structure: Option<String>,
    /// MSH-10.
    pub control_id: Option<String>,
    /// MSH-11.
    pub processing_id: Option<String>,
}

/// Result of a successful validation.
#[derive(Debug, Clone)]
pub struct Validation {
    /// Message text with every segment followed by the segment delimiter.
    pub normalized: String,
    /// Encoding read from the header.
    pub encoding: Encoding,
    /// Header metadata.
    pub header: MessageHeader,
}

/// Validates `message` and returns its normalized form.
pub fn validate(message: &str) -> Hl7Result<Validation> {
    if message.trim().is_empty() {
        return Err(Hl7Error::bad_message("message is empty"));
    }
    if message.len() < MINIMUM_MESSAGE_LENGTH {
        return Err(Hl7Error::bad_message(format!(
            "message is shorter than {MINIMUM_MESSAGE_LENGTH} characters"
        )));
    }
    if !message.starts_with(MESSAGE_HEADER) {
        return Err(Hl7Error::bad_message(format!(
            "message must start with {MESSAGE_HEADER}"
        )));
    }

    let mut encoding = Encoding::default();
    encoding.evaluate_segment_delimiter(message)?;
    let delimiters: String = message.chars().skip(3).take(5).collect();
    encoding.evaluate_delimiters(&delimiters)?;

    let lines = split_lines(message, &encoding.segment_delimiter);
    let header_line = lines
        .first()
        .copied()
        .ok_or_else(|| Hl7Error::bad_message("message has no segments"))?;
    check_encoding_characters(header_line, &encoding)?;
    for line in &lines {
        check_segment_line(line, encoding.field)?;
    }
    let delimiter_count = header_line.matches(encoding.field).count();
    if delimiter_count < MINIMUM_HEADER_DELIMITERS {
        return Err(Hl7Error::bad_message(format!(
            "{MESSAGE_HEADER} has {delimiter_count} field delimiters, expected at least {MINIMUM_HEADER_DELIMITERS}"
        )));
    }

    let header = extract_header(header_line, &encoding)?;
    let normalized = join_lines(&lines, &encoding.segment_delimiter);
    Ok(Validation {
        normalized,
        encoding,
        header,
    })
}

/// Splits `text` on `delimiter`, dropping stray CR/LF and blank lines.
pub fn split_lines<'a>(text: &'a str, delimiter: &str) -> Vec<&'a str> {
    text.split(delimiter)
        .map(|line| line.trim_matches(|c: char| c == '\r' || c == '\n'))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Joins `lines`, following each with `delimiter`.
pub fn join_lines(lines: &[&str], delimiter: &str) -> String {
    let capacity = lines.iter().map(|l| l.len() + delimiter.len()).sum();
    let mut out = String::with_capacity(capacity);
    for line in lines {
        out.push_str(line);
        out.push_str(delimiter);
    }
    out
}

/// Reads header metadata from the MSH line, failing on a missing message
/// type, control id or processing id.
pub fn extract_header(header_line: &str, encoding: &Encoding) -> Hl7Result<MessageHeader> {
    let parts: Vec<&str> = header_line.split(encoding.field).collect();
    // parts[0] is the name, so MSH-n sits at parts[n - 1]
    let msh = |position: usize| parts.get(position - 1).copied().unwrap_or_default();

    let message_type = msh(9);
    let message_structure = message_structure(message_type, encoding)?;
    let control_id = required(msh(10), "MSH-10 (message control id)")?;
    let processing_id = required(msh(11), "MSH-11 (processing id)")?;
    let version = msh(12)
        .split(encoding.component)
        .next()
        .filter(|version| !version.is_empty())
        .map(|version| encoding.decode(version));

    Ok(MessageHeader {
        version,
        message_type: Some(message_type.to_string()),
        message_structure: Some(message_structure),
        control_id: Some(encoding.decode(&control_id)),
        processing_id: Some(encoding.decode(&processing_id)),
    })
}

pub(crate) fn message_structure(message_type: &str, encoding: &Encoding) -> Hl7Result<String> {
    let components: Vec<&str> = message_type.split(encoding.component).collect();
    let code = components.first().copied().unwrap_or_default();
    if code.is_empty() {
        return Err(Hl7Error::UnsupportedMessageType(
            "MSH-9 (message type) is empty".to_string(),
        ));
    }
    let component = |index: usize| components.get(index).copied().filter(|c| !c.is_empty());
    match (component(1), component(2)) {
        (_, Some(structure)) => Ok(structure.to_string()),
        (Some(trigger), None) => Ok(format!("{code}_{trigger}")),
        (None, None) if code == "ACK" => Ok(code.to_string()),
        (None, None) => Err(Hl7Error::UnsupportedMessageType(format!(
            "MSH-9 {message_type:?} has no trigger event"
        ))),
    }
}

fn required(value: &str, what: &str) -> Hl7Result<String> {
    if value.is_empty() {
        return Err(Hl7Error::RequiredFieldMissing(what.to_string()));
    }
    Ok(value.to_string())
}

/// MSH-2 holds exactly four characters: the fifth character after the name
/// must end the field or the line.
fn check_encoding_characters(header_line: &str, encoding: &Encoding) -> Hl7Result<()> {
    match header_line.chars().nth(8) {
        None => Ok(()),
        Some(c) if c == encoding.field => Ok(()),
        Some(c) => Err(Hl7Error::bad_message(format!(
            "MSH-2 must hold four encoding characters, found extra {c:?}"
        ))),
    }
}

fn check_segment_line(line: &str, field_delimiter: char) -> Hl7Result<()> {
    let name = line.get(..3).unwrap_or(line);
    if !is_valid_segment_name(name) {
        return Err(Hl7Error::bad_message(format!(
            "invalid segment name in {line:?}"
        )));
    }
    match line.chars().nth(3) {
        None => Ok(()),
        Some(c) if c == field_delimiter => Ok(()),
        Some(c) => Err(Hl7Error::bad_message(format!(
            "segment {name} continues with {c:?} instead of the field delimiter {field_delimiter:?}"
        ))),
    }
}

/// Finds the segment delimiter, falling back to the default when the text
/// holds a single unterminated segment.
pub fn segment_delimiter_or_default(message: &str) -> String {
    detect_segment_delimiter(message)
        .map(str::to_string)
        .unwrap_or_else(|| Encoding::default().segment_delimiter)
}
