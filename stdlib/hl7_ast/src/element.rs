//! The behaviour shared by every node of an HL7 tree.

use hl7_codec::{Hl7Result, SharedEncoding};

/// A node of the message tree.
///
/// Every node carries the shared [`SharedEncoding`] of its tree, exposes its
/// raw wire value, and can re-split its children from a new value. A value is
/// in one of three states: absent (the node does not exist at all), HL7-null
/// (the raw value is the encoding's null sentinel) or present, which includes
/// the empty string.
pub trait Element {
    /// The encoding handle this node renders with.
    fn encoding(&self) -> &SharedEncoding;

    /// The raw wire value of this node.
    fn value(&self) -> String;

    /// Replaces the value and re-splits children from it. `None` stores the
    /// null sentinel.
    fn set_value(&mut self, value: Option<&str>) -> Hl7Result<()>;

    /// Renders this node and its children to wire text.
    fn serialize(&self) -> String;

    /// Points this node and all of its children at `encoding`.
    fn rebind(&mut self, encoding: &SharedEncoding);

    /// Whether the raw value is the HL7-null sentinel.
    fn is_null(&self) -> bool {
        let value = self.value();
        self.encoding().borrow().is_null(&value)
    }

    /// Whether the raw value is present but has zero length.
    fn is_empty(&self) -> bool {
        self.value().is_empty()
    }

    /// The caller-plain value: escape tokens decoded, `None` for HL7-null.
    fn decoded(&self) -> Option<String> {
        let value = self.value();
        let encoding = self.encoding().borrow();
        if encoding.is_null(&value) {
            None
        } else {
            Some(encoding.decode(&value))
        }
    }
}

/// Resolves the raw text stored for an optional value.
pub(crate) fn raw_or_null(value: Option<&str>, encoding: &SharedEncoding) -> String {
    match value {
        Some(v) => v.to_string(),
        None => encoding.borrow().null_value.clone(),
    }
}
