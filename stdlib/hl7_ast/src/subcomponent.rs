use std::rc::Rc;

use hl7_codec::{Hl7Result, SharedEncoding};

use crate::element::{raw_or_null, Element};

/// The leaf of the tree: a single raw value.
///
/// The raw value is kept in wire form. It is escaped on serialization and
/// only decoded when read through [`Element::decoded`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SubComponent {
    value: String,
    #[cfg_attr(feature = "serde", serde(skip))]
    encoding: SharedEncoding,
}

impl SubComponent {
    /// Creates a subcomponent holding `value`.
    pub fn new(value: &str, encoding: &SharedEncoding) -> Self {
        Self {
            value: value.to_string(),
            encoding: Rc::clone(encoding),
        }
    }

    /// Creates an empty subcomponent.
    pub fn empty(encoding: &SharedEncoding) -> Self {
        Self::new("", encoding)
    }

    /// Creates a subcomponent holding the HL7-null sentinel.
    pub fn null(encoding: &SharedEncoding) -> Self {
        let value = raw_or_null(None, encoding);
        Self::new(&value, encoding)
    }

    /// The stored raw value.
    pub fn raw(&self) -> &str {
        &self.value
    }
}

impl Element for SubComponent {
    fn encoding(&self) -> &SharedEncoding {
        &self.encoding
    }

    fn value(&self) -> String {
        self.value.clone()
    }

    fn set_value(&mut self, value: Option<&str>) -> Hl7Result<()> {
        self.value = raw_or_null(value, &self.encoding);
        Ok(())
    }

    fn serialize(&self) -> String {
        self.encoding.borrow().encode_preserving(&self.value)
    }

    fn rebind(&mut self, encoding: &SharedEncoding) {
        self.encoding = Rc::clone(encoding);
    }
}
