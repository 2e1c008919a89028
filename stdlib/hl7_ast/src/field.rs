//! Fields and their repetitions.
//!
//! A field is either a plain sequence of components or a sequence of
//! repetitions, never both. The two delimiter-carrier fields at the start of
//! a header segment form a third state that renders straight from the shared
//! encoding and is never split or escaped.

use std::rc::Rc;

use hl7_codec::{Hl7Error, Hl7Result, SharedEncoding};

use crate::component::Component;
use crate::element::{raw_or_null, Element};
use crate::sequence::{check_position, ensure_position, place, Placement};
use crate::trim::{trim_trailing, TrimOptions};

/// Which delimiter text a header field carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DelimiterKind {
    /// MSH-1: the field delimiter itself.
    FieldSeparator,
    /// MSH-2: component, repetition, escape and subcomponent delimiters.
    EncodingCharacters,
}

/// What a field holds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FieldContent {
    /// A single value split into components.
    Single(Vec<Component>),
    /// Repetitions, each of which holds components.
    Repeating(Vec<Field>),
    /// A delimiter carrier of a header segment.
    Delimiters(DelimiterKind),
}

/// A field of a segment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Field {
    content: FieldContent,
    /// Set on the children of a repeating field; they never split on the
    /// repetition delimiter themselves.
    #[cfg_attr(feature = "serde", serde(skip))]
    repetition: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    encoding: SharedEncoding,
}

impl Field {
    /// Creates an empty field.
    pub fn new(encoding: &SharedEncoding) -> Self {
        Self {
            content: FieldContent::Single(vec![Component::new(encoding)]),
            repetition: false,
            encoding: Rc::clone(encoding),
        }
    }

    /// Creates a field from wire text, splitting repetitions first and
    /// components second.
    pub fn parse(raw: &str, encoding: &SharedEncoding) -> Self {
        let mut field = Self::new(encoding);
        field.split(raw);
        field
    }

    /// Creates a delimiter-carrier field for a header segment.
    pub fn delimiters(kind: DelimiterKind, encoding: &SharedEncoding) -> Self {
        Self {
            content: FieldContent::Delimiters(kind),
            repetition: false,
            encoding: Rc::clone(encoding),
        }
    }

    fn empty_repetition(encoding: &SharedEncoding) -> Self {
        let mut field = Self::new(encoding);
        field.repetition = true;
        field
    }

    fn parse_repetition(raw: &str, encoding: &SharedEncoding) -> Self {
        let mut field = Self::empty_repetition(encoding);
        field.split(raw);
        field
    }

    fn split(&mut self, raw: &str) {
        let repetition = self.encoding.borrow().repetition;
        if !self.repetition && raw.contains(repetition) {
            self.content = FieldContent::Repeating(
                raw.split(repetition)
                    .map(|part| Field::parse_repetition(part, &self.encoding))
                    .collect(),
            );
        } else {
            self.split_components(raw);
        }
    }

    fn split_components(&mut self, raw: &str) {
        let component = self.encoding.borrow().component;
        self.content = FieldContent::Single(
            raw.split(component)
                .map(|part| Component::parse(part, &self.encoding))
                .collect(),
        );
    }

    /// Stores `value` as one repetition: split into components but never
    /// into repetitions, whatever mode the field is in.
    pub fn set_repetition_value(&mut self, value: Option<&str>) -> Hl7Result<()> {
        if self.is_delimiters() {
            return self.set_value(value);
        }
        let raw = raw_or_null(value, &self.encoding);
        self.split_components(&raw);
        Ok(())
    }

    /// The content of this field.
    pub fn content(&self) -> &FieldContent {
        &self.content
    }

    /// Whether this field holds repetitions.
    pub fn has_repetitions(&self) -> bool {
        matches!(self.content, FieldContent::Repeating(_))
    }

    /// Whether this field is a header delimiter carrier.
    pub fn is_delimiters(&self) -> bool {
        matches!(self.content, FieldContent::Delimiters(_))
    }

    /// Whether this field holds more than one component.
    pub fn is_componentized(&self) -> bool {
        matches!(&self.content, FieldContent::Single(components) if components.len() > 1)
    }

    /// The repetitions of this field. A non-repeating field is its own
    /// single repetition.
    pub fn repetitions(&self) -> &[Field] {
        match &self.content {
            FieldContent::Repeating(repetitions) => repetitions,
            _ => std::slice::from_ref(self),
        }
    }

    /// Number of repetitions (1 for a non-repeating field).
    pub fn repetition_count(&self) -> usize {
        self.repetitions().len()
    }

    /// The repetition at 1-based `position`, if it exists.
    pub fn repetition(&self, position: usize) -> Option<&Field> {
        position
            .checked_sub(1)
            .and_then(|index| self.repetitions().get(index))
    }

    /// Mutable access to the repetition at 1-based `position`.
    pub fn repetition_mut(&mut self, position: usize) -> Option<&mut Field> {
        if !self.has_repetitions() {
            return (position == 1).then_some(self);
        }
        match &mut self.content {
            FieldContent::Repeating(repetitions) => position
                .checked_sub(1)
                .and_then(|index| repetitions.get_mut(index)),
            _ => None,
        }
    }

    /// The components of this field, or of its first repetition. Empty for
    /// delimiter carriers.
    pub fn components(&self) -> &[Component] {
        match &self.content {
            FieldContent::Single(components) => components,
            FieldContent::Repeating(repetitions) => repetitions
                .first()
                .map(Field::components)
                .unwrap_or_default(),
            FieldContent::Delimiters(_) => &[],
        }
    }

    /// The component at 1-based `position`, if it exists.
    pub fn component(&self, position: usize) -> Option<&Component> {
        position
            .checked_sub(1)
            .and_then(|index| self.components().get(index))
    }

    /// Mutable access to the component at 1-based `position`.
    pub fn component_mut(&mut self, position: usize) -> Option<&mut Component> {
        let index = position.checked_sub(1)?;
        match &mut self.content {
            FieldContent::Single(components) => components.get_mut(index),
            FieldContent::Repeating(repetitions) => repetitions
                .first_mut()
                .and_then(|first| first.component_mut(position)),
            FieldContent::Delimiters(_) => None,
        }
    }

    /// Number of components (of the first repetition when repeating).
    pub fn component_count(&self) -> usize {
        self.components().len()
    }

    /// Returns the component at `position`, creating it and any gap before
    /// it. A repeating field addresses its first repetition.
    pub fn ensure_component(&mut self, position: usize) -> Hl7Result<&mut Component> {
        let encoding = Rc::clone(&self.encoding);
        match &mut self.content {
            FieldContent::Single(components) => {
                ensure_position(components, position, "component", || Component::new(&encoding))
            }
            FieldContent::Repeating(repetitions) => match repetitions.first_mut() {
                Some(first) => first.ensure_component(position),
                None => Err(Hl7Error::invalid_request("repeating field has no repetitions")),
            },
            FieldContent::Delimiters(_) => Err(delimiter_field_error()),
        }
    }

    /// Inserts `component` according to `placement`.
    pub fn add_new_component(
        &mut self,
        mut component: Component,
        placement: Placement,
    ) -> Hl7Result<()> {
        component.rebind(&self.encoding);
        let encoding = Rc::clone(&self.encoding);
        match &mut self.content {
            FieldContent::Single(components) => {
                place(components, component, placement, "component", || {
                    Component::new(&encoding)
                })
            }
            FieldContent::Repeating(repetitions) => match repetitions.first_mut() {
                Some(first) => first.add_new_component(component, placement),
                None => Err(Hl7Error::invalid_request("repeating field has no repetitions")),
            },
            FieldContent::Delimiters(_) => Err(delimiter_field_error()),
        }
    }

    /// Returns repetition `position`, switching into repetition mode when
    /// needed.
    ///
    /// A non-repeating field asked for repetition 1 returns itself. Asked for
    /// anything higher it first moves its own content into repetition 1.
    pub fn ensure_repetition(&mut self, position: usize) -> Hl7Result<&mut Field> {
        check_position(position, "repetition")?;
        if self.is_delimiters() {
            if position == 1 {
                return Ok(self);
            }
            return Err(delimiter_field_error());
        }
        if !self.has_repetitions() {
            if position == 1 {
                return Ok(self);
            }
            self.demote();
        }
        let encoding = Rc::clone(&self.encoding);
        match &mut self.content {
            FieldContent::Repeating(repetitions) => {
                ensure_position(repetitions, position, "repetition", || {
                    Field::empty_repetition(&encoding)
                })
            }
            _ => Err(Hl7Error::invalid_request(
                "field did not switch to repetition mode",
            )),
        }
    }

    /// Inserts `field` as a repetition according to `placement`.
    pub fn add_new_repetition(&mut self, mut field: Field, placement: Placement) -> Hl7Result<()> {
        if self.is_delimiters() {
            return Err(delimiter_field_error());
        }
        if field.has_repetitions() || field.is_delimiters() {
            return Err(Hl7Error::invalid_request(
                "a repetition cannot itself repeat or carry delimiters",
            ));
        }
        field.rebind(&self.encoding);
        field.repetition = true;
        if !self.has_repetitions() {
            self.demote();
        }
        let encoding = Rc::clone(&self.encoding);
        match &mut self.content {
            FieldContent::Repeating(repetitions) => {
                place(repetitions, field, placement, "repetition", || {
                    Field::empty_repetition(&encoding)
                })
            }
            _ => Err(Hl7Error::invalid_request(
                "field did not switch to repetition mode",
            )),
        }
    }

    /// Removes repetition `position`.
    ///
    /// On a non-repeating field only repetition 1 exists and removing it
    /// clears the field. When one repetition remains the field collapses back
    /// to non-repeating mode with that repetition's content.
    pub fn remove_repetition(&mut self, position: usize) -> Hl7Result<()> {
        check_position(position, "repetition")?;
        let remaining = match &mut self.content {
            FieldContent::Repeating(repetitions) => {
                if position > repetitions.len() {
                    return Err(missing_repetition(position));
                }
                repetitions.remove(position - 1);
                if repetitions.len() > 1 {
                    return Ok(());
                }
                repetitions.pop()
            }
            FieldContent::Single(_) if position == 1 => None,
            FieldContent::Single(_) => return Err(missing_repetition(position)),
            FieldContent::Delimiters(_) => return Err(delimiter_field_error()),
        };
        self.content = match remaining {
            Some(last) => last.content,
            None => FieldContent::Single(vec![Component::new(&self.encoding)]),
        };
        Ok(())
    }

    /// Collapses a repeating field to its first repetition.
    pub fn strip_repetitions(&mut self) {
        let first = match &mut self.content {
            FieldContent::Repeating(repetitions) if !repetitions.is_empty() => {
                repetitions.swap_remove(0)
            }
            FieldContent::Repeating(_) => Field::new(&self.encoding),
            _ => return,
        };
        self.content = first.content;
    }

    /// Drops trailing empty components (and subcomponents) as enabled in
    /// `options`. Repetitions are trimmed individually.
    pub fn remove_trailing(&mut self, options: TrimOptions) {
        match &mut self.content {
            FieldContent::Single(components) => {
                for component in components.iter_mut() {
                    component.remove_trailing(options);
                }
                if options.components {
                    trim_trailing(components, 1);
                }
            }
            FieldContent::Repeating(repetitions) => {
                for repetition in repetitions.iter_mut() {
                    repetition.remove_trailing(options);
                }
            }
            FieldContent::Delimiters(_) => {}
        }
    }

    fn demote(&mut self) {
        let content = std::mem::replace(&mut self.content, FieldContent::Repeating(Vec::new()));
        let first = Field {
            content,
            repetition: true,
            encoding: Rc::clone(&self.encoding),
        };
        self.content = FieldContent::Repeating(vec![first]);
    }
}

impl Element for Field {
    fn encoding(&self) -> &SharedEncoding {
        &self.encoding
    }

    fn value(&self) -> String {
        self.serialize()
    }

    fn set_value(&mut self, value: Option<&str>) -> Hl7Result<()> {
        if let FieldContent::Delimiters(kind) = self.content {
            let value = value.ok_or_else(|| {
                Hl7Error::invalid_request("a delimiter field cannot be null")
            })?;
            let mut encoding = self.encoding.borrow_mut();
            return match kind {
                DelimiterKind::FieldSeparator => {
                    let mut chars = value.chars();
                    match (chars.next(), chars.next()) {
                        (Some(field), None) => encoding.set_field_delimiter(field),
                        _ => Err(Hl7Error::invalid_request(format!(
                            "field separator must be one character, got {value:?}"
                        ))),
                    }
                }
                DelimiterKind::EncodingCharacters => encoding.set_encoding_characters(value),
            };
        }
        let raw = raw_or_null(value, &self.encoding);
        self.split(&raw);
        Ok(())
    }

    fn serialize(&self) -> String {
        let encoding = self.encoding.borrow();
        match &self.content {
            FieldContent::Single(components) => components
                .iter()
                .map(Element::serialize)
                .collect::<Vec<_>>()
                .join(&encoding.component.to_string()),
            FieldContent::Repeating(repetitions) => repetitions
                .iter()
                .map(Element::serialize)
                .collect::<Vec<_>>()
                .join(&encoding.repetition.to_string()),
            FieldContent::Delimiters(DelimiterKind::FieldSeparator) => encoding.field.to_string(),
            FieldContent::Delimiters(DelimiterKind::EncodingCharacters) => {
                encoding.encoding_characters()
            }
        }
    }

    fn rebind(&mut self, encoding: &SharedEncoding) {
        self.encoding = Rc::clone(encoding);
        match &mut self.content {
            FieldContent::Single(components) => {
                for component in components.iter_mut() {
                    component.rebind(encoding);
                }
            }
            FieldContent::Repeating(repetitions) => {
                for repetition in repetitions.iter_mut() {
                    repetition.rebind(encoding);
                }
            }
            FieldContent::Delimiters(_) => {}
        }
    }
}

fn delimiter_field_error() -> Hl7Error {
    Hl7Error::invalid_request("delimiter fields cannot be subdivided")
}

fn missing_repetition(position: usize) -> Hl7Error {
    Hl7Error::invalid_request(format!("repetition {position} does not exist"))
}
