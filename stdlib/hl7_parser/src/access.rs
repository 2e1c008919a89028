//! Path-addressed reads and writes on a parsed message.
//!
//! `get` and `set` only touch structure that already exists. `put` creates
//! every missing level first, including the segment. `exists` reports a
//! missing leaf as `false` but still rejects a malformed path or an unknown
//! segment.

use hl7_ast::{Element, Field, Segment};
use hl7_codec::{Hl7Error, Hl7Result};
use log::trace;

use crate::message::Message;
use crate::path::Hl7Path;

impl Message {
    /// Reads the decoded value at `path`. `None` means HL7-null.
    pub fn get(&self, path: &str) -> Hl7Result<Option<String>> {
        self.get_path(&Hl7Path::parse(path)?)
    }

    /// [`Message::get`] with a pre-parsed path.
    pub fn get_path(&self, path: &Hl7Path) -> Hl7Result<Option<String>> {
        self.ensure_parsed()?;
        let segment = self.addressed_segment(path)?;
        locate(segment, path)
            .map(|node| node.decoded())
            .ok_or_else(|| missing(path))
    }

    /// Writes the raw `value` at an existing `path`. `None` stores HL7-null.
    pub fn set(&mut self, path: &str, value: Option<&str>) -> Hl7Result<()> {
        self.set_path(&Hl7Path::parse(path)?, value)
    }

    /// [`Message::set`] with a pre-parsed path.
    pub fn set_path(&mut self, path: &Hl7Path, value: Option<&str>) -> Hl7Result<()> {
        self.ensure_parsed()?;
        let segment = self.addressed_segment_mut(path)?;
        trace!("set {path}");
        if let (Some(position), Some(repetition), None) =
            (path.field(), path.repetition(), path.component())
        {
            return segment
                .field_mut(position)
                .and_then(|field| field.repetition_mut(repetition))
                .ok_or_else(|| missing(path))?
                .set_repetition_value(value);
        }
        let node = locate_mut(segment, path).ok_or_else(|| missing(path))?;
        node.set_value(value)
    }

    /// Writes the raw `value` at `path`, creating whatever is missing.
    pub fn put(&mut self, path: &str, value: Option<&str>) -> Hl7Result<()> {
        self.put_path(&Hl7Path::parse(path)?, value)
    }

    /// [`Message::put`] with a pre-parsed path.
    pub fn put_path(&mut self, path: &Hl7Path, value: Option<&str>) -> Hl7Result<()> {
        self.ensure_parsed()?;
        while self.segments(path.segment()).len() <= path.segment_index() {
            self.add_new_segment(path.segment())?;
        }
        let segment = self.addressed_segment_mut(path)?;
        trace!("put {path}");
        let Some(position) = path.field() else {
            return segment.set_value(value);
        };
        let field = match path.effective_repetition() {
            Some(repetition) => segment.ensure_field(position, repetition)?,
            None => {
                segment.ensure_field(position, 1)?;
                segment
                    .field_mut(position)
                    .ok_or_else(|| missing(path))?
            }
        };
        let Some(component) = path.component() else {
            return match path.repetition() {
                Some(_) => field.set_repetition_value(value),
                None => field.set_value(value),
            };
        };
        let component = field.ensure_component(component)?;
        match path.subcomponent() {
            Some(subcomponent) => component
                .ensure_subcomponent(subcomponent)?
                .set_value(value),
            None => component.set_value(value),
        }
    }

    /// Whether `path` resolves to an existing node.
    pub fn exists(&self, path: &str) -> Hl7Result<bool> {
        self.exists_path(&Hl7Path::parse(path)?)
    }

    /// [`Message::exists`] with a pre-parsed path.
    pub fn exists_path(&self, path: &Hl7Path) -> Hl7Result<bool> {
        self.ensure_parsed()?;
        let segment = self.addressed_segment(path)?;
        Ok(locate(segment, path).is_some())
    }

    fn addressed_segment(&self, path: &Hl7Path) -> Hl7Result<&Segment> {
        self.segments(path.segment())
            .get(path.segment_index())
            .ok_or_else(|| unknown_segment(path))
    }

    fn addressed_segment_mut(&mut self, path: &Hl7Path) -> Hl7Result<&mut Segment> {
        self.segments_mut(path.segment())
            .get_mut(path.segment_index())
            .ok_or_else(|| unknown_segment(path))
    }
}

fn locate<'a>(segment: &'a Segment, path: &Hl7Path) -> Option<&'a dyn Element> {
    let Some(position) = path.field() else {
        return Some(segment as &dyn Element);
    };
    let field = segment.field(position)?;
    let field: &Field = match path.effective_repetition() {
        Some(repetition) => field.repetition(repetition)?,
        None => field,
    };
    let Some(component) = path.component() else {
        return Some(field as &dyn Element);
    };
    let component = field.component(component)?;
    match path.subcomponent() {
        Some(subcomponent) => component
            .subcomponent(subcomponent)
            .map(|node| node as &dyn Element),
        None => Some(component as &dyn Element),
    }
}

fn locate_mut<'a>(segment: &'a mut Segment, path: &Hl7Path) -> Option<&'a mut dyn Element> {
    let Some(position) = path.field() else {
        return Some(segment as &mut dyn Element);
    };
    let field = segment.field_mut(position)?;
    let field: &mut Field = match path.effective_repetition() {
        Some(repetition) => field.repetition_mut(repetition)?,
        None => field,
    };
    let Some(component) = path.component() else {
        return Some(field as &mut dyn Element);
    };
    let component = field.component_mut(component)?;
    match path.subcomponent() {
        Some(subcomponent) => component
            .subcomponent_mut(subcomponent)
            .map(|node| node as &mut dyn Element),
        None => Some(component as &mut dyn Element),
    }
}

fn missing(path: &Hl7Path) -> Hl7Error {
    Hl7Error::invalid_request(format!("{path} does not exist"))
}

fn unknown_segment(path: &Hl7Path) -> Hl7Error {
    Hl7Error::invalid_request(format!(
        "no {} segment at index {}",
        path.segment(),
        path.segment_index()
    ))
}
