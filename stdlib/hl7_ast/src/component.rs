use std::rc::Rc;

use hl7_codec::{Hl7Result, SharedEncoding};

use crate::element::{raw_or_null, Element};
use crate::sequence::{ensure_position, place, Placement};
use crate::subcomponent::SubComponent;
use crate::trim::{trim_trailing, TrimOptions};

/// An ordered sequence of subcomponents, split on the subcomponent
/// delimiter. Always holds at least one subcomponent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Component {
    subcomponents: Vec<SubComponent>,
    #[cfg_attr(feature = "serde", serde(skip))]
    encoding: SharedEncoding,
}

impl Component {
    /// Creates an empty component.
    pub fn new(encoding: &SharedEncoding) -> Self {
        Self {
            subcomponents: vec![SubComponent::empty(encoding)],
            encoding: Rc::clone(encoding),
        }
    }

    /// Creates a component by splitting `raw` on the subcomponent delimiter.
    pub fn parse(raw: &str, encoding: &SharedEncoding) -> Self {
        let mut component = Self::new(encoding);
        component.split(raw);
        component
    }

    fn split(&mut self, raw: &str) {
        let delimiter = self.encoding.borrow().subcomponent;
        self.subcomponents = raw
            .split(delimiter)
            .map(|part| SubComponent::new(part, &self.encoding))
            .collect();
    }

    /// All subcomponents in order.
    pub fn subcomponents(&self) -> &[SubComponent] {
        &self.subcomponents
    }

    /// The subcomponent at 1-based `position`, if it exists.
    pub fn subcomponent(&self, position: usize) -> Option<&SubComponent> {
        position
            .checked_sub(1)
            .and_then(|index| self.subcomponents.get(index))
    }

    /// Mutable access to the subcomponent at 1-based `position`.
    pub fn subcomponent_mut(&mut self, position: usize) -> Option<&mut SubComponent> {
        position
            .checked_sub(1)
            .and_then(|index| self.subcomponents.get_mut(index))
    }

    /// Number of subcomponents.
    pub fn subcomponent_count(&self) -> usize {
        self.subcomponents.len()
    }

    /// Whether more than one subcomponent is present.
    pub fn is_subcomponentized(&self) -> bool {
        self.subcomponents.len() > 1
    }

    /// Returns the subcomponent at `position`, creating it and any gap
    /// before it.
    pub fn ensure_subcomponent(&mut self, position: usize) -> Hl7Result<&mut SubComponent> {
        let encoding = Rc::clone(&self.encoding);
        ensure_position(&mut self.subcomponents, position, "subcomponent", || {
            SubComponent::empty(&encoding)
        })
    }

    /// Inserts `subcomponent` according to `placement`.
    pub fn add_new_subcomponent(
        &mut self,
        mut subcomponent: SubComponent,
        placement: Placement,
    ) -> Hl7Result<()> {
        subcomponent.rebind(&self.encoding);
        let encoding = Rc::clone(&self.encoding);
        place(
            &mut self.subcomponents,
            subcomponent,
            placement,
            "subcomponent",
            || SubComponent::empty(&encoding),
        )
    }

    /// Drops trailing empty subcomponents when enabled in `options`.
    pub fn remove_trailing(&mut self, options: TrimOptions) {
        if options.subcomponents {
            trim_trailing(&mut self.subcomponents, 1);
        }
    }
}

impl Element for Component {
    fn encoding(&self) -> &SharedEncoding {
        &self.encoding
    }

    fn value(&self) -> String {
        self.serialize()
    }

    fn set_value(&mut self, value: Option<&str>) -> Hl7Result<()> {
        let raw = raw_or_null(value, &self.encoding);
        self.split(&raw);
        Ok(())
    }

    fn serialize(&self) -> String {
        let delimiter = self.encoding.borrow().subcomponent.to_string();
        self.subcomponents
            .iter()
            .map(Element::serialize)
            .collect::<Vec<_>>()
            .join(&delimiter)
    }

    fn rebind(&mut self, encoding: &SharedEncoding) {
        self.encoding = Rc::clone(encoding);
        for subcomponent in &mut self.subcomponents {
            subcomponent.rebind(encoding);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hl7_codec::{shared, Encoding};
    use pretty_assertions::assert_eq;

    #[test]
    fn split_without_delimiter_yields_one_part() {
        let enc = shared(Encoding::default());
        let c = Component::parse("plain", &enc);
        assert_eq!(c.subcomponent_count(), 1);
        assert!(!c.is_subcomponentized());
        assert_eq!(c.serialize(), "plain");
    }

    #[test]
    fn split_and_join_mirror() {
        let enc = shared(Encoding::default());
        let c = Component::parse("a&&b", &enc);
        assert_eq!(c.subcomponent_count(), 3);
        assert!(c.is_subcomponentized());
        assert_eq!(c.subcomponent(3).map(SubComponent::raw), Some("b"));
        assert!(c.subcomponent(0).is_none());
        assert!(c.subcomponent(4).is_none());
        assert_eq!(c.serialize(), "a&&b");
    }

    #[test]
    fn ensure_subcomponent_fills_gaps() {
        let enc = shared(Encoding::default());
        let mut c = Component::parse("a", &enc);
        c.ensure_subcomponent(3).unwrap().set_value(Some("c")).unwrap();
        assert_eq!(c.serialize(), "a&&c");
        assert!(c.ensure_subcomponent(0).is_err());
    }

    #[test]
    fn add_new_subcomponent_rebinds_to_parent_encoding() {
        let enc = shared(Encoding::default());
        let other = shared(Encoding::new('#', '$', '*', '!', '@').unwrap());
        let mut c = Component::parse("a", &enc);
        c.add_new_subcomponent(SubComponent::new("z", &other), Placement::Append)
            .unwrap();
        assert!(Rc::ptr_eq(c.subcomponent(2).unwrap().encoding(), &enc));
        assert_eq!(c.serialize(), "a&z");
    }

    #[test]
    fn trailing_subcomponents_trim_to_one() {
        let enc = shared(Encoding::default());
        let mut c = Component::parse("a&b&&", &enc);
        c.remove_trailing(TrimOptions::default());
        assert_eq!(c.serialize(), "a&b");

        let mut all_empty = Component::parse("&&", &enc);
        all_empty.remove_trailing(TrimOptions::default());
        assert_eq!(all_empty.subcomponent_count(), 1);
        assert!(!all_empty.is_subcomponentized());
    }
}
