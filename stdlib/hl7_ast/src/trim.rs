//! Trailing-delimiter removal.

use crate::element::Element;

/// Which levels drop trailing empty elements. Each toggle is independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimOptions {
    /// Drop trailing empty subcomponents of each component
    pub subcomponents: bool,
    /// Drop trailing empty components of each field
    pub components: bool,
    /// Drop trailing empty fields of each segment
    pub fields: bool,
}

impl Default for TrimOptions {
    fn default() -> Self {
        Self {
            subcomponents: true,
            components: true,
            fields: true,
        }
    }
}

/// Pops trailing elements that render empty, keeping at least `keep`.
pub(crate) fn trim_trailing<T: Element>(items: &mut Vec<T>, keep: usize) {
    let keep = keep.max(1);
    while items.len() > keep && items.last().is_some_and(|last| last.serialize().is_empty()) {
        items.pop();
    }
}
