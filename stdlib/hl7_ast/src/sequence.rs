//! Gap-filling helpers for the ordered child sequences of every level.

use hl7_codec::{Hl7Error, Hl7Result};

/// Where [`place`] puts a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// 1-based position. Inside the current bounds the existing node is
    /// replaced; beyond them the gap is padded with empty nodes first.
    At(usize),
    /// Always appended, never gap-filled.
    Append,
}

/// Rejects positions below 1.
pub fn check_position(position: usize, level: &str) -> Hl7Result<()> {
    if position < 1 {
        return Err(Hl7Error::invalid_request(format!(
            "{level} position must be 1 or greater, got {position}"
        )));
    }
    Ok(())
}

/// Makes sure `items` has an element at 1-based `position`, padding with
/// `make()` as needed, and returns it.
pub fn ensure_position<'a, T>(
    items: &'a mut Vec<T>,
    position: usize,
    level: &str,
    mut make: impl FnMut() -> T,
) -> Hl7Result<&'a mut T> {
    check_position(position, level)?;
    while items.len() < position {
        items.push(make());
    }
    Ok(&mut items[position - 1])
}

/// Puts `node` into `items` according to `placement`.
pub fn place<T>(
    items: &mut Vec<T>,
    node: T,
    placement: Placement,
    level: &str,
    make: impl FnMut() -> T,
) -> Hl7Result<()> {
    match placement {
        Placement::Append => items.push(node),
        Placement::At(position) => *ensure_position(items, position, level, make)? = node,
    }
    Ok(())
}
