//! Path grammar for addressing values inside a message.
//!
//! ```text
//! path       = segment [ "." field [ repetition ] [ "." component [ "." subcomponent ] ] ]
//! repetition = "(" index ")" | "[" index "]"
//! ```
//!
//! Every index is 1-based. The segment name is three characters, a letter
//! followed by letters or digits.

use std::fmt;
use std::str::FromStr;

use hl7_ast::is_valid_segment_name;
use hl7_codec::{Hl7Error, Hl7Result};
use nom::{
    branch::alt,
    bytes::complete::take_while_m_n,
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res, opt, verify},
    sequence::{delimited, pair, preceded},
    IResult,
};

/// A parsed path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hl7Path {
    segment: String,
    segment_index: usize,
    field: Option<usize>,
    repetition: Option<usize>,
    component: Option<usize>,
    subcomponent: Option<usize>,
}

/// `(component, subcomponent)` below a field.
type Deeper = Option<(usize, Option<usize>)>;
type Parts<'a> = (&'a str, Option<((usize, Option<usize>), Deeper)>);

fn segment_name(input: &str) -> IResult<&str, &str> {
    verify(
        take_while_m_n(3, 3, |c: char| c.is_ascii_alphanumeric()),
        |name: &str| is_valid_segment_name(name),
    )(input)
}

fn index(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse::<usize>)(input)
}

fn repetition(input: &str) -> IResult<&str, usize> {
    alt((
        delimited(char('('), index, char(')')),
        delimited(char('['), index, char(']')),
    ))(input)
}

fn parts(input: &str) -> IResult<&str, Parts<'_>> {
    all_consuming(pair(
        segment_name,
        opt(pair(
            preceded(char('.'), pair(index, opt(repetition))),
            opt(pair(
                preceded(char('.'), index),
                opt(preceded(char('.'), index)),
            )),
        )),
    ))(input)
}

impl Hl7Path {
    /// Parses `text`, failing with [`Hl7Error::InvalidRequest`] on bad syntax
    /// or a zero index.
    pub fn parse(text: &str) -> Hl7Result<Self> {
        let (_, (segment, rest)) = parts(text)
            .map_err(|_| Hl7Error::invalid_request(format!("invalid path {text:?}")))?;
        let (field, repetition, component, subcomponent) = match rest {
            None => (None, None, None, None),
            Some(((field, repetition), deeper)) => {
                let (component, subcomponent) = match deeper {
                    Some((component, subcomponent)) => (Some(component), subcomponent),
                    None => (None, None),
                };
                (Some(field), repetition, component, subcomponent)
            }
        };
        if [field, repetition, component, subcomponent]
            .into_iter()
            .flatten()
            .any(|index| index == 0)
        {
            return Err(Hl7Error::invalid_request(format!(
                "path {text:?} uses a zero index; indices are 1-based"
            )));
        }
        Ok(Self {
            segment: segment.to_string(),
            segment_index: 0,
            field,
            repetition,
            component,
            subcomponent,
        })
    }

    /// Addresses the `index`-th (0-based) segment with this name instead of
    /// the first.
    pub fn in_segment(mut self, index: usize) -> Self {
        self.segment_index = index;
        self
    }

    /// Segment name.
    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// 0-based index among segments of the same name.
    pub fn segment_index(&self) -> usize {
        self.segment_index
    }

    /// Field position, if the path goes below the segment.
    pub fn field(&self) -> Option<usize> {
        self.field
    }

    /// Explicit repetition, if given.
    pub fn repetition(&self) -> Option<usize> {
        self.repetition
    }

    /// Component position, if given.
    pub fn component(&self) -> Option<usize> {
        self.component
    }

    /// Subcomponent position, if given.
    pub fn subcomponent(&self) -> Option<usize> {
        self.subcomponent
    }

    /// The repetition a component-level access goes through.
    pub(crate) fn effective_repetition(&self) -> Option<usize> {
        match (self.repetition, self.component) {
            (Some(repetition), _) => Some(repetition),
            (None, Some(_)) => Some(1),
            (None, None) => None,
        }
    }
}

impl FromStr for Hl7Path {
    type Err = Hl7Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Hl7Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segment)?;
        if self.segment_index > 0 {
            write!(f, "[#{}]", self.segment_index)?;
        }
        if let Some(field) = self.field {
            write!(f, ".{field}")?;
        }
        if let Some(repetition) = self.repetition {
            write!(f, "({repetition})")?;
        }
        if let Some(component) = self.component {
            write!(f, ".{component}")?;
        }
        if let Some(subcomponent) = self.subcomponent {
            write!(f, ".{subcomponent}")?;
        }
        Ok(())
    }
}
