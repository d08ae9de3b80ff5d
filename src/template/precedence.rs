//! Template specificity scoring.
//!
//! Each segment contributes one digit, most significant first:
//!
//! | digit | segment                                  |
//! |-------|------------------------------------------|
//! | 1     | literal                                  |
//! | 2     | complex segment or constrained parameter |
//! | 3     | parameter                                |
//! | 4     | constrained catch-all                    |
//! | 5     | catch-all                                |
//!
//! The score is `sum(digit_i / 10^i)`. Digits never exceed 9, so comparing
//! the digit sequences lexicographically is exact and needs no decimal type.

use std::fmt;

use crate::template::types::{RouteTemplate, Segment};

/// Inbound precedence of a template. Lower sorts first (more specific).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Precedence(Vec<u8>);

impl Precedence {
    /// Compute the inbound precedence of a parsed template.
    pub fn inbound(template: &RouteTemplate) -> Self {
        Self(template.segments().iter().map(segment_digit).collect())
    }

    pub fn digits(&self) -> &[u8] {
        &self.0
    }
}

fn segment_digit(segment: &Segment) -> u8 {
    let Some(parameter) = segment.simple_parameter() else {
        // Simple literal or complex segment.
        return if segment.is_simple() { 1 } else { 2 };
    };

    let digit = if parameter.is_catch_all { 5 } else { 3 };
    if parameter.constraints.is_empty() {
        digit
    } else {
        digit - 1
    }
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.split_first() {
            None => f.write_str("0"),
            Some((first, [])) => write!(f, "{}", first),
            Some((first, rest)) => {
                write!(f, "{}.", first)?;
                rest.iter().try_for_each(|d| write!(f, "{}", d))
            }
        }
    }
}
