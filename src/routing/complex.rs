//! Complex segment matching (`{name}.{ext}`, `v{major}-{minor}`).
//!
//! Parts are matched right to left: each literal is located by its last
//! case-insensitive occurrence, and the text between two literals becomes the
//! value of the parameter between them. Every parameter must receive a
//! non-empty value. Values are only written once the whole segment matched.

use crate::routing::values::RouteValues;
use crate::template::{Part, Segment};

/// Match `text` against the parts of a complex `segment`.
pub(crate) fn match_complex_segment(segment: &Segment, text: &str, values: &mut RouteValues) -> bool {
    let parts = segment.parts.as_slice();
    let Some(last) = parts.len().checked_sub(1) else {
        return false;
    };

    // `{name}.{ext?}` also matches plain `name`, but never `name.`
    let optional_tail = match (&parts[last], last.checked_sub(1).map(|i| &parts[i])) {
        (Part::Parameter(p), Some(Part::Literal(separator))) if p.is_optional => Some(separator),
        _ => None,
    };

    match optional_tail {
        Some(separator) => {
            if match_parts(parts, last, text, values) {
                return true;
            }
            if ends_with_ignore_ascii_case(text, separator) {
                return false;
            }
            last >= 2 && match_parts(parts, last - 2, text, values)
        }
        None => match_parts(parts, last, text, values),
    }
}

/// Match `parts[..=last_used]` against the whole of `text`.
fn match_parts(parts: &[Part], last_used: usize, text: &str, values: &mut RouteValues) -> bool {
    let bytes = text.as_bytes();
    let mut last_index = bytes.len();
    let mut pending = None;
    let mut last_literal: Option<&str> = None;
    let mut found: Vec<(&str, &str)> = Vec::new();

    for index in (0..=last_used).rev() {
        let mut new_last_index = last_index;

        match &parts[index] {
            Part::Parameter(parameter) => pending = Some(parameter),
            Part::Literal(literal) => {
                last_literal = Some(literal.as_str());

                // Leave at least one character for a pending parameter.
                let limit = if pending.is_some() {
                    last_index.saturating_sub(1)
                } else {
                    last_index
                };
                if limit == 0 {
                    return false;
                }

                let Some(position) = rfind_ignore_ascii_case(&bytes[..limit], literal.as_bytes()) else {
                    return false;
                };

                // The right-most literal must be anchored at the end of the text.
                if index == last_used && position + literal.len() != bytes.len() {
                    return false;
                }
                new_last_index = position;
            }
        }

        if let Some(parameter) = pending {
            let is_literal = parts[index].is_literal();
            if (last_literal.is_some() && is_literal) || index == 0 {
                let start = match last_literal {
                    Some(literal) if is_literal => new_last_index + literal.len(),
                    _ => 0,
                };
                let Some(value) = text.get(start..last_index) else {
                    return false;
                };
                if value.is_empty() {
                    return false;
                }
                found.push((parameter.name.as_str(), value));
                pending = None;
                last_literal = None;
            }
        }

        last_index = new_last_index;
    }

    if last_index != 0 && parts[0].is_literal() {
        return false;
    }

    for (name, value) in found {
        values.insert(name, value);
    }
    true
}

fn rfind_ignore_ascii_case(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - needle.len())
        .rev()
        .find(|&i| haystack[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

fn ends_with_ignore_ascii_case(text: &str, suffix: &str) -> bool {
    text.len() >= suffix.len()
        && text.as_bytes()[text.len() - suffix.len()..].eq_ignore_ascii_case(suffix.as_bytes())
}
