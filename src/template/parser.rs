//! Route template parsing.
//!
//! # Grammar
//! ```text
//! template   = ["/" | "~/"] [segment *("/" segment)] ["/"]
//! segment    = 1*(literal | parameter)
//! parameter  = "{" ["*"] name *(":" constraint) ["?" | "=" default] "}"
//! constraint = cname ["(" argument ")"]
//! ```
//! `{{` and `}}` escape braces both in literals and inside parameters.

use crate::template::types::{ParameterPart, Part, Segment, TemplateError};

/// Characters that can never appear in a parameter name.
const INVALID_NAME_CHARS: &[char] = &['{', '}', '/', '*', '?', '=', ':'];

pub(crate) fn parse_segments(pattern: &str) -> Result<Vec<Segment>, TemplateError> {
    let body = pattern
        .strip_prefix("~/")
        .or_else(|| pattern.strip_prefix('/'))
        .unwrap_or(pattern);
    let body = body.strip_suffix('/').unwrap_or(body);

    if body.is_empty() {
        return Ok(Vec::new());
    }

    let segments = split_segments(body, pattern)?
        .into_iter()
        .map(|raw| parse_segment(raw, pattern))
        .collect::<Result<Vec<_>, _>>()?;

    validate(&segments)?;
    Ok(segments)
}

/// Split on `/` separators that are not inside a parameter.
fn split_segments<'a>(body: &'a str, pattern: &str) -> Result<Vec<&'a str>, TemplateError> {
    let bytes = body.as_bytes();
    let mut segments = Vec::new();
    let mut in_parameter = false;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let doubled = bytes.get(i + 1) == Some(&b);
        match b {
            b'{' | b'}' if doubled => {
                i += 2;
                continue;
            }
            b'{' if in_parameter => {
                return Err(TemplateError::UnbalancedBraces(pattern.to_string()));
            }
            b'{' => in_parameter = true,
            b'}' if in_parameter => in_parameter = false,
            b'}' => return Err(TemplateError::UnbalancedBraces(pattern.to_string())),
            b'/' if !in_parameter => {
                segments.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    if in_parameter {
        return Err(TemplateError::UnbalancedBraces(pattern.to_string()));
    }

    segments.push(&body[start..]);
    Ok(segments)
}

fn parse_segment(raw: &str, pattern: &str) -> Result<Segment, TemplateError> {
    if raw.is_empty() {
        return Err(TemplateError::EmptySegment(pattern.to_string()));
    }

    let bytes = raw.as_bytes();
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' if bytes.get(i + 1) == Some(&b'{') => {
                literal.push('{');
                i += 2;
            }
            b'}' if bytes.get(i + 1) == Some(&b'}') => {
                literal.push('}');
                i += 2;
            }
            b'}' => return Err(TemplateError::UnbalancedBraces(pattern.to_string())),
            b'{' => {
                if !literal.is_empty() {
                    parts.push(Part::Literal(std::mem::take(&mut literal)));
                }
                let (text, next) = read_parameter(raw, i + 1, pattern)?;
                parts.push(Part::Parameter(parse_parameter(&text, pattern)?));
                i = next;
            }
            _ => {
                let end = raw[i..]
                    .find(|c: char| c == '{' || c == '}')
                    .map(|offset| i + offset)
                    .unwrap_or(raw.len());
                literal.push_str(&raw[i..end]);
                i = end;
            }
        }
    }

    if !literal.is_empty() {
        parts.push(Part::Literal(literal));
    }

    Ok(Segment { parts })
}

/// Read parameter text starting after the opening brace, unescaping `{{`/`}}`.
/// Returns the text and the index just past the closing brace.
fn read_parameter(raw: &str, start: usize, pattern: &str) -> Result<(String, usize), TemplateError> {
    let bytes = raw.as_bytes();
    let mut text = String::new();
    let mut i = start;

    loop {
        let Some(offset) = raw[i..].find(|c: char| c == '{' || c == '}') else {
            return Err(TemplateError::UnbalancedBraces(pattern.to_string()));
        };
        let j = i + offset;
        text.push_str(&raw[i..j]);

        if bytes.get(j + 1) == Some(&bytes[j]) {
            text.push(bytes[j] as char);
            i = j + 2;
            continue;
        }

        if bytes[j] == b'}' {
            return Ok((text, j + 1));
        }
        return Err(TemplateError::UnbalancedBraces(pattern.to_string()));
    }
}

fn parse_parameter(text: &str, pattern: &str) -> Result<ParameterPart, TemplateError> {
    let (is_catch_all, rest) = match text.strip_prefix('*') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let name_end = rest
        .find(|c: char| matches!(c, ':' | '=' | '?'))
        .unwrap_or(rest.len());
    let name = &rest[..name_end];

    if name.is_empty() || name.contains(INVALID_NAME_CHARS) {
        return Err(TemplateError::InvalidParameterName {
            template: pattern.to_string(),
            name: name.to_string(),
        });
    }

    let mut remainder = &rest[name_end..];
    let mut constraints = Vec::new();
    while let Some(after_colon) = remainder.strip_prefix(':') {
        let invalid = || TemplateError::InvalidConstraint {
            parameter: name.to_string(),
            constraint: after_colon.to_string(),
        };
        let (constraint, tail) = split_constraint(after_colon).ok_or_else(invalid)?;
        if !is_well_formed_constraint(constraint) {
            return Err(TemplateError::InvalidConstraint {
                parameter: name.to_string(),
                constraint: constraint.to_string(),
            });
        }
        constraints.push(constraint.to_string());
        remainder = tail;
    }

    let (is_optional, default_value) = match remainder {
        "" => (false, None),
        "?" => (true, None),
        r if r.starts_with("?=") => {
            return Err(TemplateError::OptionalWithDefault(name.to_string()));
        }
        r => match r.strip_prefix('=') {
            Some(default) => (false, Some(default.to_string())),
            None => {
                return Err(TemplateError::InvalidParameterName {
                    template: pattern.to_string(),
                    name: format!("{}{}", name, r),
                });
            }
        },
    };

    Ok(ParameterPart {
        name: name.to_string(),
        is_catch_all,
        is_optional,
        default_value,
        constraints,
    })
}

/// Split one constraint off the front of `s`.
///
/// The constraint ends at a top-level `:` or `=`, or at a top-level `?` that
/// marks the parameter optional. Returns `None` on unbalanced parentheses.
fn split_constraint(s: &str) -> Option<(&str, &str)> {
    let bytes = s.as_bytes();
    let mut depth = 0usize;

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth = depth.checked_sub(1)?,
            b':' | b'=' if depth == 0 => return Some((&s[..i], &s[i..])),
            b'?' if depth == 0 && matches!(bytes.get(i + 1), None | Some(b'=')) => {
                return Some((&s[..i], &s[i..]));
            }
            _ => {}
        }
    }

    if depth != 0 {
        return None;
    }
    Some((s, ""))
}

/// `name` or `name(argument)` with nothing after the closing parenthesis.
fn is_well_formed_constraint(text: &str) -> bool {
    let name = match text.find('(') {
        Some(open) => {
            if !text.ends_with(')') {
                return false;
            }
            &text[..open]
        }
        None => text,
    };

    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn validate(segments: &[Segment]) -> Result<(), TemplateError> {
    let last = segments.len().saturating_sub(1);
    let mut seen: Vec<&str> = Vec::new();

    for (index, segment) in segments.iter().enumerate() {
        for (position, part) in segment.parts.iter().enumerate() {
            let Part::Parameter(parameter) = part else {
                continue;
            };

            if parameter.is_catch_all {
                if index != last || !segment.is_simple() {
                    return Err(TemplateError::CatchAllNotLast(parameter.name.clone()));
                }
                if parameter.is_optional {
                    return Err(TemplateError::OptionalCatchAll(parameter.name.clone()));
                }
            }

            if parameter.is_optional && position + 1 != segment.parts.len() {
                return Err(TemplateError::OptionalNotLast(parameter.name.clone()));
            }

            if position > 0 && !segment.parts[position - 1].is_literal() {
                return Err(TemplateError::AdjacentParameters(segment.to_string()));
            }

            if seen.iter().any(|n| n.eq_ignore_ascii_case(&parameter.name)) {
                return Err(TemplateError::DuplicateParameter(parameter.name.clone()));
            }
            seen.push(&parameter.name);
        }
    }

    Ok(())
}
