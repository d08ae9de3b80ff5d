//! Route template types and error definitions.

use std::fmt;
use thiserror::Error;

use crate::template::parser;

/// A parsed route template.
///
/// Immutable once parsed. Segment and part classification is purely syntactic;
/// constraint names are kept as text and resolved later by the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    raw_text: String,
    segments: Vec<Segment>,
}

impl RouteTemplate {
    /// Parse a route pattern such as `api/{controller}/{id:int?}`.
    pub fn parse(pattern: &str) -> Result<Self, TemplateError> {
        let segments = parser::parse_segments(pattern)?;
        Ok(Self {
            raw_text: pattern.to_string(),
            segments,
        })
    }

    /// The pattern text exactly as it was registered.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Path segments in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// All parameters in template order.
    pub fn parameters(&self) -> impl Iterator<Item = &ParameterPart> {
        self.segments
            .iter()
            .flat_map(|s| s.parts.iter())
            .filter_map(Part::as_parameter)
    }

    /// Find a parameter by name (ASCII case-insensitive).
    pub fn parameter(&self, name: &str) -> Option<&ParameterPart> {
        self.parameters()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// True when the final segment is a catch-all parameter.
    pub fn ends_with_catch_all(&self) -> bool {
        self.segments
            .last()
            .and_then(Segment::simple_parameter)
            .map(|p| p.is_catch_all)
            .unwrap_or(false)
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_text)
    }
}

/// One path segment: the text between two `/` separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub parts: Vec<Part>,
}

impl Segment {
    /// A segment is simple when it consists of exactly one part.
    pub fn is_simple(&self) -> bool {
        self.parts.len() == 1
    }

    /// The literal text of a simple literal segment.
    pub fn simple_literal(&self) -> Option<&str> {
        match self.parts.as_slice() {
            [Part::Literal(text)] => Some(text),
            _ => None,
        }
    }

    /// The parameter of a simple parameter segment.
    pub fn simple_parameter(&self) -> Option<&ParameterPart> {
        match self.parts.as_slice() {
            [Part::Parameter(p)] => Some(p),
            _ => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}

/// A piece of a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Literal(String),
    Parameter(ParameterPart),
}

impl Part {
    pub fn as_parameter(&self) -> Option<&ParameterPart> {
        match self {
            Part::Parameter(p) => Some(p),
            Part::Literal(_) => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Part::Literal(_))
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Part::Literal(text) => f.write_str(&text.replace('{', "{{").replace('}', "}}")),
            Part::Parameter(p) => {
                f.write_str("{")?;
                if p.is_catch_all {
                    f.write_str("*")?;
                }
                f.write_str(&p.name)?;
                for constraint in &p.constraints {
                    write!(f, ":{}", constraint)?;
                }
                if p.is_optional {
                    f.write_str("?")?;
                }
                if let Some(default) = &p.default_value {
                    write!(f, "={}", default)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// A named parameter inside a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterPart {
    pub name: String,
    pub is_catch_all: bool,
    pub is_optional: bool,
    pub default_value: Option<String>,
    /// Inline constraint texts, e.g. `int` or `range(1,10)`.
    pub constraints: Vec<String>,
}

impl ParameterPart {
    /// A parameter that may be absent from the request path.
    pub fn can_be_absent(&self) -> bool {
        self.is_optional || self.is_catch_all || self.default_value.is_some()
    }
}

/// Errors raised while parsing a route template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unbalanced braces in template '{0}'")]
    UnbalancedBraces(String),

    #[error("template '{0}' contains an empty segment")]
    EmptySegment(String),

    #[error("invalid parameter name '{name}' in template '{template}'")]
    InvalidParameterName { template: String, name: String },

    #[error("catch-all parameter '{0}' must be the only part of the last segment")]
    CatchAllNotLast(String),

    #[error("catch-all parameter '{0}' cannot be optional")]
    OptionalCatchAll(String),

    #[error("optional parameter '{0}' cannot have a default value")]
    OptionalWithDefault(String),

    #[error("optional parameter '{0}' must be the last part of its segment")]
    OptionalNotLast(String),

    #[error("segment '{0}' has adjacent parameters that cannot be separated")]
    AdjacentParameters(String),

    #[error("parameter name '{0}' is used more than once")]
    DuplicateParameter(String),

    #[error("malformed inline constraint '{constraint}' on parameter '{parameter}'")]
    InvalidConstraint { parameter: String, constraint: String },
}
