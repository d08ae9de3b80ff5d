//! Case-insensitive string equality constraint.

use crate::constraints::{ConstraintError, RouteConstraint, RouteDirection};
use crate::routing::values::RouteValues;

/// Matches when the route value equals a fixed string, ignoring ASCII case.
#[derive(Debug, Clone)]
pub struct StringConstraint {
    value: String,
}

impl StringConstraint {
    pub fn new(argument: Option<&str>) -> Result<Self, ConstraintError> {
        let value = argument.ok_or_else(|| ConstraintError::MissingArgument("string".into()))?;
        Ok(Self {
            value: value.to_string(),
        })
    }
}

impl RouteConstraint for StringConstraint {
    fn matches(&self, key: &str, values: &RouteValues, _direction: RouteDirection) -> bool {
        values
            .get(key)
            .map(|v| v.eq_ignore_ascii_case(&self.value))
            .unwrap_or(false)
    }
}
