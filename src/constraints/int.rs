//! 32-bit integer constraint.

use crate::constraints::{ConstraintError, RouteConstraint, RouteDirection};
use crate::routing::values::RouteValues;

/// Matches when the route value parses as an `i32`.
#[derive(Debug, Clone, Default)]
pub struct IntConstraint;

impl IntConstraint {
    /// Any argument is ignored.
    pub fn new(_argument: Option<&str>) -> Result<Self, ConstraintError> {
        Ok(Self)
    }
}

impl RouteConstraint for IntConstraint {
    fn matches(&self, key: &str, values: &RouteValues, _direction: RouteDirection) -> bool {
        values
            .get(key)
            .map(|v| v.parse::<i32>().is_ok())
            .unwrap_or(false)
    }
}
