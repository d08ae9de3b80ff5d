//! Wrapper for constraints on optional parameters.

use std::sync::Arc;

use crate::constraints::{RouteConstraint, RouteDirection};
use crate::routing::values::RouteValues;

/// Applies the inner constraint only when the parameter has a value.
#[derive(Debug, Clone)]
pub struct OptionalConstraint {
    inner: Arc<dyn RouteConstraint>,
}

impl OptionalConstraint {
    pub fn new(inner: Arc<dyn RouteConstraint>) -> Self {
        Self { inner }
    }
}

impl RouteConstraint for OptionalConstraint {
    fn matches(&self, key: &str, values: &RouteValues, direction: RouteDirection) -> bool {
        if values.contains_key(key) {
            return self.inner.matches(key, values, direction);
        }
        true
    }
}
