//! Constraint that requires every child to match.

use std::sync::Arc;

use crate::constraints::{RouteConstraint, RouteDirection};
use crate::routing::values::RouteValues;

#[derive(Debug, Clone)]
pub struct CompositeConstraint {
    constraints: Vec<Arc<dyn RouteConstraint>>,
}

impl CompositeConstraint {
    pub fn new(constraints: Vec<Arc<dyn RouteConstraint>>) -> Self {
        Self { constraints }
    }

    pub fn constraints(&self) -> &[Arc<dyn RouteConstraint>] {
        &self.constraints
    }
}

impl RouteConstraint for CompositeConstraint {
    fn matches(&self, key: &str, values: &RouteValues, direction: RouteDirection) -> bool {
        self.constraints
            .iter()
            .all(|c| c.matches(key, values, direction))
    }
}
