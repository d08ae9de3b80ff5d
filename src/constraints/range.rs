//! Inclusive integer range constraint.

use crate::constraints::{ConstraintError, RouteConstraint, RouteDirection};
use crate::routing::values::RouteValues;

/// Matches when the route value is an integer within `[min, max]`.
#[derive(Debug, Clone)]
pub struct RangeConstraint {
    min: i64,
    max: i64,
}

impl RangeConstraint {
    /// Parse `min,max`. Fails if either bound is not an integer or `min > max`.
    pub fn new(argument: Option<&str>) -> Result<Self, ConstraintError> {
        let argument = argument.ok_or_else(|| ConstraintError::MissingArgument("range".into()))?;
        let invalid = |reason: &str| ConstraintError::InvalidArgument {
            constraint: "range".into(),
            argument: argument.to_string(),
            reason: reason.to_string(),
        };

        let bounds: Vec<&str> = argument.split(',').map(str::trim).collect();
        let [min, max] = bounds.as_slice() else {
            return Err(invalid("expected exactly two bounds"));
        };
        let min: i64 = min.parse().map_err(|_| invalid("min is not a number"))?;
        let max: i64 = max.parse().map_err(|_| invalid("max is not a number"))?;

        if min > max {
            return Err(invalid("min cannot be greater than max"));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }
}

impl RouteConstraint for RangeConstraint {
    fn matches(&self, key: &str, values: &RouteValues, _direction: RouteDirection) -> bool {
        values
            .get(key)
            .and_then(|v| v.parse::<i64>().ok())
            .map(|n| n >= self.min && n <= self.max)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bounds_inclusive() {
        let constraint = RangeConstraint::new(Some("1, 10")).unwrap();
        assert_eq!((constraint.min(), constraint.max()), (1, 10));

        for (value, expected) in [("1", true), ("10", true), ("0", false), ("11", false), ("x", false)] {
            let values: RouteValues = [("n", value)].into_iter().collect();
            assert_eq!(
                constraint.matches("n", &values, RouteDirection::IncomingRequest),
                expected
            );
        }
    }

    #[test]
    fn test_range_initialization_errors() {
        assert!(matches!(
            RangeConstraint::new(Some("10,1")),
            Err(ConstraintError::InvalidArgument { .. })
        ));
        assert!(RangeConstraint::new(Some("a,1")).is_err());
        assert!(RangeConstraint::new(Some("1,b")).is_err());
        assert!(RangeConstraint::new(Some("1,2,3")).is_err());
        assert!(matches!(
            RangeConstraint::new(None),
            Err(ConstraintError::MissingArgument(_))
        ));
    }
}
