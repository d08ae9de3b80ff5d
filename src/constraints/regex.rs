//! Regular expression constraint with an evaluation budget.
//!
//! Patterns are compiled case-insensitively by the `regex` crate, whose
//! matching time is linear in the input, so pathological patterns cannot
//! backtrack forever. The timeout is still enforced as a budget: an
//! evaluation that runs longer than the configured bound is reported and
//! counted as a failed match, never as an error.

use std::time::{Duration, Instant};

use regex::{Regex, RegexBuilder};

use crate::constraints::{ConstraintError, RouteConstraint, RouteDirection};
use crate::observability::metrics;
use crate::routing::values::RouteValues;

/// Compilation and evaluation limits for `regex` constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegexSettings {
    /// Maximum time a single evaluation may take.
    pub timeout: Duration,
    /// Upper bound on the compiled program size in bytes.
    pub size_limit: usize,
}

impl Default for RegexSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            size_limit: 1 << 20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegexConstraint {
    regex: Regex,
    timeout: Duration,
}

impl RegexConstraint {
    pub fn new(argument: Option<&str>, settings: &RegexSettings) -> Result<Self, ConstraintError> {
        let pattern = argument.ok_or_else(|| ConstraintError::MissingArgument("regex".into()))?;
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .size_limit(settings.size_limit)
            .dfa_size_limit(settings.size_limit)
            .build()
            .map_err(|e| ConstraintError::InvalidArgument {
                constraint: "regex".into(),
                argument: pattern.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            regex,
            timeout: settings.timeout,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Evaluate `input`, returning `None` when the budget was exceeded.
    fn evaluate(&self, input: &str) -> Option<bool> {
        let started = Instant::now();
        let matched = self.regex.is_match(input);
        let elapsed = started.elapsed();

        if elapsed > self.timeout {
            return None;
        }
        Some(matched)
    }
}

impl RouteConstraint for RegexConstraint {
    fn matches(&self, key: &str, values: &RouteValues, _direction: RouteDirection) -> bool {
        let Some(value) = values.get(key) else {
            return false;
        };

        match self.evaluate(value) {
            Some(matched) => matched,
            None => {
                tracing::warn!(
                    pattern = %self.regex.as_str(),
                    parameter = %key,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Regex constraint exceeded its timeout, treating as no match"
                );
                metrics::record_regex_timeout();
                false
            }
        }
    }
}
