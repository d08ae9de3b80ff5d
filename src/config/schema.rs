//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constraints::{ConstraintMap, RegexSettings};
use crate::routing::{BuildError, Endpoint, EndpointSource};

/// Root configuration for the router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Matcher and constraint limits.
    pub matcher: MatcherConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route definitions.
    pub routes: Vec<RouteConfig>,
}

impl RouterConfig {
    /// Convert every route into an `Endpoint`, stopping at the first bad template.
    pub fn endpoints(&self) -> Result<Vec<Endpoint>, BuildError> {
        self.routes.iter().map(RouteConfig::to_endpoint).collect()
    }

    /// Constraint registry with the built-in constraints, using the configured regex limits.
    pub fn constraint_map(&self) -> ConstraintMap {
        ConstraintMap::with_defaults(self.matcher.regex_settings())
    }
}

impl EndpointSource for RouterConfig {
    fn endpoints(&self) -> Result<Vec<Endpoint>, BuildError> {
        RouterConfig::endpoints(self)
    }
}

/// Matcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Evaluation budget for one regex constraint check, in milliseconds.
    pub regex_timeout_ms: u64,

    /// Upper bound on a compiled regex in bytes.
    pub regex_size_limit: usize,
}

impl MatcherConfig {
    pub fn regex_settings(&self) -> RegexSettings {
        RegexSettings {
            timeout: Duration::from_millis(self.regex_timeout_ms),
            size_limit: self.regex_size_limit,
        }
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            regex_timeout_ms: 10_000,
            regex_size_limit: 1 << 20,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Record metrics through the `metrics` facade.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
        }
    }
}

/// A single route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging and match output.
    pub name: String,

    /// Route template, e.g. `api/{controller}/{id:int?}`.
    pub template: String,

    /// Explicit priority (lower = checked first).
    #[serde(default)]
    pub order: i32,

    /// Restrict the route to one HTTP method.
    #[serde(default)]
    pub method: Option<String>,

    /// Default route values.
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,

    /// Constraints in addition to those written inline in the template.
    #[serde(default)]
    pub constraints: Vec<ConstraintConfig>,

    /// Opaque items carried through to matches.
    #[serde(default)]
    pub metadata: Vec<String>,
}

impl RouteConfig {
    pub fn to_endpoint(&self) -> Result<Endpoint, BuildError> {
        let mut builder = Endpoint::builder(&self.name, &self.template).order(self.order);
        if let Some(method) = &self.method {
            builder = builder.method(method);
        }
        for (name, value) in &self.defaults {
            builder = builder.default_value(name, value);
        }
        for c in &self.constraints {
            builder = builder.constraint(&c.parameter, &c.constraint);
        }
        for item in &self.metadata {
            builder = builder.metadata(item);
        }

        builder.build().map_err(|source| BuildError::Template {
            route: self.name.clone(),
            source,
        })
    }
}

/// An explicit constraint on one route value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConstraintConfig {
    pub parameter: String,
    pub constraint: String,
}
