//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, known log levels)
//! - Check route names, methods, templates and constraint entries
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Constraint names are resolved by the builder, not here; an explicit
//!   constraint may target a default value that has no template parameter

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::template::{RouteTemplate, TemplateError};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("matcher.regex_timeout_ms must be greater than zero")]
    ZeroRegexTimeout,

    #[error("matcher.regex_size_limit must be greater than zero")]
    ZeroRegexSizeLimit,

    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),

    #[error("route #{0} has an empty name")]
    EmptyRouteName(usize),

    #[error("route name '{0}' is used more than once")]
    DuplicateRouteName(String),

    #[error("route '{0}' has an empty method")]
    EmptyMethod(String),

    #[error("route '{route}': {source}")]
    InvalidTemplate {
        route: String,
        #[source]
        source: TemplateError,
    },

    #[error("route '{route}' has a constraint with an empty parameter or constraint text")]
    EmptyConstraint { route: String },
}

/// Validate `config`, collecting every problem found.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.matcher.regex_timeout_ms == 0 {
        errors.push(ValidationError::ZeroRegexTimeout);
    }
    if config.matcher.regex_size_limit == 0 {
        errors.push(ValidationError::ZeroRegexSizeLimit);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    let mut names = HashSet::new();
    for (index, route) in config.routes.iter().enumerate() {
        if route.name.trim().is_empty() {
            errors.push(ValidationError::EmptyRouteName(index));
        } else if !names.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRouteName(route.name.clone()));
        }

        if route.method.as_deref().is_some_and(|m| m.trim().is_empty()) {
            errors.push(ValidationError::EmptyMethod(route.name.clone()));
        }

        if let Err(source) = RouteTemplate::parse(&route.template) {
            errors.push(ValidationError::InvalidTemplate {
                route: route.name.clone(),
                source,
            });
        }

        if route
            .constraints
            .iter()
            .any(|c| c.parameter.trim().is_empty() || c.constraint.trim().is_empty())
        {
            errors.push(ValidationError::EmptyConstraint {
                route: route.name.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
