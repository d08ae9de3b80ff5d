//! Constraint pipeline.
//!
//! # Data Flow
//! ```text
//! constraint text ("range(1,10)")
//!     → registry.rs (split name/argument, case-insensitive lookup)
//!     → factory (initialize with argument, validate)
//!     → Arc<dyn RouteConstraint> (immutable, shared by candidates)
//!
//! Per parameter:
//!     several constraints → composite.rs
//!     optional parameter  → optional.rs wrapper
//! ```
//!
//! # Design Decisions
//! - The registry is a plain value passed to the builder, never a global
//! - Initialization errors are build-time errors for that route only
//! - Evaluation never errors: a failed or timed out check is simply `false`

pub mod composite;
pub mod int;
pub mod optional;
pub mod range;
pub mod regex;
pub mod registry;
pub mod string;

use std::fmt;
use thiserror::Error;

use crate::routing::values::RouteValues;

pub use composite::CompositeConstraint;
pub use int::IntConstraint;
pub use optional::OptionalConstraint;
pub use range::RangeConstraint;
pub use self::regex::{RegexConstraint, RegexSettings};
pub use registry::{ConstraintFactory, ConstraintMap};
pub use string::StringConstraint;

/// Whether a constraint is checked for an incoming request or for URL generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDirection {
    IncomingRequest,
    UrlGeneration,
}

/// A check applied to one route value.
pub trait RouteConstraint: Send + Sync + fmt::Debug {
    /// Returns true if the value stored under `key` satisfies this constraint.
    fn matches(&self, key: &str, values: &RouteValues, direction: RouteDirection) -> bool;
}

/// Errors raised while resolving or initializing a constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("no constraint has been registered with name '{0}'")]
    UnknownConstraint(String),

    #[error("malformed constraint text '{0}'")]
    Malformed(String),

    #[error("constraint '{0}' requires an argument")]
    MissingArgument(String),

    #[error("invalid argument '{argument}' for constraint '{constraint}': {reason}")]
    InvalidArgument {
        constraint: String,
        argument: String,
        reason: String,
    },
}
