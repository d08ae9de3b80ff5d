//! DFA URL Router Library
//!
//! Compiles route templates such as `api/{controller}/{id:int?}` into a
//! deterministic automaton and matches request paths against it.

pub mod config;
pub mod constraints;
pub mod observability;
pub mod routing;
pub mod template;

pub use config::schema::RouterConfig;
pub use constraints::{ConstraintMap, RouteConstraint};
pub use routing::{BuildError, DfaMatcher, DfaMatcherBuilder, Endpoint, RouteMatch, RouteValues, Router};
pub use template::RouteTemplate;
