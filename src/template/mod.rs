//! Template model.
//!
//! # Data Flow
//! ```text
//! pattern text ("api/{id:int}")
//!     → parser.rs (segments, parts, inline constraint text)
//!     → RouteTemplate (immutable)
//!     → precedence.rs (specificity score used for ordering)
//! ```
//!
//! # Design Decisions
//! - Classification is purely syntactic; constraint names are resolved by the builder
//! - Complex segments (several parts in one segment) are kept intact and only
//!   re-parsed against request text when a candidate is evaluated
//! - Parse errors surface at registration time, never at request time

mod parser;
pub mod precedence;
pub mod types;

pub use precedence::Precedence;
pub use types::{ParameterPart, Part, RouteTemplate, Segment, TemplateError};
