//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup or rebuild):
//!     Endpoint[] (from an EndpointSource)
//!     → builder.rs (processors, precedence, sort, tree, lowering)
//!     → matcher.rs (flat states + jump tables, immutable)
//!     → router.rs (publish as the next generation)
//!
//! Incoming Request (path, method)
//!     → tokenizer.rs (segment spans, no allocation)
//!     → jump_table.rs (one transition per segment)
//!     → processor.rs (per-candidate checks, complex.rs for multi-part segments)
//!     → Return: RouteMatch (endpoint + values) or no match
//! ```
//!
//! # Design Decisions
//! - Matchers are immutable at runtime; rebuilding swaps a whole generation
//! - Deterministic: same endpoint set and request always give the same match
//! - Priority is explicit order, then precedence, then method restriction

pub mod builder;
mod complex;
pub mod endpoint;
pub mod jump_table;
pub mod matcher;
pub mod processor;
pub mod router;
pub mod source;
pub mod tokenizer;
pub mod values;

pub use builder::{BuildError, DfaMatcherBuilder, DfaNode, DfaTree};
pub use endpoint::{Endpoint, EndpointBuilder};
pub use matcher::{Candidate, DfaMatcher, RouteMatch, State};
pub use router::Router;
pub use source::{CompositeEndpointSource, EndpointSource, StaticEndpointSource};
pub use tokenizer::{PathSegment, MAX_SEGMENTS};
pub use values::RouteValues;
