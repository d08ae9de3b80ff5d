//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! template / constraints / routing produce:
//!     → tracing events (structured fields: route, template, generation, states)
//!     → metrics.rs (counters, gauges, histograms via the `metrics` facade)
//!
//! Consumers:
//!     → logging.rs installs the fmt subscriber (stderr)
//!     → any `metrics` recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - Log level from `RUST_LOG` when set, otherwise from configuration
//! - Per-request events stay at `trace` so the hot path is quiet by default
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
