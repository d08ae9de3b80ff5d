//! Metrics collection.
//!
//! # Metrics
//! - `router_matches_total` (counter): match attempts by `outcome`
//!   (`matched`, `no_match`, `overflow`)
//! - `router_rebuilds_total` (counter): rebuilds by `result` (`success`, `failure`)
//! - `router_regex_timeouts_total` (counter): regex evaluations over budget
//! - `router_states` (gauge): states in the most recently built matcher
//! - `router_build_duration_seconds` (histogram): matcher build time
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; exposition is left to the host
//! - A process-wide switch lets configuration disable recording entirely;
//!   it is shared by every router in the process

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

static ENABLED: AtomicBool = AtomicBool::new(true);

/// Enable or disable metric recording.
///
/// The switch is process-wide: every router in the process shares it, so
/// routers built from different configurations cannot disagree on it. The
/// last call wins.
pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

pub fn record_match(outcome: &'static str) {
    if is_enabled() {
        ::metrics::counter!("router_matches_total", "outcome" => outcome).increment(1);
    }
}

pub fn record_rebuild(result: &'static str) {
    if is_enabled() {
        ::metrics::counter!("router_rebuilds_total", "result" => result).increment(1);
    }
}

pub fn record_regex_timeout() {
    if is_enabled() {
        ::metrics::counter!("router_regex_timeouts_total").increment(1);
    }
}

/// Record a completed matcher build.
pub fn record_build(states: usize, duration: Duration) {
    if is_enabled() {
        ::metrics::gauge!("router_states").set(states as f64);
        ::metrics::histogram!("router_build_duration_seconds").record(duration.as_secs_f64());
    }
}
