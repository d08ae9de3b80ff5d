//! Live route table.
//!
//! # Responsibilities
//! - Hold the current `DfaMatcher` generation
//! - Rebuild from a new endpoint set and publish it atomically
//! - Notify subscribers of each new generation
//!
//! # Design Decisions
//! - Readers load the current matcher without locking (arc-swap)
//! - A generation is never mutated; rebuilding replaces it wholesale
//! - A failed rebuild leaves the current generation serving requests
//! - Rebuilds are serialized so generation numbers are strictly increasing

use std::sync::{Arc, Mutex};
use std::time::Instant;

use arc_swap::ArcSwap;
use tokio::sync::watch;
use tracing::{error, info};

use crate::constraints::ConstraintMap;
use crate::observability::metrics;
use crate::routing::builder::{BuildError, DfaMatcherBuilder};
use crate::routing::endpoint::Endpoint;
use crate::routing::matcher::{DfaMatcher, RouteMatch};
use crate::routing::source::EndpointSource;

#[derive(Debug)]
pub struct Router {
    current: ArcSwap<DfaMatcher>,
    constraints: ConstraintMap,
    generation_tx: watch::Sender<u64>,
    rebuild_lock: Mutex<()>,
}

impl Router {
    /// A router that matches nothing until the first rebuild.
    pub fn new(constraints: ConstraintMap) -> Self {
        let (generation_tx, _) = watch::channel(0);
        Self {
            current: ArcSwap::from_pointee(DfaMatcher::empty()),
            constraints,
            generation_tx,
            rebuild_lock: Mutex::new(()),
        }
    }

    /// A router with `endpoints` already published as generation 1.
    pub fn from_endpoints(
        constraints: ConstraintMap,
        endpoints: impl IntoIterator<Item = Endpoint>,
    ) -> Result<Self, BuildError> {
        let router = Self::new(constraints);
        router.rebuild(endpoints)?;
        Ok(router)
    }

    /// Snapshot of the current generation.
    pub fn current(&self) -> Arc<DfaMatcher> {
        self.current.load_full()
    }

    pub fn generation(&self) -> u64 {
        *self.generation_tx.borrow()
    }

    /// Receiver that observes every published generation number.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation_tx.subscribe()
    }

    pub fn match_path(&self, path: &str, method: &str) -> Option<RouteMatch> {
        self.current.load().match_path(path, method)
    }

    /// Compile `endpoints` and publish them as the next generation.
    ///
    /// On error nothing is published and the previous matcher keeps serving.
    pub fn rebuild(&self, endpoints: impl IntoIterator<Item = Endpoint>) -> Result<u64, BuildError> {
        let _guard = self
            .rebuild_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let started = Instant::now();

        let matcher = match self.compile(endpoints) {
            Ok(matcher) => matcher,
            Err(e) => {
                error!(
                    error = %e,
                    generation = self.generation(),
                    "Route rebuild failed, keeping current routes"
                );
                metrics::record_rebuild("failure");
                return Err(e);
            }
        };

        let generation = self.generation() + 1;
        let states = matcher.state_count();
        self.current.store(Arc::new(matcher.with_generation(generation)));
        self.generation_tx.send_replace(generation);

        metrics::record_rebuild("success");
        info!(
            generation,
            states,
            duration_ms = started.elapsed().as_millis() as u64,
            "Published route generation"
        );
        Ok(generation)
    }

    /// Rebuild from an endpoint source.
    pub fn rebuild_from(&self, source: &dyn EndpointSource) -> Result<u64, BuildError> {
        let endpoints = source.endpoints().inspect_err(|e| {
            error!(error = %e, "Endpoint source failed, keeping current routes");
            metrics::record_rebuild("failure");
        })?;
        self.rebuild(endpoints)
    }

    fn compile(&self, endpoints: impl IntoIterator<Item = Endpoint>) -> Result<DfaMatcher, BuildError> {
        let mut builder = DfaMatcherBuilder::new(self.constraints.clone());
        for endpoint in endpoints {
            builder.add_endpoint(endpoint)?;
        }
        builder.build()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(ConstraintMap::default())
    }
}
