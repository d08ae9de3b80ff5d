//! Endpoint sources.
//!
//! A source produces the full endpoint set for a rebuild. Sources are
//! composed, never mutated in place.

use crate::routing::builder::BuildError;
use crate::routing::endpoint::Endpoint;

/// Supplies the endpoints a router is built from.
pub trait EndpointSource: Send + Sync {
    fn endpoints(&self) -> Result<Vec<Endpoint>, BuildError>;
}

/// A fixed endpoint list.
#[derive(Debug, Clone, Default)]
pub struct StaticEndpointSource {
    endpoints: Vec<Endpoint>,
}

impl StaticEndpointSource {
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self { endpoints }
    }
}

impl EndpointSource for StaticEndpointSource {
    fn endpoints(&self) -> Result<Vec<Endpoint>, BuildError> {
        Ok(self.endpoints.clone())
    }
}

/// Concatenation of several sources, in the order they were added.
#[derive(Default)]
pub struct CompositeEndpointSource {
    sources: Vec<Box<dyn EndpointSource>>,
}

impl CompositeEndpointSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: impl EndpointSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl EndpointSource for CompositeEndpointSource {
    fn endpoints(&self) -> Result<Vec<Endpoint>, BuildError> {
        let mut all = Vec::new();
        for source in &self.sources {
            all.extend(source.endpoints()?);
        }
        Ok(all)
    }
}
