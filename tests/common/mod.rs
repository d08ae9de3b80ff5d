//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io::Write;

use tempfile::NamedTempFile;

use dfa_router::constraints::ConstraintMap;
use dfa_router::routing::{DfaMatcher, DfaMatcherBuilder, Endpoint};

/// Endpoint with just a name and template.
pub fn endpoint(name: &str, template: &str) -> Endpoint {
    Endpoint::builder(name, template).build().unwrap()
}

/// Build a matcher from `(name, template)` pairs.
pub fn matcher(routes: &[(&str, &str)]) -> DfaMatcher {
    matcher_from(routes.iter().map(|(name, template)| endpoint(name, template)))
}

/// Build a matcher from prepared endpoints.
pub fn matcher_from(endpoints: impl IntoIterator<Item = Endpoint>) -> DfaMatcher {
    let mut builder = DfaMatcherBuilder::new(ConstraintMap::default());
    for endpoint in endpoints {
        builder.add_endpoint(endpoint).unwrap();
    }
    builder.build().unwrap()
}

/// Name of the route matched for `path` with `method`, if any.
pub fn matched(matcher: &DfaMatcher, method: &str, path: &str) -> Option<String> {
    matcher
        .match_path(path, method)
        .map(|m| m.endpoint.display_name().to_string())
}

/// Write `content` to a temporary file that is removed when dropped.
pub fn config_file(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("dfa-router-")
        .suffix(".toml")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write temp file");
    file
}
