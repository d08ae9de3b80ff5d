//! Compiled route matcher.
//!
//! # Responsibilities
//! - Walk the state table one path segment at a time
//! - Evaluate the final state's candidates group by group
//! - Return the matched endpoint with its route values, or nothing
//!
//! # Design Decisions
//! - Immutable after construction (shared across threads without locks)
//! - Segment walking does not allocate; values are only built for candidates
//! - Candidates within a group have equal priority: all are evaluated, the
//!   first to match is returned and any further match is logged as ambiguous

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{trace, warn};

use crate::observability::metrics;
use crate::routing::endpoint::Endpoint;
use crate::routing::jump_table::{JumpTable, JumpTableBuilder};
use crate::routing::processor::{MatchContext, MatchProcessor};
use crate::routing::tokenizer::{tokenize, PathSegment};
use crate::routing::values::RouteValues;

/// A successful match.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub endpoint: Arc<Endpoint>,
    pub values: RouteValues,
}

impl Serialize for RouteMatch {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            route: &'a str,
            template: &'a str,
            method: Option<&'a str>,
            metadata: &'a [String],
            values: &'a RouteValues,
        }

        Wire {
            route: self.endpoint.display_name(),
            template: self.endpoint.template().raw_text(),
            method: self.endpoint.http_method(),
            metadata: self.endpoint.metadata(),
            values: &self.values,
        }
        .serialize(serializer)
    }
}

/// An endpoint together with the processors that decide whether it matches.
#[derive(Debug, Clone)]
pub struct Candidate {
    endpoint: Arc<Endpoint>,
    processors: Arc<[MatchProcessor]>,
}

impl Candidate {
    pub(crate) fn new(endpoint: Arc<Endpoint>, processors: Arc<[MatchProcessor]>) -> Self {
        Self {
            endpoint,
            processors,
        }
    }

    pub fn endpoint(&self) -> &Arc<Endpoint> {
        &self.endpoint
    }

    pub fn processors(&self) -> &[MatchProcessor] {
        &self.processors
    }

    fn evaluate(&self, ctx: &MatchContext<'_>) -> Option<RouteValues> {
        let mut values = RouteValues::new();
        self.processors
            .iter()
            .all(|processor| processor.process(ctx, &mut values))
            .then_some(values)
    }
}

/// One state of the automaton.
#[derive(Debug, Clone)]
pub struct State {
    label: String,
    candidates: Box<[Candidate]>,
    /// Lengths of consecutive candidate groups, highest priority first.
    groups: Box<[usize]>,
    transitions: JumpTable,
}

impl State {
    pub(crate) fn new(label: String, candidates: Vec<Candidate>, groups: Vec<usize>, transitions: JumpTable) -> Self {
        Self {
            label,
            candidates: candidates.into_boxed_slice(),
            groups: groups.into_boxed_slice(),
            transitions,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Candidate groups in priority order.
    pub fn groups(&self) -> impl Iterator<Item = &[Candidate]> + '_ {
        let mut offset = 0;
        self.groups.iter().map(move |&len| {
            let group = &self.candidates[offset..offset + len];
            offset += len;
            group
        })
    }

    pub fn transitions(&self) -> &JumpTable {
        &self.transitions
    }
}

/// An immutable, thread-safe route matcher.
#[derive(Debug, Clone)]
pub struct DfaMatcher {
    states: Box<[State]>,
    generation: u64,
}

impl DfaMatcher {
    pub(crate) fn new(states: Vec<State>) -> Self {
        Self {
            states: states.into_boxed_slice(),
            generation: 0,
        }
    }

    /// A matcher that matches nothing.
    pub fn empty() -> Self {
        let exit = State::new(
            "(exit)".to_string(),
            Vec::new(),
            Vec::new(),
            JumpTableBuilder::default().build(0),
        );
        Self::new(vec![exit])
    }

    pub(crate) fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    /// Rebuild generation this matcher was published as; 0 when standalone.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn state(&self, index: usize) -> &State {
        &self.states[index]
    }

    /// Total number of candidates across all states.
    pub fn candidate_count(&self) -> usize {
        self.states.iter().map(|s| s.candidates.len()).sum()
    }

    /// Match a request path and method.
    pub fn match_path(&self, path: &str, method: &str) -> Option<RouteMatch> {
        let Some(segments) = tokenize(path) else {
            trace!(path = %path, "Path has too many segments");
            metrics::record_match("overflow");
            return None;
        };

        let state = self.walk(path, &segments);
        let ctx = MatchContext {
            path,
            method,
            segments: &segments,
        };

        let result = self.select(state, &ctx);
        match &result {
            Some(m) => {
                trace!(path = %path, method = %method, route = %m.endpoint.display_name(), "Matched");
                metrics::record_match("matched");
            }
            None => {
                trace!(path = %path, method = %method, state = %state.label, "No match");
                metrics::record_match("no_match");
            }
        }
        result
    }

    /// Candidates of the state reached by walking `path`, without evaluating them.
    pub fn candidates_for(&self, path: &str) -> &[Candidate] {
        match tokenize(path) {
            Some(segments) => self.walk(path, &segments).candidates(),
            None => &[],
        }
    }

    fn walk(&self, path: &str, segments: &[PathSegment]) -> &State {
        let mut current = 0;
        for &segment in segments {
            current = self.states[current].transitions.destination(path, segment);
        }
        &self.states[current]
    }

    fn select(&self, state: &State, ctx: &MatchContext<'_>) -> Option<RouteMatch> {
        for group in state.groups() {
            let mut selected: Option<RouteMatch> = None;

            for candidate in group {
                let Some(values) = candidate.evaluate(ctx) else {
                    continue;
                };
                if let Some(first) = &selected {
                    warn!(
                        path = %ctx.path,
                        selected = %first.endpoint.display_name(),
                        ignored = %candidate.endpoint.display_name(),
                        "Ambiguous match, keeping the first candidate"
                    );
                    continue;
                }
                selected = Some(RouteMatch {
                    endpoint: candidate.endpoint.clone(),
                    values,
                });
            }

            if selected.is_some() {
                return selected;
            }
        }
        None
    }
}

impl fmt::Display for DfaMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, state) in self.states.iter().enumerate() {
            writeln!(f, "state {} {}", index, state.label)?;

            for (group, candidates) in state.groups().enumerate() {
                for candidate in candidates {
                    writeln!(f, "  [{}] {}", group, candidate.endpoint)?;
                }
            }

            for (literal, destination) in state.transitions.literals() {
                writeln!(f, "  {} -> {}", literal, destination)?;
            }
            writeln!(f, "  * -> {}", state.transitions.default_destination())?;
            writeln!(f, "  (empty) -> {}", state.transitions.exit_destination())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintMap;
    use crate::routing::builder::DfaMatcherBuilder;

    fn matcher(routes: &[(&str, &str)]) -> DfaMatcher {
        let mut builder = DfaMatcherBuilder::new(ConstraintMap::default());
        for (name, template) in routes {
            builder
                .add_endpoint(Endpoint::builder(*name, *template).build().unwrap())
                .unwrap();
        }
        builder.build().unwrap()
    }

    fn route(m: &DfaMatcher, path: &str) -> Option<String> {
        m.match_path(path, "GET")
            .map(|r| r.endpoint.display_name().to_string())
    }

    #[test]
    fn test_empty_matcher() {
        let m = DfaMatcher::empty();
        assert_eq!(m.state_count(), 1);
        assert!(m.match_path("/", "GET").is_none());
        assert!(m.match_path("/anything/at/all", "GET").is_none());
    }

    #[test]
    fn test_root_route() {
        let m = matcher(&[("home", "")]);
        assert_eq!(route(&m, "/").as_deref(), Some("home"));
        assert_eq!(route(&m, "").as_deref(), Some("home"));
        assert!(route(&m, "/x").is_none());
    }

    #[test]
    fn test_walk_and_candidates() {
        let m = matcher(&[("lit", "a/b"), ("param", "{x}/b")]);
        let names: Vec<&str> = m
            .candidates_for("/A/b")
            .iter()
            .map(|c| c.endpoint().display_name())
            .collect();
        assert_eq!(names, vec!["lit", "param"]);

        let names: Vec<&str> = m
            .candidates_for("/z/b")
            .iter()
            .map(|c| c.endpoint().display_name())
            .collect();
        assert_eq!(names, vec!["param"]);
    }

    #[test]
    fn test_candidate_count() {
        assert_eq!(DfaMatcher::empty().candidate_count(), 0);

        // "a/b" reaches both routes, "{x}/b" only the parameter route.
        let m = matcher(&[("lit", "a/b"), ("param", "{x}/b")]);
        assert_eq!(m.candidate_count(), 3);
    }

    #[test]
    fn test_groups_partition_candidates() {
        let m = matcher(&[("lit", "a/b"), ("param", "{x}/b")]);
        let state = m
            .states
            .iter()
            .find(|s| s.candidates.len() == 2)
            .unwrap();
        let groups: Vec<usize> = state.groups().map(<[Candidate]>::len).collect();
        assert_eq!(groups, vec![1, 1]);
    }

    #[test]
    fn test_display_lists_states() {
        let m = matcher(&[("lit", "a")]);
        let text = m.to_string();
        assert!(text.contains("state 0 /"));
        assert!(text.contains("a -> 1"));
        assert!(text.contains("lit (/a)"));
    }
}
