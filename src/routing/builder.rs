//! DFA matcher construction.
//!
//! # Data Flow
//! ```text
//! add_endpoint (resolve constraints, build processors, compute precedence)
//!     → sort entries (order, precedence, method, template text)
//!     → breadth-first tree build, one depth level at a time
//!         phase 1: create every child node the level needs
//!         phase 2: record matches, compute next-level parents
//!     → lower tree to flat states (DFS, node → state index)
//!     → partition each state's candidates into groups
//!     → DfaMatcher
//! ```
//!
//! # Design Decisions
//! - Building a level's structure before following any continuation makes
//!   the tree independent of which entry happened to be processed first
//! - Entries that compare equal on every sort key are rejected as ambiguous
//! - A bad constraint rejects its endpoint at registration and leaves the
//!   builder untouched

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::constraints::{
    CompositeConstraint, ConstraintError, ConstraintMap, OptionalConstraint, RouteConstraint,
};
use crate::observability::metrics;
use crate::routing::endpoint::Endpoint;
use crate::routing::jump_table::JumpTableBuilder;
use crate::routing::matcher::{Candidate, DfaMatcher, State};
use crate::routing::processor::MatchProcessor;
use crate::template::{Precedence, Segment, TemplateError};

/// Index of a node in a `DfaTree`.
pub type NodeId = usize;

/// The root node is always the first node of the tree.
pub const ROOT: NodeId = 0;

/// Errors raised while registering endpoints or building a matcher.
#[derive(Debug, Clone, Error)]
pub enum BuildError {
    #[error("route '{route}': {source}")]
    Template {
        route: String,
        #[source]
        source: TemplateError,
    },

    #[error("route '{route}': constraint '{constraint}' on parameter '{parameter}': {source}")]
    Constraint {
        route: String,
        parameter: String,
        constraint: String,
        #[source]
        source: ConstraintError,
    },

    #[error("routes '{first}' and '{second}' are indistinguishable (same order, precedence, method and template)")]
    AmbiguousEntries { first: String, second: String },
}

/// A registered endpoint with everything the builder derives from it.
#[derive(Debug, Clone)]
pub(crate) struct BuilderEntry {
    endpoint: Arc<Endpoint>,
    precedence: Precedence,
    processors: Arc<[MatchProcessor]>,
}

impl BuilderEntry {
    /// Key shared by candidates that belong to the same group.
    fn group_key(&self) -> (i32, &Precedence, bool) {
        (
            self.endpoint.order(),
            &self.precedence,
            self.endpoint.http_method().is_some(),
        )
    }

    /// Total order: order, precedence, method-restricted first, template
    /// text, then method text.
    fn compare(&self, other: &Self) -> Ordering {
        let (a, b) = (&self.endpoint, &other.endpoint);
        a.order()
            .cmp(&b.order())
            .then_with(|| self.precedence.cmp(&other.precedence))
            .then_with(|| b.http_method().is_some().cmp(&a.http_method().is_some()))
            .then_with(|| a.template().raw_text().cmp(b.template().raw_text()))
            .then_with(|| a.http_method().cmp(&b.http_method()))
    }

    /// Segment at `depth`, or the trailing catch-all for any deeper level.
    fn current_segment(&self, depth: usize) -> Option<&Segment> {
        let template = self.endpoint.template();
        let segments = template.segments();
        if depth < segments.len() {
            return segments.get(depth);
        }
        if template.ends_with_catch_all() {
            return segments.last();
        }
        None
    }

    /// True if the segments from `depth` on cannot all be absent.
    fn has_additional_required_segments(&self, depth: usize) -> bool {
        let segments = self.endpoint.template().segments();
        segments.iter().skip(depth).any(|segment| {
            match segment.simple_parameter() {
                Some(p) => !p.can_be_absent() && self.endpoint.default_value(&p.name).is_none(),
                None => true,
            }
        })
    }
}

enum SegmentKind<'a> {
    Literal(&'a str),
    CatchAll,
    Parameter,
}

impl<'a> SegmentKind<'a> {
    fn of(segment: &'a Segment) -> Self {
        if let Some(literal) = segment.simple_literal() {
            return SegmentKind::Literal(literal);
        }
        match segment.simple_parameter() {
            Some(p) if p.is_catch_all => SegmentKind::CatchAll,
            _ => SegmentKind::Parameter,
        }
    }
}

fn fold(literal: &str) -> String {
    literal.to_ascii_lowercase()
}

/// A node of the intermediate tree.
#[derive(Debug, Clone, Default)]
pub struct DfaNode {
    pub depth: usize,
    /// Path prefix leading to this node, for diagnostics.
    pub label: String,
    /// Literal children keyed by ASCII-lowercased text.
    pub literals: BTreeMap<String, NodeId>,
    pub parameters: Option<NodeId>,
    pub catch_all: Option<NodeId>,
    /// Indices of the entries accepted here, in entry order.
    pub matches: Vec<usize>,
}

/// The intermediate tree produced by `build_dfa_tree`.
#[derive(Debug, Clone)]
pub struct DfaTree {
    nodes: Vec<DfaNode>,
    entries: Vec<BuilderEntry>,
}

impl DfaTree {
    pub fn root(&self) -> &DfaNode {
        &self.nodes[ROOT]
    }

    pub fn node(&self, id: NodeId) -> &DfaNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Literal child of `id`, looked up case-insensitively.
    pub fn literal(&self, id: NodeId, text: &str) -> Option<NodeId> {
        self.nodes[id].literals.get(&fold(text)).copied()
    }

    /// Display names of the endpoints matched at `id`.
    pub fn match_names(&self, id: NodeId) -> Vec<&str> {
        self.nodes[id]
            .matches
            .iter()
            .map(|&entry| self.entries[entry].endpoint.display_name())
            .collect()
    }

    fn add_node(&mut self, parent: NodeId, label: String) -> NodeId {
        let depth = self.nodes[parent].depth + 1;
        self.nodes.push(DfaNode {
            depth,
            label,
            ..DfaNode::default()
        });
        self.nodes.len() - 1
    }

    fn ensure_child(&mut self, parent: NodeId, kind: &SegmentKind<'_>) {
        match kind {
            SegmentKind::Literal(text) => {
                let key = fold(text);
                if !self.nodes[parent].literals.contains_key(&key) {
                    let label = format!("{}{}/", self.nodes[parent].label, text);
                    let child = self.add_node(parent, label);
                    self.nodes[parent].literals.insert(key, child);
                }
            }
            SegmentKind::Parameter => {
                if self.nodes[parent].parameters.is_none() {
                    let label = format!("{}{{...}}/", self.nodes[parent].label);
                    let child = self.add_node(parent, label);
                    self.nodes[parent].parameters = Some(child);
                }
            }
            SegmentKind::CatchAll => {
                if self.nodes[parent].catch_all.is_none() {
                    let label = format!("{}{{*...}}/", self.nodes[parent].label);
                    let child = self.add_node(parent, label);
                    // A catch-all consumes every further segment.
                    self.nodes[child].parameters = Some(child);
                    self.nodes[child].catch_all = Some(child);
                    self.nodes[parent].catch_all = Some(child);
                }
            }
        }
    }

    /// Children of `parent` that continue into the next level.
    fn continuations(&self, parent: NodeId, kind: &SegmentKind<'_>) -> Vec<NodeId> {
        let node = &self.nodes[parent];
        match kind {
            SegmentKind::Literal(text) => node.literals.get(&fold(text)).copied().into_iter().collect(),
            SegmentKind::Parameter | SegmentKind::CatchAll => node
                .literals
                .values()
                .copied()
                .chain(node.parameters)
                .collect(),
        }
    }
}

/// Collects endpoints and compiles them into a `DfaMatcher`.
#[derive(Debug, Clone)]
pub struct DfaMatcherBuilder {
    constraints: ConstraintMap,
    entries: Vec<BuilderEntry>,
}

impl DfaMatcherBuilder {
    pub fn new(constraints: ConstraintMap) -> Self {
        Self {
            constraints,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register an endpoint.
    ///
    /// Constraints are resolved here, so an unknown or malformed constraint
    /// rejects this endpoint without affecting anything already registered.
    pub fn add_endpoint(&mut self, endpoint: Endpoint) -> Result<(), BuildError> {
        let processors = match self.create_processors(&endpoint) {
            Ok(processors) => processors,
            Err(e) => {
                warn!(route = %endpoint.display_name(), error = %e, "Rejected route");
                return Err(e);
            }
        };
        let precedence = Precedence::inbound(endpoint.template());

        debug!(
            route = %endpoint.display_name(),
            template = %endpoint.template(),
            precedence = %precedence,
            processors = processors.len(),
            "Registered route"
        );

        self.entries.push(BuilderEntry {
            endpoint: Arc::new(endpoint),
            precedence,
            processors: processors.into(),
        });
        Ok(())
    }

    fn create_processors(&self, endpoint: &Endpoint) -> Result<Vec<MatchProcessor>, BuildError> {
        let template = endpoint.template();
        let mut processors = Vec::new();

        if let Some(method) = endpoint.http_method() {
            processors.push(MatchProcessor::HttpMethod(method.to_string()));
        }

        for (index, segment) in template.segments().iter().enumerate() {
            if let Some(parameter) = segment.simple_parameter() {
                let default = endpoint
                    .default_value(&parameter.name)
                    .or(parameter.default_value.as_deref())
                    .map(str::to_string);
                processors.push(MatchProcessor::Parameter {
                    segment: index,
                    name: parameter.name.clone(),
                    catch_all: parameter.is_catch_all,
                    default,
                });
            } else if !segment.is_simple() {
                processors.push(MatchProcessor::ComplexSegment {
                    segment: index,
                    pattern: segment.clone(),
                });
            }
        }

        // Defaults without a parameter are injected before constraints run,
        // so a constraint may target them.
        for (name, value) in endpoint.defaults() {
            if template.parameter(name).is_none() {
                processors.push(MatchProcessor::DefaultValue {
                    name: name.clone(),
                    value: value.clone(),
                });
            }
        }

        let inline = template
            .parameters()
            .flat_map(|p| p.constraints.iter().map(move |c| (p.name.as_str(), c.as_str())));
        let explicit = endpoint
            .constraints()
            .iter()
            .map(|(p, c)| (p.as_str(), c.as_str()));

        let mut grouped: Vec<(String, Vec<Arc<dyn RouteConstraint>>)> = Vec::new();
        for (parameter, text) in inline.chain(explicit) {
            let constraint = self
                .constraints
                .resolve(text)
                .map_err(|source| BuildError::Constraint {
                    route: endpoint.display_name().to_string(),
                    parameter: parameter.to_string(),
                    constraint: text.to_string(),
                    source,
                })?;

            match grouped
                .iter_mut()
                .find(|(name, _)| name.eq_ignore_ascii_case(parameter))
            {
                Some((_, list)) => list.push(constraint),
                None => grouped.push((parameter.to_string(), vec![constraint])),
            }
        }

        for (parameter, mut list) in grouped {
            let mut constraint = match list.len() {
                1 => list.remove(0),
                _ => Arc::new(CompositeConstraint::new(list)) as Arc<dyn RouteConstraint>,
            };
            let optional = template
                .parameter(&parameter)
                .map(|p| p.is_optional)
                .unwrap_or(false);
            if optional {
                constraint = Arc::new(OptionalConstraint::new(constraint));
            }
            processors.push(MatchProcessor::Constraint {
                parameter,
                constraint,
            });
        }

        Ok(processors)
    }

    fn sorted_entries(&self) -> Result<Vec<BuilderEntry>, BuildError> {
        let mut entries = self.entries.clone();
        entries.sort_by(BuilderEntry::compare);

        if let Some(pair) = entries
            .windows(2)
            .find(|pair| pair[0].compare(&pair[1]) == Ordering::Equal)
        {
            return Err(BuildError::AmbiguousEntries {
                first: pair[0].endpoint.display_name().to_string(),
                second: pair[1].endpoint.display_name().to_string(),
            });
        }
        Ok(entries)
    }

    /// Build the intermediate tree. The root is node `ROOT`.
    pub fn build_dfa_tree(&self) -> Result<DfaTree, BuildError> {
        let entries = self.sorted_entries()?;
        let mut tree = DfaTree {
            nodes: vec![DfaNode::default()],
            entries: Vec::new(),
        };

        let mut work: Vec<(usize, Vec<NodeId>)> = (0..entries.len()).map(|i| (i, vec![ROOT])).collect();
        let mut depth = 0;

        while !work.is_empty() {
            for (entry, parents) in &work {
                let Some(segment) = entries[*entry].current_segment(depth) else {
                    continue;
                };
                let kind = SegmentKind::of(segment);
                for &parent in parents {
                    tree.ensure_child(parent, &kind);
                }
            }

            let mut next = Vec::new();
            for (entry, parents) in work {
                let current = &entries[entry];

                if !current.has_additional_required_segments(depth) {
                    for &parent in &parents {
                        tree.nodes[parent].matches.push(entry);
                    }
                }

                let Some(segment) = current.current_segment(depth) else {
                    continue;
                };
                let kind = SegmentKind::of(segment);

                let mut next_parents = Vec::new();
                for &parent in &parents {
                    if let (SegmentKind::CatchAll, Some(catch_all)) = (&kind, tree.nodes[parent].catch_all) {
                        tree.nodes[catch_all].matches.push(entry);
                    }
                    next_parents.extend(tree.continuations(parent, &kind));
                }

                if !next_parents.is_empty() {
                    next.push((entry, next_parents));
                }
            }

            work = next;
            depth += 1;
        }

        for node in &mut tree.nodes {
            node.matches.sort_unstable();
            node.matches.dedup();
        }
        tree.entries = entries;
        Ok(tree)
    }

    /// Compile the registered endpoints.
    pub fn build(&self) -> Result<DfaMatcher, BuildError> {
        let started = Instant::now();
        let tree = self.build_dfa_tree()?;

        let mut lowering = Lowering {
            tree: &tree,
            assigned: vec![None; tree.len()],
            states: Vec::new(),
            tables: Vec::new(),
        };
        lowering.lower(ROOT);

        let exit = lowering.states.len();
        lowering.states.push(PendingState {
            label: "(exit)".to_string(),
            candidates: Vec::new(),
            groups: Vec::new(),
        });
        lowering.tables.push(JumpTableBuilder::default());

        let states: Vec<State> = lowering
            .states
            .into_iter()
            .zip(lowering.tables)
            .map(|(pending, table)| State::new(pending.label, pending.candidates, pending.groups, table.build(exit)))
            .collect();

        let matcher = DfaMatcher::new(states);
        let elapsed = started.elapsed();

        metrics::record_build(matcher.state_count(), elapsed);
        info!(
            routes = self.entries.len(),
            nodes = tree.len(),
            states = matcher.state_count(),
            candidates = matcher.candidate_count(),
            duration_ms = elapsed.as_millis() as u64,
            "Built route matcher"
        );
        Ok(matcher)
    }
}

struct PendingState {
    label: String,
    candidates: Vec<Candidate>,
    groups: Vec<usize>,
}

/// Depth-first conversion of tree nodes into state indices.
struct Lowering<'a> {
    tree: &'a DfaTree,
    assigned: Vec<Option<usize>>,
    states: Vec<PendingState>,
    tables: Vec<JumpTableBuilder>,
}

impl Lowering<'_> {
    fn lower(&mut self, id: NodeId) -> usize {
        if let Some(index) = self.assigned[id] {
            return index;
        }

        let tree = self.tree;
        let node = &tree.nodes[id];
        let index = self.states.len();
        self.assigned[id] = Some(index);
        let pending = self.pending_state(node);
        self.states.push(pending);
        self.tables.push(JumpTableBuilder::default());

        let mut table = JumpTableBuilder::default();
        for (literal, &child) in &node.literals {
            let destination = self.lower(child);
            table.add_entry(literal, destination);
        }

        match (node.parameters, node.catch_all) {
            (Some(parameters), Some(catch_all)) if parameters == catch_all => {
                let destination = self.lower(parameters);
                table.default = Some(destination);
                table.exit = Some(destination);
            }
            (Some(parameters), Some(catch_all)) => {
                table.default = Some(self.lower(parameters));
                table.exit = Some(self.lower(catch_all));
            }
            (Some(parameters), None) => {
                table.default = Some(self.lower(parameters));
            }
            (None, Some(catch_all)) => {
                let destination = self.lower(catch_all);
                table.default = Some(destination);
                table.exit = Some(destination);
            }
            (None, None) => {}
        }

        self.tables[index] = table;
        index
    }

    fn pending_state(&self, node: &DfaNode) -> PendingState {
        let entries: Vec<&BuilderEntry> = node.matches.iter().map(|&i| &self.tree.entries[i]).collect();

        let mut groups = Vec::new();
        let mut start = 0;
        for i in 1..=entries.len() {
            if i == entries.len() || entries[i].group_key() != entries[start].group_key() {
                groups.push(i - start);
                start = i;
            }
        }

        let candidates = entries
            .iter()
            .map(|entry| Candidate::new(entry.endpoint.clone(), entry.processors.clone()))
            .collect();

        PendingState {
            label: if node.label.is_empty() { "/".to_string() } else { format!("/{}", node.label) },
            candidates,
            groups,
        }
    }
}
