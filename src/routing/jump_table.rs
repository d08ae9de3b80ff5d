//! Per-state transition tables.
//!
//! # Design Decisions
//! - Literal comparison is ASCII case-insensitive
//! - Small tables scan linearly; larger ones hash with a case-folding FNV-1a
//!   so that lookups never allocate a lowered copy of the segment
//! - Unset transitions point at the terminal exit state

use crate::routing::tokenizer::PathSegment;

/// Tables with at most this many literals use a linear scan.
const LINEAR_MAX: usize = 8;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fold_hash(text: &[u8]) -> u64 {
    text.iter().fold(FNV_OFFSET, |hash, b| {
        (hash ^ u64::from(b.to_ascii_lowercase())).wrapping_mul(FNV_PRIME)
    })
}

#[derive(Debug, Clone)]
enum Lookup {
    Linear(Vec<(Box<str>, usize)>),
    Hashed {
        buckets: Vec<Vec<(Box<str>, usize)>>,
        mask: u64,
    },
}

impl Lookup {
    fn new(entries: Vec<(String, usize)>) -> Self {
        let entries: Vec<(Box<str>, usize)> = entries
            .into_iter()
            .map(|(text, dest)| (text.into_boxed_str(), dest))
            .collect();

        if entries.len() <= LINEAR_MAX {
            return Lookup::Linear(entries);
        }

        let size = (entries.len() * 2).next_power_of_two();
        let mask = size as u64 - 1;
        let mut buckets = vec![Vec::new(); size];
        for (text, dest) in entries {
            let bucket = (fold_hash(text.as_bytes()) & mask) as usize;
            buckets[bucket].push((text, dest));
        }
        Lookup::Hashed { buckets, mask }
    }

    fn find(&self, text: &str) -> Option<usize> {
        let candidates = match self {
            Lookup::Linear(entries) => entries.as_slice(),
            Lookup::Hashed { buckets, mask } => {
                let bucket = (fold_hash(text.as_bytes()) & mask) as usize;
                buckets[bucket].as_slice()
            }
        };
        candidates
            .iter()
            .find(|(literal, _)| literal.eq_ignore_ascii_case(text))
            .map(|(_, dest)| *dest)
    }

    fn entries(&self) -> Vec<(&str, usize)> {
        let mut all: Vec<(&str, usize)> = match self {
            Lookup::Linear(entries) => entries.iter().map(|(t, d)| (&**t, *d)).collect(),
            Lookup::Hashed { buckets, .. } => buckets
                .iter()
                .flatten()
                .map(|(t, d)| (&**t, *d))
                .collect(),
        };
        all.sort();
        all
    }
}

/// Immutable transition table of one state.
#[derive(Debug, Clone)]
pub struct JumpTable {
    lookup: Lookup,
    default: usize,
    exit: usize,
}

impl JumpTable {
    /// Next state for `segment` of `path`.
    ///
    /// Zero-length segments take the exit transition; anything else is looked
    /// up among the literals and falls back to the default transition.
    pub fn destination(&self, path: &str, segment: PathSegment) -> usize {
        if segment.is_empty() {
            return self.exit;
        }
        self.lookup
            .find(segment.text(path))
            .unwrap_or(self.default)
    }

    pub fn default_destination(&self) -> usize {
        self.default
    }

    pub fn exit_destination(&self) -> usize {
        self.exit
    }

    /// Literal transitions sorted by text.
    pub fn literals(&self) -> Vec<(&str, usize)> {
        self.lookup.entries()
    }
}

/// Mutable table used while lowering the tree.
#[derive(Debug, Clone, Default)]
pub(crate) struct JumpTableBuilder {
    entries: Vec<(String, usize)>,
    pub default: Option<usize>,
    pub exit: Option<usize>,
}

impl JumpTableBuilder {
    pub fn add_entry(&mut self, literal: &str, destination: usize) {
        self.entries.push((literal.to_string(), destination));
    }

    /// Freeze the table, pointing unset transitions at `exit_state`.
    pub fn build(self, exit_state: usize) -> JumpTable {
        JumpTable {
            lookup: Lookup::new(self.entries),
            default: self.default.unwrap_or(exit_state),
            exit: self.exit.unwrap_or(exit_state),
        }
    }
}
