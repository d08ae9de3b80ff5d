//! Request path tokenizer.
//!
//! Splits a path into `(start, length)` spans over the path itself.
//! Spans live in a fixed-size stack buffer, so tokenizing never allocates;
//! a path with more than `MAX_SEGMENTS` segments is rejected outright.

use std::ops::Deref;

/// Maximum number of segments a request path may contain.
pub const MAX_SEGMENTS: usize = 32;

/// One segment of a request path, as a byte span into the path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathSegment {
    pub start: usize,
    pub length: usize,
}

impl PathSegment {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The segment text within `path`.
    pub fn text<'a>(&self, path: &'a str) -> &'a str {
        &path[self.start..self.start + self.length]
    }
}

/// Tokenized segments of a single path.
#[derive(Debug, Clone, Copy)]
pub struct Segments {
    spans: [PathSegment; MAX_SEGMENTS],
    len: usize,
}

impl Segments {
    fn new() -> Self {
        Self {
            spans: [PathSegment::default(); MAX_SEGMENTS],
            len: 0,
        }
    }

    fn push(&mut self, segment: PathSegment) -> Option<()> {
        let slot = self.spans.get_mut(self.len)?;
        *slot = segment;
        self.len += 1;
        Some(())
    }
}

impl Deref for Segments {
    type Target = [PathSegment];

    fn deref(&self) -> &Self::Target {
        &self.spans[..self.len]
    }
}

/// Tokenize `path`, returning `None` if it has more than `MAX_SEGMENTS` segments.
///
/// A leading `/` is skipped and a trailing `/` yields no extra segment.
/// Interior empty segments (`/a//b`) are kept as zero-length spans.
pub fn tokenize(path: &str) -> Option<Segments> {
    let mut segments = Segments::new();
    let first = usize::from(path.starts_with('/'));
    let mut begin = first;

    for (i, b) in path.bytes().enumerate().skip(first) {
        if b == b'/' {
            segments.push(PathSegment::new(begin, i - begin))?;
            begin = i + 1;
        }
    }

    if path.len() > begin {
        segments.push(PathSegment::new(begin, path.len() - begin))?;
    }

    Some(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(path: &str) -> Vec<&str> {
        tokenize(path).unwrap().iter().map(|s| s.text(path)).collect()
    }

    #[test]
    fn test_tokenize_basic() {
        assert_eq!(texts("/a/b/c"), vec!["a", "b", "c"]);
        assert_eq!(texts("a/b"), vec!["a", "b"]);
    }

    #[test]
    fn test_tokenize_root_and_trailing_slash() {
        assert!(texts("/").is_empty());
        assert!(texts("").is_empty());
        assert_eq!(texts("/a/b/"), vec!["a", "b"]);
    }

    #[test]
    fn test_tokenize_empty_interior_segment() {
        let path = "/a//b";
        let segments = tokenize(path).unwrap();
        assert_eq!(segments.len(), 3);
        assert!(segments[1].is_empty());
        assert_eq!(segments[2], PathSegment::new(4, 1));
    }

    #[test]
    fn test_tokenize_overflow() {
        let at_limit = "/x".repeat(MAX_SEGMENTS);
        assert_eq!(tokenize(&at_limit).unwrap().len(), MAX_SEGMENTS);

        let over = "/x".repeat(MAX_SEGMENTS + 1);
        assert!(tokenize(&over).is_none());
    }
}
