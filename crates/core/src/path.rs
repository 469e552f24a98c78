//! Normalized path keys
//!
//! A `TreePath` is the join key used everywhere: it matches status entries
//! against tree nodes and against commit-target state from earlier builds.
//! Construction normalizes separators and rejects degenerate input, so two
//! distinct logical paths never compare equal.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Errors that can occur while constructing a path key
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The input was empty after normalization
    #[error("empty path")]
    Empty,
    /// A path contained an empty segment (leading, doubled, or trailing separator run)
    #[error("empty segment in path: {0:?}")]
    EmptySegment(String),
    /// A single segment contained a separator
    #[error("separator in path segment: {0:?}")]
    SeparatorInSegment(String),
}

/// Whether path comparison folds case
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseSensitivity {
    /// Compare paths byte-for-byte
    #[default]
    Sensitive,
    /// Fold case before comparing (display form keeps the original case)
    Insensitive,
}

/// A normalized, comparable file-system path
///
/// Stores a display form (original case, `/`-separated) and a comparison key
/// (case-folded when the path was built case-insensitively). Equality,
/// hashing, and ordering all use the comparison key.
///
/// Ordering is segment-wise lexicographic, not whole-string byte order. The
/// distinction matters: `a!b` sorts before `a/x` as raw strings (`!` < `/`),
/// but segment-wise `a` < `a!b`, so `a/x` comes first. Segment-wise order
/// keeps a folder's contents contiguous in a sorted batch, which is the
/// precondition for the single-pass tree builder.
#[derive(Clone)]
pub struct TreePath {
    display: Box<str>,
    key: Box<str>,
    /// Byte offsets of segment starts within `key`
    seg_starts: SmallVec<[u32; 8]>,
}

impl TreePath {
    /// Construct a path key from a raw path string
    ///
    /// Backslashes are normalized to `/` and trailing separators stripped.
    pub fn new(raw: &str, case: CaseSensitivity) -> Result<Self, PathError> {
        let display = normalize(raw)?;
        let key = match case {
            CaseSensitivity::Sensitive => display.clone(),
            CaseSensitivity::Insensitive => display.to_lowercase(),
        };
        Ok(Self::from_parts(display, key))
    }

    fn from_parts(display: String, key: String) -> Self {
        let mut seg_starts = SmallVec::new();
        seg_starts.push(0u32);
        for (i, b) in key.bytes().enumerate() {
            if b == b'/' {
                seg_starts.push(i as u32 + 1);
            }
        }
        Self {
            display: display.into(),
            key: key.into(),
            seg_starts,
        }
    }

    /// The normalized display form (original case)
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Number of segments
    pub fn depth(&self) -> usize {
        self.seg_starts.len()
    }

    /// Iterate over display-form segments
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.display.split('/')
    }

    /// The `i`-th comparison-form segment, if any
    pub fn key_segment(&self, i: usize) -> Option<&str> {
        let start = *self.seg_starts.get(i)? as usize;
        let end = match self.seg_starts.get(i + 1) {
            Some(&next) => next as usize - 1,
            None => self.key.len(),
        };
        Some(&self.key[start..end])
    }

    /// Last display-form segment
    pub fn file_name(&self) -> &str {
        match self.display.rfind('/') {
            Some(i) => &self.display[i + 1..],
            None => &self.display,
        }
    }

    /// The path made of the first `len` segments
    ///
    /// Returns `None` when `len` is zero or exceeds the depth.
    pub fn prefix(&self, len: usize) -> Option<TreePath> {
        if len == 0 || len > self.depth() {
            return None;
        }
        if len == self.depth() {
            return Some(self.clone());
        }
        let key_end = self.seg_starts[len] as usize - 1;
        let display_end = nth_slash(&self.display, len);
        Some(Self::from_parts(
            self.display[..display_end].to_string(),
            self.key[..key_end].to_string(),
        ))
    }

    /// Parent folder path, `None` for top-level paths
    pub fn parent(&self) -> Option<TreePath> {
        self.prefix(self.depth() - 1)
    }

    /// Append one segment
    pub fn join(&self, segment: &str, case: CaseSensitivity) -> Result<TreePath, PathError> {
        if segment.is_empty() {
            return Err(PathError::EmptySegment(segment.to_string()));
        }
        if segment.contains('/') || segment.contains('\\') {
            return Err(PathError::SeparatorInSegment(segment.to_string()));
        }
        let display = format!("{}/{}", self.display, segment);
        let folded;
        let key_segment = match case {
            CaseSensitivity::Sensitive => segment,
            CaseSensitivity::Insensitive => {
                folded = segment.to_lowercase();
                &folded
            }
        };
        let key = format!("{}/{}", self.key, key_segment);
        Ok(Self::from_parts(display, key))
    }

    fn key_segments(&self) -> impl Iterator<Item = &str> {
        self.key.split('/')
    }
}

/// Byte position of the `n`-th `/` in `s` (1-based)
///
/// Callers only ask for separators that exist.
fn nth_slash(s: &str, n: usize) -> usize {
    s.bytes()
        .enumerate()
        .filter(|&(_, b)| b == b'/')
        .nth(n - 1)
        .map(|(i, _)| i)
        .expect("segment separator present")
}

fn normalize(raw: &str) -> Result<String, PathError> {
    let mut s = raw.replace('\\', "/");
    while s.ends_with('/') {
        s.pop();
    }
    if s.is_empty() {
        return Err(PathError::Empty);
    }
    if s.split('/').any(str::is_empty) {
        return Err(PathError::EmptySegment(raw.to_string()));
    }
    Ok(s)
}

impl PartialEq for TreePath {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for TreePath {}

impl Hash for TreePath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl Ord for TreePath {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut a = self.key_segments();
        let mut b = other.key_segments();
        loop {
            match (a.next(), b.next()) {
                (None, None) => return Ordering::Equal,
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(x), Some(y)) => match x.cmp(y) {
                    Ordering::Equal => continue,
                    ord => return ord,
                },
            }
        }
    }
}

impl PartialOrd for TreePath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Debug for TreePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TreePath({})", self.display)
    }
}

impl std::fmt::Display for TreePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display)
    }
}
