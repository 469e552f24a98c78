//! Working-tree status model

use crate::path::TreePath;
use serde::{Deserialize, Serialize};

/// Status of a single changed path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusFlag {
    /// New file staged or detected in the working tree
    Added,
    /// Tracked file with content changes
    Modified,
    /// Tracked file removed
    Deleted,
    /// Tracked file renamed
    Renamed,
    /// Tracked file copied
    Copied,
    /// File unknown to the index
    Untracked,
    /// Merge conflict
    Conflicted,
}

impl StatusFlag {
    /// The bit this flag occupies in a [`StatusSet`]
    pub const fn bit(self) -> StatusSet {
        StatusSet(1 << self as u8)
    }

    /// One-character label for display
    pub const fn label(self) -> &'static str {
        match self {
            Self::Added => "A",
            Self::Modified => "M",
            Self::Deleted => "D",
            Self::Renamed => "R",
            Self::Copied => "C",
            Self::Untracked => "?",
            Self::Conflicted => "!",
        }
    }

    const ALL: [StatusFlag; 7] = [
        Self::Added,
        Self::Modified,
        Self::Deleted,
        Self::Renamed,
        Self::Copied,
        Self::Untracked,
        Self::Conflicted,
    ];
}

/// A set of status flags
///
/// Folders aggregate the statuses of their descendants, and a folder can
/// simultaneously contain e.g. Added and Modified files, so the aggregate is
/// a union of flags rather than a single value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StatusSet(u8);

impl StatusSet {
    /// The empty set
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every flag in `other` is present
    pub const fn contains(self, other: StatusSet) -> bool {
        self.0 & other.0 == other.0
    }

    /// Add all flags from `other`
    pub fn insert(&mut self, other: StatusSet) {
        self.0 |= other.0;
    }

    /// Union of the two sets
    pub const fn union(self, other: StatusSet) -> StatusSet {
        Self(self.0 | other.0)
    }

    /// Iterate over the flags present, in declaration order
    pub fn flags(self) -> impl Iterator<Item = StatusFlag> {
        StatusFlag::ALL.into_iter().filter(move |f| self.contains(f.bit()))
    }

    /// Resolve the set to a single display flag
    ///
    /// When a folder carries several flags the UI shows one; which one wins
    /// is a policy choice, so the precedence order is caller-supplied.
    pub fn primary(self, precedence: &StatusPrecedence) -> Option<StatusFlag> {
        precedence.0.iter().copied().find(|f| self.contains(f.bit()))
    }
}

impl std::ops::BitOr for StatusSet {
    type Output = StatusSet;

    fn bitor(self, rhs: StatusSet) -> StatusSet {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for StatusSet {
    fn bitor_assign(&mut self, rhs: StatusSet) {
        self.insert(rhs);
    }
}

impl From<StatusFlag> for StatusSet {
    fn from(flag: StatusFlag) -> Self {
        flag.bit()
    }
}

impl std::fmt::Debug for StatusSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StatusSet(")?;
        for (i, flag) in self.flags().enumerate() {
            if i > 0 {
                write!(f, "|")?;
            }
            write!(f, "{}", flag.label())?;
        }
        write!(f, ")")
    }
}

/// Precedence order used to pick a single display flag out of a set
///
/// Earlier entries win. The default puts destructive and unusual states ahead
/// of routine edits: Conflicted > Deleted > Renamed > Copied > Added >
/// Modified > Untracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPrecedence(pub [StatusFlag; 7]);

impl Default for StatusPrecedence {
    fn default() -> Self {
        Self([
            StatusFlag::Conflicted,
            StatusFlag::Deleted,
            StatusFlag::Renamed,
            StatusFlag::Copied,
            StatusFlag::Added,
            StatusFlag::Modified,
            StatusFlag::Untracked,
        ])
    }
}

/// One changed path with its status, the input unit for tree construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Path of the changed file
    pub path: TreePath,
    /// Change flag reported by the status collector
    pub status: StatusFlag,
    /// Whether the change is already staged
    pub staged: bool,
}

impl StatusEntry {
    pub fn new(path: TreePath, status: StatusFlag, staged: bool) -> Self {
        Self { path, status, staged }
    }
}
