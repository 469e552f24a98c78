//! Status-tree construction for selective staging UIs
//!
//! This crate provides:
//! - Arena-backed folder/file trees aggregated from flat status batches
//! - A commit-target table that survives rebuilds (selection, discard state)
//! - Pass-through folder folding driven by a per-rebuild policy
//! - Two builder implementations: the single-pass `TreeBuilder` used in
//!   production and a naive `baseline` kept for benchmarks and equivalence
//!   tests
//!
//! The builder runs synchronously on the caller's update thread; nothing in
//! this crate performs I/O or takes locks.

pub mod baseline;
pub mod builder;
pub mod fold;
pub mod node;
pub mod targets;

// Re-exports
pub use builder::{BuildOutcome, TreeBuilder};
pub use fold::FoldPolicy;
pub use node::{FileTree, FlatNode, NodeId, NodeKind, TreeNode};
pub use stagetree_core::{
    CaseSensitivity, PathError, StatusEntry, StatusFlag, StatusPrecedence, StatusSet, TreeConfig,
    TreePath,
};
pub use targets::{CommitTarget, CommitTargetTable, Selection};

/// Result type for fallible helpers around the builder
pub type Result<T> = anyhow::Result<T>;
