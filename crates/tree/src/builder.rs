//! Single-pass status tree construction
//!
//! Rebuilds run on every file-system change notification, so the builder is
//! written to stay linear: one sort, one walk over the sorted batch with a
//! stack of open folders, and a table reconciliation that only touches the
//! paths present in the batch.

use crate::fold::FoldPolicy;
use crate::node::{FileTree, NodeId, NodeKind};
use crate::targets::CommitTargetTable;
use smallvec::SmallVec;
use stagetree_core::{StatusEntry, StatusSet, TreeConfig, TreePath};
use tracing::debug;

/// Result of one build
#[derive(Debug)]
pub struct BuildOutcome {
    /// Freshly built tree; the previous tree is simply dropped
    pub tree: FileTree,
    /// Nodes the UI needs to invalidate: created since the last build, or
    /// carrying a different aggregated status than last time
    pub changed: Vec<NodeId>,
}

/// Builds a folder/file tree from a flat batch of status entries
pub struct TreeBuilder {
    config: TreeConfig,
}

impl TreeBuilder {
    pub fn new(config: TreeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Build a tree from `entries`, reconciling `targets` in place
    ///
    /// `entries` may arrive in any order; duplicates are tolerated with the
    /// last occurrence winning. The effective batch is appended to `flat` in
    /// sorted order. `fold` designates pass-through folders for this rebuild
    /// only. Synchronous and lock-free; an empty batch yields a bare root
    /// and clears the table.
    pub fn build(
        &self,
        entries: &[StatusEntry],
        flat: &mut Vec<StatusEntry>,
        targets: &mut CommitTargetTable,
        fold: &FoldPolicy,
    ) -> BuildOutcome {
        let mut sorted: Vec<&StatusEntry> = entries.iter().collect();
        // Stable: duplicates keep input order, so the last kept below is the
        // last one the caller supplied
        sorted.sort_by(|a, b| a.path.cmp(&b.path));

        let mut tree = FileTree::new();
        // Open folder frames; frame i holds the folder at depth i+1. The
        // root is the implicit frame below the stack.
        let mut stack: SmallVec<[NodeId; 16]> = SmallVec::new();

        for (i, entry) in sorted.iter().enumerate() {
            if i + 1 < sorted.len() && sorted[i + 1].path == entry.path {
                // Duplicate path: skip, the last occurrence wins
                continue;
            }
            flat.push((*entry).clone());

            let depth = entry.path.depth();

            // Longest stack prefix that still matches this entry's folders.
            // Frames are nested, so matching one segment per level suffices.
            let mut common = 0;
            while common < stack.len() && common + 1 < depth {
                let frame = tree.get(stack[common]);
                let frame_path = frame.path().expect("folder frames carry paths");
                if frame_path.key_segment(common) == entry.path.key_segment(common) {
                    common += 1;
                } else {
                    break;
                }
            }
            stack.truncate(common);

            // Open folders for the remaining intermediate segments
            for level in common..depth - 1 {
                let path = entry
                    .path
                    .prefix(level + 1)
                    .expect("prefix within entry depth");
                let name = path.file_name().to_string();
                let parent = stack.last().copied().unwrap_or(tree.root());
                let id = tree.push_node(
                    parent,
                    name,
                    path,
                    NodeKind::Folder,
                    StatusSet::empty(),
                    false,
                );
                stack.push(id);
            }

            // Attach the leaf and aggregate its status into the open frames
            let parent = stack.last().copied().unwrap_or(tree.root());
            let status = entry.status.bit();
            tree.push_node(
                parent,
                entry.path.file_name().to_string(),
                entry.path.clone(),
                NodeKind::File,
                status,
                entry.staged,
            );
            for &frame in &stack {
                tree.get_mut(frame).status |= status;
            }
        }

        fold.apply(&mut tree);

        // Reconcile over the post-fold tree: every surviving node's path is
        // touched, everything else leaves the table
        let mut touched: Vec<(NodeId, TreePath, StatusSet)> = Vec::with_capacity(tree.len());
        tree.walk(|id, _| {
            let node = tree.get(id);
            let path = node.path().cloned().expect("non-root node has a path");
            touched.push((id, path, node.status));
        });
        let flags = targets.reconcile(touched.iter().map(|(_, p, s)| (p.clone(), *s)));
        let changed: Vec<NodeId> = touched
            .iter()
            .zip(flags)
            .filter_map(|(&(id, _, _), changed)| changed.then_some(id))
            .collect();

        debug!(
            entries = entries.len(),
            nodes = tree.len(),
            changed = changed.len(),
            targets = targets.len(),
            "built status tree"
        );

        BuildOutcome { tree, changed }
    }
}
