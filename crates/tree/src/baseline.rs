//! Reference tree builder
//!
//! The straightforward implementation: per-entry descent from the root with
//! linear child scans, a full recursive aggregation pass, and a table
//! reconcile that searches the old table for every touched path. Kept as the
//! benchmark counterpart to the single-pass builder and as the oracle for
//! the equivalence test suite. Same contract, same outputs.

use crate::builder::BuildOutcome;
use crate::fold::FoldPolicy;
use crate::node::{FileTree, NodeId, NodeKind};
use crate::targets::{CommitTarget, CommitTargetTable};
use stagetree_core::{StatusEntry, StatusSet, TreePath};

/// Build a tree from `entries`, reconciling `targets` in place
///
/// Behaviorally identical to [`TreeBuilder::build`](crate::TreeBuilder::build);
/// see there for the contract.
pub fn build_tree_root(
    entries: &[StatusEntry],
    flat: &mut Vec<StatusEntry>,
    targets: &mut CommitTargetTable,
    fold: &FoldPolicy,
) -> BuildOutcome {
    let mut tree = FileTree::new();

    // Sorted processing pins display forms: each folder takes the spelling
    // of the sorted-first entry beneath it, same as the single-pass builder.
    // Case-insensitive keys fold away spelling differences, so without a
    // shared order the two builders could label the same folder differently.
    // The sort is stable, so among duplicate paths the last entry the caller
    // supplied still comes last.
    let mut sorted: Vec<&StatusEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));

    for entry in sorted {
        let depth = entry.path.depth();
        let mut current = tree.root();

        for level in 0..depth - 1 {
            let folder_path = entry
                .path
                .prefix(level + 1)
                .expect("prefix within entry depth");
            current = match find_child(&tree, current, &folder_path) {
                Some(id) => id,
                None => {
                    let name = folder_path.file_name().to_string();
                    tree.push_node(
                        current,
                        name,
                        folder_path,
                        NodeKind::Folder,
                        StatusSet::empty(),
                        false,
                    )
                }
            };
        }

        // Duplicate paths overwrite the existing leaf, spelling included, so
        // the last entry wins
        match find_child(&tree, current, &entry.path) {
            Some(existing) => {
                tree.replace_leaf(existing, entry.path.clone(), entry.status.bit(), entry.staged);
            }
            None => {
                tree.push_node(
                    current,
                    entry.path.file_name().to_string(),
                    entry.path.clone(),
                    NodeKind::File,
                    entry.status.bit(),
                    entry.staged,
                );
            }
        }
    }

    let root = tree.root();
    aggregate(&mut tree, root);
    fold.apply(&mut tree);

    // Pre-order over sorted children visits files in sorted path order
    let mut touched: Vec<(NodeId, TreePath, StatusSet)> = Vec::new();
    tree.walk(|id, _| {
        let node = tree.get(id);
        let path = node.path().cloned().expect("non-root node has a path");
        if node.is_file() {
            let flag = node.status.flags().next().expect("file carries one flag");
            flat.push(StatusEntry::new(path.clone(), flag, node.staged));
        }
        touched.push((id, path, node.status));
    });

    let changed = reconcile_by_scan(targets, &touched);

    BuildOutcome { tree, changed }
}

/// Linear scan of a folder's children for a path
fn find_child(tree: &FileTree, parent: NodeId, path: &TreePath) -> Option<NodeId> {
    tree.get(parent)
        .children
        .iter()
        .copied()
        .find(|&c| tree.get(c).path() == Some(path))
}

/// Recompute a subtree's aggregated status from its leaves
fn aggregate(tree: &mut FileTree, id: NodeId) -> StatusSet {
    if tree.get(id).is_file() {
        return tree.get(id).status;
    }
    let children = tree.get(id).children.clone();
    let mut total = StatusSet::empty();
    for child in children {
        total |= aggregate(tree, child);
    }
    if tree.get(id).path().is_some() {
        tree.get_mut(id).status = total;
    }
    total
}

/// Keep-or-default reconcile that searches the old table per path
fn reconcile_by_scan(
    targets: &mut CommitTargetTable,
    touched: &[(NodeId, TreePath, StatusSet)],
) -> Vec<NodeId> {
    let mut old: Vec<(TreePath, CommitTarget)> = std::mem::take(&mut targets.targets)
        .into_iter()
        .collect();
    let mut changed = Vec::new();

    for &(id, ref path, status) in touched {
        let existing = old
            .iter()
            .position(|(p, _)| p == path)
            .map(|i| old.remove(i).1);
        let target = match existing {
            Some(mut target) => {
                if target.last_status != status {
                    changed.push(id);
                }
                target.last_status = status;
                target
            }
            None => {
                changed.push(id);
                CommitTarget {
                    last_status: status,
                    ..Default::default()
                }
            }
        };
        targets.targets.insert(path.clone(), target);
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TreeBuilder;
    use anyhow::Result;
    use stagetree_core::{StatusFlag, TreeConfig};

    fn entries(raw: &[(&str, StatusFlag)]) -> Result<Vec<StatusEntry>> {
        let config = TreeConfig::default();
        raw.iter()
            .map(|&(p, s)| Ok(StatusEntry::new(config.path(p)?, s, false)))
            .collect()
    }

    #[test]
    fn test_matches_single_pass_builder_on_small_batch() -> Result<()> {
        let batch = entries(&[
            ("b/y.txt", StatusFlag::Modified),
            ("a/x.txt", StatusFlag::Added),
            ("a/x.txt.meta", StatusFlag::Added),
            ("a/sub/deep.txt", StatusFlag::Untracked),
        ])?;
        let config = TreeConfig::default();
        let fold: FoldPolicy = [config.path("a")?].into_iter().collect();

        let mut flat_a = Vec::new();
        let mut targets_a = CommitTargetTable::new();
        let a = build_tree_root(&batch, &mut flat_a, &mut targets_a, &fold);

        let mut flat_b = Vec::new();
        let mut targets_b = CommitTargetTable::new();
        let b = TreeBuilder::new(config).build(&batch, &mut flat_b, &mut targets_b, &fold);

        assert_eq!(a.tree.flatten(), b.tree.flatten());
        assert_eq!(flat_a, flat_b);
        assert_eq!(targets_a.len(), targets_b.len());
        Ok(())
    }

    #[test]
    fn test_duplicate_paths_last_wins() -> Result<()> {
        let batch = entries(&[
            ("a/x.txt", StatusFlag::Added),
            ("a/x.txt", StatusFlag::Modified),
        ])?;
        let outcome = build_tree_root(
            &batch,
            &mut Vec::new(),
            &mut CommitTargetTable::new(),
            &FoldPolicy::new(),
        );
        let config = TreeConfig::default();
        let x = outcome.tree.node_at(&config.path("a/x.txt")?).unwrap();
        assert_eq!(outcome.tree.get(x).status, StatusFlag::Modified.bit());
        Ok(())
    }
}
