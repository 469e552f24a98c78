//! Pass-through folder folding
//!
//! A folder that exists only to route to a single nested folder adds a level
//! of indentation without adding information. The UI designates such folders
//! per rebuild; eligible ones are merged with their sole child into one node
//! labeled by the concatenated segment chain (`a/sub`).

use crate::node::{FileTree, NodeId, NodeKind};
use ahash::AHashSet;
use stagetree_core::TreePath;

/// The set of folder paths designated as collapsible for one rebuild
///
/// A rebuild-scoped input rather than a tree property: the same entries can
/// produce different trees under different policies.
#[derive(Debug, Clone, Default)]
pub struct FoldPolicy {
    folded: AHashSet<TreePath>,
}

impl FoldPolicy {
    /// The empty policy; folds nothing
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: TreePath) {
        self.folded.insert(path);
    }

    pub fn contains(&self, path: &TreePath) -> bool {
        self.folded.contains(path)
    }

    pub fn is_empty(&self) -> bool {
        self.folded.is_empty()
    }

    pub fn len(&self) -> usize {
        self.folded.len()
    }

    /// Merge eligible single-child folder chains in place
    ///
    /// A folder folds when its path is designated, it has exactly one child,
    /// and that child is itself a folder. Folding repeats down the chain
    /// while the merged node's path stays designated, bounded by subtree
    /// depth. Designated paths that never qualify are silently ignored.
    ///
    /// Idempotent: applying the same policy to an already-folded tree is a
    /// no-op, because every chain a second pass could find was already
    /// collapsed by the first.
    pub fn apply(&self, tree: &mut FileTree) {
        if self.folded.is_empty() {
            return;
        }
        let mut stack = vec![tree.root()];
        while let Some(id) = stack.pop() {
            let children = tree.get(id).children.clone();
            for child in children {
                let merged = self.collapse_chain(tree, child);
                if tree.get(merged).kind == NodeKind::Folder {
                    stack.push(merged);
                }
            }
        }
    }

    /// Collapse one fold chain starting at `id`, returning the surviving node
    fn collapse_chain(&self, tree: &mut FileTree, mut id: NodeId) -> NodeId {
        loop {
            let node = tree.get(id);
            if node.kind != NodeKind::Folder || node.children.len() != 1 {
                return id;
            }
            let path = match node.path() {
                Some(path) => path,
                None => return id,
            };
            if !self.folded.contains(path) {
                return id;
            }
            let child = node.children[0];
            if tree.get(child).kind != NodeKind::Folder {
                return id;
            }
            tree.merge_into_child(id, child);
            id = child;
        }
    }
}

impl FromIterator<TreePath> for FoldPolicy {
    fn from_iter<T: IntoIterator<Item = TreePath>>(iter: T) -> Self {
        Self {
            folded: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TreeBuilder;
    use crate::targets::CommitTargetTable;
    use anyhow::Result;
    use stagetree_core::{StatusEntry, StatusFlag, TreeConfig};

    fn build(raw_paths: &[&str], folded: &[&str]) -> Result<FileTree> {
        let config = TreeConfig::default();
        let entries: Vec<StatusEntry> = raw_paths
            .iter()
            .map(|raw| Ok(StatusEntry::new(config.path(raw)?, StatusFlag::Added, false)))
            .collect::<Result<_>>()?;
        let fold: FoldPolicy = folded
            .iter()
            .map(|raw| config.path(raw))
            .collect::<Result<_, _>>()?;
        let outcome = TreeBuilder::new(config).build(
            &entries,
            &mut Vec::new(),
            &mut CommitTargetTable::new(),
            &fold,
        );
        Ok(outcome.tree)
    }

    fn names(tree: &FileTree) -> Vec<(usize, String)> {
        tree.flatten().into_iter().map(|n| (n.depth, n.name)).collect()
    }

    #[test]
    fn test_sole_child_folder_merges() -> Result<()> {
        let tree = build(&["a/sub/f.txt"], &["a"])?;
        assert_eq!(
            names(&tree),
            vec![(0, "a/sub".to_string()), (1, "f.txt".to_string())]
        );
        Ok(())
    }

    #[test]
    fn test_chain_collapse_follows_designated_paths() -> Result<()> {
        let tree = build(&["a/b/c/f.txt"], &["a", "a/b"])?;
        assert_eq!(
            names(&tree),
            vec![(0, "a/b/c".to_string()), (1, "f.txt".to_string())]
        );
        Ok(())
    }

    #[test]
    fn test_chain_stops_where_designation_ends() -> Result<()> {
        let tree = build(&["a/b/c/f.txt"], &["a"])?;
        assert_eq!(
            names(&tree),
            vec![
                (0, "a/b".to_string()),
                (1, "c".to_string()),
                (2, "f.txt".to_string()),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_folder_with_two_children_is_ignored() -> Result<()> {
        let tree = build(&["a/sub/f.txt", "a/g.txt"], &["a"])?;
        assert_eq!(
            names(&tree),
            vec![
                (0, "a".to_string()),
                (1, "g.txt".to_string()),
                (1, "sub".to_string()),
                (2, "f.txt".to_string()),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_folder_whose_child_is_a_file_is_ignored() -> Result<()> {
        let tree = build(&["a/f.txt"], &["a"])?;
        assert_eq!(
            names(&tree),
            vec![(0, "a".to_string()), (1, "f.txt".to_string())]
        );
        Ok(())
    }

    #[test]
    fn test_nonexistent_designated_path_is_ignored() -> Result<()> {
        let tree = build(&["a/f.txt"], &["missing", "also/missing"])?;
        assert_eq!(tree.len(), 3);
        Ok(())
    }

    #[test]
    fn test_apply_is_idempotent() -> Result<()> {
        let config = TreeConfig::default();
        let mut tree = build(&["a/b/c/f.txt", "d/e.txt"], &["a", "a/b"])?;
        let fold: FoldPolicy = [config.path("a")?, config.path("a/b")?]
            .into_iter()
            .collect();
        let before = tree.flatten();
        fold.apply(&mut tree);
        assert_eq!(tree.flatten(), before);
        Ok(())
    }
}
