//! Persistent per-path staging intent
//!
//! The tree itself is discarded and regenerated on every build; this table
//! is the only state that survives. It maps path keys to what the user has
//! decided about them (selected for commit, marked for discard).

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use stagetree_core::{StatusSet, TreePath};

/// Tri-state selection of a path for the next commit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Selection {
    /// Not selected
    #[default]
    None,
    /// Some descendants selected (folders only)
    Partial,
    /// Selected, including all descendants
    All,
}

/// Per-path user intent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitTarget {
    /// Selected for the next commit
    pub selected: Selection,
    /// Marked for discard
    pub discarded: bool,
    /// Aggregated status recorded at the last build, used to detect nodes
    /// whose status changed between builds
    pub(crate) last_status: StatusSet,
}

/// Path-keyed table of commit targets
///
/// Created once per working-tree session and handed to every build. Not
/// synchronized: the table is exclusively owned by the caller's update loop.
#[derive(Debug, Clone, Default)]
pub struct CommitTargetTable {
    pub(crate) targets: AHashMap<TreePath, CommitTarget>,
}

impl CommitTargetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn contains(&self, path: &TreePath) -> bool {
        self.targets.contains_key(path)
    }

    pub fn get(&self, path: &TreePath) -> Option<&CommitTarget> {
        self.targets.get(path)
    }

    pub fn get_mut(&mut self, path: &TreePath) -> Option<&mut CommitTarget> {
        self.targets.get_mut(path)
    }

    /// Set the selection state of a known path
    ///
    /// Returns false when the path is not in the table.
    pub fn set_selected(&mut self, path: &TreePath, selected: Selection) -> bool {
        match self.targets.get_mut(path) {
            Some(target) => {
                target.selected = selected;
                true
            }
            None => false,
        }
    }

    /// Mark or unmark a known path for discard
    pub fn set_discarded(&mut self, path: &TreePath, discarded: bool) -> bool {
        match self.targets.get_mut(path) {
            Some(target) => {
                target.discarded = discarded;
                true
            }
            None => false,
        }
    }

    /// Iterate over all targets in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&TreePath, &CommitTarget)> {
        self.targets.iter()
    }

    /// Align the table with the paths touched by a build
    ///
    /// Every touched path ends up in the table: with its prior state
    /// preserved when already present, with default state otherwise. Paths
    /// not touched are removed. Runs in O(touched), never O(table size) per
    /// path: entries are drained out of the old map into a fresh one.
    ///
    /// Returns one flag per touched path, in input order: true when the path
    /// was newly inserted or its aggregated status changed since the build
    /// that last recorded it.
    pub fn reconcile<I>(&mut self, touched: I) -> Vec<bool>
    where
        I: IntoIterator<Item = (TreePath, StatusSet)>,
    {
        let touched = touched.into_iter();
        let (lower, _) = touched.size_hint();
        let mut next = AHashMap::with_capacity(lower);
        let mut changed = Vec::with_capacity(lower);

        for (path, status) in touched {
            let flag = match self.targets.remove(&path) {
                Some(mut target) => {
                    let differs = target.last_status != status;
                    target.last_status = status;
                    next.insert(path, target);
                    differs
                }
                None => {
                    next.insert(
                        path,
                        CommitTarget {
                            last_status: status,
                            ..Default::default()
                        },
                    );
                    true
                }
            };
            changed.push(flag);
        }

        self.targets = next;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use stagetree_core::{StatusFlag, TreeConfig, TreePath};

    fn path(raw: &str) -> Result<TreePath> {
        Ok(TreeConfig::default().path(raw)?)
    }

    #[test]
    fn test_reconcile_creates_defaults() -> Result<()> {
        let mut table = CommitTargetTable::new();
        let a = path("a/x.txt")?;
        let changed = table.reconcile([(a.clone(), StatusFlag::Added.bit())]);
        assert_eq!(changed, vec![true]);
        let target = table.get(&a).unwrap();
        assert_eq!(target.selected, Selection::None);
        assert!(!target.discarded);
        Ok(())
    }

    #[test]
    fn test_reconcile_preserves_existing_state() -> Result<()> {
        let mut table = CommitTargetTable::new();
        let a = path("a/x.txt")?;
        table.reconcile([(a.clone(), StatusFlag::Added.bit())]);
        assert!(table.set_selected(&a, Selection::All));
        assert!(table.set_discarded(&a, true));

        // Unrelated rebuild touching the same path must not reset state
        let changed = table.reconcile([(a.clone(), StatusFlag::Added.bit())]);
        assert_eq!(changed, vec![false]);
        let target = table.get(&a).unwrap();
        assert_eq!(target.selected, Selection::All);
        assert!(target.discarded);
        Ok(())
    }

    #[test]
    fn test_reconcile_prunes_untouched_paths() -> Result<()> {
        let mut table = CommitTargetTable::new();
        let a = path("a/x.txt")?;
        let b = path("b/y.txt")?;
        table.reconcile([
            (a.clone(), StatusFlag::Added.bit()),
            (b.clone(), StatusFlag::Modified.bit()),
        ]);
        table.set_selected(&a, Selection::All);

        table.reconcile([(b.clone(), StatusFlag::Modified.bit())]);
        assert!(!table.contains(&a));
        assert!(table.contains(&b));
        assert_eq!(table.len(), 1);
        Ok(())
    }

    #[test]
    fn test_reconcile_reports_status_changes() -> Result<()> {
        let mut table = CommitTargetTable::new();
        let a = path("a/x.txt")?;
        table.reconcile([(a.clone(), StatusFlag::Added.bit())]);
        let changed = table.reconcile([(a.clone(), StatusFlag::Modified.bit())]);
        assert_eq!(changed, vec![true]);
        Ok(())
    }

    #[test]
    fn test_reconcile_empty_clears_table() -> Result<()> {
        let mut table = CommitTargetTable::new();
        table.reconcile([(path("a")?, StatusFlag::Added.bit())]);
        table.reconcile(std::iter::empty());
        assert!(table.is_empty());
        Ok(())
    }

    #[test]
    fn test_set_on_unknown_path_is_refused() -> Result<()> {
        let mut table = CommitTargetTable::new();
        assert!(!table.set_selected(&path("nope")?, Selection::All));
        assert!(!table.set_discarded(&path("nope")?, true));
        Ok(())
    }
}
