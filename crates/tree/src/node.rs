//! Arena-backed folder/file tree
//!
//! The tree is regenerated wholesale on every build; only the commit-target
//! table survives across builds. Nodes live in a flat arena and refer to each
//! other by index, so parent back-references are non-owning and the root
//! exclusively owns the subtree.

use ahash::AHashMap;
use stagetree_core::{StatusSet, TreePath};

/// Index of a node within its [`FileTree`] arena
///
/// Ids are only meaningful for the tree that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index < u32::MAX as usize);
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Folder or file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Folder,
    File,
}

/// One folder or file node
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Display label; a fold-merged node carries the concatenated segment
    /// chain (e.g. `a/sub`)
    pub name: String,
    path: Option<TreePath>,
    pub kind: NodeKind,
    /// Union of this subtree's file statuses
    pub status: StatusSet,
    /// For files, whether the change is staged
    pub staged: bool,
    /// Non-owning back-reference, for upward aggregation only
    pub parent: Option<NodeId>,
    /// Children in sorted path order
    pub children: Vec<NodeId>,
}

impl TreeNode {
    /// Full path of this node; `None` only for the root
    pub fn path(&self) -> Option<&TreePath> {
        self.path.as_ref()
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }
}

/// A fully built status tree
#[derive(Debug, Clone)]
pub struct FileTree {
    nodes: Vec<TreeNode>,
    root: NodeId,
    /// Path-keyed lookup into the arena (root excluded)
    index: AHashMap<TreePath, NodeId>,
}

impl FileTree {
    /// Create a tree holding only an empty root folder
    pub fn new() -> Self {
        let root = TreeNode {
            name: String::new(),
            path: None,
            kind: NodeKind::Folder,
            status: StatusSet::empty(),
            staged: false,
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            root: NodeId::new(0),
            index: AHashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a node
    ///
    /// Panics if `id` came from a different tree and is out of range.
    pub fn get(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.index()]
    }

    /// Find a node by path
    pub fn node_at(&self, path: &TreePath) -> Option<NodeId> {
        self.index.get(path).copied()
    }

    /// Number of nodes in the tree, root included
    pub fn len(&self) -> usize {
        self.index.len() + 1
    }

    /// True when only the root exists
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Append a node as the last child of `parent`
    ///
    /// Children must be attached in sorted path order; both builders walk
    /// their batch sorted, which guarantees this.
    pub(crate) fn push_node(
        &mut self,
        parent: NodeId,
        name: String,
        path: TreePath,
        kind: NodeKind,
        status: StatusSet,
        staged: bool,
    ) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(TreeNode {
            name,
            path: Some(path.clone()),
            kind,
            status,
            staged,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.index.insert(path, id);
        self.get_mut(parent).children.push(id);
        id
    }

    /// Replace a leaf's entry data in place, keeping its slot
    ///
    /// `path` must be key-equal to the node's current path; only the display
    /// spelling, status, and staged flag may differ.
    pub(crate) fn replace_leaf(
        &mut self,
        id: NodeId,
        path: TreePath,
        status: StatusSet,
        staged: bool,
    ) {
        debug_assert_eq!(self.get(id).path(), Some(&path));
        let node = self.get_mut(id);
        node.name = path.file_name().to_string();
        node.path = Some(path);
        node.status = status;
        node.staged = staged;
    }

    /// Merge a fold-eligible folder into its sole folder child
    ///
    /// The child absorbs the parent's slot in the grandparent's child list
    /// and takes the concatenated display name; the folded folder becomes an
    /// unreachable orphan in the arena and leaves the path index.
    pub(crate) fn merge_into_child(&mut self, folder: NodeId, child: NodeId) {
        debug_assert_eq!(self.get(folder).children, vec![child]);

        let grandparent = self.get(folder).parent;
        let merged_name = format!("{}/{}", self.get(folder).name, self.get(child).name);

        if let Some(gp) = grandparent {
            let slot = self
                .get(gp)
                .children
                .iter()
                .position(|&c| c == folder)
                .expect("folded folder attached to its parent");
            self.get_mut(gp).children[slot] = child;
        }

        if let Some(path) = self.get(folder).path().cloned() {
            self.index.remove(&path);
        }

        let node = self.get_mut(child);
        node.name = merged_name;
        node.parent = grandparent;

        let orphan = self.get_mut(folder);
        orphan.children.clear();
        orphan.parent = None;
    }

    /// Visit every node reachable from the root in pre-order, root excluded
    pub(crate) fn walk(&self, mut visit: impl FnMut(NodeId, usize)) {
        // (id, depth) pairs; children pushed in reverse to pop in order
        let mut stack: Vec<(NodeId, usize)> = self
            .get(self.root)
            .children
            .iter()
            .rev()
            .map(|&c| (c, 0))
            .collect();
        while let Some((id, depth)) = stack.pop() {
            visit(id, depth);
            for &c in self.get(id).children.iter().rev() {
                stack.push((c, depth + 1));
            }
        }
    }

    /// Pre-order snapshot of the tree, root excluded
    ///
    /// Used by the UI listing and by equivalence tests: two trees are
    /// structurally identical exactly when their flattened forms are equal.
    pub fn flatten(&self) -> Vec<FlatNode> {
        let mut out = Vec::with_capacity(self.len() - 1);
        self.walk(|id, depth| {
            let node = self.get(id);
            out.push(FlatNode {
                depth,
                name: node.name.clone(),
                path: node.path().cloned().expect("non-root node has a path"),
                kind: node.kind,
                status: node.status,
                staged: node.staged,
            });
        });
        out
    }
}

impl Default for FileTree {
    fn default() -> Self {
        Self::new()
    }
}

/// One row of a flattened tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatNode {
    /// Nesting depth below the root
    pub depth: usize,
    pub name: String,
    pub path: TreePath,
    pub kind: NodeKind,
    pub status: StatusSet,
    pub staged: bool,
}
