//! Rooted, ordered node tree used to hold parse results.
//!
//! Nodes live in an arena ([`Tree`]) and are addressed by [`NodeId`]. Parent
//! and sibling links are plain ids, so a node can be detached, moved or
//! replaced without any ownership gymnastics. Only the first-child chain is
//! structural; parent, left and right are navigation.
//!
//! Every node is either a *leaf* (non-empty value, no children) or a
//! *branch* (children, empty value). Mutators that would break this return
//! [`NodeError`] and leave the tree untouched.
//!
//! ```rust
//! use pegn::Tree;
//!
//! let mut tree = Tree::new();
//! let root = tree.new_node(0, "");
//! tree.add(root, 2, "some").unwrap();
//! assert_eq!(tree.to_json(root), r#"{"T":0,"N":[{"T":2,"V":"some"}]}"#);
//! ```

use alloc::{
    collections::{BTreeMap, VecDeque},
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};
use core::{fmt, mem};

use crate::NodeError;

mod json;

/// Handle to a node inside a [`Tree`]. Only meaningful for the tree that
/// issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena slot of the node.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
struct NodeData {
    kind: i32,
    value: String,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    first: Option<NodeId>,
    last: Option<NodeId>,
    count: usize,
}

/// Arena of nodes. A tree may hold any number of independent roots.
///
/// Methods taking a [`NodeId`] panic if the id was not issued by this tree
/// or was discarded by [`rollback`](Self::rollback).
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<NodeData>,
}

impl Tree {
    /// An empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes ever allocated and not rolled back, including
    /// detached ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no node has been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocates a standalone root with no parent and no children.
    pub fn new_node(&mut self, kind: i32, value: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            value: value.into(),
            ..NodeData::default()
        });
        id
    }

    /// Borrowed view of a node, for reading and serializing.
    #[must_use]
    pub fn get(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, id }
    }

    // ─── accessors ──────────────────────────────────────────────────────────

    /// Node type.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> i32 {
        self.nodes[id.0].kind
    }

    /// Text of a leaf, empty for branches.
    #[must_use]
    pub fn value(&self, id: NodeId) -> &str {
        &self.nodes[id.0].value
    }

    /// Parent, or `None` for a root.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Previous sibling.
    #[must_use]
    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].left
    }

    /// Next sibling.
    #[must_use]
    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].right
    }

    /// First child.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].first
    }

    /// Last child.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].last
    }

    /// Number of direct children, maintained on every mutation.
    #[must_use]
    pub fn count(&self, id: NodeId) -> usize {
        self.nodes[id.0].count
    }

    /// Direct children in sibling order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.nodes[id.0].first,
        }
    }

    /// Direct children collected into a list. Prefer [`count`](Self::count)
    /// when only the number is needed.
    #[must_use]
    pub fn nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).map(NodeRef::id).collect()
    }

    /// Canonical compact JSON for the subtree rooted at `id`.
    #[must_use]
    pub fn to_json(&self, id: NodeId) -> String {
        self.get(id).to_string()
    }

    /// Internal links of a node, for debugging.
    #[must_use]
    pub fn refs(&self, id: NodeId) -> String {
        let n = &self.nodes[id.0];
        let show = |link: Option<NodeId>| link.map_or_else(|| String::from("-"), |l| l.to_string());
        format!(
            "self:  {:<12} parent: {}\nleft:  {:<12} right:  {}\nfirst: {:<12} last:   {}",
            show(Some(id)),
            show(n.parent),
            show(n.left),
            show(n.right),
            show(n.first),
            show(n.last),
        )
    }

    /// Logs the subtree's JSON at debug level.
    pub fn log(&self, id: NodeId) {
        tracing::debug!(target: "pegn::node", node = %id, "{}", self.get(id));
    }

    // ─── mutation ───────────────────────────────────────────────────────────

    /// Changes the node's type in place.
    pub fn set_kind(&mut self, id: NodeId, kind: i32) {
        self.nodes[id.0].kind = kind;
    }

    /// Replaces the node's value.
    ///
    /// # Errors
    ///
    /// [`NodeError::ValueOnBranch`] if the node has children and `value` is
    /// not empty.
    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) -> Result<(), NodeError> {
        let value = value.into();
        let node = &mut self.nodes[id.0];
        if node.count > 0 && !value.is_empty() {
            return Err(NodeError::ValueOnBranch(id));
        }
        node.value = value;
        Ok(())
    }

    /// Resets the node to the untyped, empty state. Its children are
    /// detached and become standalone roots; its own place under its parent
    /// is kept.
    pub fn init(&mut self, id: NodeId) {
        while let Some(child) = self.nodes[id.0].first {
            self.cut(child);
        }
        let node = &mut self.nodes[id.0];
        node.kind = 0;
        node.value.clear();
    }

    /// Creates a node and appends it as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// [`NodeError::ChildUnderLeaf`] if `parent` carries a value.
    pub fn add(
        &mut self,
        parent: NodeId,
        kind: i32,
        value: impl Into<String>,
    ) -> Result<NodeId, NodeError> {
        self.check_branch(parent)?;
        let child = self.new_node(kind, value);
        self.link_last(parent, child);
        Ok(child)
    }

    /// Attaches an existing root as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// - [`NodeError::ChildUnderLeaf`] if `parent` carries a value.
    /// - [`NodeError::AlreadyAttached`] if `child` has a parent; cut it
    ///   first.
    /// - [`NodeError::Cycle`] if `child` is `parent` or one of its
    ///   ancestors.
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), NodeError> {
        self.check_branch(parent)?;
        if self.nodes[child.0].parent.is_some() {
            return Err(NodeError::AlreadyAttached(child));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(NodeError::Cycle { parent, child });
        }
        self.link_last(parent, child);
        Ok(())
    }

    /// Detaches `id` from its parent and siblings in O(1). The node keeps
    /// its own children and becomes a standalone root. Returns `id`.
    pub fn cut(&mut self, id: NodeId) -> NodeId {
        let NodeData {
            parent,
            left,
            right,
            ..
        } = self.nodes[id.0];
        if let Some(l) = left {
            self.nodes[l.0].right = right;
        }
        if let Some(r) = right {
            self.nodes[r.0].left = left;
        }
        if let Some(p) = parent {
            let p = &mut self.nodes[p.0];
            p.count -= 1;
            if p.first == Some(id) {
                p.first = right;
            }
            if p.last == Some(id) {
                p.last = left;
            }
        }
        let node = &mut self.nodes[id.0];
        node.parent = None;
        node.left = None;
        node.right = None;
        id
    }

    /// Moves every child of `donor` under `receiver`, after the receiver's
    /// existing children. `donor` ends with no children.
    ///
    /// Runs in O(k) for k moved children, not O(1): splicing the sibling
    /// chains and updating both counts is constant, but each moved child's
    /// parent link is rewritten. The cycle check adds O(depth of
    /// `receiver`).
    ///
    /// # Errors
    ///
    /// - [`NodeError::ChildUnderLeaf`] if `receiver` carries a value and
    ///   `donor` has children.
    /// - [`NodeError::Cycle`] if `receiver` lies inside one of the donor's
    ///   children.
    pub fn take(&mut self, receiver: NodeId, donor: NodeId) -> Result<(), NodeError> {
        if receiver == donor || self.nodes[donor.0].count == 0 {
            return Ok(());
        }
        self.check_branch(receiver)?;
        let mut up = receiver;
        while let Some(p) = self.nodes[up.0].parent {
            if p == donor {
                return Err(NodeError::Cycle {
                    parent: receiver,
                    child: up,
                });
            }
            up = p;
        }
        self.splice(receiver, donor);
        Ok(())
    }

    /// Deep-copies the subtree rooted at `id` into fresh nodes and returns
    /// the new root, which is standalone.
    ///
    /// The subtree is gathered breadth-first, every node is cloned, then
    /// each clone's links are rewired through an original-to-clone map.
    /// Links leaving the subtree (the root's parent and siblings) are
    /// dropped.
    pub fn copy(&mut self, id: NodeId) -> NodeId {
        let mut order = Vec::new();
        let mut queue = VecDeque::from([id]);
        while let Some(cur) = queue.pop_front() {
            order.push(cur);
            queue.extend(self.child_ids(cur));
        }

        let mut clones = BTreeMap::new();
        for orig in order {
            let clone = NodeId(self.nodes.len());
            self.nodes.push(self.nodes[orig.0].clone());
            clones.insert(orig, clone);
        }

        let remap = |link: Option<NodeId>| link.and_then(|l| clones.get(&l).copied());
        for (&orig, &clone) in &clones {
            let src = &self.nodes[orig.0];
            let links = (
                remap(src.parent),
                remap(src.left),
                remap(src.right),
                remap(src.first),
                remap(src.last),
            );
            let dst = &mut self.nodes[clone.0];
            (dst.parent, dst.left, dst.right, dst.first, dst.last) = links;
        }
        clones.get(&id).copied().unwrap_or(id)
    }

    /// Rebuilds `target` in place as a copy of `source`: same kind, same
    /// value, and an independent deep copy of the source's children.
    ///
    /// `target` keeps its id and its position under its own parent, so
    /// outside references to it stay valid. Its previous children are
    /// detached and become standalone roots. `source` is not modified,
    /// and may be `target` itself or any node related to it.
    pub fn morph(&mut self, target: NodeId, source: NodeId) {
        let copy = self.copy(source);
        while let Some(child) = self.nodes[target.0].first {
            self.cut(child);
        }
        let kind = self.nodes[copy.0].kind;
        let value = mem::take(&mut self.nodes[copy.0].value);
        let node = &mut self.nodes[target.0];
        node.kind = kind;
        node.value = value;
        self.splice(target, copy);
    }

    // ─── traversal ──────────────────────────────────────────────────────────

    /// Visits `id` and its descendants level by level, children left to
    /// right.
    pub fn walk_levels<'a>(&'a self, id: NodeId, mut visit: impl FnMut(NodeRef<'a>)) {
        let mut queue = VecDeque::from([id]);
        while let Some(cur) = queue.pop_front() {
            queue.extend(self.child_ids(cur));
            visit(self.get(cur));
        }
    }

    /// Visits `id` and its descendants depth-first, each node before its
    /// children, children left to right.
    pub fn walk_deep_pre<'a>(&'a self, id: NodeId, mut visit: impl FnMut(NodeRef<'a>)) {
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let mut child = self.nodes[cur.0].last;
            while let Some(c) = child {
                stack.push(c);
                child = self.nodes[c.0].left;
            }
            visit(self.get(cur));
        }
    }

    // ─── checkpoints ────────────────────────────────────────────────────────

    /// Marks the current arena size for a later [`rollback`](Self::rollback).
    #[must_use]
    pub fn checkpoint(&self) -> usize {
        self.nodes.len()
    }

    /// Discards every node allocated since `checkpoint`.
    ///
    /// Older nodes that were attached to discarded ones are detached first:
    /// a discarded node is cut from an older parent, and older children of a
    /// discarded node become standalone roots. Other edits made since the
    /// checkpoint are not undone.
    pub fn rollback(&mut self, checkpoint: usize) {
        for idx in (checkpoint..self.nodes.len()).rev() {
            let id = NodeId(idx);
            for child in self.child_ids(id).collect::<Vec<_>>() {
                if child.0 < checkpoint {
                    self.cut(child);
                }
            }
            if self.nodes[idx].parent.is_some_and(|p| p.0 < checkpoint) {
                self.cut(id);
            }
        }
        self.nodes.truncate(checkpoint);
    }

    // ─── internals ──────────────────────────────────────────────────────────

    fn check_branch(&self, id: NodeId) -> Result<(), NodeError> {
        if self.nodes[id.0].value.is_empty() {
            Ok(())
        } else {
            Err(NodeError::ChildUnderLeaf(id))
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.nodes[id.0].parent {
                Some(p) => id = p,
                None => return false,
            }
        }
    }

    fn child_ids(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).map(NodeRef::id)
    }

    fn link_last(&mut self, parent: NodeId, child: NodeId) {
        let last = self.nodes[parent.0].last;
        let node = &mut self.nodes[child.0];
        node.parent = Some(parent);
        node.left = last;
        node.right = None;
        match last {
            Some(l) => self.nodes[l.0].right = Some(child),
            None => self.nodes[parent.0].first = Some(child),
        }
        let p = &mut self.nodes[parent.0];
        p.last = Some(child);
        p.count += 1;
    }

    fn splice(&mut self, receiver: NodeId, donor: NodeId) {
        let Some(first) = self.nodes[donor.0].first else {
            return;
        };
        let mut child = Some(first);
        while let Some(c) = child {
            self.nodes[c.0].parent = Some(receiver);
            child = self.nodes[c.0].right;
        }

        let donor_node = &mut self.nodes[donor.0];
        let last = donor_node.last.take();
        let moved = mem::take(&mut donor_node.count);
        donor_node.first = None;

        match self.nodes[receiver.0].last {
            Some(tail) => {
                self.nodes[tail.0].right = Some(first);
                self.nodes[first.0].left = Some(tail);
            }
            None => self.nodes[receiver.0].first = Some(first),
        }
        let r = &mut self.nodes[receiver.0];
        r.last = last;
        r.count += moved;
    }
}

/// Read-only view of one node and the tree it lives in.
///
/// `Display` renders the subtree as canonical compact JSON.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    /// Arena handle of this node.
    #[must_use]
    pub fn id(self) -> NodeId {
        self.id
    }

    /// The tree the node lives in.
    #[must_use]
    pub fn tree(self) -> &'a Tree {
        self.tree
    }

    /// Node type.
    #[must_use]
    pub fn kind(self) -> i32 {
        self.tree.kind(self.id)
    }

    /// Text of a leaf, empty for branches.
    #[must_use]
    pub fn value(self) -> &'a str {
        self.tree.value(self.id)
    }

    /// Number of direct children.
    #[must_use]
    pub fn count(self) -> usize {
        self.tree.count(self.id)
    }

    /// View of the parent node.
    #[must_use]
    pub fn parent(self) -> Option<NodeRef<'a>> {
        self.tree.parent(self.id).map(|p| self.tree.get(p))
    }

    /// Direct children, first to last.
    #[must_use]
    pub fn children(self) -> Children<'a> {
        self.tree.children(self.id)
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("value", &self.value())
            .field("count", &self.count())
            .finish()
    }
}

/// Iterator over a node's direct children, left to right.
#[derive(Debug, Clone)]
pub struct Children<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl<'a> Iterator for Children<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.tree.nodes[id.0].right;
        Some(self.tree.get(id))
    }
}

#[cfg(test)]
mod tests;
