use std::collections::HashMap;
use std::fmt;

use generational_arena::{Arena, Index};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Stable row identifier, allocated monotonically and never reused by one arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tree node in the arena-based hierarchy.
#[derive(Debug)]
pub struct TreeNode<P> {
    pub id: NodeId,
    /// Text shown in the row's label cell
    pub label: String,
    /// Parent node, None for children of the hidden root
    pub parent: Option<NodeId>,
    /// Child ids in display order
    pub children: Vec<NodeId>,
    /// 0 for root children, parent depth + 1 otherwise
    pub depth: usize,
    pub payload: P,
}

/// Arena-based tree with a hidden root.
///
/// Storage lives in a generational arena; callers only ever see `NodeId`s, which come
/// from a monotonic counter so that an id released by `remove` is never handed out again.
#[derive(Debug)]
pub struct TreeArena<P> {
    arena: Arena<TreeNode<P>>,
    index: HashMap<NodeId, Index>,
    roots: Vec<NodeId>,
    next_id: u64,
}

impl<P> Default for TreeArena<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> TreeArena<P> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            index: HashMap::new(),
            roots: Vec::new(),
            next_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Children of the hidden root, in display order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode<P>> {
        self.index.get(&id).and_then(|&idx| self.arena.get(idx))
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut TreeNode<P>> {
        let idx = *self.index.get(&id)?;
        self.arena.get_mut(idx)
    }

    /// Insert a node under `parent` at `position`.
    ///
    /// An unknown parent falls back to the root. A missing or out-of-range position appends.
    #[instrument(level = "trace", skip(self, label, payload))]
    pub fn insert(
        &mut self,
        label: impl Into<String>,
        payload: P,
        parent: Option<NodeId>,
        position: Option<usize>,
    ) -> NodeId {
        let parent = parent.filter(|p| {
            let known = self.contains(*p);
            if !known {
                debug!("insert: unknown parent {}, using root", p);
            }
            known
        });
        let depth = parent
            .and_then(|p| self.get(p))
            .map(|p| p.depth + 1)
            .unwrap_or(0);

        let id = NodeId(self.next_id);
        self.next_id += 1;

        let node = TreeNode {
            id,
            label: label.into(),
            parent,
            children: Vec::new(),
            depth,
            payload,
        };
        let idx = self.arena.insert(node);
        self.index.insert(id, idx);
        self.attach(id, parent, position);
        id
    }

    /// Remove a node and its whole subtree, returning the node's payload.
    #[instrument(level = "trace", skip(self))]
    pub fn remove(&mut self, id: NodeId) -> Option<P> {
        let parent = self.get(id)?.parent;
        self.detach(id, parent);

        let mut stack = vec![id];
        let mut payload = None;
        while let Some(current) = stack.pop() {
            if let Some(idx) = self.index.remove(&current) {
                if let Some(node) = self.arena.remove(idx) {
                    stack.extend(node.children.iter().copied());
                    if current == id {
                        payload = Some(node.payload);
                    }
                }
            }
        }
        payload
    }

    /// Move a node to a new parent and position.
    ///
    /// Refuses unknown ids and moves that would put a node below itself.
    #[instrument(level = "trace", skip(self))]
    pub fn reparent(&mut self, id: NodeId, parent: Option<NodeId>, position: Option<usize>) -> bool {
        let Some(old_parent) = self.get(id).map(|n| n.parent) else {
            return false;
        };
        if let Some(p) = parent {
            if !self.contains(p) || self.is_descendant_or_self(p, id) {
                debug!("reparent: refusing to move {} below {}", id, p);
                return false;
            }
        }

        self.detach(id, old_parent);
        if let Some(node) = self.get_mut(id) {
            node.parent = parent;
        }
        self.attach(id, parent, position);
        self.update_depths(id);
        true
    }

    /// Pre-order walk over every node, ignoring expansion.
    pub fn iter(&self) -> TreeIterator<'_, P> {
        TreeIterator::new(self)
    }

    /// Number of levels in the tree, 0 when empty.
    pub fn height(&self) -> usize {
        self.iter().map(|n| n.depth + 1).max().unwrap_or(0)
    }

    fn is_descendant_or_self(&self, candidate: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(candidate);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.get(c).and_then(|n| n.parent);
        }
        false
    }

    fn siblings_mut(&mut self, parent: Option<NodeId>) -> Option<&mut Vec<NodeId>> {
        match parent {
            Some(p) => self.get_mut(p).map(|n| &mut n.children),
            None => Some(&mut self.roots),
        }
    }

    fn attach(&mut self, id: NodeId, parent: Option<NodeId>, position: Option<usize>) {
        if let Some(siblings) = self.siblings_mut(parent) {
            match position {
                Some(pos) if pos <= siblings.len() => siblings.insert(pos, id),
                _ => siblings.push(id),
            }
        }
    }

    fn detach(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(siblings) = self.siblings_mut(parent) {
            siblings.retain(|&c| c != id);
        }
    }

    fn update_depths(&mut self, id: NodeId) {
        let base = self
            .get(id)
            .and_then(|n| n.parent)
            .and_then(|p| self.get(p))
            .map(|p| p.depth + 1)
            .unwrap_or(0);
        let mut stack = vec![(id, base)];
        while let Some((current, depth)) = stack.pop() {
            if let Some(node) = self.get_mut(current) {
                node.depth = depth;
                let children = node.children.clone();
                stack.extend(children.into_iter().map(|c| (c, depth + 1)));
            }
        }
    }
}

pub struct TreeIterator<'a, P> {
    arena: &'a TreeArena<P>,
    stack: Vec<NodeId>,
}

impl<'a, P> TreeIterator<'a, P> {
    fn new(arena: &'a TreeArena<P>) -> Self {
        let stack = arena.roots.iter().rev().copied().collect();
        Self { arena, stack }
    }
}

impl<'a, P> Iterator for TreeIterator<'a, P> {
    type Item = &'a TreeNode<P>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.arena.get(current) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev().copied());
                return Some(node);
            }
        }
        None
    }
}
