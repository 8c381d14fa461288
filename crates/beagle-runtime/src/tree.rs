//! Arena render tree.
//!
//! Nodes are addressed by [`NodeId`] and carry an explicit parent index, so
//! ancestry can be walked without any platform view objects. Ids are never
//! reused within one tree.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
struct NodeSlot {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct RenderTree {
    slots: Vec<Option<NodeSlot>>,
}

impl RenderTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.slots.len() as u32);
        self.slots.push(Some(NodeSlot {
            parent,
            children: Vec::new(),
        }));
        id
    }

    fn slot(&self, id: NodeId) -> Option<&NodeSlot> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut NodeSlot> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn add_root(&mut self) -> NodeId {
        self.alloc(None)
    }

    /// Adds a child under `parent`. Returns `None` if `parent` is not in the
    /// tree.
    pub fn add_child(&mut self, parent: NodeId) -> Option<NodeId> {
        self.slot(parent)?;
        let id = self.alloc(Some(parent));
        self.slot_mut(parent)?.children.push(id);
        Some(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slot(id).is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slot(id).map(|slot| slot.children.as_slice()).unwrap_or(&[])
    }

    /// The node itself, then its parent, up to the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.slot(id).map(|_| id);
        while let Some(node) = current {
            chain.push(node);
            current = self.parent(node);
        }
        chain
    }

    /// `node` and all of its descendants, parents before children.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if let Some(slot) = self.slot(node) {
                out.push(node);
                stack.extend(slot.children.iter().rev().copied());
            }
        }
        out
    }

    /// Detaches `id` from its parent and removes its whole subtree. Returns
    /// the removed ids.
    pub fn remove(&mut self, id: NodeId) -> Vec<NodeId> {
        let removed = self.subtree(id);
        if let Some(parent) = self.parent(id) {
            if let Some(slot) = self.slot_mut(parent) {
                slot.children.retain(|child| *child != id);
            }
        }
        for node in &removed {
            self.slots[node.index()] = None;
        }
        removed
    }

    /// Moves `id` under `new_parent`. Fails (returns `false`) when either node
    /// is missing or `new_parent` lies inside `id`'s subtree.
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) -> bool {
        if !self.contains(id) || self.ancestors(new_parent).contains(&id) || !self.contains(new_parent) {
            return false;
        }
        if let Some(old) = self.parent(id) {
            if let Some(slot) = self.slot_mut(old) {
                slot.children.retain(|child| *child != id);
            }
        }
        if let Some(slot) = self.slot_mut(new_parent) {
            slot.children.push(id);
        }
        if let Some(slot) = self.slot_mut(id) {
            slot.parent = Some(new_parent);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ancestors_start_at_node() {
        let mut tree = RenderTree::new();
        let root = tree.add_root();
        let a = tree.add_child(root).unwrap();
        let b = tree.add_child(a).unwrap();
        assert_eq!(tree.ancestors(b), vec![b, a, root]);
        assert_eq!(tree.children(root), &[a]);
    }

    #[test]
    fn remove_drops_subtree_without_reusing_ids() {
        let mut tree = RenderTree::new();
        let root = tree.add_root();
        let a = tree.add_child(root).unwrap();
        let b = tree.add_child(a).unwrap();
        let c = tree.add_child(root).unwrap();
        assert_eq!(tree.remove(a), vec![a, b]);
        assert!(!tree.contains(b));
        assert_eq!(tree.children(root), &[c]);
        assert!(tree.add_child(a).is_none());
        let d = tree.add_child(root).unwrap();
        assert_ne!(d, a);
    }

    #[test]
    fn reparent_refuses_cycles() {
        let mut tree = RenderTree::new();
        let root = tree.add_root();
        let a = tree.add_child(root).unwrap();
        let b = tree.add_child(a).unwrap();
        let c = tree.add_child(root).unwrap();
        assert!(!tree.reparent(a, b));
        assert!(tree.reparent(b, c));
        assert_eq!(tree.ancestors(b), vec![b, c, root]);
        assert_eq!(tree.children(a), &[] as &[NodeId]);
    }
}
