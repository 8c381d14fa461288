//! Short-lived contexts created by events (`onPress`, `onSuccess`, ...).
//!
//! They are looked up by the identity of the node that fired the event, not
//! through the render-tree ancestry.

use crate::tree::NodeId;
use beagle_context::ContextData;
use std::rc::Rc;

/// Identity of whatever produced an implicit context, usually the action
/// list of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SenderId(usize);

impl SenderId {
    pub fn new(raw: usize) -> Self {
        Self(raw)
    }

    /// Identity of a shared value: two handles to the same allocation give
    /// the same id.
    pub fn of<T: ?Sized>(value: &Rc<T>) -> Self {
        Self(Rc::as_ptr(value) as *const () as usize)
    }
}

#[derive(Debug, Clone)]
struct ImplicitContext {
    sender: SenderId,
    context: ContextData,
    caller: NodeId,
}

#[derive(Debug, Clone, Default)]
pub struct ImplicitContextManager {
    entries: Vec<ImplicitContext>,
}

impl ImplicitContextManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any entry from the same sender and any entry with the same
    /// caller and context id, then appends.
    pub fn add(&mut self, context: ContextData, sender: SenderId, caller: NodeId) {
        self.entries.retain(|entry| {
            entry.sender != sender && !(entry.caller == caller && entry.context.id() == context.id())
        });
        self.entries.push(ImplicitContext {
            sender,
            context,
            caller,
        });
    }

    /// Contexts whose caller is exactly `node`, oldest first.
    pub fn get_for_node(&self, node: NodeId) -> Vec<ContextData> {
        self.entries
            .iter()
            .filter(|entry| entry.caller == node)
            .map(|entry| entry.context.clone())
            .collect()
    }

    pub fn remove_node(&mut self, node: NodeId) {
        self.entries.retain(|entry| entry.caller != node);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
