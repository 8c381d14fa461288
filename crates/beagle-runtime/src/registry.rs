//! Context binding registry.
//!
//! Contexts are attached to nodes of a [`RenderTree`]. A bound property
//! subscribes with its expression; the registry resolves every context id the
//! expression reads against the nearest node (itself first, then ancestors)
//! holding a context with that id, with the global context as the last
//! resort. Subscribers whose contexts are not attached yet wait in a pending
//! queue that is retried whenever a context is installed.
//!
//! Observers are never called while the registry is borrowed, so they may
//! call back into it.

use crate::cache::EvaluationCache;
use crate::config::RuntimeConfig;
use crate::global::{GlobalContext, GlobalContextObserver, ObserverId};
use crate::implicit::{ImplicitContextManager, SenderId};
use crate::tree::{NodeId, RenderTree};
use beagle_context::{get, ContextData, ContextSetResult, NavigationContext, GLOBAL_CONTEXT_ID};
use beagle_expression::util::str_val;
use beagle_expression::{
    evaluate, operations_map, register_operation, Bind, BindingToken, ContextResolver,
    EmptyResolver, OperationDefinition, OperationMap, ParsedExpression,
};
use indexmap::{IndexMap, IndexSet};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};
use std::sync::Arc;
use tracing::{debug, warn};

/// Id under which a received [`NavigationContext`] is installed.
pub const NAVIGATION_CONTEXT_ID: &str = "navigationContext";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

/// Payload of a context mutation requested by an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetContextInternal {
    pub context_id: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

type Observer = Rc<RefCell<dyn FnMut(Option<Value>)>>;
type Notification = (Observer, Option<Value>);

struct ContextBinding {
    context: ContextData,
    bindings: IndexSet<SubscriberId>,
    cache: EvaluationCache,
}

impl ContextBinding {
    fn new(context: ContextData, capacity: usize) -> Self {
        Self {
            context,
            bindings: IndexSet::new(),
            cache: EvaluationCache::new(capacity),
        }
    }
}

struct Subscriber {
    node: NodeId,
    expression: Arc<ParsedExpression>,
    observer: Observer,
}

struct RegistryState {
    config: RuntimeConfig,
    operations: OperationMap,
    tree: RenderTree,
    contexts: HashMap<NodeId, IndexMap<String, ContextBinding>>,
    subscribers: HashMap<SubscriberId, Subscriber>,
    next_subscriber_id: u64,
    unlinked: HashMap<NodeId, Vec<SubscriberId>>,
    pending: Vec<SubscriberId>,
    global_bindings: IndexSet<SubscriberId>,
    global_cache: EvaluationCache,
    implicit: ImplicitContextManager,
}

/// Resolves binding tokens for one evaluation: implicit contexts first, then
/// the node chain, then global. Reads through a context's cache.
struct ScopeResolver<'a> {
    contexts: &'a mut HashMap<NodeId, IndexMap<String, ContextBinding>>,
    chain: &'a [NodeId],
    implicit: &'a [ContextData],
    global: &'a ContextData,
    global_cache: &'a mut EvaluationCache,
}

fn cached_read(cache: &mut EvaluationCache, context: &ContextData, token: &BindingToken) -> Value {
    let key = token.cache_key();
    if let Some(value) = cache.get(&key) {
        return value.clone();
    }
    let value = get(context.value(), &token.path).cloned().unwrap_or(Value::Null);
    cache.insert(key, value.clone());
    value
}

impl ContextResolver for ScopeResolver<'_> {
    fn resolve(&mut self, token: &BindingToken) -> Option<Value> {
        if let Some(context) = self.implicit.iter().rev().find(|ctx| ctx.id() == token.context_id) {
            return Some(get(context.value(), &token.path).cloned().unwrap_or(Value::Null));
        }
        for node in self.chain {
            let binding = self
                .contexts
                .get_mut(node)
                .and_then(|contexts| contexts.get_mut(&token.context_id));
            if let Some(binding) = binding {
                return Some(cached_read(&mut binding.cache, &binding.context, token));
            }
        }
        if token.context_id == GLOBAL_CONTEXT_ID {
            return Some(cached_read(self.global_cache, self.global, token));
        }
        None
    }
}

impl RegistryState {
    fn nearest(&self, chain: &[NodeId], context_id: &str) -> Option<NodeId> {
        chain.iter().copied().find(|node| {
            self.contexts
                .get(node)
                .is_some_and(|contexts| contexts.contains_key(context_id))
        })
    }

    fn evaluate_in_scope(
        &mut self,
        expression: &ParsedExpression,
        chain: &[NodeId],
        implicit: &[ContextData],
        global: &ContextData,
    ) -> Option<Value> {
        let RegistryState {
            contexts,
            global_cache,
            operations,
            ..
        } = self;
        let mut resolver = ScopeResolver {
            contexts,
            chain,
            implicit,
            global,
            global_cache,
        };
        match evaluate(expression, &mut resolver, operations) {
            Ok(value) => value,
            Err(err) => {
                warn!(expression = expression.source(), error = %err, "expression evaluation failed");
                None
            }
        }
    }

    fn evaluate_subscriber(&mut self, id: SubscriberId, global: &ContextData) -> Option<Notification> {
        let subscriber = self.subscribers.get(&id)?;
        let expression = Arc::clone(&subscriber.expression);
        let observer = Rc::clone(&subscriber.observer);
        let chain = self.tree.ancestors(subscriber.node);
        let value = self.evaluate_in_scope(&expression, &chain, &[], global);
        Some((observer, value))
    }

    /// Links the subscriber into every context it reads and evaluates it.
    /// `None` when some context id is not visible from its node yet.
    fn try_link(&mut self, id: SubscriberId, global: &ContextData) -> Option<Notification> {
        let subscriber = self.subscribers.get(&id)?;
        if !self.tree.contains(subscriber.node) {
            return None;
        }
        let chain = self.tree.ancestors(subscriber.node);
        let mut targets = Vec::new();
        for context_id in subscriber.expression.context_ids() {
            match self.nearest(&chain, context_id) {
                Some(node) => targets.push(Some((node, context_id.to_string()))),
                None if context_id == GLOBAL_CONTEXT_ID => targets.push(None),
                None => return None,
            }
        }
        for target in targets {
            match target {
                Some((node, context_id)) => {
                    if let Some(binding) = self
                        .contexts
                        .get_mut(&node)
                        .and_then(|contexts| contexts.get_mut(&context_id))
                    {
                        binding.bindings.insert(id);
                    }
                }
                None => {
                    self.global_bindings.insert(id);
                }
            }
        }
        self.evaluate_subscriber(id, global)
    }

    fn queue_pending(&mut self, id: SubscriberId) {
        if self.pending.contains(&id) {
            return;
        }
        if let Some(subscriber) = self.subscribers.get(&id) {
            if self.config.warn_unresolved_bindings {
                warn!(node = %subscriber.node, expression = subscriber.expression.source(), "binding has no context yet");
            } else {
                debug!(node = %subscriber.node, expression = subscriber.expression.source(), "binding has no context yet");
            }
        }
        self.pending.push(id);
    }

    /// Unsubscribes `id` from every context it was linked to.
    fn detach(&mut self, id: SubscriberId) {
        for contexts in self.contexts.values_mut() {
            for binding in contexts.values_mut() {
                binding.bindings.shift_remove(&id);
            }
        }
        self.global_bindings.shift_remove(&id);
    }

    fn drop_subscriber(&mut self, id: SubscriberId) {
        self.detach(id);
        self.subscribers.remove(&id);
        self.pending.retain(|pending| *pending != id);
    }

    /// Re-resolves the linked subscribers in `root`'s subtree, limited to
    /// those reading `context_id` when one is given. A nearer context may now
    /// shadow the one they were linked to.
    fn relink_under(&mut self, root: NodeId, context_id: Option<&str>, global: &ContextData) -> Vec<Notification> {
        let nodes: HashSet<NodeId> = self.tree.subtree(root).into_iter().collect();
        let mut ids: Vec<SubscriberId> = self
            .subscribers
            .iter()
            .filter(|(id, subscriber)| {
                nodes.contains(&subscriber.node)
                    && !self.pending.contains(id)
                    && !self
                        .unlinked
                        .get(&subscriber.node)
                        .is_some_and(|unlinked| unlinked.contains(id))
                    && context_id.map_or(true, |wanted| {
                        subscriber.expression.context_ids().contains(&wanted)
                    })
            })
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        let mut notifications = Vec::new();
        for id in ids {
            self.detach(id);
            match self.try_link(id, global) {
                Some(notification) => notifications.push(notification),
                None => self.queue_pending(id),
            }
        }
        notifications
    }

    fn link_pending(&mut self, global: &ContextData) -> Vec<Notification> {
        let mut notifications = Vec::new();
        let mut still_pending = Vec::new();
        for id in std::mem::take(&mut self.pending) {
            if !self.subscribers.contains_key(&id) {
                continue;
            }
            match self.try_link(id, global) {
                Some(notification) => {
                    debug!(subscriber = id.0, "pending binding linked");
                    notifications.push(notification);
                }
                None => still_pending.push(id),
            }
        }
        self.pending = still_pending;
        notifications
    }
}

fn dispatch(notifications: Vec<Notification>) {
    for (observer, value) in notifications {
        match observer.try_borrow_mut() {
            Ok(mut callback) => (&mut *callback)(value),
            Err(_) => warn!("observer is already running; nested notification dropped"),
        }
    }
}

/// Converts an evaluated value to a property type. Text is also tried as
/// JSON (`"30"` fits an integer) and scalars as text (`30` fits a string).
fn convert<T: DeserializeOwned>(value: Option<Value>) -> Option<T> {
    let value = value?;
    match serde_json::from_value::<T>(value.clone()) {
        Ok(converted) => Some(converted),
        Err(err) => {
            let retry = match &value {
                Value::String(text) => serde_json::from_str::<T>(text).ok(),
                Value::Array(_) | Value::Object(_) => None,
                scalar => serde_json::from_value::<T>(Value::String(str_val(scalar))).ok(),
            };
            if retry.is_none() {
                warn!(error = %err, %value, "bound value does not fit the property type");
            }
            retry
        }
    }
}

struct RegistryGlobalObserver {
    state: Weak<RefCell<RegistryState>>,
}

impl GlobalContextObserver for RegistryGlobalObserver {
    fn on_global_changed(&self, context: &ContextData) {
        let Some(state) = self.state.upgrade() else {
            return;
        };
        let notifications = {
            let Ok(mut state) = state.try_borrow_mut() else {
                warn!("global context changed while the registry was busy");
                return;
            };
            state.global_cache.evict_all();
            let ids: Vec<_> = state.global_bindings.iter().copied().collect();
            let notifications: Vec<_> = ids
                .into_iter()
                .filter_map(|id| state.evaluate_subscriber(id, context))
                .collect();
            notifications
        };
        dispatch(notifications);
    }
}

/// Registry of contexts and bound properties for one screen's render tree.
///
/// Registers one observer on the global context for its lifetime.
pub struct BindingRegistry {
    state: Rc<RefCell<RegistryState>>,
    global: GlobalContext,
    global_observer: Cell<Option<ObserverId>>,
}

impl std::fmt::Debug for BindingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("BindingRegistry")
            .field("nodes_with_contexts", &state.contexts.len())
            .field("subscribers", &state.subscribers.len())
            .field("pending", &state.pending.len())
            .finish()
    }
}

impl BindingRegistry {
    pub fn new(global: GlobalContext) -> Self {
        Self::with_config(global, RuntimeConfig::default())
    }

    pub fn with_config(global: GlobalContext, config: RuntimeConfig) -> Self {
        let capacity = config.cache_capacity;
        let state = Rc::new(RefCell::new(RegistryState {
            config,
            operations: operations_map(),
            tree: RenderTree::new(),
            contexts: HashMap::new(),
            subscribers: HashMap::new(),
            next_subscriber_id: 1,
            unlinked: HashMap::new(),
            pending: Vec::new(),
            global_bindings: IndexSet::new(),
            global_cache: EvaluationCache::new(capacity),
            implicit: ImplicitContextManager::new(),
        }));
        let observer = RegistryGlobalObserver {
            state: Rc::downgrade(&state),
        };
        let observer_id = global.add_observer(Rc::new(observer));
        Self {
            state,
            global,
            global_observer: Cell::new(Some(observer_id)),
        }
    }

    pub fn global(&self) -> &GlobalContext {
        &self.global
    }

    /// Adds a host operation, or replaces a built-in one.
    pub fn register_operation(&self, definition: OperationDefinition) {
        register_operation(&mut self.state.borrow_mut().operations, definition);
    }

    // ------------------------------------------------------------------ Tree

    pub fn add_root(&self) -> NodeId {
        self.state.borrow_mut().tree.add_root()
    }

    pub fn add_child(&self, parent: NodeId) -> Option<NodeId> {
        self.state.borrow_mut().tree.add_child(parent)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.state.borrow().tree.parent(node)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.state.borrow().tree.contains(node)
    }

    /// Moves `node` under `new_parent`. Bindings in the moved subtree resolve
    /// again against their new ancestors, and pending bindings are retried.
    pub fn reparent(&self, node: NodeId, new_parent: NodeId) -> bool {
        let global = self.global.context();
        let notifications = {
            let mut state = self.state.borrow_mut();
            if !state.tree.reparent(node, new_parent) {
                return false;
            }
            state.relink_under(node, None, &global)
        };
        dispatch(notifications);
        self.try_link_pending();
        true
    }

    // -------------------------------------------------------------- Contexts

    /// Attaches `context` to `node`.
    ///
    /// Re-adding an id the node already holds keeps its subscribers and only
    /// refreshes the value, unless `override_existing` is set, in which case
    /// a fresh binding is installed and the old subscribers resolve again.
    /// The reserved `"global"` id is refused.
    pub fn add_context(&self, node: NodeId, context: ContextData, override_existing: bool) {
        if context.id() == GLOBAL_CONTEXT_ID {
            warn!(%node, "context id \"global\" is reserved; context not installed");
            return;
        }
        let global = self.global.context();
        let notifications = {
            let mut state = self.state.borrow_mut();
            if !state.tree.contains(node) {
                warn!(%node, context_id = context.id(), "cannot add a context to a node outside the tree");
                return;
            }
            let capacity = state.config.cache_capacity;
            let contexts = state.contexts.entry(node).or_default();
            let notifications: Vec<Notification> = match contexts.get_mut(context.id()) {
                Some(existing) if !override_existing => {
                    let changed = existing.context != context;
                    existing.context = context;
                    existing.cache.evict_all();
                    let ids: Vec<_> = if changed {
                        existing.bindings.iter().copied().collect()
                    } else {
                        Vec::new()
                    };
                    ids.into_iter()
                        .filter_map(|id| state.evaluate_subscriber(id, &global))
                        .collect()
                }
                _ => {
                    let id = context.id().to_string();
                    let previous = contexts.insert(id.clone(), ContextBinding::new(context, capacity));
                    match previous {
                        Some(previous) => {
                            for subscriber in previous.bindings {
                                state.detach(subscriber);
                                state.queue_pending(subscriber);
                            }
                            Vec::new()
                        }
                        None => state.relink_under(node, Some(&id), &global),
                    }
                }
            };
            notifications
        };
        dispatch(notifications);
        self.try_link_pending();
    }

    /// Context `context_id` as attached to `node` itself.
    pub fn context_on(&self, node: NodeId, context_id: &str) -> Option<ContextData> {
        let state = self.state.borrow();
        let binding = state.contexts.get(&node)?.get(context_id)?;
        Some(binding.context.clone())
    }

    /// Every context visible from `node`, nearest first: the node's own, then
    /// each ancestor's, then the global context.
    pub fn get_all_parent_contexts(&self, node: NodeId) -> Vec<ContextData> {
        let state = self.state.borrow();
        let mut out: Vec<ContextData> = state
            .tree
            .ancestors(node)
            .iter()
            .filter_map(|ancestor| state.contexts.get(ancestor))
            .flat_map(|contexts| contexts.values().map(|binding| binding.context.clone()))
            .collect();
        out.push(self.global.context());
        out
    }

    /// Applies an action's mutation to the nearest context `context_id`
    /// visible from `origin`, or to the global context. Returns whether
    /// anything changed; failures are logged.
    pub fn update_context(&self, origin: NodeId, update: SetContextInternal) -> bool {
        let SetContextInternal {
            context_id,
            value,
            path,
        } = update;
        if context_id == GLOBAL_CONTEXT_ID {
            return self.global.set(value, path.as_deref()).is_succeed();
        }
        let global = self.global.context();
        let notifications = {
            let mut state = self.state.borrow_mut();
            let chain = state.tree.ancestors(origin);
            let Some(owner) = state.nearest(&chain, &context_id) else {
                warn!(%origin, %context_id, "no context with this id is visible from the node");
                return false;
            };
            let Some(binding) = state
                .contexts
                .get_mut(&owner)
                .and_then(|contexts| contexts.get_mut(&context_id))
            else {
                return false;
            };
            match binding.context.set(path.as_deref(), value) {
                ContextSetResult::Succeed(next) => {
                    binding.context = next;
                    binding.cache.evict_all();
                    let ids: Vec<_> = binding.bindings.iter().copied().collect();
                    ids.into_iter()
                        .filter_map(|id| state.evaluate_subscriber(id, &global))
                        .collect::<Vec<_>>()
                }
                failure => {
                    warn!(%context_id, path = ?path, result = ?failure, "context update failed");
                    return false;
                }
            }
        };
        dispatch(notifications);
        true
    }

    /// Installs a context received through navigation on `node` under
    /// [`NAVIGATION_CONTEXT_ID`], at `navigation.path` when one is given.
    pub fn apply_navigation_context(&self, node: NodeId, navigation: NavigationContext) {
        let current = self
            .context_on(node, NAVIGATION_CONTEXT_ID)
            .unwrap_or_else(|| ContextData::from_value(NAVIGATION_CONTEXT_ID, Value::Object(Map::new())));
        match current.set(navigation.path.as_deref(), navigation.value) {
            ContextSetResult::Succeed(next) => self.add_context(node, next, false),
            failure => warn!(%node, result = ?failure, "navigation context could not be applied"),
        }
    }

    // ------------------------------------------------------------- Bindings

    /// Subscribes `observer` to a bound property of `node`.
    ///
    /// Constants are delivered at once. Expressions without lookups are
    /// evaluated once and delivered. Anything else is delivered as soon as all
    /// of its contexts are visible, and again after each change to them.
    pub fn observe_bind_changes<T, F>(&self, node: NodeId, bind: &Bind<T>, mut observer: F) -> Option<SubscriberId>
    where
        T: DeserializeOwned + Clone + 'static,
        F: FnMut(Option<T>) + 'static,
    {
        let expression = match bind {
            Bind::Value(value) => {
                observer(Some(value.clone()));
                return None;
            }
            Bind::Expression(expression) => Arc::clone(expression.parsed()),
        };
        if expression.binding_tokens().is_empty() {
            let value = {
                let state = self.state.borrow();
                match evaluate(&expression, &mut EmptyResolver, &state.operations) {
                    Ok(value) => value,
                    Err(err) => {
                        warn!(expression = expression.source(), error = %err, "expression evaluation failed");
                        None
                    }
                }
            };
            observer(convert(value));
            return None;
        }
        let callback: Observer = Rc::new(RefCell::new(move |value: Option<Value>| observer(convert(value))));
        let id = {
            let mut state = self.state.borrow_mut();
            let id = SubscriberId(state.next_subscriber_id);
            state.next_subscriber_id += 1;
            state.subscribers.insert(
                id,
                Subscriber {
                    node,
                    expression,
                    observer: callback,
                },
            );
            state.unlinked.entry(node).or_default().push(id);
            id
        };
        self.link_bindings_to_context_and_evaluate_them(node);
        Some(id)
    }

    /// Links the not-yet-linked subscribers of `node`. Those whose contexts
    /// are missing go to the pending queue.
    pub fn link_bindings_to_context_and_evaluate_them(&self, node: NodeId) {
        let global = self.global.context();
        let notifications = {
            let mut state = self.state.borrow_mut();
            let ids = state.unlinked.remove(&node).unwrap_or_default();
            let mut notifications = Vec::new();
            for id in ids {
                match state.try_link(id, &global) {
                    Some(notification) => notifications.push(notification),
                    None => state.queue_pending(id),
                }
            }
            notifications
        };
        dispatch(notifications);
    }

    /// Retries every pending subscriber. Each fires once when it links.
    pub fn try_link_pending(&self) {
        let global = self.global.context();
        let notifications = self.state.borrow_mut().link_pending(&global);
        dispatch(notifications);
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        let mut state = self.state.borrow_mut();
        state.drop_subscriber(id);
        for ids in state.unlinked.values_mut() {
            ids.retain(|unlinked| *unlinked != id);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.borrow().subscribers.len()
    }

    pub fn pending_count(&self) -> usize {
        self.state.borrow().pending.len()
    }

    // ------------------------------------------------------- Implicit/actions

    pub fn add_implicit_context(&self, context: ContextData, sender: SenderId, caller: NodeId) {
        self.state.borrow_mut().implicit.add(context, sender, caller);
    }

    pub fn implicit_contexts_for_node(&self, node: NodeId) -> Vec<ContextData> {
        self.state.borrow().implicit.get_for_node(node)
    }

    /// Evaluates a property of an action fired by `origin`: the node's
    /// implicit contexts win over its ancestors' contexts, which win over
    /// global.
    pub fn evaluate_for_action<T>(&self, origin: NodeId, bind: &Bind<T>) -> Option<T>
    where
        T: DeserializeOwned + Clone,
    {
        let expression = match bind {
            Bind::Value(value) => return Some(value.clone()),
            Bind::Expression(expression) => Arc::clone(expression.parsed()),
        };
        let global = self.global.context();
        let value = {
            let mut state = self.state.borrow_mut();
            let implicit = state.implicit.get_for_node(origin);
            let chain = state.tree.ancestors(origin);
            state.evaluate_in_scope(&expression, &chain, &implicit, &global)
        };
        convert(value)
    }

    // ------------------------------------------------------------ Lifecycle

    /// Moves everything keyed by `old` to `new`. Subscriber sets of contexts
    /// with the same id are merged, and the moved context value wins.
    pub fn on_node_id_changed(&self, old: NodeId, new: NodeId) {
        if old == new {
            return;
        }
        let mut state = self.state.borrow_mut();
        if let Some(moved) = state.contexts.remove(&old) {
            let destination = state.contexts.entry(new).or_default();
            for (id, binding) in moved {
                match destination.get_mut(&id) {
                    Some(existing) => {
                        existing.bindings.extend(binding.bindings);
                        existing.context = binding.context;
                        existing.cache.evict_all();
                    }
                    None => {
                        destination.insert(id, binding);
                    }
                }
            }
        }
        for subscriber in state.subscribers.values_mut() {
            if subscriber.node == old {
                subscriber.node = new;
            }
        }
        if let Some(unlinked) = state.unlinked.remove(&old) {
            state.unlinked.entry(new).or_default().extend(unlinked);
        }
    }

    /// Removes `node` and its subtree along with their contexts, subscribers
    /// and implicit contexts.
    pub fn remove_node(&self, node: NodeId) {
        let mut state = self.state.borrow_mut();
        let removed = state.tree.remove(node);
        for gone in &removed {
            state.contexts.remove(gone);
            state.unlinked.remove(gone);
            state.implicit.remove_node(*gone);
        }
        let orphaned: Vec<_> = state
            .subscribers
            .iter()
            .filter(|(_, subscriber)| removed.contains(&subscriber.node))
            .map(|(id, _)| *id)
            .collect();
        for id in orphaned {
            state.drop_subscriber(id);
        }
    }

    /// Drops every context, subscriber, pending binding, cache entry and
    /// implicit context. The tree is kept.
    pub fn clear_contexts(&self) {
        let mut state = self.state.borrow_mut();
        state.contexts.clear();
        state.subscribers.clear();
        state.unlinked.clear();
        state.pending.clear();
        state.global_bindings.clear();
        state.global_cache.evict_all();
        state.implicit.clear();
    }

    /// Tears the registry down and deregisters its global observer. Also run
    /// on drop.
    pub fn destroy(&self) {
        self.clear_contexts();
        if let Some(id) = self.global_observer.take() {
            self.global.remove_observer(id);
        }
    }
}

impl Drop for BindingRegistry {
    fn drop(&mut self) {
        if let Some(id) = self.global_observer.take() {
            self.global.remove_observer(id);
        }
    }
}
