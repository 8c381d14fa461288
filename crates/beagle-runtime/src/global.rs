//! Process-wide global context.
//!
//! One [`ContextData`] with the reserved id `"global"`, shared by every screen.
//! Successful mutations fan out synchronously to the registered observers in
//! registration order. A panicking observer is logged and skipped; the rest
//! still run.

use beagle_context::{ContextData, ContextSetResult, GLOBAL_CONTEXT_ID};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;
use tracing::{error, warn};

/// Receives the new global value after each successful mutation.
pub trait GlobalContextObserver {
    fn on_global_changed(&self, context: &ContextData);
}

impl<F: Fn(&ContextData)> GlobalContextObserver for F {
    fn on_global_changed(&self, context: &ContextData) {
        self(context)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

struct State {
    context: ContextData,
    next_observer_id: u64,
    observers: BTreeMap<u64, Rc<dyn GlobalContextObserver>>,
}

/// Handle to a global context. Clones share the same state.
#[derive(Clone)]
pub struct GlobalContext {
    state: Rc<RefCell<State>>,
}

impl std::fmt::Debug for GlobalContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("GlobalContext")
            .field("value", state.context.value())
            .field("observers", &state.observers.len())
            .finish()
    }
}

thread_local! {
    static SHARED: RefCell<Option<GlobalContext>> = const { RefCell::new(None) };
}

impl Default for GlobalContext {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalContext {
    /// A fresh, unshared global context holding `{}`.
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                context: ContextData::from_value(GLOBAL_CONTEXT_ID, Value::Object(Map::new())),
                next_observer_id: 1,
                observers: BTreeMap::new(),
            })),
        }
    }

    /// The instance shared by everything on this (UI) thread, created on
    /// first access.
    pub fn shared() -> Self {
        SHARED.with(|shared| shared.borrow_mut().get_or_insert_with(GlobalContext::new).clone())
    }

    /// Drops the shared instance; the next [`shared`](Self::shared) call
    /// starts over from `{}` with no observers.
    pub fn reset_shared() {
        SHARED.with(|shared| shared.borrow_mut().take());
    }

    pub fn context(&self) -> ContextData {
        self.state.borrow().context.clone()
    }

    pub fn get(&self, path: Option<&str>) -> Value {
        self.state.borrow().context.get(path)
    }

    pub fn set(&self, value: Value, path: Option<&str>) -> ContextSetResult {
        let result = self.state.borrow().context.set(path, value);
        self.commit(result)
    }

    pub fn clear(&self, path: Option<&str>) -> ContextSetResult {
        let result = self.state.borrow().context.clear(path);
        self.commit(result)
    }

    fn commit(&self, result: ContextSetResult) -> ContextSetResult {
        match &result {
            ContextSetResult::Succeed(next) => {
                self.state.borrow_mut().context = next.clone();
                self.notify(next);
            }
            failure => warn!(result = ?failure, "global context mutation failed"),
        }
        result
    }

    fn notify(&self, context: &ContextData) {
        let observers: Vec<_> = self.state.borrow().observers.values().cloned().collect();
        for observer in observers {
            let outcome = catch_unwind(AssertUnwindSafe(|| observer.on_global_changed(context)));
            if let Err(panic) = outcome {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_default();
                error!(panic = %message, "global context observer panicked");
            }
        }
    }

    pub fn add_observer(&self, observer: Rc<dyn GlobalContextObserver>) -> ObserverId {
        let mut state = self.state.borrow_mut();
        let id = state.next_observer_id;
        state.next_observer_id = state.next_observer_id.saturating_add(1);
        state.observers.insert(id, observer);
        ObserverId(id)
    }

    /// Returns whether the observer was registered. Removing twice is fine.
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        self.state.borrow_mut().observers.remove(&id.0).is_some()
    }

    pub fn observer_count(&self) -> usize {
        self.state.borrow().observers.len()
    }

    pub fn ptr_eq(&self, other: &GlobalContext) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}
