//! Binding runtime for server-driven UI screens.
//!
//! A [`BindingRegistry`] attaches named contexts to the nodes of a render tree
//! and keeps bound properties up to date as those contexts change. The
//! [`GlobalContext`] is shared by every screen on the UI thread, implicit
//! contexts carry event payloads, and the [`ActionDispatcher`] runs the
//! actions fired by events.
//!
//! Everything here is single-threaded. The only values that cross threads
//! are request completions, which the dispatcher picks up on the UI thread.
//!
//! # Example
//!
//! ```
//! use beagle_context::ContextData;
//! use beagle_expression::Bind;
//! use beagle_runtime::{BindingRegistry, GlobalContext, SetContextInternal};
//! use serde_json::json;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let registry = BindingRegistry::new(GlobalContext::new());
//! let screen = registry.add_root();
//! let label = registry.add_child(screen).unwrap();
//! registry.add_context(screen, ContextData::from_value("user", json!({"age": 30})), false);
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! let bind = Bind::<i64>::expression("@{user.age}").unwrap();
//! registry.observe_bind_changes(label, &bind, move |age| sink.borrow_mut().push(age));
//!
//! registry.update_context(label, SetContextInternal {
//!     context_id: "user".into(),
//!     value: json!(31),
//!     path: Some("age".into()),
//! });
//! assert_eq!(*seen.borrow(), vec![Some(30), Some(31)]);
//! ```

pub mod action;
pub mod cache;
pub mod config;
pub mod error;
pub mod global;
pub mod implicit;
pub mod registry;
pub mod tree;

pub use action::{Action, ActionDispatcher, ActionList, ActionRef, ActionScope};
pub use cache::EvaluationCache;
pub use config::RuntimeConfig;
pub use error::{ActionError, ConfigError};
pub use global::{GlobalContext, GlobalContextObserver, ObserverId};
pub use implicit::{ImplicitContextManager, SenderId};
pub use registry::{BindingRegistry, SetContextInternal, SubscriberId, NAVIGATION_CONTEXT_ID};
pub use tree::{NodeId, RenderTree};
