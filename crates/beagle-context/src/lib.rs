//! Context data store for the server-driven UI runtime.
//!
//! A context is a named value in canonical JSON form (primitive, ordered map
//! or list). Paths address values inside it with the dotted/bracketed notation
//! used by binding expressions, and every mutation is copy-on-write.
//!
//! # Example
//!
//! ```
//! use beagle_context::{ContextData, ContextSetResult};
//! use serde_json::json;
//!
//! let ctx = ContextData::from_value("cart", json!({"items": [{"qty": 1}]}));
//! assert_eq!(ctx.get(Some("items[0].qty")), json!(1));
//!
//! match ctx.set(Some("items[0].qty"), json!(2)) {
//!     ContextSetResult::Succeed(next) => assert_eq!(next.get(Some("items.0.qty")), json!(2)),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

pub mod data;
pub mod error;
pub mod get;
pub mod manipulate;
pub mod path;
pub mod types;

pub use data::{ContextData, NavigationContext, GLOBAL_CONTEXT_ID};
pub use error::{PathError, SetError, WireError};
pub use get::get;
pub use manipulate::{clear, set, ContextSetResult};
pub use path::{format_path, parse_path};
pub use types::{is_valid_index, PathStep};
