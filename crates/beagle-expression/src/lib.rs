//! Binding expressions for the server-driven UI runtime.
//!
//! A bindable property holds either a constant or a template such as
//! `"Hello @{user.name}"`. Templates are tokenized once into a
//! [`ParsedExpression`] and evaluated many times against whatever contexts
//! are visible to the node that owns them.
//!
//! # Example
//!
//! ```
//! use beagle_context::ContextData;
//! use beagle_expression::{evaluate, operations_map, parse, ContextStack};
//! use serde_json::json;
//!
//! let contexts = [ContextData::from_value("user", json!({"age": 30}))];
//! let parsed = parse("@{gte(user.age, 18)}").unwrap();
//! let value = evaluate(&parsed, &mut ContextStack::new(&contexts), &operations_map()).unwrap();
//! assert_eq!(value, Some(json!(true)));
//! ```

pub mod bind;
pub mod error;
pub mod evaluate;
pub mod operations;
pub mod parser;
pub mod token;
pub mod types;
pub mod util;

pub use bind::{Bind, Expression};
pub use error::{EvalError, ParseError};
pub use evaluate::{evaluate, evaluate_token, ContextResolver, ContextStack, EmptyResolver};
pub use operations::{all_operations, operations_map};
pub use parser::{get_expressions, parse, ExpressionParser};
pub use token::{BindingToken, Fragment, ParsedExpression, Token};
pub use types::{assert_arity, operations_to_map, register_operation, Arity, OperationDefinition, OperationFn, OperationMap};
