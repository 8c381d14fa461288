//! Array operations. The input array is never modified; a new one is
//! returned.

use crate::error::EvalError;
use crate::types::{Arity, OperationDefinition};
use crate::util::{array_operand, integral};
use serde_json::Value;
use std::sync::Arc;

fn position(operation: &'static str, value: &Value, len: usize, inclusive: bool) -> Result<usize, EvalError> {
    let index = integral(value).ok_or_else(|| EvalError::InvalidOperand {
        operation,
        detail: format!("expected an integer index, got {value}"),
    })?;
    let limit = if inclusive { len } else { len.saturating_sub(1) };
    if index < 0 || index as usize > limit || (!inclusive && len == 0) {
        return Err(EvalError::OutOfBounds { index, len });
    }
    Ok(index as usize)
}

/// `insert(array, element)` appends; `insert(array, element, index)` inserts
/// before `index` (which may equal the length).
fn insert_eval(args: &[Value]) -> Result<Value, EvalError> {
    let mut items = array_operand("insert", &args[0])?.clone();
    let index = match args.get(2) {
        Some(index) => position("insert", index, items.len(), true)?,
        None => items.len(),
    };
    items.insert(index, args[1].clone());
    Ok(Value::Array(items))
}

/// Removes every element equal to the operand.
fn remove_eval(args: &[Value]) -> Result<Value, EvalError> {
    let items = array_operand("remove", &args[0])?;
    Ok(Value::Array(
        items.iter().filter(|item| **item != args[1]).cloned().collect(),
    ))
}

/// Removes the element at the index, or the last one when no index is given.
fn remove_index_eval(args: &[Value]) -> Result<Value, EvalError> {
    let mut items = array_operand("removeIndex", &args[0])?.clone();
    let index = match args.get(1) {
        Some(index) => position("removeIndex", index, items.len(), false)?,
        None => match items.len() {
            0 => return Err(EvalError::OutOfBounds { index: 0, len: 0 }),
            len => len - 1,
        },
    };
    items.remove(index);
    Ok(Value::Array(items))
}

fn contains_eval(args: &[Value]) -> Result<Value, EvalError> {
    let items = array_operand("contains", &args[0])?;
    Ok(Value::Bool(items.contains(&args[1])))
}

pub fn operations() -> Vec<Arc<OperationDefinition>> {
    vec![
        Arc::new(OperationDefinition {
            name: "insert",
            arity: Arity::Range(2, Some(3)),
            eval_fn: insert_eval,
        }),
        Arc::new(OperationDefinition {
            name: "remove",
            arity: Arity::Fixed(2),
            eval_fn: remove_eval,
        }),
        Arc::new(OperationDefinition {
            name: "removeIndex",
            arity: Arity::Range(1, Some(2)),
            eval_fn: remove_index_eval,
        }),
        Arc::new(OperationDefinition {
            name: "contains",
            arity: Arity::Fixed(2),
            eval_fn: contains_eval,
        }),
    ]
}
