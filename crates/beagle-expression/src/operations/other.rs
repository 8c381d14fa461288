use crate::error::EvalError;
use crate::types::{Arity, OperationDefinition};
use serde_json::Value;
use std::sync::Arc;

fn is_null_eval(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(args[0].is_null()))
}

/// `null`, `""`, `[]` and `{}` are empty.
fn is_empty_eval(args: &[Value]) -> Result<Value, EvalError> {
    let empty = match &args[0] {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    };
    Ok(Value::Bool(empty))
}

fn length_eval(args: &[Value]) -> Result<Value, EvalError> {
    let len = match &args[0] {
        Value::Null => 0,
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => {
            return Err(EvalError::InvalidOperand {
                operation: "length",
                detail: format!("{other} has no length"),
            })
        }
    };
    Ok(Value::from(len))
}

pub fn operations() -> Vec<Arc<OperationDefinition>> {
    vec![
        Arc::new(OperationDefinition {
            name: "isNull",
            arity: Arity::Fixed(1),
            eval_fn: is_null_eval,
        }),
        Arc::new(OperationDefinition {
            name: "isEmpty",
            arity: Arity::Fixed(1),
            eval_fn: is_empty_eval,
        }),
        Arc::new(OperationDefinition {
            name: "length",
            arity: Arity::Fixed(1),
            eval_fn: length_eval,
        }),
    ]
}
