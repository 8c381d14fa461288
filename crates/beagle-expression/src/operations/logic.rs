//! Logic operations.

use crate::error::EvalError;
use crate::types::{Arity, OperationDefinition};
use crate::util::boolean;
use serde_json::Value;
use std::sync::Arc;

fn and_eval(args: &[Value]) -> Result<Value, EvalError> {
    let mut result = true;
    for arg in args {
        result &= boolean("and", arg)?;
    }
    Ok(Value::Bool(result))
}

fn or_eval(args: &[Value]) -> Result<Value, EvalError> {
    let mut result = false;
    for arg in args {
        result |= boolean("or", arg)?;
    }
    Ok(Value::Bool(result))
}

fn not_eval(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(!boolean("not", &args[0])?))
}

fn condition_eval(args: &[Value]) -> Result<Value, EvalError> {
    if boolean("condition", &args[0])? {
        Ok(args[1].clone())
    } else {
        Ok(args[2].clone())
    }
}

pub fn operations() -> Vec<Arc<OperationDefinition>> {
    vec![
        Arc::new(OperationDefinition {
            name: "and",
            arity: Arity::Range(1, None),
            eval_fn: and_eval,
        }),
        Arc::new(OperationDefinition {
            name: "or",
            arity: Arity::Range(1, None),
            eval_fn: or_eval,
        }),
        Arc::new(OperationDefinition {
            name: "not",
            arity: Arity::Fixed(1),
            eval_fn: not_eval,
        }),
        Arc::new(OperationDefinition {
            name: "condition",
            arity: Arity::Fixed(3),
            eval_fn: condition_eval,
        }),
    ]
}
