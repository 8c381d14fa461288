//! String operations. Non-string operands are rendered to text first, with
//! `null` as the empty string.

use crate::error::EvalError;
use crate::types::{Arity, OperationDefinition};
use crate::util::{integral, str_val};
use serde_json::Value;
use std::sync::Arc;

fn concat_eval(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::String(args.iter().map(str_val).collect()))
}

fn capitalize_eval(args: &[Value]) -> Result<Value, EvalError> {
    let text = str_val(&args[0]);
    let mut chars = text.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    Ok(Value::String(capitalized))
}

fn lowercase_eval(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::String(str_val(&args[0]).to_lowercase()))
}

fn uppercase_eval(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::String(str_val(&args[0]).to_uppercase()))
}

fn index_operand(value: &Value) -> Result<i64, EvalError> {
    integral(value).ok_or_else(|| EvalError::InvalidOperand {
        operation: "substr",
        detail: format!("expected an integer, got {value}"),
    })
}

/// `substr(text, start)` or `substr(text, start, length)`, counted in
/// characters.
fn substr_eval(args: &[Value]) -> Result<Value, EvalError> {
    let chars: Vec<char> = str_val(&args[0]).chars().collect();
    let len = chars.len();
    let start = index_operand(&args[1])?;
    let end = match args.get(2) {
        Some(length) => start.saturating_add(index_operand(length)?),
        None => len as i64,
    };
    if start < 0 || start as usize > len {
        return Err(EvalError::OutOfBounds { index: start, len });
    }
    if end < start || end as usize > len {
        return Err(EvalError::OutOfBounds { index: end, len });
    }
    Ok(Value::String(chars[start as usize..end as usize].iter().collect()))
}

pub fn operations() -> Vec<Arc<OperationDefinition>> {
    vec![
        Arc::new(OperationDefinition {
            name: "concat",
            arity: Arity::Range(1, None),
            eval_fn: concat_eval,
        }),
        Arc::new(OperationDefinition {
            name: "capitalize",
            arity: Arity::Fixed(1),
            eval_fn: capitalize_eval,
        }),
        Arc::new(OperationDefinition {
            name: "lowercase",
            arity: Arity::Fixed(1),
            eval_fn: lowercase_eval,
        }),
        Arc::new(OperationDefinition {
            name: "uppercase",
            arity: Arity::Fixed(1),
            eval_fn: uppercase_eval,
        }),
        Arc::new(OperationDefinition {
            name: "substr",
            arity: Arity::Range(2, Some(3)),
            eval_fn: substr_eval,
        }),
    ]
}
