//! Arithmetic operations.
//!
//! Integer operands give integer results; any decimal operand switches the
//! whole computation to floating point.

use crate::error::EvalError;
use crate::types::{Arity, OperationDefinition};
use crate::util::{f64_to_value, integral, number_operand};
use serde_json::Value;
use std::sync::Arc;

fn integers(args: &[Value]) -> Option<Vec<i64>> {
    args.iter().map(integral).collect()
}

fn fold(
    operation: &'static str,
    args: &[Value],
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    if let Some(ints) = integers(args) {
        let folded = ints[1..]
            .iter()
            .try_fold(ints[0], |acc, n| int_op(acc, *n));
        if let Some(n) = folded {
            return Ok(Value::from(n));
        }
    }
    let first = number_operand(operation, &args[0])?;
    args[1..]
        .iter()
        .try_fold(first, |acc, arg| Ok(float_op(acc, number_operand(operation, arg)?)))
        .map(f64_to_value)
}

fn sum_eval(args: &[Value]) -> Result<Value, EvalError> {
    fold("sum", args, i64::checked_add, |a, b| a + b)
}

fn subtract_eval(args: &[Value]) -> Result<Value, EvalError> {
    fold("subtract", args, i64::checked_sub, |a, b| a - b)
}

fn multiply_eval(args: &[Value]) -> Result<Value, EvalError> {
    fold("multiply", args, i64::checked_mul, |a, b| a * b)
}

fn divide_eval(args: &[Value]) -> Result<Value, EvalError> {
    for divisor in &args[1..] {
        if number_operand("divide", divisor)? == 0.0 {
            return Err(EvalError::DivisionByZero);
        }
    }
    fold(
        "divide",
        args,
        |a, b| if a.checked_rem(b) == Some(0) { a.checked_div(b) } else { None },
        |a, b| a / b,
    )
}

pub fn operations() -> Vec<Arc<OperationDefinition>> {
    vec![
        Arc::new(OperationDefinition {
            name: "sum",
            arity: Arity::Variadic,
            eval_fn: sum_eval,
        }),
        Arc::new(OperationDefinition {
            name: "subtract",
            arity: Arity::Variadic,
            eval_fn: subtract_eval,
        }),
        Arc::new(OperationDefinition {
            name: "multiply",
            arity: Arity::Variadic,
            eval_fn: multiply_eval,
        }),
        Arc::new(OperationDefinition {
            name: "divide",
            arity: Arity::Variadic,
            eval_fn: divide_eval,
        }),
    ]
}
