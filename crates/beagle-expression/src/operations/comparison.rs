//! Comparison operations.
//!
//! `eq` is typed structural equality: `"1"` and `"1.0"` differ, and so do the
//! numbers `1` and `1.0`. The ordering operations instead compare numerically
//! when both operands look numeric and fall back to comparing string forms,
//! so `gte("1", "1.0")` holds.
//!
//! Arity is asymmetric: `eq` with fewer than two operands is an error, the
//! ordering operations return `null`.

use crate::error::EvalError;
use crate::types::{Arity, OperationDefinition};
use crate::util::{numeric, str_val};
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;

fn eq_eval(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [left, right, ..] => Ok(Value::Bool(left == right)),
        _ => Err(EvalError::Arity(
            "\"eq\" operation expects two operands.".to_string(),
        )),
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (numeric(left), numeric(right)) {
        (Some(a), Some(b)) => a.partial_cmp(&b),
        _ => Some(str_val(left).cmp(&str_val(right))),
    }
}

fn ordering(args: &[Value], accept: fn(Ordering) -> bool) -> Value {
    match args {
        [left, right, ..] => Value::Bool(compare(left, right).is_some_and(accept)),
        _ => Value::Null,
    }
}

fn gt_eval(args: &[Value]) -> Result<Value, EvalError> {
    Ok(ordering(args, Ordering::is_gt))
}

fn gte_eval(args: &[Value]) -> Result<Value, EvalError> {
    Ok(ordering(args, Ordering::is_ge))
}

fn lt_eval(args: &[Value]) -> Result<Value, EvalError> {
    Ok(ordering(args, Ordering::is_lt))
}

fn lte_eval(args: &[Value]) -> Result<Value, EvalError> {
    Ok(ordering(args, Ordering::is_le))
}

pub fn operations() -> Vec<Arc<OperationDefinition>> {
    vec![
        Arc::new(OperationDefinition {
            name: "eq",
            arity: Arity::Any,
            eval_fn: eq_eval,
        }),
        Arc::new(OperationDefinition {
            name: "gt",
            arity: Arity::Any,
            eval_fn: gt_eval,
        }),
        Arc::new(OperationDefinition {
            name: "gte",
            arity: Arity::Any,
            eval_fn: gte_eval,
        }),
        Arc::new(OperationDefinition {
            name: "lt",
            arity: Arity::Any,
            eval_fn: lt_eval,
        }),
        Arc::new(OperationDefinition {
            name: "lte",
            arity: Arity::Any,
            eval_fn: lte_eval,
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coercion_truth_table() {
        assert_eq!(eq_eval(&[json!("1"), json!("1.0")]).unwrap(), json!(false));
        assert_eq!(gte_eval(&[json!("1"), json!("1.0")]).unwrap(), json!(true));
        assert_eq!(lte_eval(&[json!("1"), json!("1.0")]).unwrap(), json!(true));
        assert_eq!(eq_eval(&[json!(2), json!(1)]).unwrap(), json!(false));
        assert_eq!(gt_eval(&[json!(2), json!(1)]).unwrap(), json!(true));
        assert_eq!(eq_eval(&[json!("true"), json!("true")]).unwrap(), json!(true));
        assert_eq!(eq_eval(&[json!("true"), json!(2)]).unwrap(), json!(false));
    }

    #[test]
    fn integer_and_decimal_numbers_are_not_equal() {
        assert_eq!(eq_eval(&[json!(1), json!(1.0)]).unwrap(), json!(false));
        assert_eq!(gte_eval(&[json!(1), json!(1.0)]).unwrap(), json!(true));
    }

    #[test]
    fn ordering_compares_numbers_by_value_not_text() {
        assert_eq!(gt_eval(&[json!("10"), json!("9")]).unwrap(), json!(true));
        assert_eq!(lt_eval(&[json!(2), json!("10")]).unwrap(), json!(true));
    }

    #[test]
    fn mixed_types_compare_as_strings() {
        assert_eq!(gt_eval(&[json!("b"), json!("a")]).unwrap(), json!(true));
        assert_eq!(gt_eval(&[json!("abc"), json!(2)]).unwrap(), json!(true));
        assert_eq!(lt_eval(&[json!(false), json!(true)]).unwrap(), json!(true));
    }

    #[test]
    fn missing_operands_are_asymmetric() {
        assert!(matches!(eq_eval(&[json!(1)]), Err(EvalError::Arity(_))));
        assert!(matches!(eq_eval(&[]), Err(EvalError::Arity(_))));
        assert_eq!(gt_eval(&[json!(1)]).unwrap(), Value::Null);
        assert_eq!(gte_eval(&[]).unwrap(), Value::Null);
        assert_eq!(lt_eval(&[json!(1)]).unwrap(), Value::Null);
        assert_eq!(lte_eval(&[json!(1)]).unwrap(), Value::Null);
    }
}
