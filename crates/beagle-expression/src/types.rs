use crate::error::EvalError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Operation arity.
#[derive(Debug, Clone, PartialEq)]
pub enum Arity {
    /// Skip the arity check; the operation validates its own operands.
    Any,
    /// Exactly `n` operands.
    Fixed(usize),
    /// At least two operands.
    Variadic,
    /// Between `min` and `max` operands. `None` for max = unlimited.
    Range(usize, Option<usize>),
}

/// Evaluation function of an operation. Operands arrive already evaluated.
pub type OperationFn = fn(&[Value]) -> Result<Value, EvalError>;

/// A named built-in (or registered) operation.
pub struct OperationDefinition {
    pub name: &'static str,
    pub arity: Arity,
    pub eval_fn: OperationFn,
}

/// Map of operation name -> definition.
pub type OperationMap = HashMap<String, Arc<OperationDefinition>>;

/// Asserts that an operation received an acceptable number of operands.
pub fn assert_arity(operation: &str, arity: &Arity, operands: usize) -> Result<(), EvalError> {
    match arity {
        Arity::Any => Ok(()),
        Arity::Fixed(n) => {
            if operands != *n {
                Err(EvalError::Arity(format!(
                    "\"{}\" operation expects {} operands.",
                    operation, n
                )))
            } else {
                Ok(())
            }
        }
        Arity::Variadic => {
            if operands < 2 {
                Err(EvalError::Arity(format!(
                    "\"{}\" operation expects at least two operands.",
                    operation
                )))
            } else {
                Ok(())
            }
        }
        Arity::Range(min, max) => {
            if operands < *min {
                Err(EvalError::Arity(format!(
                    "\"{}\" operation expects at least {} operands.",
                    operation, min
                )))
            } else if let Some(max) = max {
                if operands > *max {
                    return Err(EvalError::Arity(format!(
                        "\"{}\" operation expects at most {} operands.",
                        operation, max
                    )));
                }
                Ok(())
            } else {
                Ok(())
            }
        }
    }
}

/// Builds an `OperationMap` from a list of operation definitions.
pub fn operations_to_map(operations: Vec<Arc<OperationDefinition>>) -> OperationMap {
    let mut map = HashMap::new();
    for op in operations {
        map.insert(op.name.to_string(), op);
    }
    map
}

/// Adds (or replaces) an operation in a map.
pub fn register_operation(map: &mut OperationMap, definition: OperationDefinition) {
    map.insert(definition.name.to_string(), Arc::new(definition));
}
