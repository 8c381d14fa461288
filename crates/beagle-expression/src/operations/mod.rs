//! Built-in operations, grouped by family.

pub mod array;
pub mod comparison;
pub mod logic;
pub mod number;
pub mod other;
pub mod string;

use crate::types::{operations_to_map, OperationDefinition, OperationMap};
use std::sync::Arc;

/// Every built-in operation.
pub fn all_operations() -> Vec<Arc<OperationDefinition>> {
    let mut ops = Vec::new();
    ops.extend(comparison::operations());
    ops.extend(logic::operations());
    ops.extend(number::operations());
    ops.extend(string::operations());
    ops.extend(array::operations());
    ops.extend(other::operations());
    ops
}

/// Map of every built-in operation, ready for evaluation. Hosts add their
/// own with [`register_operation`](crate::register_operation).
pub fn operations_map() -> OperationMap {
    operations_to_map(all_operations())
}
