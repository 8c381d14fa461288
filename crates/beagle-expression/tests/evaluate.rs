//! Integration tests for template evaluation.

use beagle_context::ContextData;
use beagle_expression::{
    evaluate, operations_map, parse, register_operation, Arity, ContextStack, EmptyResolver,
    EvalError, OperationDefinition,
};
use serde_json::{json, Value};

fn check(template: &str, expected: Value, contexts: &[ContextData]) {
    let parsed = parse(template).unwrap_or_else(|e| panic!("parse({template}) failed: {e}"));
    let result = evaluate(&parsed, &mut ContextStack::new(contexts), &operations_map())
        .unwrap_or_else(|e| panic!("evaluate({template}) failed: {e}"));
    assert_eq!(result.unwrap_or(Value::Null), expected, "template: {template}");
}

fn check_err(template: &str) -> EvalError {
    let parsed = parse(template).unwrap();
    evaluate(&parsed, &mut EmptyResolver, &operations_map())
        .err()
        .unwrap_or_else(|| panic!("expected error for {template}"))
}

// ------------------------------------------------------------------ Coercion

#[test]
fn test_comparison_truth_table() {
    check("@{eq('1', '1.0')}", json!(false), &[]);
    check("@{gte('1', '1.0')}", json!(true), &[]);
    check("@{lte('1', '1.0')}", json!(true), &[]);
    check("@{eq(2, 1)}", json!(false), &[]);
    check("@{gt(2, 1)}", json!(true), &[]);
    check("@{eq('true', 'true')}", json!(true), &[]);
    check("@{eq('true', 2)}", json!(false), &[]);
}

#[test]
fn test_comparison_arity_asymmetry() {
    assert!(matches!(check_err("@{eq(1)}"), EvalError::Arity(_)));
    check("@{gt(1)}", Value::Null, &[]);
    check("@{lte()}", Value::Null, &[]);
}

#[test]
fn test_comparison_reads_contexts() {
    let ctx = [ContextData::from_value("form", json!({"qty": "10", "max": 9}))];
    check("@{gt(form.qty, form.max)}", json!(true), &ctx);
    check("@{lt(form.qty, '9')}", json!(false), &ctx);
}

// --------------------------------------------------------------- Arithmetic

#[test]
fn test_arithmetic() {
    check("@{sum(1, 2, 3)}", json!(6), &[]);
    check("@{subtract(1, 2.5)}", json!(-1.5), &[]);
    check("@{multiply('2', 3)}", json!(6), &[]);
    check("@{divide(7, 2)}", json!(3.5), &[]);
    assert_eq!(check_err("@{divide(1, 0)}"), EvalError::DivisionByZero);
    assert!(matches!(check_err("@{sum(1)}"), EvalError::Arity(_)));
}

// ------------------------------------------------------------------ Strings

#[test]
fn test_strings() {
    let ctx = [ContextData::from_value("user", json!({"first": "ana", "last": "lima"}))];
    check("@{capitalize(user.first)} @{uppercase(user.last)}", json!("Ana LIMA"), &ctx);
    check("@{concat(user.first, '-', user.last)}", json!("ana-lima"), &ctx);
    check("@{substr(user.last, 1, 2)}", json!("im"), &ctx);
}

// ------------------------------------------------------------------- Arrays

#[test]
fn test_arrays() {
    let ctx = [ContextData::from_value("list", json!({"items": ["a", "b"]}))];
    check("@{insert(list.items, 'c')}", json!(["a", "b", "c"]), &ctx);
    check("@{remove(list.items, 'a')}", json!(["b"]), &ctx);
    check("@{removeIndex(list.items, 0)}", json!(["b"]), &ctx);
    check("@{contains(list.items, 'b')}", json!(true), &ctx);
    check("@{length(list.items)}", json!(2), &ctx);
    check("@{isEmpty(list.missing)}", json!(true), &ctx);
    check("@{isNull(list.items)}", json!(false), &ctx);
}

// ---------------------------------------------------------------- Templates

#[test]
fn test_escaped_expression_stays_text() {
    let ctx = [ContextData::from_value("a", json!("x"))];
    check(r"\@{a} @{a}", json!("@{a} x"), &ctx);
    check(r"\\@{a}", json!(r"\x"), &ctx);
}

#[test]
fn test_unknown_context_is_null() {
    check("@{ghost.name}", Value::Null, &[]);
    check("name: @{ghost.name}", json!("name: "), &[]);
}

#[test]
fn test_registered_operation() {
    fn double(args: &[Value]) -> Result<Value, EvalError> {
        Ok(json!(args[0].as_i64().unwrap_or(0) * 2))
    }
    let mut ops = operations_map();
    register_operation(
        &mut ops,
        OperationDefinition {
            name: "double",
            arity: Arity::Fixed(1),
            eval_fn: double,
        },
    );
    let parsed = parse("@{double(21)}").unwrap();
    let result = evaluate(&parsed, &mut EmptyResolver, &ops).unwrap();
    assert_eq!(result, Some(json!(42)));
}
