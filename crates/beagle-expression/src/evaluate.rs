//! Evaluation of parsed templates against a stack of contexts.

use crate::error::EvalError;
use crate::token::{BindingToken, Fragment, ParsedExpression, Token};
use crate::types::{assert_arity, OperationMap};
use crate::util::str_val;
use beagle_context::{get, ContextData};
use serde_json::Value;

/// Supplies the value a binding token reads.
///
/// Returns `None` when no context with the token's id is visible, and
/// `Some(Value::Null)` when the context exists but the path does not resolve.
pub trait ContextResolver {
    fn resolve(&mut self, token: &BindingToken) -> Option<Value>;
}

/// Resolver that sees no contexts at all. Used for templates without
/// lookups.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyResolver;

impl ContextResolver for EmptyResolver {
    fn resolve(&mut self, _token: &BindingToken) -> Option<Value> {
        None
    }
}

/// Resolver over an ordered list of contexts, nearest first. The first
/// context whose id matches answers, even if the path is missing there.
#[derive(Debug, Clone, Copy)]
pub struct ContextStack<'a> {
    contexts: &'a [ContextData],
}

impl<'a> ContextStack<'a> {
    pub fn new(contexts: &'a [ContextData]) -> Self {
        Self { contexts }
    }

    pub fn find(&self, id: &str) -> Option<&'a ContextData> {
        self.contexts.iter().find(|ctx| ctx.id() == id)
    }
}

impl ContextResolver for ContextStack<'_> {
    fn resolve(&mut self, token: &BindingToken) -> Option<Value> {
        let ctx = self.find(&token.context_id)?;
        Some(get(ctx.value(), &token.path).cloned().unwrap_or(Value::Null))
    }
}

/// Evaluates a parsed template.
///
/// A template made of a single `@{…}` yields that token's native value, with
/// `null` mapped to `None`. Anything else is rendered to one string, each
/// token's value interpolated with `null` as the empty string.
pub fn evaluate(
    expression: &ParsedExpression,
    resolver: &mut dyn ContextResolver,
    operations: &OperationMap,
) -> Result<Option<Value>, EvalError> {
    if let Some(token) = expression.single_token() {
        return match evaluate_token(token, resolver, operations)? {
            Value::Null => Ok(None),
            value => Ok(Some(value)),
        };
    }
    let mut out = String::new();
    for fragment in expression.fragments() {
        match fragment {
            Fragment::Text(text) => out.push_str(text),
            Fragment::Token(token) => {
                out.push_str(&str_val(&evaluate_token(token, resolver, operations)?))
            }
        }
    }
    Ok(Some(Value::String(out)))
}

/// Evaluates one token. Operation arguments are evaluated left to right
/// before the operation runs.
pub fn evaluate_token(
    token: &Token,
    resolver: &mut dyn ContextResolver,
    operations: &OperationMap,
) -> Result<Value, EvalError> {
    match token {
        Token::Literal(value) => Ok(value.clone()),
        Token::Binding(binding) => Ok(resolver.resolve(binding).unwrap_or(Value::Null)),
        Token::Function { name, args } => {
            let def = operations
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UnknownOperation(name.clone()))?;
            let operands = args
                .iter()
                .map(|arg| evaluate_token(arg, resolver, operations))
                .collect::<Result<Vec<_>, _>>()?;
            assert_arity(def.name, &def.arity, operands.len())?;
            (def.eval_fn)(&operands)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::operations_map;
    use crate::parser::parse;
    use serde_json::json;

    fn eval(template: &str, contexts: &[ContextData]) -> Result<Option<Value>, EvalError> {
        let parsed = parse(template).unwrap();
        evaluate(&parsed, &mut ContextStack::new(contexts), &operations_map())
    }

    #[test]
    fn single_token_keeps_native_type() {
        let ctx = [ContextData::from_value("user", json!({"age": 30, "tags": ["a"]}))];
        assert_eq!(eval("@{user.age}", &ctx).unwrap(), Some(json!(30)));
        assert_eq!(eval("@{user.tags}", &ctx).unwrap(), Some(json!(["a"])));
        assert_eq!(eval("@{user.missing}", &ctx).unwrap(), None);
    }

    #[test]
    fn mixed_template_renders_text() {
        let ctx = [ContextData::from_value("user", json!({"name": "Ana", "age": 30}))];
        assert_eq!(
            eval("@{user.name} is @{user.age}@{user.none}!", &ctx).unwrap(),
            Some(json!("Ana is 30!"))
        );
    }

    #[test]
    fn nearest_context_shadows() {
        let ctx = [
            ContextData::from_value("item", json!({"v": "inner"})),
            ContextData::from_value("item", json!({"v": "outer", "only": 1})),
        ];
        assert_eq!(eval("@{item.v}", &ctx).unwrap(), Some(json!("inner")));
        assert_eq!(eval("@{item.only}", &ctx).unwrap(), None);
    }

    #[test]
    fn nested_calls() {
        let ctx = [ContextData::from_value("n", json!({"a": 2, "b": "3"}))];
        assert_eq!(
            eval("@{condition(gt(sum(n.a, n.b), 4), 'big', 'small')}", &ctx).unwrap(),
            Some(json!("big"))
        );
    }

    #[test]
    fn failures_propagate() {
        assert_eq!(
            eval("@{nope(1)}", &[]),
            Err(EvalError::UnknownOperation("nope".into()))
        );
        assert!(matches!(eval("@{not(true, false)}", &[]), Err(EvalError::Arity(_))));
        assert!(matches!(eval("@{eq(1)}", &[]), Err(EvalError::Arity(_))));
        assert_eq!(eval("@{gt(1)}", &[]).unwrap(), None);
    }
}
