//! Bindable property values.

use crate::error::ParseError;
use crate::parser::parse;
use crate::token::ParsedExpression;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A property that is either a constant or an expression evaluated against
/// contexts to a `T`.
#[derive(Debug, Clone, PartialEq)]
pub enum Bind<T> {
    Value(T),
    Expression(Expression<T>),
}

/// Template source plus its parsed form, typed by the value it evaluates to.
pub struct Expression<T> {
    parsed: Arc<ParsedExpression>,
    _type: PhantomData<fn() -> T>,
}

impl<T> Expression<T> {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        Ok(Self::from_parsed(Arc::new(parse(source)?)))
    }

    pub fn from_parsed(parsed: Arc<ParsedExpression>) -> Self {
        Self {
            parsed,
            _type: PhantomData,
        }
    }

    pub fn source(&self) -> &str {
        self.parsed.source()
    }

    pub fn parsed(&self) -> &Arc<ParsedExpression> {
        &self.parsed
    }
}

impl<T> fmt::Debug for Expression<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Expression").field(&self.source()).finish()
    }
}

impl<T> Clone for Expression<T> {
    fn clone(&self) -> Self {
        Self::from_parsed(Arc::clone(&self.parsed))
    }
}

impl<T> PartialEq for Expression<T> {
    fn eq(&self, other: &Self) -> bool {
        self.parsed == other.parsed
    }
}

impl<T> Bind<T> {
    pub fn constant(value: T) -> Self {
        Bind::Value(value)
    }

    pub fn expression(source: &str) -> Result<Self, ParseError> {
        Expression::new(source).map(Bind::Expression)
    }

    pub fn is_expression(&self) -> bool {
        matches!(self, Bind::Expression(_))
    }
}

impl Bind<String> {
    /// Text containing `@{` is an expression; anything else is a constant.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        if text.contains("@{") {
            Self::expression(text)
        } else {
            Ok(Bind::Value(text.to_string()))
        }
    }
}

impl<T> From<Expression<T>> for Bind<T> {
    fn from(expression: Expression<T>) -> Self {
        Bind::Expression(expression)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Bind<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        match raw {
            Value::String(text) if text.contains("@{") => Expression::new(&text)
                .map(Bind::Expression)
                .map_err(D::Error::custom),
            other => T::deserialize(other).map(Bind::Value).map_err(D::Error::custom),
        }
    }
}
