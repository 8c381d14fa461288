//! Copy-on-write path mutation of context values.
//!
//! Neither [`set`] nor [`clear`] touches the input context: each builds a new
//! value and returns it inside [`ContextSetResult::Succeed`].

use crate::data::ContextData;
use crate::error::{PathError, SetError};
use crate::path::{format_path, parse_path};
use crate::types::PathStep;
use serde_json::{Map, Value};

/// Outcome of a context mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextSetResult {
    /// The mutation applied; carries the new context.
    Succeed(ContextData),
    /// An intermediate segment (or the removed target) is missing.
    DoesNotExist { path: String },
    /// A segment runs into a value of the wrong shape, e.g. a primitive where
    /// the path implies a map.
    TypeMismatch { path: String },
    /// The path text could not be parsed.
    InvalidPath(PathError),
}

impl ContextSetResult {
    pub fn is_succeed(&self) -> bool {
        matches!(self, ContextSetResult::Succeed(_))
    }

    pub fn into_result(self) -> Result<ContextData, SetError> {
        match self {
            ContextSetResult::Succeed(context) => Ok(context),
            ContextSetResult::DoesNotExist { path } => Err(SetError::DoesNotExist { path }),
            ContextSetResult::TypeMismatch { path } => Err(SetError::TypeMismatch { path }),
            ContextSetResult::InvalidPath(err) => Err(SetError::InvalidPath(err)),
        }
    }
}

impl From<Result<ContextData, SetError>> for ContextSetResult {
    fn from(result: Result<ContextData, SetError>) -> Self {
        match result {
            Ok(context) => ContextSetResult::Succeed(context),
            Err(SetError::DoesNotExist { path }) => ContextSetResult::DoesNotExist { path },
            Err(SetError::TypeMismatch { path }) => ContextSetResult::TypeMismatch { path },
            Err(SetError::InvalidPath(err)) => ContextSetResult::InvalidPath(err),
        }
    }
}

/// Set `value` at `path` inside `context`.
///
/// A `None` or empty path replaces the whole value. The final segment may add
/// a new map key or append to a list (index equal to its length); every
/// segment before it must already exist.
///
/// # Example
///
/// ```
/// use beagle_context::{set, ContextData, ContextSetResult};
/// use serde_json::json;
///
/// let ctx = ContextData::from_value("user", json!({"age": 30}));
/// let ContextSetResult::Succeed(next) = set(&ctx, Some("age"), json!(31)) else {
///     panic!("set failed");
/// };
/// assert_eq!(next.value(), &json!({"age": 31}));
/// assert_eq!(ctx.value(), &json!({"age": 30}));
/// ```
pub fn set(context: &ContextData, path: Option<&str>, value: Value) -> ContextSetResult {
    try_set(context, path, value).into()
}

/// Remove the value at `path`, or reset the whole context to an empty map
/// when `path` is `None` or empty.
pub fn clear(context: &ContextData, path: Option<&str>) -> ContextSetResult {
    try_clear(context, path).into()
}

fn steps_of(path: Option<&str>) -> Result<Vec<PathStep>, SetError> {
    match path {
        None => Ok(Vec::new()),
        Some(text) => Ok(parse_path(text)?),
    }
}

fn try_set(context: &ContextData, path: Option<&str>, value: Value) -> Result<ContextData, SetError> {
    let steps = steps_of(path)?;
    let Some((last, parents)) = steps.split_last() else {
        return Ok(context.with_value(value));
    };
    let mut root = context.value().clone();
    match walk_mut(&mut root, parents)? {
        Value::Object(map) => {
            map.insert(last.as_key().into_owned(), value);
        }
        Value::Array(arr) => {
            let idx = last.as_index().ok_or_else(|| SetError::TypeMismatch {
                path: format_path(parents),
            })?;
            if idx < arr.len() {
                arr[idx] = value;
            } else if idx == arr.len() {
                arr.push(value);
            } else {
                return Err(SetError::DoesNotExist {
                    path: format_path(&steps),
                });
            }
        }
        _ => {
            return Err(SetError::TypeMismatch {
                path: format_path(parents),
            })
        }
    }
    Ok(context.with_value(root))
}

fn try_clear(context: &ContextData, path: Option<&str>) -> Result<ContextData, SetError> {
    let steps = steps_of(path)?;
    let Some((last, parents)) = steps.split_last() else {
        return Ok(context.with_value(Value::Object(Map::new())));
    };
    let mut root = context.value().clone();
    let missing = || SetError::DoesNotExist {
        path: format_path(&steps),
    };
    match walk_mut(&mut root, parents)? {
        Value::Object(map) => {
            map.shift_remove(last.as_key().as_ref()).ok_or_else(missing)?;
        }
        Value::Array(arr) => {
            let idx = last.as_index().ok_or_else(missing)?;
            if idx >= arr.len() {
                return Err(missing());
            }
            arr.remove(idx);
        }
        _ => {
            return Err(SetError::TypeMismatch {
                path: format_path(parents),
            })
        }
    }
    Ok(context.with_value(root))
}

/// Walk to an existing container, reporting which segment failed.
fn walk_mut<'a>(root: &'a mut Value, steps: &[PathStep]) -> Result<&'a mut Value, SetError> {
    let mut current = root;
    for (i, step) in steps.iter().enumerate() {
        let missing = || SetError::DoesNotExist {
            path: format_path(&steps[..=i]),
        };
        current = match current {
            Value::Object(map) => map.get_mut(step.as_key().as_ref()).ok_or_else(missing)?,
            Value::Array(arr) => {
                let idx = step.as_index().ok_or_else(|| SetError::TypeMismatch {
                    path: format_path(&steps[..i]),
                })?;
                arr.get_mut(idx).ok_or_else(missing)?
            }
            _ => {
                return Err(SetError::TypeMismatch {
                    path: format_path(&steps[..i]),
                })
            }
        };
    }
    Ok(current)
}
