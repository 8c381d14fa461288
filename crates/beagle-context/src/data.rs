//! Context values and their cross-boundary wire form.

use crate::error::WireError;
use crate::get::get;
use crate::manipulate::{self, ContextSetResult};
use crate::path::parse_path;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Id reserved for the process-wide global context.
pub const GLOBAL_CONTEXT_ID: &str = "global";

/// A named, immutable context value.
///
/// The value is always in canonical form (primitive, ordered map or list);
/// mutations go through [`ContextData::set`] / [`ContextData::clear`] which
/// return a new context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextData {
    id: String,
    value: Value,
}

impl ContextData {
    /// Build a context from any serializable value, normalizing it into the
    /// canonical shape.
    pub fn new<T: Serialize>(id: impl Into<String>, value: T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: id.into(),
            value: serde_json::to_value(value)?,
        })
    }

    /// Build a context from a value that is already canonical.
    pub fn from_value(id: impl Into<String>, value: Value) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Same id, different value.
    pub fn with_value(&self, value: Value) -> Self {
        Self {
            id: self.id.clone(),
            value,
        }
    }

    /// Read the value at `path`. Unresolvable or malformed paths read as
    /// `null`.
    pub fn get(&self, path: Option<&str>) -> Value {
        let Some(path) = path else {
            return self.value.clone();
        };
        match parse_path(path) {
            Ok(steps) => get(&self.value, &steps).cloned().unwrap_or(Value::Null),
            Err(_) => Value::Null,
        }
    }

    pub fn set(&self, path: Option<&str>, value: Value) -> ContextSetResult {
        manipulate::set(self, path, value)
    }

    pub fn clear(&self, path: Option<&str>) -> ContextSetResult {
        manipulate::clear(self, path)
    }

    /// Two-field form used when a context crosses a navigation or process
    /// boundary. The value travels as text.
    pub fn to_wire(&self) -> Result<String, WireError> {
        let wire = ContextDataWire {
            id: self.id.clone(),
            value: stringify_value(&self.value),
        };
        Ok(serde_json::to_string(&wire)?)
    }

    pub fn from_wire(text: &str) -> Result<Self, WireError> {
        let wire: ContextDataWire = serde_json::from_str(text)?;
        Ok(Self {
            id: wire.id,
            value: renormalize_value(wire.value),
        })
    }
}

/// Context handed from one screen to the next on navigation.
///
/// Structurally a [`ContextData`] addressed by path instead of id; only this
/// type is ever serialized across screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub value: Value,
}

impl NavigationContext {
    pub fn new(value: Value, path: Option<String>) -> Self {
        Self { path, value }
    }

    pub fn to_wire(&self) -> Result<String, WireError> {
        let wire = NavigationContextWire {
            path: self.path.clone(),
            value: stringify_value(&self.value),
        };
        Ok(serde_json::to_string(&wire)?)
    }

    pub fn from_wire(text: &str) -> Result<Self, WireError> {
        let wire: NavigationContextWire = serde_json::from_str(text)?;
        Ok(Self {
            path: wire.path,
            value: renormalize_value(wire.value),
        })
    }
}

#[derive(Serialize, Deserialize)]
struct ContextDataWire {
    id: String,
    value: String,
}

#[derive(Serialize, Deserialize)]
struct NavigationContextWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    value: String,
}

fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JSON object/array text comes back structured; everything else is a string.
fn renormalize_value(text: String) -> Value {
    let trimmed = text.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(value @ (Value::Object(_) | Value::Array(_))) = serde_json::from_str::<Value>(&text) {
            return value;
        }
    }
    Value::String(text)
}
