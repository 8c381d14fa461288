use super::{Action, ActionScope};
use crate::error::ActionError;
use crate::registry::SetContextInternal;
use beagle_expression::Bind;
use serde::Deserialize;
use serde_json::Value;

/// `setContext`: writes a value into the nearest context with the given id.
///
/// A failed write (unknown id, bad path) is logged by the registry and is not
/// an error here. A value expression that evaluates to `null` is.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetContext {
    pub context_id: String,
    pub value: Bind<Value>,
    #[serde(default)]
    pub path: Option<String>,
}

impl Action for SetContext {
    fn execute(&self, scope: &ActionScope<'_>) -> Result<(), ActionError> {
        let value = match &self.value {
            Bind::Value(value) => value.clone(),
            expression => scope.evaluate(expression).ok_or_else(|| ActionError::EvaluatedToNull {
                context_id: self.context_id.clone(),
            })?,
        };
        scope.registry.update_context(
            scope.origin,
            SetContextInternal {
                context_id: self.context_id.clone(),
                value,
                path: self.path.clone(),
            },
        );
        Ok(())
    }
}
