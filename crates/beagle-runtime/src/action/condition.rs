use super::{Action, ActionList, ActionScope};
use crate::error::ActionError;
use beagle_expression::Bind;

/// Runs `on_true` or `on_false` depending on a bound condition.
#[derive(Debug, Clone)]
pub struct Condition {
    pub condition: Bind<bool>,
    pub on_true: ActionList,
    pub on_false: ActionList,
}

impl Action for Condition {
    fn execute(&self, scope: &ActionScope<'_>) -> Result<(), ActionError> {
        let holds = scope
            .evaluate(&self.condition)
            .ok_or(ActionError::Unresolved { property: "condition" })?;
        let branch = if holds { &self.on_true } else { &self.on_false };
        scope.run(branch, None)
    }
}
