//! Action dispatch.
//!
//! An event hands its list of actions to [`ActionDispatcher::handle_event`],
//! together with the implicit context it carries (`onPress`, `onChange`, ...).
//! Actions run in order. A failing action is logged and the next one still
//! runs; only [`ActionError::EvaluatedToNull`] stops the list and reaches the
//! caller.

mod condition;
mod navigate;
mod request;
mod set_context;

pub use condition::Condition;
pub use navigate::{Navigate, NavigationContextBind, Navigator, ResolvedRoute, Route};
pub use request::{
    Completion, HttpMethod, RequestClient, RequestData, RequestFailure, RequestOutcome, Response,
    SendRequest,
};
pub use set_context::SetContext;

use crate::error::ActionError;
use crate::implicit::SenderId;
use crate::registry::BindingRegistry;
use crate::tree::NodeId;
use beagle_context::ContextData;
use beagle_expression::Bind;
use request::{PendingRequest, RequestQueue};
use serde::de::DeserializeOwned;
use std::cell::Cell;
use std::fmt::Debug;
use std::rc::Rc;
use tracing::error;

pub trait Action: Debug {
    fn execute(&self, scope: &ActionScope<'_>) -> Result<(), ActionError>;
}

pub type ActionRef = Rc<dyn Action>;

/// A shared action list. Clones keep the identity of the list.
pub type ActionList = Rc<[ActionRef]>;

/// Identity of an action list, used as the sender of the implicit context
/// its event creates.
pub fn sender_of(actions: &ActionList) -> SenderId {
    SenderId::of(actions)
}

/// What an executing action can reach: the registry, the node that fired the
/// event and the dispatcher's host collaborators.
pub struct ActionScope<'a> {
    pub registry: &'a BindingRegistry,
    pub origin: NodeId,
    pub dispatcher: &'a ActionDispatcher,
}

impl ActionScope<'_> {
    /// Evaluates an action property from the origin's point of view.
    pub fn evaluate<T: DeserializeOwned + Clone>(&self, bind: &Bind<T>) -> Option<T> {
        self.registry.evaluate_for_action(self.origin, bind)
    }

    /// Runs a nested action list (a branch, a callback) for the same origin.
    pub fn run(&self, actions: &ActionList, implicit: Option<ContextData>) -> Result<(), ActionError> {
        self.dispatcher
            .handle_event(self.registry, self.origin, sender_of(actions), actions, implicit)
    }
}

/// Runs action lists for one screen and owns its host collaborators.
#[derive(Default)]
pub struct ActionDispatcher {
    navigator: Option<Rc<dyn Navigator>>,
    client: Option<Rc<dyn RequestClient>>,
    requests: RequestQueue,
    disposed: Cell<bool>,
}

impl Debug for ActionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDispatcher")
            .field("navigator", &self.navigator.is_some())
            .field("client", &self.client.is_some())
            .field("in_flight", &self.requests.in_flight())
            .field("disposed", &self.disposed.get())
            .finish()
    }
}

impl ActionDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_navigator(mut self, navigator: Rc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn with_client(mut self, client: Rc<dyn RequestClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn navigator(&self) -> Result<&dyn Navigator, ActionError> {
        self.navigator
            .as_deref()
            .ok_or(ActionError::MissingCollaborator("navigator"))
    }

    /// Runs `actions` fired by `origin`. `implicit`, when given, is
    /// registered for `origin` first so the actions can read it.
    pub fn handle_event(
        &self,
        registry: &BindingRegistry,
        origin: NodeId,
        sender: SenderId,
        actions: &[ActionRef],
        implicit: Option<ContextData>,
    ) -> Result<(), ActionError> {
        if let Some(context) = implicit {
            registry.add_implicit_context(context, sender, origin);
        }
        let scope = ActionScope {
            registry,
            origin,
            dispatcher: self,
        };
        for action in actions {
            match action.execute(&scope) {
                Ok(()) => {}
                Err(err @ ActionError::EvaluatedToNull { .. }) => return Err(err),
                Err(err) => error!(?action, error = %err, "action failed"),
            }
        }
        Ok(())
    }

    pub(crate) fn send_request(
        &self,
        request: RequestData,
        pending: PendingRequest,
    ) -> Result<(), ActionError> {
        if self.disposed.get() {
            return Err(ActionError::Disposed);
        }
        let client = self
            .client
            .as_ref()
            .ok_or(ActionError::MissingCollaborator("request client"))?;
        let completion = self.requests.register(pending);
        client.execute(request, completion);
        Ok(())
    }

    /// Runs the callbacks of every request that completed since the last
    /// call. Must be called on the UI thread. Returns how many ran.
    pub fn run_pending(&self, registry: &BindingRegistry) -> usize {
        let mut handled = 0;
        while let Some((pending, outcome)) = self.requests.next_completed() {
            handled += 1;
            if !registry.contains(pending.origin) {
                continue;
            }
            pending.finish(self, registry, outcome);
        }
        handled
    }

    /// Forgets every in-flight request; their completions are dropped when
    /// they arrive. Further requests are refused.
    pub fn dispose(&self) {
        self.disposed.set(true);
        self.requests.clear();
    }

    pub fn in_flight(&self) -> usize {
        self.requests.in_flight()
    }
}
