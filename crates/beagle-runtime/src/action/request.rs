//! Request actions and the hand-off of their completions to the UI thread.
//!
//! The host client may complete on any thread. Completions travel over a
//! channel and their callbacks run only when the UI thread calls
//! [`ActionDispatcher::run_pending`].

use super::{Action, ActionDispatcher, ActionList, ActionScope};
use crate::error::ActionError;
use crate::registry::BindingRegistry;
use crate::tree::NodeId;
use beagle_context::ContextData;
use beagle_expression::Bind;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

/// A request with every bound property already evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestData {
    pub url: String,
    pub method: HttpMethod,
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestFailure {
    pub status: Option<u16>,
    pub status_text: String,
    pub message: String,
    pub data: Value,
}

pub type RequestOutcome = Result<Response, RequestFailure>;

/// Executes requests for the runtime. Timeouts and retries are the client's
/// business.
pub trait RequestClient {
    fn execute(&self, request: RequestData, completion: Completion);
}

/// One-shot completion of a request. `Send`, so the client may finish on a
/// worker thread.
#[derive(Debug)]
pub struct Completion {
    ticket: u64,
    sender: Sender<(u64, RequestOutcome)>,
}

impl Completion {
    pub fn complete(self, outcome: RequestOutcome) {
        if self.sender.send((self.ticket, outcome)).is_err() {
            debug!(ticket = self.ticket, "request completed after its dispatcher was dropped");
        }
    }
}

pub(crate) struct PendingRequest {
    pub(crate) origin: NodeId,
    on_success: ActionList,
    on_error: ActionList,
    on_finish: ActionList,
}

impl PendingRequest {
    pub(crate) fn finish(self, dispatcher: &ActionDispatcher, registry: &BindingRegistry, outcome: RequestOutcome) {
        let scope = ActionScope {
            registry,
            origin: self.origin,
            dispatcher,
        };
        let result = match outcome {
            Ok(response) => scope.run(
                &self.on_success,
                Some(ContextData::from_value(
                    "onSuccess",
                    json!({
                        "data": response.data,
                        "status": response.status,
                        "statusText": response.status_text,
                    }),
                )),
            ),
            Err(failure) => scope.run(
                &self.on_error,
                Some(ContextData::from_value(
                    "onError",
                    json!({
                        "data": failure.data,
                        "status": failure.status,
                        "statusText": failure.status_text,
                        "message": failure.message,
                    }),
                )),
            ),
        };
        if let Err(err) = result {
            error!(error = %err, "request callback failed");
        }
        if let Err(err) = scope.run(&self.on_finish, None) {
            error!(error = %err, "request onFinish failed");
        }
    }
}

/// In-flight requests of one dispatcher, keyed by ticket.
pub(crate) struct RequestQueue {
    next_ticket: Cell<u64>,
    pending: RefCell<HashMap<u64, PendingRequest>>,
    sender: Sender<(u64, RequestOutcome)>,
    receiver: Receiver<(u64, RequestOutcome)>,
}

impl Default for RequestQueue {
    fn default() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            next_ticket: Cell::new(1),
            pending: RefCell::new(HashMap::new()),
            sender,
            receiver,
        }
    }
}

impl RequestQueue {
    pub(crate) fn register(&self, pending: PendingRequest) -> Completion {
        let ticket = self.next_ticket.get();
        self.next_ticket.set(ticket + 1);
        self.pending.borrow_mut().insert(ticket, pending);
        Completion {
            ticket,
            sender: self.sender.clone(),
        }
    }

    /// Next completion whose request is still wanted.
    pub(crate) fn next_completed(&self) -> Option<(PendingRequest, RequestOutcome)> {
        while let Ok((ticket, outcome)) = self.receiver.try_recv() {
            let pending = self.pending.borrow_mut().remove(&ticket);
            match pending {
                Some(pending) => return Some((pending, outcome)),
                None => debug!(ticket, "completion of a disposed request dropped"),
            }
        }
        None
    }

    pub(crate) fn clear(&self) {
        self.pending.borrow_mut().clear();
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.pending.borrow().len()
    }
}

/// `sendRequest`: evaluates the request, hands it to the host client and
/// later runs `on_success` (with `onSuccess`) or `on_error` (with `onError`),
/// then `on_finish`.
#[derive(Debug, Clone)]
pub struct SendRequest {
    pub url: Bind<String>,
    pub method: HttpMethod,
    pub headers: IndexMap<String, Bind<String>>,
    pub body: Option<Bind<Value>>,
    pub on_success: ActionList,
    pub on_error: ActionList,
    pub on_finish: ActionList,
}

impl SendRequest {
    pub fn new(url: Bind<String>) -> Self {
        Self {
            url,
            method: HttpMethod::Get,
            headers: IndexMap::new(),
            body: None,
            on_success: Rc::from(Vec::new()),
            on_error: Rc::from(Vec::new()),
            on_finish: Rc::from(Vec::new()),
        }
    }
}

impl Action for SendRequest {
    fn execute(&self, scope: &ActionScope<'_>) -> Result<(), ActionError> {
        let url = scope
            .evaluate(&self.url)
            .ok_or(ActionError::Unresolved { property: "url" })?;
        let mut headers = IndexMap::new();
        for (name, value) in &self.headers {
            let value = scope
                .evaluate(value)
                .ok_or(ActionError::Unresolved { property: "headers" })?;
            headers.insert(name.clone(), value);
        }
        let body = self.body.as_ref().and_then(|body| scope.evaluate(body));
        let request = RequestData {
            url,
            method: self.method,
            headers,
            body,
        };
        let pending = PendingRequest {
            origin: scope.origin,
            on_success: Rc::clone(&self.on_success),
            on_error: Rc::clone(&self.on_error),
            on_finish: Rc::clone(&self.on_finish),
        };
        scope.dispatcher.send_request(request, pending)
    }
}
