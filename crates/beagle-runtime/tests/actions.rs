//! Action dispatch: context writes, implicit contexts, navigation and
//! requests completed off the UI thread.

use beagle_context::{ContextData, NavigationContext};
use beagle_expression::Bind;
use beagle_runtime::action::{
    sender_of, Completion, Condition, HttpMethod, Navigate, NavigationContextBind, Navigator,
    RequestClient, RequestData, RequestFailure, Response, ResolvedRoute, Route, SendRequest,
    SetContext,
};
use beagle_runtime::{
    ActionDispatcher, ActionError, ActionList, ActionRef, BindingRegistry, GlobalContext, NodeId,
    NAVIGATION_CONTEXT_ID,
};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;

fn set_context(context_id: &str, path: Option<&str>, value: &str) -> ActionRef {
    let value = if value.contains("@{") {
        Bind::<Value>::expression(value).unwrap()
    } else {
        Bind::Value(Value::String(value.to_string()))
    };
    Rc::new(SetContext {
        context_id: context_id.to_string(),
        value,
        path: path.map(str::to_string),
    })
}

fn list(actions: Vec<ActionRef>) -> ActionList {
    actions.into()
}

fn screen(registry: &BindingRegistry) -> (NodeId, NodeId) {
    let root = registry.add_root();
    let button = registry.add_child(root).unwrap();
    registry.add_context(root, ContextData::from_value("form", json!({"name": "", "done": false})), false);
    (root, button)
}

fn fire(
    dispatcher: &ActionDispatcher,
    registry: &BindingRegistry,
    origin: NodeId,
    actions: &ActionList,
    implicit: Option<ContextData>,
) -> Result<(), ActionError> {
    dispatcher.handle_event(registry, origin, sender_of(actions), actions, implicit)
}

// -------------------------------------------------------------- SetContext

#[test]
fn test_set_context_reads_implicit_context() {
    let registry = BindingRegistry::new(GlobalContext::new());
    let dispatcher = ActionDispatcher::new();
    let (root, button) = screen(&registry);
    let actions: ActionList = list(vec![set_context("form", Some("name"), "@{onChange.value}")]);

    let event = ContextData::from_value("onChange", json!({"value": "Ana"}));
    fire(&dispatcher, &registry, button, &actions, Some(event)).unwrap();

    assert_eq!(registry.context_on(root, "form").unwrap().get(Some("name")), json!("Ana"));
    assert_eq!(registry.implicit_contexts_for_node(button).len(), 1);
    assert!(registry.implicit_contexts_for_node(root).is_empty());
}

#[test]
fn test_same_sender_replaces_implicit_context() {
    let registry = BindingRegistry::new(GlobalContext::new());
    let dispatcher = ActionDispatcher::new();
    let (root, button) = screen(&registry);
    let actions: ActionList = list(vec![set_context("form", Some("name"), "@{onChange.value}")]);

    for value in ["A", "AB"] {
        let event = ContextData::from_value("onChange", json!({ "value": value }));
        fire(&dispatcher, &registry, button, &actions, Some(event)).unwrap();
    }
    assert_eq!(registry.implicit_contexts_for_node(button).len(), 1);
    assert_eq!(registry.context_on(root, "form").unwrap().get(Some("name")), json!("AB"));
}

#[test]
fn test_distinct_lists_are_distinct_senders() {
    let registry = BindingRegistry::new(GlobalContext::new());
    let dispatcher = ActionDispatcher::new();
    let (root, button) = screen(&registry);
    let other = registry.add_child(root).unwrap();
    let first = list(Vec::new());
    let second = list(Vec::new());
    assert_ne!(sender_of(&first), sender_of(&second));
    assert_eq!(sender_of(&first), sender_of(&Rc::clone(&first)));

    fire(&dispatcher, &registry, button, &first, Some(ContextData::from_value("onPress", json!(1)))).unwrap();
    fire(&dispatcher, &registry, other, &second, Some(ContextData::from_value("onPress", json!(2)))).unwrap();
    assert_eq!(registry.implicit_contexts_for_node(button).len(), 1);
    assert_eq!(registry.implicit_contexts_for_node(other).len(), 1);
}

#[test]
fn test_null_value_stops_the_event() {
    let registry = BindingRegistry::new(GlobalContext::new());
    let dispatcher = ActionDispatcher::new();
    let (root, button) = screen(&registry);
    let actions = list(vec![
        set_context("form", Some("name"), "@{onPress.missing}"),
        set_context("form", Some("name"), "after"),
    ]);

    let result = fire(&dispatcher, &registry, button, &actions, Some(ContextData::from_value("onPress", json!({}))));
    assert_eq!(
        result,
        Err(ActionError::EvaluatedToNull {
            context_id: "form".into()
        })
    );
    assert_eq!(registry.context_on(root, "form").unwrap().get(Some("name")), json!(""));
}

#[test]
fn test_failing_action_does_not_stop_the_rest() {
    let registry = BindingRegistry::new(GlobalContext::new());
    let dispatcher = ActionDispatcher::new();
    let (root, button) = screen(&registry);
    let actions: ActionList = list(vec![
        Rc::new(Navigate::PopView {
            navigation_context: None,
        }),
        set_context("ghost", None, "ignored"),
        set_context("form", Some("name"), "ran"),
    ]);

    fire(&dispatcher, &registry, button, &actions, None).unwrap();
    assert_eq!(registry.context_on(root, "form").unwrap().get(Some("name")), json!("ran"));
}

#[test]
fn test_set_context_deserializes_bindable_value() {
    let action: SetContext =
        serde_json::from_value(json!({"contextId": "form", "value": "@{onPress.value}", "path": "name"})).unwrap();
    assert!(action.value.is_expression());
    assert_eq!(action.path.as_deref(), Some("name"));

    let broken = serde_json::from_value::<SetContext>(json!({"contextId": "form", "value": "@{a[0"}));
    assert!(broken.is_err());
}

// --------------------------------------------------------------- Condition

#[test]
fn test_condition_picks_branch() {
    let registry = BindingRegistry::new(GlobalContext::new());
    let dispatcher = ActionDispatcher::new();
    let (root, button) = screen(&registry);
    let condition: ActionRef = Rc::new(Condition {
        condition: Bind::<bool>::expression("@{gt(onPress.count, 2)}").unwrap(),
        on_true: list(vec![set_context("form", Some("name"), "many")]),
        on_false: list(vec![set_context("form", Some("name"), "few")]),
    });
    let actions: ActionList = list(vec![condition]);

    fire(&dispatcher, &registry, button, &actions, Some(ContextData::from_value("onPress", json!({"count": 1})))).unwrap();
    assert_eq!(registry.context_on(root, "form").unwrap().get(Some("name")), json!("few"));

    fire(&dispatcher, &registry, button, &actions, Some(ContextData::from_value("onPress", json!({"count": 5})))).unwrap();
    assert_eq!(registry.context_on(root, "form").unwrap().get(Some("name")), json!("many"));
}

// -------------------------------------------------------------- Navigation

#[derive(Default)]
struct RecordingNavigator {
    calls: RefCell<Vec<(String, Option<NavigationContext>)>>,
}

impl Navigator for RecordingNavigator {
    fn push_view(&self, route: ResolvedRoute, context: Option<NavigationContext>) {
        let ResolvedRoute::Remote { url } = route else {
            panic!("expected a remote route");
        };
        self.calls.borrow_mut().push((format!("push {url}"), context));
    }

    fn pop_view(&self, context: Option<NavigationContext>) {
        self.calls.borrow_mut().push(("pop".into(), context));
    }

    fn pop_to_view(&self, route: String, context: Option<NavigationContext>) {
        self.calls.borrow_mut().push((format!("popTo {route}"), context));
    }

    fn reset_application(&self, _route: ResolvedRoute, context: Option<NavigationContext>) {
        self.calls.borrow_mut().push(("reset".into(), context));
    }

    fn open_external_url(&self, url: String) {
        self.calls.borrow_mut().push((format!("open {url}"), None));
    }
}

#[test]
fn test_push_view_carries_navigation_context() {
    let registry = BindingRegistry::new(GlobalContext::new());
    let navigator = Rc::new(RecordingNavigator::default());
    let dispatcher = ActionDispatcher::new().with_navigator(navigator.clone());
    let (root, button) = screen(&registry);
    registry.update_context(
        button,
        beagle_runtime::SetContextInternal {
            context_id: "form".into(),
            value: json!("ana"),
            path: Some("name".into()),
        },
    );
    let actions: ActionList = list(vec![Rc::new(Navigate::PushView {
        route: Route::Remote {
            url: Bind::<String>::expression("/profile/@{form.name}").unwrap(),
        },
        navigation_context: Some(NavigationContextBind {
            value: Bind::<Value>::expression("@{form.name}").unwrap(),
            path: Some("user".into()),
        }),
    })]);

    fire(&dispatcher, &registry, button, &actions, None).unwrap();
    let calls = navigator.calls.borrow();
    assert_eq!(calls[0].0, "push /profile/ana");
    let handed = calls[0].1.clone().unwrap();

    let next_screen = registry.add_root();
    registry.apply_navigation_context(next_screen, handed.clone());
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let bind = Bind::<String>::expression("@{navigationContext.user}").unwrap();
    registry.observe_bind_changes(next_screen, &bind, move |value| sink.borrow_mut().push(value));
    assert_eq!(*log.borrow(), vec![Some("ana".to_string())]);
    assert!(registry.context_on(next_screen, NAVIGATION_CONTEXT_ID).is_some());
    assert!(registry.context_on(root, NAVIGATION_CONTEXT_ID).is_none());

    let wire = handed.to_wire().unwrap();
    assert_eq!(NavigationContext::from_wire(&wire).unwrap(), handed);
}

#[test]
fn test_navigation_without_navigator_is_logged_not_raised() {
    let registry = BindingRegistry::new(GlobalContext::new());
    let dispatcher = ActionDispatcher::new();
    let (_, button) = screen(&registry);
    let actions: ActionList = list(vec![Rc::new(Navigate::OpenExternalUrl {
        url: Bind::Value("https://example.com".into()),
    })]);
    assert!(fire(&dispatcher, &registry, button, &actions, None).is_ok());
}

// ----------------------------------------------------------------- Request

/// Completes every request from a worker thread.
struct ThreadClient {
    outcome: Result<Response, RequestFailure>,
    seen: RefCell<Vec<RequestData>>,
}

impl RequestClient for ThreadClient {
    fn execute(&self, request: RequestData, completion: Completion) {
        self.seen.borrow_mut().push(request);
        let outcome = self.outcome.clone();
        std::thread::spawn(move || completion.complete(outcome))
            .join()
            .unwrap();
    }
}

/// Holds completions until the test releases them.
#[derive(Default)]
struct HeldClient {
    held: RefCell<Vec<Completion>>,
}

impl RequestClient for HeldClient {
    fn execute(&self, _request: RequestData, completion: Completion) {
        self.held.borrow_mut().push(completion);
    }
}

fn request_action() -> SendRequest {
    let mut request = SendRequest::new(Bind::<String>::expression("/users/@{form.name}").unwrap());
    request.method = HttpMethod::Post;
    request
        .headers
        .insert("x-name".into(), Bind::<String>::expression("@{form.name}").unwrap());
    request.body = Some(Bind::<Value>::expression("@{form}").unwrap());
    request.on_success = list(vec![set_context("form", Some("name"), "@{onSuccess.data.name}")]);
    request.on_error = list(vec![set_context("form", Some("name"), "@{onError.message}")]);
    request.on_finish = list(vec![Rc::new(SetContext {
        context_id: "form".into(),
        value: Bind::Value(json!(true)),
        path: Some("done".into()),
    })]);
    request
}

#[test]
fn test_request_success_runs_on_ui_thread_turn() {
    let registry = BindingRegistry::new(GlobalContext::new());
    let client = Rc::new(ThreadClient {
        outcome: Ok(Response {
            status: 200,
            status_text: "OK".into(),
            data: json!({"name": "Server"}),
        }),
        seen: RefCell::new(Vec::new()),
    });
    let dispatcher = ActionDispatcher::new().with_client(client.clone());
    let (root, button) = screen(&registry);
    let actions: ActionList = list(vec![Rc::new(request_action())]);

    fire(&dispatcher, &registry, button, &actions, None).unwrap();
    let seen = client.seen.borrow()[0].clone();
    assert_eq!(seen.url, "/users/");
    assert_eq!(seen.method, HttpMethod::Post);
    assert_eq!(seen.body, Some(json!({"name": "", "done": false})));
    assert_eq!(registry.context_on(root, "form").unwrap().get(Some("done")), json!(false));

    assert_eq!(dispatcher.run_pending(&registry), 1);
    let form = registry.context_on(root, "form").unwrap();
    assert_eq!(form.get(None), json!({"name": "Server", "done": true}));
}

#[test]
fn test_request_failure_runs_on_error() {
    let registry = BindingRegistry::new(GlobalContext::new());
    let client = Rc::new(ThreadClient {
        outcome: Err(RequestFailure {
            status: Some(500),
            status_text: "Internal Server Error".into(),
            message: "boom".into(),
            data: Value::Null,
        }),
        seen: RefCell::new(Vec::new()),
    });
    let dispatcher = ActionDispatcher::new().with_client(client);
    let (root, button) = screen(&registry);
    let actions: ActionList = list(vec![Rc::new(request_action())]);

    fire(&dispatcher, &registry, button, &actions, None).unwrap();
    dispatcher.run_pending(&registry);
    let form = registry.context_on(root, "form").unwrap();
    assert_eq!(form.get(None), json!({"name": "boom", "done": true}));
}

#[test]
fn test_disposed_dispatcher_drops_late_completions() {
    let registry = BindingRegistry::new(GlobalContext::new());
    let client = Rc::new(HeldClient::default());
    let dispatcher = ActionDispatcher::new().with_client(client.clone());
    let (root, button) = screen(&registry);
    let actions: ActionList = list(vec![Rc::new(request_action())]);

    fire(&dispatcher, &registry, button, &actions, None).unwrap();
    assert_eq!(dispatcher.in_flight(), 1);
    dispatcher.dispose();
    for completion in client.held.borrow_mut().drain(..) {
        completion.complete(Ok(Response {
            status: 200,
            status_text: "OK".into(),
            data: json!({"name": "late"}),
        }));
    }

    assert_eq!(dispatcher.run_pending(&registry), 0);
    assert_eq!(registry.context_on(root, "form").unwrap().get(Some("name")), json!(""));
}
