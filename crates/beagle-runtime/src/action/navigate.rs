//! Navigation actions. The navigation itself belongs to the host; these
//! actions evaluate their properties and hand the result to a [`Navigator`].

use super::{Action, ActionScope};
use crate::error::ActionError;
use beagle_context::NavigationContext;
use beagle_expression::Bind;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// Screen fetched from a URL.
    Remote { url: Bind<String> },
    /// Screen description shipped inline.
    Local { screen: Value },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedRoute {
    Remote { url: String },
    Local { screen: Value },
}

/// Navigation context to pass to the next screen, still unevaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationContextBind {
    pub value: Bind<Value>,
    pub path: Option<String>,
}

/// Host navigation stack.
pub trait Navigator {
    fn push_view(&self, route: ResolvedRoute, context: Option<NavigationContext>);
    fn pop_view(&self, context: Option<NavigationContext>);
    fn pop_to_view(&self, route: String, context: Option<NavigationContext>);
    fn reset_application(&self, route: ResolvedRoute, context: Option<NavigationContext>);
    fn open_external_url(&self, url: String);
}

#[derive(Debug, Clone, PartialEq)]
pub enum Navigate {
    PushView {
        route: Route,
        navigation_context: Option<NavigationContextBind>,
    },
    PopView {
        navigation_context: Option<NavigationContextBind>,
    },
    PopToView {
        route: Bind<String>,
        navigation_context: Option<NavigationContextBind>,
    },
    ResetApplication {
        route: Route,
        navigation_context: Option<NavigationContextBind>,
    },
    OpenExternalUrl {
        url: Bind<String>,
    },
}

fn resolve_route(scope: &ActionScope<'_>, route: &Route) -> Result<ResolvedRoute, ActionError> {
    match route {
        Route::Remote { url } => scope
            .evaluate(url)
            .map(|url| ResolvedRoute::Remote { url })
            .ok_or(ActionError::Unresolved { property: "route" }),
        Route::Local { screen } => Ok(ResolvedRoute::Local {
            screen: screen.clone(),
        }),
    }
}

/// A navigation context whose value evaluates to `null` is passed along as
/// `null`.
fn resolve_context(
    scope: &ActionScope<'_>,
    context: &Option<NavigationContextBind>,
) -> Option<NavigationContext> {
    context.as_ref().map(|context| {
        let value = scope.evaluate(&context.value).unwrap_or(Value::Null);
        NavigationContext::new(value, context.path.clone())
    })
}

impl Action for Navigate {
    fn execute(&self, scope: &ActionScope<'_>) -> Result<(), ActionError> {
        let navigator = scope.dispatcher.navigator()?;
        match self {
            Navigate::PushView {
                route,
                navigation_context,
            } => navigator.push_view(
                resolve_route(scope, route)?,
                resolve_context(scope, navigation_context),
            ),
            Navigate::PopView { navigation_context } => {
                navigator.pop_view(resolve_context(scope, navigation_context))
            }
            Navigate::PopToView {
                route,
                navigation_context,
            } => {
                let route = scope
                    .evaluate(route)
                    .ok_or(ActionError::Unresolved { property: "route" })?;
                navigator.pop_to_view(route, resolve_context(scope, navigation_context))
            }
            Navigate::ResetApplication {
                route,
                navigation_context,
            } => navigator.reset_application(
                resolve_route(scope, route)?,
                resolve_context(scope, navigation_context),
            ),
            Navigate::OpenExternalUrl { url } => {
                let url = scope
                    .evaluate(url)
                    .ok_or(ActionError::Unresolved { property: "url" })?;
                navigator.open_external_url(url)
            }
        }
        Ok(())
    }
}
