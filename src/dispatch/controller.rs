//! Hand-off contract between the dispatcher and controller code.

use serde::Serialize;
use thiserror::Error;

use crate::routing::result::{ControllerRef, MatchedRoute, RouteParams};

/// A resolved route decomposed for controller invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchTarget {
    pub module: String,
    pub controller: String,
    pub action: String,
    /// Name of the route that matched (the not-found route after fallback).
    pub route_name: String,
    /// Route parameters, reserved keys excluded.
    pub params: RouteParams,
    /// True when the request path matched nothing and the not-found route
    /// was dispatched instead.
    pub not_found: bool,
}

impl DispatchTarget {
    pub fn from_route(route: MatchedRoute, not_found: bool) -> Self {
        Self {
            module: route.module,
            controller: route.controller,
            action: route.action,
            route_name: route.route_name,
            params: route.params,
            not_found,
        }
    }

    /// `Module:Controller:action` key.
    pub fn handler_key(&self) -> String {
        ControllerRef {
            module: self.module.clone(),
            controller: self.controller.clone(),
            action: self.action.clone(),
        }
        .to_string()
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Errors raised while locating or running a controller action.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("No controller registered for {0}")]
    NotFound(String),

    #[error("Action {target} failed: {message}")]
    Failed { target: String, message: String },
}

/// Locates and runs the handler for a dispatch target.
pub trait ControllerResolver {
    type Output;

    fn invoke(&self, target: &DispatchTarget) -> Result<Self::Output, ControllerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_from_route() {
        let mut params = RouteParams::new();
        params.insert("id".into(), "42".into());
        let route = MatchedRoute::new("user_show", "Users:User:show".parse().unwrap(), params);

        let target = DispatchTarget::from_route(route, false);
        assert_eq!(target.handler_key(), "Users:User:show");
        assert_eq!(target.param("id"), Some("42"));
        assert_eq!(target.param("missing"), None);
        assert!(!target.not_found);
    }

    #[test]
    fn test_error_display() {
        let err = ControllerError::NotFound("Users:User:show".into());
        assert_eq!(err.to_string(), "No controller registered for Users:User:show");
    }
}
