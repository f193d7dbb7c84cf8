//! Controller registry for the HTTP front-end.
//!
//! Handlers are keyed by `Module:Controller:action`. Targets without a
//! registered handler go to the fallback action when one is set.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::dispatch::{ControllerError, ControllerResolver, DispatchTarget};

/// A controller action producing an HTTP response.
pub type Action = Arc<dyn Fn(&DispatchTarget) -> Result<Response, ControllerError> + Send + Sync>;

/// Maps handler keys to actions.
#[derive(Clone, Default)]
pub struct Controllers {
    actions: HashMap<String, Action>,
    fallback: Option<Action>,
}

impl Controllers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry answering every target with [`echo_action`].
    pub fn echo() -> Self {
        Self::new().with_fallback(echo_action)
    }

    /// Register an action for `Module:Controller:action`.
    pub fn register<F>(mut self, key: impl Into<String>, action: F) -> Self
    where
        F: Fn(&DispatchTarget) -> Result<Response, ControllerError> + Send + Sync + 'static,
    {
        self.actions.insert(key.into(), Arc::new(action));
        self
    }

    pub fn with_fallback<F>(mut self, action: F) -> Self
    where
        F: Fn(&DispatchTarget) -> Result<Response, ControllerError> + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(action));
        self
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Debug for Controllers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.actions.keys().collect();
        keys.sort();
        f.debug_struct("Controllers")
            .field("actions", &keys)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl ControllerResolver for Controllers {
    type Output = Response;

    fn invoke(&self, target: &DispatchTarget) -> Result<Response, ControllerError> {
        let key = target.handler_key();
        match self.actions.get(&key).or(self.fallback.as_ref()) {
            Some(action) => action(target),
            None => Err(ControllerError::NotFound(key)),
        }
    }
}

/// Respond with the dispatch target as JSON.
pub fn echo_action(target: &DispatchTarget) -> Result<Response, ControllerError> {
    let status = if target.not_found {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };
    Ok((status, Json(target.clone())).into_response())
}
