//! Match outcome types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::routing::error::{RoutingError, RoutingResult};

/// Route parameters, ordered by key for stable generation output.
pub type RouteParams = BTreeMap<String, String>;

/// Reserved attribute naming the module that owns the route.
pub const MODULE_KEY: &str = "_module";
/// Reserved attribute holding `Module:Controller:action`.
pub const CONTROLLER_KEY: &str = "_controller";
/// Reserved attribute holding the matched route name.
pub const ROUTE_KEY: &str = "_route";

/// Keys used for bookkeeping that never reach controllers as parameters.
pub const RESERVED_KEYS: [&str; 3] = [MODULE_KEY, CONTROLLER_KEY, ROUTE_KEY];

/// A `Module:Controller:action` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerRef {
    pub module: String,
    pub controller: String,
    pub action: String,
}

impl FromStr for ControllerRef {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':').map(str::trim);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(module), Some(controller), Some(action))
                if !module.is_empty() && !controller.is_empty() && !action.is_empty() =>
            {
                Ok(Self {
                    module: module.to_string(),
                    controller: controller.to_string(),
                    action: action.to_string(),
                })
            }
            _ => Err(RoutingError::config(format!(
                "controller \"{}\" is not in Module:Controller:action form",
                s
            ))),
        }
    }
}

impl fmt::Display for ControllerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.module, self.controller, self.action)
    }
}

/// A successful match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedRoute {
    pub module: String,
    pub controller: String,
    pub action: String,
    pub route_name: String,
    /// Route parameters, reserved keys excluded.
    pub params: RouteParams,
}

impl MatchedRoute {
    pub fn new(route_name: impl Into<String>, target: ControllerRef, mut params: RouteParams) -> Self {
        for key in RESERVED_KEYS {
            params.remove(key);
        }
        Self {
            module: target.module,
            controller: target.controller,
            action: target.action,
            route_name: route_name.into(),
            params,
        }
    }

    /// Build from a flat attribute map carrying the reserved keys.
    ///
    /// `_route` and `_controller` are required. `_module`, when present,
    /// overrides the module part of `_controller`.
    pub fn from_attributes(mut attributes: RouteParams) -> RoutingResult<Self> {
        let route_name = attributes
            .remove(ROUTE_KEY)
            .ok_or_else(|| RoutingError::config("matched attributes carry no route name"))?;
        let controller = attributes.remove(CONTROLLER_KEY).ok_or_else(|| {
            RoutingError::config(format!("route \"{}\" has no controller", route_name))
        })?;
        let mut target: ControllerRef = controller.parse()?;
        if let Some(module) = attributes.remove(MODULE_KEY).filter(|m| !m.is_empty()) {
            target.module = module;
        }
        Ok(Self::new(route_name, target, attributes))
    }

    pub fn target(&self) -> ControllerRef {
        ControllerRef {
            module: self.module.clone(),
            controller: self.controller.clone(),
            action: self.action.clone(),
        }
    }
}

/// Outcome of matching a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteResult {
    Matched(MatchedRoute),
    NoMatch,
}

impl RouteResult {
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    pub fn route_name(&self) -> Option<&str> {
        match self {
            Self::Matched(route) => Some(&route.route_name),
            Self::NoMatch => None,
        }
    }

    pub fn into_matched(self) -> Option<MatchedRoute> {
        match self {
            Self::Matched(route) => Some(route),
            Self::NoMatch => None,
        }
    }
}

impl From<MatchedRoute> for RouteResult {
    fn from(route: MatchedRoute) -> Self {
        Self::Matched(route)
    }
}
