//! Uniform wrappers around the routing engines.
//!
//! # Responsibilities
//! - Expose every engine through the same [`RouterAdapter`] trait
//! - Translate native match output into [`RouteResult`]
//! - Stamp the owning module onto every match
//!
//! # Design Decisions
//! - "Nothing matched" is `Ok(RouteResult::NoMatch)`, never an error
//! - Errors from `match_path` always mean a broken route table

use std::fmt;

use crate::routing::collection::{PatternRouter, RouteCollection};
use crate::routing::context::RequestContext;
use crate::routing::error::RoutingResult;
use crate::routing::result::{MatchedRoute, RouteParams, RouteResult, CONTROLLER_KEY, MODULE_KEY};
use crate::routing::tree::TreeRouter;

/// Summary of a registered route, used for listings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RouteInfo {
    pub name: String,
    pub path: String,
    pub methods: Vec<String>,
    pub controller: Option<String>,
}

/// Common interface over one routing engine.
pub trait RouterAdapter: Send + Sync + fmt::Debug {
    /// Module that contributed the routes.
    fn module(&self) -> &str;

    /// Short engine identifier for logs.
    fn engine(&self) -> &'static str;

    /// Resolve a path relative to the application root.
    fn match_path(&self, path: &str) -> RoutingResult<RouteResult>;

    /// Reverse-route a name into a base-path-prefixed URI.
    fn generate(&self, name: &str, params: &RouteParams) -> RoutingResult<String>;

    fn set_context(&mut self, context: RequestContext);

    fn context(&self) -> &RequestContext;

    /// Idempotent preparation before the first match.
    fn warm_up(&self) -> RoutingResult<()> {
        Ok(())
    }

    fn routes(&self) -> Vec<RouteInfo>;
}

/// Adapter over the pattern-collection engine.
#[derive(Debug)]
pub struct CollectionAdapter {
    module: String,
    router: PatternRouter,
}

impl CollectionAdapter {
    pub fn new(module: impl Into<String>, routes: RouteCollection, context: RequestContext) -> Self {
        Self {
            module: module.into(),
            router: PatternRouter::new(routes, context),
        }
    }
}

impl RouterAdapter for CollectionAdapter {
    fn module(&self) -> &str {
        &self.module
    }

    fn engine(&self) -> &'static str {
        "collection"
    }

    fn match_path(&self, path: &str) -> RoutingResult<RouteResult> {
        let Some(mut attributes) = self.router.match_path(path)? else {
            return Ok(RouteResult::NoMatch);
        };
        attributes
            .entry(MODULE_KEY.to_string())
            .or_insert_with(|| self.module.clone());
        MatchedRoute::from_attributes(attributes).map(RouteResult::Matched)
    }

    fn generate(&self, name: &str, params: &RouteParams) -> RoutingResult<String> {
        self.router.generate(name, params)
    }

    fn set_context(&mut self, context: RequestContext) {
        self.router.set_context(context);
    }

    fn context(&self) -> &RequestContext {
        self.router.context()
    }

    fn warm_up(&self) -> RoutingResult<()> {
        self.router.warm_up()
    }

    fn routes(&self) -> Vec<RouteInfo> {
        self.router
            .routes()
            .iter()
            .map(|(name, route)| RouteInfo {
                name: name.to_string(),
                path: route.path().as_str().to_string(),
                methods: route.methods().to_vec(),
                controller: route.defaults().get(CONTROLLER_KEY).cloned(),
            })
            .collect()
    }
}

/// Adapter over the tree engine. The tree has no context of its own, so the
/// adapter keeps it and applies method and base path on the tree's behalf.
#[derive(Debug)]
pub struct TreeAdapter {
    module: String,
    router: TreeRouter,
    context: RequestContext,
}

impl TreeAdapter {
    pub fn new(module: impl Into<String>, router: TreeRouter, context: RequestContext) -> Self {
        Self {
            module: module.into(),
            router,
            context,
        }
    }
}

impl RouterAdapter for TreeAdapter {
    fn module(&self) -> &str {
        &self.module
    }

    fn engine(&self) -> &'static str {
        "tree"
    }

    fn match_path(&self, path: &str) -> RoutingResult<RouteResult> {
        let Some(hit) = self.router.match_path(path, self.context.method()) else {
            return Ok(RouteResult::NoMatch);
        };
        let mut target = hit.target;
        target.module = self.module.clone();
        Ok(RouteResult::Matched(MatchedRoute::new(hit.name, target, hit.params)))
    }

    fn generate(&self, name: &str, params: &RouteParams) -> RoutingResult<String> {
        let path = self.router.generate(name, params)?;
        Ok(format!("{}{}", self.context.base_path(), path))
    }

    fn set_context(&mut self, context: RequestContext) {
        self.context = context;
    }

    fn context(&self) -> &RequestContext {
        &self.context
    }

    fn warm_up(&self) -> RoutingResult<()> {
        self.router.warm_up();
        Ok(())
    }

    fn routes(&self) -> Vec<RouteInfo> {
        self.router
            .iter()
            .map(|(name, route)| RouteInfo {
                name: name.to_string(),
                path: route.path().as_str().to_string(),
                methods: route.methods().to_vec(),
                controller: Some(route.target().to_string()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::collection::Route;
    use crate::routing::tree::TreeRoute;

    fn context(base_path: &str) -> RequestContext {
        RequestContext::new("GET", "localhost", "http", base_path)
    }

    #[test]
    fn test_collection_adapter_stamps_module() {
        let mut routes = RouteCollection::new();
        routes.add(
            "user_show",
            Route::new("/users/{id}").unwrap().with_controller("Application:User:show"),
        );
        let adapter = CollectionAdapter::new("Users", routes, context(""));

        let result = adapter.match_path("/users/42").unwrap();
        let route = result.into_matched().unwrap();
        assert_eq!(route.module, "Users");
        assert_eq!(route.controller, "User");
        assert_eq!(route.action, "show");
        assert_eq!(route.params.get("id").map(String::as_str), Some("42"));
        assert!(!route.params.contains_key(MODULE_KEY));

        assert_eq!(adapter.match_path("/nope").unwrap(), RouteResult::NoMatch);
    }

    #[test]
    fn test_collection_adapter_route_without_controller_is_fatal() {
        let mut routes = RouteCollection::new();
        routes.add("bare", Route::new("/bare").unwrap());
        let adapter = CollectionAdapter::new("Users", routes, context(""));
        assert!(adapter.match_path("/bare").is_err());
    }

    #[test]
    fn test_tree_adapter_applies_context() {
        let mut tree = TreeRouter::new();
        tree.add(
            "legacy_any",
            TreeRoute::new("/legacy/*", "Legacy:Proxy:forward".parse().unwrap())
                .unwrap()
                .with_methods(["GET"]),
        )
        .unwrap();
        let mut adapter = TreeAdapter::new("Legacy", tree, context("/app"));

        let mut params = RouteParams::new();
        params.insert("path".into(), "a/b".into());
        assert_eq!(adapter.generate("legacy_any", &params).unwrap(), "/app/legacy/a/b");

        assert!(adapter.match_path("/legacy/a").unwrap().is_matched());
        adapter.set_context(context("/app").with_method("DELETE"));
        assert!(!adapter.match_path("/legacy/a").unwrap().is_matched());
        assert_eq!(adapter.context().method(), "DELETE");
    }
}
