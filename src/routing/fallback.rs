//! Not-found routing policy.
//!
//! # Data Flow
//! ```text
//! match_path(path) == NoMatch
//!     → generate(not_found_route)          e.g. "/myapp/public/404"
//!     → strip base path by segments        "/404"
//!     → match_path("/404")                 final result
//! ```
//!
//! # Design Decisions
//! - Generation is base-path aware, matching is not; the prefix is removed
//!   on parsed segments, so `/app` never strips `/application/...`
//! - A broken not-found route is fatal and reported as its own error kind,
//!   distinct from the ordinary "nothing matched"

use crate::routing::chain::ChainRouter;
use crate::routing::error::{RoutingError, RoutingResult};
use crate::routing::pattern::{decode, split_path};
use crate::routing::result::{MatchedRoute, RouteParams, RouteResult};

/// Default name of the route used for unmatched requests.
pub const DEFAULT_NOT_FOUND_ROUTE: &str = "error_404";

/// Resolves the configured not-found route after a failed match.
#[derive(Debug, Clone)]
pub struct FallbackResolver {
    not_found_route: String,
}

impl FallbackResolver {
    pub fn new(not_found_route: impl Into<String>) -> Self {
        Self {
            not_found_route: not_found_route.into(),
        }
    }

    pub fn route_name(&self) -> &str {
        &self.not_found_route
    }

    /// Generate, strip and re-match the not-found route.
    pub fn resolve(&self, router: &ChainRouter) -> RoutingResult<MatchedRoute> {
        let uri = router
            .generate(&self.not_found_route, &RouteParams::new())
            .map_err(|e| self.unavailable(e))?;
        let path = strip_base_path(&uri, router.context().base_path());

        tracing::debug!(route = %self.not_found_route, uri = %uri, path = %path, "Resolving not-found route");

        match router.match_path(&path).map_err(|e| self.unavailable(e))? {
            RouteResult::Matched(route) => Ok(route),
            RouteResult::NoMatch => Err(RoutingError::FallbackUnmatched {
                route: self.not_found_route.clone(),
                path,
            }),
        }
    }

    fn unavailable(&self, source: RoutingError) -> RoutingError {
        RoutingError::FallbackUnavailable {
            route: self.not_found_route.clone(),
            source: Box::new(source),
        }
    }
}

impl Default for FallbackResolver {
    fn default() -> Self {
        Self::new(DEFAULT_NOT_FOUND_ROUTE)
    }
}

/// Remove a base path prefix from a percent-encoded URI, segment by
/// segment. The result stays encoded.
///
/// Matching only looks at the path, so a query string or fragment is
/// dropped. Placeholder values are encoded and never contribute either. A
/// URI outside the base path is returned unchanged apart from that.
pub fn strip_base_path(uri: &str, base_path: &str) -> String {
    let path = uri.split(['?', '#']).next().unwrap_or_default();
    let base = split_path(base_path);
    let segments = split_path(path);

    let prefixed = segments.len() >= base.len()
        && base.iter().zip(&segments).all(|(b, s)| decode(b) == decode(s));
    if base.is_empty() || !prefixed {
        return if path.is_empty() { "/".to_string() } else { path.to_string() };
    }

    format!("/{}", segments[base.len()..].join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::adapter::{CollectionAdapter, TreeAdapter};
    use crate::routing::collection::{Route, RouteCollection};
    use crate::routing::context::RequestContext;
    use crate::routing::tree::{TreeRoute, TreeRouter};

    #[test]
    fn test_strip_base_path() {
        assert_eq!(strip_base_path("/myapp/public/404", "/myapp/public"), "/404");
        assert_eq!(strip_base_path("/myapp/public", "/myapp/public"), "/");
        assert_eq!(strip_base_path("/myapp/public/", "/myapp/public"), "/");
        assert_eq!(strip_base_path("/404", ""), "/404");
        assert_eq!(strip_base_path("/404?x=1", ""), "/404");
        assert_eq!(strip_base_path("/app/404/", "/app"), "/404/");
        assert_eq!(strip_base_path("/application/404", "/app"), "/application/404");
        assert_eq!(strip_base_path("", "/app"), "/");
        assert_eq!(strip_base_path("/app/users/a%3Fb%23c", "/app"), "/users/a%3Fb%23c");
        assert_eq!(strip_base_path("/my%20app/404", "/my app"), "/404");
    }

    fn chain(base_path: &str) -> ChainRouter {
        let mut errors = RouteCollection::new();
        errors.add(
            "error_404",
            Route::new("/404").unwrap().with_controller("Framework:Error:notFound"),
        );
        let mut chain = ChainRouter::new(RequestContext::new("GET", "localhost", "http", base_path));
        chain.add(Box::new(CollectionAdapter::new(
            "Framework",
            errors,
            RequestContext::default(),
        )));
        chain
    }

    #[test]
    fn test_resolve_with_base_path() {
        let chain = chain("/myapp/public");
        let route = FallbackResolver::default().resolve(&chain).unwrap();
        assert_eq!(route.route_name, "error_404");
        assert_eq!(route.module, "Framework");
        assert_eq!(route.action, "notFound");
    }

    #[test]
    fn test_resolve_keeps_reserved_characters() {
        let mut errors = RouteCollection::new();
        errors.add(
            "error_404",
            Route::new("/errors/{code}")
                .unwrap()
                .with_controller("Framework:Error:notFound")
                .with_default("code", "not found?#"),
        );
        let mut chain = ChainRouter::new(RequestContext::new("GET", "localhost", "http", "/app"));
        chain.add(Box::new(CollectionAdapter::new("Framework", errors, RequestContext::default())));

        let route = FallbackResolver::default().resolve(&chain).unwrap();
        assert_eq!(route.params["code"], "not found?#");
    }

    #[test]
    fn test_unknown_not_found_route_is_fatal() {
        let chain = chain("");
        let err = FallbackResolver::new("missing_404").resolve(&chain).unwrap_err();
        assert!(matches!(err, RoutingError::FallbackUnavailable { ref route, .. } if route == "missing_404"));
    }

    #[test]
    fn test_unmatchable_not_found_route_is_fatal() {
        let mut tree = TreeRouter::new();
        tree.add(
            "error_404",
            TreeRoute::new("/404", "Framework:Error:notFound".parse().unwrap())
                .unwrap()
                .with_methods(["GET"]),
        )
        .unwrap();
        let mut chain = ChainRouter::new(RequestContext::default().with_method("POST"));
        chain.add(Box::new(TreeAdapter::new("Framework", tree, RequestContext::default())));

        let err = FallbackResolver::default().resolve(&chain).unwrap_err();
        assert!(matches!(err, RoutingError::FallbackUnmatched { ref path, .. } if path == "/404"));
    }
}
