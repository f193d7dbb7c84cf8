//! Chain-level routing behaviour: ordering, round trips, fallback.

use chain_router::dispatch::{DispatchCoordinator, DispatchError};
use chain_router::routing::collection::{Route, RouteCollection};
use chain_router::routing::tree::{TreeRoute, TreeRouter};
use chain_router::routing::{
    strip_base_path, ChainRouter, CollectionAdapter, FallbackResolver, RequestContext,
    RouteParams, RouteResult, RouterAdapter, RoutingError, TreeAdapter,
};

mod common;

fn params(pairs: &[(&str, &str)]) -> RouteParams {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn users() -> CollectionAdapter {
    let mut routes = RouteCollection::new();
    routes.add(
        "user_show",
        Route::new("/users/{id}").unwrap().with_controller("Users:User:show"),
    );
    CollectionAdapter::new("Users", routes, RequestContext::default())
}

fn legacy() -> TreeAdapter {
    let mut tree = TreeRouter::new();
    tree.add(
        "legacy_any",
        TreeRoute::new("/legacy/*", "Legacy:Proxy:forward".parse().unwrap()).unwrap(),
    )
    .unwrap();
    TreeAdapter::new("Legacy", tree, RequestContext::default())
}

fn framework() -> CollectionAdapter {
    let mut routes = RouteCollection::new();
    routes.add(
        "error_404",
        Route::new("/404").unwrap().with_controller("Framework:Error:notFound"),
    );
    CollectionAdapter::new("Framework", routes, RequestContext::default())
}

/// A second module claiming `/users/{id}` under another name.
fn shadow() -> CollectionAdapter {
    let mut routes = RouteCollection::new();
    routes.add(
        "shadow_user",
        Route::new("/users/{id}").unwrap().with_controller("Shadow:User:show"),
    );
    CollectionAdapter::new("Shadow", routes, RequestContext::default())
}

fn chain(context: RequestContext) -> ChainRouter {
    let mut chain = ChainRouter::new(context);
    chain.add(Box::new(users()));
    chain.add(Box::new(legacy()));
    chain.add(Box::new(framework()));
    chain
}

fn matched_name(chain: &ChainRouter, path: &str) -> Option<String> {
    chain
        .match_path(path)
        .unwrap()
        .route_name()
        .map(str::to_string)
}

#[test]
fn test_concrete_scenario() {
    let chain = chain(RequestContext::default());
    chain.warm_up().unwrap();

    let route = chain.match_path("/users/42").unwrap().into_matched().unwrap();
    assert_eq!(route.route_name, "user_show");
    assert_eq!(route.module, "Users");
    assert_eq!(route.params, params(&[("id", "42")]));

    let route = chain.match_path("/legacy/a/b").unwrap().into_matched().unwrap();
    assert_eq!(route.route_name, "legacy_any");
    assert_eq!(route.params, params(&[("path", "a/b")]));

    assert_eq!(chain.match_path("/unknown").unwrap(), RouteResult::NoMatch);

    let fallback = FallbackResolver::new("error_404").resolve(&chain).unwrap();
    assert_eq!(fallback.route_name, "error_404");
    assert_eq!(fallback.module, "Framework");
}

#[test]
fn test_generate_scenario() {
    let chain = chain(RequestContext::default());
    assert_eq!(chain.generate("user_show", &params(&[("id", "42")])).unwrap(), "/users/42");

    let err = chain.generate("nonexistent", &RouteParams::new()).unwrap_err();
    assert!(matches!(err, RoutingError::RouteNotFound(ref name) if name == "nonexistent"));
}

#[test]
fn test_single_claimant_wins_at_any_position() {
    for rotation in 0..3 {
        let mut adapters: Vec<Box<dyn RouterAdapter>> =
            vec![Box::new(users()), Box::new(legacy()), Box::new(framework())];
        adapters.rotate_left(rotation);

        let mut chain = ChainRouter::new(RequestContext::default());
        for adapter in adapters {
            chain.add(adapter);
        }
        assert_eq!(matched_name(&chain, "/users/1").as_deref(), Some("user_show"));
        assert_eq!(matched_name(&chain, "/legacy/x").as_deref(), Some("legacy_any"));
        assert_eq!(matched_name(&chain, "/404").as_deref(), Some("error_404"));
    }
}

#[test]
fn test_earliest_claimant_wins() {
    let mut first = ChainRouter::new(RequestContext::default());
    first.add(Box::new(users()));
    first.add(Box::new(shadow()));
    assert_eq!(matched_name(&first, "/users/9").as_deref(), Some("user_show"));

    let mut second = ChainRouter::new(RequestContext::default());
    second.add(Box::new(shadow()));
    second.add(Box::new(users()));
    assert_eq!(matched_name(&second, "/users/9").as_deref(), Some("shadow_user"));
}

#[test]
fn test_generate_then_match_round_trip() {
    let context = RequestContext::new("GET", "example.com", "https", "/myapp/public");
    let chain = chain(context.clone());

    let cases = [
        ("user_show", params(&[("id", "42")])),
        ("legacy_any", params(&[("path", "old/page")])),
        ("error_404", RouteParams::new()),
    ];
    for (name, values) in cases {
        let uri = chain.generate(name, &values).unwrap();
        assert!(uri.starts_with("/myapp/public/"), "{}", uri);

        let path = strip_base_path(&uri, context.base_path());
        let route = chain.match_path(&path).unwrap().into_matched().unwrap();
        assert_eq!(route.route_name, name);
        for (key, value) in &values {
            assert_eq!(route.params.get(key), Some(value));
        }
    }
}

#[test]
fn test_round_trip_with_reserved_characters() {
    let context = RequestContext::new("GET", "example.com", "http", "/myapp/public");
    let chain = chain(context.clone());

    for value in ["a?b", "a#b", "100%", "hello world", "?#% mixed"] {
        let uri = chain.generate("user_show", &params(&[("id", value)])).unwrap();
        let path = strip_base_path(&uri, context.base_path());
        let route = chain.match_path(&path).unwrap().into_matched().unwrap();
        assert_eq!(route.route_name, "user_show");
        assert_eq!(route.params["id"], value, "generated {}", uri);

        let rest = format!("{}/tail", value);
        let uri = chain.generate("legacy_any", &params(&[("path", &rest)])).unwrap();
        let path = strip_base_path(&uri, context.base_path());
        let route = chain.match_path(&path).unwrap().into_matched().unwrap();
        assert_eq!(route.params["path"], rest, "generated {}", uri);
    }
}

#[test]
fn test_warm_up_is_idempotent() {
    let once = chain(RequestContext::default());
    once.warm_up().unwrap();

    let twice = chain(RequestContext::default());
    twice.warm_up().unwrap();
    twice.warm_up().unwrap();

    for path in ["/users/42", "/legacy/a", "/404", "/unknown", "/"] {
        assert_eq!(once.match_path(path).unwrap(), twice.match_path(path).unwrap());
    }
}

#[test]
fn test_fallback_through_coordinator() {
    let coordinator = DispatchCoordinator::new(
        chain(RequestContext::new("GET", "localhost", "http", "/myapp/public")),
        FallbackResolver::new("error_404"),
    );

    let target = coordinator.resolve("/unknown").unwrap();
    assert!(target.not_found);
    assert_eq!(target.route_name, "error_404");
    assert_eq!(target.handler_key(), "Framework:Error:notFound");
}

#[test]
fn test_missing_not_found_route_is_fatal() {
    let mut router = ChainRouter::new(RequestContext::default());
    router.add(Box::new(users()));
    let coordinator = DispatchCoordinator::new(router, FallbackResolver::new("error_404"));

    let err = coordinator.resolve("/unknown").unwrap_err();
    assert!(err.is_fallback_failure());
    assert!(matches!(
        err,
        DispatchError::Routing(RoutingError::FallbackUnavailable { .. })
    ));
}

#[test]
fn test_application_from_config() {
    let mut app = common::booted(common::demo_config());
    let context = app.config().context.to_context();
    let target = app
        .coordinator_mut()
        .map(|c| {
            c.set_context(context);
            c.resolve("/users/abc")
        })
        .unwrap()
        .unwrap();

    // id must be numeric, so the request falls through to the not-found route
    assert!(target.not_found);
    assert_eq!(target.module, "Framework");
}
