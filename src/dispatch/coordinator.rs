//! Dispatch orchestration: warm-up, match, fallback, hand-off.
//!
//! # Responsibilities
//! - Warm up the router chain before matching
//! - Resolve the request path, falling back to the not-found route
//! - Decompose the result into a [`DispatchTarget`]
//! - Hand the target to a [`ControllerResolver`]
//!
//! # Design Decisions
//! - Warm-up and routing errors are returned unchanged; nothing is caught
//!   and hidden at dispatch time
//! - Controllers, configuration and sessions are somebody else's job

use crate::dispatch::controller::{ControllerResolver, DispatchTarget};
use crate::dispatch::DispatchError;
use crate::routing::chain::ChainRouter;
use crate::routing::context::RequestContext;
use crate::routing::fallback::FallbackResolver;
use crate::routing::result::RouteResult;

/// Sequences routing for one request at a time.
#[derive(Debug)]
pub struct DispatchCoordinator {
    router: ChainRouter,
    fallback: FallbackResolver,
}

impl DispatchCoordinator {
    pub fn new(router: ChainRouter, fallback: FallbackResolver) -> Self {
        Self { router, fallback }
    }

    pub fn router(&self) -> &ChainRouter {
        &self.router
    }

    pub fn fallback(&self) -> &FallbackResolver {
        &self.fallback
    }

    /// Retarget the chain for the next request.
    pub fn set_context(&mut self, context: RequestContext) {
        self.router.set_context(context);
    }

    /// Resolve a path (relative to the application root) to a target.
    pub fn resolve(&self, path: &str) -> Result<DispatchTarget, DispatchError> {
        self.router.warm_up()?;

        match self.router.match_path(path)? {
            RouteResult::Matched(route) => Ok(DispatchTarget::from_route(route, false)),
            RouteResult::NoMatch => {
                tracing::debug!(
                    path = %path,
                    route = %self.fallback.route_name(),
                    "No route matched, dispatching not-found route"
                );
                let route = self.fallback.resolve(&self.router)?;
                Ok(DispatchTarget::from_route(route, true))
            }
        }
    }

    /// Resolve a path and invoke its controller.
    pub fn dispatch<C>(&self, path: &str, controllers: &C) -> Result<Dispatched<C::Output>, DispatchError>
    where
        C: ControllerResolver + ?Sized,
    {
        let target = self.resolve(path)?;
        tracing::debug!(
            path = %path,
            route = %target.route_name,
            handler = %target.handler_key(),
            "Dispatching"
        );
        let output = controllers.invoke(&target)?;
        Ok(Dispatched { target, output })
    }
}

/// Controller output together with the target that produced it.
#[derive(Debug)]
pub struct Dispatched<T> {
    pub target: DispatchTarget,
    pub output: T,
}
