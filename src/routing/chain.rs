//! Composite router delegating to registered adapters in order.
//!
//! # Responsibilities
//! - Own the ordered adapter list
//! - Broadcast the request context to every adapter
//! - Match: first adapter reporting a match wins
//! - Generate: first adapter that knows the route name wins
//!
//! # Design Decisions
//! - First match wins, never best match. When two modules register
//!   overlapping paths or the same route name, the module registered first
//!   shadows the later one. This is order-dependent on purpose and is a
//!   known footgun for colliding modules.
//! - Warm-up failures abort immediately; partial routing is never served

use url::Url;

use crate::routing::adapter::{RouteInfo, RouterAdapter};
use crate::routing::context::RequestContext;
use crate::routing::error::{RoutingError, RoutingResult};
use crate::routing::result::{RouteParams, RouteResult};

/// Ordered chain of router adapters.
#[derive(Debug, Default)]
pub struct ChainRouter {
    adapters: Vec<Box<dyn RouterAdapter>>,
    context: RequestContext,
}

impl ChainRouter {
    pub fn new(context: RequestContext) -> Self {
        Self {
            adapters: Vec::new(),
            context,
        }
    }

    /// Append an adapter. It is retargeted to the chain's current context.
    pub fn add(&mut self, mut adapter: Box<dyn RouterAdapter>) {
        adapter.set_context(self.context.clone());
        tracing::debug!(
            module = %adapter.module(),
            engine = adapter.engine(),
            position = self.adapters.len(),
            "Router registered"
        );
        self.adapters.push(adapter);
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    pub fn adapters(&self) -> impl Iterator<Item = &dyn RouterAdapter> {
        self.adapters.iter().map(|a| a.as_ref())
    }

    /// Routes of every adapter, grouped by module in registration order.
    pub fn routes(&self) -> Vec<(String, &'static str, Vec<RouteInfo>)> {
        self.adapters
            .iter()
            .map(|a| (a.module().to_string(), a.engine(), a.routes()))
            .collect()
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Replace the current context and hand a copy to every adapter.
    pub fn set_context(&mut self, context: RequestContext) {
        for adapter in &mut self.adapters {
            adapter.set_context(context.clone());
        }
        self.context = context;
    }

    /// Warm up every adapter in order; the first failure is returned.
    pub fn warm_up(&self) -> RoutingResult<()> {
        for adapter in &self.adapters {
            adapter.warm_up().map_err(|e| match e {
                RoutingError::Configuration(msg) => RoutingError::Configuration(format!(
                    "warm-up of module \"{}\" failed: {}",
                    adapter.module(),
                    msg
                )),
                other => other,
            })?;
        }
        Ok(())
    }

    /// Match a path against each adapter in registration order.
    pub fn match_path(&self, path: &str) -> RoutingResult<RouteResult> {
        for adapter in &self.adapters {
            let result = adapter.match_path(path)?;
            if let RouteResult::Matched(route) = result {
                tracing::debug!(
                    path = %path,
                    route = %route.route_name,
                    module = %adapter.module(),
                    "Route matched"
                );
                return Ok(RouteResult::Matched(route));
            }
        }
        tracing::debug!(path = %path, routers = self.adapters.len(), "No router matched");
        Ok(RouteResult::NoMatch)
    }

    /// Generate a URI, asking each adapter in order. Adapters that do not
    /// know the name are skipped; any other failure is returned as is.
    pub fn generate(&self, name: &str, params: &RouteParams) -> RoutingResult<String> {
        for adapter in &self.adapters {
            match adapter.generate(name, params) {
                Ok(uri) => return Ok(uri),
                Err(e) if e.is_route_not_found() => continue,
                Err(e) => return Err(e),
            }
        }
        Err(RoutingError::RouteNotFound(name.to_string()))
    }

    /// Generate an absolute URL using the current context.
    pub fn generate_absolute(&self, name: &str, params: &RouteParams) -> RoutingResult<Url> {
        let uri = self.generate(name, params)?;
        self.context.absolute_url(&uri)
    }
}
