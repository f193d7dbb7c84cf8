//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn module configuration into the router chain
//! - Warm up every router and check the not-found route before serving
//! - Dispatch requests through the booted kernel
//!
//! # Design Decisions
//! - Fail fast: any boot error is fatal
//! - Boot runs once; later calls are no-ops
//! - The chain is only mutated during boot and by per-request `set_context`

use std::time::Instant;

use crate::config::AppConfig;
use crate::dispatch::{ControllerResolver, DispatchCoordinator, DispatchError, Dispatched};
use crate::observability::metrics::{self, DispatchOutcome};
use crate::routing::chain::ChainRouter;
use crate::routing::context::RequestContext;
use crate::routing::error::{RoutingError, RoutingResult};
use crate::routing::fallback::FallbackResolver;
use crate::routing::result::RouteParams;
use crate::routing::source::{build_chain, load_module_routes};

/// The application kernel: configuration plus, once booted, the dispatcher.
#[derive(Debug)]
pub struct Application {
    config: AppConfig,
    coordinator: Option<DispatchCoordinator>,
}

impl Application {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            coordinator: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.app.name
    }

    pub fn is_debug(&self) -> bool {
        self.config.app.debug
    }

    pub fn is_booted(&self) -> bool {
        self.coordinator.is_some()
    }

    /// Build, warm up and verify the router chain.
    pub fn boot(&mut self) -> RoutingResult<&mut Self> {
        if self.coordinator.is_some() {
            return Ok(self);
        }

        let started = Instant::now();
        tracing::debug!("Booting {} ...", self.config.app.name);

        let modules = load_module_routes(&self.config.modules)?;
        if self.config.app.debug {
            let names: Vec<&str> = modules.iter().map(|m| m.module.as_str()).collect();
            tracing::debug!(
                "All modules online ({}): \"{}\"",
                names.len(),
                names.join("\", \"")
            );
        }

        let chain = build_chain(self.config.context.to_context(), modules);
        chain.warm_up()?;

        let not_found = self.config.routing.not_found_route.clone();
        chain
            .generate(&not_found, &RouteParams::new())
            .map_err(|e| {
                RoutingError::config(format!("not-found route \"{}\" is unusable: {}", not_found, e))
            })?;

        tracing::info!(
            app = %self.config.app.name,
            environment = %self.config.app.environment,
            routers = chain.len(),
            not_found_route = %not_found,
            "Application booted"
        );
        if self.config.app.debug {
            tracing::debug!(
                "{} has booted (in {:.3} secs)",
                self.config.app.name,
                started.elapsed().as_secs_f64()
            );
        }

        self.coordinator = Some(DispatchCoordinator::new(chain, FallbackResolver::new(not_found)));
        Ok(self)
    }

    /// The booted router chain, for URL generation.
    pub fn router(&self) -> Option<&ChainRouter> {
        self.coordinator.as_ref().map(DispatchCoordinator::router)
    }

    pub fn coordinator(&self) -> Option<&DispatchCoordinator> {
        self.coordinator.as_ref()
    }

    pub fn coordinator_mut(&mut self) -> Option<&mut DispatchCoordinator> {
        self.coordinator.as_mut()
    }

    /// Generate a URI through the booted chain.
    pub fn generate(&mut self, name: &str, params: &RouteParams) -> RoutingResult<String> {
        self.booted()?.router().generate(name, params)
    }

    /// Dispatch `path` under `context`, booting first when needed.
    pub fn dispatch<C>(
        &mut self,
        path: &str,
        context: RequestContext,
        controllers: &C,
    ) -> Result<Dispatched<C::Output>, DispatchError>
    where
        C: ControllerResolver + ?Sized,
    {
        let started = Instant::now();
        let coordinator = self.booted()?;
        coordinator.set_context(context);

        let result = coordinator.dispatch(path, controllers);
        let outcome = match &result {
            Ok(dispatched) if dispatched.target.not_found => DispatchOutcome::NotFound,
            Ok(_) => DispatchOutcome::Matched,
            Err(_) => DispatchOutcome::Error,
        };
        metrics::record_dispatch(outcome, started);
        result
    }

    fn booted(&mut self) -> RoutingResult<&mut DispatchCoordinator> {
        self.boot()?;
        self.coordinator
            .as_mut()
            .ok_or_else(|| RoutingError::config("application failed to boot"))
    }
}
