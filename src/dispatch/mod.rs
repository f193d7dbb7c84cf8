//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! request path
//!     → coordinator.rs: warm_up → match_path → (NoMatch? fallback)
//!     → DispatchTarget { module, controller, action, route_name, params }
//!     → controller.rs: ControllerResolver::invoke(target)
//! ```

pub mod controller;
pub mod coordinator;

pub use controller::{ControllerError, ControllerResolver, DispatchTarget};
pub use coordinator::{DispatchCoordinator, Dispatched};

use thiserror::Error;

use crate::routing::error::RoutingError;

/// Errors surfacing at the dispatch boundary.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Warm-up, matching, generation or not-found resolution failed.
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// The controller could not be located or failed.
    #[error(transparent)]
    Controller(#[from] ControllerError),
}

impl DispatchError {
    /// True when the not-found machinery itself is broken.
    pub fn is_fallback_failure(&self) -> bool {
        matches!(
            self,
            Self::Routing(RoutingError::FallbackUnavailable { .. } | RoutingError::FallbackUnmatched { .. })
        )
    }
}
