//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Boot (once):
//!     ModuleConfig[] → source.rs (one RouteSource per module)
//!     → adapter.rs (CollectionAdapter | TreeAdapter)
//!     → chain.rs (ChainRouter, registration order preserved)
//!
//! Per request:
//!     ChainRouter::set_context(ctx)
//!     → ChainRouter::match_path(path) → first adapter that matches
//!     → on NoMatch: fallback.rs (generate 404 route, strip base path, re-match)
//!     → Return: MatchedRoute or typed RoutingError
//! ```
//!
//! # Design Decisions
//! - Engines stay independent; the chain only sees the adapter trait
//! - Deterministic: first registered adapter wins on overlapping routes
//! - No match is a value, not an error

pub mod adapter;
pub mod chain;
pub mod collection;
pub mod context;
pub mod error;
pub mod fallback;
pub mod pattern;
pub mod result;
pub mod source;
pub mod tree;

pub use adapter::{CollectionAdapter, RouteInfo, RouterAdapter, TreeAdapter};
pub use chain::ChainRouter;
pub use context::RequestContext;
pub use error::{RoutingError, RoutingResult};
pub use fallback::{strip_base_path, FallbackResolver};
pub use result::{ControllerRef, MatchedRoute, RouteParams, RouteResult};
pub use source::{build_chain, load_module_routes, EngineKind, ModuleRoutes, RouteSource};
