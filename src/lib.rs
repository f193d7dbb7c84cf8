//! Chain router: module-contributed routing with a not-found fallback.

pub mod config;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::AppConfig;
pub use dispatch::{DispatchCoordinator, DispatchError, DispatchTarget};
pub use http::HttpServer;
pub use lifecycle::{Application, Shutdown};
pub use routing::{ChainRouter, RequestContext, RouteResult, RoutingError};
