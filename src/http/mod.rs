//! HTTP front-end subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, routing context from Host + method)
//!     → Application::dispatch (lifecycle)
//!     → controllers.rs (handler lookup by Module:Controller:action)
//!     → response.rs (error mapping)
//!     → Send to client
//! ```

pub mod controllers;
pub mod request;
pub mod response;
pub mod server;

pub use controllers::{echo_action, Controllers};
pub use request::X_REQUEST_ID;
pub use server::HttpServer;
