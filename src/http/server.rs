//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with a single catch-all handler
//! - Wire up middleware (timeout, request ID, tracing)
//! - Derive the routing context and path from each request
//! - Dispatch through the application kernel and render the result
//!
//! # Design Decisions
//! - The kernel sits behind a mutex: its router chain carries the
//!   per-request context, so dispatches are serialized
//! - Paths are stripped of the base path before matching and passed on
//!   still percent-encoded; the engines decode them
//! - Not-found dispatches respond 404 whatever the controller returned

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Mutex};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{AppConfig, ContextConfig};
use crate::http::controllers::Controllers;
use crate::http::request::{request_context, request_id, MakeRequestUuidV4, X_REQUEST_ID};
use crate::http::response::error_response;
use crate::lifecycle::startup::Application;
use crate::routing::fallback::strip_base_path;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub app: Arc<Mutex<Application>>,
    pub controllers: Arc<Controllers>,
    pub context: ContextConfig,
    pub debug: bool,
}

/// HTTP front-end for the application kernel.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a server around a (possibly not yet booted) application.
    pub fn new(app: Application, controllers: Controllers) -> Self {
        let config = app.config().clone();
        let state = AppState {
            app: Arc::new(Mutex::new(app)),
            controllers: Arc::new(controllers),
            context: config.context.clone(),
            debug: config.app.debug,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %request_id(request),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            app = %self.config.app.name,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Catch-all handler: route the request and run its controller.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let context = request_context(&request, &state.context);
    let path = strip_base_path(request.uri().path(), context.base_path());

    tracing::debug!(
        request_id = %request_id(&request),
        method = %context.method(),
        host = %context.host(),
        path = %path,
        "Dispatching request"
    );

    let result = {
        let mut app = state.app.lock().await;
        app.dispatch(&path, context, state.controllers.as_ref())
    };

    match result {
        Ok(dispatched) => {
            let mut response = dispatched.output;
            if dispatched.target.not_found {
                *response.status_mut() = StatusCode::NOT_FOUND;
            }
            response
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id(&request),
                path = %path,
                error = %e,
                fallback_failure = e.is_fallback_failure(),
                "Dispatch failed"
            );
            error_response(&e, state.debug).into_response()
        }
    }
}
