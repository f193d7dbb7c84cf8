//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! application kernel. All types derive Serde traits for deserialization
//! from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::routing::context::RequestContext;
use crate::routing::fallback::DEFAULT_NOT_FOUND_ROUTE;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Application identity and mode.
    pub app: AppSettings,

    /// Listener configuration for the HTTP front-end.
    pub listener: ListenerConfig,

    /// Base request context (scheme, host, ports, base path).
    pub context: ContextConfig,

    /// Routing policy.
    pub routing: RoutingConfig,

    /// Modules contributing routes, in registration order.
    pub modules: Vec<ModuleConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Application identity and mode.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,

    /// "development", "production", ...
    pub environment: String,

    /// Debug mode: boot timing and detailed error bodies.
    pub debug: bool,
}

impl AppSettings {
    pub fn is_dev_mode(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "chain-router".to_string(),
            environment: "production".to_string(),
            debug: false,
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Request context defaults. Host and method are replaced per request by
/// the HTTP front-end.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContextConfig {
    pub scheme: String,
    pub host: String,
    pub http_port: u16,
    pub https_port: u16,

    /// Prefix the application is mounted under (e.g. "/myapp/public").
    pub base_path: String,
}

impl ContextConfig {
    pub fn to_context(&self) -> RequestContext {
        RequestContext::new("GET", &self.host, &self.scheme, &self.base_path)
            .with_ports(self.http_port, self.https_port)
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            http_port: 80,
            https_port: 443,
            base_path: String::new(),
        }
    }
}

/// Routing policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Route used when no router matches the request path.
    pub not_found_route: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            not_found_route: DEFAULT_NOT_FOUND_ROUTE.to_string(),
        }
    }
}

/// One module and the routes it contributes.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModuleConfig {
    /// Module name, reported as the matched module.
    pub name: String,

    /// Routing engine: "collection" or "tree".
    #[serde(default = "default_engine")]
    pub engine: String,

    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

fn default_engine() -> String {
    "collection".to_string()
}

/// Route definition.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RouteConfig {
    /// Route name used for generation.
    pub name: String,

    /// Path template, e.g. "/users/{id}".
    pub path: String,

    /// Target in `Module:Controller:action` form.
    pub controller: String,

    /// Allowed HTTP methods; empty allows all.
    #[serde(default)]
    pub methods: Vec<String>,

    /// Route priority (higher = checked first). Collection engine only.
    #[serde(default)]
    pub priority: i32,

    /// Placeholder regexes. Collection engine only.
    #[serde(default)]
    pub requirements: BTreeMap<String, String>,

    /// Default parameter values.
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
