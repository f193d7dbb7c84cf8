//! Request context shared by every router.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::routing::error::{RoutingError, RoutingResult};

/// Ambient request metadata used for matching and URL generation.
///
/// Adapters receive their own copy whenever the chain broadcasts a new
/// context; a copy held by an adapter is never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    method: String,
    host: String,
    scheme: String,
    http_port: u16,
    https_port: u16,
    base_path: String,
}

impl RequestContext {
    /// Create a context. The base path is normalized to either `""` or a
    /// path with a leading slash and no trailing slash.
    pub fn new(
        method: impl Into<String>,
        host: impl Into<String>,
        scheme: impl Into<String>,
        base_path: impl AsRef<str>,
    ) -> Self {
        Self {
            method: method.into().to_uppercase(),
            host: host.into().to_lowercase(),
            scheme: scheme.into().to_lowercase(),
            http_port: 80,
            https_port: 443,
            base_path: normalize_base_path(base_path.as_ref()),
        }
    }

    pub fn with_ports(mut self, http_port: u16, https_port: u16) -> Self {
        self.http_port = http_port;
        self.https_port = https_port;
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into().to_uppercase();
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into().to_lowercase();
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    pub fn https_port(&self) -> u16 {
        self.https_port
    }

    /// Port for the current scheme.
    pub fn port(&self) -> u16 {
        if self.scheme == "https" {
            self.https_port
        } else {
            self.http_port
        }
    }

    /// Build an absolute URL for a base-path-aware URI produced by
    /// `generate`. Default ports are left out.
    pub fn absolute_url(&self, uri: &str) -> RoutingResult<Url> {
        let port = match (self.scheme.as_str(), self.port()) {
            ("http", 80) | ("https", 443) => String::new(),
            (_, port) => format!(":{}", port),
        };
        let raw = format!("{}://{}{}{}", self.scheme, self.host, port, uri);
        Url::parse(&raw).map_err(|e| {
            RoutingError::config(format!("cannot build absolute URL from \"{}\": {}", raw, e))
        })
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new("GET", "localhost", "http", "")
    }
}

fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
