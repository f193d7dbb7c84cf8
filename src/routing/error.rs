//! Routing error definitions.
//!
//! A path that matches nothing is not an error: it is reported as
//! [`RouteResult::NoMatch`](crate::routing::RouteResult::NoMatch).

use thiserror::Error;

/// Errors raised by route matching, generation and warm-up.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// No registered adapter knows the route name.
    #[error("Route \"{0}\" does not exist")]
    RouteNotFound(String),

    /// A placeholder of the route has no supplied value and no default.
    #[error("Missing parameter \"{parameter}\" to generate route \"{route}\"")]
    MissingParameter { route: String, parameter: String },

    /// A supplied value does not satisfy the placeholder requirement.
    #[error("Parameter \"{parameter}\" for route \"{route}\" must match \"{requirement}\" (\"{value}\" given)")]
    InvalidParameter {
        route: String,
        parameter: String,
        requirement: String,
        value: String,
    },

    /// Malformed route table or module contribution.
    #[error("Routing configuration error: {0}")]
    Configuration(String),

    /// The not-found route could not be generated.
    #[error("Unable to load not-found route \"{route}\": {source}")]
    FallbackUnavailable {
        route: String,
        #[source]
        source: Box<RoutingError>,
    },

    /// The not-found route was generated but nothing matches its path.
    #[error("Not-found route \"{route}\" generated \"{path}\" which no router matches")]
    FallbackUnmatched { route: String, path: String },
}

impl RoutingError {
    /// Convenience constructor for configuration errors.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// True when the error means "this router does not know the name".
    pub fn is_route_not_found(&self) -> bool {
        matches!(self, Self::RouteNotFound(_))
    }
}

/// Result type for routing operations.
pub type RoutingResult<T> = Result<T, RoutingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RoutingError::RouteNotFound("user_show".into());
        assert_eq!(err.to_string(), "Route \"user_show\" does not exist");

        let err = RoutingError::MissingParameter {
            route: "user_show".into(),
            parameter: "id".into(),
        };
        assert!(err.to_string().contains("\"id\""));
    }

    #[test]
    fn test_fallback_error_keeps_source() {
        let err = RoutingError::FallbackUnavailable {
            route: "error_404".into(),
            source: Box::new(RoutingError::RouteNotFound("error_404".into())),
        };
        let source = std::error::Error::source(&err).expect("source");
        assert!(source.to_string().contains("does not exist"));
        assert!(!err.is_route_not_found());
    }
}
