//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (the not-found route exists)
//! - Validate module and route definitions before any router is built
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::AppConfig;
use crate::routing::pattern::PathPattern;
use crate::routing::result::{ControllerRef, RESERVED_KEYS};
use crate::routing::source::EngineKind;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted location, e.g. `modules[1].routes[0].path`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("\"{}\" is not a socket address", config.listener.bind_address),
        ));
    }

    if !matches!(config.context.scheme.as_str(), "http" | "https") {
        errors.push(ValidationError::new(
            "context.scheme",
            format!("unsupported scheme \"{}\"", config.context.scheme),
        ));
    }

    let not_found = config.routing.not_found_route.trim();
    if not_found.is_empty() {
        errors.push(ValidationError::new(
            "routing.not_found_route",
            "must name a route",
        ));
    }

    let mut module_names = HashSet::new();
    let mut not_found_defined = false;

    for (m, module) in config.modules.iter().enumerate() {
        let at = format!("modules[{}]", m);

        if module.name.trim().is_empty() {
            errors.push(ValidationError::new(format!("{}.name", at), "must not be empty"));
        } else if !module_names.insert(module.name.as_str()) {
            errors.push(ValidationError::new(
                format!("{}.name", at),
                format!("duplicate module \"{}\"", module.name),
            ));
        }

        let engine = module.engine.parse::<EngineKind>();
        if let Err(e) = &engine {
            errors.push(ValidationError::new(format!("{}.engine", at), e.clone()));
        }

        for (r, route) in module.routes.iter().enumerate() {
            let at = format!("{}.routes[{}]", at, r);

            if route.name.trim().is_empty() {
                errors.push(ValidationError::new(format!("{}.name", at), "must not be empty"));
            }
            if route.name == not_found {
                not_found_defined = true;
            }
            if let Err(e) = PathPattern::parse(&route.path) {
                errors.push(ValidationError::new(format!("{}.path", at), e.to_string()));
            }
            if let Err(e) = route.controller.parse::<ControllerRef>() {
                errors.push(ValidationError::new(format!("{}.controller", at), e.to_string()));
            }
            for key in route.defaults.keys().filter(|k| RESERVED_KEYS.contains(&k.as_str())) {
                errors.push(ValidationError::new(
                    format!("{}.defaults.{}", at, key),
                    "reserved key, set by the route itself",
                ));
            }
            if engine == Ok(EngineKind::Tree) {
                if !route.requirements.is_empty() {
                    errors.push(ValidationError::new(
                        format!("{}.requirements", at),
                        "not supported by the tree engine",
                    ));
                }
                if route.priority != 0 {
                    errors.push(ValidationError::new(
                        format!("{}.priority", at),
                        "not supported by the tree engine",
                    ));
                }
            }
        }
    }

    if !config.modules.is_empty() && !not_found.is_empty() && !not_found_defined {
        errors.push(ValidationError::new(
            "routing.not_found_route",
            format!("route \"{}\" is not defined by any module", not_found),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ModuleConfig, RouteConfig};

    fn route(name: &str, path: &str, controller: &str) -> RouteConfig {
        RouteConfig {
            name: name.into(),
            path: path.into(),
            controller: controller.into(),
            ..Default::default()
        }
    }

    fn valid() -> AppConfig {
        let mut config = AppConfig::default();
        config.modules.push(ModuleConfig {
            name: "Framework".into(),
            engine: "collection".into(),
            routes: vec![route("error_404", "/404", "Framework:Error:notFound")],
        });
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid()).is_ok());
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid();
        config.listener.bind_address = "nowhere".into();
        config.modules.push(ModuleConfig {
            name: "Framework".into(),
            engine: "xml".into(),
            routes: vec![route("", "no-slash", "Bad")],
        });

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"listener.bind_address"));
        assert!(fields.contains(&"modules[1].name"));
        assert!(fields.contains(&"modules[1].engine"));
        assert!(fields.contains(&"modules[1].routes[0].name"));
        assert!(fields.contains(&"modules[1].routes[0].path"));
        assert!(fields.contains(&"modules[1].routes[0].controller"));
    }

    #[test]
    fn test_not_found_route_must_exist() {
        let mut config = valid();
        config.routing.not_found_route = "missing".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "routing.not_found_route");

        config.routing.not_found_route = " ".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_reserved_defaults_rejected() {
        let mut config = valid();
        let route = &mut config.modules[0].routes[0];
        route.defaults.insert("_controller".into(), "broken".into());
        route.defaults.insert("page".into(), "1".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "modules[0].routes[0].defaults._controller");
    }

    #[test]
    fn test_tree_rejects_collection_only_options() {
        let mut config = valid();
        let mut tree_route = route("tree_page", "/p/{id}", "Pages:Page:show");
        tree_route.priority = 5;
        tree_route.requirements.insert("id".into(), r"\d+".into());
        config.modules.push(ModuleConfig {
            name: "Pages".into(),
            engine: "tree".into(),
            routes: vec![tree_route],
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
