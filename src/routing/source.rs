//! Module route contributions and chain construction.
//!
//! Every module hands over exactly one [`RouteSource`]. The variant decides
//! which adapter wraps it; there is one registration function per variant.

use std::fmt;
use std::str::FromStr;

use crate::config::schema::{ModuleConfig, RouteConfig};
use crate::routing::adapter::{CollectionAdapter, TreeAdapter};
use crate::routing::chain::ChainRouter;
use crate::routing::collection::{Route, RouteCollection};
use crate::routing::context::RequestContext;
use crate::routing::error::{RoutingError, RoutingResult};
use crate::routing::result::{ControllerRef, RESERVED_KEYS};
use crate::routing::tree::{TreeRoute, TreeRouter};

/// Supported routing engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Collection,
    Tree,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Tree => "tree",
        }
    }
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "collection" => Ok(Self::Collection),
            "tree" => Ok(Self::Tree),
            other => Err(format!("unknown routing engine \"{}\"", other)),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routes contributed by one module, in the format of one engine.
#[derive(Debug)]
pub enum RouteSource {
    Collection(RouteCollection),
    Tree(TreeRouter),
}

impl RouteSource {
    pub fn kind(&self) -> EngineKind {
        match self {
            Self::Collection(_) => EngineKind::Collection,
            Self::Tree(_) => EngineKind::Tree,
        }
    }

    /// Build the source described by a module's configuration. Errors name
    /// the offending module.
    pub fn from_config(module: &ModuleConfig) -> RoutingResult<Self> {
        let in_module = |e: String| {
            RoutingError::config(format!("module \"{}\": {}", module.name, e))
        };
        let kind: EngineKind = module.engine.parse().map_err(in_module)?;

        match kind {
            EngineKind::Collection => {
                let mut routes = RouteCollection::new();
                for config in &module.routes {
                    let route = collection_route(config).map_err(|e| in_module(e.to_string()))?;
                    routes.add(config.name.clone(), route);
                }
                Ok(Self::Collection(routes))
            }
            EngineKind::Tree => {
                let mut tree = TreeRouter::new();
                for config in &module.routes {
                    let route = tree_route(config).map_err(|e| in_module(e.to_string()))?;
                    tree.add(config.name.clone(), route)
                        .map_err(|e| in_module(e.to_string()))?;
                }
                Ok(Self::Tree(tree))
            }
        }
    }

    /// Wrap the source in its adapter and append it to the chain.
    pub fn register(self, module: &str, chain: &mut ChainRouter) {
        match self {
            Self::Collection(routes) => register_collection(chain, module, routes),
            Self::Tree(tree) => register_tree(chain, module, tree),
        }
    }
}

pub fn register_collection(chain: &mut ChainRouter, module: &str, routes: RouteCollection) {
    let context = chain.context().clone();
    chain.add(Box::new(CollectionAdapter::new(module, routes, context)));
}

pub fn register_tree(chain: &mut ChainRouter, module: &str, tree: TreeRouter) {
    let context = chain.context().clone();
    chain.add(Box::new(TreeAdapter::new(module, tree, context)));
}

/// A module name paired with its routes.
#[derive(Debug)]
pub struct ModuleRoutes {
    pub module: String,
    pub source: RouteSource,
}

impl ModuleRoutes {
    pub fn new(module: impl Into<String>, source: RouteSource) -> Self {
        Self {
            module: module.into(),
            source,
        }
    }
}

/// Convert every configured module, stopping at the first broken one.
pub fn load_module_routes(modules: &[ModuleConfig]) -> RoutingResult<Vec<ModuleRoutes>> {
    modules
        .iter()
        .map(|m| RouteSource::from_config(m).map(|source| ModuleRoutes::new(&m.name, source)))
        .collect()
}

/// Build a chain with one adapter per module, in module order.
pub fn build_chain(context: RequestContext, modules: Vec<ModuleRoutes>) -> ChainRouter {
    let mut chain = ChainRouter::new(context);
    for ModuleRoutes { module, source } in modules {
        tracing::debug!(module = %module, engine = %source.kind(), "Loading module routes");
        source.register(&module, &mut chain);
    }
    chain
}

/// Reserved keys are set from the route itself, never from defaults.
fn check_defaults(config: &RouteConfig) -> RoutingResult<()> {
    match config.defaults.keys().find(|k| RESERVED_KEYS.contains(&k.as_str())) {
        Some(key) => Err(RoutingError::config(format!(
            "route \"{}\": default \"{}\" is reserved",
            config.name, key
        ))),
        None => Ok(()),
    }
}

fn collection_route(config: &RouteConfig) -> RoutingResult<Route> {
    check_defaults(config)?;
    config.controller.parse::<ControllerRef>()?;
    let mut route = Route::new(&config.path)?
        .with_controller(config.controller.clone())
        .with_methods(&config.methods)
        .with_priority(config.priority);
    for (key, value) in &config.defaults {
        route = route.with_default(key.clone(), value.clone());
    }
    for (key, regex) in &config.requirements {
        route = route.with_requirement(key.clone(), regex.clone());
    }
    Ok(route)
}

fn tree_route(config: &RouteConfig) -> RoutingResult<TreeRoute> {
    if !config.requirements.is_empty() {
        return Err(RoutingError::config(format!(
            "route \"{}\": the tree engine does not support requirements",
            config.name
        )));
    }
    check_defaults(config)?;
    let target: ControllerRef = config.controller.parse()?;
    let mut route = TreeRoute::new(&config.path, target)?.with_methods(&config.methods);
    for (key, value) in &config.defaults {
        route = route.with_value(key.clone(), value.clone());
    }
    Ok(route)
}
