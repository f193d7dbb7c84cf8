//! Pattern-collection routing engine.
//!
//! # Responsibilities
//! - Hold named routes with defaults, requirements and method constraints
//! - Compile every route into an anchored regex, ordered by priority
//! - Match a path against the compiled list, first hit wins
//! - Generate paths back from a route name, prefixed with the base path
//!
//! # Design Decisions
//! - Compilation happens once, on warm-up or on the first match
//! - Higher priority is checked first; equal priority keeps insertion order
//! - Parameters that are not placeholders become the query string
//! - Requirements see decoded values: the path is decoded before matching
//!   and values are checked before encoding. A requirement decides alone
//!   whether a placeholder may span `/`

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::routing::context::RequestContext;
use crate::routing::error::{RoutingError, RoutingResult};
use crate::routing::pattern::{decode, PathPattern, Segment};
use crate::routing::result::{RouteParams, CONTROLLER_KEY, RESERVED_KEYS, ROUTE_KEY};

const DEFAULT_REQUIREMENT: &str = "[^/]+";
const CATCH_ALL_REQUIREMENT: &str = ".+";

/// A single route definition.
#[derive(Debug, Clone)]
pub struct Route {
    path: PathPattern,
    defaults: RouteParams,
    requirements: BTreeMap<String, String>,
    methods: Vec<String>,
    priority: i32,
}

impl Route {
    pub fn new(path: &str) -> RoutingResult<Self> {
        Ok(Self {
            path: PathPattern::parse(path)?,
            defaults: RouteParams::new(),
            requirements: BTreeMap::new(),
            methods: Vec::new(),
            priority: 0,
        })
    }

    /// Set the `Module:Controller:action` target.
    pub fn with_controller(self, controller: impl Into<String>) -> Self {
        self.with_default(CONTROLLER_KEY, controller)
    }

    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    pub fn with_requirement(mut self, key: impl Into<String>, regex: impl Into<String>) -> Self {
        self.requirements.insert(key.into(), regex.into());
        self
    }

    /// Restrict to the given HTTP methods. Empty means any method.
    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.methods = methods
            .into_iter()
            .map(|m| m.as_ref().to_uppercase())
            .collect();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn path(&self) -> &PathPattern {
        &self.path
    }

    pub fn defaults(&self) -> &RouteParams {
        &self.defaults
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    fn allows(&self, method: &str) -> bool {
        self.methods.is_empty()
            || self
                .methods
                .iter()
                .any(|m| m == method || (m == "GET" && method == "HEAD"))
    }

    fn requirement(&self, variable: &str, catch_all: bool) -> &str {
        match self.requirements.get(variable) {
            Some(requirement) => requirement,
            None if catch_all => CATCH_ALL_REQUIREMENT,
            None => DEFAULT_REQUIREMENT,
        }
    }
}

/// Named routes in insertion order.
///
/// Adding a name that already exists replaces the earlier route and moves
/// it to the end.
#[derive(Debug, Clone, Default)]
pub struct RouteCollection {
    routes: Vec<(String, Route)>,
}

impl RouteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, route: Route) {
        let name = name.into();
        self.routes.retain(|(existing, _)| *existing != name);
        self.routes.push((name, route));
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, route)| route)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Route)> {
        self.routes.iter().map(|(name, route)| (name.as_str(), route))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// A route compiled for matching and generation.
#[derive(Debug)]
struct CompiledRoute {
    index: usize,
    regex: Regex,
    /// Anchored requirement checks used when generating.
    checks: Vec<(String, String, Regex)>,
}

/// Router over a [`RouteCollection`] with its own request context.
#[derive(Debug)]
pub struct PatternRouter {
    routes: RouteCollection,
    context: RequestContext,
    compiled: OnceLock<Result<Vec<CompiledRoute>, String>>,
}

impl PatternRouter {
    pub fn new(routes: RouteCollection, context: RequestContext) -> Self {
        Self {
            routes,
            context,
            compiled: OnceLock::new(),
        }
    }

    pub fn routes(&self) -> &RouteCollection {
        &self.routes
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    pub fn set_context(&mut self, context: RequestContext) {
        self.context = context;
    }

    /// Compile all patterns. Calling it again is a no-op.
    pub fn warm_up(&self) -> RoutingResult<()> {
        self.compiled().map(|_| ())
    }

    /// Match a percent-encoded path, returning the route attributes
    /// (defaults, decoded placeholders and `_route`) of the first matching
    /// route.
    pub fn match_path(&self, path: &str) -> RoutingResult<Option<RouteParams>> {
        let decoded = decode(path);
        let path = if decoded.is_empty() { "/" } else { decoded.as_ref() };
        let method = self.context.method();

        for compiled in self.compiled()? {
            let (name, route) = &self.routes.routes[compiled.index];
            if !route.allows(method) {
                continue;
            }
            let Some(captures) = compiled.regex.captures(path) else {
                continue;
            };

            let mut attributes = route.defaults.clone();
            for variable in route.path.variables() {
                if let Some(value) = captures.name(variable) {
                    attributes.insert(variable.to_string(), value.as_str().to_string());
                }
            }
            attributes.insert(ROUTE_KEY.to_string(), name.clone());
            return Ok(Some(attributes));
        }

        Ok(None)
    }

    /// Generate the base-path-prefixed URI of a named route.
    pub fn generate(&self, name: &str, params: &RouteParams) -> RoutingResult<String> {
        let route = self
            .routes
            .get(name)
            .ok_or_else(|| RoutingError::RouteNotFound(name.to_string()))?;
        let compiled = self
            .compiled()?
            .iter()
            .find(|c| self.routes.routes[c.index].0 == name)
            .ok_or_else(|| RoutingError::RouteNotFound(name.to_string()))?;

        for (variable, requirement, check) in &compiled.checks {
            let Some(value) = params.get(variable).or_else(|| route.defaults.get(variable)) else {
                return Err(RoutingError::MissingParameter {
                    route: name.to_string(),
                    parameter: variable.clone(),
                });
            };
            if !check.is_match(value) {
                return Err(RoutingError::InvalidParameter {
                    route: name.to_string(),
                    parameter: variable.clone(),
                    requirement: requirement.clone(),
                    value: value.clone(),
                });
            }
        }
        let path = route.path.expand(name, params, &route.defaults)?;

        let extras: Vec<(&String, &String)> = params
            .iter()
            .filter(|(key, value)| {
                !route.path.has_variable(key)
                    && !RESERVED_KEYS.contains(&key.as_str())
                    && route.defaults.get(*key) != Some(*value)
            })
            .collect();

        let mut uri = format!("{}{}", self.context.base_path(), path);
        if !extras.is_empty() {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(extras)
                .finish();
            uri.push('?');
            uri.push_str(&query);
        }
        Ok(uri)
    }

    fn compiled(&self) -> RoutingResult<&[CompiledRoute]> {
        self.compiled
            .get_or_init(|| compile(&self.routes))
            .as_deref()
            .map_err(|e| RoutingError::Configuration(e.clone()))
    }
}

fn compile(routes: &RouteCollection) -> Result<Vec<CompiledRoute>, String> {
    let mut order: Vec<usize> = (0..routes.routes.len()).collect();
    order.sort_by_key(|&i| Reverse(routes.routes[i].1.priority));

    order
        .into_iter()
        .map(|index| {
            let (name, route) = &routes.routes[index];
            compile_route(name, route).map(|(regex, checks)| CompiledRoute {
                index,
                regex,
                checks,
            })
        })
        .collect()
}

type Checks = Vec<(String, String, Regex)>;

fn compile_route(name: &str, route: &Route) -> Result<(Regex, Checks), String> {
    let mut source = String::from("^");
    let mut checks = Vec::new();

    if route.path.segments().is_empty() {
        source.push('/');
    }
    for segment in route.path.segments() {
        source.push('/');
        let (variable, catch_all) = match segment {
            Segment::Static(text) => {
                source.push_str(&regex::escape(text));
                continue;
            }
            Segment::Param(variable) => (variable, false),
            Segment::CatchAll(variable) => (variable, true),
        };
        let requirement = route.requirement(variable, catch_all);
        source.push_str(&format!("(?P<{}>(?:{}))", variable, requirement));
        let check = Regex::new(&format!("^(?:{})$", requirement)).map_err(|e| {
            format!("route \"{}\": bad requirement for \"{}\": {}", name, variable, e)
        })?;
        checks.push((variable.clone(), requirement.to_string(), check));
    }
    source.push('$');

    let regex = Regex::new(&source)
        .map_err(|e| format!("route \"{}\": cannot compile \"{}\": {}", name, route.path.as_str(), e))?;
    Ok((regex, checks))
}
