//! Segment-tree routing engine.
//!
//! # Data Flow
//! ```text
//! TreeRouter::add(name, TreeRoute)       (module load time)
//!     → warm_up(): build dispatch tree   (once)
//!     → match_path(path, method)
//!         → walk segments: static child, then placeholder, then catch-all
//!         → backtrack on dead ends
//! ```
//!
//! # Design Decisions
//! - Precedence is structural, not insertion order: a literal segment always
//!   beats a placeholder at the same depth
//! - Routes ending at the same node are tried in insertion order
//! - The engine has no request context; callers pass the method and add the
//!   base path to generated paths
//! - Each segment is decoded on its own, so an encoded `/` stays inside
//!   its segment

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::routing::error::{RoutingError, RoutingResult};
use crate::routing::pattern::{decode, split_path, PathPattern, Segment};
use crate::routing::result::{ControllerRef, RouteParams};

/// A route in the tree engine.
#[derive(Debug, Clone)]
pub struct TreeRoute {
    path: PathPattern,
    target: ControllerRef,
    values: RouteParams,
    methods: Vec<String>,
}

impl TreeRoute {
    pub fn new(path: &str, target: ControllerRef) -> RoutingResult<Self> {
        Ok(Self {
            path: PathPattern::parse(path)?,
            target,
            values: RouteParams::new(),
            methods: Vec::new(),
        })
    }

    /// Default value, used for generation and merged into match parameters.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

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

    pub fn path(&self) -> &PathPattern {
        &self.path
    }

    pub fn target(&self) -> &ControllerRef {
        &self.target
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    fn allows(&self, method: &str) -> bool {
        self.methods.is_empty()
            || self
                .methods
                .iter()
                .any(|m| m == method || (m == "GET" && method == "HEAD"))
    }
}

/// Result of a tree lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeMatch {
    pub name: String,
    pub target: ControllerRef,
    pub params: RouteParams,
}

#[derive(Debug, Default)]
struct Node {
    statics: HashMap<String, Node>,
    param: Option<Box<Node>>,
    catch_all: Vec<usize>,
    routes: Vec<usize>,
}

impl Node {
    fn insert(&mut self, index: usize, segments: &[Segment]) {
        let Some((head, rest)) = segments.split_first() else {
            self.routes.push(index);
            return;
        };
        match head {
            Segment::Static(text) => self
                .statics
                .entry(text.clone())
                .or_default()
                .insert(index, rest),
            Segment::Param(_) => self
                .param
                .get_or_insert_with(Default::default)
                .insert(index, rest),
            Segment::CatchAll(_) => self.catch_all.push(index),
        }
    }

    fn lookup(
        &self,
        segments: &[&str],
        captures: &mut Vec<String>,
        allowed: &dyn Fn(usize) -> bool,
    ) -> Option<usize> {
        let Some((head, rest)) = segments.split_first() else {
            return self.routes.iter().copied().find(|&i| allowed(i));
        };

        if let Some(child) = self.statics.get(*head) {
            if let Some(hit) = child.lookup(rest, captures, allowed) {
                return Some(hit);
            }
        }

        if let Some(child) = self.param.as_deref().filter(|_| !head.is_empty()) {
            captures.push(head.to_string());
            if let Some(hit) = child.lookup(rest, captures, allowed) {
                return Some(hit);
            }
            captures.pop();
        }

        let remainder = segments.join("/");
        if remainder.is_empty() {
            return None;
        }
        let hit = self.catch_all.iter().copied().find(|&i| allowed(i))?;
        captures.push(remainder);
        Some(hit)
    }
}

/// Router dispatching over a segment tree.
#[derive(Debug, Default)]
pub struct TreeRouter {
    routes: Vec<(String, TreeRoute)>,
    by_name: HashMap<String, usize>,
    tree: OnceLock<Node>,
}

impl TreeRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route. Names must be unique within one tree.
    pub fn add(&mut self, name: impl Into<String>, route: TreeRoute) -> RoutingResult<()> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(RoutingError::config(format!(
                "route \"{}\" is already registered in this tree",
                name
            )));
        }
        self.by_name.insert(name.clone(), self.routes.len());
        self.routes.push((name, route));
        self.tree = OnceLock::new();
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TreeRoute)> {
        self.routes.iter().map(|(name, route)| (name.as_str(), route))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Build the dispatch tree. Calling it again is a no-op.
    pub fn warm_up(&self) {
        self.tree();
    }

    /// Match a percent-encoded path. Captured values are decoded.
    pub fn match_path(&self, path: &str, method: &str) -> Option<TreeMatch> {
        let decoded: Vec<_> = split_path(path).into_iter().map(decode).collect();
        let segments: Vec<&str> = decoded.iter().map(|s| &**s).collect();
        let mut captures = Vec::new();
        let allowed = |i: usize| self.routes[i].1.allows(method);
        let index = self.tree().lookup(&segments, &mut captures, &allowed)?;

        let (name, route) = &self.routes[index];
        let mut params = route.values.clone();
        params.extend(
            route
                .path
                .variables()
                .map(str::to_string)
                .zip(captures),
        );

        Some(TreeMatch {
            name: name.clone(),
            target: route.target.clone(),
            params,
        })
    }

    /// Generate the application-relative path of a named route.
    pub fn generate(&self, name: &str, params: &RouteParams) -> RoutingResult<String> {
        let index = self
            .by_name
            .get(name)
            .ok_or_else(|| RoutingError::RouteNotFound(name.to_string()))?;
        let route = &self.routes[*index].1;
        route.path.check_segment_values(name, params, &route.values)?;
        route.path.expand(name, params, &route.values)
    }

    fn tree(&self) -> &Node {
        self.tree.get_or_init(|| {
            let mut root = Node::default();
            for (index, (_, route)) in self.routes.iter().enumerate() {
                root.insert(index, route.path.segments());
            }
            root
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(s: &str) -> ControllerRef {
        s.parse().unwrap()
    }

    fn tree() -> TreeRouter {
        let mut tree = TreeRouter::new();
        tree.add(
            "legacy_any",
            TreeRoute::new("/legacy/*", target("Legacy:Proxy:forward")).unwrap(),
        )
        .unwrap();
        tree.add(
            "post_show",
            TreeRoute::new("/posts/{slug}", target("Blog:Post:show")).unwrap(),
        )
        .unwrap();
        tree.add(
            "post_new",
            TreeRoute::new("/posts/new", target("Blog:Post:new")).unwrap(),
        )
        .unwrap();
        tree.add(
            "post_comment",
            TreeRoute::new("/posts/{slug}/comments", target("Blog:Comment:create"))
                .unwrap()
                .with_methods(["POST"]),
        )
        .unwrap();
        tree
    }

    #[test]
    fn test_static_beats_placeholder() {
        let tree = tree();
        let hit = tree.match_path("/posts/new", "GET").unwrap();
        assert_eq!(hit.name, "post_new");

        let hit = tree.match_path("/posts/hello", "GET").unwrap();
        assert_eq!(hit.name, "post_show");
        assert_eq!(hit.params["slug"], "hello");
    }

    #[test]
    fn test_catch_all() {
        let tree = tree();
        let hit = tree.match_path("/legacy/old/page.php", "GET").unwrap();
        assert_eq!(hit.name, "legacy_any");
        assert_eq!(hit.params["path"], "old/page.php");
        assert_eq!(hit.target.action, "forward");

        assert!(tree.match_path("/legacy", "GET").is_none());
        assert!(tree.match_path("/legacy/", "GET").is_none());
    }

    #[test]
    fn test_backtracking_and_methods() {
        let tree = tree();
        assert!(tree.match_path("/posts/new/comments", "GET").is_none());

        let hit = tree.match_path("/posts/new/comments", "POST").unwrap();
        assert_eq!(hit.name, "post_comment");
        assert_eq!(hit.params["slug"], "new");
    }

    #[test]
    fn test_generate() {
        let tree = tree();
        let mut params = RouteParams::new();
        params.insert("slug".into(), "hello".into());
        assert_eq!(tree.generate("post_show", &params).unwrap(), "/posts/hello");
        assert!(matches!(
            tree.generate("nope", &params),
            Err(RoutingError::RouteNotFound(_))
        ));
        assert!(matches!(
            tree.generate("post_show", &RouteParams::new()),
            Err(RoutingError::MissingParameter { .. })
        ));
    }

    #[test]
    fn test_encoded_segments() {
        let tree = tree();
        let hit = tree.match_path("/posts/hello%20world", "GET").unwrap();
        assert_eq!(hit.params["slug"], "hello world");

        let hit = tree.match_path("/posts/a%2Fb", "GET").unwrap();
        assert_eq!(hit.name, "post_show");
        assert_eq!(hit.params["slug"], "a/b");

        let hit = tree.match_path("/legacy/x%3Fy/z%23", "GET").unwrap();
        assert_eq!(hit.params["path"], "x?y/z#");

        let mut params = RouteParams::new();
        params.insert("path".into(), "x?y/z#".into());
        let uri = tree.generate("legacy_any", &params).unwrap();
        assert_eq!(uri, "/legacy/x%3Fy/z%23");
        assert_eq!(tree.match_path(&uri, "GET").unwrap().params["path"], "x?y/z#");
    }

    #[test]
    fn test_generate_rejects_slash_in_placeholder() {
        let tree = tree();
        let mut params = RouteParams::new();
        params.insert("slug".into(), "a/b".into());
        assert!(matches!(
            tree.generate("post_show", &params),
            Err(RoutingError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut tree = tree();
        let err = tree
            .add("post_new", TreeRoute::new("/x", target("A:B:c")).unwrap())
            .unwrap_err();
        assert!(matches!(err, RoutingError::Configuration(_)));
    }

    #[test]
    fn test_warm_up_is_idempotent() {
        let tree = tree();
        tree.warm_up();
        tree.warm_up();
        assert_eq!(tree.match_path("/posts/new", "GET").unwrap().name, "post_new");
    }
}
