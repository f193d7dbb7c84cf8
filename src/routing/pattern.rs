//! Path templates shared by the routing engines.
//!
//! A template is a `/`-separated list of segments. Each segment is one of:
//! - literal text (`users`)
//! - a placeholder spanning the whole segment (`{id}`)
//! - a trailing catch-all (`{*rest}`, or a bare `*` named `path`)
//!
//! Engines decide how templates are matched; this module only parses them
//! and expands them back into paths.
//!
//! Templates and parameter values are plain text. Expanded paths are
//! percent-encoded, and engines decode request paths before matching.

use std::borrow::Cow;

use crate::routing::error::{RoutingError, RoutingResult};
use crate::routing::result::{RouteParams, RESERVED_KEYS};

/// Name given to an anonymous `*` catch-all.
pub const DEFAULT_CATCH_ALL: &str = "path";

/// One segment of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Static(String),
    Param(String),
    CatchAll(String),
}

/// A parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a template. Errors are configuration errors.
    pub fn parse(raw: &str) -> RoutingResult<Self> {
        if !raw.starts_with('/') {
            return Err(RoutingError::config(format!(
                "path \"{}\" must start with '/'",
                raw
            )));
        }

        let mut segments = Vec::new();
        let parts = split_path(raw);
        let last = parts.len().saturating_sub(1);

        for (i, part) in parts.iter().enumerate() {
            let segment = parse_segment(raw, part)?;
            if matches!(segment, Segment::CatchAll(_)) && i != last {
                return Err(RoutingError::config(format!(
                    "catch-all in \"{}\" must be the last segment",
                    raw
                )));
            }
            if let Some(name) = variable_name(&segment) {
                if segments.iter().any(|s| variable_name(s) == Some(name)) {
                    return Err(RoutingError::config(format!(
                        "placeholder \"{}\" appears twice in \"{}\"",
                        name, raw
                    )));
                }
            }
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder names in template order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(variable_name)
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables().any(|v| v == name)
    }

    /// Substitute placeholders and percent-encode the result. A value is
    /// taken from `params`, then from `defaults`. A `/` inside a value is
    /// kept as a separator; whether it is allowed is up to the engine.
    pub fn expand(
        &self,
        route: &str,
        params: &RouteParams,
        defaults: &RouteParams,
    ) -> RoutingResult<String> {
        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            match segment {
                Segment::Static(text) => path.push_str(&encode_segment(text)),
                Segment::Param(name) | Segment::CatchAll(name) => {
                    let value = lookup(name, params, defaults).ok_or_else(|| {
                        RoutingError::MissingParameter {
                            route: route.to_string(),
                            parameter: name.clone(),
                        }
                    })?;
                    path.push_str(&encode_value(value));
                }
            }
        }
        if path.is_empty() {
            path.push('/');
        }
        Ok(path)
    }

    /// Check values against the built-in placeholder rules: never empty,
    /// and no `/` outside a catch-all.
    pub fn check_segment_values(
        &self,
        route: &str,
        params: &RouteParams,
        defaults: &RouteParams,
    ) -> RoutingResult<()> {
        for segment in &self.segments {
            let (name, single_segment) = match segment {
                Segment::Static(_) => continue,
                Segment::Param(name) => (name, true),
                Segment::CatchAll(name) => (name, false),
            };
            let Some(value) = lookup(name, params, defaults) else {
                continue;
            };
            if value.is_empty() || (single_segment && value.contains('/')) {
                return Err(RoutingError::InvalidParameter {
                    route: route.to_string(),
                    parameter: name.clone(),
                    requirement: if single_segment { "[^/]+" } else { ".+" }.to_string(),
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}

fn lookup<'a>(name: &str, params: &'a RouteParams, defaults: &'a RouteParams) -> Option<&'a String> {
    params.get(name).or_else(|| defaults.get(name))
}

/// Percent-encode one path segment.
pub fn encode_segment(segment: &str) -> Cow<'_, str> {
    urlencoding::encode(segment)
}

fn encode_value(value: &str) -> String {
    value.split('/').map(encode_segment).collect::<Vec<_>>().join("/")
}

/// Decode percent escapes. Malformed escapes are kept as they are and
/// invalid UTF-8 is replaced.
pub fn decode(raw: &str) -> Cow<'_, str> {
    if !raw.contains('%') {
        return Cow::Borrowed(raw);
    }
    match urlencoding::decode(raw) {
        Ok(decoded) => Cow::Owned(decoded.into_owned()),
        Err(_) => Cow::Owned(
            String::from_utf8_lossy(&urlencoding::decode_binary(raw.as_bytes())).into_owned(),
        ),
    }
}

/// Split a path into segments. `""` and `"/"` have no segments; a trailing
/// slash yields a trailing empty segment.
pub fn split_path(path: &str) -> Vec<&str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}

fn variable_name(segment: &Segment) -> Option<&str> {
    match segment {
        Segment::Param(name) | Segment::CatchAll(name) => Some(name),
        Segment::Static(_) => None,
    }
}

fn parse_segment(raw: &str, part: &str) -> RoutingResult<Segment> {
    if part == "*" {
        return Ok(Segment::CatchAll(DEFAULT_CATCH_ALL.to_string()));
    }

    if let Some(inner) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
        let (catch_all, name) = match inner.strip_prefix('*') {
            Some(name) => (true, name),
            None => (false, inner),
        };
        validate_name(raw, name)?;
        return Ok(if catch_all {
            Segment::CatchAll(name.to_string())
        } else {
            Segment::Param(name.to_string())
        });
    }

    if part.contains(['{', '}', '*']) {
        return Err(RoutingError::config(format!(
            "segment \"{}\" in \"{}\" mixes text and placeholders",
            part, raw
        )));
    }

    Ok(Segment::Static(part.to_string()))
}

fn validate_name(raw: &str, name: &str) -> RoutingResult<()> {
    let valid = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    if !valid {
        return Err(RoutingError::config(format!(
            "invalid placeholder name \"{}\" in \"{}\"",
            name, raw
        )));
    }
    if RESERVED_KEYS.contains(&name) {
        return Err(RoutingError::config(format!(
            "placeholder \"{}\" in \"{}\" uses a reserved name",
            name, raw
        )));
    }
    Ok(())
}
