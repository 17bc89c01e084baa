//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Compile `RouteConfig`s into immutable routes
//! - Look up the matching route for a request
//! - Map the inbound path onto the upstream path
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) path prefix scan (acceptable for typical route counts)
//! - Ordered by priority, then by longest prefix
//! - Explicit no-match rather than silent default

use axum::body::Body;
use axum::http::{Method, Request};

use crate::config::{BodyMode, CredentialSource, PostProcess, RouteConfig};
use crate::routing::matcher::{AndMatcher, Matcher, MethodMatcher, PathPrefixMatcher};

/// A compiled gateway route.
#[derive(Debug)]
pub struct Route {
    name: String,
    priority: u32,
    path: PathPrefixMatcher,
    matcher: AndMatcher,
    upstream_prefix: String,
    body_mode: BodyMode,
    credential_source: CredentialSource,
    post_process: PostProcess,
}

impl Route {
    pub fn from_config(config: &RouteConfig) -> Self {
        // Validation has already rejected unparseable methods.
        let methods = config
            .methods
            .iter()
            .filter_map(|m| m.to_ascii_uppercase().parse::<Method>().ok())
            .collect();

        Self {
            name: config.name.clone(),
            priority: config.priority,
            path: PathPrefixMatcher::new(config.path_prefix.as_str()),
            matcher: AndMatcher::new(vec![
                Box::new(PathPrefixMatcher::new(config.path_prefix.as_str())),
                Box::new(MethodMatcher::new(methods)),
            ]),
            upstream_prefix: config.upstream_prefix.trim_end_matches('/').to_string(),
            body_mode: config.body,
            credential_source: config.credential,
            post_process: config.post_process,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body_mode(&self) -> BodyMode {
        self.body_mode
    }

    pub fn credential_source(&self) -> CredentialSource {
        self.credential_source
    }

    pub fn post_process(&self) -> PostProcess {
        self.post_process
    }

    pub fn matches(&self, req: &Request<Body>) -> bool {
        self.matcher.matches(req)
    }

    /// Upstream path for an inbound path this route matched.
    pub fn upstream_path(&self, inbound_path: &str) -> String {
        let rest = self.path.remainder(inbound_path).unwrap_or_default();
        let path = format!("{}{}", self.upstream_prefix, rest);
        if path.is_empty() {
            "/".to_string()
        } else {
            path
        }
    }
}

/// Immutable route table.
#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn from_config(configs: &[RouteConfig]) -> Self {
        let mut routes: Vec<Route> = configs.iter().map(Route::from_config).collect();
        routes.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.path.prefix().len().cmp(&a.path.prefix().len()))
        });
        Self { routes }
    }

    /// First route matching the request, if any.
    pub fn match_request(&self, req: &Request<Body>) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(req))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}
