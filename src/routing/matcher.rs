//! Route matching logic.
//!
//! # Responsibilities
//! - Match path prefix on segment boundaries (case-sensitive)
//! - Match the request method against an allow list
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - `/api/rooms` matches `/api/rooms` and `/api/rooms/7`, never `/api/roomsx`
//! - Paths with `.`/`..` segments never match, percent-encoded or not
//! - Empty method list = any method (wildcard)
//! - No regex to guarantee O(n) matching

use axum::body::Body;
use axum::http::{Method, Request};

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher. A trailing slash is ignored.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim_end_matches('/');
        Self {
            prefix: trimmed.to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Path after the prefix, if `path` falls under it.
    pub fn remainder<'a>(&self, path: &'a str) -> Option<&'a str> {
        if path.contains('\\') || path.split('/').any(is_dot_segment) {
            return None;
        }
        let rest = path.strip_prefix(self.prefix.as_str())?;
        (rest.is_empty() || rest.starts_with('/')).then_some(rest)
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.remainder(req.uri().path()).is_some()
    }
}

/// True for `.` and `..`, including any percent-encoded spelling (`%2e%2E`).
pub fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == "." || decoded == ".."
}

/// Matches the request method.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    methods: Vec<Method>,
}

impl MethodMatcher {
    pub fn new(methods: Vec<Method>) -> Self {
        Self { methods }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.methods.is_empty() || self.methods.contains(req.method())
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        // All matchers must pass (AND)
        self.matchers.iter().all(|m| m.matches(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::default())
            .unwrap()
    }

    #[test]
    fn test_path_matcher() {
        let matcher = PathPrefixMatcher::new("/api/rooms/");

        assert!(matcher.matches(&request(Method::GET, "/api/rooms")));
        assert!(matcher.matches(&request(Method::GET, "/api/rooms/12?x=1")));
        assert!(!matcher.matches(&request(Method::GET, "/api/roomsx")));
        assert!(!matcher.matches(&request(Method::GET, "/api/room")));
        assert!(!matcher.matches(&request(Method::GET, "/api/rooms/../admin")));
        assert_eq!(matcher.remainder("/api/rooms/12"), Some("/12"));
    }

    #[test]
    fn test_encoded_dot_segments_never_match() {
        let matcher = PathPrefixMatcher::new("/api/bookings");

        for path in [
            "/api/bookings/%2e%2e/%2e%2e/internal/secrets",
            "/api/bookings/%2E%2E/admin",
            "/api/bookings/.%2e/admin",
            "/api/bookings/%2e./admin",
            "/api/bookings/%2e/7",
            "/api/bookings/./7",
        ] {
            assert!(!matcher.matches(&request(Method::GET, path)), "{path}");
        }
        assert!(matcher.matches(&request(Method::GET, "/api/bookings/a%2eb")));
        assert!(matcher.matches(&request(Method::GET, "/api/bookings/...")));
    }

    #[test]
    fn test_is_dot_segment() {
        assert!(is_dot_segment(".."));
        assert!(is_dot_segment("%2e%2E"));
        assert!(is_dot_segment("%2E"));
        assert!(!is_dot_segment("..."));
        assert!(!is_dot_segment("%2e%2e%2e"));
        assert!(!is_dot_segment("rooms"));
        assert!(!is_dot_segment(""));
    }

    #[test]
    fn test_method_matcher() {
        let any = MethodMatcher::new(Vec::new());
        assert!(any.matches(&request(Method::DELETE, "/")));

        let post_only = MethodMatcher::new(vec![Method::POST]);
        assert!(post_only.matches(&request(Method::POST, "/")));
        assert!(!post_only.matches(&request(Method::GET, "/")));
    }

    #[test]
    fn test_and_matcher() {
        let matcher = AndMatcher::new(vec![
            Box::new(PathPrefixMatcher::new("/api/uploads")),
            Box::new(MethodMatcher::new(vec![Method::POST])),
        ]);
        assert!(matcher.matches(&request(Method::POST, "/api/uploads")));
        assert!(!matcher.matches(&request(Method::PUT, "/api/uploads")));
        assert!(!matcher.matches(&request(Method::POST, "/api/rooms")));
    }
}
