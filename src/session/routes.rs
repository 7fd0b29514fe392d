// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Redirect policy for the session gate.

/// Which routes require a session and which are reserved for anonymous visitors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    /// Authenticated landing route; also requires a session
    pub home_path: String,
    /// Login route; everything under it is for anonymous visitors
    pub login_path: String,
    /// Exact paths that require a session
    pub protected_paths: Vec<String>,
    /// Path prefixes that require a session
    pub protected_prefixes: Vec<String>,
    /// Paths under a protected prefix that stay public (OAuth callbacks)
    pub public_exceptions: Vec<String>,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self {
            home_path: "/".to_string(),
            login_path: "/login".to_string(),
            protected_paths: vec!["/billing".to_string(), "/settings/billing".to_string()],
            protected_prefixes: vec!["/users".to_string()],
            public_exceptions: vec!["/users/oauth/google".to_string()],
        }
    }
}

impl RoutePolicy {
    /// Where to send the visitor, or `None` to render the requested route.
    pub fn redirect_for(&self, logged_in: bool, route: &str) -> Option<&str> {
        let path = route_path(route);

        if logged_in {
            if is_under(path, &self.login_path) {
                return Some(self.home_path.as_str());
            }
            return None;
        }

        if self.requires_session(path) {
            return Some(self.login_path.as_str());
        }
        None
    }

    /// Whether an anonymous visitor must be sent to the login route.
    pub fn requires_session(&self, route: &str) -> bool {
        let path = route_path(route);

        if path == route_path(&self.home_path) {
            return true;
        }
        if self.protected_paths.iter().any(|p| path == route_path(p)) {
            return true;
        }
        if self.public_exceptions.iter().any(|p| is_under(path, p)) {
            return false;
        }
        self.protected_prefixes.iter().any(|p| is_under(path, p))
    }
}

/// Strip query string, fragment and trailing slash from a route.
pub fn route_path(route: &str) -> &str {
    let end = route.find(['?', '#']).unwrap_or(route.len());
    let path = &route[..end];
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Segment-aware prefix match: `/users` covers `/users` and `/users/x`, not `/usersx`.
pub fn is_under(route: &str, prefix: &str) -> bool {
    let path = route_path(route);
    let prefix = route_path(prefix);
    if prefix == "/" {
        return true;
    }

    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
