//! Route classification and the edge guard decision.
//!
//! SYSTEM CONTEXT
//! ==============
//! The server runs [`EdgeGuard::evaluate`] on every page request before any
//! page code executes. It sees only the cookie pair, so it answers "is this
//! visitor allowed to load this path" without touching the client store.
//!
//! DESIGN
//! ======
//! Every protected entry matches the same way: the path equals its prefix or
//! continues it at a `/` boundary. Pattern lists never narrow protection; they
//! only mark a path as a known page for diagnostics.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::profile::UserProfile;
use crate::role::{RedirectTarget, Role};
use crate::token;

/// Paths served to everyone, signed in or not.
pub const PUBLIC_PATHS: [&str; 8] = [
    "/",
    "/login",
    "/register",
    "/access-denied",
    "/about",
    "/business",
    "/contact",
    "/marketplace",
];

const BYPASS_PREFIXES: [&str; 4] = ["/api/", "/pkg/", "/static/", "/_next/"];

/// Placeholder segment matching any all-digit path segment.
const ID_PLACEHOLDER: &str = "{id}";

#[derive(Debug, thiserror::Error)]
pub enum RouteTableError {
    #[error("failed to read route table: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse route table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("route prefix must start with '/': {0}")]
    BadPrefix(String),
    #[error("pattern {pattern} is outside its prefix {prefix}")]
    PatternOutsidePrefix { prefix: String, pattern: String },
}

/// One `{ prefix, role, patterns }` row of the protected table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedRoute {
    pub prefix: String,
    pub role: Role,
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl ProtectedRoute {
    #[must_use]
    pub fn new(prefix: &str, role: Role, patterns: &[&str]) -> Self {
        Self {
            prefix: prefix.to_owned(),
            role,
            patterns: patterns.iter().map(|p| (*p).to_owned()).collect(),
        }
    }

    /// Whether `path` falls under this entry's prefix.
    #[must_use]
    pub fn covers(&self, path: &str) -> bool {
        let prefix = self.prefix.trim_end_matches('/');
        if prefix.is_empty() {
            return true;
        }
        path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
    }

    /// Whether `path` exactly matches one of the listed patterns.
    #[must_use]
    pub fn recognizes(&self, path: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern_matches(pattern, path))
    }
}

fn pattern_matches(pattern: &str, path: &str) -> bool {
    let pattern_segments: Vec<&str> = pattern.trim_end_matches('/').split('/').collect();
    let path_segments: Vec<&str> = path.split('/').collect();
    pattern_segments.len() == path_segments.len()
        && pattern_segments
            .iter()
            .zip(&path_segments)
            .all(|(expected, actual)| {
                if *expected == ID_PLACEHOLDER {
                    !actual.is_empty() && actual.bytes().all(|b| b.is_ascii_digit())
                } else {
                    expected == actual
                }
            })
}

/// How a request path is treated before any session is considered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteClass {
    /// Static asset or API route; the guard does not run.
    Bypass,
    /// On the public allow-list.
    Public,
    /// Under a role-restricted prefix.
    Protected { role: Role, prefix: String, known: bool },
    /// Needs a session but no particular role.
    Authenticated,
}

/// Ordered protected-route table. The first covering entry wins.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ProtectedRoute>", into = "Vec<ProtectedRoute>")]
pub struct RouteTable {
    routes: Vec<ProtectedRoute>,
}

impl TryFrom<Vec<ProtectedRoute>> for RouteTable {
    type Error = RouteTableError;

    fn try_from(routes: Vec<ProtectedRoute>) -> Result<Self, Self::Error> {
        Self::new(routes)
    }
}

impl From<RouteTable> for Vec<ProtectedRoute> {
    fn from(table: RouteTable) -> Self {
        table.routes
    }
}

impl RouteTable {
    /// # Errors
    ///
    /// Returns an error if a prefix is not absolute or a pattern lies outside
    /// its entry's prefix.
    pub fn new(routes: Vec<ProtectedRoute>) -> Result<Self, RouteTableError> {
        for route in &routes {
            if !route.prefix.starts_with('/') {
                return Err(RouteTableError::BadPrefix(route.prefix.clone()));
            }
            if let Some(pattern) = route.patterns.iter().find(|p| !route.covers(p.trim_end_matches('/'))) {
                return Err(RouteTableError::PatternOutsidePrefix {
                    prefix: route.prefix.clone(),
                    pattern: pattern.clone(),
                });
            }
        }
        Ok(Self { routes })
    }

    /// # Errors
    ///
    /// Returns an error if `raw` is not a JSON array of routes or fails
    /// validation.
    pub fn from_json(raw: &str) -> Result<Self, RouteTableError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, RouteTableError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// The storefront's built-in table.
    #[must_use]
    pub fn storefront() -> Self {
        Self {
            routes: vec![
                ProtectedRoute::new(
                    "/admin",
                    Role::Admin,
                    &[
                        "/admin",
                        "/admin/products",
                        "/admin/products/new",
                        "/admin/products/{id}",
                        "/admin/products/{id}/edit",
                        "/admin/categories",
                        "/admin/categories/new",
                        "/admin/categories/{id}/edit",
                        "/admin/orders",
                        "/admin/orders/{id}",
                        "/admin/users",
                        "/admin/users/{id}",
                        "/admin/newsletters",
                        "/admin/newsletters/new",
                    ],
                ),
                ProtectedRoute::new(
                    "/seller",
                    Role::Seller,
                    &[
                        "/seller",
                        "/seller/products",
                        "/seller/products/new",
                        "/seller/products/{id}",
                        "/seller/products/{id}/edit",
                        "/seller/orders",
                        "/seller/orders/{id}",
                        "/seller/profile",
                    ],
                ),
                ProtectedRoute::new("/cart", Role::User, &["/cart"]),
                ProtectedRoute::new("/checkout", Role::User, &["/checkout"]),
                ProtectedRoute::new("/orders", Role::User, &["/orders", "/orders/{id}"]),
                ProtectedRoute::new("/profile", Role::User, &["/profile"]),
                ProtectedRoute::new("/address-completed", Role::User, &["/address-completed"]),
            ],
        }
    }

    #[must_use]
    pub fn routes(&self) -> &[ProtectedRoute] {
        &self.routes
    }

    #[must_use]
    pub fn classify(&self, path: &str) -> RouteClass {
        if is_bypassed(path) {
            return RouteClass::Bypass;
        }
        let path = normalize_path(path);
        if is_public(path) {
            return RouteClass::Public;
        }
        match self.routes.iter().find(|route| route.covers(path)) {
            Some(route) => RouteClass::Protected {
                role: route.role,
                prefix: route.prefix.clone(),
                known: route.recognizes(path),
            },
            None => RouteClass::Authenticated,
        }
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::storefront()
    }
}

/// Strip a trailing `/` from anything but the root.
#[must_use]
pub fn normalize_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

#[must_use]
pub fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&normalize_path(path))
}

/// Static assets and API routes never reach the guard. Dotted file names
/// only bypass at the root (`/favicon.ico`); deeper dotted paths are pages.
#[must_use]
pub fn is_bypassed(path: &str) -> bool {
    if BYPASS_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) || path == "/api" {
        return true;
    }
    path.strip_prefix('/').is_some_and(|file| !file.contains('/') && file.contains('.'))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeDecision {
    Allow,
    Redirect(RedirectTarget),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EdgeOptions {
    /// Send visitors whose token cookie is already expired to `/login`.
    pub reject_expired_tokens: bool,
}

/// Cookie-based access decision made before a page is served.
#[derive(Clone, Debug, Default)]
pub struct EdgeGuard {
    table: RouteTable,
    options: EdgeOptions,
}

impl EdgeGuard {
    #[must_use]
    pub fn new(table: RouteTable, options: EdgeOptions) -> Self {
        Self { table, options }
    }

    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    #[must_use]
    pub fn options(&self) -> EdgeOptions {
        self.options
    }

    /// Decide using the system clock for the optional expiry check.
    #[must_use]
    pub fn evaluate(&self, path: &str, token_cookie: Option<&str>, user_cookie: Option<&str>) -> EdgeDecision {
        self.evaluate_at(path, token_cookie, user_cookie, crate::clock::system_now_ms())
    }

    #[must_use]
    pub fn evaluate_at(
        &self,
        path: &str,
        token_cookie: Option<&str>,
        user_cookie: Option<&str>,
        now_ms: i64,
    ) -> EdgeDecision {
        let class = self.table.classify(path);
        if matches!(class, RouteClass::Bypass | RouteClass::Public) {
            return EdgeDecision::Allow;
        }

        let token_cookie = token_cookie.filter(|v| !v.trim().is_empty());
        let user_cookie = user_cookie.filter(|v| !v.trim().is_empty());
        let (Some(token_cookie), Some(user_cookie)) = (token_cookie, user_cookie) else {
            debug!(path, "no session cookies; redirecting to login");
            return EdgeDecision::Redirect(RedirectTarget::Login);
        };

        let Ok(user) = UserProfile::from_json(user_cookie) else {
            debug!(path, "unparsable user cookie; redirecting to login");
            return EdgeDecision::Redirect(RedirectTarget::Login);
        };

        if self.options.reject_expired_tokens && token::is_expired_at(token_cookie, now_ms) {
            debug!(path, "expired token cookie; redirecting to login");
            return EdgeDecision::Redirect(RedirectTarget::Login);
        }

        if let RouteClass::Protected { role, known, .. } = class {
            if role != user.role {
                debug!(path, required = %role, actual = %user.role, "role mismatch; access denied");
                return EdgeDecision::Redirect(RedirectTarget::AccessDenied);
            }
            if !known {
                debug!(path, %role, "unlisted page under protected prefix");
            }
        }
        EdgeDecision::Allow
    }
}

#[cfg(test)]
#[path = "access_test.rs"]
mod tests;
