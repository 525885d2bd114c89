//! Webhook request router.
//!
//! The counterparty reaches two endpoints:
//!
//! ```text
//! POST /transactions/authorizations      -> authorization (reply carries a JSON body)
//! POST /transactions/adjustments[/...]   -> adjustment (reply carries no body)
//! ```
//!
//! `GET /_hooksign/health` is answered without authentication.

use std::fmt;

/// Path of the unauthenticated health probe.
pub const HEALTH_PATH: &str = "/_hooksign/health";

const AUTHORIZATIONS_PATH: &str = "/transactions/authorizations";
const ADJUSTMENTS_PATH: &str = "/transactions/adjustments";

/// A signed webhook endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebhookRoute {
    /// A transaction the server may approve or reject.
    Authorization,
    /// A forced transaction the server must record but cannot reject.
    Adjustment,
}

impl WebhookRoute {
    /// Short name used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authorization => "authorization",
            Self::Adjustment => "adjustment",
        }
    }
}

impl fmt::Display for WebhookRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of routing a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// A signed webhook endpoint.
    Webhook(WebhookRoute),
    /// The health probe.
    Health,
}

/// Why a request could not be routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteError {
    /// No endpoint lives at this path.
    NotFound,
    /// The path exists but not for this method.
    MethodNotAllowed,
}

/// Resolve the route for a request method and path.
pub fn resolve_route(method: &http::Method, path: &str) -> Result<Route, RouteError> {
    if path == HEALTH_PATH {
        return if method == http::Method::GET {
            Ok(Route::Health)
        } else {
            Err(RouteError::MethodNotAllowed)
        };
    }

    let webhook = if path == AUTHORIZATIONS_PATH {
        WebhookRoute::Authorization
    } else if path == ADJUSTMENTS_PATH
        || path
            .strip_prefix(ADJUSTMENTS_PATH)
            .is_some_and(|rest| rest.starts_with('/'))
    {
        WebhookRoute::Adjustment
    } else {
        return Err(RouteError::NotFound);
    };

    if method == http::Method::POST {
        Ok(Route::Webhook(webhook))
    } else {
        Err(RouteError::MethodNotAllowed)
    }
}
