//! Admin login and session gate.
//!
//! Credentials are compared in constant time. A successful login hands out a
//! random session id that admin routes expect in `x-admin-session` or as a
//! bearer token.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::errors::AppError;

/// Header carrying the admin session id.
pub const SESSION_HEADER: &str = "x-admin-session";

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Decides whether a login attempt is allowed.
pub trait AuthenticationPort: Send + Sync {
    fn verify(&self, credentials: &Credentials) -> bool;
}

/// One configured admin account.
pub struct StaticCredentials {
    username: String,
    password: Option<String>,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password: password.filter(|p| !p.is_empty()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.admin_username.clone(), config.admin_password.clone())
    }

    /// False when no password is configured; every login then fails.
    pub fn is_enabled(&self) -> bool {
        self.password.is_some()
    }
}

impl AuthenticationPort for StaticCredentials {
    fn verify(&self, credentials: &Credentials) -> bool {
        let Some(expected) = &self.password else {
            return false;
        };
        // Both halves are always compared.
        let user_ok = constant_time_compare(&credentials.username, &self.username);
        let pass_ok = constant_time_compare(&credentials.password, expected);
        user_ok & pass_ok
    }
}

/// Live admin sessions. Sessions never expire; logout removes them.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashSet<String>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.sessions.write().await.insert(id.clone());
        id
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.sessions.read().await.contains(id)
    }

    pub async fn revoke(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id)
    }
}

/// Session id from `x-admin-session`, else from `Authorization: Bearer`.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let direct = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let bearer = || {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };
    direct.or_else(bearer).map(str::to_string)
}

/// Reject requests that do not carry a live admin session.
pub async fn admin_session_layer(
    sessions: Arc<SessionRegistry>,
    request: Request,
    next: Next,
) -> Response {
    match session_token(request.headers()) {
        Some(token) if sessions.contains(&token).await => next.run(request).await,
        Some(_) => {
            AppError::Unauthorized("Invalid or expired admin session".to_string()).into_response()
        }
        None => AppError::Unauthorized("Admin session required".to_string()).into_response(),
    }
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn login(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("neihu-2026", "neihu-2026"));
        assert!(!constant_time_compare("neihu-2026", "neihu-2027"));
        assert!(!constant_time_compare("short", "much-longer-secret"));
        assert!(constant_time_compare("", ""));
    }

    #[test]
    fn test_static_credentials() {
        let auth = StaticCredentials::new("sunny", Some("s3cret".to_string()));

        assert!(auth.is_enabled());
        assert!(auth.verify(&login("sunny", "s3cret")));
        assert!(!auth.verify(&login("sunny", "wrong")));
        assert!(!auth.verify(&login("Sunny", "s3cret")));
    }

    #[test]
    fn test_no_password_disables_login() {
        for password in [None, Some(String::new())] {
            let auth = StaticCredentials::new("admin", password);
            assert!(!auth.is_enabled());
            assert!(!auth.verify(&login("admin", "")));
        }
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let sessions = SessionRegistry::new();

        let id = sessions.create().await;
        assert!(sessions.contains(&id).await);
        assert_ne!(sessions.create().await, id);

        assert!(sessions.revoke(&id).await);
        assert!(!sessions.contains(&id).await);
        assert!(!sessions.revoke(&id).await);
    }

    #[test]
    fn test_session_token_sources() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc"));

        headers.insert(SESSION_HEADER, HeaderValue::from_static("xyz"));
        assert_eq!(session_token(&headers).as_deref(), Some("xyz"));

        let mut basic = HeaderMap::new();
        basic.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(session_token(&basic), None);
    }
}
