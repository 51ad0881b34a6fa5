//! Request authentication: session cookies for the admin portal, HTTP Basic
//! for the programmatic API, and the https guard for sensitive routes.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use base64::Engine;
use std::sync::Arc;

use super::handlers::db_error;
use crate::accounts::{AccountError, Membership};
use crate::api::response::ApiError;
use crate::storage::models::Role;
use crate::AppState;

pub const SESSION_COOKIE: &str = "sid";

/// The logged-in account behind a request
#[derive(Debug, Clone)]
pub struct Principal {
    pub username: String,
    pub membership: Membership,
    pub session_id: String,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.membership.is_admin
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            tracing::warn!(username = %self.username, "Admin action refused for non-admin");
            Err(ApiError::forbidden("Admin privileges required"))
        }
    }

    /// Partition a self-service action applies to when none is named
    pub fn default_role(&self) -> Role {
        if self.is_admin() {
            Role::Admin
        } else {
            Role::User
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, ApiError> {
        let session_id = session_cookie(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Login required"))?;

        let username = state
            .sessions
            .resolve(&session_id)
            .map_err(db_error)?
            .ok_or_else(|| ApiError::unauthorized("Session expired"))?;

        // Membership is re-checked on every request so removed accounts lose access
        let membership = state
            .accounts
            .check_membership(Some(&username))
            .map_err(db_error)?;
        if !membership.is_member {
            return Err(ApiError::unauthorized("Login required"));
        }

        Ok(Principal {
            username,
            membership,
            session_id,
        })
    }
}

/// A caller authenticated with HTTP Basic credentials from the `user` partition
#[derive(Debug, Clone)]
pub struct BasicAuthUser(pub String);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for BasicAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, ApiError> {
        let (username, password) = basic_credentials(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("401 - Unauthorized"))?;

        match state.accounts.authenticate(&username, &password, Role::User) {
            Ok(true) => Ok(BasicAuthUser(username)),
            Ok(false) => Err(ApiError::unauthorized("401 - Unauthorized")),
            Err(AccountError::Database(e)) => Err(db_error(e)),
            Err(AccountError::Password(e)) => {
                tracing::error!(username = %username, error = %e, "Stored credential is unreadable");
                Err(ApiError::unauthorized("401 - Unauthorized"))
            }
        }
    }
}

/// Reject the request unless it arrived over https, as reported by the
/// fronting proxy. Only enforced when configured.
pub async fn require_https(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.config.server.require_https && !is_secure(request.headers()) {
        return Err(ApiError::method_not_allowed("405 - https required"));
    }
    Ok(next.run(request).await)
}

fn is_secure(headers: &HeaderMap) -> bool {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"))
}

/// Value of the session cookie, if the request carries one
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value carrying a new session id
pub fn session_set_cookie(session_id: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={session_id}; Path=/; Max-Age={max_age_secs}; HttpOnly; SameSite=Lax"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that clears the session cookie
pub fn session_clear_cookie(secure: bool) -> String {
    session_set_cookie("", 0, secure)
}

fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let encoded = headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}
