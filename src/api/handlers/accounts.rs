use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::db_error;
use crate::accounts::AccountError;
use crate::api::auth::{self, Principal};
use crate::api::response::{ApiError, AppJson, JSend};
use crate::storage::models::{AccountSummary, Role};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub is_admin: bool,
    pub username: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AddAccountRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct AccountListResponse {
    pub accounts: Vec<AccountSummary>,
}

#[derive(Debug, Serialize)]
pub struct AccountActionResponse {
    pub applied: bool,
    pub role: String,
    pub username: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Log in against the admin partition first, then the user partition
pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let mut role = None;
    for candidate in [Role::Admin, Role::User] {
        if authenticated(&state, &req.username, &req.password, candidate)? {
            role = Some(candidate);
            break;
        }
    }

    let role = match role {
        Some(role) => role,
        None => {
            tracing::warn!(username = %req.username, "Login failed");
            return Err(ApiError::unauthorized("Invalid username or password"));
        }
    };

    let session_id = state.sessions.create(&req.username).map_err(db_error)?;
    tracing::info!(username = %req.username, %role, "Logged in");

    let cookie = auth::session_set_cookie(
        &session_id,
        state.sessions.ttl_secs(),
        state.config.server.require_https,
    );
    Ok((
        [(header::SET_COOKIE, cookie)],
        JSend::success(LoginResponse {
            is_admin: role == Role::Admin,
            username: req.username,
        }),
    )
        .into_response())
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if let Some(session_id) = auth::session_cookie(&headers) {
        state.sessions.destroy(&session_id).map_err(db_error)?;
    }

    let cookie = auth::session_clear_cookie(state.config.server.require_https);
    Ok(([(header::SET_COOKIE, cookie)], JSend::success(())).into_response())
}

/// Rotate the caller's own password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    AppJson(req): AppJson<ChangePasswordRequest>,
) -> Result<Json<JSend<()>>, ApiError> {
    let role = match req.role.as_deref() {
        Some(name) => parse_role(name)?,
        None => principal.default_role(),
    };

    if req.new_password.is_empty() {
        return Err(ApiError::bad_request("new_password must not be empty"));
    }

    let changed = state
        .accounts
        .update_password(&principal.username, &req.old_password, &req.new_password, role)
        .map_err(account_error)?;
    if !changed {
        return Err(ApiError::bad_request("Old password is incorrect"));
    }

    Ok(JSend::success(()))
}

pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<JSend<AccountListResponse>>, ApiError> {
    principal.require_admin()?;

    let accounts = state.accounts.list_all().map_err(db_error)?;
    Ok(JSend::success(AccountListResponse { accounts }))
}

pub async fn add_account(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    AppJson(req): AppJson<AddAccountRequest>,
) -> Result<Json<JSend<AccountActionResponse>>, ApiError> {
    principal.require_admin()?;

    let role = parse_role(&req.role)?;
    if req.username.trim().is_empty() {
        return Err(ApiError::bad_request("username must not be empty"));
    }
    if req.password.is_empty() {
        return Err(ApiError::bad_request("password must not be empty"));
    }

    state
        .accounts
        .add_new_member(&req.username, &req.password, role)
        .map_err(account_error)?;

    Ok(JSend::success(AccountActionResponse {
        applied: true,
        role: role.to_string(),
        username: req.username,
    }))
}

/// Unknown role names are a no-op, reported as `applied: false`
pub async fn remove_account(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path((role, username)): Path<(String, String)>,
) -> Result<Json<JSend<AccountActionResponse>>, ApiError> {
    principal.require_admin()?;

    let applied = state
        .accounts
        .remove_member(&username, &role)
        .map_err(db_error)?;

    Ok(JSend::success(AccountActionResponse {
        applied,
        role,
        username,
    }))
}

/// Unknown role names are a no-op, reported as `applied: false`
pub async fn reset_account(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path((role, username)): Path<(String, String)>,
) -> Result<Json<JSend<AccountActionResponse>>, ApiError> {
    principal.require_admin()?;

    let applied = state
        .accounts
        .reset_password(&username, &role)
        .map_err(account_error)?;

    Ok(JSend::success(AccountActionResponse {
        applied,
        role,
        username,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

/// Unreadable stored credentials count as a failed login
fn authenticated(
    state: &AppState,
    username: &str,
    password: &str,
    role: Role,
) -> Result<bool, ApiError> {
    match state.accounts.authenticate(username, password, role) {
        Ok(ok) => Ok(ok),
        Err(AccountError::Database(e)) => Err(db_error(e)),
        Err(AccountError::Password(e)) => {
            tracing::error!(username, %role, error = %e, "Authentication failed unexpectedly");
            Ok(false)
        }
    }
}

fn parse_role(name: &str) -> Result<Role, ApiError> {
    Role::from_name(name)
        .ok_or_else(|| ApiError::bad_request(format!("role must be 'admin' or 'user', got '{name}'")))
}

fn account_error(e: AccountError) -> ApiError {
    match e {
        AccountError::Database(e) => db_error(e),
        AccountError::Password(e) => {
            tracing::error!(error = %e, "Password hashing failed");
            ApiError::internal("Could not process password")
        }
    }
}
