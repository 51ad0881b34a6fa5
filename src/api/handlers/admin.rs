use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::db_error;
use crate::api::auth::Principal;
use crate::api::response::{ApiError, AppJson, AppQuery, JSend, JSendPaginated, Pagination};
use crate::storage::models::LinkRecord;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub accounts_deleted: u64,
    pub deny_entries_deleted: u64,
    pub links_deleted: u64,
    pub sessions_deleted: u64,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub is_admin: bool,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct ListLinksParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u32 {
    50
}

#[derive(Debug, Serialize)]
pub struct RemoveLinkResponse {
    pub deleted: bool,
    pub short: String,
}

#[derive(Debug, Serialize)]
pub struct DenyListResponse {
    pub entries: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DenyEntryRequest {
    pub keyword: String,
}

#[derive(Debug, Serialize)]
pub struct AddDenyEntryResponse {
    pub added: bool,
    pub keyword: String,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn health() -> Json<JSend<HealthResponse>> {
    JSend::success(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("404 - Not Found")
}

pub async fn admin_purge(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<PurgeResponse>>, ApiError> {
    let stats = state.db.purge_all().map_err(db_error)?;

    // Bring the mirrors back in line with the now empty store
    state.links.init().map_err(db_error)?;
    state.deny_list.init().map_err(db_error)?;

    tracing::warn!(
        links = stats.links,
        accounts = stats.accounts,
        "Purged all data"
    );

    Ok(JSend::success(PurgeResponse {
        accounts_deleted: stats.accounts,
        deny_entries_deleted: stats.deny_entries,
        links_deleted: stats.links,
        sessions_deleted: stats.sessions,
    }))
}

pub async fn dashboard(principal: Principal) -> Json<JSend<DashboardResponse>> {
    JSend::success(DashboardResponse {
        is_admin: principal.is_admin(),
        username: principal.username,
    })
}

/// Links ordered by views, most viewed first
pub async fn list_links(
    State(state): State<Arc<AppState>>,
    _principal: Principal,
    AppQuery(params): AppQuery<ListLinksParams>,
) -> Result<Json<JSendPaginated<LinkRecord>>, ApiError> {
    if params.limit == 0 {
        return Err(ApiError::bad_request("limit must be greater than 0"));
    }

    let mut links = state.links.get_all().map_err(db_error)?;
    links.sort_by(|a, b| b.views.cmp(&a.views).then_with(|| a.short.cmp(&b.short)));

    let total = links.len() as u64;
    let items: Vec<LinkRecord> = links
        .into_iter()
        .skip(params.offset as usize)
        .take(params.limit as usize)
        .collect();

    Ok(JSendPaginated::success(
        items,
        Pagination {
            limit: params.limit,
            offset: params.offset,
            total,
        },
    ))
}

pub async fn remove_link(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(short): Path<String>,
) -> Result<Json<JSend<RemoveLinkResponse>>, ApiError> {
    principal.require_admin()?;

    let deleted = state.links.del(&short).map_err(db_error)?;
    tracing::debug!(short = %short, deleted, by = %principal.username, "Remove link requested");

    Ok(JSend::success(RemoveLinkResponse { deleted, short }))
}

pub async fn list_deny_list(
    State(state): State<Arc<AppState>>,
    _principal: Principal,
) -> Json<JSend<DenyListResponse>> {
    JSend::success(DenyListResponse {
        entries: state.deny_list.get_list(),
    })
}

/// Entries of five characters or fewer are accepted but not stored
pub async fn add_deny_entry(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    AppJson(req): AppJson<DenyEntryRequest>,
) -> Result<Json<JSend<AddDenyEntryResponse>>, ApiError> {
    principal.require_admin()?;

    let added = state.deny_list.add(&req.keyword).map_err(db_error)?;

    Ok(JSend::success(AddDenyEntryResponse {
        added,
        keyword: req.keyword,
    }))
}

pub async fn remove_deny_entry(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(keyword): Path<String>,
) -> Result<Json<JSend<()>>, ApiError> {
    principal.require_admin()?;

    state.deny_list.rem(&keyword).map_err(db_error)?;
    Ok(JSend::success(()))
}
