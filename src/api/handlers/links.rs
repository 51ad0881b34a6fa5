use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{db_error, link_error, rejection_error};
use crate::api::auth::BasicAuthUser;
use crate::api::response::{ApiError, AppJson, JSend};
use crate::links::ValidationResult;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub domain: String,
    pub version: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ShortenRequest {
    #[serde(default)]
    pub original: String,
    #[serde(default)]
    pub short: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ShortLinkResponse {
    pub link: String,
    pub original: String,
    pub short: String,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn home(State(state): State<Arc<AppState>>) -> Json<JSend<HomeResponse>> {
    JSend::success(HomeResponse {
        domain: state.config.links.domain.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create a link from the public form. Links made here belong to the website.
pub async fn create_short(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<ShortenRequest>,
) -> Result<Json<JSend<ShortLinkResponse>>, ApiError> {
    register(&state, req)
}

/// Create a link through the programmatic API, owned by the caller. Answers
/// with the validation outcome whether or not the link was stored.
pub async fn api_shorten(
    State(state): State<Arc<AppState>>,
    BasicAuthUser(username): BasicAuthUser,
    AppJson(req): AppJson<ShortenRequest>,
) -> Result<Json<ValidationResult>, ApiError> {
    let short = choose_short(&state, req.short)?;
    tracing::info!(short = %short, original = %req.original, by = %username, "Validating short link");

    let result = state.links.validate_input(&req.original, &short);
    match &result {
        Ok(_) => {
            state
                .links
                .set(&short, &req.original, Some(username.as_str()))
                .map_err(db_error)?;
        }
        Err(rejection) => {
            tracing::warn!(short = %short, reason = %rejection, "Rejected short link");
        }
    }

    Ok(Json(ValidationResult::from(result)))
}

/// Redirect to the destination of a short code and count the view.
/// Unknown codes go back to the home page.
pub async fn redirect(
    State(state): State<Arc<AppState>>,
    Path(short): Path<String>,
) -> Result<Response, ApiError> {
    tracing::debug!(short = %short, "Trying to redirect");

    if !state.links.has(&short) {
        tracing::debug!(short = %short, "No redirect found");
        return Ok(found("/"));
    }

    let original = match state.links.get(&short).map_err(db_error)? {
        Some(original) => original,
        None => {
            tracing::warn!(short = %short, "Short code in mirror but missing from store");
            return Ok(found("/"));
        }
    };

    // Counting the view is not awaited
    let counter = Arc::clone(&state);
    let counted = short.clone();
    tokio::task::spawn_blocking(move || {
        if let Err(e) = counter.links.incr(&counted) {
            tracing::error!(short = %counted, error = %e, "Failed to count view");
        }
    });

    tracing::debug!(short = %short, original = %original, "Redirected");
    Ok(found(&original))
}

// ============================================================================
// Helpers
// ============================================================================

/// The requested code, or a generated one when none was given
fn choose_short(state: &AppState, requested: Option<String>) -> Result<String, ApiError> {
    match requested.filter(|s| !s.is_empty()) {
        Some(short) => Ok(short),
        None => state.links.make_short().map_err(link_error),
    }
}

fn register(state: &AppState, req: ShortenRequest) -> Result<Json<JSend<ShortLinkResponse>>, ApiError> {
    let short = choose_short(state, req.short)?;
    tracing::info!(short = %short, original = %req.original, "Validating short link");

    let link = state
        .links
        .validate_input(&req.original, &short)
        .map_err(|rejection| {
            tracing::warn!(short = %short, reason = %rejection, "Rejected short link");
            rejection_error(rejection)
        })?;

    state
        .links
        .set(&short, &req.original, None)
        .map_err(db_error)?;

    Ok(JSend::success(ShortLinkResponse {
        link,
        original: req.original,
        short,
    }))
}

fn found(location: &str) -> Response {
    match header::HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => ApiError::internal("Stored destination is not a valid header value").into_response(),
    }
}
