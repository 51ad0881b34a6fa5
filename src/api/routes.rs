use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::auth::require_https;
use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let https = middleware::from_fn_with_state(Arc::clone(&state), require_https);

    let mut router = Router::new()
        // Public
        .route("/", get(handlers::home))
        .route("/", post(handlers::create_short))
        // Programmatic API
        .route(
            "/api/shorten",
            post(handlers::api_shorten)
                .layer::<_, Infallible>(https.clone())
                .layer::<_, Infallible>(CorsLayer::permissive()),
        )
        // Admin portal
        .route("/admin", get(handlers::dashboard))
        .route("/admin/session", post(handlers::login).layer::<_, Infallible>(https.clone()))
        .route("/admin/session", delete(handlers::logout).layer::<_, Infallible>(https.clone()))
        .route("/admin/password", put(handlers::change_password).layer::<_, Infallible>(https.clone()))
        .route("/admin/links", get(handlers::list_links))
        .route(
            "/admin/links/:short",
            delete(handlers::remove_link).layer::<_, Infallible>(https.clone()),
        )
        .route("/admin/deny-list", get(handlers::list_deny_list))
        .route(
            "/admin/deny-list",
            post(handlers::add_deny_entry).layer::<_, Infallible>(https.clone()),
        )
        .route(
            "/admin/deny-list/:keyword",
            delete(handlers::remove_deny_entry).layer::<_, Infallible>(https.clone()),
        )
        .route("/admin/accounts", get(handlers::list_accounts))
        .route(
            "/admin/accounts",
            post(handlers::add_account).layer::<_, Infallible>(https.clone()),
        )
        .route(
            "/admin/accounts/:role/:username",
            delete(handlers::remove_account).layer::<_, Infallible>(https.clone()),
        )
        .route(
            "/admin/accounts/:role/:username/reset",
            post(handlers::reset_account).layer::<_, Infallible>(https),
        )
        // Internal
        .route("/_internal/health", get(handlers::health))
        // Redirects
        .route("/:short", get(handlers::redirect));

    // Test-only routes
    if state.config.test_mode {
        tracing::warn!("Test mode enabled: purge route is available.");
        router = router.route("/admin/purge", delete(handlers::admin_purge));
    }

    router
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
