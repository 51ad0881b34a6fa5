mod accounts;
mod admin;
mod links;

use crate::api::response::ApiError;
use crate::links::{LinkError, Rejection};

pub use accounts::{
    add_account, change_password, list_accounts, login, logout, remove_account, reset_account,
};
pub use admin::{
    add_deny_entry, admin_purge, dashboard, health, list_deny_list, list_links, not_found,
    remove_deny_entry, remove_link,
};
pub use links::{api_shorten, create_short, home, redirect};

/// Log a store failure and hide its details from the client
pub(crate) fn db_error(e: impl std::fmt::Display) -> ApiError {
    tracing::error!(error = %e, "Store operation failed");
    ApiError::internal("There was a DB error")
}

/// Map a LinkError to an ApiError
fn link_error(e: LinkError) -> ApiError {
    match e {
        LinkError::Database(e) => db_error(e),
        LinkError::Exhausted { .. } => ApiError::internal("Could not generate a short code"),
    }
}

/// Map a validation rejection to a 4xx fail
fn rejection_error(rejection: Rejection) -> ApiError {
    match rejection {
        Rejection::Taken(_) => ApiError::conflict(rejection.to_string()),
        _ => ApiError::bad_request(rejection.to_string()),
    }
}
