//! link-shortener - A URL shortener with view counts and an admin portal
//!
//! This crate provides:
//! - Short code allocation and validation against a deny-list
//! - Per-link view counting
//! - Role-partitioned accounts (admin / user) with Argon2id credentials
//! - redb embedded key-value store for all state
//! - JSON API with session-cookie and HTTP Basic authentication

pub mod accounts;
pub mod api;
pub mod config;
pub mod deny_list;
pub mod links;
pub mod mirror;
pub mod password;
pub mod sessions;
pub mod storage;
#[cfg(test)]
pub mod testutil;
pub mod validation;

use std::sync::Arc;

use accounts::{AccountDirectory, AccountError};
use config::Config;
use deny_list::DenyList;
use links::LinkRegistry;
use sessions::SessionStore;
use storage::models::Role;
use storage::{Database, DatabaseError};

/// Shared application state
pub struct AppState {
    pub accounts: AccountDirectory,
    pub config: Config,
    pub db: Database,
    pub deny_list: Arc<DenyList>,
    pub links: LinkRegistry,
    pub sessions: SessionStore,
}

impl AppState {
    /// Wire the components to the store and fill their mirrors. The server
    /// must not take traffic before this returns.
    pub fn init(config: Config, db: Database) -> Result<Self, DatabaseError> {
        let deny_list = Arc::new(DenyList::new(db.clone()));
        deny_list.init()?;

        let links = LinkRegistry::new(db.clone(), Arc::clone(&deny_list), config.links.clone());
        links.init()?;

        Ok(Self {
            accounts: AccountDirectory::new(db.clone(), config.auth.reset_password.clone()),
            sessions: SessionStore::new(db.clone(), config.auth.session_ttl_secs),
            config,
            db,
            deny_list,
            links,
        })
    }

    /// Create the configured bootstrap admin unless it already exists.
    /// Returns whether an account was created.
    pub fn seed_bootstrap_admin(&self) -> Result<bool, AccountError> {
        let admin = match &self.config.auth.bootstrap_admin {
            Some(admin) => admin,
            None => return Ok(false),
        };

        if self.db.account_exists(Role::Admin, &admin.username)? {
            return Ok(false);
        }

        self.accounts
            .add_new_member(&admin.username, &admin.password, Role::Admin)?;
        tracing::info!(username = %admin.username, "Seeded bootstrap admin");
        Ok(true)
    }
}
