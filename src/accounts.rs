//! Credentials partitioned into `admin` and `user`.

use serde::Serialize;
use thiserror::Error;

use crate::password::{self, PasswordError};
use crate::storage::models::{AccountSummary, Role};
use crate::storage::{Database, DatabaseError};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Which partitions a username appears in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Membership {
    pub is_member: bool,
    pub is_admin: bool,
}

#[derive(Clone)]
pub struct AccountDirectory {
    db: Database,
    reset_password: String,
}

impl AccountDirectory {
    pub fn new(db: Database, reset_password: impl Into<String>) -> Self {
        Self {
            db,
            reset_password: reset_password.into(),
        }
    }

    /// Verify a password against the stored credential in one partition.
    /// Unknown usernames never authenticate.
    pub fn authenticate(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<bool, AccountError> {
        let stored = match self.db.get_password_hash(role, username)? {
            Some(stored) => stored,
            None => return Ok(false),
        };

        Ok(password::verify_password(password, &stored)?)
    }

    pub fn check_membership(&self, username: Option<&str>) -> Result<Membership, DatabaseError> {
        let username = match username {
            Some(u) if !u.is_empty() => u,
            _ => return Ok(Membership::default()),
        };

        let is_admin = self.db.account_exists(Role::Admin, username)?;
        let is_user = self.db.account_exists(Role::User, username)?;
        Ok(Membership {
            is_member: is_admin || is_user,
            is_admin,
        })
    }

    /// Rotate a password after re-checking the old one. Returns whether the
    /// change was applied.
    pub fn update_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
        role: Role,
    ) -> Result<bool, AccountError> {
        if !self.authenticate(username, old_password, role)? {
            tracing::warn!(username, %role, "Password change refused: old password mismatch");
            return Ok(false);
        }

        let hash = password::hash_password(new_password)?;
        self.db.put_account(role, username, &hash)?;
        tracing::info!(username, %role, "Password changed");
        Ok(true)
    }

    /// Administrative reset to the configured reset password. Unknown role
    /// names are ignored; returns whether a reset happened.
    pub fn reset_password(&self, username: &str, role: &str) -> Result<bool, AccountError> {
        let role = match Role::from_name(role) {
            Some(role) => role,
            None => return Ok(false),
        };

        let hash = password::hash_password(&self.reset_password)?;
        self.db.put_account(role, username, &hash)?;
        tracing::info!(username, %role, "Password reset");
        Ok(true)
    }

    /// Create an account, replacing any existing one in the same partition
    pub fn add_new_member(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<(), AccountError> {
        let hash = password::hash_password(password)?;
        self.db.put_account(role, username, &hash)?;
        tracing::info!(username, %role, "Added member");
        Ok(())
    }

    /// Returns whether an account was removed. Unknown role names are ignored.
    pub fn remove_member(&self, username: &str, role: &str) -> Result<bool, DatabaseError> {
        let role = match Role::from_name(role) {
            Some(role) => role,
            None => return Ok(false),
        };

        let removed = self.db.remove_account(role, username)?;
        if removed {
            tracing::info!(username, %role, "Removed member");
        }
        Ok(removed)
    }

    /// Every account, admins first
    pub fn list_all(&self) -> Result<Vec<AccountSummary>, DatabaseError> {
        let mut accounts = Vec::new();
        for role in [Role::Admin, Role::User] {
            accounts.extend(
                self.db
                    .list_accounts(role)?
                    .into_iter()
                    .map(|username| AccountSummary { username, role }),
            );
        }
        Ok(accounts)
    }
}
