//! Short code registry: allocation, validation and link bookkeeping.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LinkConfig;
use crate::deny_list::DenyList;
use crate::mirror::KeyMirror;
use crate::storage::models::{LinkRecord, DEFAULT_OWNER};
use crate::storage::{Database, DatabaseError};
use crate::validation::{is_valid_short, is_valid_url};

/// Alphabet for generated codes. Look-alike characters (0/O, 1/I/l) are left out.
pub const SHORT_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";

/// Collisions tolerated before giving up on generating a code
pub const MAX_GENERATION_ATTEMPTS: usize = 64;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error("No free short code found after {attempts} attempts")]
    Exhausted { attempts: usize },
}

/// Why a requested link was refused. The display text is shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Cannot shorten URLs linked to {domain}/*")]
    SelfReference { domain: String },
    #[error("Invalid original URL")]
    InvalidUrl,
    #[error("The original URL contains a blocked string")]
    Blocked,
    #[error("Cannot shorten to {0}")]
    InvalidShort(String),
    #[error("{0} is already taken")]
    Taken(String),
}

/// Wire form of a validation outcome: the short link on success, the
/// reason otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub success: bool,
    pub output: String,
}

impl From<Result<String, Rejection>> for ValidationResult {
    fn from(result: Result<String, Rejection>) -> Self {
        match result {
            Ok(link) => ValidationResult {
                success: true,
                output: link,
            },
            Err(rejection) => ValidationResult {
                success: false,
                output: rejection.to_string(),
            },
        }
    }
}

pub struct LinkRegistry {
    config: LinkConfig,
    db: Database,
    deny_list: Arc<DenyList>,
    shorts: KeyMirror,
}

impl LinkRegistry {
    pub fn new(db: Database, deny_list: Arc<DenyList>, config: LinkConfig) -> Self {
        Self {
            config,
            db,
            deny_list,
            shorts: KeyMirror::new(),
        }
    }

    /// Fill the in-process mirror from the store. Must run before serving.
    pub fn init(&self) -> Result<usize, DatabaseError> {
        let count = self.shorts.reload(self.db.list_shorts()?);
        tracing::info!(shorts = count, "Populated short codes from db");
        Ok(count)
    }

    /// Whether the code is taken, answered from the mirror alone
    pub fn has(&self, short: &str) -> bool {
        self.shorts.contains(short)
    }

    /// Canonical public form of a short code
    pub fn link_for(&self, short: &str) -> String {
        format!("{}/{}", self.config.domain, short)
    }

    /// Generate a random code that is not in use yet
    pub fn make_short(&self) -> Result<String, LinkError> {
        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let candidate = random_code(self.config.code_length);
            if !self.has(&candidate) {
                return Ok(candidate);
            }
            tracing::debug!(short = %candidate, "Generated short collided, retrying");
        }

        tracing::error!(
            attempts = MAX_GENERATION_ATTEMPTS,
            "Could not generate a free short code"
        );
        Err(LinkError::Exhausted {
            attempts: MAX_GENERATION_ATTEMPTS,
        })
    }

    /// Check an original/short pair before registration. The first failing
    /// rule decides the rejection; on success the short link is returned.
    pub fn validate_input(&self, original: &str, short: &str) -> Result<String, Rejection> {
        let lowered = original.to_ascii_lowercase();
        if self
            .config
            .self_hosts()
            .any(|host| lowered.contains(&format!("://{}", host.to_ascii_lowercase())))
        {
            return Err(Rejection::SelfReference {
                domain: self.config.domain.clone(),
            });
        }

        if !is_valid_url(original) {
            return Err(Rejection::InvalidUrl);
        }

        if self.deny_list.matches(original) {
            return Err(Rejection::Blocked);
        }

        if !is_valid_short(short) {
            return Err(Rejection::InvalidShort(short.to_string()));
        }

        if self.has(short) {
            return Err(Rejection::Taken(short.to_string()));
        }

        Ok(self.link_for(short))
    }

    /// Store a link without validating it. The view count starts at zero and
    /// the owner defaults to the public website.
    pub fn set(&self, short: &str, original: &str, owner: Option<&str>) -> Result<(), DatabaseError> {
        let owner = owner.unwrap_or(DEFAULT_OWNER);
        self.db.put_link(short, original, owner)?;
        self.shorts.insert(short);
        tracing::info!(short, original, owner, "Stored short link");
        Ok(())
    }

    /// Delete a link known to the mirror. Returns whether anything was deleted.
    pub fn del(&self, short: &str) -> Result<bool, DatabaseError> {
        if !self.has(short) {
            return Ok(false);
        }

        self.db.delete_link(short)?;
        self.shorts.remove(short);
        tracing::info!(short, "Deleted short link");
        Ok(true)
    }

    pub fn get(&self, short: &str) -> Result<Option<String>, DatabaseError> {
        self.db.get_original(short)
    }

    pub fn get_all(&self) -> Result<Vec<LinkRecord>, DatabaseError> {
        self.db.get_all_links()
    }

    /// Count one view, returning the new total
    pub fn incr(&self, short: &str) -> Result<u64, DatabaseError> {
        self.db.incr_views(short)
    }
}

fn random_code(length: usize) -> String {
    std::iter::repeat_with(|| SHORT_CHARSET[rand::random_range(0..SHORT_CHARSET.len())] as char)
        .take(length)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_code_uses_charset() {
        for _ in 0..100 {
            let code = random_code(5);
            assert_eq!(code.len(), 5);
            assert!(code.bytes().all(|b| SHORT_CHARSET.contains(&b)));
        }
    }

    #[test]
    fn test_charset_skips_look_alikes() {
        for c in [b'0', b'O', b'1', b'I', b'l'] {
            assert!(!SHORT_CHARSET.contains(&c));
        }
    }

    #[test]
    fn test_validation_result_from_rejection() {
        let result = ValidationResult::from(Err(Rejection::Taken("abc12".to_string())));
        assert!(!result.success);
        assert_eq!(result.output, "abc12 is already taken");

        let result = ValidationResult::from(Ok("jsa.life/abc12".to_string()));
        assert!(result.success);
        assert_eq!(result.output, "jsa.life/abc12");
    }
}
