//! Substrings that block a destination URL from being shortened.

use crate::mirror::KeyMirror;
use crate::storage::{Database, DatabaseError};

/// Entries must be longer than this many characters
pub const MIN_ENTRY_LEN: usize = 5;

pub struct DenyList {
    db: Database,
    entries: KeyMirror,
}

impl DenyList {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            entries: KeyMirror::new(),
        }
    }

    /// Fill the in-process mirror from the store. Must run before serving.
    pub fn init(&self) -> Result<usize, DatabaseError> {
        let count = self.entries.reload(self.db.list_deny_entries()?);
        tracing::info!(entries = count, "Populated deny-list from db");
        Ok(count)
    }

    pub fn get_list(&self) -> Vec<String> {
        self.entries.snapshot()
    }

    /// Add an entry. Entries of `MIN_ENTRY_LEN` characters or fewer are
    /// ignored; returns whether the entry was stored.
    pub fn add(&self, entry: &str) -> Result<bool, DatabaseError> {
        if entry.chars().count() <= MIN_ENTRY_LEN {
            tracing::debug!(entry, "Ignoring deny-list entry that is too short");
            return Ok(false);
        }

        self.db.add_deny_entry(entry)?;
        self.entries.insert(entry);
        tracing::info!(entry, "Added deny-list entry");
        Ok(true)
    }

    pub fn rem(&self, entry: &str) -> Result<(), DatabaseError> {
        self.db.remove_deny_entry(entry)?;
        self.entries.remove(entry);
        tracing::info!(entry, "Removed deny-list entry");
        Ok(())
    }

    /// True if `url` contains any entry
    pub fn matches(&self, url: &str) -> bool {
        self.entries.any_contained_in(url)
    }
}
