use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::{LinkRecord, DEFAULT_OWNER};
use super::tables::*;

impl Database {
    // ========================================================================
    // Link operations
    // ========================================================================

    /// Upsert a link: destination, a zeroed view counter and the owner
    pub fn put_link(&self, short: &str, original: &str, owner: &str) -> Result<(), DatabaseError> {
        debug_assert!(!short.is_empty(), "short must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut shorts = write_txn.open_table(SHORTS)?;
            shorts.insert(short, original)?;

            let mut views = write_txn.open_table(VIEWS)?;
            views.insert(short, 0u64)?;

            let mut owners = write_txn.open_table(OWNERS)?;
            owners.insert(short, owner)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get the destination of a short code
    pub fn get_original(&self, short: &str) -> Result<Option<String>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(SHORTS)?;
        let original = table.get(short)?.map(|v| v.value().to_string());
        Ok(original)
    }

    /// Get the view count of a short code
    pub fn get_views(&self, short: &str) -> Result<Option<u64>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(VIEWS)?;
        let views = table.get(short)?.map(|v| v.value());
        Ok(views)
    }

    /// Remove all fields of a link. Returns whether a destination existed.
    pub fn delete_link(&self, short: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;
        let existed = {
            let mut shorts = write_txn.open_table(SHORTS)?;
            let existed = shorts.remove(short)?.is_some();

            let mut views = write_txn.open_table(VIEWS)?;
            views.remove(short)?;

            let mut owners = write_txn.open_table(OWNERS)?;
            owners.remove(short)?;
            existed
        };
        write_txn.commit()?;
        Ok(existed)
    }

    /// Increment the view counter of a short code, returning the new count.
    /// A missing counter starts from zero.
    pub fn incr_views(&self, short: &str) -> Result<u64, DatabaseError> {
        let write_txn = self.begin_write()?;
        let views = {
            let mut table = write_txn.open_table(VIEWS)?;
            let current = table.get(short)?.map(|v| v.value()).unwrap_or(0);
            let next = current.saturating_add(1);
            table.insert(short, next)?;
            next
        };
        write_txn.commit()?;
        Ok(views)
    }

    /// All links, joined on short code
    pub fn get_all_links(&self) -> Result<Vec<LinkRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let shorts = read_txn.open_table(SHORTS)?;
        let views = read_txn.open_table(VIEWS)?;
        let owners = read_txn.open_table(OWNERS)?;

        let mut links = Vec::new();
        for result in shorts.iter()? {
            let (short, original) = result?;
            let short = short.value();
            links.push(LinkRecord {
                short: short.to_string(),
                original: original.value().to_string(),
                views: views.get(short)?.map(|v| v.value()).unwrap_or(0),
                owner: owners
                    .get(short)?
                    .map(|v| v.value().to_string())
                    .unwrap_or_else(|| DEFAULT_OWNER.to_string()),
            });
        }

        Ok(links)
    }

    /// Every short code currently stored
    pub fn list_shorts(&self) -> Result<Vec<String>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(SHORTS)?;
        let shorts = table
            .iter()?
            .map(|r| r.map(|(k, _)| k.value().to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(shorts)
    }
}
