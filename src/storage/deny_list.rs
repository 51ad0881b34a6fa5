use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::tables::DENY_LIST;

impl Database {
    // ========================================================================
    // Deny-list operations
    // ========================================================================

    pub fn add_deny_entry(&self, entry: &str) -> Result<(), DatabaseError> {
        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(DENY_LIST)?;
            table.insert(entry, ())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn remove_deny_entry(&self, entry: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(DENY_LIST)?;
            let existed = table.remove(entry)?.is_some();
            existed
        };
        write_txn.commit()?;
        Ok(existed)
    }

    pub fn list_deny_entries(&self) -> Result<Vec<String>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(DENY_LIST)?;
        let entries = table
            .iter()?
            .map(|r| r.map(|(k, _)| k.value().to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
