use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::Role;

impl Database {
    // ========================================================================
    // Account operations
    // ========================================================================

    /// Stored password hash of a username in the given partition
    pub fn get_password_hash(
        &self,
        role: Role,
        username: &str,
    ) -> Result<Option<String>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(role.table())?;
        let hash = table.get(username)?.map(|v| v.value().to_string());
        Ok(hash)
    }

    pub fn account_exists(&self, role: Role, username: &str) -> Result<bool, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(role.table())?;
        Ok(table.get(username)?.is_some())
    }

    /// Insert or overwrite the password hash of a username
    pub fn put_account(
        &self,
        role: Role,
        username: &str,
        password_hash: &str,
    ) -> Result<(), DatabaseError> {
        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(role.table())?;
            table.insert(username, password_hash)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Remove a username from a partition. Returns whether it existed.
    pub fn remove_account(&self, role: Role, username: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(role.table())?;
            let existed = table.remove(username)?.is_some();
            existed
        };
        write_txn.commit()?;
        Ok(existed)
    }

    /// Usernames of a partition, in key order
    pub fn list_accounts(&self, role: Role) -> Result<Vec<String>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(role.table())?;
        let usernames = table
            .iter()?
            .map(|r| r.map(|(k, _)| k.value().to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(usernames)
    }
}
