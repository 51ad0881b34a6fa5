use redb::TableDefinition;

/// Link destinations: short -> original URL
pub const SHORTS: TableDefinition<&str, &str> = TableDefinition::new("s");

/// View counters: short -> views
pub const VIEWS: TableDefinition<&str, u64> = TableDefinition::new("v");

/// Link owners: short -> username that created the link
pub const OWNERS: TableDefinition<&str, &str> = TableDefinition::new("u");

/// Admin credentials: username -> password hash
pub const ADMINS: TableDefinition<&str, &str> = TableDefinition::new("admin");

/// User credentials: username -> password hash
pub const USERS: TableDefinition<&str, &str> = TableDefinition::new("user");

/// Blocked destination substrings
pub const DENY_LIST: TableDefinition<&str, ()> = TableDefinition::new("denyList");

/// Login sessions: session id -> SessionRecord (msgpack)
pub const SESSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");
