use chrono::{Duration, Utc};
use link_shortener::storage::models::{LinkRecord, Role, SessionRecord, DEFAULT_OWNER};
use link_shortener::storage::Database;

fn test_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("data")).unwrap();
    (dir, db)
}

fn sample_session(username: &str, ttl: Duration) -> SessionRecord {
    let now = Utc::now();
    SessionRecord {
        username: username.to_string(),
        created_at: now,
        expires_at: now + ttl,
    }
}

// ============================================================================
// Links
// ============================================================================

#[test]
fn test_put_and_get_link() {
    let (_dir, db) = test_db();
    db.put_link("abc12", "https://example.com", "alice").unwrap();

    assert_eq!(
        db.get_original("abc12").unwrap(),
        Some("https://example.com".to_string())
    );
    assert_eq!(db.get_views("abc12").unwrap(), Some(0));
    assert_eq!(db.get_original("missing").unwrap(), None);
    assert_eq!(db.get_views("missing").unwrap(), None);
}

#[test]
fn test_put_link_resets_views() {
    let (_dir, db) = test_db();
    db.put_link("abc12", "https://example.com", DEFAULT_OWNER).unwrap();
    db.incr_views("abc12").unwrap();
    db.incr_views("abc12").unwrap();
    assert_eq!(db.get_views("abc12").unwrap(), Some(2));

    db.put_link("abc12", "https://example.org", DEFAULT_OWNER).unwrap();
    assert_eq!(db.get_views("abc12").unwrap(), Some(0));
    assert_eq!(
        db.get_original("abc12").unwrap(),
        Some("https://example.org".to_string())
    );
}

#[test]
fn test_incr_views_on_missing_counter_starts_at_zero() {
    let (_dir, db) = test_db();
    assert_eq!(db.incr_views("ghost").unwrap(), 1);
    assert_eq!(db.incr_views("ghost").unwrap(), 2);
}

#[test]
fn test_delete_link_removes_every_field() {
    let (_dir, db) = test_db();
    db.put_link("abc12", "https://example.com", "alice").unwrap();

    assert!(db.delete_link("abc12").unwrap());
    assert_eq!(db.get_original("abc12").unwrap(), None);
    assert_eq!(db.get_views("abc12").unwrap(), None);
    assert!(db.get_all_links().unwrap().is_empty());

    assert!(!db.delete_link("abc12").unwrap());
}

#[test]
fn test_get_all_links_joins_fields() {
    let (_dir, db) = test_db();
    db.put_link("aaa", "https://a.example.com", "alice").unwrap();
    db.put_link("bbb", "https://b.example.com", DEFAULT_OWNER).unwrap();
    db.incr_views("bbb").unwrap();

    let mut links = db.get_all_links().unwrap();
    links.sort_by(|a, b| a.short.cmp(&b.short));

    assert_eq!(
        links,
        vec![
            LinkRecord {
                short: "aaa".to_string(),
                original: "https://a.example.com".to_string(),
                views: 0,
                owner: "alice".to_string(),
            },
            LinkRecord {
                short: "bbb".to_string(),
                original: "https://b.example.com".to_string(),
                views: 1,
                owner: DEFAULT_OWNER.to_string(),
            },
        ]
    );
}

#[test]
fn test_list_shorts() {
    let (_dir, db) = test_db();
    db.put_link("one", "https://example.com/1", DEFAULT_OWNER).unwrap();
    db.put_link("two", "https://example.com/2", DEFAULT_OWNER).unwrap();

    let mut shorts = db.list_shorts().unwrap();
    shorts.sort();
    assert_eq!(shorts, vec!["one", "two"]);
}

#[test]
fn test_links_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let db = Database::open(dir.path().join("data")).unwrap();
        db.put_link("keep", "https://example.com", DEFAULT_OWNER).unwrap();
    }

    let db = Database::open(dir.path().join("data")).unwrap();
    assert_eq!(db.list_shorts().unwrap(), vec!["keep"]);
}

// ============================================================================
// Accounts
// ============================================================================

#[test]
fn test_accounts_are_partitioned_by_role() {
    let (_dir, db) = test_db();
    db.put_account(Role::Admin, "root", "hash-a").unwrap();
    db.put_account(Role::User, "alice", "hash-u").unwrap();

    assert!(db.account_exists(Role::Admin, "root").unwrap());
    assert!(!db.account_exists(Role::User, "root").unwrap());
    assert_eq!(
        db.get_password_hash(Role::User, "alice").unwrap(),
        Some("hash-u".to_string())
    );
    assert_eq!(db.get_password_hash(Role::Admin, "alice").unwrap(), None);
}

#[test]
fn test_put_account_replaces_hash() {
    let (_dir, db) = test_db();
    db.put_account(Role::User, "alice", "old").unwrap();
    db.put_account(Role::User, "alice", "new").unwrap();

    assert_eq!(
        db.get_password_hash(Role::User, "alice").unwrap(),
        Some("new".to_string())
    );
    assert_eq!(db.list_accounts(Role::User).unwrap(), vec!["alice"]);
}

#[test]
fn test_remove_and_list_accounts() {
    let (_dir, db) = test_db();
    db.put_account(Role::User, "bob", "h").unwrap();
    db.put_account(Role::User, "alice", "h").unwrap();

    assert_eq!(db.list_accounts(Role::User).unwrap(), vec!["alice", "bob"]);
    assert!(db.remove_account(Role::User, "bob").unwrap());
    assert!(!db.remove_account(Role::User, "bob").unwrap());
    assert_eq!(db.list_accounts(Role::User).unwrap(), vec!["alice"]);
}

// ============================================================================
// Deny list
// ============================================================================

#[test]
fn test_deny_entries() {
    let (_dir, db) = test_db();
    db.add_deny_entry("badsite").unwrap();
    db.add_deny_entry("badsite").unwrap();
    db.add_deny_entry("malware").unwrap();

    assert_eq!(db.list_deny_entries().unwrap(), vec!["badsite", "malware"]);
    assert!(db.remove_deny_entry("badsite").unwrap());
    assert!(!db.remove_deny_entry("badsite").unwrap());
    assert_eq!(db.list_deny_entries().unwrap(), vec!["malware"]);
}

// ============================================================================
// Sessions
// ============================================================================

#[test]
fn test_session_round_trip() {
    let (_dir, db) = test_db();
    let session = sample_session("alice", Duration::hours(1));
    db.put_session("sid-1", &session).unwrap();

    let stored = db.get_session("sid-1").unwrap().expect("session should exist");
    assert_eq!(stored.username, "alice");
    assert_eq!(stored.expires_at, session.expires_at);

    assert!(db.delete_session("sid-1").unwrap());
    assert!(db.get_session("sid-1").unwrap().is_none());
    assert!(!db.delete_session("sid-1").unwrap());
}

#[test]
fn test_purge_expired_sessions() {
    let (_dir, db) = test_db();
    db.put_session("live", &sample_session("alice", Duration::hours(1)))
        .unwrap();
    db.put_session("stale", &sample_session("bob", Duration::hours(-1)))
        .unwrap();

    assert_eq!(db.purge_expired_sessions(Utc::now()).unwrap(), 1);
    assert!(db.get_session("live").unwrap().is_some());
    assert!(db.get_session("stale").unwrap().is_none());
}

// ============================================================================
// Purge
// ============================================================================

#[test]
fn test_purge_all() {
    let (_dir, db) = test_db();
    db.put_link("abc12", "https://example.com", DEFAULT_OWNER).unwrap();
    db.put_link("def34", "https://example.org", "alice").unwrap();
    db.put_account(Role::Admin, "root", "h").unwrap();
    db.put_account(Role::User, "alice", "h").unwrap();
    db.add_deny_entry("badsite").unwrap();
    db.put_session("sid", &sample_session("root", Duration::hours(1)))
        .unwrap();

    let stats = db.purge_all().unwrap();
    assert_eq!(stats.links, 2);
    assert_eq!(stats.accounts, 2);
    assert_eq!(stats.deny_entries, 1);
    assert_eq!(stats.sessions, 1);

    assert!(db.get_all_links().unwrap().is_empty());
    assert_eq!(db.get_views("abc12").unwrap(), None);
    assert!(db.list_accounts(Role::Admin).unwrap().is_empty());
    assert!(db.list_deny_entries().unwrap().is_empty());
    assert!(db.get_session("sid").unwrap().is_none());
}
