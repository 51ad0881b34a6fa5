use std::sync::Arc;

use link_shortener::config::LinkConfig;
use link_shortener::deny_list::DenyList;
use link_shortener::links::{LinkError, LinkRegistry, Rejection, ValidationResult, SHORT_CHARSET};
use link_shortener::storage::Database;

struct Fixture {
    _dir: tempfile::TempDir,
    db: Database,
    deny_list: Arc<DenyList>,
    links: LinkRegistry,
}

fn fixture_with(config: LinkConfig) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("data")).unwrap();
    let deny_list = Arc::new(DenyList::new(db.clone()));
    deny_list.init().unwrap();
    let links = LinkRegistry::new(db.clone(), Arc::clone(&deny_list), config);
    links.init().unwrap();
    Fixture {
        _dir: dir,
        db,
        deny_list,
        links,
    }
}

fn fixture() -> Fixture {
    fixture_with(LinkConfig::default())
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_validate_then_taken() {
    let f = fixture();

    assert_eq!(
        f.links.validate_input("https://example.com", "abc12"),
        Ok("jsa.life/abc12".to_string())
    );
    f.links.set("abc12", "https://example.com", None).unwrap();

    let rejection = f
        .links
        .validate_input("https://example.com", "abc12")
        .unwrap_err();
    assert_eq!(rejection.to_string(), "abc12 is already taken");
}

#[test]
fn test_self_reference_is_rejected_first() {
    let f = fixture();
    f.links.set("zz1", "https://example.com", None).unwrap();

    // Wins over the code being taken
    let rejection = f.links.validate_input("http://jsa.life/x", "zz1").unwrap_err();
    assert_eq!(rejection.to_string(), "Cannot shorten URLs linked to jsa.life/*");

    // Wins over an invalid short as well
    let rejection = f.links.validate_input("https://JSA.life/x", "bad code").unwrap_err();
    assert!(matches!(rejection, Rejection::SelfReference { .. }));
}

#[test]
fn test_self_host_aliases_are_rejected() {
    let f = fixture_with(LinkConfig {
        self_host_aliases: vec!["jsa-life.herokuapp.com".to_string()],
        ..LinkConfig::default()
    });

    let rejection = f
        .links
        .validate_input("https://jsa-life.herokuapp.com/abc", "zz1")
        .unwrap_err();
    assert_eq!(rejection.to_string(), "Cannot shorten URLs linked to jsa.life/*");
}

#[test]
fn test_invalid_url_and_short() {
    let f = fixture();

    assert_eq!(
        f.links.validate_input("example.com", "abc12"),
        Err(Rejection::InvalidUrl)
    );
    assert_eq!(
        f.links.validate_input("https://example.com", "no/slash"),
        Err(Rejection::InvalidShort("no/slash".to_string()))
    );
    assert_eq!(
        f.links.validate_input("https://example.com", "ok_-!"),
        Ok("jsa.life/ok_-!".to_string())
    );
}

#[test]
fn test_deny_list_blocks_long_entries_only() {
    let f = fixture();

    assert!(!f.deny_list.add("ab").unwrap());
    assert!(f.deny_list.get_list().is_empty());
    assert!(f.links.validate_input("https://ab.example.com", "zz1").is_ok());

    assert!(f.deny_list.add("abcdef").unwrap());
    assert_eq!(
        f.links.validate_input("https://abcdef.example.com", "zz1"),
        Err(Rejection::Blocked)
    );
    assert_eq!(
        Rejection::Blocked.to_string(),
        "The original URL contains a blocked string"
    );

    f.deny_list.rem("abcdef").unwrap();
    assert!(f.links.validate_input("https://abcdef.example.com", "zz1").is_ok());
}

#[test]
fn test_blocked_url_is_rejected_before_short_syntax() {
    let f = fixture();
    f.deny_list.add("badsite").unwrap();
    f.links.set("taken", "https://example.com", None).unwrap();

    assert_eq!(
        f.links.validate_input("https://badsite.com", "bad code"),
        Err(Rejection::Blocked)
    );
    assert_eq!(
        f.links.validate_input("https://badsite.com", "taken"),
        Err(Rejection::Blocked)
    );
    // An invalid short is reported before availability
    f.links.set("admin", "https://example.com", None).unwrap();
    assert_eq!(
        f.links.validate_input("https://example.com", "admin"),
        Err(Rejection::InvalidShort("admin".to_string()))
    );
}

#[test]
fn test_overlong_and_trailing_dot_urls_are_invalid() {
    let f = fixture();

    let long = format!("https://example.com/{}", "a".repeat(100_000));
    assert_eq!(f.links.validate_input(&long, "long1"), Err(Rejection::InvalidUrl));
    assert_eq!(
        f.links.validate_input("https://example.com.", "dot01"),
        Err(Rejection::InvalidUrl)
    );
}

#[test]
fn test_deny_list_reloads_from_store() {
    let f = fixture();
    f.deny_list.add("badsite").unwrap();

    let reloaded = DenyList::new(f.db.clone());
    assert_eq!(reloaded.init().unwrap(), 1);
    assert!(reloaded.matches("https://badsite.com"));
}

#[test]
fn test_validation_result_shape() {
    let f = fixture();

    let ok = ValidationResult::from(f.links.validate_input("https://example.com", "abc12"));
    assert!(ok.success);
    assert_eq!(ok.output, "jsa.life/abc12");

    let failed = ValidationResult::from(f.links.validate_input("nope", "abc12"));
    assert!(!failed.success);
    assert_eq!(failed.output, "Invalid original URL");
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_set_has_get_del() {
    let f = fixture();
    assert!(!f.links.has("abc12"));

    f.links.set("abc12", "https://example.com", Some("alice")).unwrap();
    assert!(f.links.has("abc12"));
    assert_eq!(
        f.links.get("abc12").unwrap(),
        Some("https://example.com".to_string())
    );

    let all = f.links.get_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].owner, "alice");
    assert_eq!(all[0].views, 0);

    assert!(f.links.del("abc12").unwrap());
    assert!(!f.links.has("abc12"));
    assert_eq!(f.links.get("abc12").unwrap(), None);
    assert!(!f.links.del("abc12").unwrap());
}

#[test]
fn test_owner_defaults_to_website() {
    let f = fixture();
    f.links.set("abc12", "https://example.com", None).unwrap();
    assert_eq!(f.links.get_all().unwrap()[0].owner, "website");
}

#[test]
fn test_incr_counts_views() {
    let f = fixture();
    f.links.set("abc12", "https://example.com", None).unwrap();

    for expected in 1..=5 {
        assert_eq!(f.links.incr("abc12").unwrap(), expected);
    }
    assert_eq!(f.links.get_all().unwrap()[0].views, 5);
}

#[test]
fn test_init_loads_existing_codes() {
    let f = fixture();
    f.links.set("abc12", "https://example.com", None).unwrap();
    f.links.set("def34", "https://example.org", None).unwrap();

    let reloaded = LinkRegistry::new(f.db.clone(), Arc::clone(&f.deny_list), LinkConfig::default());
    assert!(!reloaded.has("abc12"));
    assert_eq!(reloaded.init().unwrap(), 2);
    assert!(reloaded.has("abc12"));
    assert!(reloaded.has("def34"));
}

#[test]
fn test_link_for_uses_domain() {
    let f = fixture_with(LinkConfig {
        domain: "sho.rt".to_string(),
        ..LinkConfig::default()
    });
    assert_eq!(f.links.link_for("x"), "sho.rt/x");
}

// ============================================================================
// Generation
// ============================================================================

#[test]
fn test_make_short_uses_configured_length() {
    let f = fixture();
    let short = f.links.make_short().unwrap();
    assert_eq!(short.len(), 5);
    assert!(short.bytes().all(|b| SHORT_CHARSET.contains(&b)));
}

#[test]
fn test_make_short_avoids_taken_codes() {
    let f = fixture_with(LinkConfig {
        code_length: 1,
        ..LinkConfig::default()
    });

    // Leave a single free code
    let free = SHORT_CHARSET[0] as char;
    for &b in &SHORT_CHARSET[1..] {
        let code = (b as char).to_string();
        f.links.set(&code, "https://example.com", None).unwrap();
    }

    for _ in 0..10 {
        match f.links.make_short() {
            Ok(short) => assert_eq!(short, free.to_string()),
            Err(LinkError::Exhausted { .. }) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}

#[test]
fn test_make_short_exhausts() {
    let f = fixture_with(LinkConfig {
        code_length: 1,
        ..LinkConfig::default()
    });

    for &b in SHORT_CHARSET {
        let code = (b as char).to_string();
        f.links.set(&code, "https://example.com", None).unwrap();
    }

    assert!(matches!(
        f.links.make_short(),
        Err(LinkError::Exhausted { attempts }) if attempts > 0
    ));
}
