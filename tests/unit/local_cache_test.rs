//! Unit tests for the LocalCache key-value store.
//!
//! Covers snapshot persistence, tolerant reads, the sealed credential and
//! the locally stored integration configs.

use std::sync::Arc;

use cloudnav::database::Database;
use cloudnav::services::local_cache::LocalCache;
use cloudnav::types::config::{SeedData, StorageKeys};
use cloudnav::types::integrations::{AiConfig, AiProvider, WebDavConfig};
use cloudnav::types::settings::CardStyle;
use cloudnav::types::snapshot::Snapshot;
use cloudnav::types::sync::Credential;
use tempfile::TempDir;

fn setup() -> (LocalCache, Arc<Database>) {
    let db = Arc::new(Database::open_in_memory().expect("open_in_memory failed"));
    let cache = LocalCache::new(db.clone(), StorageKeys::default(), SeedData::default())
        .expect("cache init failed");
    (cache, db)
}

fn put(db: &Database, key: &str, value: &str) {
    db.connection()
        .execute(
            "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?1, ?2, 0)",
            [key, value],
        )
        .unwrap();
}

#[test]
fn test_write_then_read_returns_same_snapshot() {
    let (cache, _db) = setup();
    let mut snapshot = Snapshot::from_seed(&SeedData::default());
    snapshot.settings.card_style = CardStyle::Simple;
    snapshot.links.truncate(2);

    cache.write(&snapshot).unwrap();
    assert_eq!(cache.read(), Some(snapshot));
}

#[test]
fn test_read_fills_missing_parts_from_seed() {
    let (cache, db) = setup();
    put(&db, "cloudnav_data_cache", r#"{"links": []}"#);

    let snapshot = cache.read().expect("partial payload should still load");
    let seed = SeedData::default();
    assert!(snapshot.links.is_empty());
    assert_eq!(snapshot.categories, seed.categories);
    assert_eq!(snapshot.settings, seed.settings);
}

#[test]
fn test_unparsable_record_reads_as_absent() {
    let (cache, db) = setup();
    put(&db, "cloudnav_data_cache", "[1, 2, 3]");
    assert!(cache.read().is_none());
}

#[test]
fn test_cached_json_uses_camel_case_keys() {
    let (cache, db) = setup();
    cache.write(&Snapshot::from_seed(&SeedData::default())).unwrap();
    let raw: String = db
        .connection()
        .query_row(
            "SELECT value FROM kv_store WHERE key = 'cloudnav_data_cache'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(raw.contains("\"categoryId\""));
    assert!(raw.contains("\"createdAt\""));
    assert!(raw.contains("\"navTitle\""));
    assert!(raw.contains("\"cardStyle\":\"detailed\""));
}

#[test]
fn test_credential_roundtrip_and_clear() {
    let (cache, _db) = setup();
    assert!(cache.load_credential().is_none());

    cache.store_credential(&Credential::new("hunter2")).unwrap();
    assert_eq!(cache.load_credential(), Some(Credential::new("hunter2")));

    cache.clear_credential().unwrap();
    assert!(cache.load_credential().is_none());
}

#[test]
fn test_tampered_credential_is_discarded() {
    let (cache, db) = setup();
    cache.store_credential(&Credential::new("hunter2")).unwrap();
    db.connection()
        .execute("UPDATE secure_store SET auth_tag = zeroblob(16)", [])
        .unwrap();
    assert!(cache.load_credential().is_none());
}

#[test]
fn test_integration_configs_default_and_roundtrip() {
    let (cache, _db) = setup();
    assert_eq!(cache.load_webdav_config(), WebDavConfig::default());
    assert_eq!(cache.load_ai_config(), AiConfig::default());

    let webdav = WebDavConfig {
        url: "https://dav.example.com/nav".to_string(),
        username: "me".to_string(),
        password: "pw".to_string(),
        enabled: true,
    };
    let ai = AiConfig {
        provider: AiProvider::Openai,
        api_key: "sk-test".to_string(),
        base_url: "https://llm.example.com/v1".to_string(),
        model: "gpt-4o-mini".to_string(),
    };
    cache.save_webdav_config(&webdav).unwrap();
    cache.save_ai_config(&ai).unwrap();

    assert_eq!(cache.load_webdav_config(), webdav);
    assert_eq!(cache.load_ai_config(), ai);
}

#[test]
fn test_cache_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("cloudnav.db");
    let snapshot = Snapshot::from_seed(&SeedData::default());

    {
        let db = Arc::new(Database::open(&path).unwrap());
        let cache = LocalCache::new(db, StorageKeys::default(), SeedData::default()).unwrap();
        cache.write(&snapshot).unwrap();
        cache.store_credential(&Credential::new("kept")).unwrap();
    }

    let db = Arc::new(Database::open(&path).unwrap());
    let cache = LocalCache::new(db, StorageKeys::default(), SeedData::default()).unwrap();
    assert_eq!(cache.read(), Some(snapshot));
    assert_eq!(cache.load_credential(), Some(Credential::new("kept")));
}
