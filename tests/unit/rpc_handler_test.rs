//! Unit tests for the RPC handler, covering the JSON-RPC methods dispatched by `handle_method`.
//!
//! These tests go through the same code path as the `cloudnav-rpc` binary,
//! with an in-memory database and an in-process remote store.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::{Mutex, Notify, Semaphore};

use cloudnav::app::App;
use cloudnav::database::Database;
use cloudnav::rpc_handler::handle_method;
use cloudnav::services::ai_describer::DescriptionGenerator;
use cloudnav::services::remote_store::RemoteStore;
use cloudnav::types::config::AppConfig;
use cloudnav::types::errors::{AiError, RemoteError};
use cloudnav::types::integrations::AiConfig;
use cloudnav::types::snapshot::{Snapshot, SnapshotPayload};
use cloudnav::types::sync::Credential;

const PASSWORD: &str = "letmein";

struct PasswordRemote;

#[async_trait]
impl RemoteStore for PasswordRemote {
    async fn fetch_snapshot(&self) -> Result<Option<SnapshotPayload>, RemoteError> {
        Ok(None)
    }

    async fn replace_snapshot(&self, _: &Snapshot, credential: &Credential) -> Result<(), RemoteError> {
        if credential.expose() == PASSWORD {
            Ok(())
        } else {
            Err(RemoteError::Unauthorized)
        }
    }
}

struct EchoDescriber;

#[async_trait]
impl DescriptionGenerator for EchoDescriber {
    async fn describe(&self, title: &str, _url: &str, _config: &AiConfig) -> Result<String, AiError> {
        Ok(format!("{} description", title))
    }
}

/// Signals each request, then waits for a permit before answering.
struct GatedDescriber {
    started: Notify,
    gate: Semaphore,
}

#[async_trait]
impl DescriptionGenerator for GatedDescriber {
    async fn describe(&self, title: &str, _url: &str, _config: &AiConfig) -> Result<String, AiError> {
        self.started.notify_one();
        self.gate.acquire().await.expect("gate closed").forget();
        Ok(format!("{} description", title))
    }
}

/// Create a fresh App backed by an in-memory DB.
async fn setup() -> Mutex<App> {
    setup_with(Arc::new(EchoDescriber)).await
}

async fn setup_with(describer: Arc<dyn DescriptionGenerator>) -> Mutex<App> {
    let db = Arc::new(Database::open_in_memory().expect("open_in_memory failed"));
    let mut app = App::with_services(AppConfig::default(), db, Arc::new(PasswordRemote), describer)
        .expect("Failed to init App");
    app.startup().await;
    Mutex::new(app)
}

async fn call(app: &Mutex<App>, method: &str, params: Value) -> Result<Value, String> {
    handle_method(app, method, &params).await
}

async fn login(app: &Mutex<App>) {
    call(app, "auth.login", json!({"password": PASSWORD}))
        .await
        .expect("login failed");
}

fn link_ids(links: &Value) -> Vec<String> {
    links
        .as_array()
        .expect("links array")
        .iter()
        .map(|l| l["id"].as_str().unwrap().to_string())
        .collect()
}

// ─── Basics ───

#[tokio::test]
async fn test_ping() {
    let app = setup().await;
    assert_eq!(call(&app, "ping", json!({})).await.unwrap(), json!({"pong": true}));
}

#[tokio::test]
async fn test_unknown_method_returns_error() {
    let app = setup().await;
    let res = call(&app, "nonexistent.method", json!({})).await;
    assert!(res.unwrap_err().contains("unknown method"));
}

#[tokio::test]
async fn test_snapshot_get_returns_defaults() {
    let app = setup().await;
    let res = call(&app, "snapshot.get", json!({})).await.unwrap();
    assert_eq!(res["links"].as_array().unwrap().len(), 6);
    assert_eq!(res["categories"].as_array().unwrap().len(), 6);
    assert_eq!(res["settings"]["cardStyle"], "detailed");
    assert_eq!(res["categories"][0]["locked"], false);
}

// ─── Auth flow ───

#[tokio::test]
async fn test_gated_method_requires_login() {
    let app = setup().await;

    let err = call(&app, "link.add", json!({"title": "A", "url": "https://a.example"}))
        .await
        .unwrap_err();
    assert_eq!(err, "Authentication required");

    let status = call(&app, "auth.status", json!({})).await.unwrap();
    assert_eq!(status, json!({"authenticated": false, "promptPending": true}));

    let err = call(&app, "auth.login", json!({"password": "wrong"})).await.unwrap_err();
    assert_eq!(err, "Credential rejected by remote store");

    login(&app).await;
    let status = call(&app, "auth.status", json!({})).await.unwrap();
    assert_eq!(status, json!({"authenticated": true, "promptPending": false}));

    let res = call(&app, "link.add", json!({"title": "A", "url": "https://a.example"}))
        .await
        .unwrap();
    let id = res["id"].as_str().unwrap().to_string();
    let snapshot = call(&app, "snapshot.get", json!({})).await.unwrap();
    assert_eq!(link_ids(&snapshot["links"])[0], id);
    assert_eq!(snapshot["links"][0]["categoryId"], "common");
}

#[tokio::test]
async fn test_missing_params_are_reported() {
    let app = setup().await;
    login(&app).await;
    assert_eq!(
        call(&app, "link.delete", json!({})).await.unwrap_err(),
        "missing id"
    );
    assert_eq!(
        call(&app, "link.update", json!({"id": "1"})).await.unwrap_err(),
        "missing patch"
    );
}

#[tokio::test]
async fn test_settings_update_without_login() {
    let app = setup().await;
    call(
        &app,
        "settings.update",
        json!({"settings": {"title": "T", "navTitle": "N", "favicon": "/f.ico", "cardStyle": "simple"}}),
    )
    .await
    .unwrap();

    let snapshot = call(&app, "snapshot.get", json!({})).await.unwrap();
    assert_eq!(snapshot["settings"]["navTitle"], "N");
    assert_eq!(snapshot["settings"]["cardStyle"], "simple");
}

// ─── Links ───

#[tokio::test]
async fn test_link_pin_reorder_update_delete() {
    let app = setup().await;
    login(&app).await;

    let res = call(&app, "link.pin", json!({"id": "2"})).await.unwrap();
    assert_eq!(res["pinned"], true);
    let pinned = call(&app, "link.pinned", json!({})).await.unwrap();
    assert_eq!(link_ids(&pinned), vec!["1", "2"]);

    call(&app, "link.reorder", json!({"sourceId": "1", "targetId": "3"}))
        .await
        .unwrap();
    let snapshot = call(&app, "snapshot.get", json!({})).await.unwrap();
    assert_eq!(link_ids(&snapshot["links"]), vec!["2", "3", "1", "4", "5", "6"]);

    call(&app, "link.update", json!({"id": "4", "patch": {"title": "HN"}}))
        .await
        .unwrap();
    let hits = call(&app, "link.search", json!({"query": "hn"})).await.unwrap();
    assert_eq!(link_ids(&hits), vec!["4"]);

    call(&app, "link.delete", json!({"id": "4"})).await.unwrap();
    let err = call(&app, "link.delete", json!({"id": "4"})).await.unwrap_err();
    assert_eq!(err, "Link not found: 4");
}

// ─── Categories & locks ───

#[tokio::test]
async fn test_protected_category_hides_password_and_links() {
    let app = setup().await;
    login(&app).await;

    let res = call(
        &app,
        "category.add",
        json!({"name": "Vault", "icon": "Lock", "password": "open-sesame"}),
    )
    .await
    .unwrap();
    let vault = res["id"].as_str().unwrap().to_string();
    let res = call(
        &app,
        "link.add",
        json!({"title": "Secret", "url": "https://secret.example", "categoryId": vault}),
    )
    .await
    .unwrap();
    let secret = res["id"].as_str().unwrap().to_string();

    let snapshot = call(&app, "snapshot.get", json!({})).await.unwrap();
    let text = snapshot.to_string();
    assert!(!text.contains("open-sesame"));
    assert!(!link_ids(&snapshot["links"]).contains(&secret));
    let view = snapshot["categories"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["id"] == vault.as_str())
        .cloned()
        .unwrap();
    assert_eq!(view["locked"], true);
    assert_eq!(view["protected"], true);

    let listed = call(&app, "link.list", json!({"categoryId": vault})).await.unwrap();
    assert!(listed.as_array().unwrap().is_empty());

    let err = call(&app, "category.unlock", json!({"id": vault, "password": "guess"}))
        .await
        .unwrap_err();
    assert!(err.contains("Wrong password"));

    call(&app, "category.unlock", json!({"id": vault, "password": "open-sesame"}))
        .await
        .unwrap();
    let listed = call(&app, "link.list", json!({"categoryId": vault})).await.unwrap();
    assert_eq!(link_ids(&listed), vec![secret.clone()]);

    call(&app, "category.relock", json!({})).await.unwrap();
    let hits = call(&app, "link.search", json!({"query": "secret"})).await.unwrap();
    assert!(hits.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_category_update_keeps_unsent_passwords() {
    let app = setup().await;
    login(&app).await;
    let res = call(&app, "category.add", json!({"name": "Vault", "password": "pw"}))
        .await
        .unwrap();
    let vault = res["id"].as_str().unwrap().to_string();

    // Send the categories back the way clients see them: without passwords.
    let snapshot = call(&app, "snapshot.get", json!({})).await.unwrap();
    let categories: Vec<Value> = snapshot["categories"]
        .as_array()
        .unwrap()
        .iter()
        .rev()
        .map(|c| json!({"id": c["id"], "name": c["name"], "icon": c["icon"]}))
        .collect();
    call(&app, "category.update", json!({"categories": categories}))
        .await
        .unwrap();

    let snapshot = call(&app, "snapshot.get", json!({})).await.unwrap();
    assert_eq!(snapshot["categories"][0]["id"], vault.as_str());
    assert_eq!(snapshot["categories"][0]["locked"], true);
}

#[tokio::test]
async fn test_category_update_keeps_links_of_locked_categories() {
    let app = setup().await;
    login(&app).await;
    let res = call(&app, "category.add", json!({"name": "Vault", "password": "pw"}))
        .await
        .unwrap();
    let vault = res["id"].as_str().unwrap().to_string();
    let res = call(
        &app,
        "link.add",
        json!({"title": "Hidden", "url": "https://hidden.example", "categoryId": vault}),
    )
    .await
    .unwrap();
    let hidden = res["id"].as_str().unwrap().to_string();
    call(&app, "link.add", json!({"title": "Shown", "url": "https://shown.example"}))
        .await
        .unwrap();

    // Send back exactly what the client was shown, minus link 6.
    let shown = call(&app, "snapshot.get", json!({})).await.unwrap();
    let links: Vec<Value> = shown["links"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|l| l["id"] != "6")
        .cloned()
        .collect();
    let categories: Vec<Value> = shown["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| json!({"id": c["id"], "name": c["name"], "icon": c["icon"]}))
        .collect();
    call(&app, "category.update", json!({"categories": categories, "links": links}))
        .await
        .unwrap();

    let a = app.lock().await;
    let snapshot = a.controller.snapshot();
    let ids: Vec<&str> = snapshot.links.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids.len(), 7);
    assert_eq!(ids[1], hidden.as_str());
    assert!(!ids.contains(&"6"));
    assert_eq!(a.controller.cache().read().unwrap().links.len(), 7);
}

#[tokio::test]
async fn test_category_delete_moves_links_to_common() {
    let app = setup().await;
    login(&app).await;
    call(&app, "category.delete", json!({"id": "dev"})).await.unwrap();
    let listed = call(&app, "link.list", json!({"categoryId": "common"})).await.unwrap();
    assert_eq!(link_ids(&listed), vec!["1", "2"]);
}

// ─── Import, sync & integrations ───

#[tokio::test]
async fn test_import_merge_reports_added_links() {
    let app = setup().await;
    login(&app).await;
    let res = call(
        &app,
        "import.merge",
        json!({
            "links": [{"id": "imp", "title": "Imp", "url": "https://imp.example", "categoryId": "common", "createdAt": 1}],
            "categories": [{"id": "dev", "name": "Dupe", "icon": "X"}]
        }),
    )
    .await
    .unwrap();
    assert_eq!(res, json!({"linksAdded": 1}));
    let snapshot = call(&app, "snapshot.get", json!({})).await.unwrap();
    assert_eq!(snapshot["categories"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_sync_status_reports_saved_after_login() {
    let app = setup().await;
    login(&app).await;
    let res = call(&app, "sync.status", json!({})).await.unwrap();
    assert_eq!(res["status"], "saved");
}

#[tokio::test]
async fn test_webdav_config_password_is_masked() {
    let app = setup().await;
    let config = json!({"url": "https://dav.example", "username": "me", "password": "pw", "enabled": true});
    call(&app, "webdav.config.set", json!({"config": config})).await.unwrap();

    let got = call(&app, "webdav.config.get", json!({})).await.unwrap();
    assert_eq!(got["password"], "********");
    assert_eq!(got["username"], "me");

    // Saving the masked value back keeps the real password.
    call(&app, "webdav.config.set", json!({"config": got})).await.unwrap();
    let a = app.lock().await;
    assert_eq!(a.controller.cache().load_webdav_config().password, "pw");
}

#[tokio::test]
async fn test_ai_fill_descriptions_through_rpc() {
    let app = setup().await;
    login(&app).await;
    call(
        &app,
        "ai.config.set",
        json!({"config": {"provider": "openai", "apiKey": "k", "baseUrl": "", "model": "m"}}),
    )
    .await
    .unwrap();
    let got = call(&app, "ai.config.get", json!({})).await.unwrap();
    assert_eq!(got["apiKey"], "********");

    call(&app, "link.add", json!({"title": "Bare", "url": "https://bare.example"}))
        .await
        .unwrap();
    let report = call(&app, "ai.fill_descriptions", json!({})).await.unwrap();
    assert_eq!(report["generated"], 1);

    let hits = call(&app, "link.search", json!({"query": "bare description"})).await.unwrap();
    assert_eq!(hits.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_fill_can_be_cancelled_while_a_request_is_pending() {
    let describer = Arc::new(GatedDescriber {
        started: Notify::new(),
        gate: Semaphore::new(0),
    });
    let app = Arc::new(setup_with(describer.clone()).await);
    login(&app).await;
    call(
        &app,
        "ai.config.set",
        json!({"config": {"provider": "gemini", "apiKey": "k", "model": "m"}}),
    )
    .await
    .unwrap();
    for title in ["First", "Second"] {
        call(&app, "link.add", json!({"title": title, "url": "https://x.example"}))
            .await
            .unwrap();
    }

    let runner = Arc::clone(&app);
    let fill = tokio::spawn(async move {
        handle_method(&runner, "ai.fill_descriptions", &json!({})).await
    });
    describer.started.notified().await;

    // The app stays usable while the provider is answering.
    let cancelled = tokio::time::timeout(
        std::time::Duration::from_secs(1),
        call(&app, "ai.cancel_fill", json!({})),
    )
    .await
    .expect("cancel blocked behind the running fill");
    assert_eq!(cancelled.unwrap(), json!({"ok": true}));

    describer.gate.add_permits(10);
    let report = fill.await.unwrap().unwrap();
    assert_eq!(report, json!({"total": 2, "generated": 1, "failed": 0, "cancelled": true}));
    let hits = call(&app, "link.search", json!({"query": "second description"}))
        .await
        .unwrap();
    assert_eq!(hits.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_deeplink_parse() {
    let app = setup().await;
    let res = call(
        &app,
        "deeplink.parse",
        json!({"query": "?add_url=https%3A%2F%2Fdocs.rs&add_title=Docs"}),
    )
    .await
    .unwrap();
    assert_eq!(res["url"], "https://docs.rs");
    assert_eq!(res["title"], "Docs");
    assert_eq!(res["categoryId"], "common");

    let none = call(&app, "deeplink.parse", json!({"query": "foo=bar"})).await.unwrap();
    assert_eq!(none, Value::Null);
}

#[tokio::test]
async fn test_backup_push_requires_login_and_config() {
    let app = setup().await;
    let err = call(&app, "backup.push", json!({})).await.unwrap_err();
    assert_eq!(err, "Authentication required");

    login(&app).await;
    let err = call(&app, "backup.push", json!({})).await.unwrap_err();
    assert_eq!(err, "WebDAV backup is not configured");
}
