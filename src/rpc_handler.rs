//! RPC method handler for the CloudNav JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` dispatches a method call to the sync controller, the
//! category locks or one of the integrations held by `App`.
//!
//! Category passwords never leave this layer, and links of locked
//! categories are left out of every listing.

use std::collections::HashSet;
use std::sync::atomic::Ordering;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::app::App;
use crate::managers::category_lock::{CategoryLockTrait, CategoryLockManager};
use crate::services::ai_describer::{plan_bulk_fill, BulkReport};
use crate::services::{deep_link, link_query};
use crate::types::integrations::{AiConfig, WebDavConfig};
use crate::types::link::{Category, LinkDraft, LinkItem, LinkPatch};
use crate::types::settings::SiteSettings;
use crate::types::snapshot::Snapshot;

const MASK: &str = "********";

fn to_json<T: Serialize>(value: &T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| format!("serialization error: {}", e))
}

fn param<T: DeserializeOwned>(params: &Value, key: &str) -> Result<T, String> {
    let raw = params.get(key).ok_or_else(|| format!("missing {}", key))?;
    serde_json::from_value(raw.clone()).map_err(|e| format!("invalid {}: {}", key, e))
}

fn opt_param<T: DeserializeOwned>(params: &Value, key: &str) -> Result<Option<T>, String> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => serde_json::from_value(raw.clone())
            .map(Some)
            .map_err(|e| format!("invalid {}: {}", key, e)),
    }
}

fn str_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", key))
}

fn category_view(category: &Category, locks: &CategoryLockManager) -> Value {
    json!({
        "id": category.id,
        "name": category.name,
        "icon": category.icon,
        "protected": category.is_protected(),
        "locked": locks.is_locked(category),
    })
}

fn links_json(links: &[&LinkItem]) -> Result<Value, String> {
    to_json(&links)
}

fn snapshot_view(snapshot: &Snapshot, locks: &CategoryLockManager) -> Result<Value, String> {
    let categories: Vec<Value> = snapshot
        .categories
        .iter()
        .map(|c| category_view(c, locks))
        .collect();
    Ok(json!({
        "links": links_json(&link_query::visible_links(snapshot, locks))?,
        "categories": categories,
        "settings": to_json(&snapshot.settings)?,
    }))
}

/// Clients never see passwords, so an absent password keeps the stored one
/// and an empty string removes it.
fn carry_passwords(incoming: Vec<Category>, current: &[Category]) -> Vec<Category> {
    incoming
        .into_iter()
        .map(|mut c| {
            c.password = match c.password.take() {
                None => current
                    .iter()
                    .find(|old| old.id == c.id)
                    .and_then(|old| old.password.clone()),
                Some(p) if p.is_empty() => None,
                Some(p) => Some(p),
            };
            c
        })
        .collect()
}

/// Clients only see links of unlocked categories, so links of a locked
/// category missing from `incoming` are put back at their old positions.
fn carry_locked_links(
    incoming: Vec<LinkItem>,
    current: &Snapshot,
    locks: &CategoryLockManager,
) -> Vec<LinkItem> {
    let sent: HashSet<&str> = incoming.iter().map(|l| l.id.as_str()).collect();
    let hidden: Vec<(usize, LinkItem)> = current
        .links
        .iter()
        .enumerate()
        .filter(|(_, l)| {
            !sent.contains(l.id.as_str())
                && locks.is_category_id_locked(&current.categories, &l.category_id)
        })
        .map(|(i, l)| (i, l.clone()))
        .collect();

    let mut links = incoming;
    for (index, link) in hidden {
        let at = index.min(links.len());
        links.insert(at, link);
    }
    links
}

/// Runs a bulk description fill. The app lock is only taken to plan the run
/// and to commit each result, never across a provider request, so other
/// calls (including `ai.cancel_fill`) are served meanwhile.
async fn fill_descriptions(app: &Mutex<App>) -> Result<Value, String> {
    let (config, describer, cancel, pending) = {
        let a = app.lock().await;
        let config = a.controller.cache().load_ai_config();
        let pending = plan_bulk_fill(&a.controller, &config).map_err(|e| e.to_string())?;
        a.fill_cancel.store(false, Ordering::SeqCst);
        (config, a.describer.clone(), a.fill_cancel.clone(), pending)
    };

    let mut report = BulkReport::new(pending.len());
    for link in pending {
        if cancel.load(Ordering::SeqCst) {
            report.cancelled = true;
            break;
        }
        match describer.describe(&link.title, &link.url, &config).await {
            Ok(description) => {
                let mut a = app.lock().await;
                let outcome = a.controller.set_description(&link.id, &description);
                report.record_commit(outcome).map_err(|e| e.to_string())?;
            }
            Err(e) => report.record_provider_failure(&link, &e),
        }
    }
    report.log_summary();
    to_json(&report)
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub async fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Snapshot & views ───
        "snapshot.get" => {
            let a = app.lock().await;
            snapshot_view(&a.controller.snapshot(), &a.locks)
        }
        "link.search" => {
            let query = params.get("query").and_then(|v| v.as_str()).unwrap_or("");
            let a = app.lock().await;
            let snapshot = a.controller.snapshot();
            links_json(&link_query::search_links(&snapshot, &a.locks, query))
        }
        "link.pinned" => {
            let a = app.lock().await;
            let snapshot = a.controller.snapshot();
            links_json(&link_query::pinned_links(&snapshot, &a.locks))
        }
        "link.list" => {
            let category_id = str_param(params, "categoryId")?;
            let a = app.lock().await;
            let snapshot = a.controller.snapshot();
            links_json(&link_query::links_in_category(&snapshot, &a.locks, category_id))
        }

        // ─── Links ───
        "link.add" => {
            let draft: LinkDraft = serde_json::from_value(params.clone())
                .map_err(|e| format!("invalid link: {}", e))?;
            let mut a = app.lock().await;
            let id = a.controller.add_link(draft).map_err(|e| e.to_string())?;
            Ok(json!({"id": id}))
        }
        "link.update" => {
            let id = str_param(params, "id")?;
            let patch: LinkPatch = param(params, "patch")?;
            let mut a = app.lock().await;
            a.controller.edit_link(id, &patch).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "link.delete" => {
            let id = str_param(params, "id")?;
            let mut a = app.lock().await;
            a.controller.delete_link(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "link.pin" => {
            let id = str_param(params, "id")?;
            let mut a = app.lock().await;
            a.controller.toggle_pin(id).map_err(|e| e.to_string())?;
            let pinned = a
                .controller
                .snapshot()
                .find_link(id)
                .map(|l| l.pinned)
                .unwrap_or(false);
            Ok(json!({"ok": true, "pinned": pinned}))
        }
        "link.reorder" => {
            let source = str_param(params, "sourceId")?;
            let target = str_param(params, "targetId")?;
            let mut a = app.lock().await;
            a.controller
                .reorder_link(source, target)
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Categories ───
        "category.add" => {
            let name = str_param(params, "name")?;
            let icon = params.get("icon").and_then(|v| v.as_str()).unwrap_or("Folder");
            let password: Option<String> = opt_param(params, "password")?;
            let mut a = app.lock().await;
            let id = a
                .controller
                .add_category(name, icon, password)
                .map_err(|e| e.to_string())?;
            Ok(json!({"id": id}))
        }
        "category.update" => {
            let categories: Vec<Category> = param(params, "categories")?;
            let links: Option<Vec<LinkItem>> = opt_param(params, "links")?;
            let mut a = app.lock().await;
            let current = a.controller.snapshot();
            let links = links.map(|links| carry_locked_links(links, &current, &a.locks));
            let categories = carry_passwords(categories, &current.categories);
            a.controller
                .update_categories(categories, links)
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "category.delete" => {
            let id = str_param(params, "id")?;
            let mut a = app.lock().await;
            a.controller.delete_category(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "category.unlock" => {
            let id = str_param(params, "id")?;
            let password = str_param(params, "password")?;
            let mut guard = app.lock().await;
            let a = &mut *guard;
            let snapshot = a.controller.snapshot();
            a.locks
                .unlock_by_id(&snapshot.categories, id, password)
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "category.relock" => {
            let mut a = app.lock().await;
            a.locks.relock_all();
            Ok(json!({"ok": true}))
        }

        // ─── Settings & import ───
        "settings.update" => {
            let settings: SiteSettings = param(params, "settings")?;
            let mut a = app.lock().await;
            a.controller
                .update_settings(settings)
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "import.merge" => {
            let links: Vec<LinkItem> = opt_param(params, "links")?.unwrap_or_default();
            let categories: Vec<Category> = opt_param(params, "categories")?.unwrap_or_default();
            let mut a = app.lock().await;
            let report = a
                .controller
                .import(links, categories)
                .map_err(|e| e.to_string())?;
            to_json(&report)
        }

        // ─── Auth & sync ───
        "auth.login" => {
            let password = str_param(params, "password")?;
            let mut a = app.lock().await;
            a.controller.login(password).await.map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "auth.logout" => {
            let mut a = app.lock().await;
            a.controller.logout();
            Ok(json!({"ok": true}))
        }
        "auth.status" => {
            let a = app.lock().await;
            Ok(json!({
                "authenticated": a.controller.is_authenticated(),
                "promptPending": a.controller.auth_prompt_pending(),
            }))
        }
        "auth.dismiss" => {
            let a = app.lock().await;
            a.controller.dismiss_auth_prompt();
            Ok(json!({"ok": true}))
        }
        "sync.status" => {
            let a = app.lock().await;
            Ok(json!({
                "status": to_json(&a.controller.status())?,
                "confirmedSeq": a.controller.confirmed_seq(),
            }))
        }

        // ─── Integrations ───
        "webdav.config.get" => {
            let a = app.lock().await;
            let mut config = a.controller.cache().load_webdav_config();
            if !config.password.is_empty() {
                config.password = MASK.to_string();
            }
            to_json(&config)
        }
        "webdav.config.set" => {
            let mut config: WebDavConfig = param(params, "config")?;
            let a = app.lock().await;
            if config.password == MASK {
                config.password = a.controller.cache().load_webdav_config().password;
            }
            a.controller
                .cache()
                .save_webdav_config(&config)
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "ai.config.get" => {
            let a = app.lock().await;
            let mut config = a.controller.cache().load_ai_config();
            if !config.api_key.is_empty() {
                config.api_key = MASK.to_string();
            }
            to_json(&config)
        }
        "ai.config.set" => {
            let mut config: AiConfig = param(params, "config")?;
            let a = app.lock().await;
            if config.api_key == MASK {
                config.api_key = a.controller.cache().load_ai_config().api_key;
            }
            a.controller
                .cache()
                .save_ai_config(&config)
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "backup.push" => {
            let a = app.lock().await;
            a.controller
                .ensure_authorized(true)
                .map_err(|e| e.to_string())?;
            let config = a.controller.cache().load_webdav_config();
            let snapshot = a.controller.snapshot();
            a.backup
                .backup(&config, &snapshot.links, &snapshot.categories)
                .await
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": true, "links": snapshot.links.len()}))
        }
        "backup.restore" => {
            let mut a = app.lock().await;
            a.controller
                .ensure_authorized(true)
                .map_err(|e| e.to_string())?;
            let config = a.controller.cache().load_webdav_config();
            let file = a.backup.restore(&config).await.map_err(|e| e.to_string())?;
            let restored = file.links.len();
            a.controller
                .restore_backup(file.links, file.categories)
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": true, "links": restored}))
        }
        "ai.fill_descriptions" => fill_descriptions(app).await,
        "ai.cancel_fill" => {
            let a = app.lock().await;
            a.fill_cancel.store(true, Ordering::SeqCst);
            Ok(json!({"ok": true}))
        }
        "deeplink.parse" => {
            let query = str_param(params, "query")?;
            let a = app.lock().await;
            match deep_link::parse_add_link(query, &a.config.fallback_category_id) {
                Some(draft) => to_json(&draft),
                None => Ok(Value::Null),
            }
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
