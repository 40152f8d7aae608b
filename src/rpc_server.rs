//! CloudNav RPC Server: JSON-RPC over stdin/stdout for a dashboard front end.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"link.add", "params":{"title":"...","url":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! Environment: `CLOUDNAV_CONFIG` points at the config file,
//! `CLOUDNAV_DATA_DIR` at the directory holding `cloudnav.db`, and
//! `RUST_LOG` controls logging (written to stderr).

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;

use cloudnav::app::App;
use cloudnav::platform;
use cloudnav::rpc_handler::handle_method;
use cloudnav::services::config_loader::{ConfigLoader, ConfigLoaderTrait};

use log::{error, info, warn};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

/// Methods that wait on outside services for a long time. They run on
/// their own task so the loop keeps answering, e.g. `ai.cancel_fill`.
const BACKGROUND_METHODS: &[&str] = &["ai.fill_descriptions"];

async fn respond(app: &Mutex<App>, id: Value, method: &str, params: &Value) -> Value {
    match handle_method(app, method, params).await {
        Ok(val) => json!({"id": id, "result": val}),
        Err(err) => json!({"id": id, "error": err}),
    }
}

fn emit(value: &Value) {
    let mut stdout = io::stdout().lock();
    if writeln!(stdout, "{}", value).and_then(|_| stdout.flush()).is_err() {
        error!("failed to write response to stdout");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let mut loader = ConfigLoader::new(None);
    let config = match loader.load() {
        Ok(config) => config,
        Err(e) => {
            warn!("ignoring unreadable config {}: {}", loader.get_config_path(), e);
            Default::default()
        }
    };

    let db_path = platform::get_database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db_path = db_path.to_string_lossy().to_string();
    info!("using database {}", db_path);

    let mut app = App::new(config, &db_path)?;
    app.startup().await;
    let app = Arc::new(Mutex::new(app));

    emit(&json!({"event":"ready","version":env!("CARGO_PKG_VERSION")}));

    // Max 200 RPC requests per second.
    let mut rate_limiter = RateLimiter::new(200);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                emit(&json!({"id":null,"error":format!("parse error: {}", e)}));
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            emit(&json!({"id": id, "error": "rate limit exceeded"}));
            continue;
        }

        let method = req
            .get("method")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let params = req.get("params").cloned().unwrap_or(json!({}));

        if BACKGROUND_METHODS.contains(&method.as_str()) {
            let app = Arc::clone(&app);
            tokio::spawn(async move {
                emit(&respond(&app, id, &method, &params).await);
            });
            continue;
        }
        emit(&respond(&app, id, &method, &params).await);
    }

    info!("stdin closed, shutting down");
    Ok(())
}
