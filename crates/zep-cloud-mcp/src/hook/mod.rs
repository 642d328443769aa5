//! Post-tool-use hook that mirrors memory notes into a Zep thread.
//!
//! The hook host pipes a JSON payload describing a file write on stdin. When
//! the write touched a Markdown note under a `memory/` directory, the file's
//! content is stored as a `system` message. The hook must never block its
//! host, so every outcome, including failure, is reported rather than raised.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Map};

use zep_cloud::{
    ClientOptions, HttpZepApi, Role, StoreMemoryResult, ZepApi, ZepClient, ZepResult,
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT,
};

use crate::config::loader::{ENV_API_KEY, ENV_BASE_URL, ENV_USER_ID};

/// Tools whose writes are mirrored.
const SYNCED_TOOLS: [&str; 2] = ["Write", "Edit"];

/// Hook payload, reduced to the fields the hook reads.
#[derive(Debug, Default, Deserialize)]
pub struct HookPayload {
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: Option<ToolInput>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ToolInput {
    #[serde(default)]
    pub file_path: Option<String>,
}

/// What the hook did.
#[derive(Debug, PartialEq)]
pub enum HookOutcome {
    /// Nothing to do, with the reason.
    Skipped(String),
    /// The file was stored.
    Synced(StoreMemoryResult),
    /// Something went wrong; reported on stderr by the caller.
    Failed(String),
}

/// Credentials the hook needs, read from the environment.
#[derive(Debug, Clone, Default)]
pub struct HookSettings {
    pub api_key: Option<String>,
    pub user_id: Option<String>,
    pub base_url: Option<String>,
}

impl HookSettings {
    pub fn from_env() -> Self {
        let get = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            api_key: get(ENV_API_KEY),
            user_id: get(ENV_USER_ID),
            base_url: get(ENV_BASE_URL),
        }
    }
}

/// Whether `path` looks like `<anything>/memory/<anything>.md`.
pub fn is_memory_note(path: &str) -> bool {
    const DIR: &str = "/memory/";
    path.ends_with(".md")
        && path
            .match_indices(DIR)
            .any(|(i, _)| path.len() >= i + DIR.len() + ".md".len())
}

/// Thread that collects a user's mirrored notes.
pub fn sync_thread_id(user_id: &str) -> String {
    format!("claude_code_memory_{user_id}")
}

/// Pick the file to mirror out of a raw payload, or explain why not.
pub fn select_file(raw: &str) -> Result<String, HookOutcome> {
    let payload: HookPayload = serde_json::from_str(raw)
        .map_err(|e| HookOutcome::Failed(format!("failed to parse stdin: {e}")))?;

    if !SYNCED_TOOLS.contains(&payload.tool_name.as_str()) {
        return Err(HookOutcome::Skipped(format!(
            "tool '{}' is not a file write",
            payload.tool_name
        )));
    }

    let path = payload
        .tool_input
        .and_then(|input| input.file_path)
        .unwrap_or_default();
    if !is_memory_note(&path) {
        return Err(HookOutcome::Skipped(format!("{path} is not a memory note")));
    }
    Ok(path)
}

/// Store the note at `path` for `user_id` through `api`.
pub async fn sync_note(api: Arc<dyn ZepApi>, user_id: &str, path: &str) -> HookOutcome {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => return HookOutcome::Failed(format!("could not read {path}: {e}")),
    };
    if content.trim().is_empty() {
        return HookOutcome::Skipped(format!("{path} is empty"));
    }

    let client = ZepClient::new(
        api,
        ClientOptions {
            user_id: user_id.to_string(),
            strict_provisioning: false,
        },
    );
    match store_note(&client, path, &content).await {
        Ok(result) => HookOutcome::Synced(result),
        Err(e) => HookOutcome::Failed(format!("error syncing to Zep: {e}")),
    }
}

async fn store_note(client: &ZepClient, path: &str, content: &str) -> ZepResult<StoreMemoryResult> {
    let mut metadata = Map::new();
    metadata.insert("source_file".to_string(), json!(path));
    metadata.insert(
        "synced_at".to_string(),
        json!(chrono::Utc::now().to_rfc3339()),
    );
    if let Some(name) = Path::new(path).file_name().and_then(|n| n.to_str()) {
        metadata.insert("note".to_string(), json!(name));
    }

    let thread_id = sync_thread_id(client.user_id());
    client
        .store_memory(&thread_id, content, Role::System, Some(metadata))
        .await
}

/// Full hook run against the hosted API.
pub async fn run(raw: &str, settings: HookSettings) -> HookOutcome {
    let path = match select_file(raw) {
        Ok(path) => path,
        Err(outcome) => return outcome,
    };

    let (Some(api_key), Some(user_id)) = (settings.api_key, settings.user_id) else {
        return HookOutcome::Skipped(format!("{ENV_API_KEY} or {ENV_USER_ID} not set"));
    };

    let base_url = settings
        .base_url
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    match HttpZepApi::new(api_key, &base_url, DEFAULT_TIMEOUT) {
        Ok(api) => sync_note(Arc::new(api), &user_id, &path).await,
        Err(e) => HookOutcome::Failed(e.to_string()),
    }
}
