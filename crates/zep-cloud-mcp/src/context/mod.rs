//! Process-wide server context: the Zep client, or why there isn't one.

use std::sync::Arc;

use zep_cloud::{HttpZepApi, InMemoryZepApi, ZepApi, ZepClient, ZepError};

use crate::config::ServerConfig;
use crate::types::{McpError, McpResult};

/// Built once at startup and shared by every request.
///
/// A failed client construction does not stop the server: the context keeps
/// the failure and every tool call reports it.
pub struct ServerContext {
    client: Result<Arc<ZepClient>, String>,
}

impl ServerContext {
    /// A context backed by a ready client.
    pub fn ready(client: Arc<ZepClient>) -> Self {
        Self { client: Ok(client) }
    }

    /// A context whose client could not be built.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            client: Err(reason.into()),
        }
    }

    /// A context backed by `api` with options from `config`.
    pub fn with_api(api: Arc<dyn ZepApi>, config: &ServerConfig) -> Self {
        Self::ready(Arc::new(ZepClient::new(api, config.client_options())))
    }

    /// Build the HTTP client described by `config`.
    pub fn from_config(config: &ServerConfig) -> Self {
        let built = config
            .api_key()
            .ok_or(ZepError::MissingApiKey)
            .and_then(|key| HttpZepApi::new(key, &config.base_url, config.timeout()));

        match built {
            Ok(api) => {
                tracing::info!(
                    "Zep Cloud client ready (user {}, {})",
                    config.user_id,
                    config.base_url
                );
                Self::with_api(Arc::new(api), config)
            }
            Err(e) => {
                tracing::error!("Failed to initialize Zep Cloud client: {e}");
                Self::unavailable(e.to_string())
            }
        }
    }

    /// A context backed by the in-process upstream.
    pub fn offline(config: &ServerConfig) -> Self {
        tracing::warn!("Running against the in-process upstream; nothing is sent to Zep Cloud");
        Self::with_api(Arc::new(InMemoryZepApi::new()), config)
    }

    /// The client, or the startup failure as an error.
    pub fn client(&self) -> McpResult<&Arc<ZepClient>> {
        self.client
            .as_ref()
            .map_err(|reason| McpError::ClientUnavailable(reason.clone()))
    }

    pub fn is_ready(&self) -> bool {
        self.client.is_ok()
    }
}
