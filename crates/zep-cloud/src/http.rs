//! HTTP implementation of [`ZepApi`] on top of `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::api::ZepApi;
use crate::error::{ZepError, ZepResult};
use crate::types::{
    ApiEdge, ApiNode, EpisodeResponse, GraphSearchQuery, GraphSearchResults, NewMessage,
    ThreadContextResponse, ThreadQuery, ThreadResponse,
};

/// Zep Cloud REST root.
pub const DEFAULT_BASE_URL: &str = "https://api.getzep.com/api/v2";

/// Deadline applied to every request unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Talks to Zep Cloud over HTTPS.
pub struct HttpZepApi {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl HttpZepApi {
    /// Build a client for `base_url` authenticating with `api_key`.
    pub fn new(api_key: impl Into<String>, base_url: &str, timeout: Duration) -> ZepResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ZepError::MissingApiKey);
        }

        let base_url = Url::parse(base_url)
            .map_err(|e| ZepError::InvalidInput(format!("Invalid base URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ZepError::InvalidInput(format!(
                "Base URL {base_url} cannot carry a path"
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("zep-cloud-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ZepError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    /// Base URL with `segments` appended, each percent-encoded.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn execute(&self, request: RequestBuilder) -> ZepResult<Vec<u8>> {
        let request = request
            .header(AUTHORIZATION, format!("Api-Key {}", self.api_key))
            .build()
            .map_err(|e| ZepError::Transport(e.to_string()))?;
        let target = format!("{} {}", request.method(), request.url().path());

        log::debug!("Zep request: {target}");

        let response = self.http.execute(request).await.map_err(|e| {
            if e.is_timeout() {
                ZepError::Timeout(target.clone())
            } else {
                ZepError::Transport(format!("{target}: {e}"))
            }
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                ZepError::Timeout(target.clone())
            } else {
                ZepError::Transport(format!("{target}: {e}"))
            }
        })?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            log::debug!("Zep request {target} failed with {status}");
            return Err(ZepError::from_status(status.as_u16(), &text));
        }

        Ok(body.to_vec())
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> ZepResult<T> {
        let body = self.execute(request).await?;
        serde_json::from_slice(&body).map_err(|e| ZepError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ZepApi for HttpZepApi {
    async fn create_user(&self, user_id: &str) -> ZepResult<()> {
        let url = self.url(&["users"]);
        self.execute(self.http.post(url).json(&json!({ "user_id": user_id })))
            .await
            .map(drop)
    }

    async fn create_thread(&self, thread_id: &str, user_id: &str) -> ZepResult<()> {
        let url = self.url(&["threads"]);
        let body = json!({ "thread_id": thread_id, "user_id": user_id });
        self.execute(self.http.post(url).json(&body)).await.map(drop)
    }

    async fn add_messages(&self, thread_id: &str, messages: Vec<NewMessage>) -> ZepResult<()> {
        let url = self.url(&["threads", thread_id, "messages"]);
        let body = json!({ "messages": messages });
        self.execute(self.http.post(url).json(&body)).await.map(drop)
    }

    async fn get_thread(&self, thread_id: &str, query: ThreadQuery) -> ZepResult<ThreadResponse> {
        let url = self.url(&["threads", thread_id, "messages"]);
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(lastn) = query.lastn {
            params.push(("lastn", lastn.to_string()));
        }
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(cursor) = query.cursor {
            params.push(("cursor", cursor.to_string()));
        }
        self.fetch(self.http.get(url).query(&params)).await
    }

    async fn get_user_context(
        &self,
        thread_id: &str,
        mode: &str,
    ) -> ZepResult<ThreadContextResponse> {
        let url = self.url(&["threads", thread_id, "context"]);
        self.fetch(self.http.get(url).query(&[("mode", mode)])).await
    }

    async fn search_graph(&self, query: GraphSearchQuery) -> ZepResult<GraphSearchResults> {
        let url = self.url(&["graph", "search"]);
        self.fetch(self.http.post(url).json(&query)).await
    }

    async fn nodes_by_user(&self, user_id: &str, limit: u32) -> ZepResult<Vec<ApiNode>> {
        let url = self.url(&["graph", "node", "user", user_id]);
        let nodes: Option<Vec<ApiNode>> = self
            .fetch(self.http.post(url).json(&json!({ "limit": limit })))
            .await?;
        Ok(nodes.unwrap_or_default())
    }

    async fn edges_by_user(&self, user_id: &str, limit: u32) -> ZepResult<Vec<ApiEdge>> {
        let url = self.url(&["graph", "edge", "user", user_id]);
        let edges: Option<Vec<ApiEdge>> = self
            .fetch(self.http.post(url).json(&json!({ "limit": limit })))
            .await?;
        Ok(edges.unwrap_or_default())
    }

    async fn get_node(&self, uuid: &str) -> ZepResult<ApiNode> {
        let url = self.url(&["graph", "node", uuid]);
        self.fetch(self.http.get(url)).await
    }

    async fn node_edges(&self, uuid: &str) -> ZepResult<Vec<ApiEdge>> {
        let url = self.url(&["graph", "node", uuid, "entity-edges"]);
        let edges: Option<Vec<ApiEdge>> = self.fetch(self.http.get(url)).await?;
        Ok(edges.unwrap_or_default())
    }

    async fn node_episodes(&self, uuid: &str) -> ZepResult<EpisodeResponse> {
        let url = self.url(&["graph", "node", uuid, "episodes"]);
        self.fetch(self.http.get(url)).await
    }
}
