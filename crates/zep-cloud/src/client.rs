//! The memory/graph client: typed operations over a [`ZepApi`] with identity
//! bootstrap and response normalization.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::{OnceCell, RwLock};

use crate::api::ZepApi;
use crate::error::ZepResult;
use crate::normalize::{
    edge_from, episode_from, message_from, node_from, normalize_all, EdgeListResult,
    GraphSearchResult, MemoryResult, NodeDetails, NodeListResult, StoreMemoryResult,
    ThreadContextResult,
};
use crate::types::{GraphSearchQuery, NewMessage, Role, ThreadQuery};

/// User every operation is scoped to unless configured otherwise.
pub const DEFAULT_USER_ID: &str = "default_user";

/// Default number of search hits.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Default page size for node and edge listings.
pub const DEFAULT_LIST_LIMIT: u32 = 50;

/// Default thread context mode.
pub const DEFAULT_CONTEXT_MODE: &str = "summary";

/// Client construction options.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Owner of every thread and graph this client touches.
    pub user_id: String,
    /// Propagate provisioning failures other than "already exists".
    pub strict_provisioning: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID.to_string(),
            strict_provisioning: false,
        }
    }
}

/// Typed access to Zep thread memory and the user's knowledge graph.
///
/// The user is provisioned lazily on first use and each thread before its
/// first thread-scoped operation. Provisioning is idempotent by toleration:
/// a duplicate create counts as success. Provisioned identities are cached
/// so later calls skip the create round-trip.
pub struct ZepClient {
    api: Arc<dyn ZepApi>,
    options: ClientOptions,
    user_ready: OnceCell<()>,
    threads: RwLock<HashSet<String>>,
}

impl ZepClient {
    pub fn new(api: Arc<dyn ZepApi>, options: ClientOptions) -> Self {
        Self {
            api,
            options,
            user_ready: OnceCell::new(),
            threads: RwLock::new(HashSet::new()),
        }
    }

    /// The user this client is scoped to.
    pub fn user_id(&self) -> &str {
        &self.options.user_id
    }

    /// Decide whether a provisioning outcome counts as provisioned.
    ///
    /// Returns `Ok(true)` when the identity exists, `Ok(false)` when a
    /// failure was tolerated, `Err` when strict mode rejects it.
    fn settle(&self, what: &str, outcome: ZepResult<()>) -> ZepResult<bool> {
        match outcome {
            Ok(()) => {
                log::info!("Created {what}");
                Ok(true)
            }
            Err(e) if e.is_already_exists() => {
                log::debug!("{what} already exists");
                Ok(true)
            }
            Err(e) if self.options.strict_provisioning => Err(e),
            Err(e) => {
                log::warn!("Could not provision {what}, continuing: {e}");
                Ok(false)
            }
        }
    }

    /// Make sure the configured user exists.
    pub async fn ensure_user(&self) -> ZepResult<()> {
        if self.user_ready.initialized() {
            return Ok(());
        }

        let what = format!("user {}", self.options.user_id);
        let outcome = self.api.create_user(&self.options.user_id).await;
        // Tolerated failures stay uncached so the next call retries.
        if self.settle(&what, outcome)? {
            let _ = self.user_ready.set(());
        }
        Ok(())
    }

    /// Make sure `thread_id` exists and belongs to the configured user.
    pub async fn ensure_thread(&self, thread_id: &str) -> ZepResult<()> {
        if self.threads.read().await.contains(thread_id) {
            return Ok(());
        }
        self.ensure_user().await?;

        let what = format!("thread {thread_id}");
        let outcome = self
            .api
            .create_thread(thread_id, &self.options.user_id)
            .await;
        if self.settle(&what, outcome)? {
            self.threads.write().await.insert(thread_id.to_string());
        }
        Ok(())
    }

    /// Append one message to a thread, creating the thread if needed.
    pub async fn store_memory(
        &self,
        thread_id: &str,
        content: &str,
        role: Role,
        metadata: Option<Map<String, Value>>,
    ) -> ZepResult<StoreMemoryResult> {
        self.ensure_thread(thread_id).await?;

        let message = NewMessage {
            content: content.to_string(),
            role,
            metadata,
        };
        self.api.add_messages(thread_id, vec![message]).await?;

        Ok(StoreMemoryResult {
            success: true,
            thread_id: thread_id.to_string(),
            role: role.as_str().to_string(),
            content_length: content.chars().count(),
        })
    }

    /// Read messages from a thread. Only the supplied paging options are sent.
    pub async fn get_memory(&self, thread_id: &str, query: ThreadQuery) -> ZepResult<MemoryResult> {
        let response = self.api.get_thread(thread_id, query).await?;
        let messages = normalize_all(response.messages.as_deref(), message_from);
        Ok(MemoryResult::new(thread_id.to_string(), messages))
    }

    /// Context drawn from the user's other threads.
    pub async fn get_thread_context(
        &self,
        thread_id: &str,
        mode: &str,
    ) -> ZepResult<ThreadContextResult> {
        self.ensure_thread(thread_id).await?;
        let response = self.api.get_user_context(thread_id, mode).await?;
        Ok(ThreadContextResult {
            thread_id: thread_id.to_string(),
            mode: mode.to_string(),
            context: response.context,
        })
    }

    /// Semantic search over the user's graph.
    pub async fn search_graph(&self, query: &str, limit: u32) -> ZepResult<GraphSearchResult> {
        self.ensure_user().await?;
        let results = self
            .api
            .search_graph(GraphSearchQuery {
                query: query.to_string(),
                user_id: self.options.user_id.clone(),
                limit,
            })
            .await?;

        let edges = normalize_all(results.edges.as_deref(), edge_from);
        let nodes = normalize_all(results.nodes.as_deref(), node_from);
        Ok(GraphSearchResult {
            query: query.to_string(),
            edge_count: edges.len(),
            node_count: nodes.len(),
            edges,
            nodes,
        })
    }

    /// List the user's entity nodes.
    pub async fn get_graph_nodes(&self, limit: u32) -> ZepResult<NodeListResult> {
        self.ensure_user().await?;
        let nodes = self.api.nodes_by_user(&self.options.user_id, limit).await?;
        let nodes: Vec<_> = nodes.iter().map(node_from).collect();
        Ok(NodeListResult {
            node_count: nodes.len(),
            nodes,
        })
    }

    /// List the user's edges.
    pub async fn get_graph_edges(&self, limit: u32) -> ZepResult<EdgeListResult> {
        self.ensure_user().await?;
        let edges = self.api.edges_by_user(&self.options.user_id, limit).await?;
        let edges: Vec<_> = edges.iter().map(edge_from).collect();
        Ok(EdgeListResult {
            edge_count: edges.len(),
            edges,
        })
    }

    /// A node with its edges and episodes.
    ///
    /// The three fetches run in order (node, edges, episodes) and the first
    /// failure fails the whole call; no partial result is returned.
    pub async fn get_node_details(&self, node_uuid: &str) -> ZepResult<NodeDetails> {
        let node = self.api.get_node(node_uuid).await?;
        let edges = self.api.node_edges(node_uuid).await?;
        let episodes = self.api.node_episodes(node_uuid).await?;

        let edges: Vec<_> = edges.iter().map(edge_from).collect();
        let episodes = normalize_all(episodes.episodes.as_deref(), episode_from);
        Ok(NodeDetails {
            node: node_from(&node),
            edge_count: edges.len(),
            edges,
            episode_count: episodes.len(),
            episodes,
        })
    }
}
