//! The upstream collaborator: the remote endpoints the client is built on.

use async_trait::async_trait;

use crate::error::ZepResult;
use crate::types::{
    ApiEdge, ApiNode, EpisodeResponse, GraphSearchQuery, GraphSearchResults, NewMessage,
    ThreadContextResponse, ThreadQuery, ThreadResponse,
};

/// Raw access to the Zep Cloud API.
///
/// Implementations report duplicate creates as
/// [`ZepError::AlreadyExists`](crate::ZepError::AlreadyExists) so callers can
/// tell them apart from real provisioning failures.
#[async_trait]
pub trait ZepApi: Send + Sync {
    /// Register a user.
    async fn create_user(&self, user_id: &str) -> ZepResult<()>;

    /// Open a thread owned by `user_id`.
    async fn create_thread(&self, thread_id: &str, user_id: &str) -> ZepResult<()>;

    /// Append messages to a thread, in order.
    async fn add_messages(&self, thread_id: &str, messages: Vec<NewMessage>) -> ZepResult<()>;

    /// Read messages from a thread.
    async fn get_thread(&self, thread_id: &str, query: ThreadQuery) -> ZepResult<ThreadResponse>;

    /// Context assembled from the user's other threads.
    async fn get_user_context(
        &self,
        thread_id: &str,
        mode: &str,
    ) -> ZepResult<ThreadContextResponse>;

    /// Semantic search over a user's graph.
    async fn search_graph(&self, query: GraphSearchQuery) -> ZepResult<GraphSearchResults>;

    /// List a user's entity nodes.
    async fn nodes_by_user(&self, user_id: &str, limit: u32) -> ZepResult<Vec<ApiNode>>;

    /// List a user's edges.
    async fn edges_by_user(&self, user_id: &str, limit: u32) -> ZepResult<Vec<ApiEdge>>;

    /// Fetch one node.
    async fn get_node(&self, uuid: &str) -> ZepResult<ApiNode>;

    /// Edges touching a node.
    async fn node_edges(&self, uuid: &str) -> ZepResult<Vec<ApiEdge>>;

    /// Episodes that mention a node.
    async fn node_episodes(&self, uuid: &str) -> ZepResult<EpisodeResponse>;
}
