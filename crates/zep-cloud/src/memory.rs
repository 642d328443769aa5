//! In-process implementation of [`ZepApi`].
//!
//! Keeps users, threads and a small knowledge graph in memory. Used for
//! offline runs and for exercising the client and server without network
//! access. Failures can be injected per operation with
//! [`InMemoryZepApi::fail_next`].

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::api::ZepApi;
use crate::error::{ZepError, ZepResult};
use crate::types::{
    ApiEdge, ApiEpisode, ApiMessage, ApiNode, EpisodeResponse, GraphSearchQuery,
    GraphSearchResults, NewMessage, ThreadContextResponse, ThreadQuery, ThreadResponse,
};

/// Upstream operations, used for call accounting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateUser,
    CreateThread,
    AddMessages,
    GetThread,
    GetUserContext,
    SearchGraph,
    NodesByUser,
    EdgesByUser,
    GetNode,
    NodeEdges,
    NodeEpisodes,
}

#[derive(Debug)]
struct Thread {
    user_id: String,
    messages: Vec<ApiMessage>,
}

#[derive(Debug)]
struct Owned<T> {
    user_id: String,
    item: T,
}

#[derive(Debug, Default)]
struct State {
    users: HashSet<String>,
    threads: HashMap<String, Thread>,
    nodes: Vec<Owned<ApiNode>>,
    edges: Vec<Owned<ApiEdge>>,
    episodes: HashMap<String, Vec<ApiEpisode>>,
    failures: HashMap<Operation, ZepError>,
    calls: HashMap<Operation, usize>,
}

/// A process-local Zep stand-in.
#[derive(Debug, Default)]
pub struct InMemoryZepApi {
    state: RwLock<State>,
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn now() -> Value {
    Value::String(chrono::Utc::now().to_rfc3339())
}

/// Fraction of query terms found in `text`.
fn term_score(terms: &[String], text: &str) -> f64 {
    if terms.is_empty() {
        return 0.0;
    }
    let text = text.to_lowercase();
    let hits = terms.iter().filter(|t| text.contains(t.as_str())).count();
    hits as f64 / terms.len() as f64
}

impl InMemoryZepApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call to `op` fail with `error`.
    pub async fn fail_next(&self, op: Operation, error: ZepError) {
        self.state.write().await.failures.insert(op, error);
    }

    /// How many times `op` has been invoked.
    pub async fn call_count(&self, op: Operation) -> usize {
        self.state.read().await.calls.get(&op).copied().unwrap_or(0)
    }

    /// Whether a user has been registered.
    pub async fn has_user(&self, user_id: &str) -> bool {
        self.state.read().await.users.contains(user_id)
    }

    /// Whether a thread exists.
    pub async fn has_thread(&self, thread_id: &str) -> bool {
        self.state.read().await.threads.contains_key(thread_id)
    }

    /// Seed an entity node into `user_id`'s graph. Returns its uuid.
    pub async fn add_node(
        &self,
        user_id: &str,
        name: &str,
        labels: &[&str],
        summary: Option<&str>,
    ) -> String {
        let uuid = new_id();
        let node = ApiNode {
            uuid_: Some(uuid.clone()),
            name: Some(name.to_string()),
            labels: Some(labels.iter().map(|l| l.to_string()).collect()),
            summary: summary.map(str::to_string),
            attributes: Some(serde_json::Map::new()),
            created_at: Some(now()),
            ..ApiNode::default()
        };
        self.state.write().await.nodes.push(Owned {
            user_id: user_id.to_string(),
            item: node,
        });
        uuid
    }

    /// Seed a fact from `source` to `target`. Returns its uuid.
    pub async fn add_edge(
        &self,
        user_id: &str,
        source: &str,
        target: &str,
        name: &str,
        fact: &str,
    ) -> String {
        let uuid = new_id();
        let edge = ApiEdge {
            uuid_: Some(uuid.clone()),
            fact: Some(fact.to_string()),
            name: Some(name.to_string()),
            source_node_uuid: Some(source.to_string()),
            target_node_uuid: Some(target.to_string()),
            created_at: Some(now()),
            ..ApiEdge::default()
        };
        self.state.write().await.edges.push(Owned {
            user_id: user_id.to_string(),
            item: edge,
        });
        uuid
    }

    /// Record an episode that mentions `node_uuid`. Returns its uuid.
    pub async fn add_episode(&self, node_uuid: &str, content: &str) -> String {
        let uuid = new_id();
        let episode = ApiEpisode {
            uuid_: Some(uuid.clone()),
            content: Some(content.to_string()),
            created_at: Some(now()),
            ..ApiEpisode::default()
        };
        self.state
            .write()
            .await
            .episodes
            .entry(node_uuid.to_string())
            .or_default()
            .push(episode);
        uuid
    }

    async fn enter(&self, op: Operation) -> ZepResult<()> {
        let mut state = self.state.write().await;
        *state.calls.entry(op).or_insert(0) += 1;
        match state.failures.remove(&op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ZepApi for InMemoryZepApi {
    async fn create_user(&self, user_id: &str) -> ZepResult<()> {
        self.enter(Operation::CreateUser).await?;
        let mut state = self.state.write().await;
        if !state.users.insert(user_id.to_string()) {
            return Err(ZepError::AlreadyExists(format!("user {user_id}")));
        }
        Ok(())
    }

    async fn create_thread(&self, thread_id: &str, user_id: &str) -> ZepResult<()> {
        self.enter(Operation::CreateThread).await?;
        let mut state = self.state.write().await;
        if !state.users.contains(user_id) {
            return Err(ZepError::NotFound(format!("user {user_id}")));
        }
        if state.threads.contains_key(thread_id) {
            return Err(ZepError::AlreadyExists(format!("thread {thread_id}")));
        }
        state.threads.insert(
            thread_id.to_string(),
            Thread {
                user_id: user_id.to_string(),
                messages: Vec::new(),
            },
        );
        Ok(())
    }

    async fn add_messages(&self, thread_id: &str, messages: Vec<NewMessage>) -> ZepResult<()> {
        self.enter(Operation::AddMessages).await?;
        let mut state = self.state.write().await;
        let thread = state
            .threads
            .get_mut(thread_id)
            .ok_or_else(|| ZepError::NotFound(format!("thread {thread_id}")))?;
        for msg in messages {
            thread.messages.push(ApiMessage {
                uuid_: Some(new_id()),
                role: Some(msg.role.as_str().to_string()),
                content: Some(msg.content),
                metadata: msg.metadata,
                created_at: Some(now()),
                ..ApiMessage::default()
            });
        }
        Ok(())
    }

    async fn get_thread(&self, thread_id: &str, query: ThreadQuery) -> ZepResult<ThreadResponse> {
        self.enter(Operation::GetThread).await?;
        let state = self.state.read().await;
        let thread = state
            .threads
            .get(thread_id)
            .ok_or_else(|| ZepError::NotFound(format!("thread {thread_id}")))?;

        let all = &thread.messages;
        let selected: Vec<ApiMessage> = match query.lastn {
            Some(n) => {
                let start = all.len().saturating_sub(n as usize);
                all[start..].to_vec()
            }
            None => {
                let skip = query.cursor.unwrap_or(0) as usize;
                let take = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);
                all.iter().skip(skip).take(take).cloned().collect()
            }
        };

        Ok(ThreadResponse {
            messages: Some(selected),
        })
    }

    async fn get_user_context(
        &self,
        thread_id: &str,
        mode: &str,
    ) -> ZepResult<ThreadContextResponse> {
        self.enter(Operation::GetUserContext).await?;
        let state = self.state.read().await;
        let thread = state
            .threads
            .get(thread_id)
            .ok_or_else(|| ZepError::NotFound(format!("thread {thread_id}")))?;

        let facts: Vec<&str> = state
            .edges
            .iter()
            .filter(|e| e.user_id == thread.user_id)
            .filter_map(|e| e.item.fact.as_deref())
            .collect();
        if facts.is_empty() {
            return Ok(ThreadContextResponse { context: None });
        }

        let lines: Vec<String> = facts.iter().map(|f| format!("- {f}")).collect();
        let context = match mode {
            "basic" => lines.join("\n"),
            _ => format!("Known facts about this user:\n{}", lines.join("\n")),
        };
        Ok(ThreadContextResponse {
            context: Some(context),
        })
    }

    async fn search_graph(&self, query: GraphSearchQuery) -> ZepResult<GraphSearchResults> {
        self.enter(Operation::SearchGraph).await?;
        let state = self.state.read().await;
        let terms: Vec<String> = query
            .query
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        let limit = query.limit as usize;

        let mut edges: Vec<ApiEdge> = state
            .edges
            .iter()
            .filter(|e| e.user_id == query.user_id)
            .filter_map(|e| {
                let text = format!(
                    "{} {}",
                    e.item.fact.as_deref().unwrap_or_default(),
                    e.item.name.as_deref().unwrap_or_default()
                );
                let score = term_score(&terms, &text);
                (score > 0.0).then(|| ApiEdge {
                    score: Some(score),
                    ..e.item.clone()
                })
            })
            .collect();
        edges.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        edges.truncate(limit);

        let mut nodes: Vec<ApiNode> = state
            .nodes
            .iter()
            .filter(|n| n.user_id == query.user_id)
            .filter_map(|n| {
                let text = format!(
                    "{} {}",
                    n.item.name.as_deref().unwrap_or_default(),
                    n.item.summary.as_deref().unwrap_or_default()
                );
                let score = term_score(&terms, &text);
                (score > 0.0).then(|| ApiNode {
                    score: Some(score),
                    ..n.item.clone()
                })
            })
            .collect();
        nodes.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        nodes.truncate(limit);

        Ok(GraphSearchResults {
            edges: Some(edges),
            nodes: Some(nodes),
        })
    }

    async fn nodes_by_user(&self, user_id: &str, limit: u32) -> ZepResult<Vec<ApiNode>> {
        self.enter(Operation::NodesByUser).await?;
        let state = self.state.read().await;
        Ok(state
            .nodes
            .iter()
            .filter(|n| n.user_id == user_id)
            .take(limit as usize)
            .map(|n| n.item.clone())
            .collect())
    }

    async fn edges_by_user(&self, user_id: &str, limit: u32) -> ZepResult<Vec<ApiEdge>> {
        self.enter(Operation::EdgesByUser).await?;
        let state = self.state.read().await;
        Ok(state
            .edges
            .iter()
            .filter(|e| e.user_id == user_id)
            .take(limit as usize)
            .map(|e| e.item.clone())
            .collect())
    }

    async fn get_node(&self, uuid: &str) -> ZepResult<ApiNode> {
        self.enter(Operation::GetNode).await?;
        let state = self.state.read().await;
        state
            .nodes
            .iter()
            .find(|n| n.item.id() == Some(uuid))
            .map(|n| n.item.clone())
            .ok_or_else(|| ZepError::NotFound(format!("node {uuid}")))
    }

    async fn node_edges(&self, uuid: &str) -> ZepResult<Vec<ApiEdge>> {
        self.enter(Operation::NodeEdges).await?;
        let state = self.state.read().await;
        Ok(state
            .edges
            .iter()
            .filter(|e| {
                e.item.source_node_uuid.as_deref() == Some(uuid)
                    || e.item.target_node_uuid.as_deref() == Some(uuid)
            })
            .map(|e| e.item.clone())
            .collect())
    }

    async fn node_episodes(&self, uuid: &str) -> ZepResult<EpisodeResponse> {
        self.enter(Operation::NodeEpisodes).await?;
        let state = self.state.read().await;
        Ok(EpisodeResponse {
            episodes: Some(state.episodes.get(uuid).cloned().unwrap_or_default()),
        })
    }
}
