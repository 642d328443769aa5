//! Mapping from upstream wire types to the plain-data results handed to callers.
//!
//! Normalized structs serialize every field, so an attribute the upstream
//! omitted shows up as `null` (or `[]` for labels) rather than disappearing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{ApiEdge, ApiEpisode, ApiMessage, ApiNode};

/// A stored thread message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub uuid: Option<String>,
    pub role: Option<String>,
    pub content: Option<String>,
    pub created_at: Option<String>,
    pub metadata: Option<Map<String, Value>>,
}

/// An entity in the user's knowledge graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub uuid: Option<String>,
    pub name: Option<String>,
    pub labels: Vec<String>,
    pub summary: Option<String>,
    pub attributes: Option<Map<String, Value>>,
    pub score: Option<f64>,
    pub created_at: Option<String>,
}

/// A directed fact between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub uuid: Option<String>,
    pub fact: Option<String>,
    pub name: Option<String>,
    pub source_node_uuid: Option<String>,
    pub target_node_uuid: Option<String>,
    pub score: Option<f64>,
    pub created_at: Option<String>,
}

/// A source excerpt behind part of the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub uuid: Option<String>,
    pub content: Option<String>,
    pub created_at: Option<String>,
}

/// Result of storing one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreMemoryResult {
    pub success: bool,
    pub thread_id: String,
    pub role: String,
    pub content_length: usize,
}

/// Messages read back from a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryResult {
    pub thread_id: String,
    pub message_count: usize,
    pub messages: Vec<Message>,
}

impl MemoryResult {
    /// Build a result whose count always matches its message list.
    pub fn new(thread_id: String, messages: Vec<Message>) -> Self {
        Self {
            thread_id,
            message_count: messages.len(),
            messages,
        }
    }

    /// Keep only messages authored with `role`, recounting what remains.
    pub fn retain_role(&mut self, role: &str) {
        self.messages.retain(|m| m.role.as_deref() == Some(role));
        self.message_count = self.messages.len();
    }
}

/// Cross-thread context for a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadContextResult {
    pub thread_id: String,
    pub mode: String,
    pub context: Option<String>,
}

/// Ranked search hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSearchResult {
    pub query: String,
    pub edge_count: usize,
    pub node_count: usize,
    pub edges: Vec<Edge>,
    pub nodes: Vec<Node>,
}

/// Unfiltered node listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeListResult {
    pub node_count: usize,
    pub nodes: Vec<Node>,
}

/// Unfiltered edge listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeListResult {
    pub edge_count: usize,
    pub edges: Vec<Edge>,
}

/// A node together with its edges and the episodes that mention it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDetails {
    pub node: Node,
    pub edge_count: usize,
    pub edges: Vec<Edge>,
    pub episode_count: usize,
    pub episodes: Vec<Episode>,
}

/// Render an upstream timestamp as text. Strings pass through untouched.
pub fn timestamp_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

pub fn message_from(msg: &ApiMessage) -> Message {
    Message {
        uuid: msg.id().map(str::to_string),
        role: msg.role.clone(),
        content: msg.content.clone(),
        created_at: timestamp_string(msg.created_at.as_ref()),
        metadata: msg.metadata.clone(),
    }
}

pub fn node_from(node: &ApiNode) -> Node {
    Node {
        uuid: node.id().map(str::to_string),
        name: node.name.clone(),
        labels: node.labels.clone().unwrap_or_default(),
        summary: node.summary.clone(),
        attributes: node.attributes.clone(),
        score: node.score,
        created_at: timestamp_string(node.created_at.as_ref()),
    }
}

pub fn edge_from(edge: &ApiEdge) -> Edge {
    Edge {
        uuid: edge.id().map(str::to_string),
        fact: edge.fact.clone(),
        name: edge.name.clone(),
        source_node_uuid: edge.source_node_uuid.clone(),
        target_node_uuid: edge.target_node_uuid.clone(),
        score: edge.score,
        created_at: timestamp_string(edge.created_at.as_ref()),
    }
}

pub fn episode_from(episode: &ApiEpisode) -> Episode {
    Episode {
        uuid: episode.id().map(str::to_string),
        content: episode.content.clone(),
        created_at: timestamp_string(episode.created_at.as_ref()),
    }
}

/// Normalize an optional upstream list, treating absence as empty.
pub fn normalize_all<T, U>(items: Option<&[T]>, f: impl Fn(&T) -> U) -> Vec<U> {
    items.unwrap_or_default().iter().map(f).collect()
}
