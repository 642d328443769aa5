//! Wire types exchanged with the Zep Cloud API.
//!
//! Every optional attribute is modelled as `Option` with `#[serde(default)]`
//! so a response missing a field still decodes. Identifiers arrive either as
//! `uuid_` or `uuid` depending on the API generation; both are captured and
//! resolved by [`ApiNode::id`] and friends.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role of a message author.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[default]
    Assistant,
    System,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }

    /// Parse a role by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            "system" => Some(Role::System),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn pick_id<'a>(preferred: &'a Option<String>, fallback: &'a Option<String>) -> Option<&'a str> {
    preferred.as_deref().or(fallback.as_deref())
}

/// A message to append to a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    pub content: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

/// A message as returned by the thread endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
}

impl ApiMessage {
    pub fn id(&self) -> Option<&str> {
        pick_id(&self.uuid_, &self.uuid)
    }
}

/// Query options for reading a thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreadQuery {
    /// Most recent N messages. Upstream gives this precedence over paging.
    pub lastn: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
    /// Page cursor.
    pub cursor: Option<u64>,
}

/// Body of `GET /threads/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadResponse {
    #[serde(default)]
    pub messages: Option<Vec<ApiMessage>>,
}

/// Body of `GET /threads/{id}/context`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadContextResponse {
    #[serde(default)]
    pub context: Option<String>,
}

/// Request body of `POST /graph/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSearchQuery {
    pub query: String,
    pub user_id: String,
    pub limit: u32,
}

/// An entity node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
}

impl ApiNode {
    pub fn id(&self) -> Option<&str> {
        pick_id(&self.uuid_, &self.uuid)
    }
}

/// A fact connecting two entity nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiEdge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub fact: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub source_node_uuid: Option<String>,
    #[serde(default)]
    pub target_node_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
}

impl ApiEdge {
    pub fn id(&self) -> Option<&str> {
        pick_id(&self.uuid_, &self.uuid)
    }
}

/// A source excerpt that contributed to the graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiEpisode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
}

impl ApiEpisode {
    pub fn id(&self) -> Option<&str> {
        pick_id(&self.uuid_, &self.uuid)
    }
}

/// Body of `POST /graph/search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSearchResults {
    #[serde(default)]
    pub edges: Option<Vec<ApiEdge>>,
    #[serde(default)]
    pub nodes: Option<Vec<ApiNode>>,
}

/// Body of `GET /graph/node/{uuid}/episodes`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpisodeResponse {
    #[serde(default)]
    pub episodes: Option<Vec<ApiEpisode>>,
}
