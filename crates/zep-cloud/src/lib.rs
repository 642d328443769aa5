//! Zep Cloud client: thread memory and knowledge-graph access for agents.
//!
//! [`ZepClient`] exposes one typed operation per upstream capability and
//! normalizes every response into plain structs. It is built over the
//! [`ZepApi`] trait, implemented for the hosted service by [`HttpZepApi`]
//! and in-process by [`InMemoryZepApi`].

pub mod api;
pub mod client;
pub mod error;
pub mod http;
pub mod memory;
pub mod normalize;
pub mod types;

pub use api::ZepApi;
pub use client::{
    ClientOptions, ZepClient, DEFAULT_CONTEXT_MODE, DEFAULT_LIST_LIMIT, DEFAULT_SEARCH_LIMIT,
    DEFAULT_USER_ID,
};
pub use error::{ZepError, ZepResult};
pub use http::{HttpZepApi, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use memory::{InMemoryZepApi, Operation};
pub use normalize::{
    Edge, EdgeListResult, Episode, GraphSearchResult, MemoryResult, Message, Node, NodeDetails,
    NodeListResult, StoreMemoryResult, ThreadContextResult,
};
pub use types::{Role, ThreadQuery};
