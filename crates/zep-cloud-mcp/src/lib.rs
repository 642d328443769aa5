//! Zep Cloud MCP Server: conversation memory and knowledge-graph tools for
//! MCP-compatible LLM clients.
//!
//! The server exposes a fixed set of tools backed by [`zep_cloud::ZepClient`].
//! It speaks newline-delimited JSON-RPC over stdio and keeps running even
//! when no Zep client could be built, reporting the cause on every call.

pub mod config;
pub mod context;
pub mod hook;
pub mod protocol;
pub mod tools;
pub mod transport;
pub mod types;

pub use config::ServerConfig;
pub use context::ServerContext;
pub use protocol::ProtocolHandler;
pub use tools::ToolRegistry;
pub use transport::StdioTransport;
