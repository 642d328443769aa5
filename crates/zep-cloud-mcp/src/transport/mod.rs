//! Transports binding the protocol handler to an I/O channel.

pub mod stdio;

pub use stdio::StdioTransport;
