//! Configuration loading and resolution.

pub mod loader;

pub use loader::{default_config_path, load_config, ServerConfig};
