//! Zep Cloud MCP Server — entry point.

use std::io::Read;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use zep_cloud_mcp::config::load_config;
use zep_cloud_mcp::hook::{self, HookOutcome, HookSettings};
use zep_cloud_mcp::protocol::ProtocolHandler;
use zep_cloud_mcp::tools::ToolRegistry;
use zep_cloud_mcp::transport::StdioTransport;
use zep_cloud_mcp::types::InitializeResult;
use zep_cloud_mcp::{ServerConfig, ServerContext};

#[derive(Parser)]
#[command(
    name = "zep-cloud-mcp",
    about = "MCP server for Zep Cloud conversation memory and knowledge-graph tools",
    version
)]
struct Cli {
    /// Configuration file path.
    #[arg(short, long)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over stdio (default).
    Serve {
        /// Use an in-process upstream instead of Zep Cloud.
        #[arg(long)]
        offline: bool,
    },

    /// Print server capabilities and tools as JSON.
    Info,

    /// Verify that the configured credentials reach Zep Cloud.
    Check,

    /// Mirror a memory note into Zep (post-tool-use hook; reads stdin).
    SyncHook,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve { offline: false }) {
        Commands::Serve { offline } => {
            let config = init(cli.config.as_deref(), cli.log_level.as_deref())?;
            let context = if offline {
                ServerContext::offline(&config)
            } else {
                ServerContext::from_config(&config)
            };
            let handler = ProtocolHandler::new(Arc::new(context));
            let transport = StdioTransport::new(handler);
            transport.run().await?;
        }

        Commands::Info => {
            let info = serde_json::json!({
                "server": InitializeResult::default_result(),
                "tools": ToolRegistry::list_tools(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Check => {
            let config = init(cli.config.as_deref(), cli.log_level.as_deref())?;
            let context = ServerContext::from_config(&config);
            let client = match context.client() {
                Ok(client) => client,
                Err(e) => {
                    eprintln!("✗ {e}");
                    std::process::exit(1);
                }
            };
            match client.get_graph_nodes(1).await {
                Ok(_) => println!("✓ Zep Cloud reachable as user {}", client.user_id()),
                Err(e) => {
                    eprintln!("✗ Zep Cloud request failed: {e}");
                    std::process::exit(1);
                }
            }
        }

        // The hook never fails its host, so it skips configuration entirely.
        Commands::SyncHook => run_sync_hook().await,
    }

    Ok(())
}

/// Load configuration, then start logging with `RUST_LOG`, the flag, or the
/// configured level, in that order.
fn init(config_path: Option<&str>, log_level: Option<&str>) -> anyhow::Result<ServerConfig> {
    let config = load_config(config_path)?;

    let level = log_level.unwrap_or(&config.log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(config)
}

async fn run_sync_hook() {
    let mut raw = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut raw) {
        eprintln!("Failed to read stdin: {e}");
        return;
    }

    match hook::run(&raw, HookSettings::from_env()).await {
        HookOutcome::Synced(result) => {
            eprintln!("Synced memory note to Zep thread {}", result.thread_id)
        }
        HookOutcome::Skipped(_) => {}
        HookOutcome::Failed(reason) => eprintln!("{reason}"),
    }
}
