//! Assistants MCP Gateway
//!
//! Serves the Assistants v2 tool surface over MCP on stdio (default), as an
//! HTTP host, or as a stdio proxy in front of a remote deployment.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use assistants_mcp_gateway::config::Config;
use assistants_mcp_gateway::error::Result;
use assistants_mcp_gateway::mcp::server::McpServer;
use assistants_mcp_gateway::mcp::tools::ToolRegistry;
use assistants_mcp_gateway::providers::ProviderRegistry;
use assistants_mcp_gateway::transport::http::{self, HttpState};
use assistants_mcp_gateway::transport::proxy::ProxyHandler;
use assistants_mcp_gateway::transport::stdio::{run_stdio, StdioAdapter};

/// Assistants MCP Gateway
#[derive(Parser)]
#[command(name = "assistants-mcp")]
#[command(author, version, about = "MCP gateway for the Assistants API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdin/stdout (default)
    Stdio,

    /// Run the HTTP host
    Serve {
        /// Address to listen on (overrides ASSISTANTS_MCP_BIND)
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Forward stdio traffic to a remote HTTP deployment
    Proxy {
        /// Full endpoint URL, e.g. https://host/mcp/{key}
        #[arg(long)]
        endpoint: String,
    },

    /// List configured providers
    Providers {
        /// Also check each provider's connection
        #[arg(long)]
        check: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::new()?;

    match cli.command.unwrap_or(Commands::Stdio) {
        Commands::Stdio => run_local(config).await?,
        Commands::Serve { bind } => {
            let addr = bind.unwrap_or(config.http_bind);
            let tools = Arc::new(ToolRegistry::with_default_tools()?);
            let state = HttpState::new(tools, config.providers_config()?, config.debug);
            http::serve(addr, state).await?;
        }
        Commands::Proxy { endpoint } => {
            let handler = ProxyHandler::new(endpoint)?.with_debug(config.debug);
            tracing::info!(endpoint = %redacted(handler.endpoint()), "proxying stdio");
            run_stdio(Arc::new(handler), config.debug).await?;
        }
        Commands::Providers { check } => list_providers(config, check).await?,
    }

    Ok(())
}

async fn run_local(config: Config) -> Result<()> {
    let providers = ProviderRegistry::from_config(&config.providers_config()?).await;
    if providers.is_empty() {
        tracing::warn!("no providers registered; tools/call will fail until OPENAI_API_KEY or a providers file is set");
    } else {
        tracing::info!(
            providers = ?providers.provider_names(),
            default = ?providers.default_provider_name(),
            "providers ready"
        );
    }

    let tools = Arc::new(ToolRegistry::with_default_tools()?);
    let server = McpServer::new(tools, Arc::new(providers))
        .with_adapter(Arc::new(StdioAdapter))
        .with_debug(config.debug);

    run_stdio(Arc::new(server), config.debug).await
}

async fn list_providers(config: Config, check: bool) -> Result<()> {
    let providers = ProviderRegistry::from_config(&config.providers_config()?).await;
    if providers.is_empty() {
        eprintln!("No providers configured.");
        eprintln!(
            "Set OPENAI_API_KEY or create {}",
            config.providers_path.display()
        );
        std::process::exit(1);
    }

    let default = providers.default_provider_name().map(str::to_string);
    for name in providers.provider_names() {
        let Some(provider) = providers.get_provider(&name) else {
            continue;
        };
        let marker = if default.as_deref() == Some(name.as_str()) { " (default)" } else { "" };
        println!("{}{}", name, marker);
        println!("{}", serde_json::to_string_pretty(provider.metadata())?);

        if check {
            let status = if provider.validate_connection().await { "ok" } else { "FAILED" };
            println!("connection: {}", status);
        }
    }

    Ok(())
}

/// Hide the key segment of a proxy endpoint in logs
fn redacted(endpoint: &str) -> String {
    match endpoint.rsplit_once('/') {
        Some((base, _)) => format!("{}/***", base),
        None => endpoint.to_string(),
    }
}
