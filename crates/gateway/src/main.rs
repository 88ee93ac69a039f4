mod bootstrap;
mod cli;
mod transport;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, ConfigCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None | Some(Command::Serve) => {
            init_tracing();
            serve().await
        }
        Some(Command::Doctor) => {
            let (config, config_path) = cli::load_config()?;
            let passed = cli::doctor::run(&config, &config_path).await?;
            if !passed {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            let (config, config_path) = cli::load_config()?;
            let valid = cli::config::validate(&config, &config_path);
            if !valid {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            let (config, _config_path) = cli::load_config()?;
            cli::config::show(&config);
            Ok(())
        }
        Some(Command::Version) => {
            println!("dh-mcp-server {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Initialize structured JSON tracing (only for the `serve` command; the
/// CLI subcommands print human-readable text to stdout instead).
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,dh_mcp_server=debug")))
        .json()
        .with_writer(std::io::stderr)
        .init();
}

/// Boot every component, bind a [`dh_tools::RequestContext`], and run the
/// stdio tool-protocol loop until stdin closes (§4.10, §6).
async fn serve() -> anyhow::Result<()> {
    tracing::info!("dh-mcp-server starting");

    let ctx = bootstrap::build_context().await?;
    let dispatcher = dh_tools::build_dispatcher();
    tracing::info!(tools = dispatcher.names().len(), "tool dispatcher ready");

    let result = transport::serve(&ctx, &dispatcher).await;

    tracing::info!("dh-mcp-server shutting down");
    bootstrap::shutdown(&ctx).await;

    result
}
