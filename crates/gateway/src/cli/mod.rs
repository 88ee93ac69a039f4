pub mod config;
pub mod doctor;

use clap::{Parser, Subcommand};

/// Orchestration server brokering AI-agent access to a fleet of data engines.
#[derive(Debug, Parser)]
#[command(name = "dh-mcp-server", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the tool-protocol server on stdio (default when no subcommand is given).
    Serve,
    /// Run diagnostic checks against the current configuration.
    Doctor,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config document and report any errors.
    Validate,
    /// Dump the resolved configuration document as JSON.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration document named by `DH_MCP_CONFIG_FILE` (§6).
/// Shared by `serve`, `doctor` and `config` subcommands so the resolution
/// logic lives in one place.
pub fn load_config() -> anyhow::Result<(dh_domain::config::Config, String)> {
    let path = std::env::var(dh_domain::config::CONFIG_PATH_ENV_VAR)
        .map_err(|_| anyhow::anyhow!("{} is not set", dh_domain::config::CONFIG_PATH_ENV_VAR))?;

    let raw = std::fs::read_to_string(&path).map_err(|e| anyhow::anyhow!("reading {path}: {e}"))?;
    let config = dh_domain::config::Config::parse(&raw).map_err(|e| anyhow::anyhow!("parsing {path}: {e}"))?;

    Ok((config, path))
}
