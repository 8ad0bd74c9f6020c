//! CLI module for healthsim
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `serve` - Start the simulator
//! - `status` - Show a running instance's health configuration
//! - `probe` - Poll a running instance's readiness probe
//! - `set-health` - Set a running instance's health flag
//! - `set-readiness` - Set a running instance's readiness percentage
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Start the simulator on port 8080
//! healthsim serve
//!
//! # Fail 30% of probes
//! healthsim set-readiness 70
//!
//! # See what an orchestrator would see over 200 probes
//! healthsim probe --count 200
//! ```

pub mod completions;
pub mod config;
pub mod output;
pub mod remote;
pub mod serve;

pub use completions::handle_completions;
pub use config::handle_config_init;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Default address of a running simulator for the remote commands.
pub const DEFAULT_URL: &str = "http://localhost:8080";

/// healthsim - Readiness probe simulator
#[derive(Parser, Debug)]
#[command(
    name = "healthsim",
    version,
    about = "Readiness probe simulator for failover testing"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the simulator
    Serve(ServeArgs),
    /// Show the health configuration of a running simulator
    Status(StatusArgs),
    /// Poll the readiness probe of a running simulator
    Probe(ProbeArgs),
    /// Set the explicit health flag
    SetHealth(SetHealthArgs),
    /// Set the readiness percentage
    SetReadiness(SetReadinessArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "healthsim.toml")]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Explicit region reported in responses
    #[arg(long)]
    pub region: Option<String>,

    /// Seed the degraded-mode random draw
    #[arg(long)]
    pub seed: Option<u64>,

    /// Do not query the cloud metadata server
    #[arg(long)]
    pub no_metadata_server: bool,
}

/// Connection options shared by the remote commands
#[derive(Args, Debug, Clone)]
pub struct RemoteArgs {
    /// Base URL of the running simulator
    #[arg(short, long, env = "HEALTHSIM_URL", default_value = DEFAULT_URL)]
    pub url: String,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    /// Number of probes to send
    #[arg(short = 'n', long, default_value = "1")]
    pub count: u32,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SetHealthArgs {
    /// New health value (true, 1 or yes mean healthy; anything else unhealthy)
    pub healthy: String,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

#[derive(Args, Debug)]
pub struct SetReadinessArgs {
    /// Percentage of probes that should pass (clamped to 0-100)
    #[arg(allow_hyphen_values = true)]
    pub percent: String,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "healthsim.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
