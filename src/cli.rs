use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sttctl")]
#[command(about = "Manage the containerized speech-to-text service")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to sttctl.yaml, searched upward from the working directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Working directory
    #[arg(short, long, global = true)]
    pub workdir: Option<PathBuf>,

    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Remove any existing container and start a fresh one
    Start {
        /// Wait for the health endpoint to report healthy
        #[arg(long)]
        wait: bool,

        /// How long to wait with --wait (e.g. 90s, 2m); defaults to health.start_timeout
        #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
        wait_timeout: Option<std::time::Duration>,
    },
    /// Stop and remove the container
    Stop,
    /// Show running state, health, resource usage and disk usage
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Probe the health endpoint once (exit 0 only when healthy)
    Health {
        /// Probe timeout (e.g. 500ms, 5s); defaults to health.timeout
        #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
        timeout: Option<std::time::Duration>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create data directories and build the service image
    Setup {
        /// Only create the data directories
        #[arg(long)]
        no_build: bool,
    },
    /// Print the effective configuration
    Config,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: clap_complete::Shell,
    },
}

fn parse_duration(s: &str) -> Result<std::time::Duration, String> {
    sttctl::config::parse_duration_string(s)
        .ok_or_else(|| format!("invalid duration '{}' (expected e.g. 500ms, 5s, 2m)", s))
}
