mod cli;
mod commands;
mod output;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use sttctl::{DockerClient, Error as SttError, LifecycleManager, Parser as ConfigParser};

#[tokio::main]
async fn main() {
    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            if let Some(stt_error) = e.downcast_ref::<SttError>() {
                eprintln!("Error: {}", stt_error);
                if let Some(suggestion) = stt_error.suggestion() {
                    eprintln!("\nHint: {}", suggestion);
                }
            } else {
                eprintln!("Error: {:#}", e);
            }
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the command ran but the answer is negative
/// (`health` on an unhealthy service).
async fn run() -> anyhow::Result<bool> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    // ── Commands that need no config ──────────────────────────────────
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        let bin_name = cmd.get_name().to_string();
        clap_complete::generate(*shell, &mut cmd, bin_name, &mut std::io::stdout());
        return Ok(true);
    }

    let work_dir = resolve_work_dir(cli.workdir)?;
    let config_path = cli.config.map(|p| if p.is_absolute() { p } else { work_dir.join(p) });
    let config = ConfigParser::new().load_or_default(config_path.as_deref(), &work_dir)?;
    config.validate()?;

    let out = output::CliOutput;
    let client = docker_client();

    match cli.command {
        Commands::Start { wait, wait_timeout } => {
            let manager =
                LifecycleManager::new(client).with_host_port_check(!is_remote_docker_host());
            let token = manager.cancellation_token();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupted, cancelling start");
                    token.cancel();
                }
            });
            commands::run_start(&manager, &config, wait, wait_timeout, &out).await?;
        }
        Commands::Stop => {
            let manager = LifecycleManager::new(client);
            commands::run_stop(&manager, &config, &out).await?;
        }
        Commands::Status { json } => {
            commands::run_status(&client, &config, json, &out).await?;
        }
        Commands::Health { timeout, json } => {
            return commands::run_health(&config, timeout, json, &out).await;
        }
        Commands::Setup { no_build } => {
            commands::run_setup(&client, &config, no_build, &out).await?;
        }
        Commands::Config => {
            commands::run_config(&config, &out)?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(true)
}

/// Absolute working directory. Data paths derive from it and must be
/// absolute for `docker -v`.
fn resolve_work_dir(workdir: Option<std::path::PathBuf>) -> anyhow::Result<std::path::PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(match workdir {
        Some(dir) if dir.is_absolute() => dir,
        Some(dir) => cwd.join(dir),
        None => cwd,
    })
}

/// `STTCTL_DOCKER` overrides the docker binary (e.g. `podman`).
fn docker_client() -> DockerClient {
    match std::env::var("STTCTL_DOCKER") {
        Ok(binary) if !binary.is_empty() => DockerClient::with_binary(binary),
        _ => DockerClient::new(),
    }
}

/// Local port probes say nothing about a daemon on another host.
fn is_remote_docker_host() -> bool {
    std::env::var("DOCKER_HOST")
        .map(|h| h.starts_with("tcp://") || h.starts_with("ssh://"))
        .unwrap_or(false)
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("sttctl=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
