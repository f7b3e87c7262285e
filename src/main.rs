use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use cdm_bootstrap::bootstrap::{BootstrapClient, BootstrapRequestId};
use cdm_bootstrap::config::{read_config, validate_config, CdmConfig, ConfigError};
use cdm_bootstrap::lifecycle::{cancel_on_signal, Shutdown};
use cdm_bootstrap::observability::init_logging;

#[derive(Parser)]
#[command(name = "cdm-bootstrap")]
#[command(version, about = "Bootstrap a CDM cluster and wait for it to come up", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Node address, overriding `node.address` from the config
    #[arg(short, long)]
    node: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print whether the node is bootstrapped
    Status,
    /// Bootstrap the `[cluster]` from the config and wait for completion
    Bootstrap,
    /// Wait for an existing bootstrap request
    Wait {
        #[arg(long)]
        request_id: u64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Error: failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<CdmConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => CdmConfig::default(),
    };
    if let Some(node) = &cli.node {
        config.node.address = node.clone();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

async fn run(command: Commands, config: CdmConfig) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = Shutdown::new();
    let signals = cancel_on_signal(shutdown.clone());

    let client = BootstrapClient::from_config(&config)?;
    tracing::info!(
        node = client.client().node(),
        grace_timeout_secs = config.polling.grace_timeout_secs,
        "cdm-bootstrap v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let result = execute(command, &client, &config, &shutdown.token()).await;

    shutdown.trigger();
    let _ = signals.await;
    result
}

async fn execute(
    command: Commands,
    client: &BootstrapClient,
    config: &CdmConfig,
    cancel: &CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    let grace = config.polling.grace_timeout();

    match command {
        Commands::Status => {
            let bootstrapped = client.is_bootstrapped(cancel, grace).await?;
            println!("bootstrapped: {bootstrapped}");
        }
        Commands::Bootstrap => {
            let cluster = config
                .cluster
                .as_ref()
                .ok_or("no [cluster] section in configuration")?;
            let id = client.bootstrap_cluster(cancel, cluster, grace).await?;
            println!("bootstrap request id: {id}");
            client.wait_for_bootstrap(cancel, id, grace).await?;
            println!("bootstrap complete");
        }
        Commands::Wait { request_id } => {
            client
                .wait_for_bootstrap(cancel, BootstrapRequestId(request_id), grace)
                .await?;
            println!("bootstrap complete");
        }
    }
    Ok(())
}
