//! GaslessPoll daemon — entry point for running a poll relayer.

mod config;
mod logging;

use clap::Parser;
use config::{ConfigError, DaemonConfig};
use gpoll_core::{BatchSettings, PollLimits, PollService};
use gpoll_crypto::{validate_address, DomainTag};
use gpoll_rpc::RpcServer;
use gpoll_types::VoterAddress;
use logging::{init_logging, LogFormat};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Parser)]
#[command(name = "gpoll-daemon", about = "GaslessPoll relayer daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address the RPC server binds to.
    #[arg(long, env = "GPOLL_LISTEN_ADDR")]
    listen_addr: Option<String>,

    /// Owner address for privileged operations.
    #[arg(long, env = "GPOLL_OWNER")]
    owner: Option<String>,

    /// Deployment label mixed into the signature domain.
    #[arg(long, env = "GPOLL_INSTANCE_LABEL")]
    instance_label: Option<String>,

    /// Snapshot file loaded on startup and written on shutdown.
    #[arg(long, env = "GPOLL_STATE_FILE")]
    state_file: Option<PathBuf>,

    /// Queue length at which submission triggers settlement.
    #[arg(long, env = "GPOLL_MIN_BATCH_SIZE")]
    min_batch_size: Option<usize>,

    /// Hard cap on entries drained per settlement call.
    #[arg(long, env = "GPOLL_MAX_BATCH_SIZE")]
    max_batch_size: Option<usize>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "GPOLL_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "GPOLL_LOG_FORMAT")]
    log_format: Option<String>,
}

impl Cli {
    /// File config is the base; any CLI/env value overrides it.
    fn merge_over(self, base: DaemonConfig) -> DaemonConfig {
        DaemonConfig {
            listen_addr: self.listen_addr.unwrap_or(base.listen_addr),
            owner: self.owner.or(base.owner),
            instance_label: self.instance_label.unwrap_or(base.instance_label),
            state_file: self.state_file.unwrap_or(base.state_file),
            min_batch_size: self.min_batch_size.unwrap_or(base.min_batch_size),
            max_batch_size: self.max_batch_size.unwrap_or(base.max_batch_size),
            log_level: self.log_level.unwrap_or(base.log_level),
            log_format: self.log_format.unwrap_or(base.log_format),
            ..base
        }
    }
}

fn build_service(config: &DaemonConfig) -> anyhow::Result<PollService> {
    if config.state_file.exists() {
        let data = std::fs::read(&config.state_file)?;
        let service = PollService::load_state(&data)?;
        tracing::info!(
            path = %config.state_file.display(),
            polls = service.polls().count(),
            "restored service snapshot"
        );
        return Ok(service);
    }

    let owner_raw = config.owner.as_deref().ok_or(ConfigError::MissingOwner)?;
    if !validate_address(owner_raw) {
        anyhow::bail!("owner address {owner_raw:?} failed checksum validation");
    }
    let owner = VoterAddress::from(owner_raw.to_string());
    let domain = DomainTag::from_label(&config.instance_label);
    let batch = BatchSettings::new(config.min_batch_size, config.max_batch_size)?;
    let limits = PollLimits {
        min_duration_secs: config.min_duration_secs,
        max_duration_secs: config.max_duration_secs,
    };
    tracing::info!(
        label = %config.instance_label,
        owner = %owner,
        "starting with a fresh service"
    );
    Ok(PollService::with_settings(domain, owner, batch, limits))
}

fn save_snapshot(service: &Mutex<PollService>, path: &std::path::Path) -> anyhow::Result<()> {
    let data = {
        let guard = service
            .lock()
            .map_err(|_| anyhow::anyhow!("service mutex poisoned, refusing to snapshot"))?;
        guard.save_state()?
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, data)?;
    tracing::info!(path = %path.display(), "service snapshot saved");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let base = match cli.config {
        Some(ref path) => DaemonConfig::from_toml_file(path)?,
        None => DaemonConfig::default(),
    };
    let config = cli.merge_over(base);

    init_logging(LogFormat::from_str_lossy(&config.log_format), &config.log_level);

    let service = Arc::new(Mutex::new(build_service(&config)?));

    let addr: SocketAddr = config.listen_addr.parse()?;
    let server = RpcServer::new(addr, Arc::clone(&service));
    tracing::info!(%addr, "RPC server listening");

    tokio::select! {
        result = server.start() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    save_snapshot(&service, &config.state_file)?;
    tracing::info!("gpoll daemon exited cleanly");
    Ok(())
}
