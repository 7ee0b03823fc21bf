//! Relays a proof-of-work chain's headers and proven events into a Tendermint chain.

use std::{fs, path::Path};

use anyhow::Context;
use args::OperationMode;
use bridge_common::logging::{self, LoggerConfig};
use clap::Parser;
use config::RelayerConfig;
use constants::{DEFAULT_THREAD_COUNT, DEFAULT_THREAD_STACK_SIZE};
use mode::{relay, standalone};
use serde::de::DeserializeOwned;
use tokio::runtime;
use tracing::{debug, info, trace};

mod args;
mod config;
mod mode;

mod constants;

fn main() -> anyhow::Result<()> {
    let mut logger_config = LoggerConfig::with_base_name("bridge-relayer");
    if let Some(url) = logging::get_otlp_url_from_env() {
        logger_config.set_otlp_url(url);
    }
    logging::init(logger_config)?;

    let cli = args::Cli::parse();
    info!(mode = %cli.mode, "starting relayer");

    let config = parse_toml::<RelayerConfig>(&cli.config)?;

    let runtime = runtime::Builder::new_multi_thread()
        .worker_threads(config.num_threads.unwrap_or(DEFAULT_THREAD_COUNT).into())
        .thread_stack_size(
            config
                .thread_stack_size
                .unwrap_or(DEFAULT_THREAD_STACK_SIZE),
        )
        .enable_all()
        .build()
        .context("failed to create runtime")?;

    runtime.block_on(async move {
        match cli.mode {
            OperationMode::Relay => relay::bootstrap(config).await,
            OperationMode::Standalone => standalone::bootstrap(config).await,
        }
    })?;

    info!("relayer shutdown complete");
    Ok(())
}

/// Reads and parses a TOML file from the given path into the given type `T`.
fn parse_toml<T>(path: impl AsRef<Path>) -> anyhow::Result<T>
where
    T: std::fmt::Debug + DeserializeOwned,
{
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read TOML file {}", path.display()))?;
    trace!(?contents, "read file");

    let parsed = toml::from_str::<T>(&contents).context("failed to parse TOML file")?;
    debug!(?parsed, "parsed TOML file");

    Ok(parsed)
}
