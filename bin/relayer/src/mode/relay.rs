//! Relays into a remote Tendermint node.
use std::sync::Arc;

use anyhow::Context;
use bridge_relayer::{EthRpcSource, TendermintRpc};
use tracing::info;

use crate::config::RelayerConfig;

/// Connects to both chains and relays until stopped.
pub(crate) async fn bootstrap(config: RelayerConfig) -> anyhow::Result<()> {
    let destination_cfg = config
        .destination
        .as_ref()
        .context("relay mode needs a [destination] section")?;
    info!(
        source = %config.source.url,
        destination = %destination_cfg.url,
        "bootstrapping relay mode"
    );

    let codemap = config.codemap()?;
    let source = Arc::new(EthRpcSource::new(config.source.clone())?);
    let destination = Arc::new(TendermintRpc::new(destination_cfg)?);

    super::run(source, destination, &codemap, config.relay_config()).await
}
