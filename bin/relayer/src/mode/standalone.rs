//! Relays into a bridge state machine embedded in this process.
use std::sync::Arc;

use bridge_db::SledStore;
use bridge_relayer::{EthRpcSource, LocalChain};
use bridge_sm::BridgeCfg;
use tracing::info;

use crate::config::RelayerConfig;

/// Opens the local store and relays into it until stopped.
pub(crate) async fn bootstrap(config: RelayerConfig) -> anyhow::Result<()> {
    info!(
        datadir = %config.datadir.display(),
        confirmations = config.confirmations,
        "bootstrapping standalone mode"
    );

    let codemap = config.codemap()?;
    let store = SledStore::open(&config.datadir)?;
    let bridge_cfg = BridgeCfg::new(codemap.clone()).with_confirmations(config.confirmations);

    let source = Arc::new(EthRpcSource::new(config.source.clone())?);
    let destination = Arc::new(LocalChain::new(store.clone(), Arc::new(bridge_cfg)));

    let result = super::run(source, destination, &codemap, config.relay_config()).await;
    store.flush()?;

    result
}
