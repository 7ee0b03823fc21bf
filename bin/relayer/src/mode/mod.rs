//! The destinations the relayer can run against.

use std::sync::Arc;

use bridge_codemap::Codemap;
use bridge_relayer::{DestinationChain, RelayConfig, RelayOrchestrator, SourceChain};
use tokio::sync::watch;
use tracing::info;

pub(crate) mod relay;
pub(crate) mod standalone;

/// Relays from `source` into `destination` until the relay fails or the process is interrupted.
async fn run<Src, Dst>(
    source: Arc<Src>,
    destination: Arc<Dst>,
    codemap: &Codemap,
    cfg: RelayConfig,
) -> anyhow::Result<()>
where
    Src: SourceChain + 'static,
    Dst: DestinationChain + 'static,
{
    let orchestrator = RelayOrchestrator::new(source, destination, codemap, cfg)?;
    let (heights, _) = watch::channel(None);

    tokio::select! {
        res = orchestrator.run(heights) => res.map_err(Into::into),
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted; shutting down");
            Ok(())
        }
    }
}
