//! In-process destination chain.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use async_trait::async_trait;
use bridge_db::KvStore;
use bridge_sm::{BridgeCfg, BridgeStateMachine, TxResult};
use tokio::sync::Mutex;
use tracing::trace;

use crate::{destination::DestinationChain, errors::DestinationError};

/// A destination chain embedded in the relayer process.
///
/// Every committed broadcast produces one block, so the height counts the transactions that got
/// past the admission check.
#[derive(Debug)]
pub struct LocalChain<S> {
    machine: Mutex<BridgeStateMachine<S>>,
    cfg: Arc<BridgeCfg>,
    height: AtomicU64,
}

impl<S: KvStore> LocalChain<S> {
    /// Runs a bridge state machine over `store`.
    pub fn new(store: S, cfg: Arc<BridgeCfg>) -> Self {
        Self {
            machine: Mutex::new(BridgeStateMachine::new(store)),
            cfg,
            height: AtomicU64::new(0),
        }
    }

    /// Runs `f` against the state machine.
    pub async fn inspect<R>(&self, f: impl FnOnce(&BridgeStateMachine<S>) -> R) -> R {
        f(&*self.machine.lock().await)
    }
}

#[async_trait]
impl<S: KvStore + 'static> DestinationChain for LocalChain<S> {
    async fn query(&self, key: &[u8]) -> Result<Option<Vec<u8>>, DestinationError> {
        self.machine
            .lock()
            .await
            .query(key)
            .map_err(|err| DestinationError::Local(err.to_string()))
    }

    async fn broadcast_tx_commit(&self, tx: &[u8]) -> Result<TxResult, DestinationError> {
        let mut machine = self.machine.lock().await;

        let checked = machine.check_tx(tx);
        if !checked.is_ok() {
            return Ok(checked);
        }

        let result = machine.deliver_tx(self.cfg.clone(), tx);
        let height = self.height.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(height, code = %result.code, "local block committed");

        Ok(result)
    }

    async fn latest_height(&self) -> Result<u64, DestinationError> {
        Ok(self.height.load(Ordering::SeqCst))
    }
}
