//! Serialized submission of transactions to the destination chain.

use std::sync::Arc;

use bridge_sm::{BridgeTx, TxResult};
use futures::channel::oneshot;
use tokio::{
    sync::mpsc::{unbounded_channel, UnboundedSender},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    destination::DestinationChain,
    errors::{DestinationError, RelayerError},
};

/// A request to broadcast one encoded transaction.
struct SubmitJob {
    /// Human-readable summary, for logs.
    summary: String,

    /// The encoded transaction.
    tx: Vec<u8>,

    /// The channel the outcome is published on.
    respond_on: oneshot::Sender<Result<TxResult, DestinationError>>,
}

/// Single writer to the destination chain.
///
/// Jobs are broadcast one at a time in the order they were handed in, so that an update is always
/// committed before the packet posts that depend on it.
#[derive(Debug)]
pub struct Submitter {
    new_jobs_sender: UnboundedSender<SubmitJob>,
    driver: JoinHandle<()>,
}

impl Submitter {
    /// Starts the submission task over `destination`.
    pub fn new<D: DestinationChain + ?Sized + 'static>(destination: Arc<D>) -> Self {
        let (new_jobs_sender, mut new_jobs_receiver) = unbounded_channel::<SubmitJob>();

        let driver = tokio::task::spawn(async move {
            while let Some(job) = new_jobs_receiver.recv().await {
                debug!(tx = %job.summary, "broadcasting transaction");
                let result = destination.broadcast_tx_commit(&job.tx).await;
                match &result {
                    Ok(res) if res.is_ok() => {
                        info!(tx = %job.summary, %res, "transaction committed")
                    }
                    Ok(res) => warn!(tx = %job.summary, %res, "transaction rejected"),
                    Err(err) => warn!(tx = %job.summary, %err, "broadcast failed"),
                }

                // the caller may have given up on the result
                let _ = job.respond_on.send(result);
            }

            debug!("submission channel closed; submitter exiting");
        });

        Self {
            new_jobs_sender,
            driver,
        }
    }

    /// Broadcasts `tx` once every previously handed-in transaction is done and returns its
    /// outcome.
    pub async fn submit(&self, tx: impl Into<BridgeTx>) -> Result<TxResult, RelayerError> {
        let tx = tx.into();
        let (sender, receiver) = oneshot::channel();
        let job = SubmitJob {
            summary: tx.to_string(),
            tx: tx.encode()?,
            respond_on: sender,
        };

        self.new_jobs_sender
            .send(job)
            .map_err(|_| RelayerError::SubmitterAborted)?;

        match receiver.await {
            Ok(result) => Ok(result?),
            Err(_) => Err(RelayerError::SubmitterAborted),
        }
    }
}

impl Drop for Submitter {
    fn drop(&mut self) {
        self.driver.abort();
    }
}
