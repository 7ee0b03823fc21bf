//! The relay loops.

use std::{sync::Arc, time::Duration};

use bridge_codemap::Codemap;
use bridge_primitives::{
    filter::EventFilter,
    header::{Header, RawHeader},
    receipt::Receipt,
};
use bridge_receipt_proof::ReceiptProof;
use bridge_sm::{PacketPostTx, RegisterContractTx, ResultCode, TxResult, UpdateChainTx};
use futures::StreamExt;
use tokio::{sync::watch, time};
use tracing::{debug, error, info, warn};

use crate::{
    config::{ContractEntry, RelayConfig},
    destination::{DestinationChain, DestinationExt},
    errors::RelayerError,
    source::{LocatedLog, SourceChain},
    submitter::Submitter,
};

/// Drives headers and proven events from the source chain into the destination chain.
#[derive(Debug)]
pub struct RelayOrchestrator<Src, Dst> {
    source: Arc<Src>,
    destination: Arc<Dst>,
    submitter: Submitter,
    cfg: RelayConfig,
    filters: Vec<EventFilter>,

    /// Highest finalized height whose events have been posted.
    last_posted: Option<u64>,
}

impl<Src, Dst> RelayOrchestrator<Src, Dst>
where
    Src: SourceChain + 'static,
    Dst: DestinationChain + 'static,
{
    /// Creates an orchestrator watching the contracts of `cfg`.
    ///
    /// Fails if a contract refers to a code missing from `codemap`.
    pub fn new(
        source: Arc<Src>,
        destination: Arc<Dst>,
        codemap: &Codemap,
        cfg: RelayConfig,
    ) -> Result<Self, RelayerError> {
        let mut filters = Vec::new();
        for ContractEntry { address, code } in &cfg.contracts {
            filters.extend(codemap.lookup(code)?.query_descriptors(*address));
        }

        Ok(Self {
            submitter: Submitter::new(destination.clone()),
            source,
            destination,
            cfg,
            filters,
            last_posted: None,
        })
    }

    /// Filters the source chain is scanned with.
    pub fn filters(&self) -> &[EventFilter] {
        &self.filters
    }

    /// Highest height whose events have been posted.
    pub fn last_posted(&self) -> Option<u64> {
        self.last_posted
    }

    /// Registers the configured contracts.
    ///
    /// Posting restarts from genesis; the destination refuses packets it has already applied.
    pub async fn bootstrap(&mut self) -> Result<(), RelayerError> {
        for ContractEntry { address, code } in &self.cfg.contracts {
            let result = self
                .submitter
                .submit(RegisterContractTx {
                    address: *address,
                    code_id: code.clone(),
                })
                .await?;
            if !result.is_ok() {
                error!(%address, %code, %result, "contract registration refused");
                return Err(RelayerError::Rejected(result));
            }
        }

        self.last_posted = None;
        info!(
            contracts = self.cfg.contracts.len(),
            filters = self.filters.len(),
            last_finalized = ?self.destination.last_finalized().await?,
            "relayer bootstrapped"
        );

        Ok(())
    }

    /// Bootstraps, then relays until the header subscription ends or a fatal error occurs.
    ///
    /// The destination loop runs alongside and is stopped when this returns.
    pub async fn run(mut self, heights: watch::Sender<Option<u64>>) -> Result<(), RelayerError> {
        self.bootstrap().await?;

        let destination_task = tokio::spawn(destination_loop(
            self.destination.clone(),
            self.cfg.destination_poll_interval,
            heights,
        ));

        let result = self.source_loop().await;
        destination_task.abort();

        result
    }

    /// Consumes new source heads one at a time.
    ///
    /// Errors while handling a head are logged and the next head is awaited; the gap is closed
    /// by the catch-up sync of a later head.
    pub async fn source_loop(&mut self) -> Result<(), RelayerError> {
        let mut heads = self.source.subscribe_new_heads().await?;

        while let Some(raw) = heads.next().await {
            if let Err(err) = self.handle_head(raw).await {
                if err.is_fatal() {
                    error!(%err, "source loop stopping");
                    return Err(err);
                }
                warn!(%err, "failed to relay head; will retry with the next one");
            }
        }

        error!("new-heads subscription closed");
        Err(RelayerError::SubscriptionClosed)
    }

    /// Relays one new head, then posts the events of every newly finalized block.
    pub async fn handle_head(&mut self, raw: RawHeader) -> Result<(), RelayerError> {
        let header = match raw.decode() {
            Ok(header) => header,
            Err(err) => {
                warn!(%err, "dropping undecodable head");
                return Ok(());
            }
        };
        debug!(%header, "new source head");

        let Some(last_finalized) = self.destination.last_finalized().await? else {
            info!(%header, "destination uninitialized; submitting head as genesis");
            self.submit_update(vec![raw]).await?;
            return self.post_finalized().await;
        };

        if self.destination.is_buffered(&header.hash).await? {
            debug!(%header, "head already submitted");
        } else if self.destination.is_buffered(&header.parent_hash).await? {
            self.submit_update(vec![raw]).await?;
        } else {
            self.sync(last_finalized, header, raw).await?;
        }

        self.post_finalized().await
    }

    /// Submits the headers between `last_finalized` and `head` in chunks, then `head` itself.
    async fn sync(
        &self,
        last_finalized: u64,
        head: Header,
        raw: RawHeader,
    ) -> Result<(), RelayerError> {
        if head.number <= last_finalized {
            warn!(%head, last_finalized, "head at or below finalized height; ignoring");
            return Ok(());
        }

        let from = last_finalized.saturating_add(1);
        info!(from, to = head.number, "catching up");
        let mut pending = Vec::new();
        for number in from..head.number {
            let missing = self.source.header_by_number(number).await?;
            if self.destination.is_buffered(&missing.hash()).await? {
                continue;
            }

            pending.push(missing);
            if pending.len() >= self.cfg.sync_chunk_size {
                self.submit_update(std::mem::take(&mut pending)).await?;
            }
        }
        pending.push(raw);

        self.submit_update(pending).await?;

        Ok(())
    }

    /// Submits one chain update. Rejections are logged and left for later heads to repair.
    async fn submit_update(&self, headers: Vec<RawHeader>) -> Result<TxResult, RelayerError> {
        let count = headers.len();
        let result = self.submitter.submit(UpdateChainTx { headers }).await?;
        if !result.is_ok() {
            warn!(count, %result, "chain update rejected");
        }

        Ok(result)
    }

    /// Posts the events of every block finalized since the last call.
    async fn post_finalized(&mut self) -> Result<(), RelayerError> {
        let Some(last_finalized) = self.destination.last_finalized().await? else {
            return Ok(());
        };

        let start = match self.last_posted {
            Some(last_posted) => match last_posted.checked_add(1) {
                Some(next) => next,
                None => return Ok(()),
            },
            None => match self.destination.genesis().await? {
                Some(genesis) => genesis.number,
                None => return Ok(()),
            },
        };

        for number in start..=last_finalized {
            self.post_block(number).await?;
            self.last_posted = Some(number);
        }

        Ok(())
    }

    /// Proves and posts every watched event of the finalized block at `number`.
    async fn post_block(&self, number: u64) -> Result<(), RelayerError> {
        if self.filters.is_empty() {
            return Ok(());
        }

        let header = self
            .destination
            .finalized_header(number)
            .await?
            .ok_or(RelayerError::MissingFinalized(number))?;

        let mut receipts: Option<Vec<Receipt>> = None;
        for filter in &self.filters {
            for located in self.source.logs(filter, number).await? {
                if receipts.is_none() {
                    receipts = Some(self.source.block_receipts(number).await?);
                }
                let Some(receipts) = receipts.as_deref() else {
                    continue;
                };

                let proof = match prove_log(receipts, &located) {
                    Ok(proof) => proof,
                    Err(err) => {
                        warn!(
                            %err,
                            block = number,
                            tx_index = located.tx_index,
                            "cannot prove log"
                        );
                        continue;
                    }
                };

                if !proof.verify(header.receipts_root) {
                    warn!(
                        block = number,
                        tx_index = located.tx_index,
                        "receipts disagree with finalized header; not posting"
                    );
                    continue;
                }

                let result = self
                    .submitter
                    .submit(PacketPostTx {
                        event_name: filter.event_name.clone(),
                        proof,
                    })
                    .await?;
                if result.is_ok() {
                    info!(block = number, event = %filter.event_name, "posted packet");
                } else if result.code == ResultCode::PacketAlreadyExists {
                    debug!(block = number, event = %filter.event_name, "packet already posted");
                } else {
                    warn!(block = number, event = %filter.event_name, %result, "packet refused");
                }
            }
        }

        Ok(())
    }
}

/// Builds the proof for `located` out of its block's receipts.
///
/// The block-wide log index is turned into the index within the receipt; if the receipts do not
/// agree with it, the log is searched for by content. A log found in neither way is an error.
pub(crate) fn prove_log(
    receipts: &[Receipt],
    located: &LocatedLog,
) -> Result<ReceiptProof, RelayerError> {
    let proof = ReceiptProof::build(receipts, located.tx_index, located.block_number)?;
    let not_found = || RelayerError::LogNotInReceipt {
        block: located.block_number,
        tx_index: located.tx_index,
    };
    let tx_index = usize::try_from(located.tx_index).map_err(|_| not_found())?;
    let receipt = receipts.get(tx_index).ok_or_else(not_found)?;

    let preceding: u64 = receipts[..tx_index]
        .iter()
        .map(|r| r.logs.len() as u64)
        .sum();
    let by_position = located
        .log_index
        .checked_sub(preceding)
        .and_then(|i| usize::try_from(i).ok())
        .filter(|&i| receipt.logs.get(i) == Some(&located.log));
    let index = by_position
        .or_else(|| receipt.logs.iter().position(|log| log == &located.log))
        .and_then(|i| u32::try_from(i).ok())
        .ok_or_else(not_found)?;

    Ok(proof.with_log_index(index))
}

/// Polls the destination's height and publishes it on `heights`.
///
/// Observation only; failures are logged and polling carries on.
pub async fn destination_loop<D: DestinationChain + ?Sized>(
    destination: Arc<D>,
    interval: Duration,
    heights: watch::Sender<Option<u64>>,
) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match destination.latest_height().await {
            Ok(height) => {
                if *heights.borrow() != Some(height) {
                    debug!(height, "destination height");
                }
                heights.send_replace(Some(height));
            }
            Err(err) => warn!(%err, "failed to poll destination height"),
        }
    }
}
