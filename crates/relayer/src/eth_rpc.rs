//! Source-chain client over a node's JSON-RPC interface.

use alloy_primitives::{Address, Bytes, B256, U64};
use async_trait::async_trait;
use bridge_primitives::{
    filter::EventFilter,
    header::RawHeader,
    receipt::{Log, Receipt},
};
use jsonrpsee::{
    core::client::ClientT,
    http_client::{HttpClient, HttpClientBuilder},
    rpc_params,
};
use serde::{Deserialize, Serialize};
use tokio::{
    sync::{mpsc, Mutex},
    task::{self, JoinHandle},
    time,
};
use tracing::{debug, info, warn};

use crate::{
    config::SourceRpcConfig,
    errors::SourceError,
    source::{LocatedLog, SourceChain},
    subscription::Subscription,
};

/// Formats a height as a JSON-RPC quantity.
fn quantity(number: u64) -> String {
    format!("{number:#x}")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LogQuery {
    from_block: String,
    to_block: String,
    address: Address,
    topics: Vec<B256>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcLog {
    address: Address,
    topics: Vec<B256>,
    data: Bytes,
    transaction_index: U64,
    log_index: U64,
    #[serde(default)]
    removed: bool,
}

/// Source chain reached over HTTP JSON-RPC.
///
/// New heads are discovered by polling `eth_blockNumber`; the node must expose the `debug`
/// namespace for raw headers and receipts.
#[derive(Debug)]
pub struct EthRpcSource {
    client: HttpClient,
    cfg: SourceRpcConfig,
    pollers: Mutex<Vec<JoinHandle<()>>>,
}

impl Drop for EthRpcSource {
    fn drop(&mut self) {
        for handle in self.pollers.get_mut().drain(..) {
            handle.abort();
        }
    }
}

impl EthRpcSource {
    /// Creates a client for the node at `cfg.url`.
    pub fn new(cfg: SourceRpcConfig) -> Result<Self, SourceError> {
        let client = HttpClientBuilder::default().build(&cfg.url)?;

        Ok(Self {
            client,
            cfg,
            pollers: Mutex::new(Vec::new()),
        })
    }
}

async fn fetch_block_number(client: &HttpClient) -> Result<u64, SourceError> {
    let number: U64 = client.request("eth_blockNumber", rpc_params![]).await?;
    Ok(number.to::<u64>())
}

async fn fetch_raw_header(client: &HttpClient, number: u64) -> Result<RawHeader, SourceError> {
    let raw: Option<Bytes> = client
        .request("debug_getRawHeader", rpc_params![quantity(number)])
        .await?;

    raw.filter(|bytes| !bytes.is_empty())
        .map(RawHeader)
        .ok_or(SourceError::BlockNotFound(number))
}

/// Feeds every head above the node's current one into `sender` until the receiver goes away.
async fn poll_new_heads(
    client: HttpClient,
    interval: time::Duration,
    sender: mpsc::UnboundedSender<RawHeader>,
) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
    let mut next: Option<u64> = None;

    loop {
        ticker.tick().await;

        let latest = match fetch_block_number(&client).await {
            Ok(latest) => latest,
            Err(err) => {
                warn!(%err, "failed to poll source head");
                continue;
            }
        };

        let from = *next.get_or_insert(latest);
        for number in from..=latest {
            match fetch_raw_header(&client, number).await {
                Ok(raw) => {
                    debug!(number, hash = %raw.hash(), "new source head");
                    if sender.send(raw).is_err() {
                        debug!("head subscriber gone; poller exiting");
                        return;
                    }
                    next = Some(number + 1);
                }
                Err(err) => {
                    warn!(%err, number, "failed to fetch source header");
                    break;
                }
            }
        }
    }
}

#[async_trait]
impl SourceChain for EthRpcSource {
    async fn subscribe_new_heads(&self) -> Result<Subscription<RawHeader>, SourceError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = task::spawn(poll_new_heads(
            self.client.clone(),
            self.cfg.poll_interval,
            sender,
        ));
        self.pollers.lock().await.push(handle);

        info!(
            url = %self.cfg.url,
            interval = ?self.cfg.poll_interval,
            "polling source for new heads"
        );
        Ok(Subscription::from_receiver(receiver))
    }

    async fn header_by_number(&self, number: u64) -> Result<RawHeader, SourceError> {
        fetch_raw_header(&self.client, number).await
    }

    async fn logs(
        &self,
        filter: &EventFilter,
        block_number: u64,
    ) -> Result<Vec<LocatedLog>, SourceError> {
        let query = LogQuery {
            from_block: quantity(block_number),
            to_block: quantity(block_number),
            address: filter.address,
            topics: vec![filter.topic0],
        };
        let logs: Vec<RpcLog> = self.client.request("eth_getLogs", rpc_params![query]).await?;

        Ok(logs
            .into_iter()
            .filter(|log| !log.removed)
            .map(|log| LocatedLog {
                log: Log {
                    address: log.address,
                    topics: log.topics,
                    data: log.data,
                },
                block_number,
                tx_index: log.transaction_index.to::<u64>(),
                log_index: log.log_index.to::<u64>(),
            })
            .filter(|located| filter.matches(&located.log))
            .collect())
    }

    async fn block_receipts(&self, block_number: u64) -> Result<Vec<Receipt>, SourceError> {
        let raw: Vec<Bytes> = self
            .client
            .request("debug_getRawReceipts", rpc_params![quantity(block_number)])
            .await?;

        Ok(raw
            .iter()
            .map(|bytes| Receipt::decode_2718(bytes))
            .collect::<Result<_, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantities_are_minimal_hex() {
        assert_eq!(quantity(0), "0x0");
        assert_eq!(quantity(255), "0xff");
        assert_eq!(quantity(4_370_000), "0x42ae50");
    }

    #[test]
    fn log_query_uses_rpc_field_names() {
        let query = LogQuery {
            from_block: quantity(16),
            to_block: quantity(16),
            address: Address::repeat_byte(1),
            topics: vec![B256::repeat_byte(2)],
        };
        let json = serde_json::to_value(&query).unwrap();

        assert_eq!(json["fromBlock"], "0x10");
        assert_eq!(json["toBlock"], "0x10");
        assert_eq!(json["topics"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn rpc_log_parses_node_response() {
        let json = r#"{
            "address": "0x0101010101010101010101010101010101010101",
            "topics": ["0x0202020202020202020202020202020202020202020202020202020202020202"],
            "data": "0x00ff",
            "blockNumber": "0x10",
            "transactionIndex": "0x3",
            "logIndex": "0x7",
            "removed": false
        }"#;
        let log: RpcLog = serde_json::from_str(json).unwrap();

        assert_eq!(log.address, Address::repeat_byte(1));
        assert_eq!(log.transaction_index.to::<u64>(), 3);
        assert_eq!(log.log_index.to::<u64>(), 7);
        assert_eq!(log.data.as_ref(), &[0x00, 0xff]);
    }
}
