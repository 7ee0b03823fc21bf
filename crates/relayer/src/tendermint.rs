//! Destination-chain client over Tendermint RPC.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use bridge_sm::{ResultCode, TxResult};
use jsonrpsee::{
    core::{client::ClientT, params::ObjectParams},
    http_client::{HttpClient, HttpClientBuilder},
    rpc_params,
};
use serde::Deserialize;
use tracing::debug;

use crate::{config::DestinationRpcConfig, destination::DestinationChain, errors::DestinationError};

/// ABCI query path under which the application serves raw store reads.
pub const ABCI_QUERY_PATH: &str = "/store";

#[derive(Debug, Deserialize)]
struct AbciQueryResponse {
    response: AbciQueryResult,
}

#[derive(Debug, Deserialize)]
struct AbciQueryResult {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    log: String,
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AbciTxResult {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    log: String,
}

impl From<AbciTxResult> for TxResult {
    fn from(res: AbciTxResult) -> Self {
        TxResult {
            code: ResultCode::from_u32(res.code).unwrap_or(ResultCode::Internal),
            log: res.log,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BroadcastCommitResponse {
    check_tx: AbciTxResult,
    #[serde(default, alias = "tx_result")]
    deliver_tx: AbciTxResult,
    #[serde(default)]
    hash: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    sync_info: SyncInfo,
}

#[derive(Debug, Deserialize)]
struct SyncInfo {
    latest_block_height: String,
}

/// Destination chain reached over a Tendermint node's RPC endpoint.
#[derive(Debug, Clone)]
pub struct TendermintRpc {
    client: HttpClient,
}

impl TendermintRpc {
    /// Creates a client for the node at `cfg.url`.
    pub fn new(cfg: &DestinationRpcConfig) -> Result<Self, DestinationError> {
        let client = HttpClientBuilder::default().build(&cfg.url)?;
        Ok(Self { client })
    }
}

fn decode_query(result: AbciQueryResult) -> Result<Option<Vec<u8>>, DestinationError> {
    if result.code != 0 {
        return Err(DestinationError::Query {
            code: result.code,
            log: result.log,
        });
    }

    match result.value.filter(|value| !value.is_empty()) {
        Some(value) => Ok(Some(STANDARD.decode(value)?)),
        None => Ok(None),
    }
}

fn commit_result(res: BroadcastCommitResponse) -> TxResult {
    if res.check_tx.code != 0 {
        return res.check_tx.into();
    }
    res.deliver_tx.into()
}

#[async_trait]
impl DestinationChain for TendermintRpc {
    async fn query(&self, key: &[u8]) -> Result<Option<Vec<u8>>, DestinationError> {
        let mut params = ObjectParams::new();
        params
            .insert("path", ABCI_QUERY_PATH)
            .and_then(|_| params.insert("data", hex::encode(key)))
            .and_then(|_| params.insert("prove", false))
            .map_err(|err| DestinationError::Response(err.to_string()))?;

        let res: AbciQueryResponse = self.client.request("abci_query", params).await?;
        decode_query(res.response)
    }

    async fn broadcast_tx_commit(&self, tx: &[u8]) -> Result<TxResult, DestinationError> {
        let mut params = ObjectParams::new();
        params
            .insert("tx", STANDARD.encode(tx))
            .map_err(|err| DestinationError::Response(err.to_string()))?;

        let res: BroadcastCommitResponse =
            self.client.request("broadcast_tx_commit", params).await?;
        debug!(hash = %res.hash, "transaction committed");

        Ok(commit_result(res))
    }

    async fn latest_height(&self) -> Result<u64, DestinationError> {
        let res: StatusResponse = self.client.request("status", rpc_params![]).await?;
        res.sync_info
            .latest_block_height
            .parse()
            .map_err(|_| DestinationError::Response(res.sync_info.latest_block_height))
    }
}
