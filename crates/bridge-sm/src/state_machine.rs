//! The bridge state machine.

use std::{fmt, sync::Arc};

use alloy_primitives::Address;
use bridge_codemap::{Denom, EventKind};
use bridge_db::{CachedStore, KvStore, KvStoreExt};
use bridge_header_chain::{ChainUpdate, HeaderChainStore};
use bridge_primitives::header::{Header, RawHeader};
use tracing::{debug, info, warn};

use crate::{
    config::BridgeCfg,
    errors::BridgeError,
    keys::contract_key,
    ledger::{read_balance, StoreContext},
    result::TxResult,
    tx::{BridgeTx, PacketPostTx, RegisterContractTx, UpdateChainTx},
};

/// A machine that consumes events and produces an output or an error.
pub trait StateMachine {
    /// Static configuration passed along with every event.
    type Config;

    /// Events the machine consumes.
    type Event;

    /// Output of an accepted event.
    type Output;

    /// Reason an event is rejected.
    type Error;

    /// Applies `event`. On error the machine's state must be unchanged.
    fn process_event(
        &mut self,
        cfg: Self::Config,
        event: Self::Event,
    ) -> Result<Self::Output, Self::Error>;
}

/// What an accepted transaction did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxOutput {
    /// The header chain was bootstrapped with this genesis.
    Initialized(Header),

    /// Headers were buffered and possibly finalized.
    ChainUpdated(ChainUpdate),

    /// A contract registration was recorded, or confirmed if it already existed.
    ContractRegistered {
        /// Contract address.
        address: Address,
        /// Whether the registration is new.
        created: bool,
    },

    /// A packet was applied.
    PacketApplied {
        /// Emitting contract.
        contract: Address,
        /// Packet sequence.
        sequence: u64,
        /// Event the packet was decoded as.
        event: EventKind,
    },
}

impl fmt::Display for TxOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initialized(genesis) => write!(f, "initialized at {genesis}"),
            Self::ChainUpdated(update) => write!(
                f,
                "buffered {} headers, finalized {}, last finalized {}",
                update.buffered,
                update.finalized.len(),
                update.last_finalized
            ),
            Self::ContractRegistered { address, created } => {
                if *created {
                    write!(f, "registered {address}")
                } else {
                    write!(f, "{address} already registered")
                }
            }
            Self::PacketApplied {
                contract,
                sequence,
                event,
            } => write!(f, "applied {} {sequence} from {contract}", event.name()),
        }
    }
}

/// State machine over the bridge's slice of the destination chain's store.
///
/// Not reentrant: callers must serialize transactions against the same store.
#[derive(Debug, Clone)]
pub struct BridgeStateMachine<S> {
    store: S,
}

impl<S: KvStore> BridgeStateMachine<S> {
    /// Creates a machine over `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read-only view of the header chain.
    pub fn header_chain(&self, cfg: &BridgeCfg) -> HeaderChainStore<&S> {
        HeaderChainStore::new(&self.store, cfg.confirmations)
    }

    /// Seeds the header chain with `genesis`.
    pub fn initialize(&mut self, cfg: &BridgeCfg, genesis: &RawHeader) -> Result<(), BridgeError> {
        let genesis = genesis
            .decode()
            .map_err(|err| BridgeError::Malformed(err.to_string()))?;
        self.header_chain(cfg).initialize(&genesis)?;

        Ok(())
    }

    /// Raw read of a key, as served to clients.
    pub fn query(&self, key: &[u8]) -> Result<Option<Vec<u8>>, BridgeError> {
        Ok(self.store.get(key)?)
    }

    /// Code the contract at `address` is registered under.
    pub fn registered_code(&self, address: &Address) -> Result<Option<String>, BridgeError> {
        Ok(self.store.get_value(&contract_key(address))?)
    }

    /// Balance of `account` in `denom`.
    pub fn balance(
        &self,
        account: &Address,
        denom: &Denom,
    ) -> Result<alloy_primitives::U256, BridgeError> {
        Ok(read_balance(&self.store, account, denom)?)
    }

    /// Decodes and validates a transaction without applying it.
    pub fn check_tx(&self, tx_bytes: &[u8]) -> TxResult {
        match BridgeTx::decode(tx_bytes).and_then(|tx| tx.validate_basic().map(|_| tx)) {
            Ok(tx) => TxResult::ok(tx.to_string()),
            Err(err) => err.into(),
        }
    }

    /// Decodes and applies a transaction, reporting the outcome.
    pub fn deliver_tx(&mut self, cfg: Arc<BridgeCfg>, tx_bytes: &[u8]) -> TxResult {
        let tx = match BridgeTx::decode(tx_bytes) {
            Ok(tx) => tx,
            Err(err) => {
                warn!(%err, "undecodable transaction");
                return err.into();
            }
        };

        let kind = tx.kind();
        match self.process_event(cfg, tx) {
            Ok(output) => {
                info!(%kind, %output, "applied transaction");
                TxResult::ok(output.to_string())
            }
            Err(err) => {
                warn!(%kind, code = %err.code(), %err, "rejected transaction");
                err.into()
            }
        }
    }
}

impl<S: KvStore> StateMachine for BridgeStateMachine<S> {
    type Config = Arc<BridgeCfg>;
    type Event = BridgeTx;
    type Output = TxOutput;
    type Error = BridgeError;

    fn process_event(
        &mut self,
        cfg: Self::Config,
        event: Self::Event,
    ) -> Result<Self::Output, Self::Error> {
        event.validate_basic()?;

        let cache = CachedStore::new(&self.store);
        let output = match event {
            BridgeTx::UpdateChain(tx) => update_chain(&cfg, &cache, tx)?,
            BridgeTx::RegisterContract(tx) => register_contract(&cfg, &cache, tx)?,
            BridgeTx::PacketPost(tx) => packet_post(&cfg, &cache, tx)?,
        };
        cache.commit()?;

        Ok(output)
    }
}

fn update_chain<S: KvStore>(
    cfg: &BridgeCfg,
    store: &S,
    tx: UpdateChainTx,
) -> Result<TxOutput, BridgeError> {
    let headers = tx
        .headers
        .iter()
        .map(RawHeader::decode)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| BridgeError::Malformed(err.to_string()))?;

    let chain = HeaderChainStore::new(store, cfg.confirmations);
    if chain.is_initialized()? {
        return Ok(TxOutput::ChainUpdated(chain.update(&headers)?));
    }

    let Some((genesis, rest)) = headers.split_first() else {
        return Err(BridgeError::Malformed("empty header list".to_string()));
    };
    chain.initialize(genesis)?;
    if rest.is_empty() {
        return Ok(TxOutput::Initialized(*genesis));
    }

    Ok(TxOutput::ChainUpdated(chain.update(rest)?))
}

fn register_contract<S: KvStore>(
    cfg: &BridgeCfg,
    store: &S,
    tx: RegisterContractTx,
) -> Result<TxOutput, BridgeError> {
    cfg.codemap.lookup(&tx.code_id)?;

    let key = contract_key(&tx.address);
    match store.get_value::<String>(&key)? {
        Some(registered) if registered == tx.code_id => {
            debug!(address = %tx.address, code = %tx.code_id, "contract already registered");
            Ok(TxOutput::ContractRegistered {
                address: tx.address,
                created: false,
            })
        }
        Some(registered) => Err(BridgeError::ContractCodeMismatch {
            address: tx.address,
            registered,
            requested: tx.code_id,
        }),
        None => {
            store.put_value(&key, &tx.code_id)?;
            Ok(TxOutput::ContractRegistered {
                address: tx.address,
                created: true,
            })
        }
    }
}

fn packet_post<S: KvStore>(
    cfg: &BridgeCfg,
    store: &S,
    tx: PacketPostTx,
) -> Result<TxOutput, BridgeError> {
    let block_number = tx.proof.block_number;
    let chain = HeaderChainStore::new(store, cfg.confirmations);
    let header = chain
        .finalized(block_number)?
        .ok_or(BridgeError::BlockNotFinalized(block_number))?;

    if !tx.proof.verify(header.receipts_root) {
        return Err(BridgeError::InvalidProof(block_number));
    }

    let log = tx.proof.extract_log()?;
    let contract = log.address;
    let code_id = store
        .get_value::<String>(&contract_key(&contract))?
        .ok_or(BridgeError::ContractNotRegistered(contract))?;
    let code = cfg.codemap.lookup(&code_id)?;

    let payload = code.decode(&tx.event_name, &log)?;
    code.apply(&mut StoreContext::new(store), contract, &payload)?;

    Ok(TxOutput::PacketApplied {
        contract,
        sequence: payload.sequence(),
        event: payload.event_kind(),
    })
}
