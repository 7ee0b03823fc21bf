use alloy_primitives::B256;
use bridge_db::{CachedStore, KvStore, KvStoreExt, WriteBatch};
use bridge_primitives::header::Header;
use tracing::{debug, info, warn};

use crate::{
    errors::{HeaderChainError, HeaderChainResult},
    keys::{buffer_key, final_key, GENESIS_KEY, LAST_FINALIZED_KEY},
};

/// Outcome of an accepted batch of headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainUpdate {
    /// Number of headers newly added to the buffer.
    pub buffered: usize,

    /// Headers finalized by the batch, highest first.
    pub finalized: Vec<Header>,

    /// Finalized frontier after the batch.
    pub last_finalized: u64,
}

/// Header buffer and finalized index over a key-value store.
///
/// Individual operations write straight to the store. [`HeaderChainStore::update`] is atomic:
/// it stages its writes and commits them only when the whole batch is accepted.
#[derive(Debug, Clone)]
pub struct HeaderChainStore<S> {
    store: S,
    confirmations: u64,
}

impl<S: KvStore> HeaderChainStore<S> {
    /// Creates a view over `store` that finalizes headers `confirmations` blocks deep.
    ///
    /// A header counts as its own first confirmation, so a depth of 1 finalizes the tip.
    pub fn new(store: S, confirmations: u64) -> Self {
        Self {
            store,
            confirmations,
        }
    }

    /// Confirmation depth used by [`Self::update`].
    pub fn confirmations(&self) -> u64 {
        self.confirmations
    }

    /// Returns the backing store.
    pub fn into_inner(self) -> S {
        self.store
    }

    /// Whether a genesis header is set.
    pub fn is_initialized(&self) -> HeaderChainResult<bool> {
        Ok(self.store.contains(GENESIS_KEY)?)
    }

    /// Returns the genesis header.
    pub fn genesis(&self) -> HeaderChainResult<Header> {
        self.store
            .get_value(GENESIS_KEY)?
            .ok_or(HeaderChainError::NotInitialized)
    }

    /// Sets `genesis` as the trust anchor, buffering and finalizing it.
    pub fn initialize(&self, genesis: &Header) -> HeaderChainResult<()> {
        if self.is_initialized()? {
            return Err(HeaderChainError::AlreadyInitialized);
        }

        let mut batch = WriteBatch::new();
        batch.put_value(GENESIS_KEY, genesis)?;
        batch.put_value(buffer_key(&genesis.hash), genesis)?;
        batch.put_value(final_key(genesis.number), genesis)?;
        batch.put_value(LAST_FINALIZED_KEY, &genesis.number)?;
        self.store.write(batch)?;

        info!(%genesis, "initialized header chain");
        Ok(())
    }

    /// Adds `header` to the buffer without checking its ancestry.
    pub fn to_buffer(&self, header: &Header) -> HeaderChainResult<()> {
        let key = buffer_key(&header.hash);
        if self.store.contains(&key)? {
            return Err(HeaderChainError::DuplicateHeader(header.hash));
        }

        self.store.put_value(&key, header)?;
        debug!(%header, "buffered header");
        Ok(())
    }

    /// Looks up a buffered header by hash.
    pub fn buffered(&self, hash: &B256) -> HeaderChainResult<Option<Header>> {
        Ok(self.store.get_value(&buffer_key(hash))?)
    }

    /// Whether a header with `hash` is buffered.
    pub fn is_buffered(&self, hash: &B256) -> HeaderChainResult<bool> {
        Ok(self.store.contains(&buffer_key(hash))?)
    }

    /// Returns the buffered parent of `header`.
    pub fn parent(&self, header: &Header) -> HeaderChainResult<Header> {
        self.buffered(&header.parent_hash)?
            .ok_or(HeaderChainError::ParentNotFound(header.parent_hash))
    }

    /// Walks up to `steps` parent links from `header`, stopping early at genesis.
    pub fn ancestor(&self, header: &Header, steps: u64) -> HeaderChainResult<Header> {
        let genesis = self.genesis()?;

        let mut cursor = *header;
        for _ in 0..steps {
            if cursor.hash == genesis.hash {
                break;
            }
            cursor = self.parent(&cursor)?;
        }

        Ok(cursor)
    }

    /// Marks `header` final at its height.
    ///
    /// Finalizing the header already final at that height is a no-op; finalizing a different
    /// one is refused.
    pub fn finalize(&self, header: &Header) -> HeaderChainResult<()> {
        if let Some(existing) = self.finalized(header.number)? {
            if existing.hash == header.hash {
                return Ok(());
            }
            return Err(HeaderChainError::AlreadyFinalized {
                number: header.number,
                existing: existing.hash,
            });
        }

        let mut batch = WriteBatch::new();
        batch.put_value(final_key(header.number), header)?;
        let last = self.store.get_value::<u64>(LAST_FINALIZED_KEY)?;
        if last.map_or(true, |last| header.number > last) {
            batch.put_value(LAST_FINALIZED_KEY, &header.number)?;
        }
        self.store.write(batch)?;

        Ok(())
    }

    /// Returns the header finalized at `number`, if any.
    pub fn finalized(&self, number: u64) -> HeaderChainResult<Option<Header>> {
        Ok(self.store.get_value(&final_key(number))?)
    }

    /// Height of the finalized frontier.
    pub fn last_finalized(&self) -> HeaderChainResult<u64> {
        if !self.is_initialized()? {
            return Err(HeaderChainError::NotInitialized);
        }

        self.store
            .get_value(LAST_FINALIZED_KEY)?
            .ok_or(HeaderChainError::NotInitialized)
    }

    /// Header at the finalized frontier.
    pub fn last_finalized_header(&self) -> HeaderChainResult<Header> {
        let number = self.last_finalized()?;
        self.finalized(number)?
            .ok_or(HeaderChainError::NotInitialized)
    }

    /// Applies a batch of consecutive headers.
    ///
    /// Every new header of the batch is buffered. The batch must be internally linked, and the
    /// confirmed ancestor of its first header must not lie beyond the height right after the
    /// finalized frontier. The confirmed ancestor of its last header, and every header between
    /// it and the frontier, are then finalized highest first. Nothing is written unless the
    /// whole batch is accepted.
    pub fn update(&self, headers: &[Header]) -> HeaderChainResult<ChainUpdate> {
        let staged = HeaderChainStore::new(CachedStore::new(&self.store), self.confirmations);
        let update = staged.apply_update(headers)?;
        staged.store.commit()?;

        Ok(update)
    }

    fn apply_update(&self, headers: &[Header]) -> HeaderChainResult<ChainUpdate> {
        let (Some(first), Some(last)) = (headers.first(), headers.last()) else {
            return Err(HeaderChainError::NonContiguousHeaderList(
                "empty header list".to_string(),
            ));
        };

        if let Some(pair) = headers.windows(2).find(|pair| !pair[1].extends(&pair[0])) {
            return Err(HeaderChainError::NonContiguousHeaderList(format!(
                "{} does not extend {}",
                pair[1], pair[0]
            )));
        }

        let last_finalized = self.last_finalized()?;

        if let Some(parent) = self.buffered(&first.parent_hash)? {
            if !first.extends(&parent) {
                return Err(HeaderChainError::NonContiguousHeaderList(format!(
                    "{first} does not extend {parent}"
                )));
            }
        }

        let mut buffered = 0;
        for header in headers {
            if self.is_buffered(&header.hash)? {
                debug!(%header, "header already buffered");
                continue;
            }
            self.to_buffer(header)?;
            buffered += 1;
        }

        let steps = self.confirmations.saturating_sub(1);

        let from = self.ancestor(first, steps).map_err(unlinked)?;
        if from.number > last_finalized.saturating_add(1) {
            return Err(HeaderChainError::NonContiguousHeaderList(format!(
                "confirmed ancestor {from} skips past finalized height {last_finalized}"
            )));
        }

        let to = self.ancestor(last, steps).map_err(unlinked)?;
        if to.number <= last_finalized {
            return match self.finalized(to.number)? {
                Some(existing) if existing.hash == to.hash => Ok(ChainUpdate {
                    buffered,
                    finalized: Vec::new(),
                    last_finalized,
                }),
                _ => {
                    warn!(%to, "confirmed ancestor conflicts with finalized chain");
                    Err(HeaderChainError::ConflictingChain(to.number))
                }
            };
        }

        let mut path = Vec::new();
        let mut cursor = to;
        while cursor.number > last_finalized {
            path.push(cursor);
            cursor = self.parent(&cursor).map_err(unlinked)?;
        }

        let frontier = self.last_finalized_header()?;
        if cursor.hash != frontier.hash {
            warn!(%cursor, %frontier, "batch does not descend from the finalized frontier");
            return Err(HeaderChainError::ConflictingChain(last_finalized));
        }

        for header in &path {
            self.finalize(header).map_err(|err| match err {
                HeaderChainError::AlreadyFinalized { number, .. } => {
                    HeaderChainError::ConflictingChain(number)
                }
                other => other,
            })?;
            info!(%header, "finalized header");
        }

        Ok(ChainUpdate {
            buffered,
            finalized: path,
            last_finalized: to.number,
        })
    }
}

fn unlinked(err: HeaderChainError) -> HeaderChainError {
    match err {
        HeaderChainError::ParentNotFound(hash) => {
            HeaderChainError::NonContiguousHeaderList(format!("missing ancestor {hash}"))
        }
        other => other,
    }
}
