use alloy_primitives::{Address, U256};
use bridge_codemap::{CodeError, Denom, PacketContext, Payload};
use bridge_db::{KvStore, KvStoreExt, WriteBatch};

use crate::keys::{balance_key, packet_key};

/// Packet ledger and balances, read and written through the transaction's store.
#[derive(Debug)]
pub(crate) struct StoreContext<'a, S> {
    store: &'a S,
}

impl<'a, S: KvStore> StoreContext<'a, S> {
    pub(crate) fn new(store: &'a S) -> Self {
        Self { store }
    }
}

/// Reads a balance; absent entries are zero.
pub(crate) fn read_balance<S: KvStore + ?Sized>(
    store: &S,
    account: &Address,
    denom: &Denom,
) -> Result<U256, bridge_db::DbError> {
    Ok(store
        .get(&balance_key(account, denom))?
        .and_then(|bytes| U256::try_from_be_slice(&bytes))
        .unwrap_or_default())
}

impl<S: KvStore> PacketContext for StoreContext<'_, S> {
    fn has_packet(&self, contract: Address, sequence: u64) -> Result<bool, CodeError> {
        Ok(self.store.contains(&packet_key(&contract, sequence))?)
    }

    fn record_packet(&mut self, contract: Address, payload: &Payload) -> Result<(), CodeError> {
        self.store
            .put_value(&packet_key(&contract, payload.sequence()), payload)?;
        Ok(())
    }

    fn credit(&mut self, account: Address, denom: Denom, amount: U256) -> Result<(), CodeError> {
        let balance = read_balance(self.store, &account, &denom)?;
        let balance = balance.checked_add(amount).ok_or(CodeError::Overflow)?;

        let mut batch = WriteBatch::new();
        batch.put(balance_key(&account, &denom), balance.to_be_bytes::<32>().to_vec());
        self.store.write(batch)?;

        Ok(())
    }
}
