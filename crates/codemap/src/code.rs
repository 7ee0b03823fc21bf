use std::{fmt, str::FromStr};

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::SolEvent;
use bridge_primitives::{filter::EventFilter, receipt::Log};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    abi,
    errors::CodeError,
    payload::{DataPacket, Denom, Payload, TokenDeposit},
};

/// State a code reads and writes when a packet is applied.
///
/// Implemented by the destination state machine over its store.
pub trait PacketContext {
    /// Whether the packet `(contract, sequence)` was applied before.
    fn has_packet(&self, contract: Address, sequence: u64) -> Result<bool, CodeError>;

    /// Records `payload` as applied.
    fn record_packet(&mut self, contract: Address, payload: &Payload) -> Result<(), CodeError>;

    /// Credits `amount` of `denom` to `account`.
    fn credit(&mut self, account: Address, denom: Denom, amount: U256) -> Result<(), CodeError>;
}

/// Every event shape understood by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `Deposit(address indexed from, address to, uint256 value, address token, uint64 sequence)`
    Deposit,

    /// `DataSubmitted(address indexed submitter, bytes data, uint64 sequence)`
    DataSubmitted,
}

impl EventKind {
    /// Event name as it appears in the ABI.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Deposit => "Deposit",
            Self::DataSubmitted => "DataSubmitted",
        }
    }

    /// Hash of the event signature, i.e. the first topic of its logs.
    pub fn signature_hash(&self) -> B256 {
        match self {
            Self::Deposit => abi::Deposit::SIGNATURE_HASH,
            Self::DataSubmitted => abi::DataSubmitted::SIGNATURE_HASH,
        }
    }

    fn decode(&self, log: &Log) -> Result<Payload, CodeError> {
        let topics = log.topics.iter().copied();
        let payload = match self {
            Self::Deposit => {
                let event = abi::Deposit::decode_raw_log(topics, &log.data)?;
                Payload::Deposit(TokenDeposit {
                    from: event.from,
                    to: event.to,
                    value: event.value,
                    token: event.token,
                    sequence: event.sequence,
                })
            }
            Self::DataSubmitted => {
                let event = abi::DataSubmitted::decode_raw_log(topics, &log.data)?;
                Payload::Data(DataPacket {
                    submitter: event.submitter,
                    data: event.data,
                    sequence: event.sequence,
                })
            }
        };

        Ok(payload)
    }
}

/// Built-in contract codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeKind {
    /// Token bridge: deposits credit balances.
    Token,

    /// Data bridge: submissions are recorded only.
    Data,
}

impl CodeKind {
    /// Events emitted by contracts of this kind.
    pub fn events(&self) -> &'static [EventKind] {
        match self {
            Self::Token => &[EventKind::Deposit],
            Self::Data => &[EventKind::DataSubmitted],
        }
    }
}

impl fmt::Display for CodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token => write!(f, "token"),
            Self::Data => write!(f, "data"),
        }
    }
}

impl FromStr for CodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "token" => Ok(Self::Token),
            "data" => Ok(Self::Data),
            _ => Err(format!("unknown code kind: {s}")),
        }
    }
}

/// A code bound to an operator-chosen identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    id: String,
    kind: CodeKind,
}

impl Code {
    /// Binds `id` to `kind`.
    pub fn new(id: impl Into<String>, kind: CodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    /// Identifier contracts are registered under.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Built-in behaviour of this code.
    pub fn kind(&self) -> CodeKind {
        self.kind
    }

    /// Resolves an event of this code by name.
    pub fn event(&self, event_name: &str) -> Result<EventKind, CodeError> {
        self.kind
            .events()
            .iter()
            .copied()
            .find(|event| event.name() == event_name)
            .ok_or_else(|| CodeError::InvalidEventName {
                code: self.id.clone(),
                event: event_name.to_string(),
            })
    }

    /// Decodes `log` as the event `event_name`.
    pub fn decode(&self, event_name: &str, log: &Log) -> Result<Payload, CodeError> {
        self.event(event_name)?.decode(log)
    }

    /// Applies a decoded packet emitted by `contract`.
    ///
    /// The packet is refused if `(contract, sequence)` was applied before; otherwise it is
    /// recorded and the code's effect runs.
    pub fn apply<C: PacketContext + ?Sized>(
        &self,
        ctx: &mut C,
        contract: Address,
        payload: &Payload,
    ) -> Result<(), CodeError> {
        let event = payload.event_kind();
        if !self.kind.events().contains(&event) {
            return Err(CodeError::InvalidEventName {
                code: self.id.clone(),
                event: event.name().to_string(),
            });
        }

        let sequence = payload.sequence();
        if ctx.has_packet(contract, sequence)? {
            return Err(CodeError::PacketAlreadyExists { contract, sequence });
        }
        ctx.record_packet(contract, payload)?;

        match payload {
            Payload::Deposit(deposit) => {
                let denom = Denom {
                    contract,
                    token: deposit.token,
                };
                ctx.credit(deposit.to, denom, deposit.value)?;
            }
            Payload::Data(_) => {}
        }

        debug!(code = %self.id, %contract, sequence, event = event.name(), "applied packet");
        Ok(())
    }

    /// One log filter per event of this code, scoped to `address`.
    pub fn query_descriptors(&self, address: Address) -> Vec<EventFilter> {
        self.kind
            .events()
            .iter()
            .map(|event| EventFilter {
                address,
                topic0: event.signature_hash(),
                event_name: event.name().to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use alloy_primitives::Bytes;
    use bridge_test_utils::receipts::log;

    use super::*;

    #[derive(Debug, Default)]
    struct Ledger {
        packets: HashSet<(Address, u64)>,
        balances: HashMap<(Address, Denom), U256>,
    }

    impl PacketContext for Ledger {
        fn has_packet(&self, contract: Address, sequence: u64) -> Result<bool, CodeError> {
            Ok(self.packets.contains(&(contract, sequence)))
        }

        fn record_packet(&mut self, contract: Address, payload: &Payload) -> Result<(), CodeError> {
            self.packets.insert((contract, payload.sequence()));
            Ok(())
        }

        fn credit(
            &mut self,
            account: Address,
            denom: Denom,
            amount: U256,
        ) -> Result<(), CodeError> {
            let balance = self.balances.entry((account, denom)).or_default();
            *balance = balance.checked_add(amount).ok_or(CodeError::Overflow)?;
            Ok(())
        }
    }

    fn deposit_log(contract: Address, to: Address, value: u64, sequence: u64) -> Log {
        let event = abi::Deposit {
            from: Address::repeat_byte(0x01),
            to,
            value: U256::from(value),
            token: Address::repeat_byte(0x7e),
            sequence,
        };
        let data = event.encode_log_data();
        log(contract, data.topics().to_vec(), data.data.clone())
    }

    #[test]
    fn decodes_deposit() {
        let code = Code::new("erc20", CodeKind::Token);
        let contract = Address::repeat_byte(0xc0);
        let to = Address::repeat_byte(0xd0);

        let payload = code
            .decode("Deposit", &deposit_log(contract, to, 1_000, 5))
            .unwrap();

        assert_eq!(
            payload,
            Payload::Deposit(TokenDeposit {
                from: Address::repeat_byte(0x01),
                to,
                value: U256::from(1_000),
                token: Address::repeat_byte(0x7e),
                sequence: 5,
            })
        );
    }

    #[test]
    fn decodes_data_submission() {
        let code = Code::new("notes", CodeKind::Data);
        let event = abi::DataSubmitted {
            submitter: Address::repeat_byte(0x05),
            data: Bytes::from_static(b"hello bridge"),
            sequence: 9,
        };
        let data = event.encode_log_data();
        let log = log(Address::ZERO, data.topics().to_vec(), data.data.clone());

        let payload = code.decode("DataSubmitted", &log).unwrap();
        assert_eq!(payload.sequence(), 9);
        assert_eq!(payload.event_kind(), EventKind::DataSubmitted);
    }

    #[test]
    fn unknown_event_name_is_rejected() {
        let code = Code::new("erc20", CodeKind::Token);
        let log = deposit_log(Address::ZERO, Address::ZERO, 1, 1);

        assert!(matches!(
            code.decode("DataSubmitted", &log),
            Err(CodeError::InvalidEventName { .. })
        ));
        assert!(matches!(
            code.decode("Withdraw", &log),
            Err(CodeError::InvalidEventName { .. })
        ));
    }

    #[test]
    fn malformed_log_fails_to_decode() {
        let code = Code::new("erc20", CodeKind::Token);
        let mut truncated = deposit_log(Address::ZERO, Address::ZERO, 1, 1);
        truncated.data = Bytes::copy_from_slice(&truncated.data[..40]);
        assert!(matches!(
            code.decode("Deposit", &truncated),
            Err(CodeError::Decode(_))
        ));

        let mut foreign = deposit_log(Address::ZERO, Address::ZERO, 1, 1);
        foreign.topics[0] = B256::repeat_byte(0xee);
        assert!(matches!(
            code.decode("Deposit", &foreign),
            Err(CodeError::Decode(_))
        ));
    }

    #[test]
    fn deposit_credits_once() {
        let code = Code::new("erc20", CodeKind::Token);
        let contract = Address::repeat_byte(0xc0);
        let to = Address::repeat_byte(0xd0);
        let payload = code
            .decode("Deposit", &deposit_log(contract, to, 250, 5))
            .unwrap();
        let mut ledger = Ledger::default();

        code.apply(&mut ledger, contract, &payload).unwrap();
        assert!(matches!(
            code.apply(&mut ledger, contract, &payload),
            Err(CodeError::PacketAlreadyExists { sequence: 5, .. })
        ));

        let denom = Denom {
            contract,
            token: Address::repeat_byte(0x7e),
        };
        assert_eq!(ledger.balances[&(to, denom)], U256::from(250));
    }

    #[test]
    fn same_sequence_from_another_contract_is_distinct() {
        let code = Code::new("erc20", CodeKind::Token);
        let to = Address::repeat_byte(0xd0);
        let mut ledger = Ledger::default();

        for contract in [Address::repeat_byte(1), Address::repeat_byte(2)] {
            let payload = code
                .decode("Deposit", &deposit_log(contract, to, 10, 1))
                .unwrap();
            code.apply(&mut ledger, contract, &payload).unwrap();
        }

        assert_eq!(ledger.packets.len(), 2);
    }

    #[test]
    fn payload_of_another_code_is_refused() {
        let token = Code::new("erc20", CodeKind::Token);
        let data = Code::new("notes", CodeKind::Data);
        let payload = token
            .decode("Deposit", &deposit_log(Address::ZERO, Address::ZERO, 1, 1))
            .unwrap();

        let mut ledger = Ledger::default();
        assert!(matches!(
            data.apply(&mut ledger, Address::ZERO, &payload),
            Err(CodeError::InvalidEventName { .. })
        ));
        assert!(ledger.packets.is_empty());
    }

    #[test]
    fn descriptors_cover_every_event() {
        let address = Address::repeat_byte(0xab);
        let filters = Code::new("erc20", CodeKind::Token).query_descriptors(address);

        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].address, address);
        assert_eq!(filters[0].topic0, abi::Deposit::SIGNATURE_HASH);
        assert_eq!(filters[0].event_name, "Deposit");
        assert!(filters[0].matches(&deposit_log(address, Address::ZERO, 1, 1)));
    }

    #[test]
    fn code_kind_parses_from_its_display() {
        for kind in [CodeKind::Token, CodeKind::Data] {
            assert_eq!(kind.to_string().parse::<CodeKind>().unwrap(), kind);
        }
        assert!("nft".parse::<CodeKind>().is_err());
    }
}
