//! Per-message gas constants and total gas computation

use crate::msgs::{Message, MessageKind};
use likesign_errors::{Error, Result};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Gas charged per message kind when no table is configured
pub const DEFAULT_GAS_TABLE: [(MessageKind, u64); 5] = [
    (MessageKind::Send, 75_000),
    (MessageKind::Delegate, 160_000),
    (MessageKind::BeginRedelegate, 300_000),
    (MessageKind::Undelegate, 175_000),
    (MessageKind::WithdrawDelegationReward, 100_000),
];

/// Mapping from message kind to the gas it costs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GasTable(BTreeMap<MessageKind, u64>);

impl Default for GasTable {
    fn default() -> Self {
        Self(DEFAULT_GAS_TABLE.into_iter().collect())
    }
}

impl GasTable {
    /// A table with no entries; every lookup fails until kinds are added
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with_entry(mut self, kind: MessageKind, gas: u64) -> Self {
        self.0.insert(kind, gas);
        self
    }

    pub fn set(&mut self, kind: MessageKind, gas: u64) {
        self.0.insert(kind, gas);
    }

    pub fn get(&self, kind: MessageKind) -> Option<u64> {
        self.0.get(&kind).copied()
    }

    /// Gas for `kind`; a missing entry is an error, never zero
    pub fn gas_for(&self, kind: MessageKind) -> Result<u64> {
        self.get(kind)
            .ok_or_else(|| Error::UnknownMessageType(kind.type_name().to_string()))
    }

    /// Build a table from entries keyed by amino type name.
    pub fn from_type_names<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        entries
            .into_iter()
            .map(|(name, gas)| Ok((MessageKind::from_str(name.as_ref())?, gas)))
            .collect::<Result<BTreeMap<_, _>>>()
            .map(Self)
    }

    pub fn to_type_names(&self) -> BTreeMap<String, u64> {
        self.0
            .iter()
            .map(|(kind, gas)| (kind.type_name().to_string(), *gas))
            .collect()
    }
}

/// Sum the gas of every message in `msgs`.
pub fn compute_total_gas(table: &GasTable, msgs: &[Message]) -> Result<u64> {
    msgs.iter().try_fold(0u64, |total, msg| {
        let gas = table.gas_for(msg.kind())?;
        total
            .checked_add(gas)
            .ok_or_else(|| Error::InvalidAmount("total gas overflows u64".to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msgs::{msg_delegate, msg_send, msg_undelegate, msg_withdraw_delegation_reward};
    use rust_decimal::Decimal;

    fn send() -> Message {
        msg_send("cosmos1a", "cosmos1b", Decimal::ONE, "nanolike").unwrap()
    }

    fn delegate() -> Message {
        msg_delegate("cosmos1a", "cosmosvaloper1v", Decimal::ONE, "nanolike").unwrap()
    }

    #[test]
    fn test_send_and_delegate() {
        let total = compute_total_gas(&GasTable::default(), &[send(), delegate()]).unwrap();
        assert_eq!(total, 235_000);
    }

    #[test]
    fn test_empty_list_is_zero() {
        assert_eq!(compute_total_gas(&GasTable::default(), &[]).unwrap(), 0);
    }

    #[test]
    fn test_missing_kind_fails() {
        let table = GasTable::empty().with_entry(MessageKind::Send, 75_000);
        let undelegate = msg_undelegate("cosmos1a", "cosmosvaloper1v", Decimal::ONE, "nanolike").unwrap();
        let err = compute_total_gas(&table, &[send(), undelegate]).unwrap_err();
        assert_eq!(
            err,
            Error::UnknownMessageType("cosmos-sdk/MsgUndelegate".to_string())
        );
    }

    #[test]
    fn test_overflow_fails() {
        let table = GasTable::empty().with_entry(MessageKind::WithdrawDelegationReward, u64::MAX);
        let withdraw = msg_withdraw_delegation_reward("cosmos1a", "cosmosvaloper1v");
        let err = compute_total_gas(&table, &[withdraw.clone(), withdraw]).unwrap_err();
        assert!(matches!(err, Error::InvalidAmount(_)));
    }

    #[test]
    fn test_from_type_names() {
        let table =
            GasTable::from_type_names([("cosmos-sdk/MsgSend", 80_000u64), ("cosmos-sdk/MsgDelegate", 1)])
                .unwrap();
        assert_eq!(table.get(MessageKind::Send), Some(80_000));
        assert_eq!(table.get(MessageKind::Undelegate), None);

        let err = GasTable::from_type_names([("cosmos-sdk/MsgVote", 1u64)]).unwrap_err();
        assert_eq!(err, Error::UnknownMessageType("cosmos-sdk/MsgVote".to_string()));

        let names = GasTable::default().to_type_names();
        assert_eq!(names["cosmos-sdk/MsgBeginRedelegate"], 300_000);
        assert_eq!(GasTable::from_type_names(names).unwrap(), GasTable::default());
    }
}
