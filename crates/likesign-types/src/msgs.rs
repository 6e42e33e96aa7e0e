//! Bank and staking message types in their amino JSON form

use crate::coin::Coin;
use likesign_errors::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// MsgSend represents a message to send coins from one account to another
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSend {
    /// The sender's address
    pub from_address: String,
    /// The recipient's address
    pub to_address: String,
    /// The amount to send
    pub amount: Vec<Coin>,
}

/// MsgDelegate bonds tokens from a delegator to a validator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgDelegate {
    pub delegator_address: String,
    pub validator_address: String,
    pub amount: Coin,
}

/// MsgBeginRedelegate moves bonded tokens between two validators
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgBeginRedelegate {
    pub delegator_address: String,
    pub validator_src_address: String,
    pub validator_dst_address: String,
    pub amount: Coin,
}

/// MsgUndelegate starts unbonding tokens from a validator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgUndelegate {
    pub delegator_address: String,
    pub validator_address: String,
    pub amount: Coin,
}

/// MsgWithdrawDelegationReward claims the rewards of one delegation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgWithdrawDelegationReward {
    pub delegator_address: String,
    pub validator_address: String,
}

/// A transaction message, serialized as `{"type": ..., "value": ...}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Message {
    #[serde(rename = "cosmos-sdk/MsgSend")]
    Send(MsgSend),
    #[serde(rename = "cosmos-sdk/MsgDelegate")]
    Delegate(MsgDelegate),
    #[serde(rename = "cosmos-sdk/MsgBeginRedelegate")]
    BeginRedelegate(MsgBeginRedelegate),
    #[serde(rename = "cosmos-sdk/MsgUndelegate")]
    Undelegate(MsgUndelegate),
    #[serde(rename = "cosmos-sdk/MsgWithdrawDelegationReward")]
    WithdrawDelegationReward(MsgWithdrawDelegationReward),
}

/// Discriminant of [`Message`], used as the gas table key
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageKind {
    Send,
    Delegate,
    BeginRedelegate,
    Undelegate,
    WithdrawDelegationReward,
}

impl MessageKind {
    pub const ALL: [MessageKind; 5] = [
        MessageKind::Send,
        MessageKind::Delegate,
        MessageKind::BeginRedelegate,
        MessageKind::Undelegate,
        MessageKind::WithdrawDelegationReward,
    ];

    /// Amino type name of this kind
    pub fn type_name(&self) -> &'static str {
        match self {
            MessageKind::Send => "cosmos-sdk/MsgSend",
            MessageKind::Delegate => "cosmos-sdk/MsgDelegate",
            MessageKind::BeginRedelegate => "cosmos-sdk/MsgBeginRedelegate",
            MessageKind::Undelegate => "cosmos-sdk/MsgUndelegate",
            MessageKind::WithdrawDelegationReward => "cosmos-sdk/MsgWithdrawDelegationReward",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for MessageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        MessageKind::ALL
            .into_iter()
            .find(|kind| kind.type_name() == s)
            .ok_or_else(|| Error::UnknownMessageType(s.to_string()))
    }
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Send(_) => MessageKind::Send,
            Message::Delegate(_) => MessageKind::Delegate,
            Message::BeginRedelegate(_) => MessageKind::BeginRedelegate,
            Message::Undelegate(_) => MessageKind::Undelegate,
            Message::WithdrawDelegationReward(_) => MessageKind::WithdrawDelegationReward,
        }
    }

    /// Parse an amino JSON message, rejecting type names outside the known set.
    pub fn from_value(value: Value) -> Result<Self> {
        let type_name = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Encoding("message is missing its \"type\" field".to_string()))?;
        MessageKind::from_str(type_name)?;
        serde_json::from_value(value).map_err(|e| Error::Encoding(e.to_string()))
    }
}

/// Build a bank send of `amount` in `denom`.
pub fn msg_send(from: &str, to: &str, amount: Decimal, denom: &str) -> Result<Message> {
    Ok(Message::Send(MsgSend {
        from_address: from.to_string(),
        to_address: to.to_string(),
        amount: vec![Coin::from_decimal(denom, amount)?],
    }))
}

pub fn msg_delegate(
    delegator: &str,
    validator: &str,
    amount: Decimal,
    denom: &str,
) -> Result<Message> {
    Ok(Message::Delegate(MsgDelegate {
        delegator_address: delegator.to_string(),
        validator_address: validator.to_string(),
        amount: Coin::from_decimal(denom, amount)?,
    }))
}

pub fn msg_begin_redelegate(
    delegator: &str,
    from_validator: &str,
    to_validator: &str,
    amount: Decimal,
    denom: &str,
) -> Result<Message> {
    Ok(Message::BeginRedelegate(MsgBeginRedelegate {
        delegator_address: delegator.to_string(),
        validator_src_address: from_validator.to_string(),
        validator_dst_address: to_validator.to_string(),
        amount: Coin::from_decimal(denom, amount)?,
    }))
}

pub fn msg_undelegate(
    delegator: &str,
    validator: &str,
    amount: Decimal,
    denom: &str,
) -> Result<Message> {
    Ok(Message::Undelegate(MsgUndelegate {
        delegator_address: delegator.to_string(),
        validator_address: validator.to_string(),
        amount: Coin::from_decimal(denom, amount)?,
    }))
}

pub fn msg_withdraw_delegation_reward(delegator: &str, validator: &str) -> Message {
    Message::WithdrawDelegationReward(MsgWithdrawDelegationReward {
        delegator_address: delegator.to_string(),
        validator_address: validator.to_string(),
    })
}

/// Ordered list of pending messages, persisted as a JSON array between CLI runs
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageQueue {
    msgs: Vec<Message>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, msg: Message) {
        self.msgs.push(msg);
    }

    /// Remove the message at `index`, or `None` if out of range
    pub fn remove(&mut self, index: usize) -> Option<Message> {
        (index < self.msgs.len()).then(|| self.msgs.remove(index))
    }

    pub fn clear(&mut self) {
        self.msgs.clear();
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.msgs
    }

    pub fn len(&self) -> usize {
        self.msgs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.msgs.is_empty()
    }

    pub fn into_vec(self) -> Vec<Message> {
        self.msgs
    }

    /// Parse a queue from its JSON array form
    pub fn from_json(json: &str) -> Result<Self> {
        let values: Vec<Value> =
            serde_json::from_str(json).map_err(|e| Error::Encoding(e.to_string()))?;
        let msgs = values
            .into_iter()
            .map(Message::from_value)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { msgs })
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.msgs).map_err(|e| Error::Encoding(e.to_string()))
    }
}

impl From<Vec<Message>> for MessageQueue {
    fn from(msgs: Vec<Message>) -> Self {
        Self { msgs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_msg_send_amino_json() {
        let msg = msg_send("cosmos1from", "cosmos1to", dec("12.5"), "nanolike").unwrap();
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "type": "cosmos-sdk/MsgSend",
                "value": {
                    "from_address": "cosmos1from",
                    "to_address": "cosmos1to",
                    "amount": [{"denom": "nanolike", "amount": "13"}]
                }
            })
        );
    }

    #[test]
    fn test_msg_begin_redelegate_fields() {
        let msg =
            msg_begin_redelegate("cosmos1d", "cosmosvaloper1a", "cosmosvaloper1b", dec("12.4"), "nanolike")
                .unwrap();
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "cosmos-sdk/MsgBeginRedelegate");
        assert_eq!(value["value"]["validator_src_address"], "cosmosvaloper1a");
        assert_eq!(value["value"]["validator_dst_address"], "cosmosvaloper1b");
        assert_eq!(value["value"]["amount"]["amount"], "12");
    }

    #[test]
    fn test_withdraw_has_no_amount() {
        let msg = msg_withdraw_delegation_reward("cosmos1d", "cosmosvaloper1a");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "cosmos-sdk/MsgWithdrawDelegationReward",
                "value": {
                    "delegator_address": "cosmos1d",
                    "validator_address": "cosmosvaloper1a"
                }
            })
        );
        assert_eq!(msg.kind(), MessageKind::WithdrawDelegationReward);
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = msg_delegate("cosmos1d", "cosmosvaloper1a", dec("-5"), "nanolike").unwrap_err();
        assert!(matches!(err, Error::InvalidAmount(_)));
    }

    #[test]
    fn test_kind_from_type_name() {
        for kind in MessageKind::ALL {
            assert_eq!(MessageKind::from_str(kind.type_name()).unwrap(), kind);
        }
        assert_eq!(
            MessageKind::from_str("cosmos-sdk/MsgVote").unwrap_err(),
            Error::UnknownMessageType("cosmos-sdk/MsgVote".to_string())
        );
    }

    #[test]
    fn test_from_value_rejects_unknown_type() {
        let err = Message::from_value(json!({"type": "cosmos-sdk/MsgVote", "value": {}})).unwrap_err();
        assert!(matches!(err, Error::UnknownMessageType(_)));

        let err = Message::from_value(json!({"value": {}})).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }

    #[test]
    fn test_queue_operations() {
        let mut queue = MessageQueue::new();
        queue.push(msg_undelegate("cosmos1d", "cosmosvaloper1a", dec("1"), "nanolike").unwrap());
        queue.push(msg_withdraw_delegation_reward("cosmos1d", "cosmosvaloper1a"));
        assert_eq!(queue.len(), 2);

        assert!(queue.remove(5).is_none());
        let removed = queue.remove(0).unwrap();
        assert_eq!(removed.kind(), MessageKind::Undelegate);
        assert_eq!(queue.as_slice()[0].kind(), MessageKind::WithdrawDelegationReward);

        let json = queue.to_json_pretty().unwrap();
        assert_eq!(MessageQueue::from_json(&json).unwrap(), queue);

        queue.clear();
        assert!(queue.is_empty());
    }
}
