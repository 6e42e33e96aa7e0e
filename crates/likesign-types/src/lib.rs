//! Core types for likesign
//!
//! Addresses, coins, amino JSON messages, the gas table and the sign document
//! whose canonical serialization is what the hardware device signs.

pub mod address;
pub mod coin;
pub mod gas;
pub mod json;
pub mod msgs;
pub mod serde_helpers;
pub mod tx;

pub use address::{derive_address, AccAddress, DEFAULT_BECH32_PREFIX};
pub use coin::{Coin, DEFAULT_DENOM};
pub use gas::{compute_total_gas, GasTable};
pub use json::to_canonical_json;
pub use msgs::{
    msg_begin_redelegate, msg_delegate, msg_send, msg_undelegate,
    msg_withdraw_delegation_reward, Message, MessageKind, MessageQueue,
};
pub use tx::{
    prepare_sign_doc, BroadcastMode, BroadcastTxRequest, Fee, PubKeyJson, SignDoc,
    SignDocOptions, StdSignature, StdTx,
};
