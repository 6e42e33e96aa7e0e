//! Fees, sign documents and the signed wire transaction

use crate::coin::{ceil_to_integer, Coin, DEFAULT_DENOM};
use crate::json::to_canonical_json;
use crate::msgs::Message;
use base64::Engine;
use likesign_errors::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Gas limit used when the caller does not supply one
pub const DEFAULT_GAS: u64 = 200_000;

/// Price per unit of gas, in the fee denomination
pub const DEFAULT_GAS_PRICE: u64 = 100;

/// Amino type of a secp256k1 public key
pub const SECP256K1_PUBKEY_TYPE: &str = "tendermint/PubKeySecp256k1";

/// Transaction fee
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    /// Zero or one coin
    pub amount: Vec<Coin>,
    #[serde(with = "crate::serde_helpers::decimal_string")]
    pub gas: u64,
}

/// The document the device signs
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignDoc {
    pub fee: Fee,
    pub msgs: Vec<Message>,
    pub chain_id: String,
    #[serde(with = "crate::serde_helpers::decimal_string")]
    pub account_number: u64,
    #[serde(with = "crate::serde_helpers::decimal_string")]
    pub sequence: u64,
    pub memo: String,
}

impl SignDoc {
    /// Canonical JSON text of this document
    pub fn canonical_json(&self) -> Result<String> {
        to_canonical_json(self)
    }

    /// Bytes handed to the signing device
    pub fn sign_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.canonical_json()?.into_bytes())
    }
}

/// Fee and memo settings for [`prepare_sign_doc`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignDocOptions {
    pub gas: Decimal,
    pub gas_price: Decimal,
    pub memo: String,
    pub denom: String,
}

impl Default for SignDocOptions {
    fn default() -> Self {
        Self {
            gas: Decimal::from(DEFAULT_GAS),
            gas_price: Decimal::from(DEFAULT_GAS_PRICE),
            memo: String::new(),
            denom: DEFAULT_DENOM.to_string(),
        }
    }
}

impl SignDocOptions {
    pub fn gas(mut self, gas: Decimal) -> Self {
        self.gas = gas;
        self
    }

    pub fn gas_price(mut self, gas_price: Decimal) -> Self {
        self.gas_price = gas_price;
        self
    }

    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    pub fn denom(mut self, denom: impl Into<String>) -> Self {
        self.denom = denom.into();
        self
    }
}

/// Assemble the unsigned sign document.
///
/// Gas is rounded up to an integer and the fee is `ceil(gas * gas_price)`; a
/// zero fee is encoded as an empty coin list.
pub fn prepare_sign_doc(
    msgs: Vec<Message>,
    chain_id: &str,
    account_number: u64,
    sequence: u64,
    options: &SignDocOptions,
) -> Result<SignDoc> {
    if options.gas_price < Decimal::ZERO {
        return Err(Error::InvalidAmount(format!(
            "negative gas price {} not allowed",
            options.gas_price
        )));
    }

    let gas = u64::try_from(ceil_to_integer(options.gas)?)
        .map_err(|_| Error::InvalidAmount(format!("gas {} exceeds u64", options.gas)))?;
    let fee_total = Decimal::from(gas)
        .checked_mul(options.gas_price)
        .ok_or_else(|| Error::InvalidAmount("fee overflows".to_string()))
        .and_then(ceil_to_integer)?;

    let amount = if fee_total == 0 {
        Vec::new()
    } else {
        vec![Coin::new(options.denom.clone(), fee_total)?]
    };

    Ok(SignDoc {
        fee: Fee { amount, gas },
        msgs,
        chain_id: chain_id.to_string(),
        account_number,
        sequence,
        memo: options.memo.clone(),
    })
}

/// Amino JSON public key
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubKeyJson {
    #[serde(rename = "type")]
    pub key_type: String,
    /// Base64 of the compressed key
    pub value: String,
}

impl PubKeyJson {
    pub fn secp256k1(compressed: &[u8]) -> Self {
        Self {
            key_type: SECP256K1_PUBKEY_TYPE.to_string(),
            value: base64::engine::general_purpose::STANDARD.encode(compressed),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdSignature {
    /// Base64 of the 64-byte `r||s` signature
    pub signature: String,
    pub pub_key: PubKeyJson,
}

/// Signed transaction as submitted to the LCD.
///
/// Same fields as [`SignDoc`] except the message list is named `msg`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdTx {
    pub fee: Fee,
    pub msg: Vec<Message>,
    pub chain_id: String,
    #[serde(with = "crate::serde_helpers::decimal_string")]
    pub account_number: u64,
    #[serde(with = "crate::serde_helpers::decimal_string")]
    pub sequence: u64,
    pub memo: String,
    pub signatures: Vec<StdSignature>,
}

impl StdTx {
    pub fn new(doc: &SignDoc, signatures: Vec<StdSignature>) -> Self {
        Self {
            fee: doc.fee.clone(),
            msg: doc.msgs.clone(),
            chain_id: doc.chain_id.clone(),
            account_number: doc.account_number,
            sequence: doc.sequence,
            memo: doc.memo.clone(),
            signatures,
        }
    }
}

/// Only sync mode is used: the node checks the tx and returns its hash and raw log
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastMode {
    #[default]
    Sync,
}

/// Body of `POST /txs`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastTxRequest {
    pub mode: BroadcastMode,
    pub tx: StdTx,
}

impl BroadcastTxRequest {
    pub fn sync(tx: StdTx) -> Self {
        Self {
            mode: BroadcastMode::Sync,
            tx,
        }
    }
}
