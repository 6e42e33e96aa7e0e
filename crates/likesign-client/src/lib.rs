//! Client library for submitting device-signed transactions to a LikeCoin /
//! Cosmos SDK node over its legacy LCD REST API.
//!
//! This crate provides the REST client (account queries, broadcast,
//! confirmation polling), the transaction builder tying it to a signing device,
//! and the `likesign` CLI framework.

pub mod broadcast;
pub mod cli;
pub mod config;
pub mod confirm;
pub mod transport;
pub mod tx_builder;

pub use broadcast::{build_broadcast_request, raw_log_success, BroadcastResult};
pub use config::{ClientConfig, ConfigError};
pub use confirm::{ConfirmationResult, PollConfig};
pub use transport::{HttpTransport, ReqwestTransport, TransportError};
pub use tx_builder::TxBuilder;

use likesign_ledger::LedgerError;
use likesign_types::Coin;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;
use url::Url;

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    /// Signing pipeline error
    #[error(transparent)]
    Core(#[from] likesign_errors::Error),

    /// Transport failure
    #[error("network error:: {0}")]
    Network(#[from] TransportError),

    /// JSON parsing error
    #[error("json parsing failed:: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("invalid url:: {0}")]
    Url(#[from] url::ParseError),

    /// Response did not have the expected shape
    #[error("invalid response:: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("config error:: {0}")]
    Config(#[from] ConfigError),

    /// Signing device error
    #[error("ledger error:: {0}")]
    Ledger(#[from] LedgerError),

    /// I/O error
    #[error("io error:: {0}")]
    Io(#[from] std::io::Error),

    /// Bad command line input
    #[error("invalid argument:: {0}")]
    InvalidArgument(String),
}

/// Error codes: the core pipeline codes plus client-only conditions
pub mod codes {
    pub use likesign_errors::codes::*;

    /// Node answered with an unexpected shape
    pub const INVALID_RESPONSE: u32 = 20;
    /// Configuration file or endpoint unusable
    pub const CONFIG: u32 = 21;
    /// Local file access failed
    pub const IO: u32 = 22;
    /// Bad command line input
    pub const INVALID_ARGUMENT: u32 = 23;
    /// Signing device unavailable or refused
    pub const DEVICE: u32 = 24;
    /// Signature does not verify against the signing key
    pub const SIGNATURE_MISMATCH: u32 = 25;
}

/// Added to [`ClientError::code`] for the process exit status, keeping clear
/// of 1 (generic failure) and 2 (clap usage errors)
pub const EXIT_CODE_OFFSET: u8 = 100;

impl ClientError {
    /// Numeric code for JSON output; see [`codes`]
    pub fn code(&self) -> u32 {
        match self {
            ClientError::Core(e) => e.code(),
            ClientError::Ledger(LedgerError::Core(e)) => e.code(),
            ClientError::Network(_) => codes::NETWORK,
            ClientError::InvalidResponse(_) | ClientError::Json(_) => codes::INVALID_RESPONSE,
            ClientError::Url(_) | ClientError::Config(_) => codes::CONFIG,
            ClientError::Io(_) => codes::IO,
            ClientError::InvalidArgument(_) | ClientError::Ledger(LedgerError::InvalidPath(_)) => {
                codes::INVALID_ARGUMENT
            }
            ClientError::Ledger(LedgerError::Device(_)) => codes::DEVICE,
            ClientError::Ledger(LedgerError::SignatureMismatch(_)) => codes::SIGNATURE_MISMATCH,
        }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        u8::try_from(self.code())
            .ok()
            .and_then(|code| code.checked_add(EXIT_CODE_OFFSET))
            .unwrap_or(1)
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Account number and sequence of an on-chain account
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub account_number: u64,
    pub sequence: u64,
}

/// One bonded delegation of an account
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationInfo {
    pub validator: String,
    #[serde(with = "likesign_types::serde_helpers::decimal_string")]
    pub balance: u128,
}

/// Everything needed to build and display a transaction for one account
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub address: String,
    pub coins: Vec<Coin>,
    #[serde(with = "likesign_types::serde_helpers::decimal_string")]
    pub account_number: u64,
    #[serde(with = "likesign_types::serde_helpers::decimal_string")]
    pub sequence: u64,
    pub delegations: Vec<DelegationInfo>,
}

/// LCD REST client
pub struct Client<T> {
    endpoint: Url,
    transport: T,
}

impl Client<ReqwestTransport> {
    /// Create a client for the node and timeout in `config`
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(Duration::from_secs(config.timeout))?;
        Self::new(&config.node, transport)
    }
}

impl<T: HttpTransport> Client<T> {
    /// Create a new client; `endpoint` is the LCD base URL
    pub fn new(endpoint: &str, transport: T) -> Result<Self> {
        let mut endpoint = Url::parse(endpoint)?;
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }
        Ok(Self {
            endpoint,
            transport,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        Ok(self.endpoint.join(path)?)
    }

    pub(crate) async fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.url(path)?;
        Ok(self.transport.get(&url).await?)
    }

    /// Query account number and sequence; a fresh account reports zeros
    #[instrument(skip(self))]
    pub async fn fetch_account(&self, address: &str) -> Result<AccountState> {
        let response = self.get_json(&format!("auth/accounts/{address}")).await?;
        let value = response
            .pointer("/result/value")
            .ok_or_else(|| ClientError::InvalidResponse("missing result.value".to_string()))?;

        Ok(AccountState {
            account_number: lenient_u64(value.get("account_number"), "account_number")?,
            sequence: lenient_u64(value.get("sequence"), "sequence")?,
        })
    }

    /// Query spendable balances
    #[instrument(skip(self))]
    pub async fn fetch_balances(&self, address: &str) -> Result<Vec<Coin>> {
        let response = self.get_json(&format!("bank/balances/{address}")).await?;
        match response.get("result") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(result) => Ok(serde_json::from_value(result.clone())?),
        }
    }

    /// Query bonded delegations of `delegator`
    #[instrument(skip(self))]
    pub async fn fetch_delegations(&self, delegator: &str) -> Result<Vec<DelegationInfo>> {
        let response = self
            .get_json(&format!("staking/delegators/{delegator}/delegations"))
            .await?;
        let entries = match response.get("result") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                return Err(ClientError::InvalidResponse(format!(
                    "delegations result is not an array: {other}"
                )))
            }
        };

        entries.iter().map(parse_delegation).collect()
    }

    /// Account, balance and delegation reads issued concurrently
    #[instrument(skip(self))]
    pub async fn fetch_account_info(&self, address: &str) -> Result<AccountInfo> {
        let (account, coins, delegations) = tokio::try_join!(
            self.fetch_account(address),
            self.fetch_balances(address),
            self.fetch_delegations(address),
        )?;

        Ok(AccountInfo {
            address: address.to_string(),
            coins,
            account_number: account.account_number,
            sequence: account.sequence,
            delegations,
        })
    }
}

fn parse_delegation(entry: &Value) -> Result<DelegationInfo> {
    let validator = entry
        .pointer("/delegation/validator_address")
        .or_else(|| entry.get("validator_address"))
        .and_then(Value::as_str)
        .ok_or_else(|| ClientError::InvalidResponse("delegation without validator".to_string()))?;

    let balance = match entry.get("balance") {
        Some(Value::Object(coin)) => coin.get("amount"),
        other => other,
    };
    let balance = match balance {
        Some(Value::String(s)) => s.parse().ok(),
        Some(Value::Number(n)) => n.as_u64().map(u128::from),
        _ => None,
    }
    .ok_or_else(|| ClientError::InvalidResponse(format!("invalid delegation balance for {validator}")))?;

    Ok(DelegationInfo {
        validator: validator.to_string(),
        balance,
    })
}

/// Integers in LCD responses may be quoted, bare, or missing on fresh accounts
fn lenient_u64(value: Option<&Value>, field: &str) -> Result<u64> {
    match value {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| ClientError::InvalidResponse(format!("{field} is not a u64: {n}"))),
        Some(Value::String(s)) if s.is_empty() => Ok(0),
        Some(Value::String(s)) => s
            .parse()
            .map_err(|_| ClientError::InvalidResponse(format!("{field} is not a u64: {s:?}"))),
        Some(other) => Err(ClientError::InvalidResponse(format!(
            "{field} has unexpected type: {other}"
        ))),
    }
}
