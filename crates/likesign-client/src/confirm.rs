//! Waiting for a broadcast transaction to be included in a block

use crate::{Client, HttpTransport, Result};
use likesign_errors::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Delay between confirmation queries
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(6);

/// Bounds for [`Client::poll_confirmation`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    /// Give up after this many failed queries
    pub max_attempts: Option<u32>,
    /// Give up once the next query would start after this much time
    pub deadline: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
            deadline: None,
        }
    }
}

impl PollConfig {
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Whether an indexed transaction executed successfully
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
}

/// An absent, null or zero `code` means success.
fn interpret_tx_response(response: &Value) -> ConfirmationResult {
    let success = match response.get("code") {
        None | Some(Value::Null) => true,
        Some(Value::Number(code)) => code.as_u64() == Some(0),
        Some(Value::String(code)) => code == "0",
        Some(_) => false,
    };

    if success {
        ConfirmationResult { success, log: None }
    } else {
        ConfirmationResult {
            success,
            log: Some(
                response
                    .get("raw_log")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            ),
        }
    }
}

impl<T: HttpTransport> Client<T> {
    /// Query a transaction once; a transport error (including 404) propagates
    #[instrument(skip(self))]
    pub async fn query_tx(&self, tx_hash: &str) -> Result<ConfirmationResult> {
        let response = self.get_json(&format!("txs/{tx_hash}")).await?;
        Ok(interpret_tx_response(&response))
    }

    /// Poll `GET txs/{hash}` until the node answers.
    ///
    /// Transport errors, including a 404 while the transaction is not yet
    /// indexed, are retried after `config.interval`. The first successful
    /// answer is final.
    #[instrument(skip(self, config, cancel))]
    pub async fn poll_confirmation(
        &self,
        tx_hash: &str,
        config: &PollConfig,
        cancel: &CancellationToken,
    ) -> Result<ConfirmationResult> {
        let url = self.url(&format!("txs/{tx_hash}"))?;
        let started = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled.into());
            }
            attempts = attempts.saturating_add(1);

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled.into()),
                outcome = self.transport().get(&url) => outcome,
            };

            match outcome {
                Ok(response) => {
                    let result = interpret_tx_response(&response);
                    info!(attempts, success = result.success, "transaction confirmed");
                    return Ok(result);
                }
                Err(e) => warn!(attempt = attempts, error = %e, "transaction not found yet"),
            }

            if config.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(Error::Timeout { attempts }.into());
            }
            if config
                .deadline
                .is_some_and(|deadline| started.elapsed() + config.interval > deadline)
            {
                return Err(Error::Timeout { attempts }.into());
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled.into()),
                _ = tokio::time::sleep(config.interval) => {}
            }
        }
    }
}
