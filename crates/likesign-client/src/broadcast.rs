//! Submitting signed transactions

use crate::{Client, ClientError, HttpTransport, Result};
use likesign_crypto::{PublicKey, RawSignature};
use likesign_types::tx::{BroadcastTxRequest, SignDoc, StdSignature, StdTx};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

/// Outcome of `POST /txs` in sync mode
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResult {
    pub tx_hash: String,
    /// Raw log as returned by the node
    pub log: String,
    pub success: bool,
}

impl BroadcastResult {
    /// Turn a reported failure into [`likesign_errors::Error::RemoteRejection`]
    pub fn into_result(self) -> likesign_errors::Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(likesign_errors::Error::RemoteRejection { log: self.log })
        }
    }
}

/// Wire body for broadcasting `doc` with one signature.
pub fn build_broadcast_request(
    doc: &SignDoc,
    signature: &RawSignature,
    public_key: &PublicKey,
) -> BroadcastTxRequest {
    let signature = StdSignature {
        signature: signature.to_base64(),
        pub_key: public_key.to_amino_json(),
    };
    BroadcastTxRequest::sync(StdTx::new(doc, vec![signature]))
}

/// A sync broadcast succeeded iff its raw log is a JSON array whose entries all
/// report `"success": true`. Anything unparseable counts as failure.
pub fn raw_log_success(raw_log: &str) -> bool {
    serde_json::from_str::<Vec<Value>>(raw_log)
        .map(|entries| {
            entries
                .iter()
                .all(|entry| entry.get("success").and_then(Value::as_bool) == Some(true))
        })
        .unwrap_or(false)
}

impl<T: HttpTransport> Client<T> {
    /// Submit a signed sign document. A single attempt; transport errors propagate.
    #[instrument(skip_all, fields(chain_id = %doc.chain_id, sequence = doc.sequence))]
    pub async fn broadcast(
        &self,
        doc: &SignDoc,
        signature: &RawSignature,
        public_key: &PublicKey,
    ) -> Result<BroadcastResult> {
        let request = build_broadcast_request(doc, signature, public_key);
        let body = serde_json::to_value(&request)?;
        let url = self.url("txs")?;
        let response = self.transport().post(&url, &body).await?;

        let tx_hash = response
            .get("txhash")
            .and_then(Value::as_str)
            .ok_or_else(|| ClientError::InvalidResponse("broadcast response without txhash".to_string()))?
            .to_string();
        let log = response
            .get("raw_log")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let success = raw_log_success(&log);

        if success {
            info!(tx_hash = %tx_hash, "transaction broadcast");
        } else {
            warn!(tx_hash = %tx_hash, log = %log, "transaction rejected");
        }

        Ok(BroadcastResult {
            tx_hash,
            log,
            success,
        })
    }
}
