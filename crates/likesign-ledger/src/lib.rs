//! Hardware signing device integration for likesign
//!
//! The device itself sits behind [`SigningDevice`]; USB/HID transport is the
//! implementor's concern. [`LedgerSigner`] turns raw device answers into typed
//! addresses and verified `r||s` signatures.

use async_trait::async_trait;
use likesign_crypto::{normalize_signature, PublicKey, RawSignature, SignatureError};
use likesign_types::tx::SignDoc;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

pub mod path;

pub use path::{LedgerPath, COSMOS_COIN_TYPE};

/// Failure reported by the device transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("device not connected")]
    NotConnected,

    #[error("request rejected on device")]
    Rejected,

    #[error("device transport error:: {0}")]
    Transport(String),
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("device error:: {0}")]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Core(#[from] likesign_errors::Error),

    #[error("device signature does not match its public key:: {0}")]
    SignatureMismatch(#[from] SignatureError),

    #[error("invalid derivation path:: {0}")]
    InvalidPath(String),
}

/// A hardware device holding secp256k1 keys
#[async_trait]
pub trait SigningDevice: Send + Sync {
    /// Compressed public key for `path`
    async fn public_key(&self, path: &LedgerPath) -> Result<Vec<u8>, DeviceError>;

    /// Sign `message` with the key at `path`; DER or raw `r||s`
    async fn sign(&self, path: &LedgerPath, message: &[u8]) -> Result<Vec<u8>, DeviceError>;
}

/// Public key and account address of one device path
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AddressInfo {
    #[serde(rename = "pubKey")]
    pub public_key: PublicKey,
    pub address: String,
}

/// Normalized signature together with the key that produced it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceSignature {
    pub signature: RawSignature,
    pub public_key: PublicKey,
}

/// Signs sign documents on a [`SigningDevice`], caching addresses per path
pub struct LedgerSigner<D> {
    device: D,
    prefix: String,
    cache: Mutex<HashMap<LedgerPath, AddressInfo>>,
}

impl<D: SigningDevice> LedgerSigner<D> {
    pub fn new(device: D, prefix: impl Into<String>) -> Self {
        Self {
            device,
            prefix: prefix.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Public key and address for `path`; the device is asked once per path.
    #[instrument(skip(self, path), fields(path = %path))]
    pub async fn address_info(&self, path: &LedgerPath) -> Result<AddressInfo, LedgerError> {
        let mut cache = self.cache.lock().await;
        if let Some(info) = cache.get(path) {
            return Ok(info.clone());
        }

        let bytes = self.device.public_key(path).await?;
        let public_key = PublicKey::from_bytes(&bytes)?;
        let info = AddressInfo {
            public_key,
            address: public_key.to_bech32(&self.prefix)?,
        };
        debug!(address = %info.address, "derived device address");
        cache.insert(*path, info.clone());
        Ok(info)
    }

    /// Forget cached addresses, e.g. after the device was swapped
    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    /// Have the device sign the canonical bytes of `doc`.
    ///
    /// The returned signature has been checked against the device's own key.
    #[instrument(skip(self, path, doc), fields(path = %path, sequence = doc.sequence))]
    pub async fn sign(
        &self,
        path: &LedgerPath,
        doc: &SignDoc,
    ) -> Result<DeviceSignature, LedgerError> {
        let info = self.address_info(path).await?;
        let sign_bytes = doc.sign_bytes()?;
        debug!(sign_bytes = %String::from_utf8_lossy(&sign_bytes), "requesting device signature");

        let reply = self.device.sign(path, &sign_bytes).await?;
        debug!(len = reply.len(), reply = %hex::encode(&reply), "device signature received");

        let signature = normalize_signature(&reply)?;
        signature.verify(&info.public_key, &sign_bytes)?;
        Ok(DeviceSignature {
            signature,
            public_key: info.public_key,
        })
    }
}
