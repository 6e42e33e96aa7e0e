//! Compressed secp256k1 public keys

use base64::{engine::general_purpose, Engine as _};
use k256::ecdsa::VerifyingKey;
use likesign_errors::{Error, Result};
use likesign_types::address::{AccAddress, COMPRESSED_PUBKEY_LEN};
use likesign_types::tx::{PubKeyJson, SECP256K1_PUBKEY_TYPE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 33-byte compressed secp256k1 public key
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; COMPRESSED_PUBKEY_LEN]);

impl PublicKey {
    /// Accept exactly 33 bytes starting with `0x02` or `0x03`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let key: [u8; COMPRESSED_PUBKEY_LEN] = bytes
            .try_into()
            .map_err(|_| Error::InvalidPublicKey { len: bytes.len() })?;
        if !matches!(key[0], 0x02 | 0x03) {
            return Err(Error::InvalidPublicKey { len: bytes.len() });
        }
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8; COMPRESSED_PUBKEY_LEN] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(self.0)
    }

    /// Derive address from public key
    pub fn to_address(&self) -> Result<AccAddress> {
        AccAddress::from_pubkey(&self.0)
    }

    /// Bech32 account address under `prefix`
    pub fn to_bech32(&self, prefix: &str) -> Result<String> {
        self.to_address()?.to_bech32(prefix)
    }

    pub fn to_amino_json(&self) -> PubKeyJson {
        PubKeyJson::secp256k1(&self.0)
    }

    /// Decompress into a verifying key; fails if the bytes are not a curve point
    pub fn to_verifying_key(&self) -> Result<VerifyingKey> {
        VerifyingKey::from_sec1_bytes(&self.0)
            .map_err(|_| Error::InvalidPublicKey { len: self.0.len() })
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.0))
    }
}

impl From<&VerifyingKey> for PublicKey {
    fn from(key: &VerifyingKey) -> Self {
        let mut bytes = [0u8; COMPRESSED_PUBKEY_LEN];
        bytes.copy_from_slice(key.to_encoded_point(true).as_bytes());
        Self(bytes)
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_amino_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let data = PubKeyJson::deserialize(deserializer)?;
        if data.key_type != SECP256K1_PUBKEY_TYPE {
            return Err(serde::de::Error::custom(format!(
                "unknown public key type: {}",
                data.key_type
            )));
        }
        let bytes = general_purpose::STANDARD
            .decode(&data.value)
            .map_err(serde::de::Error::custom)?;
        PublicKey::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;

    const FIXTURE: &str = "AtQaCqFnshaZQp6rIkvAPyzThvCvXSDO+9AzbxVErqJP";

    #[test]
    fn test_from_bytes_validation() {
        assert!(PublicKey::from_bytes(&[0x02; 33]).is_ok());
        assert!(PublicKey::from_bytes(&[0x03; 33]).is_ok());
        assert_eq!(
            PublicKey::from_bytes(&[0x04; 33]).unwrap_err(),
            Error::InvalidPublicKey { len: 33 }
        );
        assert_eq!(
            PublicKey::from_bytes(&[0x02; 32]).unwrap_err(),
            Error::InvalidPublicKey { len: 32 }
        );
    }

    #[test]
    fn test_amino_json() {
        let bytes = general_purpose::STANDARD.decode(FIXTURE).unwrap();
        let key = PublicKey::from_bytes(&bytes).unwrap();
        let json = serde_json::to_value(key).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "tendermint/PubKeySecp256k1", "value": FIXTURE})
        );
        let parsed: PublicKey = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, key);
        assert_eq!(
            key.to_bech32("cosmos").unwrap(),
            "cosmos1h806c7khnvmjlywdrkdgk2vrayy2mmvf9rxk2r"
        );
    }

    #[test]
    fn test_from_verifying_key() {
        let signing_key = SigningKey::from_slice(&[7u8; 32]).unwrap();
        let key = PublicKey::from(signing_key.verifying_key());
        assert_eq!(key.to_verifying_key().unwrap(), *signing_key.verifying_key());
    }

    #[test]
    fn test_rejects_unknown_type() {
        let json = serde_json::json!({"type": "tendermint/PubKeyEd25519", "value": FIXTURE});
        assert!(serde_json::from_value::<PublicKey>(json).is_err());
    }
}
