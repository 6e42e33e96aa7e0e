//! Account addresses derived from secp256k1 public keys

use bech32::{Bech32, Hrp};
use likesign_errors::{Error, Result};
use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Human-readable prefix used when none is configured
pub const DEFAULT_BECH32_PREFIX: &str = "cosmos";

/// Length of a compressed secp256k1 public key
pub const COMPRESSED_PUBKEY_LEN: usize = 33;

/// Account address - 20 bytes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccAddress([u8; 20]);

impl AccAddress {
    /// Create an address from a compressed public key using the standard derivation
    /// ripemd160(sha256(pubkey_bytes))
    pub fn from_pubkey(pubkey_bytes: &[u8]) -> Result<Self> {
        if pubkey_bytes.len() != COMPRESSED_PUBKEY_LEN {
            return Err(Error::InvalidPublicKey {
                len: pubkey_bytes.len(),
            });
        }

        let sha256_hash = Sha256::digest(pubkey_bytes);
        let ripemd160_hash = Ripemd160::digest(sha256_hash);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&ripemd160_hash);
        Ok(Self(bytes))
    }

    /// Convert to Bech32 string with the given prefix
    pub fn to_bech32(&self, hrp_str: &str) -> Result<String> {
        let hrp = Hrp::parse(hrp_str)
            .map_err(|e| Error::InvalidAddress(format!("prefix {hrp_str:?}: {e}")))?;
        bech32::encode::<Bech32>(hrp, &self.0).map_err(|e| Error::InvalidAddress(e.to_string()))
    }

    /// Parse from Bech32 string, returning the prefix alongside the address
    pub fn from_bech32(s: &str) -> Result<(String, Self)> {
        let (hrp, data) = bech32::decode(s).map_err(|e| Error::InvalidAddress(e.to_string()))?;
        if data.len() != 20 {
            return Err(Error::InvalidAddress(format!(
                "expected 20 address bytes, got {}",
                data.len()
            )));
        }
        let mut addr_bytes = [0u8; 20];
        addr_bytes.copy_from_slice(&data);
        Ok((hrp.to_string(), Self(addr_bytes)))
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for AccAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = self
            .to_bech32(DEFAULT_BECH32_PREFIX)
            .map_err(|_| fmt::Error)?;
        f.write_str(&encoded)
    }
}

impl FromStr for AccAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (_, addr) = Self::from_bech32(s)?;
        Ok(addr)
    }
}

/// Derive the bech32 account address for a compressed public key.
pub fn derive_address(pubkey: &[u8], prefix: &str) -> Result<String> {
    AccAddress::from_pubkey(pubkey)?.to_bech32(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    // Public key "AtQaCqFnshaZQp6rIkvAPyzThvCvXSDO+9AzbxVErqJP"
    const FIXTURE_PUBKEY_HEX: &str =
        "02d41a0aa167b21699429eab224bc03f2cd386f0af5d20cefbd0336f1544aea24f";

    fn fixture_pubkey() -> Vec<u8> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode("AtQaCqFnshaZQp6rIkvAPyzThvCvXSDO+9AzbxVErqJP")
            .unwrap();
        assert_eq!(hex_string(&bytes), FIXTURE_PUBKEY_HEX);
        bytes
    }

    fn hex_string(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn test_derive_address_golden() {
        let address = derive_address(&fixture_pubkey(), DEFAULT_BECH32_PREFIX).unwrap();
        assert_eq!(address, "cosmos1h806c7khnvmjlywdrkdgk2vrayy2mmvf9rxk2r");
    }

    #[test]
    fn test_derive_address_custom_prefix() {
        let address = derive_address(&fixture_pubkey(), "like").unwrap();
        assert_eq!(address, "like1h806c7khnvmjlywdrkdgk2vrayy2mmvfkl65fc");
    }

    #[test]
    fn test_rejects_wrong_length() {
        let err = derive_address(&[2u8; 32], "cosmos").unwrap_err();
        assert_eq!(err, Error::InvalidPublicKey { len: 32 });

        let err = AccAddress::from_pubkey(&[2u8; 65]).unwrap_err();
        assert_eq!(err, Error::InvalidPublicKey { len: 65 });
    }

    #[test]
    fn test_rejects_invalid_prefix() {
        let addr = AccAddress::from_pubkey(&[2u8; 33]).unwrap();
        assert!(matches!(addr.to_bech32(""), Err(Error::InvalidAddress(_))));
    }

    #[test]
    fn test_bech32_round_trip() {
        let addr = AccAddress::from_pubkey(&fixture_pubkey()).unwrap();
        let (hrp, parsed) =
            AccAddress::from_bech32("cosmos1h806c7khnvmjlywdrkdgk2vrayy2mmvf9rxk2r").unwrap();
        assert_eq!(hrp, "cosmos");
        assert_eq!(parsed, addr);
        assert_eq!(addr.to_string(), "cosmos1h806c7khnvmjlywdrkdgk2vrayy2mmvf9rxk2r");
    }

    #[test]
    fn test_from_bech32_rejects_bad_checksum() {
        assert!(AccAddress::from_str("cosmos1h806c7khnvmjlywdrkdgk2vrayy2mmvf9rxk2q").is_err());
    }
}
