//! Device signature normalization
//!
//! Signing devices return ECDSA signatures either as the raw 64-byte `r||s`
//! concatenation or DER-encoded:
//!
//! ```text
//! 0x30 <seq-len> 0x02 <r-len> <r bytes> 0x02 <s-len> <s bytes>
//! ```
//!
//! DER integers are minimal and signed, so a scalar can be 33 bytes (leading
//! `0x00` when the high bit is set) or shorter than 32 bytes. Both are
//! normalized to exactly 32 big-endian bytes.

use crate::keys::PublicKey;
use base64::{engine::general_purpose, Engine as _};
use k256::ecdsa::Signature;
use likesign_errors::{DerFault, Result};
use signature::Verifier;
use std::fmt;
use thiserror::Error;

/// Length of a raw `r||s` signature
pub const RAW_SIGNATURE_LEN: usize = 64;

const SCALAR_LEN: usize = 32;
const SEQUENCE_TAG: u8 = 0x30;
const INTEGER_TAG: u8 = 0x02;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("public key is not a valid secp256k1 point")]
    InvalidPublicKey,

    #[error("verification failed")]
    VerificationFailed,
}

/// Signature in wire format: 32-byte `r` followed by 32-byte `s`
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RawSignature([u8; RAW_SIGNATURE_LEN]);

impl RawSignature {
    pub fn from_bytes(bytes: [u8; RAW_SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; RAW_SIGNATURE_LEN] {
        &self.0
    }

    pub fn r(&self) -> &[u8] {
        &self.0[..SCALAR_LEN]
    }

    pub fn s(&self) -> &[u8] {
        &self.0[SCALAR_LEN..]
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(self.0)
    }

    /// Check this signature over `SHA256(message)` against `public_key`.
    ///
    /// A high-S signature is accepted; it is normalized before verification.
    pub fn verify(
        &self,
        public_key: &PublicKey,
        message: &[u8],
    ) -> std::result::Result<(), SignatureError> {
        let key = public_key
            .to_verifying_key()
            .map_err(|_| SignatureError::InvalidPublicKey)?;
        let sig =
            Signature::from_slice(&self.0).map_err(|_| SignatureError::VerificationFailed)?;
        let sig = sig.normalize_s().unwrap_or(sig);
        key.verify(message, &sig)
            .map_err(|_| SignatureError::VerificationFailed)
    }
}

impl fmt::Debug for RawSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawSignature({})", hex::encode(self.0))
    }
}

/// Convert a device signature into raw `r||s`.
///
/// Exactly 64 bytes are taken to be raw already; anything else is parsed as DER.
pub fn normalize_signature(signature: &[u8]) -> Result<RawSignature> {
    if let Ok(raw) = <[u8; RAW_SIGNATURE_LEN]>::try_from(signature) {
        return Ok(RawSignature(raw));
    }

    let mut reader = DerReader::new(signature);
    reader.expect_tag(SEQUENCE_TAG)?;
    reader.read_len("sequence length")?;

    reader.expect_tag(INTEGER_TAG)?;
    let r_len = reader.read_len("r length")?;
    let r = reader.read_bytes("r", r_len)?;

    reader.expect_tag(INTEGER_TAG)?;
    let s_len = reader.read_len("s length")?;
    let s = reader.read_bytes("s", s_len)?;

    let mut raw = [0u8; RAW_SIGNATURE_LEN];
    copy_scalar(r, &mut raw[..SCALAR_LEN]);
    copy_scalar(s, &mut raw[SCALAR_LEN..]);
    Ok(RawSignature(raw))
}

/// Right-align `scalar` in `out`: keep the trailing 32 bytes of a longer
/// integer, left-pad a shorter one with zeros.
fn copy_scalar(scalar: &[u8], out: &mut [u8]) {
    if scalar.len() >= out.len() {
        out.copy_from_slice(&scalar[scalar.len() - out.len()..]);
    } else {
        let pad = out.len() - scalar.len();
        out[pad..].copy_from_slice(scalar);
    }
}

/// Bounds-checked cursor over a DER buffer
struct DerReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> DerReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    fn expect_tag(&mut self, expected: u8) -> std::result::Result<(), DerFault> {
        let observed = *self.buf.get(self.pos).ok_or(DerFault::MissingTag {
            expected,
            offset: self.pos,
        })?;
        if observed != expected {
            return Err(DerFault::UnexpectedTag { expected, observed });
        }
        self.pos += 1;
        Ok(())
    }

    fn read_len(&mut self, field: &'static str) -> std::result::Result<usize, DerFault> {
        let len = *self.buf.get(self.pos).ok_or(DerFault::Truncated {
            field,
            offset: self.pos,
            needed: 1,
            available: 0,
        })?;
        self.pos += 1;
        Ok(usize::from(len))
    }

    fn read_bytes(
        &mut self,
        field: &'static str,
        len: usize,
    ) -> std::result::Result<&'a [u8], DerFault> {
        let end = self.pos.checked_add(len);
        let bytes = end
            .and_then(|end| self.buf.get(self.pos..end))
            .ok_or(DerFault::Truncated {
                field,
                offset: self.pos,
                needed: len,
                available: self.remaining(),
            })?;
        self.pos += len;
        Ok(bytes)
    }
}
