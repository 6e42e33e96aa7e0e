//! Cryptographic primitives for likesign
//!
//! Compressed secp256k1 public keys as reported by the signing device, and the
//! conversion of device signatures into the 64-byte `r||s` wire format.

pub mod keys;
pub mod signature;

pub use keys::PublicKey;
pub use signature::{normalize_signature, RawSignature, SignatureError, RAW_SIGNATURE_LEN};
