//! Error taxonomy for the likesign signing workspace.
//!
//! Every crate in the workspace reports failures of the signing pipeline through
//! [`Error`]. Crate-specific error enums (client, ledger, config) wrap it rather
//! than re-declaring the same conditions.

use thiserror::Error;

/// Reason a device signature could not be decoded as DER.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DerFault {
    /// A tag byte was present but not the one the layout requires
    #[error("expected tag 0x{expected:02x}, got 0x{observed:02x}")]
    UnexpectedTag { expected: u8, observed: u8 },

    /// The buffer ended where a tag byte was required
    #[error("expected tag 0x{expected:02x} at offset {offset}, got end of input")]
    MissingTag { expected: u8, offset: usize },

    /// A length byte or payload runs past the end of the buffer
    #[error("{field} needs {needed} byte(s) at offset {offset}, only {available} available")]
    Truncated {
        field: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },
}

/// Core error type for likesign operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Public key is not a 33-byte compressed secp256k1 key
    #[error("invalid public key:: expected 33 compressed bytes, got {len}")]
    InvalidPublicKey { len: usize },

    /// Address or human-readable prefix could not be encoded or decoded
    #[error("invalid address:: {0}")]
    InvalidAddress(String),

    /// Message kind has no gas table entry or is not a known amino type
    #[error("unknown message type:: {0}")]
    UnknownMessageType(String),

    /// Amount, gas or gas price outside the representable range
    #[error("invalid amount:: {0}")]
    InvalidAmount(String),

    /// Device signature is neither raw r||s nor well-formed DER
    #[error("malformed signature:: {0}")]
    MalformedSignature(#[from] DerFault),

    /// Value could not be serialized into its wire form
    #[error("encoding error:: {0}")]
    Encoding(String),

    /// Transport-level failure talking to the chain
    #[error("network error:: {0}")]
    Network(String),

    /// The chain accepted the request but reported the transaction as failed
    #[error("remote rejection:: {log}")]
    RemoteRejection { log: String },

    /// Confirmation polling gave up before the transaction was found
    #[error("confirmation timed out after {attempts} attempt(s)")]
    Timeout { attempts: u32 },

    /// Operation was abandoned through its cancellation token
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Numeric code of this error, see [`codes`]
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidPublicKey { .. } => codes::INVALID_PUBLIC_KEY,
            Error::InvalidAddress(_) => codes::INVALID_ADDRESS,
            Error::UnknownMessageType(_) => codes::UNKNOWN_MESSAGE_TYPE,
            Error::InvalidAmount(_) => codes::INVALID_AMOUNT,
            Error::MalformedSignature(_) => codes::MALFORMED_SIGNATURE,
            Error::Encoding(_) => codes::ENCODING,
            Error::Network(_) => codes::NETWORK,
            Error::RemoteRejection { .. } => codes::REMOTE_REJECTION,
            Error::Timeout { .. } => codes::TIMEOUT,
            Error::Cancelled => codes::CANCELLED,
        }
    }
}

/// Result type alias for likesign operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error codes, stable across releases
pub mod codes {
    /// Success
    pub const OK: u32 = 0;
    /// Public key malformed
    pub const INVALID_PUBLIC_KEY: u32 = 2;
    /// Address malformed
    pub const INVALID_ADDRESS: u32 = 3;
    /// Message kind not mapped
    pub const UNKNOWN_MESSAGE_TYPE: u32 = 4;
    /// Amount out of range
    pub const INVALID_AMOUNT: u32 = 5;
    /// Signature undecodable
    pub const MALFORMED_SIGNATURE: u32 = 6;
    /// Serialization failed
    pub const ENCODING: u32 = 7;
    /// Transport failure
    pub const NETWORK: u32 = 10;
    /// Chain-side failure
    pub const REMOTE_REJECTION: u32 = 11;
    /// Polling exhausted
    pub const TIMEOUT: u32 = 12;
    /// Cancelled by caller
    pub const CANCELLED: u32 = 13;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownMessageType("cosmos-sdk/MsgVote".to_string());
        assert_eq!(err.to_string(), "unknown message type:: cosmos-sdk/MsgVote");

        let err = Error::from(DerFault::UnexpectedTag {
            expected: 0x30,
            observed: 0x31,
        });
        assert_eq!(
            err.to_string(),
            "malformed signature:: expected tag 0x30, got 0x31"
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::InvalidPublicKey { len: 32 }.code(), codes::INVALID_PUBLIC_KEY);
        assert_eq!(Error::Cancelled.code(), codes::CANCELLED);
        assert_ne!(Error::Timeout { attempts: 1 }.code(), codes::OK);
    }
}
