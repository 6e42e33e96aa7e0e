//! BIP44 paths as understood by the Cosmos device app
//!
//! Only paths of the form `m/44'/118'/{account}'/{change}/{index}` are
//! accepted: purpose, coin type and account hardened; change and index not.

use crate::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// BIP44 purpose
pub const PURPOSE: u32 = 44;

/// Cosmos SDK coin type as defined in SLIP-0044
pub const COSMOS_COIN_TYPE: u32 = 118;

/// Derivation path of one device account
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LedgerPath {
    pub account: u32,
    pub change: u32,
    pub index: u32,
}

impl LedgerPath {
    /// `m/44'/118'/0'/0/{index}`
    pub fn new(index: u32) -> Self {
        Self {
            account: 0,
            change: 0,
            index,
        }
    }

    /// The five components sent to the device, without hardening bits
    pub fn components(&self) -> [u32; 5] {
        [PURPOSE, COSMOS_COIN_TYPE, self.account, self.change, self.index]
    }
}

impl fmt::Display for LedgerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "m/{PURPOSE}'/{COSMOS_COIN_TYPE}'/{}'/{}/{}",
            self.account, self.change, self.index
        )
    }
}

impl FromStr for LedgerPath {
    type Err = LedgerError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| LedgerError::InvalidPath(format!("{path}: {reason}"));

        let rest = path
            .strip_prefix("m/")
            .or_else(|| path.strip_prefix("M/"))
            .ok_or_else(|| invalid("must start with 'm/'"))?;

        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() != 5 {
            return Err(invalid("expected 5 components"));
        }

        let mut values = [0u32; 5];
        for (i, component) in parts.iter().enumerate() {
            let (digits, hardened) = match component
                .strip_suffix('\'')
                .or_else(|| component.strip_suffix('h'))
            {
                Some(digits) => (digits, true),
                None => (*component, false),
            };
            if hardened != (i < 3) {
                return Err(invalid("only purpose, coin type and account are hardened"));
            }
            values[i] = digits
                .parse()
                .map_err(|_| invalid(&format!("invalid component {component}")))?;
        }

        if values[0] != PURPOSE || values[1] != COSMOS_COIN_TYPE {
            return Err(invalid("expected purpose 44' and coin type 118'"));
        }
        if values[2] >= 1 << 31 {
            return Err(invalid("hardened account index too large"));
        }

        Ok(Self {
            account: values[2],
            change: values[3],
            index: values[4],
        })
    }
}
