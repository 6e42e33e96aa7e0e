//! Configuration management for the likesign client

use crate::confirm::PollConfig;
use likesign_types::{GasTable, DEFAULT_BECH32_PREFIX, DEFAULT_DENOM};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// I/O error
    #[error("io error:: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("toml parsing error:: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("toml serialization error:: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Unknown key passed to `config set`
    #[error("unknown configuration key:: {0}")]
    UnknownKey(String),

    /// Value that does not parse for its key
    #[error("invalid value for {key}:: {value}")]
    InvalidValue { key: String, value: String },

    /// Gas table naming an unknown message type
    #[error(transparent)]
    Core(#[from] likesign_errors::Error),
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// LCD REST endpoint
    pub node: String,
    /// Chain ID
    pub chain_id: String,
    /// Fee and amount denomination
    pub denom: String,
    /// Bech32 human-readable prefix of account addresses
    pub bech32_prefix: String,
    /// Price per unit of gas, decimal string
    pub gas_price: String,
    /// Output format (json, text)
    pub output: String,
    /// Request timeout in seconds
    pub timeout: u64,
    /// Seconds between confirmation queries
    pub poll_interval: u64,
    /// Confirmation queries before giving up; unbounded when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_max_attempts: Option<u32>,
    /// Gas per message, keyed by amino type name; file entries override the defaults
    #[serde(deserialize_with = "merge_gas_table")]
    pub gas_table: BTreeMap<String, u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            node: "http://localhost:1317".to_string(),
            chain_id: "likecoin-chain".to_string(),
            denom: DEFAULT_DENOM.to_string(),
            bech32_prefix: DEFAULT_BECH32_PREFIX.to_string(),
            gas_price: "100".to_string(),
            output: "text".to_string(),
            timeout: 30,
            poll_interval: 6,
            poll_max_attempts: None,
            gas_table: GasTable::default().to_type_names(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get default configuration directory
    pub fn default_config_dir() -> PathBuf {
        if let Some(home) = dirs::home_dir() {
            home.join(".likesign")
        } else {
            PathBuf::from(".likesign")
        }
    }

    /// Configuration file inside `home`
    pub fn config_file(home: &Path) -> PathBuf {
        home.join("config.toml")
    }

    /// Load configuration from `home`, or defaults when no file exists yet
    pub fn load_or_default(home: &Path) -> Result<Self, ConfigError> {
        let config_path = Self::config_file(home);

        if config_path.exists() {
            Self::load_from_file(config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Initialize configuration directory and file
    pub fn init(home: &Path, overwrite: bool) -> Result<Self, ConfigError> {
        let config_file = Self::config_file(home);

        if !home.exists() {
            fs::create_dir_all(home)?;
        }

        if config_file.exists() && !overwrite {
            return Self::load_from_file(config_file);
        }

        let config = Self::default();
        config.save_to_file(config_file)?;
        Ok(config)
    }

    /// Set a configuration value
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "node" => {
                url::Url::parse(value).map_err(|_| invalid())?;
                self.node = value.to_string();
            }
            "chain_id" => self.chain_id = value.to_string(),
            "denom" => self.denom = value.to_string(),
            "bech32_prefix" => self.bech32_prefix = value.to_string(),
            "gas_price" => {
                let price = Decimal::from_str(value).map_err(|_| invalid())?;
                if price < Decimal::ZERO {
                    return Err(invalid());
                }
                self.gas_price = value.to_string();
            }
            "output" => match value {
                "text" | "json" => self.output = value.to_string(),
                _ => return Err(invalid()),
            },
            "timeout" => self.timeout = parse_nonzero(value).ok_or_else(invalid)?,
            "poll_interval" => self.poll_interval = parse_nonzero(value).ok_or_else(invalid)?,
            "poll_max_attempts" => {
                self.poll_max_attempts = match value {
                    "" | "none" => None,
                    n => Some(n.parse().map_err(|_| invalid())?),
                }
            }
            _ => {
                // gas_table.<amino type name>
                let Some(type_name) = key.strip_prefix("gas_table.") else {
                    return Err(ConfigError::UnknownKey(key.to_string()));
                };
                likesign_types::MessageKind::from_str(type_name)?;
                let gas = value.parse().map_err(|_| invalid())?;
                self.gas_table.insert(type_name.to_string(), gas);
            }
        }
        Ok(())
    }

    /// `timeout` and `poll_interval` must be non-zero, also when hand-edited
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [("timeout", self.timeout), ("poll_interval", self.poll_interval)] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Gas table with every type name validated
    pub fn gas_table(&self) -> Result<GasTable, ConfigError> {
        Ok(GasTable::from_type_names(
            self.gas_table.iter().map(|(name, gas)| (name.as_str(), *gas)),
        )?)
    }

    pub fn gas_price(&self) -> Result<Decimal, ConfigError> {
        Decimal::from_str(&self.gas_price).map_err(|_| ConfigError::InvalidValue {
            key: "gas_price".to_string(),
            value: self.gas_price.clone(),
        })
    }

    pub fn poll_config(&self) -> Result<PollConfig, ConfigError> {
        self.validate()?;
        Ok(PollConfig {
            interval: Duration::from_secs(self.poll_interval),
            max_attempts: self.poll_max_attempts,
            deadline: None,
        })
    }
}

fn parse_nonzero(value: &str) -> Option<u64> {
    value.parse().ok().filter(|n| *n > 0)
}

fn merge_gas_table<'de, D>(deserializer: D) -> Result<BTreeMap<String, u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut table = GasTable::default().to_type_names();
    table.extend(BTreeMap::<String, u64>::deserialize(deserializer)?);
    Ok(table)
}
