//! Codec limits and signer settings.
//!
//! Configuration is a JSON document with two optional sections:
//!
//! ```json
//! {
//!   "limits": { "max_rlp_depth": 16, "max_abi_depth": 32 },
//!   "signer": { "max_attempts": 1024, "chain_id_policy": "required" }
//! }
//! ```
//!
//! Missing keys take their defaults; unknown keys are rejected. Two
//! environment variables override the file: `ETHKIT_MAX_SIGNING_ATTEMPTS`
//! and `ETHKIT_CHAIN_ID_POLICY`.

use core::fmt;
use core::str::FromStr;
use std::path::Path;

use ethkit_common::MAX_TX_SIZE;
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`SignerConfig::max_attempts`].
pub const ENV_MAX_SIGNING_ATTEMPTS: &str = "ETHKIT_MAX_SIGNING_ATTEMPTS";

/// Environment variable overriding [`SignerConfig::chain_id_policy`].
pub const ENV_CHAIN_ID_POLICY: &str = "ETHKIT_CHAIN_ID_POLICY";

/// Default number of signing attempts before giving up.
pub const DEFAULT_MAX_SIGNING_ATTEMPTS: u32 = 1024;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Decoder bounds.
    pub limits: CodecLimits,
    /// Signing behaviour.
    pub signer: SignerConfig,
}

/// Bounds applied by the RLP and ABI decoders to untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecLimits {
    /// Maximum RLP list nesting.
    pub max_rlp_depth: usize,
    /// Maximum ABI array/tuple nesting.
    pub max_abi_depth: usize,
    /// Maximum byte length of a single decoded `bytes`/`string` value.
    pub max_dynamic_size: usize,
    /// Maximum element count of a decoded dynamic array.
    pub max_array_len: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_rlp_depth: 16,
            max_abi_depth: 32,
            max_dynamic_size: MAX_TX_SIZE,
            max_array_len: 4096,
        }
    }
}

/// How legacy transactions without a chain ID are treated at signing time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainIdPolicy {
    /// Sign pre-EIP-155 (`v = 27 + recovery_id`) when no chain ID is set.
    #[default]
    Optional,
    /// Refuse to sign any transaction without a chain ID.
    Required,
}

impl FromStr for ChainIdPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "optional" => Ok(ChainIdPolicy::Optional),
            "required" => Ok(ChainIdPolicy::Required),
            _ => Err(ConfigError::InvalidEnv {
                key: ENV_CHAIN_ID_POLICY,
                value: s.to_string(),
            }),
        }
    }
}

/// Signing engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignerConfig {
    /// Attempts before `SigningError::ConsistencyCheckFailed`.
    pub max_attempts: u32,
    /// Chain ID requirement for legacy transactions.
    pub chain_id_policy: ChainIdPolicy,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_SIGNING_ATTEMPTS,
            chain_id_policy: ChainIdPolicy::Optional,
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    Io(std::io::Error),
    /// The configuration document is not valid.
    Parse(serde_json::Error),
    /// An environment override holds an unusable value.
    InvalidEnv {
        /// Variable name.
        key: &'static str,
        /// Offending value.
        value: String,
    },
    /// A value is out of range (for example zero signing attempts).
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config: {e}"),
            ConfigError::Parse(e) => write!(f, "invalid config: {e}"),
            ConfigError::InvalidEnv { key, value } => {
                write!(f, "invalid value {value:?} for {key}")
            }
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl Config {
    /// Parses a JSON configuration document.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::debug!("loading config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    pub fn apply_env_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_MAX_SIGNING_ATTEMPTS) {
            self.signer.max_attempts =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidEnv {
                        key: ENV_MAX_SIGNING_ATTEMPTS,
                        value: value.clone(),
                    })?;
        }
        if let Some(value) = lookup(ENV_CHAIN_ID_POLICY) {
            self.signer.chain_id_policy = value.parse()?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signer.max_attempts == 0 {
            return Err(ConfigError::Invalid("signer.max_attempts must be at least 1"));
        }
        if self.limits.max_rlp_depth == 0 || self.limits.max_abi_depth == 0 {
            return Err(ConfigError::Invalid("depth limits must be at least 1"));
        }
        Ok(())
    }
}
