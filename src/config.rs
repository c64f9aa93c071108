//! Application configuration loaded from environment variables.

use std::time::Duration;

use serde::Deserialize;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{read_keypair_file, Keypair};

use crate::error::ConfigError;
use crate::program::PROGRAM_ID;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Cluster ===
    /// JSON-RPC endpoint.
    #[serde(default = "default_rpc_url")]
    pub solana_rpc_url: String,

    /// Commitment level: processed, confirmed or finalized.
    #[serde(default = "default_commitment")]
    pub solana_commitment: String,

    /// Per-request RPC timeout.
    #[serde(default = "default_timeout_ms")]
    pub rpc_timeout_ms: u64,

    // === Program ===
    /// Override of the deployed program id (base58).
    #[serde(default)]
    pub predictx_program_id: Option<String>,

    // === Wallet ===
    /// Keypair file used to sign. Without it the client is read-only.
    #[serde(default)]
    pub solana_keypair_path: Option<String>,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_rpc_url() -> String {
    "https://api.devnet.solana.com".to_string()
}

fn default_commitment() -> String {
    "confirmed".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            solana_rpc_url: default_rpc_url(),
            solana_commitment: default_commitment(),
            rpc_timeout_ms: default_timeout_ms(),
            predictx_program_id: None,
            solana_keypair_path: None,
            rust_log: default_log_level(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env()?)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.solana_rpc_url.trim().is_empty() {
            return Err(ConfigError::MissingRpcUrl);
        }
        self.program_id()?;
        self.commitment()?;
        Ok(())
    }

    /// Program id, falling back to the deployed one.
    pub fn program_id(&self) -> Result<Pubkey, ConfigError> {
        match &self.predictx_program_id {
            Some(id) => id
                .parse()
                .map_err(|_| ConfigError::InvalidProgramId(id.clone())),
            None => Ok(PROGRAM_ID),
        }
    }

    /// Parsed commitment level.
    pub fn commitment(&self) -> Result<CommitmentConfig, ConfigError> {
        match self.solana_commitment.to_lowercase().as_str() {
            "processed" => Ok(CommitmentConfig::processed()),
            "confirmed" => Ok(CommitmentConfig::confirmed()),
            "finalized" => Ok(CommitmentConfig::finalized()),
            other => Err(ConfigError::InvalidCommitment(other.to_string())),
        }
    }

    /// RPC request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }

    /// Read the signing keypair, if one is configured.
    pub fn load_signer(&self) -> Result<Option<Keypair>, ConfigError> {
        let Some(path) = &self.solana_keypair_path else {
            return Ok(None);
        };

        read_keypair_file(path)
            .map(Some)
            .map_err(|e| ConfigError::Keypair {
                path: path.clone(),
                reason: e.to_string(),
            })
    }
}
