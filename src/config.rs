use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::WalletError;
use crate::rpc::Commitment;

pub const ENV_RPC_URL: &str = "ONBOARDX_RPC_URL";
pub const ENV_NETWORK: &str = "ONBOARDX_NETWORK";
pub const ENV_APP_NAME: &str = "ONBOARDX_APP_NAME";

pub const DEVNET_RPC_URL: &str = "https://api.devnet.solana.com";
pub const TESTNET_RPC_URL: &str = "https://api.testnet.solana.com";
pub const MAINNET_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Named Solana network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    Devnet,
    Testnet,
    MainnetBeta,
}

impl Cluster {
    /// Public RPC endpoint for the cluster.
    pub fn rpc_url(&self) -> &'static str {
        match self {
            Cluster::Devnet => DEVNET_RPC_URL,
            Cluster::Testnet => TESTNET_RPC_URL,
            Cluster::MainnetBeta => MAINNET_RPC_URL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cluster::Devnet => "devnet",
            Cluster::Testnet => "testnet",
            Cluster::MainnetBeta => "mainnet-beta",
        }
    }
}

impl FromStr for Cluster {
    type Err = WalletError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "devnet" => Ok(Cluster::Devnet),
            "testnet" => Ok(Cluster::Testnet),
            "mainnet-beta" | "mainnet" => Ok(Cluster::MainnetBeta),
            other => Err(WalletError::ValidationError(format!(
                "Unknown cluster '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub cluster: Cluster,
    pub rpc_url: String,
    pub commitment: Commitment,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            cluster: Cluster::Devnet,
            rpc_url: DEVNET_RPC_URL.to_string(),
            commitment: Commitment::Confirmed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandingConfig {
    pub app_name: String,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            app_name: "OnboardX".to_string(),
        }
    }
}

/// Tuning for the authentication polling step.
///
/// The provider's connect call resolves before its address binding is
/// guaranteed visible, so the sequencer re-checks at `poll_interval` until
/// `connect_timeout` elapses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub connect_timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            poll_interval_ms: 150,
        }
    }
}

impl SessionConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub network: NetworkConfig,
    pub branding: BrandingConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    /// Build the configuration from the environment, falling back to the
    /// devnet defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = env::var(ENV_NETWORK) {
            match raw.parse::<Cluster>() {
                Ok(cluster) => {
                    config.network.cluster = cluster;
                    config.network.rpc_url = cluster.rpc_url().to_string();
                }
                Err(_) => {
                    tracing::warn!(value = %raw, "unrecognized {}, keeping devnet", ENV_NETWORK);
                }
            }
        }

        if let Ok(url) = env::var(ENV_RPC_URL) {
            if !url.trim().is_empty() {
                config.network.rpc_url = url.trim().to_string();
            }
        }

        if let Ok(name) = env::var(ENV_APP_NAME) {
            if !name.trim().is_empty() {
                config.branding.app_name = name.trim().to_string();
            }
        }

        config
    }
}
