use regex::Regex;
use url::Url;

use crate::errors::{WalletError, WalletResult};
use crate::view::LAMPORTS_PER_SOL;

/// Largest amount (in SOL) accepted from user input.
const MAX_AMOUNT_SOL: f64 = 1_000.0;

/// Input validation utilities for the wallet
pub struct InputValidator {
    // Base58 pre-check; the decode below is the authoritative length check
    address_pattern: Regex,
}

impl InputValidator {
    pub fn new() -> WalletResult<Self> {
        let address_pattern = Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$")
            .map_err(|e| WalletError::ValidationError(format!("Invalid address regex: {}", e)))?;

        Ok(InputValidator { address_pattern })
    }

    /// Validate a wallet address: Base58 text decoding to exactly 32 bytes.
    pub fn validate_address(&self, address: &str) -> WalletResult<()> {
        if address.is_empty() {
            return Err(WalletError::ValidationError(
                "Address cannot be empty".to_string(),
            ));
        }

        if !self.address_pattern.is_match(address) {
            return Err(WalletError::InvalidAddress(
                "Address is not valid Base58".to_string(),
            ));
        }

        let bytes = bs58::decode(address)
            .into_vec()
            .map_err(|e| WalletError::InvalidAddress(format!("Base58 decode failed: {}", e)))?;

        if bytes.len() != 32 {
            return Err(WalletError::InvalidAddress(format!(
                "Expected 32 bytes, got {}",
                bytes.len()
            )));
        }

        Ok(())
    }

    /// Validate an RPC endpoint URL.
    pub fn validate_rpc_url(&self, endpoint: &str) -> WalletResult<()> {
        let parsed = Url::parse(endpoint)
            .map_err(|e| WalletError::ValidationError(format!("Invalid RPC URL: {}", e)))?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(WalletError::ValidationError(format!(
                    "Unsupported RPC URL scheme '{}'",
                    other
                )));
            }
        }

        if parsed.host_str().is_none() {
            return Err(WalletError::ValidationError(
                "RPC URL has no host".to_string(),
            ));
        }

        Ok(())
    }

    /// Parse a user-supplied SOL amount into lamports.
    pub fn validate_amount_sol(&self, amount: &str) -> WalletResult<u64> {
        if amount.is_empty() {
            return Err(WalletError::ValidationError(
                "Amount cannot be empty".to_string(),
            ));
        }

        let parsed: f64 = amount
            .parse()
            .map_err(|_| WalletError::InvalidAmount("Amount is not a number".to_string()))?;

        if !parsed.is_finite() || parsed <= 0.0 {
            return Err(WalletError::InvalidAmount(
                "Amount must be positive".to_string(),
            ));
        }

        if parsed > MAX_AMOUNT_SOL {
            return Err(WalletError::InvalidAmount("Amount too large".to_string()));
        }

        Ok((parsed * LAMPORTS_PER_SOL as f64).round() as u64)
    }
}
