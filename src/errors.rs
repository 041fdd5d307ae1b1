use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletError {
    // Network errors
    NetworkError(String),
    ConnectionTimeout,
    InvalidResponse(String),
    RpcError { code: i32, message: String },

    // Provider errors
    ProviderError(String),
    SigningRejected(String),
    NotAuthenticated,
    SessionTimeout,

    // Validation errors
    ValidationError(String),
    InvalidAddress(String),
    InvalidAmount(String),

    // Transaction errors
    TransactionBuild(String),
    TransactionFailed(String),
    ConfirmationTimeout(String),

    // Generic errors
    Unknown(String),
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WalletError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            WalletError::ConnectionTimeout => write!(f, "Connection timeout"),
            WalletError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            WalletError::RpcError { code, message } => {
                write!(f, "RPC error {}: {}", code, message)
            }

            WalletError::ProviderError(msg) => write!(f, "Wallet provider error: {}", msg),
            WalletError::SigningRejected(msg) => write!(f, "Signing rejected: {}", msg),
            WalletError::NotAuthenticated => write!(f, "No wallet session"),
            WalletError::SessionTimeout => {
                write!(f, "Wallet not ready before the sign-in timeout")
            }

            WalletError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            WalletError::InvalidAddress(msg) => write!(f, "Invalid address: {}", msg),
            WalletError::InvalidAmount(msg) => write!(f, "Invalid amount: {}", msg),

            WalletError::TransactionBuild(msg) => {
                write!(f, "Transaction build error: {}", msg)
            }
            WalletError::TransactionFailed(msg) => write!(f, "Transaction failed: {}", msg),
            WalletError::ConfirmationTimeout(signature) => {
                write!(f, "Confirmation timed out for {}", signature)
            }

            WalletError::Unknown(msg) => write!(f, "Unknown error: {}", msg),
        }
    }
}

impl std::error::Error for WalletError {}

pub type WalletResult<T> = Result<T, WalletError>;

// Conversion helpers
impl From<reqwest::Error> for WalletError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            WalletError::ConnectionTimeout
        } else if error.is_decode() {
            WalletError::InvalidResponse(error.to_string())
        } else {
            WalletError::NetworkError(error.to_string())
        }
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(error: serde_json::Error) -> Self {
        WalletError::InvalidResponse(format!("JSON error: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_keeps_rpc_code_and_message() {
        let err = WalletError::RpcError {
            code: -32602,
            message: "invalid params".to_string(),
        };
        assert_eq!(err.to_string(), "RPC error -32602: invalid params");
    }

    #[test]
    fn display_session_timeout_is_user_readable() {
        let err = WalletError::SessionTimeout;
        assert_eq!(err.to_string(), "Wallet not ready before the sign-in timeout");
    }

    #[test]
    fn serde_json_errors_map_to_invalid_response() {
        let parse_err = serde_json::from_str::<u64>("not json").unwrap_err();
        let err = WalletError::from(parse_err);
        assert!(matches!(err, WalletError::InvalidResponse(_)));
    }
}
