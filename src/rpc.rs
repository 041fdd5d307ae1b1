/// Ledger RPC client for communicating with Solana nodes
///
/// This module provides HTTP-based JSON-RPC 2.0 communication with a Solana
/// node, implementing the handful of methods the wallet actions need. It is
/// deliberately wire-thin: no retries, no failover — errors surface to the
/// sequencer unmodified except for string formatting.
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::{sleep, Instant};

use crate::errors::{WalletError, WalletResult};
use crate::validation::InputValidator;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const CONFIRM_TIMEOUT: Duration = Duration::from_secs(30);
const CONFIRM_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Confirmation-depth guarantee requested from the node.
///
/// Ordering follows confirmation depth, so a status can be compared against
/// the requested commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

impl FromStr for Commitment {
    type Err = WalletError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(WalletError::ValidationError(format!(
                "Unknown commitment '{}'",
                other
            ))),
        }
    }
}

/// Short-lived reference value required to build a valid transaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LatestBlockhash {
    pub blockhash: String,
    #[serde(rename = "lastValidBlockHeight")]
    pub last_valid_block_height: u64,
}

/// Ledger operations the wallet actions depend on.
///
/// `SolanaRpcClient` is the production implementation; tests substitute
/// in-memory fakes.
#[allow(async_fn_in_trait)]
pub trait LedgerRpc: Send + Sync {
    /// Balance of `address` in base units (lamports).
    async fn get_balance(&self, address: &str) -> WalletResult<u64>;

    /// Request a faucet credit and return the transaction signature.
    async fn request_airdrop(&self, address: &str, lamports: u64) -> WalletResult<String>;

    async fn get_latest_blockhash(&self) -> WalletResult<LatestBlockhash>;

    /// Submit a base64-encoded wire transaction, returning its signature.
    async fn send_transaction(&self, transaction_base64: &str) -> WalletResult<String>;

    /// Block until `signature` reaches the configured commitment.
    async fn confirm_transaction(&self, signature: &str) -> WalletResult<()>;
}

/// JSON-RPC request structure
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

/// JSON-RPC response structure
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

/// JSON-RPC error structure
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

/// Solana wraps most query results in a `{context, value}` envelope.
#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct SignatureStatus {
    #[serde(rename = "confirmationStatus")]
    confirmation_status: Option<String>,
    err: Option<serde_json::Value>,
}

/// HTTP client for Solana JSON-RPC communication
pub struct SolanaRpcClient {
    client: Client,
    endpoint: String,
    commitment: Commitment,
    request_id: AtomicU64,
}

impl SolanaRpcClient {
    pub fn new(endpoint: &str, commitment: Commitment) -> WalletResult<Self> {
        InputValidator::new()?.validate_rpc_url(endpoint)?;

        let client = Client::builder().timeout(HTTP_TIMEOUT).build().map_err(|e| {
            WalletError::NetworkError(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(SolanaRpcClient {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            commitment,
            request_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn commitment(&self) -> Commitment {
        self.commitment
    }

    /// Make a JSON-RPC call to the node
    async fn rpc_call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> WalletResult<T> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        tracing::debug!(method, id, "ledger rpc call");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WalletError::NetworkError(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let rpc_response: JsonRpcResponse<T> = response.json().await?;

        if let Some(error) = rpc_response.error {
            return Err(WalletError::RpcError {
                code: error.code,
                message: error.message,
            });
        }

        rpc_response
            .result
            .ok_or_else(|| WalletError::InvalidResponse("No result in RPC response".to_string()))
    }
}

impl LedgerRpc for SolanaRpcClient {
    async fn get_balance(&self, address: &str) -> WalletResult<u64> {
        let params = json!([address, { "commitment": self.commitment }]);
        let envelope: RpcEnvelope<u64> = self.rpc_call("getBalance", params).await?;
        Ok(envelope.value)
    }

    async fn request_airdrop(&self, address: &str, lamports: u64) -> WalletResult<String> {
        let params = json!([address, lamports, { "commitment": self.commitment }]);
        self.rpc_call("requestAirdrop", params).await
    }

    async fn get_latest_blockhash(&self) -> WalletResult<LatestBlockhash> {
        // A finalized blockhash survives longer than the confirmation wait
        let params = json!([{ "commitment": Commitment::Finalized }]);
        let envelope: RpcEnvelope<LatestBlockhash> =
            self.rpc_call("getLatestBlockhash", params).await?;
        Ok(envelope.value)
    }

    async fn send_transaction(&self, transaction_base64: &str) -> WalletResult<String> {
        let params = json!([
            transaction_base64,
            { "encoding": "base64", "preflightCommitment": self.commitment }
        ]);
        self.rpc_call("sendTransaction", params).await
    }

    async fn confirm_transaction(&self, signature: &str) -> WalletResult<()> {
        let deadline = Instant::now() + CONFIRM_TIMEOUT;

        loop {
            let params = json!([[signature], { "searchTransactionHistory": false }]);
            let envelope: RpcEnvelope<Vec<Option<SignatureStatus>>> =
                self.rpc_call("getSignatureStatuses", params).await?;

            if let Some(Some(status)) = envelope.value.into_iter().next() {
                if let Some(err) = status.err {
                    return Err(WalletError::TransactionFailed(err.to_string()));
                }
                if let Some(reached) = status
                    .confirmation_status
                    .as_deref()
                    .and_then(|s| s.parse::<Commitment>().ok())
                {
                    if reached >= self.commitment {
                        return Ok(());
                    }
                }
            }

            if Instant::now() >= deadline {
                return Err(WalletError::ConfirmationTimeout(signature.to_string()));
            }
            sleep(CONFIRM_POLL_INTERVAL).await;
        }
    }
}
