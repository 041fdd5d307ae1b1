//! The wallet application: six user-facing actions wired through the
//! sequencer, generic over the identity provider and the ledger RPC client.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::{WalletError, WalletResult};
use crate::provider::WalletProvider;
use crate::rpc::LedgerRpc;
use crate::sequencer::{ActionSequencer, Dispatch};
use crate::transfer::TransferPlan;
use crate::view::{format_sol, lamports_to_sol, ViewState, LAMPORTS_PER_SOL};

/// Faucet credit requested when no amount is given: 0.1 SOL.
pub const DEFAULT_AIRDROP_LAMPORTS: u64 = LAMPORTS_PER_SOL / 10;

/// Self-transfer amount when no amount is given: 0.01 SOL.
pub const DEFAULT_TRANSFER_LAMPORTS: u64 = LAMPORTS_PER_SOL / 100;

/// Demo text signed by the sign-message action.
pub const DEMO_SIGN_MESSAGE: &str = "Hello from OnboardX";

/// Hex characters shown of a message signature.
const SIGNATURE_PREVIEW_CHARS: usize = 18;

pub struct WalletApp<P, L> {
    provider: Arc<P>,
    ledger: Arc<L>,
    sequencer: ActionSequencer<P>,
    config: AppConfig,
}

impl<P: WalletProvider, L: LedgerRpc> WalletApp<P, L> {
    pub fn new(config: AppConfig, provider: Arc<P>, ledger: Arc<L>) -> WalletResult<Self> {
        let sequencer = ActionSequencer::new(Arc::clone(&provider), config.session.clone())?;
        Ok(Self {
            provider,
            ledger,
            sequencer,
            config,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Snapshot for the view layer.
    pub fn view(&self) -> ViewState {
        self.sequencer.snapshot()
    }

    /// Establish a session and nothing else.
    pub async fn login(&self) -> Dispatch {
        self.sequencer
            .run_guarded(|| async { Ok("Signed in".to_string()) })
            .await
    }

    /// Disconnect and clear account state. Not session-guarded: logging out
    /// while logged out must not open the sign-in flow.
    pub async fn logout(&self) -> Dispatch {
        self.sequencer
            .run_unauthenticated(|| async {
                self.provider.disconnect().await?;
                self.sequencer.clear_balance();
                Ok("Signed out".to_string())
            })
            .await
    }

    pub async fn show_balance(&self) -> Dispatch {
        self.sequencer.run_guarded(|| self.balance_action()).await
    }

    pub async fn airdrop(&self, lamports: u64) -> Dispatch {
        self.sequencer
            .run_guarded(move || self.airdrop_action(lamports))
            .await
    }

    pub async fn send(&self, lamports: u64) -> Dispatch {
        self.sequencer
            .run_guarded(move || self.send_action(lamports))
            .await
    }

    pub async fn sign_message(&self, message: &str) -> Dispatch {
        let message = message.to_string();
        self.sequencer
            .run_guarded(move || self.sign_action(message))
            .await
    }

    async fn balance_action(&self) -> WalletResult<String> {
        let sol = self.refresh_balance().await?;
        Ok(format!("Balance: {} SOL", format_sol(sol)))
    }

    async fn airdrop_action(&self, lamports: u64) -> WalletResult<String> {
        let address = self.authenticated_address()?;
        self.sequencer.progress(format!(
            "Requesting airdrop of {} SOL...",
            format_sol(lamports_to_sol(lamports))
        ));
        let signature = self.ledger.request_airdrop(&address, lamports).await?;
        self.ledger.confirm_transaction(&signature).await?;
        self.refresh_balance().await?;
        Ok(format!("Airdrop confirmed: {}", signature))
    }

    async fn send_action(&self, lamports: u64) -> WalletResult<String> {
        let address = self.authenticated_address()?;
        let latest = self.ledger.get_latest_blockhash().await?;
        let plan = TransferPlan::self_transfer(
            &address,
            lamports,
            &latest.blockhash,
            latest.last_valid_block_height,
        )?;
        self.sequencer.progress(format!(
            "Sending {} SOL...",
            format_sol(lamports_to_sol(lamports))
        ));
        let signature = self.provider.sign_and_send_transaction(&plan).await?;
        self.ledger.confirm_transaction(&signature).await?;
        self.refresh_balance().await?;
        Ok(format!("Transfer confirmed: {}", signature))
    }

    async fn sign_action(&self, message: String) -> WalletResult<String> {
        let signature = self.provider.sign_message(message.as_bytes()).await?;
        let preview: String = hex::encode(signature)
            .chars()
            .take(SIGNATURE_PREVIEW_CHARS)
            .collect();
        Ok(format!("Signed: {}...", preview))
    }

    /// Fetch and publish the balance. Runs inside an already-guarded action,
    /// so it must not re-enter the sequencer.
    async fn refresh_balance(&self) -> WalletResult<f64> {
        let address = self.authenticated_address()?;
        let lamports = self.ledger.get_balance(&address).await?;
        let sol = lamports_to_sol(lamports);
        self.sequencer.set_balance(sol);
        Ok(sol)
    }

    fn authenticated_address(&self) -> WalletResult<String> {
        self.provider.address().ok_or(WalletError::NotAuthenticated)
    }
}
