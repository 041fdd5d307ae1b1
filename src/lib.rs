// lib.rs - Core library structure for the wallet

pub mod config;
pub mod errors;
pub mod provider;
pub mod rpc;
pub mod sequencer;
pub mod transfer;
pub mod validation;
pub mod view;
pub mod wallet;

// Re-export common types
pub use config::{AppConfig, BrandingConfig, Cluster, NetworkConfig, SessionConfig};
pub use errors::{WalletError, WalletResult};
pub use provider::{LocalKeyProvider, WalletProvider};
pub use rpc::{Commitment, LatestBlockhash, LedgerRpc, SolanaRpcClient};
pub use sequencer::{ActionSequencer, Dispatch};
pub use transfer::TransferPlan;
pub use validation::InputValidator;
pub use view::{
    format_sol, lamports_to_sol, Outcome, SessionStatus, StatusLine, UserIdentity, ViewState,
    LAMPORTS_PER_SOL,
};
pub use wallet::{
    WalletApp, DEFAULT_AIRDROP_LAMPORTS, DEFAULT_TRANSFER_LAMPORTS, DEMO_SIGN_MESSAGE,
};
