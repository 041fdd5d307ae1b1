//! The identity/wallet provider seam.
//!
//! The embedded-wallet SDK is an external collaborator: it owns key custody,
//! session state and signing. [`WalletProvider`] is the contract the rest of
//! the client programs against; [`LocalKeyProvider`] is an in-process
//! implementation backed by an Ed25519 key, suitable for the demo binary and
//! for tests. Its key material never leaves the process and is zeroized on
//! drop.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ed25519_dalek::{Signer, SigningKey};
use parking_lot::RwLock;
use rand::rngs::OsRng;

use crate::errors::{WalletError, WalletResult};
use crate::rpc::LedgerRpc;
use crate::transfer::{self, TransferPlan};
use crate::view::{SessionStatus, UserIdentity};

/// Identity and signing operations delegated to the embedded-wallet SDK.
///
/// `address()` is the authoritative "logged in" signal; `user()` must return
/// `None` until a session exists. `connect()` may resolve before the address
/// is visible — callers re-check rather than trusting its return alone.
#[allow(async_fn_in_trait)]
pub trait WalletProvider: Send + Sync {
    fn status(&self) -> SessionStatus;

    fn address(&self) -> Option<String>;

    fn user(&self) -> Option<UserIdentity>;

    /// Run the interactive sign-in flow.
    async fn connect(&self) -> WalletResult<()>;

    /// Tear down the session and forget key material.
    async fn disconnect(&self) -> WalletResult<()>;

    /// Sign arbitrary bytes, returning the 64-byte Ed25519 signature.
    async fn sign_message(&self, message: &[u8]) -> WalletResult<Vec<u8>>;

    /// Sign a transfer and submit it, returning the transaction signature.
    async fn sign_and_send_transaction(&self, plan: &TransferPlan) -> WalletResult<String>;
}

struct KeyState {
    status: SessionStatus,
    key: Option<SigningKey>,
}

/// In-process [`WalletProvider`] backed by a freshly generated Ed25519 key.
pub struct LocalKeyProvider<L> {
    ledger: Arc<L>,
    identity: UserIdentity,
    state: RwLock<KeyState>,
}

impl<L: LedgerRpc> LocalKeyProvider<L> {
    pub fn new(ledger: Arc<L>, identity: UserIdentity) -> Self {
        Self {
            ledger,
            identity,
            state: RwLock::new(KeyState {
                status: SessionStatus::Ready,
                key: None,
            }),
        }
    }
}

impl<L: LedgerRpc> WalletProvider for LocalKeyProvider<L> {
    fn status(&self) -> SessionStatus {
        self.state.read().status.clone()
    }

    fn address(&self) -> Option<String> {
        self.state
            .read()
            .key
            .as_ref()
            .map(|key| transfer::encode_address(&key.verifying_key().to_bytes()))
    }

    fn user(&self) -> Option<UserIdentity> {
        let state = self.state.read();
        state.key.as_ref().map(|_| self.identity.clone())
    }

    async fn connect(&self) -> WalletResult<()> {
        let mut state = self.state.write();
        if state.key.is_some() {
            return Ok(());
        }
        state.status = SessionStatus::Initializing;
        let key = SigningKey::generate(&mut OsRng);
        tracing::info!(
            address = %transfer::encode_address(&key.verifying_key().to_bytes()),
            "generated local wallet key"
        );
        state.key = Some(key);
        state.status = SessionStatus::Ready;
        Ok(())
    }

    async fn disconnect(&self) -> WalletResult<()> {
        // SigningKey zeroizes its seed on drop
        self.state.write().key = None;
        Ok(())
    }

    async fn sign_message(&self, message: &[u8]) -> WalletResult<Vec<u8>> {
        let state = self.state.read();
        let key = state.key.as_ref().ok_or(WalletError::NotAuthenticated)?;
        Ok(key.sign(message).to_bytes().to_vec())
    }

    async fn sign_and_send_transaction(&self, plan: &TransferPlan) -> WalletResult<String> {
        let wire = {
            let state = self.state.read();
            let key = state.key.as_ref().ok_or(WalletError::NotAuthenticated)?;
            if plan.fee_payer() != &key.verifying_key().to_bytes() {
                return Err(WalletError::SigningRejected(
                    "Fee payer is not the connected wallet".to_string(),
                ));
            }
            let message = plan.message_bytes();
            let signature = key.sign(&message);
            transfer::assemble_wire(&message, &signature.to_bytes())
        };

        self.ledger.send_transaction(&BASE64.encode(wire)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingLedger {
        sends: AtomicUsize,
        last_wire: RwLock<Option<Vec<u8>>>,
    }

    impl LedgerRpc for RecordingLedger {
        async fn get_balance(&self, _address: &str) -> WalletResult<u64> {
            Ok(0)
        }

        async fn request_airdrop(&self, _address: &str, _lamports: u64) -> WalletResult<String> {
            Ok("sig".to_string())
        }

        async fn get_latest_blockhash(&self) -> WalletResult<crate::rpc::LatestBlockhash> {
            Err(WalletError::Unknown("not used".to_string()))
        }

        async fn send_transaction(&self, transaction_base64: &str) -> WalletResult<String> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            let wire = BASE64.decode(transaction_base64).expect("base64 wire");
            *self.last_wire.write() = Some(wire);
            Ok("SubmittedSig".to_string())
        }

        async fn confirm_transaction(&self, _signature: &str) -> WalletResult<()> {
            Ok(())
        }
    }

    fn provider() -> LocalKeyProvider<RecordingLedger> {
        LocalKeyProvider::new(
            Arc::new(RecordingLedger::default()),
            UserIdentity {
                email: None,
                display_name: Some("Local demo key".to_string()),
            },
        )
    }

    #[tokio::test]
    async fn connect_publishes_a_valid_address() {
        let provider = provider();
        assert_eq!(provider.address(), None);
        assert_eq!(provider.user(), None);

        provider.connect().await.unwrap();
        let address = provider.address().expect("address after connect");
        let bytes = bs58::decode(&address).into_vec().unwrap();
        assert_eq!(bytes.len(), 32);
        assert!(provider.user().is_some());
        assert_eq!(provider.status(), SessionStatus::Ready);

        // Reconnecting keeps the same key
        provider.connect().await.unwrap();
        assert_eq!(provider.address(), Some(address));
    }

    #[tokio::test]
    async fn disconnect_forgets_the_session() {
        let provider = provider();
        provider.connect().await.unwrap();
        provider.disconnect().await.unwrap();
        assert_eq!(provider.address(), None);
        assert_eq!(provider.user(), None);
        let err = provider.sign_message(b"hi").await.unwrap_err();
        assert!(matches!(err, WalletError::NotAuthenticated));
    }

    #[tokio::test]
    async fn message_signatures_verify_under_published_key() {
        let provider = provider();
        provider.connect().await.unwrap();
        let address = provider.address().unwrap();
        let signature = provider.sign_message(b"Hello from OnboardX").await.unwrap();

        let key_bytes: [u8; 32] = bs58::decode(&address).into_vec().unwrap().try_into().unwrap();
        let verifying = VerifyingKey::from_bytes(&key_bytes).unwrap();
        let signature = Signature::from_bytes(&signature.try_into().expect("64 bytes"));
        verifying
            .verify(b"Hello from OnboardX", &signature)
            .expect("signature verifies");
    }

    #[tokio::test]
    async fn signed_transfer_wire_verifies_and_submits() {
        let ledger = Arc::new(RecordingLedger::default());
        let provider = LocalKeyProvider::new(Arc::clone(&ledger), UserIdentity::default());
        provider.connect().await.unwrap();
        let address = provider.address().unwrap();

        let plan = TransferPlan::self_transfer(
            &address,
            10_000_000,
            "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N",
            3090,
        )
        .unwrap();
        let signature = provider.sign_and_send_transaction(&plan).await.unwrap();
        assert_eq!(signature, "SubmittedSig");
        assert_eq!(ledger.sends.load(Ordering::SeqCst), 1);

        let wire = ledger.last_wire.read().clone().expect("submitted wire");
        assert_eq!(wire[0], 1);
        let signature = Signature::from_bytes(wire[1..65].try_into().unwrap());
        let key_bytes: [u8; 32] = bs58::decode(&address).into_vec().unwrap().try_into().unwrap();
        let verifying = VerifyingKey::from_bytes(&key_bytes).unwrap();
        verifying
            .verify(&wire[65..], &signature)
            .expect("wire signature covers the message bytes");
    }

    #[tokio::test]
    async fn foreign_fee_payer_is_rejected() {
        let provider = provider();
        provider.connect().await.unwrap();

        let plan = TransferPlan::self_transfer(
            "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA",
            1,
            "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N",
            1,
        )
        .unwrap();
        let err = provider.sign_and_send_transaction(&plan).await.unwrap_err();
        assert!(matches!(err, WalletError::SigningRejected(_)));
    }
}
