//! Action sequencing: one wallet action at a time, authenticated first.

use parking_lot::RwLock;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::time::{sleep, Instant};

use crate::config::SessionConfig;
use crate::errors::{WalletError, WalletResult};
use crate::provider::WalletProvider;
use crate::validation::InputValidator;
use crate::view::{StatusLine, ViewState};

/// What happened to a triggered action.
///
/// `Busy` and `AuthFailed` are surfaced so the view layer *can* tell the user
/// an action was dropped; the sequencer itself stays silent about them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The action ran; the status line carries its outcome.
    Completed,
    /// Another action was in flight; this trigger was dropped, not queued.
    Busy,
    /// No session could be established; the action never ran.
    AuthFailed,
}

struct Panel {
    balance_sol: Option<f64>,
    log: StatusLine,
}

/// Wraps wallet-dependent operations with a re-entrancy guard, lazy
/// authentication and uniform error-to-status mapping.
pub struct ActionSequencer<P> {
    provider: Arc<P>,
    panel: RwLock<Panel>,
    busy: AtomicBool,
    validator: InputValidator,
    session: SessionConfig,
}

/// Releases the busy flag on every exit path.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl<P: WalletProvider> ActionSequencer<P> {
    pub fn new(provider: Arc<P>, session: SessionConfig) -> WalletResult<Self> {
        Ok(Self {
            provider,
            panel: RwLock::new(Panel {
                balance_sol: None,
                log: StatusLine::default(),
            }),
            busy: AtomicBool::new(false),
            validator: InputValidator::new()?,
            session,
        })
    }

    /// Current state for the view layer. Status, identity and address are
    /// read from the provider so the snapshot mirrors its reactive bindings.
    pub fn snapshot(&self) -> ViewState {
        let panel = self.panel.read();
        ViewState {
            status: self.provider.status(),
            identity: self.provider.user(),
            address: self.provider.address(),
            balance_sol: panel.balance_sol,
            log: panel.log.clone(),
            busy: self.busy.load(Ordering::SeqCst),
        }
    }

    pub fn set_log(&self, line: StatusLine) {
        self.panel.write().log = line;
    }

    /// Overwrite the status line with a progress message.
    pub fn progress(&self, message: impl Into<String>) {
        self.set_log(StatusLine::info(message));
    }

    /// Record a fetched balance. Only meaningful while a session exists;
    /// logout clears it via [`clear_balance`](Self::clear_balance).
    pub fn set_balance(&self, sol: f64) {
        debug_assert!(self.provider.address().is_some());
        self.panel.write().balance_sol = Some(sol);
    }

    pub fn clear_balance(&self) {
        self.panel.write().balance_sol = None;
    }

    /// Run `action` with the session established first. Triggers while busy
    /// are silent no-ops.
    pub async fn run_guarded<F, Fut>(&self, action: F) -> Dispatch
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = WalletResult<String>>,
    {
        let Some(_guard) = self.try_acquire() else {
            return Dispatch::Busy;
        };

        if let Err(err) = self.ensure_session().await {
            self.set_log(StatusLine::failure(format!("Sign-in failed: {}", err)));
            return Dispatch::AuthFailed;
        }

        self.execute(action).await
    }

    /// Run `action` under the re-entrancy guard without requiring a session.
    /// Logout uses this: disconnecting must not trigger a sign-in first.
    pub async fn run_unauthenticated<F, Fut>(&self, action: F) -> Dispatch
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = WalletResult<String>>,
    {
        let Some(_guard) = self.try_acquire() else {
            return Dispatch::Busy;
        };

        self.execute(action).await
    }

    async fn execute<F, Fut>(&self, action: F) -> Dispatch
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = WalletResult<String>>,
    {
        match action().await {
            Ok(message) => self.set_log(StatusLine::success(message)),
            Err(err) => {
                tracing::warn!(error = %err, "wallet action failed");
                self.set_log(StatusLine::failure(err.to_string()));
            }
        }
        Dispatch::Completed
    }

    fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return None;
        }
        Some(BusyGuard { flag: &self.busy })
    }

    /// Establish a wallet session if one is not already present.
    ///
    /// The provider's connect call can resolve before its address binding is
    /// visible, so after connecting this polls the binding until the timeout
    /// ceiling. An address that fails validation is an error, not a reason
    /// to keep polling.
    async fn ensure_session(&self) -> WalletResult<()> {
        if let Some(address) = self.provider.address() {
            self.validator.validate_address(&address)?;
            return Ok(());
        }

        self.progress("Opening sign-in...");
        self.provider.connect().await?;

        let deadline = Instant::now() + self.session.connect_timeout();
        loop {
            if let Some(address) = self.provider.address() {
                self.validator.validate_address(&address)?;
                tracing::info!(%address, "wallet session established");
                return Ok(());
            }
            if Instant::now() >= deadline {
                tracing::warn!(
                    timeout_ms = self.session.connect_timeout_ms,
                    "address never became visible after connect"
                );
                return Err(WalletError::SessionTimeout);
            }
            sleep(self.session.poll_interval()).await;
        }
    }
}
