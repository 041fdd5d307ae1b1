//! UI-visible state for the wallet client.
//!
//! The view layer receives a [`ViewState`] snapshot and nothing else: session
//! status, identity and address are read from the provider at snapshot time,
//! balance and the status line are owned by the sequencer. The status line is
//! a structured value rather than free-form text so failures stay
//! machine-checkable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base units per SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Provider readiness as surfaced to the UI verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Uninitialized,
    Initializing,
    Ready,
    Error(String),
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionStatus::Uninitialized => write!(f, "uninitialized"),
            SessionStatus::Initializing => write!(f, "initializing"),
            SessionStatus::Ready => write!(f, "ready"),
            SessionStatus::Error(msg) => write!(f, "error: {}", msg),
        }
    }
}

/// Who is signed in, as reported by the identity provider.
///
/// Present only once a wallet session exists; both fields are optional
/// because social-login providers do not guarantee either.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl UserIdentity {
    /// Best human-readable label: display name, then email.
    pub fn label(&self) -> Option<&str> {
        self.display_name.as_deref().or(self.email.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Info,
    Success,
    Failure,
}

/// The single mutable log slot: outcome of the last operation, overwritten
/// on every state change, never appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLine {
    pub outcome: Outcome,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl StatusLine {
    pub fn info(message: impl Into<String>) -> Self {
        Self::stamped(Outcome::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::stamped(Outcome::Success, message)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::stamped(Outcome::Failure, message)
    }

    fn stamped(outcome: Outcome, message: impl Into<String>) -> Self {
        Self {
            outcome,
            message: message.into(),
            at: Utc::now(),
        }
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::info("Ready")
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.outcome {
            Outcome::Info => write!(f, "{}", self.message),
            Outcome::Success => write!(f, "ok: {}", self.message),
            Outcome::Failure => write!(f, "error: {}", self.message),
        }
    }
}

/// Snapshot handed to the view layer.
#[derive(Debug, Clone, Serialize)]
pub struct ViewState {
    pub status: SessionStatus,
    pub identity: Option<UserIdentity>,
    pub address: Option<String>,
    pub balance_sol: Option<f64>,
    pub log: StatusLine,
    pub busy: bool,
}

/// Convert base units to display units.
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Format a SOL amount the way the status panel shows it.
pub fn format_sol(sol: f64) -> String {
    format!("{:.4}", sol)
}
