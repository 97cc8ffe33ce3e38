//! Holding phase: the contract holds the identity and its linked assets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Holding sub-state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HoldingSubState {
    /// Idle custody
    Hold {
        /// Release is blocked until this time (ms since epoch)
        quarantine_until_ms: Option<u64>,
        /// A buyer deal is open against the identity
        sale_deal_in_progress: bool,
    },
    /// Linked-asset refresh requested
    StartFetchAssets,
    /// Linked assets are being fetched
    FetchAssets,
    /// Fetch bookkeeping
    FinishFetchAssets,
    /// Fetched assets are being validated
    ValidateAssets,
    /// The identity can no longer be offered
    Unsellable {
        /// Why the identity became unsellable
        reason: UnsellableReason,
    },
    /// Tag not known to this build
    #[serde(other)]
    Unknown,
}

impl HoldingSubState {
    /// Stable variant name used in diagnostics and tables.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hold { .. } => "Hold",
            Self::StartFetchAssets => "StartFetchAssets",
            Self::FetchAssets => "FetchAssets",
            Self::FinishFetchAssets => "FinishFetchAssets",
            Self::ValidateAssets => "ValidateAssets",
            Self::Unsellable { .. } => "Unsellable",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for HoldingSubState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reasons the held identity stops being sellable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnsellableReason {
    /// The contract certificate passed its sale deadline
    CertificateExpired,
    /// Asset validation found problems
    ValidationFailed,
    /// Too many authn methods appeared on the identity
    ApiChanged,
}
