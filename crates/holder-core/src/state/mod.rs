//! # Holder State Snapshot
//!
//! Contract-relative lifecycle state as fetched from the remote contract.
//! A snapshot is always replaced wholesale; nothing here is mutated in place.
//!
//! The root variant and its sub-state are jointly well-formed by construction:
//! a sub-state only exists inside its phase variant, so the phase accessors
//! return `None` under any other root instead of a stale value.

mod capture;
mod holding;
mod release;

pub use capture::{CaptureFailure, CaptureSubState};
pub use holding::{HoldingSubState, UnsellableReason};
pub use release::{ReleaseFailure, ReleaseSubState};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identifiers::Principal;

/// Failure of the contract's last background step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingError {
    /// What failed
    pub message: String,
    /// When it failed (ms since epoch)
    pub time_ms: u64,
}

/// Root lifecycle state of a holder contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state")]
pub enum IdentityHolderState {
    /// Contract deployed, not yet activated
    WaitingActivation,
    /// Owner is transferring custody into the contract
    Capture {
        /// Current capture step
        sub_state: CaptureSubState,
        /// Failure of the last background step, if any
        #[serde(default)]
        processing_error: Option<ProcessingError>,
    },
    /// Contract holds custody
    Holding {
        /// Current holding step
        sub_state: HoldingSubState,
        /// Failure of the last background step, if any
        #[serde(default)]
        processing_error: Option<ProcessingError>,
    },
    /// Owner is reclaiming custody
    Release {
        /// Current release step
        sub_state: ReleaseSubState,
        /// Failure of the last background step, if any
        #[serde(default)]
        processing_error: Option<ProcessingError>,
    },
    /// Terminal state
    Closed,
}

/// Payload-free discriminant of [`IdentityHolderState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HolderPhase {
    /// See [`IdentityHolderState::WaitingActivation`]
    WaitingActivation,
    /// See [`IdentityHolderState::Capture`]
    Capture,
    /// See [`IdentityHolderState::Holding`]
    Holding,
    /// See [`IdentityHolderState::Release`]
    Release,
    /// See [`IdentityHolderState::Closed`]
    Closed,
}

impl HolderPhase {
    /// Short label for logging/display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::WaitingActivation => "WaitingActivation",
            Self::Capture => "Capture",
            Self::Holding => "Holding",
            Self::Release => "Release",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for HolderPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl IdentityHolderState {
    /// Current phase
    pub fn phase(&self) -> HolderPhase {
        match self {
            Self::WaitingActivation => HolderPhase::WaitingActivation,
            Self::Capture { .. } => HolderPhase::Capture,
            Self::Holding { .. } => HolderPhase::Holding,
            Self::Release { .. } => HolderPhase::Release,
            Self::Closed => HolderPhase::Closed,
        }
    }

    /// Capture sub-state, only while capturing.
    pub fn capture_sub_state(&self) -> Option<&CaptureSubState> {
        match self {
            Self::Capture { sub_state, .. } => Some(sub_state),
            _ => None,
        }
    }

    /// Holding sub-state, only while holding.
    pub fn holding_sub_state(&self) -> Option<&HoldingSubState> {
        match self {
            Self::Holding { sub_state, .. } => Some(sub_state),
            _ => None,
        }
    }

    /// Release sub-state, only while releasing.
    pub fn release_sub_state(&self) -> Option<&ReleaseSubState> {
        match self {
            Self::Release { sub_state, .. } => Some(sub_state),
            _ => None,
        }
    }

    /// Failure of the last background step of the active phase.
    pub fn processing_error(&self) -> Option<&ProcessingError> {
        match self {
            Self::Capture {
                processing_error, ..
            }
            | Self::Holding {
                processing_error, ..
            }
            | Self::Release {
                processing_error, ..
            } => processing_error.as_ref(),
            Self::WaitingActivation | Self::Closed => None,
        }
    }

    /// Whether the last background step failed
    pub fn has_processing_error(&self) -> bool {
        self.processing_error().is_some()
    }

    /// Sub-state name of the active phase, if it has one.
    pub fn sub_state_name(&self) -> Option<&'static str> {
        match self {
            Self::Capture { sub_state, .. } => Some(sub_state.name()),
            Self::Holding { sub_state, .. } => Some(sub_state.name()),
            Self::Release { sub_state, .. } => Some(sub_state.name()),
            Self::WaitingActivation | Self::Closed => None,
        }
    }
}

impl fmt::Display for IdentityHolderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sub_state_name() {
            Some(sub) => write!(f, "{}.{}", self.phase(), sub),
            None => write!(f, "{}", self.phase()),
        }
    }
}

/// Certificate data the expiration engine consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateInfo {
    /// Certificate expiration (ms since epoch)
    pub expiration_ms: u64,
    /// Hard deadline after which the identity can never be sold again
    #[serde(default)]
    pub unsellable_deadline_ms: Option<u64>,
}

/// Everything fetched from the contract in one read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderSnapshot {
    /// Owner of the held identity
    pub owner: Principal,
    /// Lifecycle state
    pub state: IdentityHolderState,
    /// Contract certificate, once issued
    #[serde(default)]
    pub certificate: Option<CertificateInfo>,
    /// Whether a sale of the identity has completed
    #[serde(default)]
    pub sale_completed: bool,
}

impl HolderSnapshot {
    /// Snapshot with no certificate and no completed sale
    pub fn new(owner: Principal, state: IdentityHolderState) -> Self {
        Self {
            owner,
            state,
            certificate: None,
            sale_completed: false,
        }
    }

    /// Attach certificate data
    pub fn with_certificate(mut self, certificate: CertificateInfo) -> Self {
        self.certificate = Some(certificate);
        self
    }

    /// Current phase
    pub fn phase(&self) -> HolderPhase {
        self.state.phase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(sub_state: CaptureSubState) -> IdentityHolderState {
        IdentityHolderState::Capture {
            sub_state,
            processing_error: None,
        }
    }

    #[test]
    fn test_sub_state_absent_under_other_root() {
        let state = capture(CaptureSubState::CreateEcdsaKey);
        assert_eq!(
            state.capture_sub_state(),
            Some(&CaptureSubState::CreateEcdsaKey)
        );
        assert!(state.release_sub_state().is_none());
        assert!(state.holding_sub_state().is_none());
        assert!(IdentityHolderState::Closed.capture_sub_state().is_none());
    }

    #[test]
    fn test_processing_error_flag() {
        let state = IdentityHolderState::Release {
            sub_state: ReleaseSubState::StartRelease,
            processing_error: Some(ProcessingError {
                message: "identity call rejected".to_string(),
                time_ms: 10,
            }),
        };
        assert!(state.has_processing_error());
        assert!(!capture(CaptureSubState::StartCapture).has_processing_error());
        assert!(!IdentityHolderState::WaitingActivation.has_processing_error());
    }

    #[test]
    fn test_display_includes_sub_state() {
        assert_eq!(
            capture(CaptureSubState::FinishCapture).to_string(),
            "Capture.FinishCapture"
        );
        assert_eq!(IdentityHolderState::Closed.to_string(), "Closed");
    }

    #[test]
    fn test_deserialize_snapshot() {
        let json = r#"{
            "owner": "aaaaa-aa",
            "state": {
                "state": "Capture",
                "sub_state": {
                    "type": "NeedConfirmAuthnMethodSessionRegistration",
                    "confirmation_code": "ABC123",
                    "expiration_ms": 5000
                }
            },
            "certificate": { "expiration_ms": 1000 }
        }"#;
        let snapshot: HolderSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.phase(), HolderPhase::Capture);
        assert!(!snapshot.sale_completed);
        assert_eq!(
            snapshot.state.capture_sub_state().map(CaptureSubState::name),
            Some("NeedConfirmAuthnMethodSessionRegistration")
        );
        assert_eq!(
            snapshot.certificate.and_then(|c| c.unsellable_deadline_ms),
            None
        );
    }

    #[test]
    fn test_unknown_sub_state_tag() {
        let json = r#"{ "state": "Release", "sub_state": { "type": "SomeFutureStep" } }"#;
        let state: IdentityHolderState = serde_json::from_str(json).unwrap();
        assert_eq!(state.release_sub_state(), Some(&ReleaseSubState::Unknown));
    }

    #[test]
    fn test_identity_api_changed_tag() {
        let json = r#"{ "state": "Release", "sub_state": { "type": "IdentityAPIChanged" } }"#;
        let state: IdentityHolderState = serde_json::from_str(json).unwrap();
        assert_eq!(
            state.release_sub_state(),
            Some(&ReleaseSubState::IdentityApiChanged)
        );
    }
}
