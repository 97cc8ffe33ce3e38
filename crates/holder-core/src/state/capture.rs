//! Capture phase: the owner transfers custody of the identity into the contract.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Capture sub-state.
///
/// Steps progress in declaration order; `CaptureFailed` is reachable from any
/// in-flight step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CaptureSubState {
    /// Capture requested, nothing done yet
    StartCapture,
    /// Contract is creating its signing key
    CreateEcdsaKey,
    /// Contract is opening an authn-method registration session on the identity
    RegisterAuthnMethodSession,
    /// Owner must confirm the session registration in the identity provider
    NeedConfirmAuthnMethodSessionRegistration {
        /// Code the owner enters to confirm the session
        confirmation_code: String,
        /// Session registration deadline (ms since epoch)
        expiration_ms: u64,
    },
    /// Contract is listing the identity's authn methods
    ObtainingIdentityAuthnMethods,
    /// Contract is removing the identity's authn methods
    DeletingIdentityAuthnMethods,
    /// A protected authn method must be removed by the owner
    NeedDeleteProtectedIdentityAuthnMethod {
        /// Public key of the protected authn method
        public_key: String,
    },
    /// Contract is leaving the session and registering the holder authn method
    ExitAndRegisterHolderAuthnMethod,
    /// Capture bookkeeping
    FinishCapture,
    /// Resolving the principal the identity assigns to the holder contract
    GetHolderContractPrincipal,
    /// Capture stopped and must be cancelled
    CaptureFailed {
        /// Why capture failed
        error: CaptureFailure,
    },
    /// Tag not known to this build
    #[serde(other)]
    Unknown,
}

impl CaptureSubState {
    /// Stable variant name used in diagnostics and tables.
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartCapture => "StartCapture",
            Self::CreateEcdsaKey => "CreateEcdsaKey",
            Self::RegisterAuthnMethodSession => "RegisterAuthnMethodSession",
            Self::NeedConfirmAuthnMethodSessionRegistration { .. } => {
                "NeedConfirmAuthnMethodSessionRegistration"
            }
            Self::ObtainingIdentityAuthnMethods => "ObtainingIdentityAuthnMethods",
            Self::DeletingIdentityAuthnMethods => "DeletingIdentityAuthnMethods",
            Self::NeedDeleteProtectedIdentityAuthnMethod { .. } => {
                "NeedDeleteProtectedIdentityAuthnMethod"
            }
            Self::ExitAndRegisterHolderAuthnMethod => "ExitAndRegisterHolderAuthnMethod",
            Self::FinishCapture => "FinishCapture",
            Self::GetHolderContractPrincipal => "GetHolderContractPrincipal",
            Self::CaptureFailed { .. } => "CaptureFailed",
            Self::Unknown => "Unknown",
        }
    }

    /// Whether the contract is waiting for the owner rather than working.
    pub fn awaits_owner(&self) -> bool {
        matches!(
            self,
            Self::NeedConfirmAuthnMethodSessionRegistration { .. }
                | Self::NeedDeleteProtectedIdentityAuthnMethod { .. }
                | Self::CaptureFailed { .. }
        )
    }
}

impl fmt::Display for CaptureSubState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reasons a capture stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureFailure {
    /// The owner did not confirm the session before its deadline
    SessionRegistrationModeExpired,
    /// Registration mode was turned off on the identity
    SessionRegistrationModeOff,
    /// Another device confirmed the session first
    SessionRegistrationAlreadyConfirmed,
    /// Identity metadata could not be interpreted
    InvalidMetadata(String),
}

impl fmt::Display for CaptureFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionRegistrationModeExpired => write!(f, "session registration expired"),
            Self::SessionRegistrationModeOff => write!(f, "session registration mode is off"),
            Self::SessionRegistrationAlreadyConfirmed => {
                write!(f, "session registration already confirmed")
            }
            Self::InvalidMetadata(detail) => write!(f, "invalid identity metadata: {detail}"),
        }
    }
}
