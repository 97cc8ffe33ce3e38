//! Release phase: custody returns to the owner.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Release sub-state.
///
/// `DangerousToLoseIdentity` and `IdentityAPIChanged` are terminal outcomes
/// that need owner attention; `ReleaseFailed` is reachable from in-flight steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReleaseSubState {
    /// Release requested
    StartRelease,
    /// Contract checks whether the owner still has an authn method on the identity
    CheckingAccessFromOwnerAuthnMethod,
    /// Contract switches the identity into authn-method registration mode
    EnterAuthnMethodRegistrationMode,
    /// Waiting for the owner to register a new authn method
    WaitingAuthnMethodRegistration {
        /// Registration mode deadline (ms since epoch)
        expiration_ms: u64,
    },
    /// Owner must confirm the pending authn-method registration
    ConfirmAuthnMethodRegistration {
        /// Verification code shown to the owner
        verification_code: String,
    },
    /// Contract removes its own authn method
    DeleteHolderAuthnMethod,
    /// Contract makes sure no orphaned registration is left open
    EnsureOrphanedRegistrationExited,
    /// Finishing would leave the identity without a usable authn method
    DangerousToLoseIdentity,
    /// The identity provider API changed under the contract
    #[serde(rename = "IdentityAPIChanged")]
    IdentityApiChanged,
    /// Release stopped and needs a restart
    ReleaseFailed {
        /// Why release failed
        error: ReleaseFailure,
    },
    /// Tag not known to this build
    #[serde(other)]
    Unknown,
}

impl ReleaseSubState {
    /// Stable variant name used in diagnostics and tables.
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartRelease => "StartRelease",
            Self::CheckingAccessFromOwnerAuthnMethod => "CheckingAccessFromOwnerAuthnMethod",
            Self::EnterAuthnMethodRegistrationMode => "EnterAuthnMethodRegistrationMode",
            Self::WaitingAuthnMethodRegistration { .. } => "WaitingAuthnMethodRegistration",
            Self::ConfirmAuthnMethodRegistration { .. } => "ConfirmAuthnMethodRegistration",
            Self::DeleteHolderAuthnMethod => "DeleteHolderAuthnMethod",
            Self::EnsureOrphanedRegistrationExited => "EnsureOrphanedRegistrationExited",
            Self::DangerousToLoseIdentity => "DangerousToLoseIdentity",
            Self::IdentityApiChanged => "IdentityAPIChanged",
            Self::ReleaseFailed { .. } => "ReleaseFailed",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ReleaseSubState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reasons a release stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseFailure {
    /// Registration mode expired before the owner registered
    RegistrationModeExpired,
    /// The owner registered an unexpected authn method
    UnexpectedAuthnMethod,
    /// The identity provider rejected the call
    IdentityCallFailed(String),
}

impl fmt::Display for ReleaseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegistrationModeExpired => write!(f, "registration mode expired"),
            Self::UnexpectedAuthnMethod => write!(f, "unexpected authn method registered"),
            Self::IdentityCallFailed(reason) => write!(f, "identity call failed: {reason}"),
        }
    }
}
