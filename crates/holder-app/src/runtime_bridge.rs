//! # HolderBridge: Remote Contract Operations
//!
//! `holder-app` never talks to the network itself. The embedding frontend
//! implements [`HolderBridge`] over its agent/transport, and the application
//! core drives the contract only through it.
//!
//! ```text
//! holder-app (portable)        frontend (transport)
//! ┌──────────────────┐         ┌──────────────────┐
//! │ HolderApp        │         │ agent client     │
//! │   ┌────────────┐ │         │   implements     │
//! │   │HolderBridge│◄──────────│   HolderBridge   │
//! │   └────────────┘ │         │                  │
//! └──────────────────┘         └──────────────────┘
//! ```
//!
//! Every call resolves to `Ok`, a structured [`ContractError`](crate::errors::ContractError)
//! or a transport failure. A call that never resolves is left to the
//! dispatcher's disconnect race.

use crate::errors::BridgeError;
use async_trait::async_trait;
use holder_core::HolderSnapshot;
use serde::{Deserialize, Serialize};

/// Argument of the two confirm-registration calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmRegistrationArgs {
    /// Code shown by the identity service
    pub confirmation_code: String,
}

/// Argument of `delete_protected_authn_method`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteProtectedArgs {
    /// Public key of the protected method to remove
    pub public_key: String,
}

/// Remote operations on one holder contract.
#[async_trait]
pub trait HolderBridge: Send + Sync {
    /// Read the full snapshot
    async fn fetch_holder_state(&self) -> Result<HolderSnapshot, BridgeError>;

    // =========================================================================
    // Capture
    // =========================================================================

    /// Abort capture and hand the identity back
    async fn cancel_capture(&self) -> Result<(), BridgeError>;

    /// Confirm the holder's authn-method session registration
    async fn confirm_holder_authn_method_registration(
        &self,
        args: ConfirmRegistrationArgs,
    ) -> Result<(), BridgeError>;

    /// Remove a protected authn method blocking capture
    async fn delete_protected_authn_method(
        &self,
        args: DeleteProtectedArgs,
    ) -> Result<(), BridgeError>;

    // =========================================================================
    // Holding
    // =========================================================================

    /// Begin releasing the identity back to the owner
    async fn start_release(&self) -> Result<(), BridgeError>;

    // =========================================================================
    // Release
    // =========================================================================

    /// Confirm the owner's new authn-method registration
    async fn confirm_owner_authn_method_registration(
        &self,
        args: ConfirmRegistrationArgs,
    ) -> Result<(), BridgeError>;

    /// Restart the release procedure
    async fn restart_release_identity(&self) -> Result<(), BridgeError>;

    /// Remove the holder's own authn method from the identity
    async fn delete_holder_authn_method(&self) -> Result<(), BridgeError>;
}
