//! Read-only bridge over a snapshot JSON file.

use async_trait::async_trait;
use holder_app::{BridgeError, ConfirmRegistrationArgs, DeleteProtectedArgs, HolderBridge};
use holder_core::HolderSnapshot;
use std::path::PathBuf;

/// Serves the snapshot stored in a JSON file; every action is refused.
#[derive(Debug, Clone)]
pub struct SnapshotFileBridge {
    path: PathBuf,
}

impl SnapshotFileBridge {
    /// Bridge reading `path` on every fetch
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_only() -> Result<(), BridgeError> {
        Err(BridgeError::transport("snapshot files are read-only"))
    }
}

#[async_trait]
impl HolderBridge for SnapshotFileBridge {
    async fn fetch_holder_state(&self) -> Result<HolderSnapshot, BridgeError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| BridgeError::transport(format!("{}: {e}", self.path.display())))?;
        serde_json::from_str(&content)
            .map_err(|e| BridgeError::transport(format!("{}: {e}", self.path.display())))
    }

    async fn cancel_capture(&self) -> Result<(), BridgeError> {
        Self::read_only()
    }

    async fn confirm_holder_authn_method_registration(
        &self,
        _args: ConfirmRegistrationArgs,
    ) -> Result<(), BridgeError> {
        Self::read_only()
    }

    async fn delete_protected_authn_method(
        &self,
        _args: DeleteProtectedArgs,
    ) -> Result<(), BridgeError> {
        Self::read_only()
    }

    async fn start_release(&self) -> Result<(), BridgeError> {
        Self::read_only()
    }

    async fn confirm_owner_authn_method_registration(
        &self,
        _args: ConfirmRegistrationArgs,
    ) -> Result<(), BridgeError> {
        Self::read_only()
    }

    async fn restart_release_identity(&self) -> Result<(), BridgeError> {
        Self::read_only()
    }

    async fn delete_holder_authn_method(&self) -> Result<(), BridgeError> {
        Self::read_only()
    }
}
