//! Viewer session: who is looking at the contract, and whether they are
//! still connected.

use holder_core::{Dynamic, HolderSnapshot, Principal, Subscription, ViewerRole};
use std::sync::Arc;
use tokio::sync::watch;

/// The viewer's authentication state.
///
/// Clones share state. Disconnecting rejects every dispatch still waiting on
/// a remote call, see [`DisconnectSignal`].
#[derive(Clone)]
pub struct Session {
    viewer: Dynamic<Option<Principal>>,
    disconnected: Arc<watch::Sender<bool>>,
}

impl Session {
    /// Session with no signed-in viewer
    pub fn anonymous() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            viewer: Dynamic::new(None),
            disconnected: Arc::new(tx),
        }
    }

    /// Session signed in as `principal`
    pub fn signed_in(principal: Principal) -> Self {
        let session = Self::anonymous();
        session.sign_in(principal);
        session
    }

    /// Sign in (or switch) the viewer and clear any disconnection.
    pub fn sign_in(&self, principal: Principal) {
        tracing::debug!(viewer = %principal, "session signed in");
        self.viewer.set(Some(principal));
        self.disconnected.send_replace(false);
    }

    /// End the session; in-flight dispatches resolve as disconnected.
    pub fn disconnect(&self) {
        tracing::debug!("session disconnected");
        self.viewer.set(None);
        self.disconnected.send_replace(true);
    }

    /// Current viewer principal, if signed in
    pub fn viewer(&self) -> Option<Principal> {
        self.viewer.get()
    }

    /// Whether the session is currently disconnected
    pub fn is_disconnected(&self) -> bool {
        *self.disconnected.borrow()
    }

    /// Poll for viewer changes
    pub fn subscribe(&self) -> Subscription<Option<Principal>> {
        self.viewer.subscribe()
    }

    /// Viewer role relative to the snapshot's owner.
    pub fn role_for(&self, snapshot: &HolderSnapshot) -> ViewerRole {
        match self.viewer.get() {
            Some(viewer) => ViewerRole {
                is_owned_by_current_user: viewer == snapshot.owner,
                is_authenticated: true,
            },
            None => ViewerRole::ANONYMOUS,
        }
    }

    /// Signal that completes when the session disconnects
    pub fn disconnect_signal(&self) -> DisconnectSignal {
        DisconnectSignal {
            rx: self.disconnected.subscribe(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("viewer", &self.viewer.get())
            .field("disconnected", &self.is_disconnected())
            .finish()
    }
}

/// One-shot disconnection notification.
#[derive(Debug)]
pub struct DisconnectSignal {
    rx: watch::Receiver<bool>,
}

impl DisconnectSignal {
    /// Resolve once the session is disconnected.
    ///
    /// Resolves immediately if it already is; never resolves once the
    /// session itself is gone.
    pub async fn disconnected(mut self) {
        if self.rx.wait_for(|disconnected| *disconnected).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
