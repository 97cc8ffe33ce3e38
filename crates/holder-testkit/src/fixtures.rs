//! Snapshot fixtures.
//!
//! Every fixture is owned by [`owner()`]; use [`stranger()`] for a viewer who
//! does not own the identity.

use holder_core::{
    CaptureSubState, CertificateInfo, HolderSnapshot, HoldingSubState, IdentityHolderState,
    Principal, ProcessingError, ReleaseSubState,
};

/// Principal owning every fixture snapshot
pub fn owner() -> Principal {
    Principal::parse("owner-principal").unwrap()
}

/// Authenticated principal who owns nothing
pub fn stranger() -> Principal {
    Principal::parse("stranger-principal").unwrap()
}

/// Processing error stamped at `time_ms`
pub fn processing_error(time_ms: u64) -> ProcessingError {
    ProcessingError {
        message: "background step failed".to_string(),
        time_ms,
    }
}

/// Capture snapshot without processing error
pub fn capture(sub_state: CaptureSubState) -> HolderSnapshot {
    snapshot(IdentityHolderState::Capture {
        sub_state,
        processing_error: None,
    })
}

/// Capture snapshot whose last step failed
pub fn capture_failed_step(sub_state: CaptureSubState) -> HolderSnapshot {
    snapshot(IdentityHolderState::Capture {
        sub_state,
        processing_error: Some(processing_error(1)),
    })
}

/// Holding snapshot
pub fn holding(sub_state: HoldingSubState) -> HolderSnapshot {
    snapshot(IdentityHolderState::Holding {
        sub_state,
        processing_error: None,
    })
}

/// `Holding.Hold` with no quarantine and no sale deal
pub fn hold() -> HolderSnapshot {
    holding(HoldingSubState::Hold {
        quarantine_until_ms: None,
        sale_deal_in_progress: false,
    })
}

/// Release snapshot without processing error
pub fn release(sub_state: ReleaseSubState) -> HolderSnapshot {
    snapshot(IdentityHolderState::Release {
        sub_state,
        processing_error: None,
    })
}

/// Release snapshot whose last step failed
pub fn release_failed_step(sub_state: ReleaseSubState) -> HolderSnapshot {
    snapshot(IdentityHolderState::Release {
        sub_state,
        processing_error: Some(processing_error(1)),
    })
}

/// Owner snapshot in `state`
pub fn snapshot(state: IdentityHolderState) -> HolderSnapshot {
    HolderSnapshot::new(owner(), state)
}

/// Attach a certificate expiring at `expiration_ms`
pub fn with_certificate(snapshot: HolderSnapshot, expiration_ms: u64) -> HolderSnapshot {
    snapshot.with_certificate(CertificateInfo {
        expiration_ms,
        unsellable_deadline_ms: None,
    })
}
