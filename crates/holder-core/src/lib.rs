//! Holder Core - lifecycle model and authorization engine
//!
//! Pure layer for identity holder contracts: no async runtime and no remote
//! calls. Everything here is a function of a fetched snapshot plus
//! viewer-relative inputs.
//!
//! ## Snapshot model
//! - [`IdentityHolderState`]: `WaitingActivation | Capture | Holding | Release | Closed`,
//!   each in-flight phase carrying its own sub-state enum
//! - [`HolderSnapshot`]: one fetched unit, replaced wholesale on refetch
//!
//! ## Eligibility
//! - [`eligibility::evaluate`]: `(action, role, state, flags) -> {can_perform, can_see_action}`
//! - unknown variants deny and report through [`DiagnosticSink`]
//!
//! ## Certificate expiration
//! - [`expiration::compute_status`]: `valid | willExpireSoon | expired | unsellable`

#![forbid(unsafe_code)]

/// Diagnostic sink for invariant failures
pub mod diagnostics;

/// Action eligibility predicates
pub mod eligibility;

/// Unified error handling
pub mod errors;

/// Certificate expiration engine
pub mod expiration;

/// Principal and contract identifiers
pub mod identifiers;

/// Versioned reactive values
pub mod reactive;

/// Lifecycle snapshot model
pub mod state;

pub use diagnostics::{DiagnosticSink, TracingDiagnostics};
pub use eligibility::{
    evaluate, permitted_actions, ActionEligibility, EligibilityFlags, EligibilityTable,
    HolderAction, ViewerRole,
};
pub use errors::{HolderError, Result};
pub use expiration::{
    compute_status, compute_status_with, CertificateExpirationStatus, ExpirationInput,
};
pub use identifiers::{ContractId, Principal};
pub use reactive::{Dynamic, Subscription};
pub use state::{
    CaptureFailure, CaptureSubState, CertificateInfo, HolderPhase, HolderSnapshot,
    HoldingSubState, IdentityHolderState, ProcessingError, ReleaseFailure, ReleaseSubState,
    UnsellableReason,
};
