//! Categorized action errors
//!
//! Three kinds of failure reach an action:
//! - structured contract errors, which get specific user-facing text
//! - transport or unexpected failures, normalized and only ever shown as a
//!   generic message (plus a context string in debug mode)
//! - session disconnection while the call was in flight
//!
//! Eligibility refusals (`NotPermitted`) are raised before any remote call.

use holder_core::HolderAction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Generic user-facing text for failures without a specific message.
pub const GENERIC_ACTION_FAILURE: &str = "Unable to complete action";

// ============================================================================
// Contract errors
// ============================================================================

/// Point in time carried by delay-style contract errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Delay {
    /// Earliest time the call may succeed (ms since epoch)
    pub time: u64,
}

/// Structured errors returned by the holder contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ContractError {
    /// The certificate is still valid
    #[error("certificate not expired")]
    CertificateNotExpired,
    /// The contract is too low on cycles to run the step
    #[error("critical cycles level (threshold {critical_threshold_cycles})")]
    CriticalCyclesLevel {
        /// Threshold the balance fell below
        critical_threshold_cycles: u64,
    },
    /// A controller change must wait
    #[error("add controller delayed until {}", delay.time)]
    AddControllerDelay {
        /// When the change becomes possible
        delay: Delay,
    },
    /// The call does not fit the current lifecycle state
    #[error("holder in wrong state")]
    HolderWrongState,
    /// The contract is locked by another operation
    #[error("holder locked until {}", lock.time)]
    HolderLocked {
        /// When the lock expires
        lock: Delay,
    },
    /// The caller is not the identity owner
    #[error("caller is not the owner")]
    CallerNotOwner,
    /// Registration mode is not active on the identity
    #[error("registration mode off")]
    RegistrationModeOff,
    /// A management call inside the contract failed
    #[error("management call failed: {reason}")]
    ManagementCallError {
        /// Failure reason reported by the contract
        reason: String,
    },
}

/// Failure of a [`HolderBridge`](crate::runtime_bridge::HolderBridge) call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// Structured error from the contract
    #[error("contract error: {0}")]
    Contract(#[from] ContractError),
    /// The call did not complete
    #[error("transport error: {message}")]
    Transport {
        /// Transport failure detail
        message: String,
    },
}

impl BridgeError {
    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

// ============================================================================
// Action errors
// ============================================================================

/// High-level error categories for UI treatment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The contract refused the call in its current state
    Precondition,
    /// The contract lacks resources
    Resources,
    /// The call must wait until a point in time
    Delay,
    /// Transport or session failure
    Network,
    /// The viewer may not perform the action
    Permission,
    /// Anything else
    Operation,
}

impl ErrorCategory {
    /// Whether retrying later may succeed without user action.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network | Self::Delay | Self::Resources)
    }

    /// Short label for logging/display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Precondition => "Precondition",
            Self::Resources => "Resources",
            Self::Delay => "Delay",
            Self::Network => "Network",
            Self::Permission => "Permission",
            Self::Operation => "Operation",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error recorded in an [`ActionFeature`](crate::dispatch::ActionFeature).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// Structured contract error
    #[error("contract rejected the action: {0}")]
    Contract(ContractError),
    /// Transport or unexpected failure, normalized
    #[error("unexpected failure: {message}")]
    Unexpected {
        /// Raw failure text, never shown outside debug mode
        message: String,
        /// Where the failure was caught
        context: Option<String>,
    },
    /// The viewer session disconnected while the call was in flight
    #[error("session disconnected")]
    Disconnected,
    /// Eligibility refused the action before any remote call
    #[error("{action} is not permitted in the current state")]
    NotPermitted {
        /// The refused action
        action: HolderAction,
    },
    /// The caller stopped waiting; the remote call may still complete
    #[error("dispatch abandoned before completion")]
    Abandoned,
}

impl From<BridgeError> for ActionError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Contract(e) => Self::Contract(e),
            BridgeError::Transport { message } => Self::Unexpected {
                message,
                context: Some("transport".to_string()),
            },
        }
    }
}

impl ActionError {
    /// Create an unexpected error caught at `context`
    pub fn unexpected(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Whether the error came back as a structured contract variant
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Contract(_))
    }

    /// UI category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Contract(e) => match e {
                ContractError::CriticalCyclesLevel { .. } => ErrorCategory::Resources,
                ContractError::AddControllerDelay { .. } | ContractError::HolderLocked { .. } => {
                    ErrorCategory::Delay
                }
                ContractError::CallerNotOwner => ErrorCategory::Permission,
                ContractError::CertificateNotExpired
                | ContractError::HolderWrongState
                | ContractError::RegistrationModeOff => ErrorCategory::Precondition,
                ContractError::ManagementCallError { .. } => ErrorCategory::Operation,
            },
            Self::Unexpected { .. } | Self::Disconnected => ErrorCategory::Network,
            Self::NotPermitted { .. } => ErrorCategory::Permission,
            Self::Abandoned => ErrorCategory::Operation,
        }
    }

    /// User-visible text.
    ///
    /// Raw transport text appears only when `debug` is set.
    pub fn user_message(&self, now_ms: u64, debug: bool) -> String {
        match self {
            Self::Contract(e) => contract_message(e, now_ms),
            Self::Unexpected { message, context } => {
                if debug {
                    let context = context.as_deref().unwrap_or("unknown");
                    format!("{GENERIC_ACTION_FAILURE} [{context}: {message}]")
                } else {
                    GENERIC_ACTION_FAILURE.to_string()
                }
            }
            Self::Disconnected => {
                "Your session was disconnected. Reconnect and try again.".to_string()
            }
            Self::NotPermitted { .. } => "This action is not available right now.".to_string(),
            Self::Abandoned => "The action was interrupted. Refresh to see its result.".to_string(),
        }
    }
}

fn contract_message(err: &ContractError, now_ms: u64) -> String {
    match err {
        ContractError::CertificateNotExpired => {
            "The contract certificate has not expired yet.".to_string()
        }
        ContractError::CriticalCyclesLevel { .. } => {
            "Not enough resources to complete the action. Top up the contract and try again."
                .to_string()
        }
        ContractError::AddControllerDelay { delay } => {
            format!(
                "Delay required: try again {}.",
                describe_wait(delay.time, now_ms)
            )
        }
        ContractError::HolderLocked { lock } => {
            format!(
                "The contract is busy: try again {}.",
                describe_wait(lock.time, now_ms)
            )
        }
        ContractError::CallerNotOwner => "Only the identity owner can do this.".to_string(),
        ContractError::HolderWrongState
        | ContractError::RegistrationModeOff
        | ContractError::ManagementCallError { .. } => GENERIC_ACTION_FAILURE.to_string(),
    }
}

fn describe_wait(until_ms: u64, now_ms: u64) -> String {
    if until_ms <= now_ms {
        "now".to_string()
    } else {
        format!("in {}", format_duration_ms(until_ms - now_ms))
    }
}

/// Render a duration with its two most significant units, e.g. `2h 5m`.
pub fn format_duration_ms(duration_ms: u64) -> String {
    const UNITS: [(u64, &str); 4] = [
        (86_400_000, "d"),
        (3_600_000, "h"),
        (60_000, "m"),
        (1_000, "s"),
    ];

    let mut remaining = duration_ms;
    let mut parts = Vec::with_capacity(2);
    for (size, suffix) in UNITS {
        if parts.len() == 2 {
            break;
        }
        let count = remaining / size;
        if count > 0 || !parts.is_empty() {
            if count > 0 {
                parts.push(format!("{count}{suffix}"));
            }
            remaining %= size;
        }
    }

    if parts.is_empty() {
        "less than a second".to_string()
    } else {
        parts.join(" ")
    }
}
