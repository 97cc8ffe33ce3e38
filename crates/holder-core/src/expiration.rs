//! Certificate expiration status.
//!
//! A pure function of its inputs; the recurring tick that drives
//! recomputation lives in `holder-app`.
//!
//! Selection order when several conditions hold:
//! `Unsellable` > `Expired` > `WillExpireSoon` > `Valid`.

use serde::{Deserialize, Serialize};

use crate::state::CertificateInfo;

/// Derived certificate status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum CertificateExpirationStatus {
    /// Outside the safety window
    Valid,
    /// Inside the safety window, not yet expired
    WillExpireSoon {
        /// Time left until the identity becomes unsellable
        duration_till_unsellable_ms: u64,
    },
    /// Past the expiration timestamp
    Expired,
    /// Past the hard deadline; the identity can never be sold again
    Unsellable,
}

impl CertificateExpirationStatus {
    /// Whether sale-related actions must be hidden
    pub fn blocks_sale(&self) -> bool {
        matches!(self, Self::Unsellable)
    }

    /// Whether a warning banner applies
    pub fn needs_attention(&self) -> bool {
        !matches!(self, Self::Valid)
    }

    /// Short label for logging/display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::WillExpireSoon { .. } => "willExpireSoon",
            Self::Expired => "expired",
            Self::Unsellable => "unsellable",
        }
    }
}

/// Full input of the expiration engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationInput {
    /// Certificate expiration (ms since epoch)
    pub expiration_ms: u64,
    /// Current time (ms since epoch)
    pub now_ms: u64,
    /// Width of the "expires soon" window
    pub safety_window_ms: u64,
    /// A completed sale makes the unsellable deadline irrelevant
    pub sale_completed: bool,
    /// Hard deadline after which the identity can never be sold
    pub unsellable_deadline_ms: Option<u64>,
}

impl ExpirationInput {
    /// Build the input from snapshot certificate data.
    ///
    /// Without an explicit deadline the unsellable deadline is
    /// `expiration - unsellable_margin_ms`.
    pub fn from_certificate(
        certificate: &CertificateInfo,
        now_ms: u64,
        safety_window_ms: u64,
        unsellable_margin_ms: u64,
        sale_completed: bool,
    ) -> Self {
        let deadline = certificate.unsellable_deadline_ms.unwrap_or_else(|| {
            certificate
                .expiration_ms
                .saturating_sub(unsellable_margin_ms)
        });
        Self {
            expiration_ms: certificate.expiration_ms,
            now_ms,
            safety_window_ms,
            sale_completed,
            unsellable_deadline_ms: Some(deadline),
        }
    }
}

/// Compute the status from a timestamp alone, with no unsellable deadline.
pub fn compute_status(
    expiration_ms: u64,
    now_ms: u64,
    safety_window_ms: u64,
    sale_completed: bool,
) -> CertificateExpirationStatus {
    compute_status_with(ExpirationInput {
        expiration_ms,
        now_ms,
        safety_window_ms,
        sale_completed,
        unsellable_deadline_ms: None,
    })
}

/// Compute the status from the full input.
pub fn compute_status_with(input: ExpirationInput) -> CertificateExpirationStatus {
    let unsellable = !input.sale_completed
        && input
            .unsellable_deadline_ms
            .is_some_and(|deadline| input.now_ms >= deadline);
    if unsellable {
        return CertificateExpirationStatus::Unsellable;
    }

    if input.now_ms >= input.expiration_ms {
        return CertificateExpirationStatus::Expired;
    }

    if input.expiration_ms - input.now_ms <= input.safety_window_ms {
        let target = if input.sale_completed {
            input.expiration_ms
        } else {
            input.unsellable_deadline_ms.unwrap_or(input.expiration_ms)
        };
        return CertificateExpirationStatus::WillExpireSoon {
            duration_till_unsellable_ms: target.saturating_sub(input.now_ms),
        };
    }

    CertificateExpirationStatus::Valid
}
