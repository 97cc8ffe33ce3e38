//! Observable status of one action slot.

use crate::errors::ActionError;

/// Progress half of an [`ActionFeature`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionStatus {
    /// A dispatch is running
    pub in_progress: bool,
    /// At least one dispatch has finished
    pub loaded: bool,
}

/// Error half of an [`ActionFeature`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionErrorState {
    /// The last finished dispatch failed
    pub is_error: bool,
    /// Its error
    pub error: Option<ActionError>,
}

/// Status/error record of an action slot, as rendered by the UI.
///
/// `in_progress` and `loaded` are never both true, and `is_error` always
/// agrees with `error.is_some()`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionFeature {
    /// Progress
    pub status: ActionStatus,
    /// Last failure
    pub error: ActionErrorState,
}

impl ActionFeature {
    /// Never dispatched
    pub fn idle() -> Self {
        Self::default()
    }

    /// A dispatch has started; any previous error is cleared.
    pub fn started() -> Self {
        Self {
            status: ActionStatus {
                in_progress: true,
                loaded: false,
            },
            error: ActionErrorState::default(),
        }
    }

    /// The dispatch finished without error
    pub fn succeeded() -> Self {
        Self {
            status: ActionStatus {
                in_progress: false,
                loaded: true,
            },
            error: ActionErrorState::default(),
        }
    }

    /// The dispatch finished with `error`
    pub fn failed(error: ActionError) -> Self {
        Self {
            status: ActionStatus {
                in_progress: false,
                loaded: true,
            },
            error: ActionErrorState {
                is_error: true,
                error: Some(error),
            },
        }
    }

    /// Record the outcome of a finished dispatch
    pub fn finished(outcome: &Result<(), ActionError>) -> Self {
        match outcome {
            Ok(()) => Self::succeeded(),
            Err(e) => Self::failed(e.clone()),
        }
    }

    /// Whether a dispatch is running
    pub fn in_progress(&self) -> bool {
        self.status.in_progress
    }

    /// The last error, if the last dispatch failed
    pub fn last_error(&self) -> Option<&ActionError> {
        self.error.error.as_ref()
    }
}
