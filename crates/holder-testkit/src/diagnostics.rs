//! Diagnostic sink that records instead of logging.

use holder_core::DiagnosticSink;
use parking_lot::Mutex;

/// One recorded diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A predicate met a variant it has no rule for
    UnhandledVariant {
        /// Reporting site
        context: String,
        /// Variant name
        variant: String,
    },
    /// An error was caught and recovered from
    CaughtError {
        /// Reporting site
        context: String,
        /// Error text
        message: String,
    },
}

/// Records every diagnostic for later assertions.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    entries: Mutex<Vec<Diagnostic>>,
}

impl RecordingDiagnostics {
    /// Everything recorded so far
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.lock().clone()
    }

    /// Number of unhandled-variant reports
    pub fn unhandled_count(&self) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|d| matches!(d, Diagnostic::UnhandledVariant { .. }))
            .count()
    }

    /// Number of caught-error reports from `context`
    pub fn caught_count(&self, context: &str) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|d| matches!(d, Diagnostic::CaughtError { context: c, .. } if c == context))
            .count()
    }

    /// Forget everything recorded
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl DiagnosticSink for RecordingDiagnostics {
    fn unhandled_variant(&self, context: &'static str, variant: &str) {
        self.entries.lock().push(Diagnostic::UnhandledVariant {
            context: context.to_string(),
            variant: variant.to_string(),
        });
    }

    fn caught_error(&self, context: &'static str, message: &str) {
        self.entries.lock().push(Diagnostic::CaughtError {
            context: context.to_string(),
            message: message.to_string(),
        });
    }
}
