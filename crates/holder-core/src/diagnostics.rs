//! Diagnostic sink for invariant failures and caught errors.
//!
//! Eligibility predicates never panic on a variant they cannot classify; they
//! deny and report here instead. Dispatch reports caught remote failures here
//! as well.

/// Receiver of programmer-error and caught-error diagnostics.
pub trait DiagnosticSink: Send + Sync {
    /// A match met a variant it has no rule for.
    fn unhandled_variant(&self, context: &'static str, variant: &str);

    /// An error was caught and recovered from at `context`.
    fn caught_error(&self, context: &'static str, message: &str);
}

/// Sink that forwards every diagnostic to `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn unhandled_variant(&self, context: &'static str, variant: &str) {
        tracing::error!(
            context,
            variant,
            "unhandled variant, falling back to most restrictive result"
        );
    }

    fn caught_error(&self, context: &'static str, message: &str) {
        tracing::error!(context, error = message, "caught error");
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for std::sync::Arc<T> {
    fn unhandled_variant(&self, context: &'static str, variant: &str) {
        (**self).unhandled_variant(context, variant);
    }

    fn caught_error(&self, context: &'static str, message: &str) {
        (**self).caught_error(context, message);
    }
}
