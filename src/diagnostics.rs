use crate::error::EncodeError;

/// Destination for notices about values the encoder had to degrade.
///
/// This is a side channel: it never receives the record being built and
/// cannot influence it. Implementations must not call back into the
/// encoder that reported to them.
pub trait DiagnosticSink: Send + Sync {
    /// Report one recovered encoding failure.
    ///
    /// **Parameters**
    /// - `error`: what went wrong. The record already carries a textual
    ///   substitute by the time this is called.
    fn report(&self, error: &EncodeError);
}

/// Default sink: forwards notices to `tracing` at `ERROR` level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn report(&self, error: &EncodeError) {
        tracing::error!(formatter = "JsonEncoder", error = %error, "could not encode log value");
    }
}

/// A sink that drops all notices.
///
/// Useful for measuring the encoder alone, and for tests that don't care
/// about the side channel.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopDiagnostics;

impl DiagnosticSink for NoopDiagnostics {
    fn report(&self, _error: &EncodeError) {}
}
