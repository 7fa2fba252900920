//! Where tolerated anomalies go.
//!
//! Decoding never stops for an anomaly it knows how to recover from (an
//! unexpected value in an unknown-use field, a gap before a pointer target, a
//! LOD count mismatch, a truncated face list, an unknown node type, an
//! implausible palette offset). Each one is described in a single text
//! message handed to a [`Diagnostics`] sink.

/// Receives one formatted message per tolerated anomaly.
///
/// Any `FnMut(&str)` closure is a sink, which makes collecting messages in
/// tests or forwarding them to an application log a one-liner.
pub trait Diagnostics {
    fn report(&mut self, message: &str);
}

impl<F> Diagnostics for F
where
    F: FnMut(&str),
{
    fn report(&mut self, message: &str) {
        self(message)
    }
}

/// Forwards every message to `tracing` at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&mut self, message: &str) {
        tracing::warn!(target: "xwopt", "{message}");
    }
}

/// Discards every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreDiagnostics;

impl Diagnostics for IgnoreDiagnostics {
    fn report(&mut self, _message: &str) {}
}
