//! Metrics/tracing hooks.
//!
//! Purposefully avoids pulling in a heavy telemetry stack; wire this up to a
//! real collector in the binary layer if one is needed.

#[cfg(feature = "tracing")]
pub fn emit_span(event: &str, key_values: &[(&str, String)]) {
    let span = tracing::span!(tracing::Level::TRACE, "vsort", event);
    let _enter = span.enter();
    for (k, v) in key_values {
        tracing::trace!(%event, %k, %v, "metric");
    }
}

#[cfg(not(feature = "tracing"))]
pub fn emit_span(_event: &str, _key_values: &[(&str, String)]) { /* no-op */
}
