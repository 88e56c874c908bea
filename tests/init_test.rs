use std::sync::Arc;

use json_log_encoder::config::LEVEL_INFO;
use json_log_encoder::diagnostics::TracingDiagnostics;
use json_log_encoder::init::init_diagnostics;
use json_log_encoder::{JsonEncoder, Value};

// Only test in this binary, so it owns the global subscriber.
#[test]
fn test_init_diagnostics_installs_once() {
    assert!(init_diagnostics().is_ok());
    assert!(init_diagnostics().is_err());

    // Notices go to the installed subscriber; the record itself is unaffected.
    let encoder = JsonEncoder::new("svc").with_diagnostics(Arc::new(TracingDiagnostics));
    let callback: fn() = || {};
    let entry = encoder.as_map(LEVEL_INFO, &"m".into(), &["cb".into(), Value::opaque(callback)]);
    assert!(entry["cb"].is_string());
}
