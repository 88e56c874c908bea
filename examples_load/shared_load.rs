use std::sync::Arc;
use std::thread;
use std::time::Instant;

use json_log_encoder::config::{LEVEL_ERROR, LEVEL_INFO};
use json_log_encoder::diagnostics::NoopDiagnostics;
use json_log_encoder::env::{env_or, LOG_JSON_NAME_ENV};
use json_log_encoder::{Formatter, JsonEncoder, Value};

fn main() {
    // Measure the encoder alone.
    let encoder = JsonEncoder::new(env_or(LOG_JSON_NAME_ENV, "shared-load"))
        .with_diagnostics(Arc::new(NoopDiagnostics));
    let formatter: Arc<dyn Formatter> = Arc::new(encoder);

    let threads: u64 = 8;
    let per_thread: u64 = 25_000;
    let start = Instant::now();

    let handles: Vec<_> = (0..threads)
        .map(|worker| {
            let formatter = Arc::clone(&formatter);
            thread::spawn(move || {
                let mut buf = Vec::with_capacity(512);
                let mut bytes = 0usize;
                for i in 0..per_thread {
                    buf.clear();
                    if i % 1_000 == 0 {
                        let err: Box<dyn std::error::Error + Send + Sync> =
                            format!("sample failure {}", i).into();
                        let fields = vec!["err".into(), Value::from(err)];
                        let message = "periodic failure".into();
                        formatter.format(&mut buf, LEVEL_ERROR, &message, &fields);
                    } else {
                        let fields =
                            vec!["worker".into(), worker.into(), "iteration".into(), i.into()];
                        let message = "shared load test record".into();
                        formatter.format(&mut buf, LEVEL_INFO, &message, &fields);
                    }
                    bytes += buf.len();
                }
                bytes
            })
        })
        .collect();

    let bytes: usize = handles.into_iter().map(|h| h.join().unwrap_or(0)).sum();
    let n = threads * per_thread;
    let elapsed = start.elapsed();
    println!("shared encoder: {} threads encoded {} records ({} bytes) in {:?} (~{:.0} rec/s)",
        threads,
        n,
        bytes,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
