use std::io::{self, Write};
use std::time::Instant;

use json_log_encoder::config::{EncoderConfig, LEVEL_INFO};
use json_log_encoder::env::{env_or, LOG_JSON_NAME_ENV};
use json_log_encoder::init::init_diagnostics;
use json_log_encoder::JsonEncoder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_diagnostics()?;

    let encoder = JsonEncoder::new(env_or(LOG_JSON_NAME_ENV, "default-load"))
        .with_config(EncoderConfig::from_env()?);

    let n: u64 = 100_000;
    let mut buf = Vec::with_capacity(256);
    let start = Instant::now();

    for i in 0..n {
        buf.clear();
        let fields = vec!["iteration".into(), i.into(), "ratio".into(), (i as f64 / 7.0).into()];
        encoder.format(&mut buf, LEVEL_INFO, &"default load test record".into(), &fields);
    }

    let elapsed = start.elapsed();
    println!("default config: encoded {} records in {:?} (~{:.0} rec/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    // Last record, so the output shape is visible.
    io::stdout().write_all(&buf)?;
    Ok(())
}
