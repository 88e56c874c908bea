use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::thread;

use json_log_encoder::config::{LEVEL_ERROR, LEVEL_INFO};
use json_log_encoder::diagnostics::NoopDiagnostics;
use json_log_encoder::record::{CALLSTACK_KEY, IMBALANCED_KEY, MESSAGE_KEY, NAME_KEY};
use json_log_encoder::{Formatter, JsonEncoder, Value as LogValue};
use proptest::prelude::*;

fn quiet_encoder() -> JsonEncoder {
    JsonEncoder::new("svc").with_diagnostics(Arc::new(NoopDiagnostics))
}

fn arb_value() -> impl Strategy<Value = LogValue> {
    prop_oneof![
        Just(LogValue::Null),
        any::<bool>().prop_map(LogValue::from),
        any::<i64>().prop_map(LogValue::from),
        any::<u64>().prop_map(LogValue::from),
        any::<i128>().prop_map(LogValue::from),
        any::<f32>().prop_map(LogValue::from),
        any::<f64>().prop_map(LogValue::from),
        any::<String>().prop_map(LogValue::from),
        any::<String>().prop_map(|s| LogValue::error(io::Error::new(io::ErrorKind::Other, s))),
        prop::collection::vec(any::<i32>(), 0..4).prop_map(LogValue::from),
        prop::collection::hash_map(any::<(u8, u8)>(), any::<u8>(), 0..3)
            .prop_map(LogValue::structured),
        any::<u32>().prop_map(LogValue::opaque),
    ]
}

/// Key kinds: 0 valid and unique, 1 empty string, 2 not a string.
fn build_fields(pairs: &[(u8, LogValue)], trailing: Option<LogValue>) -> Vec<LogValue> {
    let mut fields = Vec::with_capacity(pairs.len() * 2 + 1);
    for (i, (kind, value)) in pairs.iter().enumerate() {
        let key = match kind {
            0 => LogValue::from(format!("key{}", i)),
            1 => LogValue::from(""),
            _ => LogValue::from(i),
        };
        fields.push(key);
        fields.push(value.clone());
    }
    if let Some(extra) = trailing {
        fields.push(extra);
    }
    fields
}

proptest! {
    #[test]
    fn format_always_yields_one_json_line(
        message in arb_value(),
        pairs in prop::collection::vec((0u8..3, arb_value()), 0..8),
        trailing in prop::option::of(arb_value()),
    ) {
        let encoder = quiet_encoder();
        let fields = build_fields(&pairs, trailing);
        let out = encoder.format_to_vec(LEVEL_INFO, &message, &fields);

        prop_assert_eq!(out.last(), Some(&b'\n'));
        prop_assert_eq!(out.iter().filter(|b| **b == b'\n').count(), 1);
        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        prop_assert!(parsed.is_object());
    }

    #[test]
    fn every_argument_is_accounted_for(
        pairs in prop::collection::vec((0u8..3, arb_value()), 0..8),
        odd in any::<bool>(),
    ) {
        let encoder = quiet_encoder();
        let fields = build_fields(&pairs, odd.then(|| LogValue::from("dangling")));
        let entry = encoder.as_map(LEVEL_INFO, &"m".into(), &fields);

        if odd {
            prop_assert_eq!(entry.len(), 4 + 1);
            prop_assert_eq!(entry[IMBALANCED_KEY].as_array().map(|a| a.len()), Some(fields.len()));
        } else {
            // Every error field writes a `callstack` key; the map keeps one.
            let has_error = pairs.iter().any(|(_, v)| matches!(v, LogValue::Error(_)));
            let expected = 4 + pairs.len() + usize::from(has_error);
            prop_assert_eq!(entry.len(), expected);
            for (i, (kind, _)) in pairs.iter().enumerate() {
                let key = match kind {
                    0 => format!("key{}", i),
                    _ => format!("badKey[{}]", i * 2),
                };
                prop_assert!(entry.contains_key(&key), "missing {}", key);
            }
        }
    }

    #[test]
    fn fields_match_standalone_encoding(pairs in prop::collection::vec(arb_value(), 1..6)) {
        let encoder = quiet_encoder();
        let keyed: Vec<(u8, LogValue)> = pairs.into_iter().map(|v| (0, v)).collect();
        let fields = build_fields(&keyed, None);
        let entry = encoder.as_map(LEVEL_INFO, &"m".into(), &fields);

        for (i, (_, value)) in keyed.iter().enumerate() {
            let alone = encoder.as_map(LEVEL_INFO, value, &[]);
            prop_assert_eq!(&entry[&format!("key{}", i)], &alone[MESSAGE_KEY]);
        }
    }
}

#[test]
fn test_readme_examples() {
    let encoder = quiet_encoder();

    let entry = encoder.as_map(LEVEL_INFO, &"started".into(), &["port".into(), 8080.into()]);
    assert_eq!(entry["_l"], "INFO");
    assert_eq!(entry[NAME_KEY], "svc");
    assert_eq!(entry["port"], 8080);

    let entry = encoder.as_map(LEVEL_INFO, &"bad".into(), &["onlyKey".into()]);
    assert_eq!(entry[IMBALANCED_KEY], serde_json::json!(["onlyKey"]));

    let err = io::Error::new(io::ErrorKind::NotFound, "config missing");
    let entry = encoder.as_map(LEVEL_ERROR, &"boom".into(), &["err".into(), LogValue::error(err)]);
    assert_eq!(entry["err"], "config missing");
    assert!(entry[CALLSTACK_KEY].as_str().is_some_and(|s| !s.is_empty()));
}

#[test]
fn test_unencodable_values_never_escape() {
    let encoder = quiet_encoder();
    let mut nested: HashMap<Vec<u8>, &str> = HashMap::new();
    nested.insert(vec![1, 2], "bytes as key");
    let closure: fn() -> &'static str = || "called";

    let fields = vec![
        "nested".into(),
        LogValue::structured(nested),
        "closure".into(),
        LogValue::opaque(closure),
    ];
    let entry = encoder.as_map(LEVEL_INFO, &LogValue::opaque(closure), &fields);
    assert!(entry["nested"].is_string());
    assert!(entry["closure"].is_string());
    assert!(entry[MESSAGE_KEY].is_string());
}

#[test]
fn test_shared_encoder_across_threads() {
    let formatter: Arc<dyn Formatter> = Arc::new(quiet_encoder());

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let formatter = Arc::clone(&formatter);
            thread::spawn(move || {
                let mut buf = Vec::new();
                for seq in 0..200u32 {
                    let fields = vec!["worker".into(), worker.into(), "seq".into(), seq.into()];
                    formatter.format(&mut buf, LEVEL_INFO, &"tick".into(), &fields);
                }
                buf
            })
        })
        .collect();

    for (worker, handle) in handles.into_iter().enumerate() {
        let buf = handle.join().unwrap();
        let lines: Vec<&[u8]> = buf.split(|b| *b == b'\n').filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 200);
        for (seq, line) in lines.iter().enumerate() {
            let parsed: serde_json::Value = serde_json::from_slice(line).unwrap();
            assert_eq!(parsed["worker"], worker as u64);
            assert_eq!(parsed["seq"], seq as u64);
        }
    }
}
