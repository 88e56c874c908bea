use crate::clock::{Clock, SystemClock};
use crate::config::EncoderConfig;
use crate::diagnostics::{DiagnosticSink, TracingDiagnostics};
use crate::error::EncodeError;
use crate::formatter::Formatter;
use crate::record::{
    bad_key_at_index, parse_line, LogEntry, ParsedRecord, CALLSTACK_KEY, IMBALANCED_KEY,
    LEVEL_KEY, MESSAGE_KEY, NAME_KEY, TIME_KEY,
};
use crate::value::Value;
use serde::Serialize;
use std::backtrace::Backtrace;
use std::fmt::{self, Write as _};
use std::sync::Arc;

/// Last-resort value when neither a value nor its debug text can be encoded.
const UNMARSHALABLE_VALUE: &[u8] = br#""could not marshal this value""#;

/// Last-resort value when a plain string cannot be encoded.
const UNMARSHALABLE_STRING: &[u8] = br#""could not marshal this string""#;

/// Where a value is being written. Only values that own a key in the
/// enclosing object may inject sibling fields.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Position {
    Field,
    Element,
}

/// Encodes log calls as single-line JSON records.
///
/// Output layout, in this exact order:
///
/// ```text
/// {"_t":"<timestamp>", "_l":"<level>", "_n":"<name>", "_m":<message>[, "<key>":<value>]*}\n
/// ```
///
/// The encoder holds no mutable state, so one instance can be shared across
/// threads behind an `Arc` and called concurrently. Encoding never fails:
/// values that cannot be represented are replaced by a textual substitute
/// and the failure is reported to the configured [`DiagnosticSink`].
pub struct JsonEncoder {
    name: String,
    config: EncoderConfig,
    clock: Arc<dyn Clock>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl JsonEncoder {
    /// Create an encoder bound to `name` with the default configuration,
    /// the system clock and [`TracingDiagnostics`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: EncoderConfig::default(),
            clock: Arc::new(SystemClock),
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    pub fn with_config(mut self, config: EncoderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Append one record, terminated by `\n`, to `buf`.
    ///
    /// **Parameters**
    /// - `level`: looked up in the configured level-name table.
    /// - `message`: encoded like any field value; it is not forced to a
    ///   string.
    /// - `fields`: alternating keys and values. An odd-length list becomes a
    ///   single `args(odd)` field holding the whole list; an empty or
    ///   non-string key is replaced by `badKey[<index>]`.
    pub fn format(&self, buf: &mut Vec<u8>, level: i32, message: &Value, fields: &[Value]) {
        buf.push(b'{');
        self.write_str(buf, TIME_KEY);
        buf.push(b':');
        self.write_timestamp(buf);

        self.write_key(buf, LEVEL_KEY);
        self.write_str(buf, &self.config.level_names.name(level));

        self.write_key(buf, NAME_KEY);
        self.write_str(buf, &self.name);

        self.write_key(buf, MESSAGE_KEY);
        self.write_value(buf, message, Position::Field);

        self.write_fields(buf, fields);
        buf.extend_from_slice(b"}\n");
    }

    /// Like [`JsonEncoder::format`] but into a fresh buffer.
    pub fn format_to_vec(&self, level: i32, message: &Value, fields: &[Value]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(128 + fields.len() * 16);
        self.format(&mut buf, level, message, fields);
        buf
    }

    /// Format a record and parse it back into an ordered map.
    ///
    /// # Panics
    ///
    /// Panics if the encoder's own output is not valid JSON.
    pub fn as_map(&self, level: i32, message: &Value, fields: &[Value]) -> LogEntry {
        let buf = self.format_to_vec(level, message, fields);
        match parse_line::<LogEntry>(&buf) {
            Ok(entry) => entry,
            Err(err) => panic!(
                "JsonEncoder produced a record that is not valid JSON ({}): {}",
                err,
                String::from_utf8_lossy(&buf)
            ),
        }
    }

    /// Typed variant of [`JsonEncoder::as_map`].
    ///
    /// # Panics
    ///
    /// Same contract as [`JsonEncoder::as_map`].
    pub fn record(&self, level: i32, message: &Value, fields: &[Value]) -> ParsedRecord {
        let buf = self.format_to_vec(level, message, fields);
        match ParsedRecord::from_line(&buf) {
            Ok(record) => record,
            Err(err) => panic!(
                "JsonEncoder produced a record that does not parse ({}): {}",
                err,
                String::from_utf8_lossy(&buf)
            ),
        }
    }

    fn write_timestamp(&self, buf: &mut Vec<u8>) {
        let now = self.clock.now();
        let mut rendered = String::with_capacity(32);
        if write!(rendered, "{}", now.format(self.config.time_format())).is_err() {
            self.diagnostics.report(&EncodeError::Timestamp {
                format: self.config.time_format().to_string(),
            });
            rendered.clear();
            rendered.push_str(&now.to_rfc3339());
        }
        self.write_str(buf, &rendered);
    }

    fn write_fields(&self, buf: &mut Vec<u8>, fields: &[Value]) {
        if fields.is_empty() {
            return;
        }

        if fields.len() % 2 != 0 {
            self.write_key(buf, IMBALANCED_KEY);
            self.write_array(buf, fields);
            return;
        }

        for (pair, kv) in fields.chunks_exact(2).enumerate() {
            match kv[0].as_key() {
                Some(key) => self.write_key(buf, key),
                None => self.write_key(buf, &bad_key_at_index(pair * 2)),
            }
            self.write_value(buf, &kv[1], Position::Field);
        }
    }

    /// Writes `, "<key>":`. Never the first key of the object.
    fn write_key(&self, buf: &mut Vec<u8>, key: &str) {
        buf.extend_from_slice(b", ");
        self.write_str(buf, key);
        buf.push(b':');
    }

    fn write_array(&self, buf: &mut Vec<u8>, values: &[Value]) {
        buf.push(b'[');
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                buf.push(b',');
            }
            self.write_value(buf, value, Position::Element);
        }
        buf.push(b']');
    }

    /// At field position an error also appends a `callstack` sibling; several
    /// error fields therefore repeat that key in the line (see
    /// [`CALLSTACK_KEY`]).
    fn write_value(&self, buf: &mut Vec<u8>, value: &Value, position: Position) {
        match value {
            Value::Null => buf.extend_from_slice(b"null"),
            Value::Bool(true) => buf.extend_from_slice(b"true"),
            Value::Bool(false) => buf.extend_from_slice(b"false"),
            Value::I64(v) => self.write_serialized(buf, v),
            Value::U64(v) => self.write_serialized(buf, v),
            Value::I128(v) => self.write_serialized(buf, v),
            Value::U128(v) => self.write_serialized(buf, v),
            Value::F32(v) if v.is_finite() => self.write_serialized(buf, v),
            Value::F32(v) => self.write_str(buf, non_finite_name(f64::from(*v))),
            Value::F64(v) if v.is_finite() => self.write_serialized(buf, v),
            Value::F64(v) => self.write_str(buf, non_finite_name(*v)),
            Value::Str(s) => self.write_str(buf, s),
            Value::Error(err) => {
                self.write_str(buf, &err.to_string());
                if position == Position::Field {
                    let trace = Backtrace::force_capture();
                    self.write_key(buf, CALLSTACK_KEY);
                    self.write_str(buf, &trace.to_string());
                }
            }
            Value::Structured(inner) => {
                let mark = buf.len();
                if let Err(source) = inner.write_json(buf) {
                    buf.truncate(mark);
                    let type_name = inner.type_name();
                    self.diagnostics.report(&EncodeError::Structural { type_name, source });
                    self.write_fallback(buf, type_name, inner);
                }
            }
            Value::Opaque { type_name, value } => {
                let type_name = *type_name;
                self.diagnostics.report(&EncodeError::Opaque { type_name });
                self.write_fallback(buf, type_name, value);
            }
        }
    }

    /// Scalars that go through serde_json for exact, shortest formatting.
    fn write_serialized<T: Serialize + ?Sized>(&self, buf: &mut Vec<u8>, value: &T) {
        let mark = buf.len();
        if let Err(source) = serde_json::to_writer(&mut *buf, value) {
            buf.truncate(mark);
            self.diagnostics.report(&EncodeError::Structural {
                type_name: std::any::type_name::<T>(),
                source,
            });
            buf.extend_from_slice(UNMARSHALABLE_VALUE);
        }
    }

    /// Debug text of `value` as a JSON string.
    fn write_fallback<D>(&self, buf: &mut Vec<u8>, type_name: &'static str, value: &D)
    where
        D: fmt::Debug + ?Sized,
    {
        let mut text = String::new();
        if write!(text, "{:?}", value).is_err() {
            self.diagnostics.report(&EncodeError::DebugText { type_name });
            buf.extend_from_slice(UNMARSHALABLE_VALUE);
            return;
        }

        let mark = buf.len();
        if let Err(source) = serde_json::to_writer(&mut *buf, text.as_str()) {
            buf.truncate(mark);
            self.diagnostics.report(&EncodeError::Fallback(source));
            buf.extend_from_slice(UNMARSHALABLE_VALUE);
        }
    }

    fn write_str(&self, buf: &mut Vec<u8>, s: &str) {
        let mark = buf.len();
        if let Err(source) = serde_json::to_writer(&mut *buf, s) {
            buf.truncate(mark);
            self.diagnostics.report(&EncodeError::String(source));
            buf.extend_from_slice(UNMARSHALABLE_STRING);
        }
    }
}

fn non_finite_name(v: f64) -> &'static str {
    if v.is_nan() {
        "NaN"
    } else if v.is_sign_positive() {
        "+Inf"
    } else {
        "-Inf"
    }
}

impl Formatter for JsonEncoder {
    fn format(&self, buf: &mut Vec<u8>, level: i32, message: &Value, fields: &[Value]) {
        JsonEncoder::format(self, buf, level, message, fields)
    }
}

impl fmt::Debug for JsonEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonEncoder")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
