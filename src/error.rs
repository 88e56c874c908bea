/// Internal encoding failure.
///
/// These never reach callers of [`crate::encoder::JsonEncoder::format`]:
/// the encoder substitutes a textual fallback in the record and hands the
/// error to the configured [`crate::diagnostics::DiagnosticSink`].
#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    #[error("could not encode {type_name} as JSON, using debug text: {source}")]
    Structural {
        type_name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("value of type {type_name} has no JSON encoding, using debug text")]
    Opaque { type_name: &'static str },

    #[error("could not encode string: {0}")]
    String(#[source] serde_json::Error),

    #[error("could not encode fallback text: {0}")]
    Fallback(#[source] serde_json::Error),

    #[error("Debug implementation of {type_name} failed while rendering fallback text")]
    DebugText { type_name: &'static str },

    #[error("timestamp format {format:?} could not be rendered, using RFC 3339")]
    Timestamp { format: String },
}

/// Error returned when building an [`crate::config::EncoderConfig`].
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid strftime time format: {0:?}")]
    InvalidTimeFormat(String),
}
