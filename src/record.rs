use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

pub const TIME_KEY: &str = "_t";
pub const LEVEL_KEY: &str = "_l";
pub const NAME_KEY: &str = "_n";
pub const MESSAGE_KEY: &str = "_m";

/// Sibling field carrying a captured stack trace next to every error value.
///
/// Each error-typed field adds its own `callstack` key, so a record with
/// several errors repeats the key in the raw line. Parsing into a
/// [`LogEntry`] or [`ParsedRecord`] keeps only the last one.
pub const CALLSTACK_KEY: &str = "callstack";

/// Field holding the whole argument list when it has an odd length.
pub const IMBALANCED_KEY: &str = "args(odd)";

/// Key substituted for an empty or non-string key at argument index `index`.
pub fn bad_key_at_index(index: usize) -> String {
    format!("badKey[{}]", index)
}

/// One encoded record materialized as an ordered map.
pub type LogEntry = Map<String, JsonValue>;

/// Typed view of one line produced by the encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRecord {
    #[serde(rename = "_t")]
    pub timestamp: String,
    #[serde(rename = "_l")]
    pub level: String,
    #[serde(rename = "_n")]
    pub name: String,
    #[serde(rename = "_m")]
    pub message: JsonValue,
    /// Every key besides the four fixed ones, in emission order.
    #[serde(flatten)]
    pub fields: LogEntry,
}

impl ParsedRecord {
    /// Parse one newline-terminated line as written by the encoder.
    pub fn from_line(line: &[u8]) -> Result<Self, serde_json::Error> {
        parse_line(line)
    }
}

/// Parse one encoded line without serde_json's nesting limit.
///
/// The encoder writes caller values at any depth, so its output must parse
/// back at any depth too.
pub fn parse_line<T: DeserializeOwned>(line: &[u8]) -> Result<T, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_slice(line);
    de.disable_recursion_limit();
    let value = T::deserialize(&mut de)?;
    de.end()?;
    Ok(value)
}
