use crate::value::Value;

/// Turns one log call into bytes appended to a caller-owned buffer.
///
/// This is the seam a logger front-end holds (usually as
/// `Arc<dyn Formatter>`) after it has decided a call passes its level
/// filter. Writing the buffer to a destination is the front-end's job.
pub trait Formatter: Send + Sync {
    /// Append one complete record for `(level, message, fields)` to `buf`.
    ///
    /// Must not fail: implementations degrade bad input into visible
    /// output instead.
    fn format(&self, buf: &mut Vec<u8>, level: i32, message: &Value, fields: &[Value]);
}
