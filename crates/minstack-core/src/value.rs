//! The value domain shared by every implementation.

/// Element type stored by every stack implementation
pub type Value = u32;

/// "No minimum exists" signal for callers that want a raw value.
///
/// A pushed `EMPTY_MARKER` is still ordinary data; the typed API reports
/// emptiness with [`Error::Empty`](crate::Error::Empty) instead.
pub const EMPTY_MARKER: Value = Value::MAX;

/// Collapse a `pop`/`min` result into the raw-value convention.
pub fn or_marker(result: crate::Result<Value>) -> Value {
    result.unwrap_or(EMPTY_MARKER)
}
