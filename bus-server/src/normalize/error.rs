//! Normalizer error types.

/// Errors that can occur while turning raw provider records into entities.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeError {
    /// A required field is missing or could not be converted.
    #[error("malformed {table} record: field {key}: {reason}")]
    MalformedRecord {
        table: &'static str,
        key: &'static str,
        reason: String,
    },

    /// The response had no records where at least one was needed.
    #[error("{table} response contained no records")]
    EmptyResult { table: &'static str },
}
