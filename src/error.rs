use thiserror::Error;

/// Errors surfaced by this crate's public operations.
///
/// Per-route conditions (policy rejection, loop detection, a worse
/// candidate than the one installed) are not errors — they are normal
/// control flow and show up as an empty forward list, never as an `Err`.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid as-rel file {path}: {detail}")]
    InvalidAsRelFile { path: String, detail: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A read/write failure unrelated to as-rel parsing — e.g. a
    /// connectivity report or routing-table snapshot that couldn't be
    /// written to disk.
    #[error("io error for {path}: {detail}")]
    Io { path: String, detail: String },
}
