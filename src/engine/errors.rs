use thiserror::Error;

/// Errors that can arise while loading game data or touching the save store.
///
/// Play-time failures (unknown objects, blocked directions, invalid
/// responses) are not errors: they are reported to the player as transcript
/// lines and the session stays interactive.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Wrapper around JSON serialization and deserialization errors.
    #[error("game data error: {0}")]
    Json(#[from] serde_json::Error),

    /// Wrapper around IO errors (reading game files, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapper around sled's error type.
    #[error("save store error: {0}")]
    Sled(#[from] sled::Error),

    /// A location id referenced where the graph has no such node.
    #[error("unknown location: {0}")]
    UnknownLocation(String),
}
