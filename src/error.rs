//! Error types for `dialograph`

use thiserror::Error;

/// The error type for `dialograph` operations.
///
/// Only authoring-side operations (graph construction, format parsing) are
/// fallible. Playback never returns errors for graph-data problems - it
/// degrades to a well-defined conversation end instead.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO / Format Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ==================== Graph Construction Errors ====================
    /// A node id is already taken by another node in the graph.
    ///
    /// Ids share one flat namespace: a dialog node and a choice node may
    /// not reuse the same id.
    #[error("duplicate node id: {id}")]
    DuplicateNodeId {
        /// The offending id.
        id: String,
    },

    /// A node was inserted with an empty id.
    #[error("node id must not be empty")]
    EmptyNodeId,
}

/// A specialized Result type for `dialograph` operations.
pub type Result<T> = std::result::Result<T, Error>;
