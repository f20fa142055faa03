//! Error types for mesh loading.

use thiserror::Error;

/// Result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Errors that can occur while loading a mesh.
///
/// Both kinds are fatal to the `load` call that produced them. The store
/// that was being loaded keeps whatever geometry it held before the call.
#[derive(Debug, Error)]
pub enum MeshError {
    /// The source could not be opened, or reading from it failed.
    #[error("could not read {source_name}: {source}")]
    SourceUnavailable {
        /// Path or label of the source.
        source_name: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A record could not be parsed, or it references a vertex or normal
    /// that does not exist.
    #[error("malformed geometry at line {line}: {message}")]
    MalformedGeometry {
        /// 1-based line number in the source.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },
}

impl MeshError {
    /// Create a `SourceUnavailable` error.
    #[must_use]
    pub fn unavailable(source_name: impl Into<String>, source: std::io::Error) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            source,
        }
    }

    /// Create a `MalformedGeometry` error for the given line.
    #[must_use]
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedGeometry {
            line,
            message: message.into(),
        }
    }

    /// True for `MalformedGeometry`.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedGeometry { .. })
    }

    /// True for `SourceUnavailable`.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }
}
