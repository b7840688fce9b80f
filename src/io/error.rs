//! Error types and context management for storage operations

use crate::host::interface::SurfaceId;
use crate::spatial::key::TilePos;
use std::fmt;
use std::path::{Path, PathBuf};

/// Main error type for all storage operations
#[derive(Debug)]
pub enum StorageError {
    /// Coordinate cannot be encoded into a tile key
    ///
    /// Both axes must lie in `[-2^25, 2^25)`. Hitting this means the host
    /// world is larger than the codec supports, so the operation is abandoned.
    CoordinateOutOfRange {
        /// The offending position
        position: TilePos,
    },

    /// Event referenced a surface that has no storage state
    UnknownSurface {
        /// The missing surface
        surface: SurfaceId,
    },

    /// The patches of a surface no longer partition its storage tiles
    PartitionViolation {
        /// Surface the check ran on
        surface: SurfaceId,
        /// Description of the first violation found
        reason: String,
    },

    /// Configuration or command-line value failed validation
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Overlay requested for a surface without tiles
    NothingToRender {
        /// The empty surface
        surface: SurfaceId,
    },

    /// Scenario or snapshot file could not be encoded or decoded
    Serialization {
        /// Path of the document
        path: PathBuf,
        /// Underlying serde error
        source: serde_json::Error,
    },

    /// Failed to save the overlay image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CoordinateOutOfRange { position } => {
                write!(
                    f,
                    "Tile coordinate ({}, {}) is outside the encodable range",
                    position.x, position.y
                )
            }
            Self::UnknownSurface { surface } => {
                write!(f, "Surface {} has no storage state", surface.0)
            }
            Self::PartitionViolation { surface, reason } => {
                write!(f, "Partition violated on surface {}: {reason}", surface.0)
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::NothingToRender { surface } => {
                write!(f, "Surface {} has no tiles to render", surface.0)
            }
            Self::Serialization { path, source } => {
                write!(f, "Failed to (de)serialize '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serialization { source, .. } => Some(source),
            Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for storage results
pub type Result<T> = std::result::Result<T, StorageError>;

/// Attaches the file being worked on to I/O and serde failures
pub trait WithContext<T> {
    /// Add path and operation context to a Result
    ///
    /// # Errors
    ///
    /// Propagates the original error with the path applied
    fn with_path(self, path: &Path, operation: &'static str) -> Result<T>;
}

impl<T> WithContext<T> for std::result::Result<T, std::io::Error> {
    fn with_path(self, path: &Path, operation: &'static str) -> Result<T> {
        self.map_err(|source| StorageError::FileSystem {
            path: path.to_path_buf(),
            operation,
            source,
        })
    }
}

impl<T> WithContext<T> for std::result::Result<T, serde_json::Error> {
    fn with_path(self, path: &Path, _operation: &'static str) -> Result<T> {
        self.map_err(|source| StorageError::Serialization {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> StorageError {
    StorageError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a partition violation error
pub fn partition_violation(surface: SurfaceId, reason: &impl ToString) -> StorageError {
    StorageError::PartitionViolation {
        surface,
        reason: reason.to_string(),
    }
}
