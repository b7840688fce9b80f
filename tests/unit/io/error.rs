//! Tests for error formatting and context attachment

#[cfg(test)]
mod tests {
    use patchstore::host::interface::SurfaceId;
    use patchstore::io::error::{
        StorageError, WithContext, invalid_parameter, partition_violation,
    };
    use patchstore::spatial::key::TilePos;
    use std::error::Error;
    use std::path::{Path, PathBuf};

    // Tests messages name the offending values
    // Verified by dropping the coordinates from the message
    #[test]
    fn test_display_messages() {
        let range = StorageError::CoordinateOutOfRange {
            position: TilePos::new(1 << 25, -3),
        };
        assert_eq!(
            range.to_string(),
            "Tile coordinate (33554432, -3) is outside the encodable range"
        );

        let unknown = StorageError::UnknownSurface {
            surface: SurfaceId(4),
        };
        assert_eq!(unknown.to_string(), "Surface 4 has no storage state");

        let violation = partition_violation(SurfaceId(1), &"patch 3 is empty");
        assert_eq!(
            violation.to_string(),
            "Partition violated on surface 1: patch 3 is empty"
        );
    }

    // Tests the helper stringifies value and reason
    // Verified by swapping value and reason
    #[test]
    fn test_invalid_parameter_helper() {
        let err = invalid_parameter("radius", &-2, &"must be positive");
        match &err {
            StorageError::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                assert_eq!(*parameter, "radius");
                assert_eq!(value, "-2");
                assert_eq!(reason, "must be positive");
            }
            other => panic!("expected invalid parameter, got {other:?}"),
        }
        assert!(err.source().is_none());
    }

    // Tests I/O failures keep path and operation
    // Verified by discarding the operation name
    #[test]
    fn test_with_path_io() {
        let result: Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = result
            .with_path(Path::new("out/state.json"), "create snapshot")
            .expect_err("error is kept");

        assert!(err.source().is_some());
        match err {
            StorageError::FileSystem {
                path, operation, ..
            } => {
                assert_eq!(path, PathBuf::from("out/state.json"));
                assert_eq!(operation, "create snapshot");
            }
            other => panic!("expected file system error, got {other:?}"),
        }
    }

    // Tests decoding failures become serialization errors with the path
    // Verified by mapping serde errors to file system errors
    #[test]
    fn test_with_path_serde() {
        let result: Result<u32, serde_json::Error> = serde_json::from_str("not json");
        let err = result
            .with_path(Path::new("scenario.json"), "decode scenario")
            .expect_err("error is kept");

        assert!(matches!(err, StorageError::Serialization { .. }));
        assert!(err.to_string().starts_with("Failed to (de)serialize 'scenario.json'"));
    }

    // Tests bare I/O errors convert with a placeholder path
    // Verified by removing the From implementation
    #[test]
    fn test_from_io_error() {
        let err: StorageError = std::io::Error::other("pipe closed").into();
        assert!(err.to_string().contains("<unknown>"));
    }
}
