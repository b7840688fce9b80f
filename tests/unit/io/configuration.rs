//! Tests for storage constants and runtime settings

#[cfg(test)]
mod tests {
    use patchstore::io::configuration::{
        AXIS_BITS, AXIS_LIMIT, AXIS_RANGE, DEFAULT_SCANNER_UPDATE_PERIOD, DEFAULT_TILE_CAPACITY,
        MAX_SPLIT_FRAGMENTS, SANDBOX_SCANNER_SLOTS, Settings,
    };
    use patchstore::io::error::StorageError;

    // Tests codec bounds derive from the axis width
    // Verified by changing the axis width
    #[test]
    fn test_axis_bounds() {
        assert_eq!(AXIS_BITS, 26);
        assert_eq!(AXIS_RANGE, 67_108_864);
        assert_eq!(AXIS_LIMIT, 33_554_432);
        // Two encoded axes must fit an f64 mantissa
        assert_eq!((AXIS_RANGE * AXIS_RANGE).ilog2(), 2 * AXIS_BITS);
        assert_eq!(f64::MANTISSA_DIGITS, 53);
    }

    // Tests one removal can split a patch at most four ways
    // Verified by raising the fragment bound
    #[test]
    fn test_split_fragment_bound() {
        assert_eq!(MAX_SPLIT_FRAGMENTS, 4);
    }

    // Tests defaults documented for operators
    // Verified by changing the default capacity
    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.tile_capacity, DEFAULT_TILE_CAPACITY);
        assert_eq!(settings.tile_capacity, 2000);
        assert_eq!(settings.scanner_update_period, DEFAULT_SCANNER_UPDATE_PERIOD);
        assert_eq!(SANDBOX_SCANNER_SLOTS, 20);
        settings.validate().expect("defaults are valid");
    }

    // Tests a zero refresh period is rejected and zero capacity allowed
    // Verified by accepting every period
    #[test]
    fn test_settings_validate() {
        let zero_period = Settings {
            tile_capacity: 10,
            scanner_update_period: 0,
        };
        match zero_period.validate() {
            Err(StorageError::InvalidParameter { parameter, .. }) => {
                assert_eq!(parameter, "scanner_update_period");
            }
            other => panic!("expected invalid parameter, got {other:?}"),
        }

        let zero_capacity = Settings {
            tile_capacity: 0,
            scanner_update_period: 1,
        };
        assert!(zero_capacity.validate().is_ok());
    }

    // Tests settings read from scenario files by field name
    // Verified by renaming a field
    #[test]
    fn test_settings_json() {
        let settings: Settings =
            serde_json::from_str(r#"{"tile_capacity":50,"scanner_update_period":5}"#)
                .expect("valid settings");
        assert_eq!(
            settings,
            Settings {
                tile_capacity: 50,
                scanner_update_period: 5,
            }
        );
    }
}
