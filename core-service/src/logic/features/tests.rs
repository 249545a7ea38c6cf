//! Tests for event feature extraction

#[cfg(test)]
mod extraction_tests {
    use crate::logic::events::LogEvent;
    use crate::logic::features::{
        featurize, layout::FEATURE_LAYOUT, parse_hour, EventFeatures, TimestampError, DEFAULT_HOUR,
    };
    use crate::logic::sensitivity::SensitivityDetector;

    #[test]
    fn test_parse_hour_from_iso_timestamp() {
        assert_eq!(parse_hour(Some("2024-03-05T03:17:00Z")), Ok(3));
        assert_eq!(parse_hour(Some("2024-03-05 23:59:59")), Ok(23));
        assert_eq!(parse_hour(Some("2024-03-05T00:00:00.123456+00:00")), Ok(0));
    }

    #[test]
    fn test_parse_hour_named_failures() {
        assert_eq!(parse_hour(None), Err(TimestampError::Missing));
        assert_eq!(parse_hour(Some("  ")), Err(TimestampError::Missing));
        assert_eq!(parse_hour(Some("2024-03-05")), Err(TimestampError::TooShort(10)));
        assert_eq!(
            parse_hour(Some("2024-03-05Tab:00:00")),
            Err(TimestampError::NotNumeric("ab".to_string()))
        );
        assert_eq!(parse_hour(Some("2024-03-05T27:00:00")), Err(TimestampError::OutOfRange(27)));
    }

    #[test]
    fn test_featurize_copies_sensitivity() {
        let detector = SensitivityDetector::with_default_rules();
        let event = LogEvent::new("WRITE", "patient SSN 123-45-6789 logged")
            .with_timestamp("2024-03-05T02:10:00Z");
        let result = detector.detect(&event.message);

        let features = featurize(&event, &result);
        assert_eq!(
            features,
            EventFeatures {
                hour: 2,
                // "patient SSN 123-45-6789 logged" + " " + "WRITE"
                message_length: 30 + 1 + 5,
                has_sensitive_data: 1,
                sensitivity: 5,
            }
        );
    }

    #[test]
    fn test_bad_timestamp_never_blocks_extraction() {
        let detector = SensitivityDetector::with_default_rules();
        for ts in [None, Some("yesterday"), Some("2024-03-05T99:00:00Z")] {
            let mut event = LogEvent::new("READ", "ok");
            event.timestamp = ts.map(str::to_string);
            let features = featurize(&event, &detector.detect(&event.message));
            assert_eq!(features.hour, DEFAULT_HOUR);
            assert_eq!(features.has_sensitive_data, 0);
            assert_eq!(features.sensitivity, 1);
        }
    }

    #[test]
    fn test_message_length_counts_chars() {
        let detector = SensitivityDetector::with_default_rules();
        let event = LogEvent::new("", "héllo");
        let features = featurize(&event, &detector.detect(&event.message));
        assert_eq!(features.message_length, 6);
    }

    #[test]
    fn test_vector_follows_layout_order() {
        let features = EventFeatures {
            hour: 7,
            message_length: 42,
            has_sensitive_data: 1,
            sensitivity: 4,
        };
        let vector = features.to_vector();

        assert!(vector.validate().is_ok());
        assert_eq!(vector.as_slice(), &[7.0, 42.0, 1.0, 4.0]);
        for (i, name) in FEATURE_LAYOUT.iter().enumerate() {
            assert_eq!(vector.get_by_name(name), vector.get(i));
        }
    }
}
