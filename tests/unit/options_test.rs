//! Unit tests for option validation and construction
//!
//! Every recognized option is checked on its own: a wrong type must fail
//! construction with an error naming that option.

use assert_matches::assert_matches;
use serde_json::{json, Value};
use tostring::config::{
    ALLOW_HALF_OPEN, DECODE_STRINGS, ENCODING, HIGH_WATER_MARK, OBJECT_MODE, PLACEHOLDER,
};
use tostring::{create, create_structured_mode, ConfigError, StreamOptions, StringifyStream};

fn options_with(name: &str, value: Value) -> StreamOptions {
    let mut options = StreamOptions::new();
    options.set(name, value);
    options
}

#[cfg(test)]
mod options_tests {
    use super::*;

    #[test]
    fn test_valid_configurations_construct() {
        let configurations = vec![
            StreamOptions::new(),
            StreamOptions::text_lines(),
            StreamOptions::structured(),
            StreamOptions::new().with_high_water_mark(0),
            StreamOptions::new().with_allow_half_open(false),
            StreamOptions::new().with_placeholder(json!({"missing": true})),
            options_with(ENCODING, Value::Null),
            options_with(DECODE_STRINGS, json!("ignored")),
        ];

        for options in configurations {
            let stream = create(options).unwrap();
            assert!(!stream.is_destroyed());
        }
    }

    #[test]
    fn test_non_boolean_object_mode_fails() {
        for value in [json!("true"), json!(1), json!(null), json!([])] {
            let error = StringifyStream::new(options_with(OBJECT_MODE, value)).unwrap_err();
            assert_matches!(
                error,
                ConfigError::TypeMismatch { option: "object_mode", expected: "boolean", .. }
            );
        }
    }

    #[test]
    fn test_non_numeric_high_water_mark_fails() {
        for value in [json!("16"), json!(true), json!(null), json!({})] {
            let error = create(options_with(HIGH_WATER_MARK, value)).unwrap_err();
            assert_matches!(
                error,
                ConfigError::TypeMismatch { option: "high_water_mark", expected: "number", .. }
            );
        }
    }

    #[test]
    fn test_negative_high_water_mark_fails() {
        let error = create(options_with(HIGH_WATER_MARK, json!(-1))).unwrap_err();
        assert_matches!(error, ConfigError::OutOfRange { option: "high_water_mark", .. });
        assert_eq!(error.option(), Some("high_water_mark"));
    }

    #[test]
    fn test_non_boolean_allow_half_open_fails() {
        let error = create(options_with(ALLOW_HALF_OPEN, json!("no"))).unwrap_err();
        assert_matches!(error, ConfigError::TypeMismatch { option: "allow_half_open", .. });
    }

    #[test]
    fn test_bad_encoding_fails() {
        let error = create(options_with(ENCODING, json!(8))).unwrap_err();
        assert_matches!(error, ConfigError::TypeMismatch { option: "encoding", .. });

        let error = create(options_with(ENCODING, json!("klingon"))).unwrap_err();
        assert_matches!(error, ConfigError::UnknownEncoding { .. });
        assert_eq!(error.option(), Some("encoding"));
    }

    #[test]
    fn test_placeholder_accepts_any_value() {
        let stream = create(options_with(PLACEHOLDER, json!(false))).unwrap();
        assert_eq!(stream.config().placeholder, "false");
    }

    #[test]
    fn test_structured_mode_helper_records_mode() {
        let mut options = StreamOptions::new().with_object_mode(false);
        let stream = create_structured_mode(&mut options).unwrap();

        assert!(stream.config().object_mode);
        assert_eq!(options.get(OBJECT_MODE), Some(&json!(true)));
    }

    #[test]
    fn test_structured_mode_helper_still_validates() {
        let mut options = options_with(HIGH_WATER_MARK, json!(-5));
        assert!(create_structured_mode(&mut options).is_err());
    }

    #[test]
    fn test_options_round_trip_through_json_document() {
        let options = StreamOptions::from_json_str(
            r#"{"object_mode": true, "placeholder": "BEEP", "high_water_mark": 2}"#,
        )
        .unwrap();
        let config = create(options).unwrap().config().clone();

        assert!(config.object_mode);
        assert_eq!(config.placeholder, "BEEP");
        assert_eq!(config.high_water_mark, 2);
    }
}
