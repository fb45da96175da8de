use proptest::prelude::*;
use sdk::errors::{AdvisorError, AdvisorErrorExt};
use sdk::types::AdvisoryRequest;

// User hints are static strings and never echo the payload of the error
proptest! {
    #[test]
    fn test_error_user_hint_completeness(error_str in "[a-zA-Z0-9_]{12,40}") {
        let errs = vec![
            AdvisorError::InvalidInput(error_str.clone()),
            AdvisorError::CorpusRead(error_str.clone()),
            AdvisorError::CorpusUnavailable(std::path::PathBuf::from(&error_str)),
            AdvisorError::RemoteService(error_str.clone()),
            AdvisorError::Authentication(error_str.clone()),
            AdvisorError::Config(error_str.clone()),
            AdvisorError::KeyringError(error_str.clone()),
            AdvisorError::SecretMissing(error_str.clone()),
        ];

        for err in errs {
            let hint = err.user_hint();
            prop_assert!(!hint.is_empty());
            prop_assert!(!hint.contains(&error_str));
        }
    }
}

// Any finite temperature is accepted, any non-blank question is accepted
proptest! {
    #[test]
    fn test_validate_accepts_numeric_temperatures(
        question in "[a-z]{1,12}( [a-z]{1,12}){0,5}",
        temperature in -80.0..=60.0f64,
    ) {
        let request = AdvisoryRequest::new(question).with_temperature(temperature.to_string());
        prop_assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_whitespace_questions(question in "[ \t\n]{0,10}") {
        let request = AdvisoryRequest::new(question);
        prop_assert!(matches!(request.validate(), Err(AdvisorError::EmptyQuestion)));
    }
}
