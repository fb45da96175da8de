use advisor_engine::secrets::{scrub, SecretManager, SecretString, API_KEY_SECRET};
use sdk::AdvisorError;

#[test]
fn test_secret_manager_round_trip() {
    if std::env::var("CI").is_ok() {
        return; // Skip: no keyring in CI
    }
    let manager = SecretManager::new("crop-advisor-integration-test");
    let key = "test_api_key_integration";

    if manager.set_secret(key, "gsk_test123456789").is_err() {
        return; // No keychain backend on this machine
    }

    assert_eq!(
        manager.lookup_secret(key).unwrap().as_deref(),
        Some("gsk_test123456789")
    );
    assert!(manager.has_secret(key));

    manager.delete_secret(key).unwrap();
    assert!(!manager.has_secret(key));
}

#[test]
fn test_api_key_from_environment() {
    let var = "CROP_ADVISOR_TEST_KEY_PRESENT";
    std::env::set_var(var, "gsk_from_environment");

    let key = SecretManager::new("crop-advisor-integration-test")
        .resolve_api_key(var)
        .unwrap();
    assert_eq!(key.unsecure(), "gsk_from_environment");

    std::env::remove_var(var);
}

#[test]
fn test_missing_key_names_the_variable() {
    if std::env::var("CI").is_ok() {
        return; // Skip: no keyring in CI
    }
    // A service with nothing stored falls through to SecretMissing.
    let manager = SecretManager::new("crop-advisor-integration-test-empty");
    if manager.has_secret(API_KEY_SECRET) {
        return;
    }

    let err = manager
        .resolve_api_key("CROP_ADVISOR_TEST_KEY_ABSENT")
        .unwrap_err();
    assert!(matches!(
        err,
        AdvisorError::SecretMissing(ref var) if var == "CROP_ADVISOR_TEST_KEY_ABSENT"
    ));
}

#[test]
fn test_secret_string_debug_is_redacted() {
    let key = SecretString::new("gsk_AbCdEfGhIjKlMnOpQrStUvWx");
    let debug = format!("{:?}", key);
    assert!(!debug.contains("gsk_AbCd"));
}

#[test]
fn test_scrub_error_body() {
    let body = r#"{"error":{"message":"Invalid API Key gsk_AbCdEfGhIjKlMnOpQrStUvWx"}}"#;
    let scrubbed = scrub(body);
    assert!(!scrubbed.contains("gsk_AbCd"));
    assert!(scrubbed.contains("[REDACTED]"));
}
