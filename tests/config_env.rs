//! Environment-driven configuration tests.
//!
//! These mutate process-global environment variables, so they are
//! serialized.

use std::time::Duration;

use password_guardian::auth::TwoFactorConfig;
use password_guardian::security::PwnedConfig;
use serial_test::serial;

#[test]
#[serial]
fn pwned_config_reads_env_overrides() {
    unsafe {
        std::env::set_var("PWNED_BASE_URL", "http://localhost:8099");
        std::env::set_var("PWNED_TIMEOUT_SECS", "2");
    }
    let config = PwnedConfig::from_env();
    assert_eq!(config.base_url, "http://localhost:8099");
    assert_eq!(config.timeout, Duration::from_secs(2));

    unsafe {
        std::env::remove_var("PWNED_BASE_URL");
        std::env::remove_var("PWNED_TIMEOUT_SECS");
    }
    let config = PwnedConfig::from_env();
    assert_eq!(config.base_url, "https://api.pwnedpasswords.com");
    assert_eq!(config.timeout, Duration::from_secs(5));
}

#[test]
#[serial]
fn two_factor_config_reads_env_overrides() {
    unsafe {
        std::env::set_var("TWO_FACTOR_CODE_TTL_SECS", "120");
        std::env::set_var("TWO_FACTOR_ISSUER", "Guardian Test");
    }
    let config = TwoFactorConfig::from_env();
    assert_eq!(config.code_ttl, chrono::Duration::seconds(120));
    assert_eq!(config.issuer, "Guardian Test");

    unsafe {
        std::env::remove_var("TWO_FACTOR_CODE_TTL_SECS");
        std::env::remove_var("TWO_FACTOR_ISSUER");
    }
    let config = TwoFactorConfig::from_env();
    assert_eq!(config.code_ttl, chrono::Duration::seconds(600));
    assert_eq!(config.issuer, "Password Guardian");
}
