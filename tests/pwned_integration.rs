//! Integration tests for the k-anonymity breach lookup.
//!
//! The range endpoint is mocked; the interesting assertions are the
//! privacy invariant (only the 5-character prefix reaches the wire) and
//! the best-effort failure handling.

use std::time::Duration;

use password_guardian::security::{PwnedClient, PwnedConfig};
use sha1::{Digest, Sha1};

const TIMEOUT: Duration = Duration::from_secs(2);

fn digest_parts(password: &str) -> (String, String) {
    let digest = hex::encode_upper(Sha1::digest(password.as_bytes()));
    let (prefix, suffix) = digest.split_at(5);
    (prefix.to_string(), suffix.to_string())
}

fn client_for(server: &mockito::ServerGuard) -> PwnedClient {
    PwnedClient::new(PwnedConfig {
        base_url: server.url(),
        timeout: TIMEOUT,
    })
}

#[tokio::test]
async fn compromised_password_is_found_with_its_count() {
    let mut server = mockito::Server::new_async().await;
    let (prefix, suffix) = digest_parts("password");

    // The mock only matches the prefix path: a request carrying the full
    // digest or the plaintext would never hit it.
    let mock = server
        .mock("GET", format!("/range/{prefix}").as_str())
        .with_status(200)
        .with_body(format!(
            "0018A45C4D1DEF81644B54AB7F969B88D65:3\n{suffix}:12345\nABCDEF1234:2\n"
        ))
        .create_async()
        .await;

    let (compromised, count) = client_for(&server).check("password", TIMEOUT).await;
    assert!(compromised);
    assert_eq!(count, 12345);
    mock.assert_async().await;
}

#[tokio::test]
async fn clean_password_reports_not_compromised() {
    let mut server = mockito::Server::new_async().await;
    let (prefix, _) = digest_parts("Tr;v0se-Lampe!42");

    let mock = server
        .mock("GET", format!("/range/{prefix}").as_str())
        .with_status(200)
        .with_body("0018A45C4D1DEF81644B54AB7F969B88D65:3\n")
        .create_async()
        .await;

    let (compromised, count) = client_for(&server).check("Tr;v0se-Lampe!42", TIMEOUT).await;
    assert!(!compromised);
    assert_eq!(count, 0);
    mock.assert_async().await;
}

#[tokio::test]
async fn non_200_resolves_to_not_compromised() {
    let mut server = mockito::Server::new_async().await;
    let (prefix, _) = digest_parts("StrongPass123!");

    server
        .mock("GET", format!("/range/{prefix}").as_str())
        .with_status(503)
        .with_body("")
        .create_async()
        .await;

    let (compromised, count) = client_for(&server).check("StrongPass123!", TIMEOUT).await;
    assert!(!compromised);
    assert_eq!(count, 0);
}

#[tokio::test]
async fn malformed_lines_are_skipped_not_fatal() {
    let mut server = mockito::Server::new_async().await;
    let (prefix, _) = digest_parts("StrongPass123!");

    server
        .mock("GET", format!("/range/{prefix}").as_str())
        .with_status(200)
        .with_body("NO_COLON_LINE\nBAD:COUNT:EXTRA\n")
        .create_async()
        .await;

    let (compromised, count) = client_for(&server).check("StrongPass123!", TIMEOUT).await;
    assert!(!compromised);
    assert_eq!(count, 0);
}

#[tokio::test]
async fn unreachable_endpoint_resolves_to_not_compromised() {
    // Nothing listens on this port; the lookup must degrade, not error.
    let client = PwnedClient::new(PwnedConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout: Duration::from_millis(200),
    });

    let (compromised, count) = client.check("password", Duration::from_millis(200)).await;
    assert!(!compromised);
    assert_eq!(count, 0);
}
