//! k-anonymity breach lookup against a Have I Been Pwned range endpoint.
//!
//! Only the first five hex characters of the password's SHA-1 digest ever
//! leave the process; the returned `SUFFIX:COUNT` lines are scanned
//! locally for the remaining 35 characters. The check is best-effort:
//! any transport failure resolves to "not compromised" so it can never
//! block an account operation.

use std::time::Duration;

use log::{debug, warn};
use sha1::{Digest, Sha1};

/// Configuration for the breach-lookup client
#[derive(Debug, Clone)]
pub struct PwnedConfig {
    /// Range-query endpoint base URL
    pub base_url: String,

    /// Default timeout applied when the caller does not pass one
    pub timeout: Duration,
}

impl PwnedConfig {
    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `PWNED_BASE_URL`: endpoint base (default: `https://api.pwnedpasswords.com`)
    /// - `PWNED_TIMEOUT_SECS`: request timeout in seconds (default: 5)
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("PWNED_BASE_URL")
                .unwrap_or_else(|_| "https://api.pwnedpasswords.com".to_string()),
            timeout: Duration::from_secs(
                std::env::var("PWNED_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
            ),
        }
    }
}

impl Default for PwnedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.pwnedpasswords.com".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Client for the k-anonymity range API
pub struct PwnedClient {
    http: reqwest::Client,
    config: PwnedConfig,
}

impl PwnedClient {
    /// Create a new client
    pub fn new(config: PwnedConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Check whether a password appears in the breach corpus.
    ///
    /// # Arguments
    ///
    /// * `password` - Plaintext candidate; never transmitted
    /// * `timeout` - Hard cap on the round trip
    ///
    /// # Returns
    ///
    /// * `(bool, u64)` - `(compromised, occurrence count)`. Non-200
    ///   responses, network failures, and timeouts all resolve to
    ///   `(false, 0)`; this method never returns an error.
    pub async fn check(&self, password: &str, timeout: Duration) -> (bool, u64) {
        let digest = hex::encode_upper(Sha1::digest(password.as_bytes()));
        let (prefix, suffix) = digest.split_at(5);
        let url = format!("{}/range/{}", self.config.base_url, prefix);

        let response = match self.http.get(&url).timeout(timeout).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!("Breach lookup unavailable: {err}");
                return (false, 0);
            }
        };

        if !response.status().is_success() {
            warn!("Breach lookup returned status {}", response.status());
            return (false, 0);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                warn!("Breach lookup body unreadable: {err}");
                return (false, 0);
            }
        };

        Self::scan_range(&body, suffix)
    }

    /// Check with the configured default timeout.
    pub async fn check_default(&self, password: &str) -> (bool, u64) {
        self.check(password, self.config.timeout).await
    }

    /// Scan `SUFFIX:COUNT` lines for an exact suffix match. Malformed
    /// lines (missing separator, extra fields, unparsable count) are
    /// skipped rather than treated as fatal.
    fn scan_range(body: &str, suffix: &str) -> (bool, u64) {
        for line in body.lines() {
            let mut fields = line.trim().split(':');
            let (Some(candidate), Some(count), None) = (fields.next(), fields.next(), fields.next())
            else {
                debug!("Skipping malformed breach range line");
                continue;
            };

            if candidate.eq_ignore_ascii_case(suffix) {
                let count = count.trim().parse().unwrap_or(0);
                return (true, count);
            }
        }
        (false, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_finds_matching_suffix() {
        let digest = hex::encode_upper(Sha1::digest(b"password"));
        let suffix = &digest[5..];
        let body = format!("{suffix}:12345\nABCDEF1234567890ABCDEF1234567890ABC:2\n");
        assert_eq!(PwnedClient::scan_range(&body, suffix), (true, 12345));
    }

    #[test]
    fn scan_is_case_insensitive() {
        let body = "aabbcc:7";
        assert_eq!(PwnedClient::scan_range(body, "AABBCC"), (true, 7));
    }

    #[test]
    fn scan_skips_malformed_lines() {
        let body = "NO_COLON_LINE\nBAD:COUNT:EXTRA\n";
        assert_eq!(PwnedClient::scan_range(body, "AABBCC"), (false, 0));
    }

    #[test]
    fn scan_handles_unparsable_count() {
        let body = "AABBCC:not-a-number";
        assert_eq!(PwnedClient::scan_range(body, "AABBCC"), (true, 0));
    }
}
