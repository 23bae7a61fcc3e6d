//! Authenticated encryption for single secret values stored at rest.
//!
//! Token layout (before base64): `[format byte | nonce | ciphertext + tag]`.
//! Format `0x01` is the legacy ChaCha20-Poly1305 token (12-byte nonce);
//! format `0x02` is the current XChaCha20-Poly1305 token (24-byte nonce).
//! New tokens are always written in the current format; `decrypt_any`
//! accepts both.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chacha20poly1305::{
    ChaCha20Poly1305, Key, Nonce, XChaCha20Poly1305, XNonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use zeroize::Zeroizing;

use super::errors::{CryptoError, CryptoResult};

const FORMAT_LEGACY: u8 = 0x01;
const FORMAT_CURRENT: u8 = 0x02;

const LEGACY_NONCE_LEN: usize = 12;
const CURRENT_NONCE_LEN: usize = 24;

/// Known storage token formats, resolved from the leading discriminator
/// byte rather than by sniffing string prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenFormat {
    Legacy,
    Current,
}

impl TokenFormat {
    fn from_discriminator(byte: u8) -> CryptoResult<Self> {
        match byte {
            FORMAT_LEGACY => Ok(TokenFormat::Legacy),
            FORMAT_CURRENT => Ok(TokenFormat::Current),
            other => Err(CryptoError::UnsupportedFormat(other)),
        }
    }
}

/// Symmetric cipher for secrets at rest. The key is injected at
/// construction and zeroized on drop.
pub struct StorageCipher {
    key: Zeroizing<[u8; 32]>,
}

impl StorageCipher {
    /// Create a cipher from a raw 32-byte key.
    pub fn new(key: [u8; 32]) -> Self {
        Self {
            key: Zeroizing::new(key),
        }
    }

    /// Create a cipher from a base64-encoded 32-byte key, as carried in
    /// configuration.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let raw = STANDARD
            .decode(encoded)
            .map_err(|_| CryptoError::MalformedToken)?;
        let key: [u8; 32] = raw
            .try_into()
            .map_err(|_| CryptoError::KeyDerivation("storage key must be 32 bytes".to_string()))?;
        Ok(Self::new(key))
    }

    /// Encrypt one secret value into a current-format token.
    ///
    /// Every call draws a fresh random nonce, so encrypting the same
    /// plaintext twice yields different tokens.
    pub fn encrypt_for_storage(&self, plain: &[u8]) -> CryptoResult<String> {
        let cipher = XChaCha20Poly1305::new(Key::from_slice(self.key.as_ref()));
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);

        let ciphertext = cipher
            .encrypt(&nonce, plain)
            .map_err(|_| CryptoError::EncryptFailed)?;

        let mut raw = Vec::with_capacity(1 + CURRENT_NONCE_LEN + ciphertext.len());
        raw.push(FORMAT_CURRENT);
        raw.extend_from_slice(&nonce);
        raw.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(raw))
    }

    /// Decrypt a token of any supported format.
    ///
    /// # Errors
    ///
    /// * `CryptoError::MalformedToken` - not base64, or truncated
    /// * `CryptoError::UnsupportedFormat` - unknown discriminator byte
    /// * `CryptoError::IntegrityFailure` - tag verification failed
    pub fn decrypt_any(&self, token: &str) -> CryptoResult<Zeroizing<Vec<u8>>> {
        let raw = STANDARD
            .decode(token)
            .map_err(|_| CryptoError::MalformedToken)?;
        let (&format_byte, rest) = raw.split_first().ok_or(CryptoError::MalformedToken)?;

        let plain = match TokenFormat::from_discriminator(format_byte)? {
            TokenFormat::Legacy => {
                if rest.len() < LEGACY_NONCE_LEN {
                    return Err(CryptoError::MalformedToken);
                }
                let (nonce, ciphertext) = rest.split_at(LEGACY_NONCE_LEN);
                let cipher = ChaCha20Poly1305::new(Key::from_slice(self.key.as_ref()));
                cipher
                    .decrypt(Nonce::from_slice(nonce), ciphertext)
                    .map_err(|_| CryptoError::IntegrityFailure)?
            }
            TokenFormat::Current => {
                if rest.len() < CURRENT_NONCE_LEN {
                    return Err(CryptoError::MalformedToken);
                }
                let (nonce, ciphertext) = rest.split_at(CURRENT_NONCE_LEN);
                let cipher = XChaCha20Poly1305::new(Key::from_slice(self.key.as_ref()));
                cipher
                    .decrypt(XNonce::from_slice(nonce), ciphertext)
                    .map_err(|_| CryptoError::IntegrityFailure)?
            }
        };

        Ok(Zeroizing::new(plain))
    }

    /// Decrypt a token and interpret the plaintext as UTF-8.
    pub fn decrypt_any_string(&self, token: &str) -> CryptoResult<String> {
        let plain = self.decrypt_any(token)?;
        String::from_utf8(plain.to_vec()).map_err(|_| CryptoError::MalformedToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cipher() -> StorageCipher {
        StorageCipher::new([7u8; 32])
    }

    /// Build a legacy-format token the way the previous release wrote them.
    fn legacy_token(key: &[u8; 32], plain: &[u8]) -> String {
        let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = cipher.encrypt(&nonce, plain).unwrap();

        let mut raw = vec![FORMAT_LEGACY];
        raw.extend_from_slice(&nonce);
        raw.extend_from_slice(&ciphertext);
        STANDARD.encode(raw)
    }

    #[test]
    fn current_format_roundtrip() {
        let cipher = test_cipher();
        let token = cipher.encrypt_for_storage(b"hunter2").unwrap();
        let plain = cipher.decrypt_any(&token).unwrap();
        assert_eq!(plain.as_slice(), b"hunter2");
    }

    #[test]
    fn legacy_format_still_decrypts() {
        let cipher = test_cipher();
        let token = legacy_token(&[7u8; 32], b"old secret");
        let plain = cipher.decrypt_any(&token).unwrap();
        assert_eq!(plain.as_slice(), b"old secret");
    }

    #[test]
    fn tokens_differ_between_calls() {
        let cipher = test_cipher();
        let a = cipher.encrypt_for_storage(b"same value").unwrap();
        let b = cipher.encrypt_for_storage(b"same value").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn unknown_discriminator_is_distinguishable() {
        let cipher = test_cipher();
        let raw = [0x09u8, 0, 1, 2, 3];
        let token = STANDARD.encode(raw);
        match cipher.decrypt_any(&token) {
            Err(CryptoError::UnsupportedFormat(0x09)) => {}
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn tampered_ciphertext_fails_closed() {
        let cipher = test_cipher();
        let token = cipher.encrypt_for_storage(b"secret").unwrap();
        let mut raw = STANDARD.decode(&token).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let tampered = STANDARD.encode(raw);
        match cipher.decrypt_any(&tampered) {
            Err(CryptoError::IntegrityFailure) => {}
            other => panic!("expected IntegrityFailure, got {other:?}"),
        }
    }

    #[test]
    fn wrong_key_fails_closed() {
        let token = test_cipher().encrypt_for_storage(b"secret").unwrap();
        let other = StorageCipher::new([8u8; 32]);
        assert!(matches!(
            other.decrypt_any(&token),
            Err(CryptoError::IntegrityFailure)
        ));
    }

    #[test]
    fn key_from_base64_roundtrips() {
        let encoded = STANDARD.encode([7u8; 32]);
        let cipher = StorageCipher::from_base64(&encoded).unwrap();
        let token = test_cipher().encrypt_for_storage(b"shared").unwrap();
        assert_eq!(cipher.decrypt_any(&token).unwrap().as_slice(), b"shared");

        let short = STANDARD.encode([7u8; 16]);
        assert!(matches!(
            StorageCipher::from_base64(&short),
            Err(CryptoError::KeyDerivation(_))
        ));
    }

    #[test]
    fn truncated_token_is_malformed() {
        let cipher = test_cipher();
        assert!(matches!(
            cipher.decrypt_any("AQ=="),
            Err(CryptoError::MalformedToken)
        ));
        assert!(matches!(
            cipher.decrypt_any("not base64!!"),
            Err(CryptoError::MalformedToken)
        ));
    }
}
