//! Passphrase-based encryption of full vault exports.
//!
//! The envelope is self-contained: format version, Argon2id parameters,
//! salt, nonce, ciphertext, and tag, serialized as JSON in a `.pgvault`
//! file. Decryption needs only the envelope and the passphrase, and the
//! tag is verified before any plaintext leaves the codec.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::Path;

use argon2::{Algorithm, Argon2, Params, Version};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chacha20poly1305::{
    Key, XChaCha20Poly1305, XNonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::errors::{VaultError, VaultResult};
use super::models::VaultData;

/// Current envelope format version
pub const VAULT_VERSION: u32 = 1;

/// File extension used for exported vaults
pub const VAULT_FILE_EXTENSION: &str = "pgvault";

const KDF_MEMORY_COST: u32 = 65536; // 64 MiB
const KDF_TIME_COST: u32 = 3;
const KDF_PARALLELISM: u32 = 4;
const DERIVED_KEY_LEN: usize = 32;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 24;
const TAG_LEN: usize = 16;

/// Versioned, authenticated container for a vault export.
///
/// Binary fields are base64; KDF parameters ride along so future
/// releases can re-derive the key even after defaults change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultExportEnvelope {
    pub version: u32,
    pub kdf_memory_cost: u32,
    pub kdf_time_cost: u32,
    pub kdf_parallelism: u32,
    pub salt: String,
    pub nonce: String,
    pub ciphertext: String,
    pub tag: String,
}

/// Encrypt a vault under a passphrase.
///
/// A fresh salt and nonce are drawn on every call, so encrypting the
/// same vault twice with the same passphrase yields different envelopes.
///
/// # Errors
///
/// * `VaultError::EmptyPassphrase` - zero-length passphrase
/// * `VaultError::KeyDerivation` - Argon2 rejected its parameters
pub fn encrypt_vault_payload(
    vault: &VaultData,
    passphrase: &str,
) -> VaultResult<VaultExportEnvelope> {
    if passphrase.is_empty() {
        return Err(VaultError::EmptyPassphrase);
    }

    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    let key = derive_key(
        passphrase,
        &salt,
        KDF_MEMORY_COST,
        KDF_TIME_COST,
        KDF_PARALLELISM,
    )?;

    let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_ref()));
    let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);

    let plaintext = Zeroizing::new(serde_json::to_vec(vault)?);
    let mut sealed = cipher
        .encrypt(&nonce, plaintext.as_slice())
        .map_err(|_| VaultError::EncryptFailed)?;
    let tag = sealed.split_off(sealed.len() - TAG_LEN);

    Ok(VaultExportEnvelope {
        version: VAULT_VERSION,
        kdf_memory_cost: KDF_MEMORY_COST,
        kdf_time_cost: KDF_TIME_COST,
        kdf_parallelism: KDF_PARALLELISM,
        salt: STANDARD.encode(salt),
        nonce: STANDARD.encode(nonce),
        ciphertext: STANDARD.encode(sealed),
        tag: STANDARD.encode(tag),
    })
}

/// Decrypt a vault envelope with a passphrase.
///
/// # Errors
///
/// * `VaultError::UnsupportedVersion` - envelope from a newer format
/// * `VaultError::MalformedEnvelope` - a field fails to decode
/// * `VaultError::WrongPassphrase` - tag mismatch: wrong passphrase or a
///   corrupted file; nothing is returned in that case
pub fn decrypt_vault_payload(
    envelope: &VaultExportEnvelope,
    passphrase: &str,
) -> VaultResult<VaultData> {
    if passphrase.is_empty() {
        return Err(VaultError::EmptyPassphrase);
    }
    if envelope.version != VAULT_VERSION {
        return Err(VaultError::UnsupportedVersion(envelope.version));
    }

    let salt = decode_field(&envelope.salt, "salt")?;
    let nonce = decode_field(&envelope.nonce, "nonce")?;
    if nonce.len() != NONCE_LEN {
        return Err(VaultError::MalformedEnvelope("nonce"));
    }
    let ciphertext = decode_field(&envelope.ciphertext, "ciphertext")?;
    let tag = decode_field(&envelope.tag, "tag")?;
    if tag.len() != TAG_LEN {
        return Err(VaultError::MalformedEnvelope("tag"));
    }

    let key = derive_key(
        passphrase,
        &salt,
        envelope.kdf_memory_cost,
        envelope.kdf_time_cost,
        envelope.kdf_parallelism,
    )?;
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_ref()));

    let mut sealed = ciphertext;
    sealed.extend_from_slice(&tag);
    let plaintext = cipher
        .decrypt(XNonce::from_slice(&nonce), sealed.as_slice())
        .map_err(|_| VaultError::WrongPassphrase)?;
    let plaintext = Zeroizing::new(plaintext);

    Ok(serde_json::from_slice(&plaintext)?)
}

/// Write an encrypted export next to the given path as pretty JSON.
pub fn export_to_file<P: AsRef<Path>>(
    path: P,
    vault: &VaultData,
    passphrase: &str,
) -> VaultResult<()> {
    let envelope = encrypt_vault_payload(vault, passphrase)?;
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &envelope)?;
    writer.flush()?;
    Ok(())
}

/// Read and decrypt an exported vault file.
pub fn import_from_file<P: AsRef<Path>>(path: P, passphrase: &str) -> VaultResult<VaultData> {
    let reader = BufReader::new(File::open(path)?);
    let envelope: VaultExportEnvelope = serde_json::from_reader(reader)?;
    decrypt_vault_payload(&envelope, passphrase)
}

fn derive_key(
    passphrase: &str,
    salt: &[u8],
    memory_cost: u32,
    time_cost: u32,
    parallelism: u32,
) -> VaultResult<Zeroizing<[u8; DERIVED_KEY_LEN]>> {
    let params = Params::new(memory_cost, time_cost, parallelism, Some(DERIVED_KEY_LEN))
        .map_err(|e| VaultError::KeyDerivation(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; DERIVED_KEY_LEN]);
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, key.as_mut())
        .map_err(|e| VaultError::KeyDerivation(e.to_string()))?;
    Ok(key)
}

fn decode_field(value: &str, name: &'static str) -> VaultResult<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|_| VaultError::MalformedEnvelope(name))
}
