//! Vault export codec: passphrase-encrypted, portable credential sets.
//!
//! Exports are independent of the account password: the key is derived
//! from a passphrase chosen at export time with a memory-hard KDF, and
//! the result is a single self-contained `.pgvault` file that any future
//! version of the codec can open.

pub mod codec;
pub mod errors;
pub mod models;

pub use codec::{
    VAULT_FILE_EXTENSION, VAULT_VERSION, VaultExportEnvelope, decrypt_vault_payload,
    encrypt_vault_payload, export_to_file, import_from_file,
};
pub use errors::{VaultError, VaultResult};
pub use models::{VaultData, VaultEntry};
