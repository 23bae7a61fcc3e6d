//! Integration tests for the vault export codec: file round trips and
//! property checks over arbitrary vault contents.

use password_guardian::vault::{
    VAULT_FILE_EXTENSION, VaultData, VaultEntry, VaultError, decrypt_vault_payload,
    encrypt_vault_payload, export_to_file, import_from_file,
};
use proptest::prelude::*;

fn sample_vault() -> VaultData {
    VaultData {
        passwords: vec![
            VaultEntry {
                site_name: "example.com".to_string(),
                site_url: "https://example.com".to_string(),
                site_icon: "🔒".to_string(),
                username: "owner".to_string(),
                encrypted_password: "AtBASE64TOKEN".to_string(),
                category: "personal".to_string(),
                strength: "strong".to_string(),
                favorite: true,
            },
            VaultEntry {
                site_name: "bank".to_string(),
                username: "owner2".to_string(),
                encrypted_password: "AtOTHERTOKEN".to_string(),
                ..Default::default()
            },
        ],
    }
}

#[test]
fn file_export_then_import_restores_the_vault() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir
        .path()
        .join("backup")
        .with_extension(VAULT_FILE_EXTENSION);

    let vault = sample_vault();
    export_to_file(&path, &vault, "porte-bleue 7!").unwrap();

    // The file on disk is a JSON envelope, never plaintext.
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"version\""));
    assert!(!raw.contains("example.com"));
    assert!(!raw.contains("AtBASE64TOKEN"));

    let restored = import_from_file(&path, "porte-bleue 7!").unwrap();
    assert_eq!(restored, vault);
}

#[test]
fn file_import_with_wrong_passphrase_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("backup.pgvault");

    export_to_file(&path, &sample_vault(), "right").unwrap();
    let result = import_from_file(&path, "wrong");
    assert!(matches!(result, Err(VaultError::WrongPassphrase)));
}

#[test]
fn missing_file_surfaces_io_error() {
    let result = import_from_file("/nonexistent/place/backup.pgvault", "pass");
    assert!(matches!(result, Err(VaultError::Io(_))));
}

fn entry_strategy() -> impl Strategy<Value = VaultEntry> {
    (
        "[a-zA-Z0-9 ._-]{1,24}",
        "[a-zA-Z0-9@._-]{1,24}",
        "[A-Za-z0-9+/=]{0,64}",
        any::<bool>(),
    )
        .prop_map(|(site_name, username, encrypted_password, favorite)| VaultEntry {
            site_name,
            username,
            encrypted_password,
            favorite,
            ..Default::default()
        })
}

proptest! {
    // Argon2id at export parameters is deliberately slow; a handful of
    // cases is plenty to exercise the law.
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn roundtrip_law_holds_for_arbitrary_vaults(
        entries in prop::collection::vec(entry_strategy(), 0..4),
        passphrase in "[ -~]{1,32}",
    ) {
        let vault = VaultData { passwords: entries };
        let envelope = encrypt_vault_payload(&vault, &passphrase).unwrap();
        let restored = decrypt_vault_payload(&envelope, &passphrase).unwrap();
        prop_assert_eq!(restored, vault);
    }

    #[test]
    fn distinct_passphrases_never_decrypt(
        passphrase in "[a-z]{4,16}",
        other in "[A-Z]{4,16}",
    ) {
        let envelope = encrypt_vault_payload(&sample_vault(), &passphrase).unwrap();
        let result = decrypt_vault_payload(&envelope, &other);
        prop_assert!(matches!(result, Err(VaultError::WrongPassphrase)));
    }
}
