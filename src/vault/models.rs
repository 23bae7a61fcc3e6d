//! Vault export payload models.

use serde::{Deserialize, Serialize};

/// Full exportable credential set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultData {
    pub passwords: Vec<VaultEntry>,
}

/// One stored credential as it appears in an export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultEntry {
    pub site_name: String,
    #[serde(default)]
    pub site_url: String,
    #[serde(default)]
    pub site_icon: String,
    pub username: String,
    /// Storage token as produced by the crypto module; exports never
    /// carry site passwords in the clear
    pub encrypted_password: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub strength: String,
    #[serde(default)]
    pub favorite: bool,
}
