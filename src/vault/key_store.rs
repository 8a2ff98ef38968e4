use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use super::encryption::{CredentialVault, KEY_LEN};
use super::vault_errors::{Result, VaultError};

/// Default location of the process-wide encryption key.
pub fn default_key_path(app_data_dir: &str) -> PathBuf {
    Path::new(app_data_dir).join("finvault.key")
}

/// Loads the symmetric key from `path`, generating and persisting a fresh one
/// on first run. Every subsequent process load reuses the same key; losing the
/// key file renders all sealed data permanently unrecoverable.
pub fn load_or_create(path: &Path) -> Result<[u8; KEY_LEN]> {
    if path.exists() {
        let bytes = fs::read(path)?;
        if bytes.len() != KEY_LEN {
            return Err(VaultError::KeyStore(format!(
                "key file {} has invalid length {}",
                path.display(),
                bytes.len()
            )));
        }
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&bytes);
        return Ok(key);
    }

    if let Some(dir) = path.parent() {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }

    let key = CredentialVault::generate_key();
    fs::write(path, key)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    info!("Generated new encryption key at {}", path.display());
    Ok(key)
}
