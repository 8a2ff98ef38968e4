pub mod encryption;
pub mod key_store;
pub mod vault_errors;

pub use encryption::{CredentialVault, EncryptedBlob, KEY_LEN};
pub use key_store::{default_key_path, load_or_create};
pub use vault_errors::VaultError;
