use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{generic_array::GenericArray, Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql};
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Binary;
use diesel::{AsExpression, FromSqlRow};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::vault_errors::{Result, VaultError};

pub const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// Sealed container for a sensitive value: random nonce followed by the
/// AES-256-GCM ciphertext and authentication tag. Only a `CredentialVault`
/// holding the sealing key can open it.
///
/// An empty blob is a valid sentinel for "no value" and is never opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Binary)]
#[serde(transparent)]
pub struct EncryptedBlob(Vec<u8>);

impl EncryptedBlob {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        EncryptedBlob(bytes)
    }

    pub fn empty() -> Self {
        EncryptedBlob(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl<DB> ToSql<Binary, DB> for EncryptedBlob
where
    DB: Backend,
    Vec<u8>: ToSql<Binary, DB>,
{
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, DB>) -> serialize::Result {
        <Vec<u8> as ToSql<Binary, DB>>::to_sql(&self.0, out)
    }
}

impl<DB> FromSql<Binary, DB> for EncryptedBlob
where
    DB: Backend,
    Vec<u8>: FromSql<Binary, DB>,
{
    fn from_sql(bytes: DB::RawValue<'_>) -> deserialize::Result<Self> {
        Ok(EncryptedBlob(Vec::<u8>::from_sql(bytes)?))
    }
}

/// Authenticated symmetric encryption for everything persisted by the core.
///
/// The vault is constructed with an explicit key so tests can inject
/// ephemeral keys; production code loads the process-wide key through
/// `key_store::load_or_create`.
pub struct CredentialVault {
    cipher: Aes256Gcm,
}

impl CredentialVault {
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        CredentialVault {
            cipher: Aes256Gcm::new(GenericArray::from_slice(key)),
        }
    }

    pub fn generate_key() -> [u8; KEY_LEN] {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        key
    }

    pub fn seal(&self, plaintext: &[u8]) -> Result<EncryptedBlob> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| VaultError::Encryption(e.to_string()))?;

        let mut sealed = nonce_bytes.to_vec();
        sealed.extend(ciphertext);
        Ok(EncryptedBlob(sealed))
    }

    /// Opens a sealed blob. Fails with `VaultError::Decryption` when the blob
    /// was sealed under a different key, truncated, or tampered with; callers
    /// treat that as data corruption and skip the record rather than retry.
    pub fn open(&self, blob: &EncryptedBlob) -> Result<Vec<u8>> {
        if blob.0.len() < NONCE_LEN {
            return Err(VaultError::Decryption("ciphertext too short".to_string()));
        }

        let (nonce_bytes, ciphertext) = blob.0.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        self.cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| VaultError::Decryption(e.to_string()))
    }

    pub fn seal_json<T: Serialize>(&self, value: &T) -> Result<EncryptedBlob> {
        let plaintext = serde_json::to_vec(value)?;
        self.seal(&plaintext)
    }

    pub fn open_json<T: DeserializeOwned>(&self, blob: &EncryptedBlob) -> Result<T> {
        let plaintext = self.open(blob)?;
        Ok(serde_json::from_slice(&plaintext)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault() -> CredentialVault {
        CredentialVault::new(&CredentialVault::generate_key())
    }

    #[test]
    fn seal_open_round_trip() {
        let vault = vault();
        let plaintext = b"correct horse battery staple";

        let blob = vault.seal(plaintext).unwrap();
        assert_ne!(blob.as_bytes(), plaintext.as_slice());

        let opened = vault.open(&blob).unwrap();
        assert_eq!(opened, plaintext);
    }

    #[test]
    fn open_with_different_key_fails() {
        let blob = vault().seal(b"secret").unwrap();
        let other = vault();

        assert!(matches!(other.open(&blob), Err(VaultError::Decryption(_))));
    }

    #[test]
    fn open_tampered_blob_fails() {
        let vault = vault();
        let blob = vault.seal(b"secret").unwrap();

        let mut bytes = blob.as_bytes().to_vec();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;

        let tampered = EncryptedBlob::from_bytes(bytes);
        assert!(matches!(
            vault.open(&tampered),
            Err(VaultError::Decryption(_))
        ));
    }

    #[test]
    fn open_truncated_blob_fails() {
        let vault = vault();
        let truncated = EncryptedBlob::from_bytes(vec![0u8; 5]);

        assert!(matches!(
            vault.open(&truncated),
            Err(VaultError::Decryption(_))
        ));
    }

    #[test]
    fn seal_json_round_trip() {
        let vault = vault();
        let value = serde_json::json!({"client_id": "abc", "secret": "xyz"});

        let blob = vault.seal_json(&value).unwrap();
        let opened: serde_json::Value = vault.open_json(&blob).unwrap();
        assert_eq!(opened, value);
    }

    #[test]
    fn empty_blob_is_sentinel() {
        assert!(EncryptedBlob::empty().is_empty());
        assert!(!vault().seal(b"").unwrap().is_empty());
    }
}
