//! Secret key material and key persistence.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Opaque 128-bit key material for the symmetric schemes.
///
/// The raw bytes never appear in ciphertexts; engines only see the normalized
/// seed derived by [`MaskGenerator`](crate::mask::MaskGenerator).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKey([u8; 16]);

impl SecretKey {
    /// Draw fresh key material from `rng`.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 16];
        rng.fill(&mut bytes[..]);
        Self(bytes)
    }

    /// Wrap existing key material.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// Where engines read and write their key material.
pub trait KeyStore {
    /// Whether the store currently holds a key.
    fn exists(&self) -> bool;
    /// Read the stored key; [`Error::MissingKey`] when absent.
    fn load(&self) -> Result<SecretKey>;
    /// Persist `key`, replacing any previous content.
    fn save(&self, key: &SecretKey) -> Result<()>;
}

/// File-backed key store (bincode-encoded key file).
pub struct FsKeyStore {
    path: PathBuf,
}

impl FsKeyStore {
    /// Store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyStore for FsKeyStore {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn load(&self) -> Result<SecretKey> {
        if !self.exists() {
            return Err(Error::MissingKey(self.path.clone()));
        }
        let bytes = fs::read(&self.path)?;
        Ok(bincode::deserialize(&bytes)?)
    }

    fn save(&self, key: &SecretKey) -> Result<()> {
        fs::write(&self.path, bincode::serialize(key)?)?;
        Ok(())
    }
}

/// Load the key held by `store`, generating and persisting fresh material
/// when the store is empty.
pub fn load_or_generate<S: KeyStore, R: Rng>(store: &S, rng: &mut R) -> Result<SecretKey> {
    if store.exists() {
        store.load()
    } else {
        let key = SecretKey::generate(rng);
        store.save(&key)?;
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn temp_store(tag: &str) -> FsKeyStore {
        let path = std::env::temp_dir().join(format!("symphe-{}-{}.key", tag, std::process::id()));
        let _ = fs::remove_file(&path);
        FsKeyStore::new(path)
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = temp_store("roundtrip");
        let key = SecretKey::generate(&mut ChaCha20Rng::seed_from_u64(1));
        store.save(&key).unwrap();
        assert!(store.exists());
        assert_eq!(store.load().unwrap(), key);
        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn load_of_a_missing_key_fails() {
        let store = temp_store("missing");
        assert!(!store.exists());
        assert!(matches!(store.load(), Err(Error::MissingKey(_))));
    }

    #[test]
    fn load_or_generate_persists_once() {
        let store = temp_store("generate");
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let first = load_or_generate(&store, &mut rng).unwrap();
        let second = load_or_generate(&store, &mut rng).unwrap();
        assert_eq!(first, second);
        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn debug_never_prints_key_bytes() {
        let key = SecretKey::from_bytes([0xAB; 16]);
        let shown = format!("{:?}", key);
        assert!(!shown.contains("171") && !shown.to_lowercase().contains("ab"));
    }
}
