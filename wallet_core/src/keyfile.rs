//! Password-protected key file for the local key holder.
//!
//! The Ed25519 secret is encrypted with AES-256-GCM under a key derived
//! from the password with Argon2id. Salt, nonce and KDF parameters are
//! stored alongside the ciphertext; the public key is stored in the clear
//! so the address can be shown without unlocking.

use std::path::Path;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use daovote_types::{KeyPair, PrivateKey, PublicKey};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::KeyFileError;

pub const KEY_FILE_VERSION: u32 = 1;

const SALT_LEN: usize = 32;
/// 96-bit AES-GCM nonce.
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyFile {
    pub version: u32,
    /// Hex-encoded Ed25519 public key.
    pub public_key: String,
    pub crypto: KeyFileCrypto,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyFileCrypto {
    pub cipher: String,
    pub kdf: String,
    pub kdf_params: KdfParams,
    pub salt: String,
    pub nonce: String,
    pub ciphertext: String,
}

/// Argon2id cost parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory in KiB.
    pub memory: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        // 64 MiB, 3 passes
        Self {
            memory: 65_536,
            iterations: 3,
            parallelism: 1,
        }
    }
}

impl KeyFile {
    /// Encrypt `keypair` under `password` with the default KDF cost.
    pub fn encrypt(keypair: &KeyPair, password: &str) -> Result<Self, KeyFileError> {
        Self::encrypt_with(keypair, password, KdfParams::default())
    }

    pub fn encrypt_with(
        keypair: &KeyPair,
        password: &str,
        params: KdfParams,
    ) -> Result<Self, KeyFileError> {
        let mut rng = rand::thread_rng();
        let mut salt = [0u8; SALT_LEN];
        rng.fill_bytes(&mut salt);
        let mut nonce = [0u8; NONCE_LEN];
        rng.fill_bytes(&mut nonce);

        let key = derive_key(password, &salt, params)?;
        let cipher = Aes256Gcm::new_from_slice(key.as_slice())
            .map_err(|e| KeyFileError::Invalid(format!("cipher key: {e}")))?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), keypair.private.0.as_slice())
            .map_err(|_| KeyFileError::Invalid("encryption failed".into()))?;

        Ok(Self {
            version: KEY_FILE_VERSION,
            public_key: hex::encode(keypair.public.0),
            crypto: KeyFileCrypto {
                cipher: "aes-256-gcm".into(),
                kdf: "argon2id".into(),
                kdf_params: params,
                salt: hex::encode(salt),
                nonce: hex::encode(nonce),
                ciphertext: hex::encode(ciphertext),
            },
        })
    }

    pub fn public_key(&self) -> Result<PublicKey, KeyFileError> {
        let bytes = decode_field("public_key", &self.public_key)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyFileError::Invalid(format!("public key is {} bytes", bytes.len())))?;
        Ok(PublicKey(arr))
    }

    /// Decrypt the secret key. The result is checked against the stored
    /// public key.
    pub fn decrypt(&self, password: &str) -> Result<KeyPair, KeyFileError> {
        if self.version != KEY_FILE_VERSION {
            return Err(KeyFileError::UnsupportedVersion(self.version));
        }
        let salt = decode_field("salt", &self.crypto.salt)?;
        let nonce = decode_field("nonce", &self.crypto.nonce)?;
        let ciphertext = decode_field("ciphertext", &self.crypto.ciphertext)?;
        if nonce.len() != NONCE_LEN {
            return Err(KeyFileError::Invalid(format!(
                "nonce is {} bytes, expected {NONCE_LEN}",
                nonce.len()
            )));
        }

        let key = derive_key(password, &salt, self.crypto.kdf_params)?;
        let cipher = Aes256Gcm::new_from_slice(key.as_slice())
            .map_err(|e| KeyFileError::Invalid(format!("cipher key: {e}")))?;
        let plaintext = Zeroizing::new(
            cipher
                .decrypt(Nonce::from_slice(&nonce), ciphertext.as_slice())
                .map_err(|_| KeyFileError::Decrypt)?,
        );
        let secret: [u8; 32] = plaintext
            .as_slice()
            .try_into()
            .map_err(|_| KeyFileError::Invalid(format!("secret is {} bytes", plaintext.len())))?;

        let keypair = daovote_crypto::keypair_from_private(PrivateKey(secret));
        if keypair.public != self.public_key()? {
            return Err(KeyFileError::Invalid("public key does not match secret".into()));
        }
        Ok(keypair)
    }

    pub fn save(&self, path: &Path) -> Result<(), KeyFileError> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, KeyFileError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

fn decode_field(name: &str, value: &str) -> Result<Vec<u8>, KeyFileError> {
    hex::decode(value).map_err(|e| KeyFileError::Invalid(format!("{name}: {e}")))
}

fn derive_key(
    password: &str,
    salt: &[u8],
    params: KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>, KeyFileError> {
    let params = Params::new(params.memory, params.iterations, params.parallelism, Some(KEY_LEN))
        .map_err(|e| KeyFileError::Invalid(format!("kdf params: {e}")))?;
    let mut out = Zeroizing::new([0u8; KEY_LEN]);
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password_into(password.as_bytes(), salt, out.as_mut_slice())
        .map_err(|e| KeyFileError::Invalid(format!("kdf: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use daovote_crypto::keypair_from_seed;

    const CHEAP: KdfParams = KdfParams {
        memory: 64,
        iterations: 1,
        parallelism: 1,
    };

    #[test]
    fn decrypts_with_right_password() {
        let keypair = keypair_from_seed(&[42; 32]);
        let file = KeyFile::encrypt_with(&keypair, "hunter2", CHEAP).unwrap();
        let back = file.decrypt("hunter2").unwrap();
        assert_eq!(back.public, keypair.public);
        assert_eq!(back.private.0, keypair.private.0);
    }

    #[test]
    fn wrong_password_fails() {
        let file = KeyFile::encrypt_with(&keypair_from_seed(&[1; 32]), "right", CHEAP).unwrap();
        assert!(matches!(file.decrypt("wrong"), Err(KeyFileError::Decrypt)));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let mut file = KeyFile::encrypt_with(&keypair_from_seed(&[1; 32]), "pw", CHEAP).unwrap();
        let mut bytes = hex::decode(&file.crypto.ciphertext).unwrap();
        bytes[0] ^= 1;
        file.crypto.ciphertext = hex::encode(bytes);
        assert!(matches!(file.decrypt("pw"), Err(KeyFileError::Decrypt)));
    }

    #[test]
    fn public_key_readable_without_password() {
        let keypair = keypair_from_seed(&[9; 32]);
        let file = KeyFile::encrypt_with(&keypair, "pw", CHEAP).unwrap();
        assert_eq!(file.public_key().unwrap(), keypair.public);
        assert_eq!(file.crypto.kdf, "argon2id");
    }

    #[test]
    fn unsupported_version_rejected() {
        let mut file = KeyFile::encrypt_with(&keypair_from_seed(&[1; 32]), "pw", CHEAP).unwrap();
        file.version = 7;
        assert!(matches!(file.decrypt("pw"), Err(KeyFileError::UnsupportedVersion(7))));
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.json");
        let keypair = keypair_from_seed(&[3; 32]);
        KeyFile::encrypt_with(&keypair, "pw", CHEAP)
            .unwrap()
            .save(&path)
            .unwrap();

        let loaded = KeyFile::load(&path).unwrap();
        assert_eq!(loaded.decrypt("pw").unwrap().public, keypair.public);
        assert!(KeyFile::load(&dir.path().join("missing.json")).is_err());
    }
}
