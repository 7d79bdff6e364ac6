//! Encrypted watch-list persistence.
//!
//! The data file holds everything needed to move coins automatically,
//! private keys included, so it is never written in the clear. Format:
//!
//! ```text
//! salt (32 bytes) || nonce (12 bytes) || ciphertext + auth_tag
//! ```
//!
//! AES-256-GCM under a BLAKE3 password-derived key.

use std::path::PathBuf;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use anyhow::{anyhow, bail, Context, Result};
use tokio::fs;
use tracing::{debug, info};

use crate::types::WatchList;

const KDF_CONTEXT: &str = "coinsweeper-data-file-kdf-v1";

const SALT_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// Smallest possible payload: salt + nonce + auth tag.
const MIN_ENCRYPTED_LEN: usize = SALT_LEN + NONCE_LEN + 16;

fn derive_key(passphrase: &[u8], salt: &[u8]) -> [u8; 32] {
    let mut ikm = Vec::with_capacity(passphrase.len() + salt.len());
    ikm.extend_from_slice(passphrase);
    ikm.extend_from_slice(salt);
    blake3::derive_key(KDF_CONTEXT, &ikm)
}

fn encrypt(plaintext: &[u8], passphrase: &[u8]) -> Result<Vec<u8>> {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);

    let key = derive_key(passphrase, &salt);
    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|e| anyhow!("cipher setup: {e}"))?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| anyhow!("encryption failed: {e}"))?;

    let mut result = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    result.extend_from_slice(&salt);
    result.extend_from_slice(&nonce_bytes);
    result.extend_from_slice(&ciphertext);
    Ok(result)
}

fn decrypt(encrypted: &[u8], passphrase: &[u8]) -> Result<Vec<u8>> {
    if encrypted.len() < MIN_ENCRYPTED_LEN {
        bail!(
            "data file too short to be valid: {} < {MIN_ENCRYPTED_LEN}",
            encrypted.len()
        );
    }

    let salt = &encrypted[..SALT_LEN];
    let nonce_bytes = &encrypted[SALT_LEN..SALT_LEN + NONCE_LEN];
    let ciphertext = &encrypted[SALT_LEN + NONCE_LEN..];

    let key = derive_key(passphrase, salt);
    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|e| anyhow!("cipher setup: {e}"))?;
    let nonce = Nonce::from_slice(nonce_bytes);

    // GCM authenticates, so a wrong passphrase and a tampered file are
    // indistinguishable here.
    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| anyhow!("wrong passphrase or corrupted data file"))
}

/// Loads and saves the encrypted watch list.
pub struct SweepStore {
    path: PathBuf,
    passphrase: Vec<u8>,
}

impl SweepStore {
    pub fn new(path: PathBuf, passphrase: &str) -> Self {
        Self {
            path,
            passphrase: passphrase.as_bytes().to_vec(),
        }
    }

    /// Load the watch list, or start an empty one if the file is missing.
    pub async fn load(&self) -> Result<WatchList> {
        if !self.path.exists() {
            info!("no data file at {}, starting a new watch list", self.path.display());
            return Ok(WatchList::default());
        }

        let encrypted = fs::read(&self.path)
            .await
            .context("failed to read data file")?;
        let plaintext = decrypt(&encrypted, &self.passphrase)?;
        serde_json::from_slice(&plaintext).context("failed to parse data file")
    }

    /// Encrypt and persist the watch list atomically (temp file, fsync,
    /// rename), so a crash mid-save never clobbers the previous file.
    pub async fn save(&self, list: &WatchList) -> Result<()> {
        let plaintext = serde_json::to_vec_pretty(list).context("failed to serialize watch list")?;
        let encrypted = encrypt(&plaintext, &self.passphrase)?;

        let temp_path = self.path.with_extension("dat.tmp");
        fs::write(&temp_path, &encrypted)
            .await
            .context("failed to write temporary data file")?;

        let file = fs::File::open(&temp_path).await?;
        file.sync_all().await.context("failed to fsync data file")?;

        fs::rename(&temp_path, &self.path)
            .await
            .context("failed to rename data file")?;

        debug!("watch list persisted to {}", self.path.display());
        Ok(())
    }
}
