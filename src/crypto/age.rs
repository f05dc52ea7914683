//! Age encryption for diary entries.
//!
//! Entries are encrypted to an x25519 recipient (`age1...`) and decrypted with
//! the identities listed in the configured identity file, the same format
//! `age-keygen` writes.

use crate::crypto::CryptoEngine;
use crate::errors::{AppResult, CryptoError};
use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;
use zeroize::Zeroizing;

const ENGINE_NAME: &str = "age";

/// Native age engine.
///
/// # Example
///
/// ```
/// use deary::crypto::{AgeEngine, CryptoEngine};
/// use age::secrecy::ExposeSecret;
///
/// let identity = age::x25519::Identity::generate();
/// let recipient = identity.to_public().to_string();
///
/// let dir = tempfile::tempdir()?;
/// let identity_path = dir.path().join("identity.txt");
/// std::fs::write(&identity_path, identity.to_string().expose_secret())?;
///
/// let engine = AgeEngine::new(identity_path);
/// let encrypted = engine.encrypt(&recipient, b"Secret data")?;
/// let decrypted = engine.decrypt(&encrypted)?;
/// assert_eq!(decrypted.as_slice(), b"Secret data");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct AgeEngine {
    identity_path: PathBuf,
}

impl AgeEngine {
    /// Creates an engine that decrypts with the identities in `identity_path`.
    pub fn new(identity_path: PathBuf) -> Self {
        Self { identity_path }
    }

    /// Parses an `age1...` recipient string.
    pub fn parse_recipient(recipient: &str) -> AppResult<age::x25519::Recipient> {
        age::x25519::Recipient::from_str(recipient.trim()).map_err(|e| {
            CryptoError::EncryptionFailed {
                engine: ENGINE_NAME.to_string(),
                reason: format!("invalid recipient: {}", e),
            }
            .into()
        })
    }

    /// Loads every x25519 identity from the identity file, skipping comments.
    fn load_identities(&self) -> AppResult<Vec<age::x25519::Identity>> {
        let contents = Zeroizing::new(fs::read_to_string(&self.identity_path).map_err(|e| {
            decrypt_error(format!(
                "cannot read identity file {}: {}",
                self.identity_path.display(),
                e
            ))
        })?);

        let identities = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| {
                age::x25519::Identity::from_str(line)
                    .map_err(|e| decrypt_error(format!("malformed identity file: {}", e)))
            })
            .collect::<AppResult<Vec<_>>>()?;

        if identities.is_empty() {
            return Err(decrypt_error(format!(
                "no identities in {}",
                self.identity_path.display()
            )));
        }

        debug!("Loaded {} age identities", identities.len());
        Ok(identities)
    }
}

fn encrypt_error(reason: impl ToString) -> crate::errors::AppError {
    CryptoError::EncryptionFailed {
        engine: ENGINE_NAME.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

fn decrypt_error(reason: impl ToString) -> crate::errors::AppError {
    CryptoError::DecryptionFailed {
        engine: ENGINE_NAME.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

impl CryptoEngine for AgeEngine {
    fn encrypt(&self, recipient: &str, plaintext: &[u8]) -> AppResult<Vec<u8>> {
        let recipient = Self::parse_recipient(recipient)?;
        let encryptor = age::Encryptor::with_recipients(vec![Box::new(recipient)])
            .ok_or_else(|| encrypt_error("no recipients"))?;

        let mut ciphertext = Vec::with_capacity(plaintext.len() + 256);
        let mut writer = encryptor
            .wrap_output(&mut ciphertext)
            .map_err(encrypt_error)?;
        writer.write_all(plaintext).map_err(encrypt_error)?;
        writer.finish().map_err(encrypt_error)?;

        Ok(ciphertext)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> AppResult<Zeroizing<Vec<u8>>> {
        let decryptor = match age::Decryptor::new(ciphertext).map_err(decrypt_error)? {
            age::Decryptor::Recipients(d) => d,
            _ => return Err(decrypt_error("entry is passphrase-encrypted")),
        };

        let identities = self.load_identities()?;
        let mut reader = decryptor
            .decrypt(identities.iter().map(|i| i as &dyn age::Identity))
            .map_err(decrypt_error)?;

        let mut plaintext = Zeroizing::new(Vec::new());
        reader
            .read_to_end(&mut plaintext)
            .map_err(decrypt_error)?;
        Ok(plaintext)
    }

    fn name(&self) -> &str {
        ENGINE_NAME
    }
}
