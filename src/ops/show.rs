//! Decrypt a single entry.

use crate::errors::AppResult;
use crate::journal_core::EntryId;
use crate::ops::Journal;
use tracing::debug;
use zeroize::Zeroizing;

/// Returns the plaintext of entry `id`.
///
/// Reads the committed ciphertext and decrypts it in memory; nothing is
/// written to disk and failures are not retried.
///
/// # Errors
///
/// - `RepoError::NotFound` when `id` is not tracked
/// - `CryptoError::DecryptionFailed` when the private key is unavailable or
///   the ciphertext is damaged
pub fn show_entry(journal: &Journal, id: &EntryId) -> AppResult<Zeroizing<Vec<u8>>> {
    let ciphertext = journal.repo.read_tracked(id.as_str())?;
    debug!("Decrypting {} ({} bytes)", id, ciphertext.len());
    journal.crypto.decrypt(&ciphertext)
}
