//! Edit an existing entry in place.

use crate::errors::AppResult;
use crate::journal_core::EntryId;
use crate::ops::Journal;
use crate::repo::{Change, WriteMode};
use tracing::{debug, info};

/// Result of an edit call that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// New content was committed under the same identifier.
    Saved,
    /// The content is byte-for-byte what it was; nothing was committed.
    Unchanged,
    /// The editor left nothing but whitespace; the entry was kept as it was.
    Abandoned,
}

/// Re-edits entry `id`, keeping its identifier.
///
/// # Flow
///
/// 1. Read and decrypt the committed ciphertext
/// 2. Pre-fill a scratch file with the plaintext and open it in the editor
/// 3. Compare checksums of the old and new plaintext
/// 4. Encrypt, release the scratch file, commit `Edit <id>`
///
/// Emptying the entry does not delete it; use [`crate::ops::delete_entry`].
///
/// # Errors
///
/// Everything [`crate::ops::create_entry`] can fail with, plus
/// `RepoError::NotFound` and `CryptoError::DecryptionFailed` while reading.
pub fn edit_entry(journal: &Journal, id: &EntryId) -> AppResult<EditOutcome> {
    journal.interrupt.check()?;

    let ciphertext = journal.repo.read_tracked(id.as_str())?;
    let (scratch, original_checksum) = {
        let plaintext = journal.crypto.decrypt(&ciphertext)?;
        let scratch = journal.scratch_area()?.acquire_with(&plaintext)?;
        (scratch, calculate_checksum(&plaintext))
    };

    let edited = journal.editor()?.edit(scratch.path())?;
    journal.check_interrupted(&edited)?;

    if edited.is_blank() {
        scratch.release()?;
        debug!("Entry {} was emptied; keeping the stored version", id);
        return Ok(EditOutcome::Abandoned);
    }

    if calculate_checksum(edited.contents()) == original_checksum {
        scratch.release()?;
        debug!("Content of {} unchanged", id);
        return Ok(EditOutcome::Unchanged);
    }

    let ciphertext = journal
        .crypto
        .encrypt(&journal.recipient, edited.contents())?;
    drop(edited);
    scratch.release()?;

    journal.repo.write_and_commit(
        id.as_str(),
        &ciphertext,
        &Change::Edit.message(id.as_str()),
        WriteMode::Replace,
    )?;
    info!("Saved entry {}", id);
    Ok(EditOutcome::Saved)
}

fn calculate_checksum(content: &[u8]) -> blake3::Hash {
    blake3::hash(content)
}
