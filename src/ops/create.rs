//! Create a new entry: scratch file, editor, encryption, commit.

use crate::errors::{AppError, AppResult, RepoError};
use crate::journal_core::EntryId;
use crate::ops::Journal;
use crate::repo::{Change, WriteMode};
use tracing::{debug, info};

/// Result of a create call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The entry was committed under this identifier.
    Committed(EntryId),
    /// The editor left nothing but whitespace; nothing was stored.
    Abandoned,
}

/// Writes a new entry named after the current UTC time.
///
/// # Flow
///
/// 1. Acquire a scratch file on a memory-backed filesystem
/// 2. Open it in the editor and wait for the editor to exit
/// 3. Blank result: release the scratch file and report `Abandoned`
/// 4. Encrypt, then release the scratch file
/// 5. Commit the ciphertext under the first free identifier
///
/// The scratch file is released on every path, including errors.
///
/// # Errors
///
/// - `ScratchError::Unavailable` when no memory-backed directory exists
/// - `AppError::Editor` when the editor cannot be launched
/// - `CryptoError::EncryptionFailed`
/// - `RepoError::CommitFailed` (nothing is stored)
/// - `AppError::Interrupted` when a signal ended the editing session
pub fn create_entry(journal: &Journal) -> AppResult<CreateOutcome> {
    create_entry_as(journal, EntryId::now())
}

/// Like [`create_entry`], naming the entry after `base` instead of the clock.
pub fn create_entry_as(journal: &Journal, base: EntryId) -> AppResult<CreateOutcome> {
    journal.interrupt.check()?;

    let scratch = journal.scratch_area()?.acquire()?;
    let edited = journal.editor()?.edit(scratch.path())?;
    journal.check_interrupted(&edited)?;

    if edited.is_blank() {
        scratch.release()?;
        debug!("Entry is empty; nothing was saved");
        return Ok(CreateOutcome::Abandoned);
    }

    let ciphertext = journal
        .crypto
        .encrypt(&journal.recipient, edited.contents())?;
    drop(edited);
    scratch.release()?;

    let id = commit_new(journal, &base, &ciphertext)?;
    info!("Saved entry {}", id);
    Ok(CreateOutcome::Committed(id))
}

/// Commits under `base`, or the first suffixed candidate not yet tracked.
fn commit_new(journal: &Journal, base: &EntryId, ciphertext: &[u8]) -> AppResult<EntryId> {
    for candidate in base.candidates() {
        let name = candidate.as_str();
        match journal.repo.write_and_commit(
            name,
            ciphertext,
            &Change::Add.message(name),
            WriteMode::CreateNew,
        ) {
            Ok(()) => return Ok(candidate),
            Err(AppError::Repo(RepoError::EntryExists { .. })) => {
                debug!("Identifier {} is taken", name);
            }
            Err(e) => return Err(e),
        }
    }

    Err(RepoError::CommitFailed {
        path: base.to_string(),
        reason: "every collision suffix is already taken".to_string(),
    }
    .into())
}
