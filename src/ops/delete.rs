//! Remove an entry.

use crate::errors::{AppResult, RepoError};
use crate::journal_core::EntryId;
use crate::ops::Journal;
use crate::repo::Change;
use tracing::info;

/// Removes entry `id` in a single `Delete <id>` commit.
///
/// The ciphertext stays reachable in history; only the current tree loses it.
///
/// # Errors
///
/// `RepoError::NotFound` when `id` is not tracked.
pub fn delete_entry(journal: &Journal, id: &EntryId) -> AppResult<()> {
    if !journal.repo.is_tracked(id.as_str())? {
        return Err(RepoError::NotFound {
            path: id.to_string(),
        }
        .into());
    }

    journal
        .repo
        .remove_and_commit(id.as_str(), &Change::Delete.message(id.as_str()))?;
    info!("Deleted entry {}", id);
    Ok(())
}
