//! List entry identifiers.

use crate::errors::AppResult;
use crate::journal_core::EntryId;
use crate::ops::Journal;

/// Identifiers of all entries, oldest first.
///
/// Only repository history is consulted; nothing is decrypted.
pub fn list_entries(journal: &Journal) -> AppResult<Vec<EntryId>> {
    journal.repo.list_entries()
}
