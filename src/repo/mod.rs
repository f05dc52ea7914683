//! Version-controlled storage for encrypted entries.
//!
//! The repository is a flat git working tree: every tracked file is either
//! dot-prefixed metadata (such as `.key_id`) or the ciphertext of one entry,
//! named after its [`EntryId`]. Each mutation is exactly one commit.
//!
//! # Module Structure
//!
//! - `git`: the git2-backed [`GitRepository`]
//! - `lock`: advisory lock serializing mutations across processes

pub mod git;
pub mod lock;

use crate::errors::AppResult;
use crate::journal_core::EntryId;
use std::fmt;

pub use self::git::GitRepository;
pub use self::lock::RepoLock;

/// How `write_and_commit` treats an existing tracked path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// The path must not be tracked yet; otherwise `RepoError::EntryExists`.
    CreateNew,
    /// The path must already be tracked; otherwise `RepoError::NotFound`.
    Replace,
}

/// Kind of change recorded by a commit, used as the commit message verb.
///
/// ```
/// use deary::repo::Change;
///
/// assert_eq!(Change::Add.message("20240115-093005"), "Add 20240115-093005");
/// assert_eq!(Change::Delete.message(".key_id"), "Delete .key_id");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Add,
    Edit,
    Delete,
}

impl Change {
    /// Commit message for this change applied to `path`.
    pub fn message(self, path: &str) -> String {
        format!("{} {}", self, path)
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Change::Add => "Add",
            Change::Edit => "Edit",
            Change::Delete => "Delete",
        };
        f.write_str(verb)
    }
}

/// Storage backend for entries and repository metadata.
///
/// Paths are relative to the repository root and never contain separators.
pub trait EntryRepository {
    /// Commits `bytes` at `path` with `message`, then updates the working tree.
    ///
    /// # Errors
    ///
    /// - `RepoError::EntryExists` for `WriteMode::CreateNew` on a tracked path
    /// - `RepoError::NotFound` for `WriteMode::Replace` on an untracked path
    /// - `RepoError::CommitFailed` when the commit cannot be made; nothing is
    ///   written in that case
    /// - `AppError::Lock` when the repository lock cannot be taken
    fn write_and_commit(
        &self,
        path: &str,
        bytes: &[u8],
        message: &str,
        mode: WriteMode,
    ) -> AppResult<()>;

    /// Removes a tracked `path` in a single commit.
    ///
    /// # Errors
    ///
    /// `RepoError::NotFound` when `path` is not tracked, `RepoError::CommitFailed`
    /// when the commit cannot be made.
    fn remove_and_commit(&self, path: &str, message: &str) -> AppResult<()>;

    /// Content of `path` as committed at HEAD.
    ///
    /// # Errors
    ///
    /// `RepoError::NotFound` when `path` is not tracked.
    fn read_tracked(&self, path: &str) -> AppResult<Vec<u8>>;

    /// Entries present at HEAD, in the order they were first committed.
    fn list_entries(&self) -> AppResult<Vec<EntryId>>;

    /// Whether `path` is tracked at HEAD.
    fn is_tracked(&self, path: &str) -> AppResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_messages() {
        assert_eq!(Change::Add.message("a"), "Add a");
        assert_eq!(Change::Edit.message("20240115-093005-2"), "Edit 20240115-093005-2");
        assert_eq!(Change::Delete.to_string(), "Delete");
    }
}
