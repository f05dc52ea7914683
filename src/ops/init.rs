//! Create a new diary.

use crate::constants::KEY_ID_FILE_NAME;
use crate::errors::{AppError, AppResult, RepoError};
use crate::repo::{Change, EntryRepository, GitRepository, WriteMode};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Initializes a diary at `root` whose entries are encrypted for `key_id`.
///
/// Creates the directory (0700), a git repository and one commit adding the
/// `.key_id` metadata file.
///
/// # Errors
///
/// - `AppError::Config` when `key_id` is blank or spans several lines
/// - `RepoError::AlreadyExists` when `root` is already a repository
/// - `RepoError::InitFailed` otherwise; a repository created by this call is
///   removed again when the `.key_id` commit fails
pub fn init_repository(root: &Path, key_id: &str) -> AppResult<GitRepository> {
    let key_id = key_id.trim();
    if key_id.is_empty() {
        return Err(AppError::Config("Key id cannot be empty".to_string()));
    }
    if key_id.contains(['\n', '\r']) {
        return Err(AppError::Config(
            "Key id must be a single line".to_string(),
        ));
    }

    let root_existed = root.exists();
    let repo = GitRepository::init(root)?;
    commit_key_id(&repo, root, root_existed, key_id)?;

    info!("Created diary at {}", root.display());
    Ok(repo)
}

/// Commits `.key_id`, discarding the new repository if that fails.
fn commit_key_id(
    repo: &dyn EntryRepository,
    root: &Path,
    root_existed: bool,
    key_id: &str,
) -> AppResult<()> {
    let committed = repo.write_and_commit(
        KEY_ID_FILE_NAME,
        format!("{}\n", key_id).as_bytes(),
        &Change::Add.message(KEY_ID_FILE_NAME),
        WriteMode::CreateNew,
    );
    let Err(e) = committed else {
        return Ok(());
    };

    // Only remove what init created; a pre-existing directory keeps its files.
    let removed = if root_existed {
        fs::remove_dir_all(root.join(".git"))
    } else {
        fs::remove_dir_all(root)
    };
    if let Err(cleanup) = removed {
        warn!(
            "Could not remove half-initialized repository at {}: {}",
            root.display(),
            cleanup
        );
    }

    Err(RepoError::InitFailed {
        path: root.to_path_buf(),
        reason: e.to_string(),
    }
    .into())
}
