//! git2-backed entry repository.
//!
//! Commits are built from an in-memory tree derived from HEAD, so a failed
//! commit never leaves staged or written files behind. The working tree copy
//! of a file is only written once the commit exists.

use crate::constants::{GIT_USER_EMAIL, GIT_USER_NAME, REPO_LOCK_FILE_NAME};
use crate::errors::{AppResult, RepoError};
use crate::interrupt::InterruptFlag;
use crate::journal_core::EntryId;
use crate::repo::{EntryRepository, RepoLock, WriteMode};
use git2::{Commit, Delta, ErrorCode, FileMode, Oid, Repository, Signature, Sort, Tree};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[cfg(unix)]
use crate::constants::{DEFAULT_DIR_PERMISSIONS, DEFAULT_FILE_PERMISSIONS};
#[cfg(unix)]
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt, PermissionsExt};

/// A diary repository on disk.
pub struct GitRepository {
    repo: Repository,
    root: PathBuf,
    interrupt: InterruptFlag,
}

impl GitRepository {
    /// Creates a new repository at `root`, creating the directory (0700) if needed.
    ///
    /// # Errors
    ///
    /// - `RepoError::AlreadyExists` if `root` already is a repository; it is
    ///   left untouched
    /// - `RepoError::InitFailed` for any other failure
    pub fn init(root: &Path) -> AppResult<Self> {
        if Repository::open(root).is_ok() {
            return Err(RepoError::AlreadyExists {
                path: root.to_path_buf(),
            }
            .into());
        }

        let init_failed = |reason: String| RepoError::InitFailed {
            path: root.to_path_buf(),
            reason,
        };

        ensure_repo_directory(root).map_err(|e| init_failed(e.to_string()))?;
        let repo = Repository::init(root).map_err(|e| init_failed(e.message().to_string()))?;

        {
            let mut config = repo
                .config()
                .map_err(|e| init_failed(e.message().to_string()))?;
            config
                .set_str("user.name", GIT_USER_NAME)
                .and_then(|_| config.set_str("user.email", GIT_USER_EMAIL))
                .map_err(|e| init_failed(e.message().to_string()))?;
        }

        info!("Initialized repository at {}", root.display());
        Ok(Self {
            repo,
            root: root.to_path_buf(),
            interrupt: InterruptFlag::detached(),
        })
    }

    /// Opens the repository at `root`.
    ///
    /// # Errors
    ///
    /// `RepoError::NotInitialized` when `root` is not a git repository.
    pub fn open(root: &Path) -> AppResult<Self> {
        let repo = Repository::open(root).map_err(|e| {
            debug!("Opening {} failed: {}", root.display(), e);
            RepoError::NotInitialized {
                path: root.to_path_buf(),
            }
        })?;
        Ok(Self {
            repo,
            root: root.to_path_buf(),
            interrupt: InterruptFlag::detached(),
        })
    }

    /// Root of the working tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lets `interrupt` abandon a wait for the repository lock.
    pub fn with_interrupt(mut self, interrupt: InterruptFlag) -> Self {
        self.interrupt = interrupt;
        self
    }

    fn lock(&self) -> AppResult<RepoLock> {
        RepoLock::acquire(&self.repo.path().join(REPO_LOCK_FILE_NAME), &self.interrupt)
    }

    fn head_commit(&self) -> Result<Option<Commit<'_>>, git2::Error> {
        match self.repo.head() {
            Ok(head) => head.peel_to_commit().map(Some),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn head_tree(&self) -> Result<Option<Tree<'_>>, git2::Error> {
        self.head_commit()?.map(|commit| commit.tree()).transpose()
    }

    fn tracked_at_head(&self, path: &str) -> Result<bool, git2::Error> {
        Ok(self
            .head_tree()?
            .map_or(false, |tree| tree.get_name(path).is_some()))
    }

    fn signature(&self) -> Result<Signature<'static>, git2::Error> {
        self.repo
            .signature()
            .or_else(|_| Signature::now(GIT_USER_NAME, GIT_USER_EMAIL))
    }

    /// Commits the tree produced by `edit` applied to HEAD's tree.
    fn commit_with(
        &self,
        message: &str,
        edit: impl FnOnce(&mut git2::TreeBuilder<'_>) -> Result<(), git2::Error>,
    ) -> Result<Oid, git2::Error> {
        let parent = self.head_commit()?;
        let base = parent.as_ref().map(|c| c.tree()).transpose()?;

        let mut builder = self.repo.treebuilder(base.as_ref())?;
        edit(&mut builder)?;
        let tree = self.repo.find_tree(builder.write()?)?;

        let signature = self.signature()?;
        let parents: Vec<&Commit<'_>> = parent.iter().collect();
        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;

        self.sync_index(&tree);
        Ok(oid)
    }

    /// Points the on-disk index at the committed tree so `git status` is clean.
    fn sync_index(&self, tree: &Tree<'_>) {
        let result = self
            .repo
            .index()
            .and_then(|mut index| index.read_tree(tree).and_then(|_| index.write()));
        if let Err(e) = result {
            warn!("Failed to refresh repository index: {}", e);
        }
    }
}

impl EntryRepository for GitRepository {
    fn write_and_commit(
        &self,
        path: &str,
        bytes: &[u8],
        message: &str,
        mode: WriteMode,
    ) -> AppResult<()> {
        let _lock = self.lock()?;
        let commit_failed = |e: git2::Error| RepoError::CommitFailed {
            path: path.to_string(),
            reason: e.message().to_string(),
        };

        let tracked = self.tracked_at_head(path).map_err(commit_failed)?;
        match (mode, tracked) {
            (WriteMode::CreateNew, true) => {
                return Err(RepoError::EntryExists {
                    path: path.to_string(),
                }
                .into())
            }
            (WriteMode::Replace, false) => {
                return Err(RepoError::NotFound {
                    path: path.to_string(),
                }
                .into())
            }
            _ => {}
        }

        let oid = self
            .commit_with(message, |builder| {
                let blob = self.repo.blob(bytes)?;
                builder.insert(path, blob, FileMode::Blob.into())?;
                Ok(())
            })
            .map_err(commit_failed)?;
        debug!("Committed {} as {}", path, oid);

        let target = self.root.join(path);
        if let Err(e) = write_private_file(&target, bytes) {
            warn!("Committed {} but could not update working copy: {}", path, e);
        }
        Ok(())
    }

    fn remove_and_commit(&self, path: &str, message: &str) -> AppResult<()> {
        let _lock = self.lock()?;
        let commit_failed = |e: git2::Error| RepoError::CommitFailed {
            path: path.to_string(),
            reason: e.message().to_string(),
        };

        if !self.tracked_at_head(path).map_err(commit_failed)? {
            return Err(RepoError::NotFound {
                path: path.to_string(),
            }
            .into());
        }

        let oid = self
            .commit_with(message, |builder| builder.remove(path))
            .map_err(commit_failed)?;
        debug!("Removed {} in {}", path, oid);

        match fs::remove_file(self.root.join(path)) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Committed removal of {} but the file remains: {}", path, e),
        }
        Ok(())
    }

    fn read_tracked(&self, path: &str) -> AppResult<Vec<u8>> {
        let not_found = || RepoError::NotFound {
            path: path.to_string(),
        };

        let tree = self.head_tree().map_err(RepoError::from)?.ok_or_else(not_found)?;
        let entry = tree.get_name(path).ok_or_else(not_found)?;
        let blob = self
            .repo
            .find_blob(entry.id())
            .map_err(|_| not_found())?;
        Ok(blob.content().to_vec())
    }

    fn list_entries(&self) -> AppResult<Vec<EntryId>> {
        if self.head_commit().map_err(RepoError::from)?.is_none() {
            return Ok(Vec::new());
        }

        let mut walk = self.repo.revwalk().map_err(RepoError::from)?;
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)
            .map_err(RepoError::from)?;
        walk.push_head().map_err(RepoError::from)?;

        let mut entries: Vec<EntryId> = Vec::new();
        for oid in walk {
            let commit = self
                .repo
                .find_commit(oid.map_err(RepoError::from)?)
                .map_err(RepoError::from)?;
            let tree = commit.tree().map_err(RepoError::from)?;
            let parent_tree = match commit.parent(0) {
                Ok(parent) => Some(parent.tree().map_err(RepoError::from)?),
                Err(_) => None,
            };
            let diff = self
                .repo
                .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)
                .map_err(RepoError::from)?;

            for delta in diff.deltas() {
                match delta.status() {
                    Delta::Added => {
                        if let Some(id) = delta_entry_id(delta.new_file().path()) {
                            entries.retain(|existing| existing != &id);
                            entries.push(id);
                        }
                    }
                    Delta::Deleted => {
                        if let Some(id) = delta_entry_id(delta.old_file().path()) {
                            entries.retain(|existing| existing != &id);
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(entries)
    }

    fn is_tracked(&self, path: &str) -> AppResult<bool> {
        Ok(self.tracked_at_head(path).map_err(RepoError::from)?)
    }
}

/// Entry identifier for a path touched by a diff, skipping metadata files.
fn delta_entry_id(path: Option<&Path>) -> Option<EntryId> {
    let name = path?.to_str()?;
    if !EntryId::is_entry_file_name(name) {
        return None;
    }
    EntryId::parse(name).ok()
}

/// Creates the repository directory, owner-only where supported.
fn ensure_repo_directory(root: &Path) -> io::Result<()> {
    if root.is_dir() {
        return Ok(());
    }
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(DEFAULT_DIR_PERMISSIONS);
    builder.create(root)
}

/// Writes a working tree file readable only by the owner.
fn write_private_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(DEFAULT_FILE_PERMISSIONS);

    let mut file = options.open(path)?;
    #[cfg(unix)]
    file.set_permissions(fs::Permissions::from_mode(DEFAULT_FILE_PERMISSIONS))?;
    file.write_all(bytes)?;
    file.sync_all()
}
