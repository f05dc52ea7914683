//! Advisory cross-process lock serializing repository mutations.

use crate::errors::{AppResult, LockError};
use crate::interrupt::InterruptFlag;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

const INITIAL_BACKOFF: Duration = Duration::from_millis(10);
const MAX_BACKOFF: Duration = Duration::from_millis(200);

/// Exclusive lock on a file inside the git directory, released on drop.
#[derive(Debug)]
pub struct RepoLock {
    file: File,
    path: PathBuf,
}

impl RepoLock {
    /// Waits until the exclusive lock on `path` is held.
    ///
    /// The lock file is created if needed and never removed; only the advisory
    /// lock on it matters. While another process holds the lock this polls
    /// with backoff and gives up with `AppError::Interrupted` once `interrupt`
    /// is raised.
    pub fn acquire(path: &Path, interrupt: &InterruptFlag) -> AppResult<Self> {
        let failed = |source| LockError::AcquisitionFailed {
            path: path.to_path_buf(),
            source,
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(failed)?;

        let mut backoff = INITIAL_BACKOFF;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => break,
                Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                    if backoff == INITIAL_BACKOFF {
                        debug!("Waiting for repository lock {}", path.display());
                    }
                    interrupt.check()?;
                    thread::sleep(backoff);
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
                Err(e) => return Err(failed(e).into()),
            }
        }

        debug!("Acquired repository lock {}", path.display());
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            warn!("Failed to release repository lock {}: {}", self.path.display(), e);
        }
    }
}
