//! Memory-backed scratch files for plaintext.
//!
//! Plaintext only ever exists in a scratch file while the editor runs. Scratch
//! files live on a tmpfs/ramfs mount so they never reach persistent storage,
//! are readable by the owner only, and are overwritten with zeros before being
//! unlinked. Dropping a [`ScratchFile`] performs the same cleanup, so early
//! returns on error paths cannot leak plaintext.
//!
//! There is no fallback to the regular temp directory: when no
//! memory-backed mount is available the caller gets
//! [`ScratchError::Unavailable`].

use crate::constants::{SCRATCH_FILE_PREFIX, SCRATCH_FILE_SUFFIX};
use crate::errors::{AppResult, ScratchError};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

const WIPE_CHUNK: usize = 8192;

/// `statfs` filesystem magic numbers (linux/magic.h).
#[cfg(target_os = "linux")]
const TMPFS_MAGIC: u32 = 0x0102_1994;
#[cfg(target_os = "linux")]
const RAMFS_MAGIC: u32 = 0x8584_58f6;

/// A directory on a memory-backed filesystem that hands out scratch files.
#[derive(Debug, Clone)]
pub struct ScratchArea {
    dir: PathBuf,
}

impl ScratchArea {
    /// Picks the first candidate directory that exists and is memory-backed.
    ///
    /// # Errors
    ///
    /// Returns `ScratchError::Unavailable` when no candidate qualifies.
    pub fn locate(candidates: &[PathBuf]) -> AppResult<Self> {
        for dir in candidates {
            if !dir.is_dir() {
                debug!("Scratch candidate {:?} is not a directory", dir);
                continue;
            }
            match is_memory_backed(dir) {
                Ok(true) => {
                    debug!("Using scratch directory {:?}", dir);
                    return Ok(Self { dir: dir.clone() });
                }
                Ok(false) => debug!("Scratch candidate {:?} is not memory-backed", dir),
                Err(e) => debug!("Cannot inspect scratch candidate {:?}: {}", dir, e),
            }
        }

        Err(ScratchError::Unavailable {
            candidates: candidates.to_vec(),
        }
        .into())
    }

    /// Uses `dir` without checking the filesystem type.
    #[cfg(test)]
    pub(crate) fn unverified(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// The directory scratch files are created in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates a new, empty, uniquely named scratch file (mode 0600).
    ///
    /// The name carries the process id, so concurrent invocations never share
    /// a scratch file and leftovers can be attributed to their process.
    pub fn acquire(&self) -> AppResult<ScratchFile> {
        let prefix = format!("{}{}-", SCRATCH_FILE_PREFIX, std::process::id());
        let file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(SCRATCH_FILE_SUFFIX)
            .rand_bytes(12)
            .tempfile_in(&self.dir)
            .map_err(|e| self.creation_error(e))?;

        let path = file.path().to_path_buf();
        restrict_permissions(file.as_file()).map_err(|source| ScratchError::Io {
            path: path.clone(),
            source,
        })?;

        debug!("Acquired scratch file {:?}", path);
        Ok(ScratchFile {
            file: Some(file),
            path,
        })
    }

    /// Creates a scratch file pre-filled with `contents`.
    pub fn acquire_with(&self, contents: &[u8]) -> AppResult<ScratchFile> {
        let mut scratch = self.acquire()?;
        let path = scratch.path.clone();
        if let Some(file) = scratch.file.as_mut() {
            file.write_all(contents)
                .and_then(|_| file.as_file().sync_all())
                .map_err(|source| ScratchError::Io { path, source })?;
        }
        Ok(scratch)
    }

    fn creation_error(&self, e: io::Error) -> crate::errors::AppError {
        let unwritable = matches!(
            e.kind(),
            io::ErrorKind::PermissionDenied | io::ErrorKind::NotFound
        ) || e.raw_os_error() == Some(libc::EROFS);

        if unwritable {
            warn!("Scratch directory {:?} is not writable: {}", self.dir, e);
            ScratchError::Unavailable {
                candidates: vec![self.dir.clone()],
            }
            .into()
        } else {
            ScratchError::Io {
                path: self.dir.clone(),
                source: e,
            }
            .into()
        }
    }
}

/// A plaintext scratch file owned by one workflow invocation.
#[derive(Debug)]
pub struct ScratchFile {
    file: Option<NamedTempFile>,
    path: PathBuf,
}

impl ScratchFile {
    /// Path handed to the editor.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrites and unlinks the scratch file, reporting failures.
    pub fn release(mut self) -> AppResult<()> {
        match self.file.take() {
            Some(file) => release_file(file, &self.path).map_err(|source| {
                ScratchError::Io {
                    path: self.path.clone(),
                    source,
                }
                .into()
            }),
            None => Ok(()),
        }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            if let Err(e) = release_file(file, &self.path) {
                warn!("Failed to clean up scratch file {:?}: {}", self.path, e);
            }
        }
    }
}

/// Wipes whatever is at `path` and the originally created inode, then unlinks.
///
/// Editors that save by writing a new file and renaming it over the original
/// leave two inodes behind; both get overwritten.
fn release_file(file: NamedTempFile, path: &Path) -> io::Result<()> {
    match OpenOptions::new().write(true).open(path) {
        Ok(current) => {
            if let Err(e) = overwrite_with_zeros(&current) {
                warn!("Could not overwrite scratch file {:?}: {}", path, e);
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not open scratch file {:?} for wiping: {}", path, e),
    }
    if let Err(e) = overwrite_with_zeros(file.as_file()) {
        debug!("Could not overwrite original scratch inode: {}", e);
    }

    match file.close() {
        Ok(()) => {}
        // the editor may have removed the file itself
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    debug!("Released scratch file {:?}", path);
    Ok(())
}

fn overwrite_with_zeros(mut file: &File) -> io::Result<()> {
    let len = file.metadata()?.len();
    file.seek(SeekFrom::Start(0))?;
    let zeros = [0u8; WIPE_CHUNK];
    let mut remaining = len;
    while remaining > 0 {
        let n = remaining.min(WIPE_CHUNK as u64) as usize;
        file.write_all(&zeros[..n])?;
        remaining -= n as u64;
    }
    file.sync_all()
}

#[cfg(unix)]
fn restrict_permissions(file: &File) -> io::Result<()> {
    use crate::constants::DEFAULT_FILE_PERMISSIONS;
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(DEFAULT_FILE_PERMISSIONS))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &File) -> io::Result<()> {
    Ok(())
}

/// Whether `dir` lives on tmpfs or ramfs.
#[cfg(target_os = "linux")]
pub fn is_memory_backed(dir: &Path) -> io::Result<bool> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(dir.as_os_str().as_bytes())?;
    // SAFETY: statfs only writes into the zeroed struct we pass, and c_path is NUL terminated.
    let mut stats: libc::statfs = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::statfs(c_path.as_ptr(), &mut stats) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }

    // f_type is signed and its width varies by target; the magic fits in 32 bits.
    #[allow(clippy::unnecessary_cast)]
    Ok(is_memory_fs_type(stats.f_type as u32))
}

#[cfg(target_os = "linux")]
fn is_memory_fs_type(fs_type: u32) -> bool {
    fs_type == TMPFS_MAGIC || fs_type == RAMFS_MAGIC
}

/// Whether `dir` lives on tmpfs or ramfs. Only Linux mounts are recognized.
#[cfg(not(target_os = "linux"))]
pub fn is_memory_backed(_dir: &Path) -> io::Result<bool> {
    Ok(false)
}
