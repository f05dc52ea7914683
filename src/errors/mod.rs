//! Error handling utilities for the deary application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.
//!
//! Each failure kind maps to its own process exit code through
//! [`AppError::exit_code`], so scripts can tell an unavailable scratch area
//! apart from a failed commit.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Represents specific error cases that can occur when launching the external editor.
///
/// A non-zero exit status is not an error here; the workflow reads the file
/// whatever the editor returned.
///
/// # Examples
///
/// ```
/// use deary::errors::EditorError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::NotFound, "command not found");
/// let error = EditorError::CommandNotFound {
///     command: "vim".to_string(),
///     source: io_error,
/// };
///
/// assert!(format!("{}", error).contains("not found"));
/// assert!(format!("{}", error).contains("vim"));
/// ```
#[derive(Debug, Error)]
pub enum EditorError {
    /// Error when the specified editor command cannot be found.
    #[error("Editor command '{command}' not found: {source}. Please check that the editor is installed and available in your PATH, or set DEARY_EDITOR.")]
    CommandNotFound {
        /// The editor command that was not found
        command: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Error when permission is denied to execute the editor command.
    #[error("Permission denied when trying to execute editor '{command}': {source}. Please check that the editor binary is executable.")]
    PermissionDenied {
        /// The editor command that had permission denied
        command: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Error when the editor command fails to start due to other I/O errors.
    #[error("Failed to execute editor '{command}': {source}. Please check system resources or the editor installation.")]
    ExecutionFailed {
        /// The editor command that failed to execute
        command: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Errors raised by the memory-backed scratch area.
///
/// # Examples
///
/// ```
/// use deary::errors::ScratchError;
/// use std::path::PathBuf;
///
/// let error = ScratchError::Unavailable {
///     candidates: vec![PathBuf::from("/dev/shm")],
/// };
/// assert!(format!("{}", error).contains("memory-backed"));
/// ```
#[derive(Debug, Error)]
pub enum ScratchError {
    /// None of the candidate directories is a writable tmpfs/ramfs mount.
    #[error("No memory-backed scratch directory is available (tried {candidates:?}). Plaintext is never staged on persistent disk; mount a tmpfs and point DEARY_SCRATCH_DIR at it.")]
    Unavailable {
        /// Directories that were probed
        candidates: Vec<PathBuf>,
    },

    /// The scratch file could not be created, filled or removed.
    #[error("Scratch file operation failed for {path}: {source}")]
    Io {
        /// The scratch path involved
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Represents specific error cases that can occur during cryptographic operations.
///
/// # Examples
///
/// ```
/// use deary::errors::CryptoError;
///
/// let error = CryptoError::EncryptionFailed {
///     engine: "gpg".to_string(),
///     reason: "No public key".to_string(),
/// };
/// let message = format!("{}", error);
/// assert!(message.contains("gpg"));
/// assert!(message.contains("No public key"));
/// ```
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The recipient key is unknown, untrusted or expired, or the engine is unavailable.
    #[error("Encryption with {engine} failed: {reason}. Check that the recipient key is present and trusted.")]
    EncryptionFailed {
        /// Name of the engine that failed
        engine: String,
        /// Human readable cause
        reason: String,
    },

    /// The private key is unavailable, passphrase entry was cancelled, or the ciphertext is corrupt.
    #[error("Decryption with {engine} failed: {reason}. Check that the private key is available.")]
    DecryptionFailed {
        /// Name of the engine that failed
        engine: String,
        /// Human readable cause
        reason: String,
    },
}

/// Errors raised by the version-controlled entry repository.
///
/// # Examples
///
/// ```
/// use deary::errors::RepoError;
/// use std::path::PathBuf;
///
/// let error = RepoError::AlreadyExists {
///     path: PathBuf::from("/home/me/.deary"),
/// };
/// assert!(format!("{}", error).contains("already exists"));
/// ```
#[derive(Debug, Error)]
pub enum RepoError {
    /// `init` was run against a path that already holds a repository.
    #[error("Repository {path} already exists")]
    AlreadyExists {
        /// The repository root
        path: PathBuf,
    },

    /// The backend failed while creating a new repository.
    #[error("Failed to initialize repository at {path}: {reason}")]
    InitFailed {
        /// The repository root
        path: PathBuf,
        /// Human readable cause
        reason: String,
    },

    /// No repository exists at the configured location.
    #[error("No diary found at {path}. Run 'deary init <key-id>' first.")]
    NotInitialized {
        /// The repository root
        path: PathBuf,
    },

    /// Staging or committing failed; nothing was written to the working tree.
    #[error("Failed to commit {path}: {reason}")]
    CommitFailed {
        /// Repository-relative path being committed
        path: String,
        /// Human readable cause
        reason: String,
    },

    /// A new entry would overwrite an already tracked path.
    #[error("Entry {path} already exists")]
    EntryExists {
        /// Repository-relative path
        path: String,
    },

    /// The requested path is not tracked at HEAD.
    #[error("Entry {path} not found")]
    NotFound {
        /// Repository-relative path
        path: String,
    },

    /// Any other backend failure (history walk, tree lookup).
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),
}

/// Represents errors that can occur when locking the repository for a commit.
///
/// # Examples
///
/// ```
/// use deary::errors::LockError;
/// use std::path::PathBuf;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::PermissionDenied, "permission denied");
/// let error = LockError::AcquisitionFailed {
///     path: PathBuf::from("/home/me/.deary/.git/deary.lock"),
///     source: io_error,
/// };
///
/// assert!(format!("{}", error).contains("Failed to acquire lock"));
/// assert!(format!("{}", error).contains("permission denied"));
/// ```
#[derive(Debug, Error)]
pub enum LockError {
    /// Error when acquiring the lock fails for a technical reason.
    #[error("Failed to acquire lock {path}: {source}. Please check permissions on the repository directory.")]
    AcquisitionFailed {
        /// The lock file path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Represents all possible errors that can occur in the deary application.
///
/// This enum is the central error type used across the application, with variants
/// for different error categories. It uses `thiserror` for deriving the `Error` trait
/// implementation and formatted error messages.
///
/// # Examples
///
/// ```
/// use deary::errors::AppError;
///
/// let error = AppError::Config("Missing repository directory".to_string());
/// assert_eq!(format!("{}", error), "Configuration error: Missing repository directory");
/// assert_eq!(error.exit_code(), 2);
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from filesystem operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors from the memory-backed scratch area.
    #[error("Scratch area error: {0}")]
    Scratch(#[from] ScratchError),

    /// Errors when launching the text editor.
    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),

    /// Errors related to cryptographic operations.
    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),

    /// Errors related to the entry repository.
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),

    /// Errors related to repository locking.
    #[error("Repository locking error: {0}")]
    Lock(#[from] LockError),

    /// SIGINT or SIGTERM arrived while the entry was being edited.
    #[error("Interrupted; the entry was discarded")]
    Interrupted,
}

impl AppError {
    /// Process exit code for this error.
    ///
    /// ```
    /// use deary::errors::{AppError, RepoError};
    ///
    /// let error: AppError = RepoError::NotFound { path: "x".to_string() }.into();
    /// assert_eq!(error.exit_code(), 10);
    /// assert_eq!(AppError::Interrupted.exit_code(), 130);
    /// ```
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Io(_) => 1,
            AppError::Config(_) => 2,
            AppError::Scratch(ScratchError::Unavailable { .. }) => 3,
            AppError::Scratch(ScratchError::Io { .. }) => 1,
            AppError::Editor(_) => 4,
            AppError::Crypto(CryptoError::EncryptionFailed { .. }) => 5,
            AppError::Crypto(CryptoError::DecryptionFailed { .. }) => 6,
            AppError::Repo(repo) => match repo {
                RepoError::CommitFailed { .. } | RepoError::EntryExists { .. } => 7,
                RepoError::AlreadyExists { .. } => 8,
                RepoError::InitFailed { .. } => 9,
                RepoError::NotFound { .. } => 10,
                RepoError::NotInitialized { .. } => 11,
                RepoError::Git(_) => 1,
            },
            AppError::Lock(_) => 12,
            AppError::Interrupted => 130,
        }
    }
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use deary::errors::{AppResult, AppError};
///
/// fn might_fail() -> AppResult<String> {
///     if false {
///         return Err(AppError::Config("Something went wrong".to_string()));
///     }
///     Ok("Operation succeeded".to_string())
/// }
/// ```
pub type AppResult<T> = Result<T, AppError>;
