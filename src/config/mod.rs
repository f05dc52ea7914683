//! Configuration management for the deary application.
//!
//! This module handles loading and validating configuration settings from environment
//! variables, with sensible defaults. The resulting [`Config`] is passed explicitly to
//! every component; nothing reads the environment after startup.
//!
//! # Environment Variables
//!
//! - `DEARY_DIR`: Path to the repository (defaults to ~/.deary)
//! - `DEARY_EDITOR`: Editor to use for writing entries
//! - `EDITOR`: Fallback editor if DEARY_EDITOR is not set (defaults to "vim")
//! - `DEARY_SCRATCH_DIR`: Memory-backed directory for plaintext scratch files
//!   (defaults to /dev/shm, then /run/shm)
//! - `DEARY_AGE_IDENTITY`: age identity file for age recipients
//!   (defaults to ~/.config/deary/identity.txt)
//! - `HOME`: Used for expanding the default paths

use crate::constants::{
    DEFAULT_AGE_IDENTITY_SUBPATH, DEFAULT_EDITOR_COMMAND, DEFAULT_REPO_SUBDIR,
    EDITOR_FORBIDDEN_CHARS, ENV_VAR_DEARY_AGE_IDENTITY, ENV_VAR_DEARY_DIR, ENV_VAR_DEARY_EDITOR,
    ENV_VAR_DEARY_SCRATCH_DIR, ENV_VAR_EDITOR, ENV_VAR_HOME, REDACTED_PLACEHOLDER, TMPFS_PATHS,
};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Configuration for the deary application.
///
/// # Examples
///
/// Creating a configuration manually:
/// ```
/// use deary::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     editor: "nano".to_string(),
///     repo_dir: PathBuf::from("/home/me/.deary"),
///     scratch_dirs: vec![PathBuf::from("/dev/shm")],
///     age_identity: PathBuf::from("/home/me/.config/deary/identity.txt"),
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone)]
pub struct Config {
    /// Editor command used to write entries.
    ///
    /// Loaded in the following order of precedence:
    /// 1. DEARY_EDITOR
    /// 2. EDITOR
    /// 3. Defaults to "vim"
    pub editor: String,

    /// Root of the git repository holding encrypted entries.
    pub repo_dir: PathBuf,

    /// Candidate memory-backed directories for scratch files, probed in order.
    pub scratch_dirs: Vec<PathBuf>,

    /// age identity file used to decrypt entries for `age1...` recipients.
    pub age_identity: PathBuf,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("editor", &REDACTED_PLACEHOLDER)
            .field("repo_dir", &REDACTED_PLACEHOLDER)
            .field("scratch_dirs", &self.scratch_dirs)
            .field("age_identity", &REDACTED_PLACEHOLDER)
            .finish()
    }
}

impl Config {
    /// Validates an editor command string for security.
    ///
    /// The command is spawned directly, never through a shell, so arguments and
    /// shell syntax are refused instead of being silently passed as part of the
    /// program name.
    fn validate_editor_command(editor_cmd: &str) -> AppResult<&str> {
        if editor_cmd.is_empty() {
            return Err(AppError::Config(
                "Editor command cannot be empty".to_string(),
            ));
        }

        if editor_cmd.contains(' ') {
            return Err(AppError::Config(
                "Editor command cannot contain spaces. Use a wrapper script or shell alias for editors requiring arguments".to_string(),
            ));
        }

        for &ch in EDITOR_FORBIDDEN_CHARS.iter() {
            if editor_cmd.contains(ch) {
                return Err(AppError::Config(format!(
                    "Editor command cannot contain shell metacharacters: '{}'. Use a wrapper script or shell alias instead",
                    ch
                )));
            }
        }

        Ok(editor_cmd)
    }

    /// Expands `~` and environment variable references in a path setting.
    fn expand_path(raw: &str) -> AppResult<PathBuf> {
        let expanded = shellexpand::full(raw)
            .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
        Ok(PathBuf::from(expanded.into_owned()))
    }

    /// The editor command, validated for spawning.
    ///
    /// Only `create` and `edit` need an editor, so the setting is checked here
    /// rather than in [`Config::load`].
    ///
    /// # Errors
    ///
    /// `AppError::Config` when the command is empty or contains spaces or
    /// shell metacharacters.
    pub fn editor_command(&self) -> AppResult<&str> {
        Config::validate_editor_command(&self.editor)
    }

    /// Loads configuration from environment variables with sensible defaults.
    ///
    /// The editor setting is stored as given; see [`Config::editor_command`].
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if:
    /// - A path fails to expand
    /// - The resulting configuration fails [`Config::validate`]
    pub fn load() -> AppResult<Self> {
        let editor = env::var(ENV_VAR_DEARY_EDITOR)
            .or_else(|_| env::var(ENV_VAR_EDITOR))
            .unwrap_or_else(|_| DEFAULT_EDITOR_COMMAND.to_string());

        let home = env::var(ENV_VAR_HOME).unwrap_or_default();

        let repo_dir_str = env::var(ENV_VAR_DEARY_DIR)
            .unwrap_or_else(|_| format!("{}/{}", home, DEFAULT_REPO_SUBDIR));
        let repo_dir = Config::expand_path(&repo_dir_str)?;

        let scratch_dirs = match env::var(ENV_VAR_DEARY_SCRATCH_DIR) {
            Ok(dir) => vec![Config::expand_path(&dir)?],
            Err(_) => TMPFS_PATHS.iter().map(PathBuf::from).collect(),
        };

        let identity_str = env::var(ENV_VAR_DEARY_AGE_IDENTITY)
            .unwrap_or_else(|_| format!("{}/{}", home, DEFAULT_AGE_IDENTITY_SUBPATH));
        let age_identity = Config::expand_path(&identity_str)?;

        let config = Config {
            editor,
            repo_dir,
            scratch_dirs,
            age_identity,
        };
        config.validate()?;

        Ok(config)
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when the repository path is empty or relative,
    /// or no scratch directory candidate is configured.
    pub fn validate(&self) -> AppResult<()> {
        if self.repo_dir.as_os_str().is_empty() {
            return Err(AppError::Config(
                "Repository directory path is empty".to_string(),
            ));
        }

        if !self.repo_dir.is_absolute() {
            return Err(AppError::Config(
                "Repository directory must be an absolute path".to_string(),
            ));
        }

        if self.scratch_dirs.is_empty() {
            return Err(AppError::Config(
                "No scratch directory candidates configured".to_string(),
            ));
        }

        Ok(())
    }
}
