//! Constants used throughout the application.
//!
//! This module contains all constants used in the deary application, organized
//! into logical groups. Having constants centralized makes them easier to find,
//! modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "deary";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "An encrypted diary kept in a git repository";

// CLI Arguments & Defaults
/// Editor looked up on PATH when neither DEARY_EDITOR nor EDITOR is set.
pub const DEFAULT_EDITOR_COMMAND: &str = "vim";
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Configuration Keys & Environment Variables
/// Environment variable for the repository directory.
pub const ENV_VAR_DEARY_DIR: &str = "DEARY_DIR";
/// Environment variable for the preferred editor.
pub const ENV_VAR_DEARY_EDITOR: &str = "DEARY_EDITOR";
/// Standard environment variable for specifying the default editor.
pub const ENV_VAR_EDITOR: &str = "EDITOR";
/// Environment variable overriding the memory-backed scratch directory.
pub const ENV_VAR_DEARY_SCRATCH_DIR: &str = "DEARY_SCRATCH_DIR";
/// Environment variable pointing at the age identity file used for decryption.
pub const ENV_VAR_DEARY_AGE_IDENTITY: &str = "DEARY_AGE_IDENTITY";
/// Environment variable selecting the log output format.
pub const ENV_VAR_DEARY_LOG_FORMAT: &str = "DEARY_LOG_FORMAT";
/// Environment variable selecting the log level when RUST_LOG is unset.
pub const ENV_VAR_DEARY_LOG_LEVEL: &str = "DEARY_LOG_LEVEL";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";
/// Default repository directory, relative to the home directory.
pub const DEFAULT_REPO_SUBDIR: &str = ".deary";
/// Default age identity file, relative to the home directory.
pub const DEFAULT_AGE_IDENTITY_SUBPATH: &str = ".config/deary/identity.txt";

// Validation
/// Characters forbidden in editor commands for security reasons.
pub const EDITOR_FORBIDDEN_CHARS: &[char] =
    &['|', '&', ';', '$', '(', ')', '`', '\\', '<', '>', '\'', '"'];
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

// File System Parameters
/// Memory-backed mounts probed for scratch files, in order.
pub const TMPFS_PATHS: &[&str] = &["/dev/shm", "/run/shm"];
/// Prefix of every scratch file name; followed by the process id.
pub const SCRATCH_FILE_PREFIX: &str = "deary-";
/// Suffix of scratch files so editors pick plain-text mode.
pub const SCRATCH_FILE_SUFFIX: &str = ".txt";
/// Tracked metadata file holding the recipient key identifier.
pub const KEY_ID_FILE_NAME: &str = ".key_id";
/// Lock file created inside the git directory to serialize commits.
pub const REPO_LOCK_FILE_NAME: &str = "deary.lock";
/// Permissions for the repository directory (owner read/write/execute).
#[cfg(unix)]
pub const DEFAULT_DIR_PERMISSIONS: u32 = 0o700;
/// Permissions for working-tree entry files and scratch files (owner read/write).
#[cfg(unix)]
pub const DEFAULT_FILE_PERMISSIONS: u32 = 0o600;

// Git
/// Committer name written into the repository config by `init`.
pub const GIT_USER_NAME: &str = "noname";
/// Committer email written into the repository config by `init`.
pub const GIT_USER_EMAIL: &str = "noemail";

// Encryption
/// Options passed to every gpg invocation.
pub const GPG_OPTS: &[&str] = &["--quiet", "--yes", "--compress-algo=none", "--no-encrypt-to"];
/// Name of the gpg executable looked up on PATH.
pub const GPG_PROGRAM: &str = "gpg";
/// Prefix of age x25519 recipients.
pub const AGE_RECIPIENT_PREFIX: &str = "age1";

// Date/Time Logic
/// Format of entry identifiers (UTC, one second resolution).
pub const ENTRY_ID_FORMAT: &str = "%Y%m%d-%H%M%S";
/// Upper bound on the `-N` collision suffix tried for one creation.
pub const MAX_ID_COLLISION_SUFFIX: u32 = 100;

// Logging Configuration
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "deary";
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";
