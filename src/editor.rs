//! Editor abstraction for writing diary entries.
//!
//! The editor is modeled as a blocking call: it runs in the foreground on the
//! inherited terminal, and when it exits the contents of the edited file are
//! returned. Implementations other than [`SystemEditor`] exist in tests.

use crate::errors::{AppResult, EditorError};
use std::fs;
use std::io;
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Contents of a file after the editor exited.
pub struct EditResult {
    contents: Zeroizing<Vec<u8>>,
    clean_exit: bool,
}

impl EditResult {
    /// Wraps the bytes left behind by an editor that exited successfully.
    pub fn new(contents: Zeroizing<Vec<u8>>) -> Self {
        Self {
            contents,
            clean_exit: true,
        }
    }

    /// Wraps the bytes left behind by an editor that failed or was killed.
    pub fn after_failed_exit(contents: Zeroizing<Vec<u8>>) -> Self {
        Self {
            contents,
            clean_exit: false,
        }
    }

    /// Whether the editor process reported success.
    pub fn exited_cleanly(&self) -> bool {
        self.clean_exit
    }

    /// The edited bytes.
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// Consumes the result, returning the bytes.
    pub fn into_contents(self) -> Zeroizing<Vec<u8>> {
        self.contents
    }

    /// True when nothing but ASCII whitespace was written.
    ///
    /// ```
    /// use deary::editor::EditResult;
    /// use zeroize::Zeroizing;
    ///
    /// assert!(EditResult::new(Zeroizing::new(b" \n\t".to_vec())).is_blank());
    /// assert!(!EditResult::new(Zeroizing::new(b"hello".to_vec())).is_blank());
    /// ```
    pub fn is_blank(&self) -> bool {
        self.contents.iter().all(u8::is_ascii_whitespace)
    }
}

/// Trait defining the interface for an editor component.
///
/// # Examples
///
/// ```
/// use deary::editor::{EditResult, Editor};
/// use deary::errors::AppResult;
/// use std::path::Path;
/// use zeroize::Zeroizing;
///
/// struct CannedEditor(&'static str);
///
/// impl Editor for CannedEditor {
///     fn edit(&self, path: &Path) -> AppResult<EditResult> {
///         std::fs::write(path, self.0)?;
///         Ok(EditResult::new(Zeroizing::new(self.0.as_bytes().to_vec())))
///     }
/// }
///
/// let dir = tempfile::tempdir()?;
/// let result = CannedEditor("hello").edit(&dir.path().join("entry.txt"))?;
/// assert_eq!(result.contents(), b"hello");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Editor {
    /// Opens `path` in the editor, blocks until it exits and returns the
    /// file's contents at that point.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Editor` when the editor cannot be started.
    fn edit(&self, path: &Path) -> AppResult<EditResult>;
}

/// An implementation of the Editor trait that runs an external command.
///
/// # Examples
///
/// ```no_run
/// use deary::editor::{Editor, SystemEditor};
/// use std::path::Path;
///
/// let editor = SystemEditor {
///     editor_cmd: "vim".to_string(),
/// };
/// let result = editor.edit(Path::new("/dev/shm/deary-entry.txt"))?;
/// println!("{} bytes written", result.contents().len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct SystemEditor {
    /// The command to run (e.g., "vim", "nano").
    pub editor_cmd: String,
}

impl Editor for SystemEditor {
    fn edit(&self, path: &Path) -> AppResult<EditResult> {
        debug!("Launching editor: {}", self.editor_cmd);

        let status = Command::new(&self.editor_cmd)
            .arg(path)
            .status()
            .map_err(|e| launch_error(&self.editor_cmd, e))?;

        let contents = read_edited(path)?;
        if status.success() {
            Ok(EditResult::new(contents))
        } else {
            warn!(
                "Editor '{}' exited with {}; keeping what was saved",
                self.editor_cmd, status
            );
            Ok(EditResult::after_failed_exit(contents))
        }
    }
}

/// Maps a spawn failure to the matching `EditorError` variant.
fn launch_error(command: &str, e: io::Error) -> EditorError {
    let command = command.to_string();
    match e.kind() {
        io::ErrorKind::NotFound => EditorError::CommandNotFound { command, source: e },
        io::ErrorKind::PermissionDenied => EditorError::PermissionDenied { command, source: e },
        _ => EditorError::ExecutionFailed { command, source: e },
    }
}

/// Reads the edited file. A file the editor deleted reads as empty.
fn read_edited(path: &Path) -> AppResult<Zeroizing<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Zeroizing::new(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("Edited file was removed; treating as empty");
            Ok(Zeroizing::new(Vec::new()))
        }
        Err(e) => Err(e.into()),
    }
}
