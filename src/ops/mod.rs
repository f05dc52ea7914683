//! High-level diary operations.
//!
//! Each operation runs one step of the entry lifecycle against a [`Journal`],
//! the bundle of collaborators resolved once at startup: the repository, the
//! crypto engine for the repository's recipient, the editor, the scratch area
//! candidates and the interrupt flag. Only journals opened with
//! [`Journal::open_for_editing`] carry an editor.
//!
//! | Operation | Repository effect |
//! |-----------|-------------------|
//! | [`init_repository`] | new repository, one commit adding `.key_id` |
//! | [`create_entry`] | one `Add <id>` commit, or none when abandoned |
//! | [`edit_entry`] | one `Edit <id>` commit, or none when unchanged/abandoned |
//! | [`delete_entry`] | one `Delete <id>` commit |
//! | [`list_entries`], [`show_entry`] | read only |

pub mod create;
pub mod delete;
pub mod edit;
pub mod init;
pub mod list;
pub mod show;

use crate::config::Config;
use crate::constants::KEY_ID_FILE_NAME;
use crate::crypto::{engine_for, CryptoEngine, ScratchArea};
use crate::editor::{EditResult, Editor, SystemEditor};
use crate::errors::{AppError, AppResult, RepoError};
use crate::interrupt::InterruptFlag;
use crate::repo::{EntryRepository, GitRepository};
use std::path::PathBuf;
use tracing::{debug, warn};

pub use create::{create_entry, create_entry_as, CreateOutcome};
pub use delete::delete_entry;
pub use edit::{edit_entry, EditOutcome};
pub use init::init_repository;
pub use list::list_entries;
pub use show::show_entry;

enum ScratchSource {
    Candidates(Vec<PathBuf>),
    Fixed(ScratchArea),
}

/// An opened diary and everything needed to work on its entries.
pub struct Journal {
    repo: Box<dyn EntryRepository>,
    crypto: Box<dyn CryptoEngine>,
    editor: Option<Box<dyn Editor>>,
    scratch: ScratchSource,
    interrupt: InterruptFlag,
    recipient: String,
}

impl Journal {
    /// Assembles a journal from explicit collaborators.
    pub fn new(
        repo: Box<dyn EntryRepository>,
        crypto: Box<dyn CryptoEngine>,
        editor: Box<dyn Editor>,
        scratch_dirs: Vec<PathBuf>,
        interrupt: InterruptFlag,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            repo,
            crypto,
            editor: Some(editor),
            scratch: ScratchSource::Candidates(scratch_dirs),
            interrupt,
            recipient: recipient.into(),
        }
    }

    /// Opens the repository named by `config` for reading and deleting.
    ///
    /// The editor setting is not consulted, and no signal handler is involved.
    ///
    /// # Errors
    ///
    /// `RepoError::NotInitialized` when there is no repository or it lacks a
    /// recipient key id.
    pub fn open(config: &Config) -> AppResult<Self> {
        let (repo, crypto, recipient) = open_parts(config)?;
        Ok(Self {
            repo: Box::new(repo),
            crypto,
            editor: None,
            scratch: ScratchSource::Candidates(config.scratch_dirs.clone()),
            interrupt: InterruptFlag::detached(),
            recipient,
        })
    }

    /// Opens the repository for `create` and `edit`, with the configured editor.
    ///
    /// `interrupt` also ends waits for the repository lock.
    ///
    /// # Errors
    ///
    /// - `AppError::Config` when the editor command is invalid
    /// - `RepoError::NotInitialized` as for [`Journal::open`]
    pub fn open_for_editing(config: &Config, interrupt: InterruptFlag) -> AppResult<Self> {
        let editor_cmd = config.editor_command()?.to_string();
        let (repo, crypto, recipient) = open_parts(config)?;

        Ok(Self::new(
            Box::new(repo.with_interrupt(interrupt.clone())),
            crypto,
            Box::new(SystemEditor { editor_cmd }),
            config.scratch_dirs.clone(),
            interrupt,
            recipient,
        ))
    }

    /// Uses `area` for scratch files instead of probing candidates.
    pub fn with_scratch_area(mut self, area: ScratchArea) -> Self {
        self.scratch = ScratchSource::Fixed(area);
        self
    }

    /// The key id entries are encrypted for.
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    fn editor(&self) -> AppResult<&dyn Editor> {
        self.editor.as_deref().ok_or_else(|| {
            AppError::Config("This journal was opened without an editor".to_string())
        })
    }

    fn scratch_area(&self) -> AppResult<ScratchArea> {
        match &self.scratch {
            ScratchSource::Candidates(dirs) => ScratchArea::locate(dirs),
            ScratchSource::Fixed(area) => Ok(area.clone()),
        }
    }

    /// Fails with `Interrupted` if a signal arrived and the editor did not
    /// finish normally.
    ///
    /// Terminal interrupts also reach editors that handle them themselves
    /// (vim uses Ctrl-C as a key), so a raised flag alone is not enough.
    fn check_interrupted(&self, edited: &EditResult) -> AppResult<()> {
        if self.interrupt.is_raised() && !edited.exited_cleanly() {
            warn!("Interrupted while editing; discarding the entry");
            return Err(AppError::Interrupted);
        }
        Ok(())
    }
}

fn open_parts(config: &Config) -> AppResult<(GitRepository, Box<dyn CryptoEngine>, String)> {
    let repo = GitRepository::open(&config.repo_dir)?;
    let recipient = read_recipient(&repo, config)?;
    let crypto = engine_for(&recipient, config);
    debug!("Using {} engine", crypto.name());
    Ok((repo, crypto, recipient))
}

fn read_recipient(repo: &GitRepository, config: &Config) -> AppResult<String> {
    let not_initialized = || -> AppError {
        RepoError::NotInitialized {
            path: config.repo_dir.clone(),
        }
        .into()
    };

    let raw = match repo.read_tracked(KEY_ID_FILE_NAME) {
        Ok(raw) => raw,
        Err(AppError::Repo(RepoError::NotFound { .. })) => return Err(not_initialized()),
        Err(e) => return Err(e),
    };
    let recipient = String::from_utf8_lossy(&raw).trim().to_string();
    if recipient.is_empty() {
        return Err(not_initialized());
    }
    Ok(recipient)
}

#[cfg(test)]
pub(crate) mod test_support {
    //! In-memory collaborators for workflow tests.

    use super::*;
    use crate::errors::{CryptoError, EditorError};
    use crate::journal_core::EntryId;
    use crate::repo::WriteMode;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::fs;
    use std::io;
    use std::path::Path;
    use std::rc::Rc;
    use tempfile::TempDir;
    use zeroize::Zeroizing;

    /// Tracked files plus the commit log, shared with the test body.
    #[derive(Default)]
    pub struct RepoState {
        pub files: Vec<(String, Vec<u8>)>,
        pub commits: Vec<String>,
        pub fail_commits: bool,
    }

    #[derive(Clone, Default)]
    pub struct FakeRepository {
        pub state: Rc<RefCell<RepoState>>,
    }

    impl FakeRepository {
        pub fn tracked(&self, path: &str) -> Option<Vec<u8>> {
            self.state
                .borrow()
                .files
                .iter()
                .find(|(p, _)| p == path)
                .map(|(_, b)| b.clone())
        }

        pub fn commits(&self) -> Vec<String> {
            self.state.borrow().commits.clone()
        }
    }

    impl EntryRepository for FakeRepository {
        fn write_and_commit(
            &self,
            path: &str,
            bytes: &[u8],
            message: &str,
            mode: WriteMode,
        ) -> AppResult<()> {
            let mut state = self.state.borrow_mut();
            let existing = state.files.iter().position(|(p, _)| p == path);
            match (mode, existing) {
                (WriteMode::CreateNew, Some(_)) => {
                    return Err(RepoError::EntryExists {
                        path: path.to_string(),
                    }
                    .into())
                }
                (WriteMode::Replace, None) => {
                    return Err(RepoError::NotFound {
                        path: path.to_string(),
                    }
                    .into())
                }
                _ => {}
            }
            if state.fail_commits {
                return Err(RepoError::CommitFailed {
                    path: path.to_string(),
                    reason: "disk full".to_string(),
                }
                .into());
            }
            match existing {
                Some(i) => state.files[i].1 = bytes.to_vec(),
                None => state.files.push((path.to_string(), bytes.to_vec())),
            }
            state.commits.push(message.to_string());
            Ok(())
        }

        fn remove_and_commit(&self, path: &str, message: &str) -> AppResult<()> {
            let mut state = self.state.borrow_mut();
            let before = state.files.len();
            state.files.retain(|(p, _)| p != path);
            if state.files.len() == before {
                return Err(RepoError::NotFound {
                    path: path.to_string(),
                }
                .into());
            }
            state.commits.push(message.to_string());
            Ok(())
        }

        fn read_tracked(&self, path: &str) -> AppResult<Vec<u8>> {
            self.tracked(path).ok_or_else(|| {
                RepoError::NotFound {
                    path: path.to_string(),
                }
                .into()
            })
        }

        fn list_entries(&self) -> AppResult<Vec<EntryId>> {
            Ok(self
                .state
                .borrow()
                .files
                .iter()
                .filter(|(p, _)| EntryId::is_entry_file_name(p))
                .filter_map(|(p, _)| EntryId::parse(p).ok())
                .collect())
        }

        fn is_tracked(&self, path: &str) -> AppResult<bool> {
            Ok(self.tracked(path).is_some())
        }
    }

    /// Reversible stand-in cipher: prefixes the recipient and reverses bytes.
    pub struct FakeCrypto {
        pub fail_encrypt: bool,
    }

    impl CryptoEngine for FakeCrypto {
        fn encrypt(&self, recipient: &str, plaintext: &[u8]) -> AppResult<Vec<u8>> {
            if self.fail_encrypt {
                return Err(CryptoError::EncryptionFailed {
                    engine: "fake".to_string(),
                    reason: "no public key".to_string(),
                }
                .into());
            }
            let mut out = format!("{}:", recipient).into_bytes();
            out.extend(plaintext.iter().rev());
            Ok(out)
        }

        fn decrypt(&self, ciphertext: &[u8]) -> AppResult<Zeroizing<Vec<u8>>> {
            let split = ciphertext.iter().position(|&b| b == b':').ok_or_else(|| {
                AppError::from(CryptoError::DecryptionFailed {
                    engine: "fake".to_string(),
                    reason: "not fake ciphertext".to_string(),
                })
            })?;
            Ok(Zeroizing::new(
                ciphertext[split + 1..].iter().rev().copied().collect(),
            ))
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    /// What a scripted editor does on each call.
    pub enum EditorStep {
        Write(&'static str),
        Keep,
        Remove,
        FailLaunch,
        Crash(&'static str),
    }

    /// Editor following a script and recording the paths and contents it saw.
    #[derive(Clone, Default)]
    pub struct ScriptedEditor {
        pub steps: Rc<RefCell<VecDeque<EditorStep>>>,
        pub seen: Rc<RefCell<Vec<(PathBuf, Vec<u8>)>>>,
    }

    impl ScriptedEditor {
        pub fn new(steps: Vec<EditorStep>) -> Self {
            Self {
                steps: Rc::new(RefCell::new(steps.into())),
                seen: Rc::default(),
            }
        }
    }

    impl Editor for ScriptedEditor {
        fn edit(&self, path: &Path) -> AppResult<EditResult> {
            let before = fs::read(path)?;
            self.seen.borrow_mut().push((path.to_path_buf(), before));

            let step = self.steps.borrow_mut().pop_front().unwrap_or(EditorStep::Keep);
            let clean = match step {
                EditorStep::Write(text) => {
                    fs::write(path, text)?;
                    true
                }
                EditorStep::Keep => true,
                EditorStep::Remove => {
                    fs::remove_file(path)?;
                    true
                }
                EditorStep::FailLaunch => {
                    return Err(EditorError::CommandNotFound {
                        command: "scripted".to_string(),
                        source: io::Error::new(io::ErrorKind::NotFound, "missing"),
                    }
                    .into())
                }
                EditorStep::Crash(text) => {
                    fs::write(path, text)?;
                    false
                }
            };

            let contents = match fs::read(path) {
                Ok(bytes) => Zeroizing::new(bytes),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Zeroizing::new(Vec::new()),
                Err(e) => return Err(e.into()),
            };
            Ok(if clean {
                EditResult::new(contents)
            } else {
                EditResult::after_failed_exit(contents)
            })
        }
    }

    /// A journal over fakes with scratch files in a temp directory.
    pub struct Harness {
        pub journal: Journal,
        pub repo: FakeRepository,
        pub editor: ScriptedEditor,
        pub interrupt: InterruptFlag,
        pub scratch_dir: TempDir,
    }

    impl Harness {
        pub fn new(steps: Vec<EditorStep>) -> Self {
            Self::with_crypto(steps, FakeCrypto { fail_encrypt: false })
        }

        pub fn with_crypto(steps: Vec<EditorStep>, crypto: FakeCrypto) -> Self {
            let repo = FakeRepository::default();
            repo.write_and_commit(".key_id", b"ABCD1234\n", "Add .key_id", WriteMode::CreateNew)
                .unwrap();
            let editor = ScriptedEditor::new(steps);
            let interrupt = InterruptFlag::detached();
            let scratch_dir = tempfile::tempdir().unwrap();

            let journal = Journal::new(
                Box::new(repo.clone()),
                Box::new(crypto),
                Box::new(editor.clone()),
                Vec::new(),
                interrupt.clone(),
                "ABCD1234",
            )
            .with_scratch_area(ScratchArea::unverified(scratch_dir.path()));

            Self {
                journal,
                repo,
                editor,
                interrupt,
                scratch_dir,
            }
        }

        /// Files left in the scratch directory.
        pub fn scratch_leftovers(&self) -> Vec<PathBuf> {
            fs::read_dir(self.scratch_dir.path())
                .unwrap()
                .map(|e| e.unwrap().path())
                .collect()
        }

        /// Stores an entry directly, encrypted with the fake cipher.
        pub fn seed(&self, id: &str, plaintext: &str) {
            let ciphertext = FakeCrypto { fail_encrypt: false }
                .encrypt("ABCD1234", plaintext.as_bytes())
                .unwrap();
            self.repo
                .write_and_commit(id, &ciphertext, &format!("Add {}", id), WriteMode::CreateNew)
                .unwrap();
        }
    }
}
