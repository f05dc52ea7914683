#![allow(dead_code)]

use age::secrecy::ExposeSecret;
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway diary home: repository location, age identity, editor scripts
/// and a memory-backed scratch directory.
pub struct TestDiary {
    pub home: TempDir,
    pub scratch: TempDir,
    pub recipient: String,
}

impl TestDiary {
    /// Returns `None` when this machine has no memory-backed /dev/shm.
    pub fn new() -> Option<Self> {
        let scratch = shm_scratch_dir()?;
        let home = TempDir::new().expect("create temp home");

        let identity = age::x25519::Identity::generate();
        let recipient = identity.to_public().to_string();
        fs::write(
            home.path().join("identity.txt"),
            identity.to_string().expose_secret(),
        )
        .expect("write identity");

        Some(Self {
            home,
            scratch,
            recipient,
        })
    }

    pub fn repo_dir(&self) -> PathBuf {
        self.home.path().join("diary")
    }

    pub fn identity_path(&self) -> PathBuf {
        self.home.path().join("identity.txt")
    }

    /// Writes an executable editor script running `body` with the file as `$1`.
    pub fn editor(&self, name: &str, body: &str) -> String {
        write_script(self.home.path(), name, body)
    }

    /// Editor replacing the file contents with `text`.
    pub fn writing_editor(&self, text: &str) -> String {
        let name = format!("write-{}", blake_name(text));
        self.editor(&name, &format!("printf '%s' '{}' > \"$1\"", text))
    }

    /// Files left in the scratch directory.
    pub fn scratch_leftovers(&self) -> Vec<PathBuf> {
        fs::read_dir(self.scratch.path())
            .expect("read scratch dir")
            .map(|e| e.expect("dir entry").path())
            .collect()
    }

    /// `deary` with a clean environment pointing at this diary.
    pub fn command(&self, editor: &str) -> Command {
        Command::from_std(self.std_command(editor))
    }

    /// Same as [`TestDiary::command`], for tests that need to spawn.
    pub fn std_command(&self, editor: &str) -> std::process::Command {
        let mut cmd = std::process::Command::new(assert_cmd::cargo::cargo_bin("deary"));
        cmd.env_clear();
        if let Ok(path) = std::env::var("PATH") {
            cmd.env("PATH", path);
        }
        cmd.env("HOME", self.home.path())
            .env("DEARY_DIR", self.repo_dir())
            .env("DEARY_EDITOR", editor)
            .env("DEARY_SCRATCH_DIR", self.scratch.path())
            .env("DEARY_AGE_IDENTITY", self.identity_path());
        cmd
    }

    /// Runs `deary init` with this diary's age recipient.
    pub fn init(&self) {
        self.command("true")
            .arg("init")
            .arg(&self.recipient)
            .assert()
            .success();
    }

    /// Creates an entry containing `text` and returns its identifier.
    pub fn create(&self, text: &str) -> String {
        let output = self
            .command(&self.writing_editor(text))
            .arg("create")
            .output()
            .expect("run deary create");
        assert!(
            output.status.success(),
            "create failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout)
            .expect("utf8 id")
            .trim()
            .to_string()
    }

    /// Identifiers printed by `deary list`.
    pub fn list(&self) -> Vec<String> {
        let output = self
            .command("true")
            .arg("list")
            .output()
            .expect("run deary list");
        assert!(output.status.success());
        String::from_utf8(output.stdout)
            .expect("utf8 list")
            .lines()
            .map(str::to_string)
            .collect()
    }
}

/// A fresh directory under /dev/shm if that is a memory-backed mount.
pub fn shm_scratch_dir() -> Option<TempDir> {
    let shm = Path::new("/dev/shm");
    if !deary::crypto::scratch::is_memory_backed(shm).unwrap_or(false) {
        eprintln!("skipping: /dev/shm is not memory-backed");
        return None;
    }
    tempfile::Builder::new()
        .prefix("deary-test-")
        .tempdir_in(shm)
        .ok()
}

pub fn write_script(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("write script");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod script");
    }
    path.to_string_lossy().into_owned()
}

fn blake_name(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex()[..12].to_string()
}
