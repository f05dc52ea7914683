//! Encryption through the gpg executable.
//!
//! Plaintext and ciphertext travel over pipes; gpg never reads or writes a
//! file, so a failed run cannot leave partial output behind. Decryption is
//! interactive when the private key is protected: gpg-agent asks for the
//! passphrase through pinentry.

use crate::constants::{GPG_OPTS, GPG_PROGRAM};
use crate::crypto::CryptoEngine;
use crate::errors::{AppError, AppResult, CryptoError};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Output, Stdio};
use std::thread;
use tracing::debug;
use zeroize::Zeroizing;

const ENGINE_NAME: &str = "gpg";

/// Engine delegating to `gpg` on PATH.
#[derive(Debug, Default)]
pub struct GpgEngine {
    program: Option<PathBuf>,
}

impl GpgEngine {
    /// Creates an engine that looks up `gpg` on PATH when first used.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine using an explicit gpg binary.
    pub fn with_program(program: PathBuf) -> Self {
        Self {
            program: Some(program),
        }
    }

    fn locate(&self) -> Result<PathBuf, String> {
        match &self.program {
            Some(program) => Ok(program.clone()),
            None => which::which(GPG_PROGRAM)
                .map_err(|e| format!("gpg executable not found in PATH ({})", e)),
        }
    }

    /// Runs gpg with `args`, feeding `input` on stdin and collecting stdout.
    ///
    /// stdin is written from a scoped thread so large inputs cannot deadlock
    /// against gpg filling its stdout pipe.
    fn run(&self, args: &[&str], input: &[u8]) -> Result<Output, String> {
        let program = self.locate()?;
        debug!("Running {} {:?}", program.display(), args);

        let mut child = Command::new(&program)
            .args(GPG_OPTS)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to start {}: {}", program.display(), e))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| "gpg stdin unavailable".to_string())?;

        thread::scope(|scope| {
            let feeder = scope.spawn(move || {
                let result = stdin.write_all(input);
                drop(stdin);
                result
            });
            let output = child
                .wait_with_output()
                .map_err(|e| format!("failed to wait for gpg: {}", e))?;
            // gpg may exit before reading all input; its exit status is what counts.
            if let Ok(Err(e)) = feeder.join() {
                debug!("gpg closed stdin early: {}", e);
            }
            Ok(output)
        })
    }
}

/// First meaningful line of gpg's diagnostics, or the exit status.
fn describe_failure(status: ExitStatus, stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("gpg exited with {}", status))
}

fn encrypt_error(reason: String) -> AppError {
    CryptoError::EncryptionFailed {
        engine: ENGINE_NAME.to_string(),
        reason,
    }
    .into()
}

fn decrypt_error(reason: String) -> AppError {
    CryptoError::DecryptionFailed {
        engine: ENGINE_NAME.to_string(),
        reason,
    }
    .into()
}

impl CryptoEngine for GpgEngine {
    fn encrypt(&self, recipient: &str, plaintext: &[u8]) -> AppResult<Vec<u8>> {
        let recipient = recipient.trim();
        if recipient.is_empty() {
            return Err(encrypt_error("empty recipient".to_string()));
        }

        let output = self
            .run(
                &[
                    "--batch",
                    "--encrypt",
                    "--recipient",
                    recipient,
                    "--output",
                    "-",
                ],
                plaintext,
            )
            .map_err(encrypt_error)?;

        if !output.status.success() || output.stdout.is_empty() {
            return Err(encrypt_error(describe_failure(
                output.status,
                &output.stderr,
            )));
        }
        Ok(output.stdout)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> AppResult<Zeroizing<Vec<u8>>> {
        let output = self
            .run(&["--decrypt", "--output", "-"], ciphertext)
            .map_err(decrypt_error)?;

        let plaintext = Zeroizing::new(output.stdout);
        if !output.status.success() {
            return Err(decrypt_error(describe_failure(
                output.status,
                &output.stderr,
            )));
        }
        Ok(plaintext)
    }

    fn name(&self) -> &str {
        ENGINE_NAME
    }
}
