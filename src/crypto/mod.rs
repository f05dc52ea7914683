//! Cryptographic operations for entry encryption and plaintext staging.
//!
//! Entries are encrypted for a single recipient. The engine is chosen from the
//! shape of the recipient identifier stored in the repository: `age1...`
//! recipients are handled natively by the age crate, everything else is handed
//! to gpg as a key id, fingerprint or email address.
//!
//! # Module Structure
//!
//! - `age`: native age x25519 engine
//! - `gpg`: engine driving the gpg executable over pipes
//! - `scratch`: memory-backed scratch files for plaintext during editing
//!
//! # Example
//!
//! ```no_run
//! use deary::crypto::{engine_for, CryptoEngine};
//! use deary::Config;
//!
//! let config = Config::load()?;
//! let engine = engine_for("ABCD1234", &config);
//! let ciphertext = engine.encrypt("ABCD1234", b"Dear diary")?;
//! let plaintext = engine.decrypt(&ciphertext)?;
//! assert_eq!(plaintext.as_slice(), b"Dear diary");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod age;
pub mod gpg;
pub mod scratch;

use crate::config::Config;
use crate::constants::AGE_RECIPIENT_PREFIX;
use crate::errors::AppResult;
use zeroize::Zeroizing;

pub use self::age::AgeEngine;
pub use self::gpg::GpgEngine;
pub use self::scratch::{ScratchArea, ScratchFile};

/// Encryption backend keyed by a recipient identifier.
///
/// Implementations work purely on in-memory buffers; a failed call never leaves
/// partial output anywhere.
pub trait CryptoEngine {
    /// Encrypt `plaintext` so only `recipient` can read it.
    fn encrypt(&self, recipient: &str, plaintext: &[u8]) -> AppResult<Vec<u8>>;

    /// Decrypt `ciphertext` with the locally available private key.
    fn decrypt(&self, ciphertext: &[u8]) -> AppResult<Zeroizing<Vec<u8>>>;

    /// Human-readable name of this backend (e.g. "age", "gpg").
    fn name(&self) -> &str;
}

/// Picks the engine able to encrypt for `recipient`.
pub fn engine_for(recipient: &str, config: &Config) -> Box<dyn CryptoEngine> {
    if recipient.trim().starts_with(AGE_RECIPIENT_PREFIX) {
        Box::new(AgeEngine::new(config.age_identity.clone()))
    } else {
        Box::new(GpgEngine::new())
    }
}
