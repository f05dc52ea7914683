//! Core entry naming logic without I/O operations.
//!
//! This module contains the pure logic that ties encrypted files to the moment
//! they were written. An [`EntryId`] is the UTC creation time formatted as
//! `YYYYMMDD-HHMMSS`, which sorts lexicographically in chronological order and
//! doubles as the file name of the ciphertext inside the repository.
//!
//! Identifiers have one second resolution. Two entries created within the same
//! second are told apart by a `-N` suffix (`-2`, `-3`, ...), see
//! [`EntryId::with_suffix`]; the workflow picks the first free candidate while
//! holding the repository lock.

use crate::constants::{ENTRY_ID_FORMAT, MAX_ID_COLLISION_SUFFIX};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Identifier of a single diary entry.
///
/// # Examples
///
/// ```
/// use deary::journal_core::EntryId;
/// use chrono::{TimeZone, Utc};
///
/// let instant = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 5).unwrap();
/// let id = EntryId::from_datetime(instant);
/// assert_eq!(id.as_str(), "20240115-093005");
/// assert_eq!(id.with_suffix(2).as_str(), "20240115-093005-2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(String);

impl EntryId {
    /// Derives the identifier for an entry created at `instant`.
    pub fn from_datetime(instant: DateTime<Utc>) -> Self {
        EntryId(instant.format(ENTRY_ID_FORMAT).to_string())
    }

    /// Identifier for an entry created right now.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Returns this identifier with a collision suffix appended.
    ///
    /// `n` below 2 returns the identifier unchanged, so `with_suffix(1)` is
    /// the first candidate of a collision sequence.
    pub fn with_suffix(&self, n: u32) -> Self {
        if n < 2 {
            return self.clone();
        }
        EntryId(format!("{}-{}", self.base(), n))
    }

    /// Candidate identifiers tried in order when names collide.
    pub fn candidates(&self) -> impl Iterator<Item = EntryId> + '_ {
        (1..=MAX_ID_COLLISION_SUFFIX).map(move |n| self.with_suffix(n))
    }

    /// The timestamp part of the identifier, without any collision suffix.
    pub fn base(&self) -> &str {
        // "YYYYMMDD-HHMMSS" is always 15 ASCII bytes
        self.0.get(..15).unwrap_or(&self.0)
    }

    /// The UTC instant encoded in the identifier, if it is a timestamp identifier.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(self.base(), ENTRY_ID_FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// The identifier as a string slice; also the entry's file name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validates a user supplied identifier.
    ///
    /// Any plain file name is accepted so entries written by older tools with
    /// other naming schemes stay reachable, but names that could address
    /// repository metadata or escape the repository are rejected.
    ///
    /// ```
    /// use deary::journal_core::EntryId;
    ///
    /// assert!(EntryId::parse("20240115-093005").is_ok());
    /// assert!(EntryId::parse(".key_id").is_err());
    /// assert!(EntryId::parse("../outside").is_err());
    /// assert!(EntryId::parse("").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, InvalidEntryId> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidEntryId::Empty);
        }
        if trimmed.starts_with('.') {
            return Err(InvalidEntryId::Hidden(trimmed.to_string()));
        }
        if trimmed.contains(['/', '\\']) || trimmed.contains('\0') {
            return Err(InvalidEntryId::NotAFileName(trimmed.to_string()));
        }
        Ok(EntryId(trimmed.to_string()))
    }

    /// Whether a tracked file name is an entry rather than metadata.
    pub fn is_entry_file_name(name: &str) -> bool {
        !name.is_empty() && !name.starts_with('.') && !name.contains('/')
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntryId {
    type Err = InvalidEntryId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntryId::parse(s)
    }
}

impl AsRef<str> for EntryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reasons a user supplied identifier is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidEntryId {
    /// Nothing was given.
    #[error("entry identifier is empty")]
    Empty,
    /// Dot-files hold repository metadata, not entries.
    #[error("'{0}' names repository metadata, not an entry")]
    Hidden(String),
    /// Separators would address a path outside the repository root.
    #[error("'{0}' is not a plain entry name")]
    NotAFileName(String),
}
