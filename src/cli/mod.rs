//! Command-line interface definitions.

use crate::constants::{APP_DESCRIPTION, APP_NAME};
use crate::journal_core::{EntryId, InvalidEntryId};
use clap::{Parser, Subcommand};

/// An encrypted diary kept in a git repository
#[derive(Parser, Debug)]
#[command(name = APP_NAME, about = APP_DESCRIPTION)]
#[command(author, version, long_about = None)]
pub struct CliArgs {
    /// Print verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Log output format: text or json (defaults to DEARY_LOG_FORMAT, then text)
    #[arg(long, global = true, value_name = "FORMAT")]
    pub log_format: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Diary subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Create a new diary encrypted for a gpg key id or an age recipient
    Init {
        /// gpg key id, fingerprint or email, or an `age1...` recipient
        key_id: String,
    },
    /// Write a new entry in the editor
    Create,
    /// List entry identifiers, oldest first
    List,
    /// Print a decrypted entry
    Show {
        /// Entry identifier as printed by `list`
        #[arg(value_parser = parse_entry_id)]
        id: EntryId,
    },
    /// Re-edit an existing entry
    Edit {
        /// Entry identifier as printed by `list`
        #[arg(value_parser = parse_entry_id)]
        id: EntryId,
    },
    /// Remove an entry
    Delete {
        /// Entry identifier as printed by `list`
        #[arg(value_parser = parse_entry_id)]
        id: EntryId,
    },
}

fn parse_entry_id(raw: &str) -> Result<EntryId, InvalidEntryId> {
    EntryId::parse(raw)
}
