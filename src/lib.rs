/*!
# Deary

Deary is an encrypted diary kept in a git repository. Entries are written in
your editor, encrypted for a single gpg key or age recipient, and committed one
file per entry, named after the UTC second they were created.

## Core Features

- `init`: create a diary bound to a key id
- `create`: write a new entry; an empty entry is discarded
- `list` / `show`: browse and decrypt entries
- `edit` / `delete`: rewrite or remove an entry, one commit each
- Plaintext only touches a memory-backed scratch file, wiped on every exit path

## Architecture

- `cli`: Command-line interface using clap
- `config`: Configuration loading and validation
- `constants`: Application-wide constants
- `crypto`: age and gpg engines, scratch files
- `editor`: External editor sessions
- `errors`: Error handling infrastructure
- `interrupt`: SIGINT/SIGTERM flag
- `journal_core`: Entry identifiers
- `logging`: tracing subscriber setup
- `ops`: The entry lifecycle operations
- `repo`: git-backed storage and locking

## Usage Example

```rust,no_run
use deary::interrupt::InterruptFlag;
use deary::ops::{self, CreateOutcome, Journal};
use deary::Config;

fn main() -> deary::AppResult<()> {
    let config = Config::load()?;
    let journal = Journal::open_for_editing(&config, InterruptFlag::install())?;

    match ops::create_entry(&journal)? {
        CreateOutcome::Committed(id) => println!("saved {}", id),
        CreateOutcome::Abandoned => println!("nothing written"),
    }
    Ok(())
}
```
*/

/// Command-line interface for parsing user arguments
pub mod cli;
/// Configuration loading and management
pub mod config;
/// Application-wide constants
pub mod constants;
pub mod crypto;
pub mod editor;
/// Error types and utilities for error handling
pub mod errors;
pub mod interrupt;
pub mod journal_core;
pub mod logging;
pub mod ops;
pub mod repo;

// Re-export important types for convenience
pub use cli::CliArgs;
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use journal_core::EntryId;
