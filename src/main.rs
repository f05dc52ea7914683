/*!
# Deary - An encrypted diary

Entries are written in an external editor, encrypted for one gpg key or age
recipient and committed to a git repository, one file per entry.

## Usage

```
deary [OPTIONS] <COMMAND>

Commands:
  init    Create a new diary encrypted for a gpg key id or an age recipient
  create  Write a new entry in the editor
  list    List entry identifiers, oldest first
  show    Print a decrypted entry
  edit    Re-edit an existing entry
  delete  Remove an entry
  help    Print this message or the help of the given subcommand(s)

Options:
  -v, --verbose              Print verbose output
      --log-format <FORMAT>  Log output format: text or json
```

## Configuration

- `DEARY_DIR`: Repository location (defaults to ~/.deary)
- `DEARY_EDITOR` or `EDITOR`: Editor command (defaults to "vim")
- `DEARY_SCRATCH_DIR`: Memory-backed directory for plaintext (defaults to /dev/shm)
- `DEARY_AGE_IDENTITY`: age identity file (defaults to ~/.config/deary/identity.txt)
- `DEARY_LOG_FORMAT`, `DEARY_LOG_LEVEL`, `RUST_LOG`: Logging
*/

use clap::Parser;
use deary::cli::{CliArgs, Commands};
use deary::config::Config;
use deary::constants::{TRACING_ROOT_SPAN_NAME, TRACING_SERVICE_NAME};
use deary::errors::AppResult;
use deary::interrupt::InterruptFlag;
use deary::logging::{self, LogFormat};
use deary::ops::{self, CreateOutcome, EditOutcome, Journal};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::{debug, info_span};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let format = match LogFormat::resolve(args.log_format.as_deref()) {
        Ok(format) => format,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(e.exit_code());
        }
    };
    if let Err(e) = logging::init_tracing(format, args.verbose) {
        eprintln!("Error: {}", e);
        return ExitCode::from(e.exit_code());
    }

    let correlation_id = uuid::Uuid::new_v4();
    let span = info_span!(
        TRACING_ROOT_SPAN_NAME,
        service_name = TRACING_SERVICE_NAME,
        correlation_id = %correlation_id
    );
    let _guard = span.enter();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("Command failed: {:?}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

/// Dispatches one subcommand.
fn run(args: CliArgs) -> AppResult<()> {
    debug!("CLI arguments: {:?}", args);
    let config = Config::load()?;
    let open = || Journal::open(&config);
    let open_for_editing = || Journal::open_for_editing(&config, InterruptFlag::install());
    let mut stdout = io::stdout().lock();

    match args.command {
        Commands::Init { key_id } => {
            ops::init_repository(&config.repo_dir, &key_id)?;
            writeln!(stdout, "Initialized diary at {}", config.repo_dir.display())?;
        }
        Commands::Create => match ops::create_entry(&open_for_editing()?)? {
            CreateOutcome::Committed(id) => writeln!(stdout, "{}", id)?,
            CreateOutcome::Abandoned => eprintln!("Entry was empty; nothing saved"),
        },
        Commands::List => {
            for id in ops::list_entries(&open()?)? {
                writeln!(stdout, "{}", id)?;
            }
        }
        Commands::Show { id } => {
            let plaintext = ops::show_entry(&open()?, &id)?;
            stdout.write_all(&plaintext)?;
            if !plaintext.ends_with(b"\n") {
                writeln!(stdout)?;
            }
        }
        Commands::Edit { id } => match ops::edit_entry(&open_for_editing()?, &id)? {
            EditOutcome::Saved => writeln!(stdout, "{}", id)?,
            EditOutcome::Unchanged => eprintln!("No changes to {}", id),
            EditOutcome::Abandoned => eprintln!("Entry {} was emptied; kept the stored version", id),
        },
        Commands::Delete { id } => ops::delete_entry(&open()?, &id)?,
    }

    stdout.flush()?;
    Ok(())
}
