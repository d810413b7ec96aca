//! Clear command - empty the local cache and the remote store

use crate::cli::args::ClearArgs;
use crate::config::Config;
use crate::error::{TierError, TierResult};
use crate::factory::create_cached_storage;
use crate::storage::Storage;
use crate::ui::{self, UiContext};
use console::style;
use std::io::{self, Write};

/// Execute the clear command
pub fn execute(args: ClearArgs, config: &Config) -> TierResult<()> {
    let ctx = UiContext::detect();
    let store = create_cached_storage(config)?;

    eprintln!("This will remove every object from:");
    eprintln!("  {} {}", style("•").red(), store.local().name());
    eprintln!("  {} {}", style("•").red(), store.remote().name());

    if !args.yes {
        if !ctx.is_interactive() {
            return Err(TierError::User(
                "Refusing to clear without confirmation; pass --yes".to_string(),
            ));
        }

        eprint!("Are you sure? [y/N] ");
        let _ = io::stderr().flush();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            eprintln!("Failed to read input, aborting.");
            return Ok(());
        }

        if !input.trim().eq_ignore_ascii_case("y") {
            eprintln!("Aborted.");
            return Ok(());
        }
    }

    store.delete_all()?;
    ui::step_ok(&ctx, "Cleared local cache and remote store");

    Ok(())
}
