//! Delete command - remove objects everywhere

use crate::cli::args::IdsArgs;
use crate::config::Config;
use crate::error::TierResult;
use crate::factory::create_cached_storage;
use crate::storage::Storage;
use crate::ui::{self, UiContext};

/// Execute the delete command
pub fn execute(args: IdsArgs, config: &Config) -> TierResult<()> {
    let ctx = UiContext::detect();
    let store = create_cached_storage(config)?;

    for id in &args.ids {
        if store.delete(id)? {
            ui::step_ok(&ctx, &format!("Deleted {}", id));
        } else {
            ui::step_warn(&ctx, &format!("{} was not present in both remote and local cache", id));
        }
    }

    Ok(())
}
