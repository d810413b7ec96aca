//! Purge command - drop local copies

use crate::cli::args::IdsArgs;
use crate::config::Config;
use crate::error::TierResult;
use crate::factory::create_cached_storage;
use crate::ui::{self, UiContext};

/// Execute the purge command
pub fn execute(args: IdsArgs, config: &Config) -> TierResult<()> {
    let ctx = UiContext::detect();
    let store = create_cached_storage(config)?;

    for id in &args.ids {
        if store.purge(id)? {
            ui::step_ok(&ctx, &format!("Purged {}", id));
        } else {
            ui::step_info(&ctx, &format!("{} was not cached locally", id));
        }
    }

    Ok(())
}
