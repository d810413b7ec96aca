//! Cache command - populate the local tier ahead of use

use crate::cli::args::IdsArgs;
use crate::config::Config;
use crate::error::{TierError, TierResult};
use crate::factory::create_cached_storage;
use crate::ui::{self, TaskSpinner, UiContext};
use tracing::warn;

/// Execute the cache command
pub fn execute(args: IdsArgs, config: &Config) -> TierResult<()> {
    let ctx = UiContext::detect();
    let store = create_cached_storage(config)?;

    let mut failed = 0;
    for id in &args.ids {
        if store.is_fully_cached(id)? {
            ui::step_info(&ctx, &format!("{} already cached", id));
            continue;
        }

        let mut spinner = TaskSpinner::new(&ctx);
        spinner.start(&format!("Caching {}...", id));
        match store.cache(id) {
            Ok(()) => spinner.stop(&format!("Cached {}", id)),
            Err(e) => {
                warn!("Caching {} failed: {}", id, e);
                spinner.stop_error(&format!("{}: {}", id, e));
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(TierError::User(format!(
            "{} of {} object(s) could not be cached",
            failed,
            args.ids.len()
        )));
    }

    Ok(())
}
