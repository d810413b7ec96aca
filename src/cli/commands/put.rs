//! Put command - write an object to the remote store

use crate::cli::args::PutArgs;
use crate::config::Config;
use crate::error::{TierError, TierResult};
use crate::factory::create_cached_storage;
use crate::storage::Storage;
use crate::ui::{self, UiContext};
use std::fs::File;
use std::io::{self, BufReader};

/// Execute the put command
pub fn execute(args: PutArgs, config: &Config) -> TierResult<()> {
    let ctx = UiContext::detect();
    let store = create_cached_storage(config)?;

    let mut output = store.open_output_stream(&args.id)?;

    let written = match &args.file {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| TierError::io(format!("opening {}", path.display()), e))?;
            io::copy(&mut BufReader::new(file), &mut output)
                .map_err(|e| TierError::io(format!("uploading {}", path.display()), e))?
        }
        None => io::copy(&mut io::stdin().lock(), &mut output)
            .map_err(|e| TierError::io("uploading stdin", e))?,
    };

    output.close()?;
    ui::step_ok(&ctx, &format!("Stored {} ({} bytes)", args.id, written));

    if args.purge {
        if store.purge(&args.id)? {
            ui::step_info(&ctx, &format!("Dropped stale local copy of {}", args.id));
        }
    } else if store.is_fully_cached(&args.id)? {
        ui::step_warn(
            &ctx,
            &format!(
                "{} is still cached locally with its previous content; run: tiercache purge {}",
                args.id, args.id
            ),
        );
    }

    Ok(())
}
