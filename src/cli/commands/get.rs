//! Get command - read an object through the cache

use crate::cli::args::GetArgs;
use crate::config::Config;
use crate::error::{TierError, TierResult};
use crate::factory::create_cached_storage;
use crate::storage::Storage;
use crate::ui::{self, UiContext};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing::debug;

/// Execute the get command
pub fn execute(args: GetArgs, config: &Config) -> TierResult<()> {
    let ctx = UiContext::detect();
    let store = create_cached_storage(config)?;

    let from_local = store.is_fully_cached(&args.id)?;
    debug!(
        "Reading {} from {}",
        args.id,
        if from_local { "local cache" } else { "remote" }
    );

    let mut input = store.open_input_stream(&args.id)?;

    let copied = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| TierError::io(format!("creating {}", path.display()), e))?;
            let mut writer = BufWriter::new(file);
            io::copy(&mut input, &mut writer)
                .and_then(|n| writer.flush().map(|()| n))
                .map_err(|e| TierError::io(format!("writing {}", path.display()), e))?
        }
        None => {
            let mut stdout = io::stdout().lock();
            io::copy(&mut input, &mut stdout)
                .and_then(|n| stdout.flush().map(|()| n))
                .map_err(|e| TierError::io(format!("copying {} to stdout", args.id), e))?
        }
    };

    input.close()?;

    if let Some(path) = &args.output {
        ui::step_ok(
            &ctx,
            &format!("Wrote {} bytes to {}", copied, path.display()),
        );
    }

    Ok(())
}
