//! Status command - report where objects live

use crate::cache::CachedStorage;
use crate::cli::args::{OutputFormat, StatusArgs};
use crate::config::Config;
use crate::error::TierResult;
use crate::factory::{create_cached_storage, local_dir};
use crate::storage::{DirectoryStorage, Storage};
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;
use std::fmt;

/// Where an object currently lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectState {
    /// Complete local copy recorded by the tracker
    Cached,
    /// Local bytes exist but are not recorded as complete
    Partial,
    /// Only the remote store has it
    Remote,
    /// Neither store has it
    Missing,
}

impl ObjectState {
    fn classify(cached: bool, local: bool, remote: bool) -> Self {
        match (cached, local, remote) {
            (true, _, _) => Self::Cached,
            (false, true, _) => Self::Partial,
            (false, false, true) => Self::Remote,
            (false, false, false) => Self::Missing,
        }
    }
}

impl fmt::Display for ObjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cached => write!(f, "cached"),
            Self::Partial => write!(f, "partial"),
            Self::Remote => write!(f, "remote"),
            Self::Missing => write!(f, "missing"),
        }
    }
}

#[derive(Debug, Serialize)]
struct ObjectStatus {
    id: String,
    state: ObjectState,
    local: bool,
    remote: bool,
}

/// Execute the status command
pub fn execute(args: StatusArgs, config: &Config) -> TierResult<()> {
    let store = create_cached_storage(config)?;

    let ids = if args.ids.is_empty() {
        store.states().cached_ids(&**store.local())?
    } else {
        args.ids
    };

    let statuses = ids
        .into_iter()
        .map(|id| object_status(&store, id))
        .collect::<TierResult<Vec<_>>>()?;

    match args.format {
        OutputFormat::Table => print_table(&store, config, &statuses)?,
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&statuses)?),
        OutputFormat::Plain => {
            for status in &statuses {
                println!("{}\t{}", status.id, status.state);
            }
        }
    }

    Ok(())
}

fn object_status(store: &CachedStorage, id: String) -> TierResult<ObjectStatus> {
    let cached = store.is_fully_cached(&id)?;
    let local = store.local().contains(&id)?;
    let remote = store.remote().contains(&id)?;

    Ok(ObjectStatus {
        state: ObjectState::classify(cached, local, remote),
        id,
        local,
        remote,
    })
}

fn print_table(store: &CachedStorage, config: &Config, statuses: &[ObjectStatus]) -> TierResult<()> {
    let ctx = UiContext::detect();
    let dir = local_dir(config);
    let size = DirectoryStorage::open(&dir)?.size_bytes()?;

    println!("{}", style("tiercache status").bold().cyan());
    ui::key_value(&ctx, "Remote", store.remote().name());
    ui::key_value(&ctx, "Local", &dir.display().to_string());
    ui::key_value(&ctx, "Local size", &format_bytes(size));
    ui::key_value_status(
        &ctx,
        "Caching",
        if store.lazy_caching() { "lazy" } else { "on read" },
        !store.lazy_caching(),
    );
    println!();

    if statuses.is_empty() {
        println!("No cached objects.");
        return Ok(());
    }

    println!("{:<40} {:<10} {:<8} {:<8}", "ID", "STATE", "LOCAL", "REMOTE");
    println!("{}", "-".repeat(68));

    for status in statuses {
        let state_display = match status.state {
            ObjectState::Cached => style(status.state.to_string()).green().to_string(),
            ObjectState::Partial => style(status.state.to_string()).yellow().to_string(),
            ObjectState::Remote => style(status.state.to_string()).dim().to_string(),
            ObjectState::Missing => style(status.state.to_string()).red().to_string(),
        };

        println!(
            "{:<40} {:<10} {:<8} {:<8}",
            status.id,
            state_display,
            yes_no(status.local),
            yes_no(status.remote)
        );
    }

    println!();
    println!("Total: {} object(s)", statuses.len());
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_prefers_tracker() {
        assert_eq!(ObjectState::classify(true, true, false), ObjectState::Cached);
        assert_eq!(ObjectState::classify(false, true, true), ObjectState::Partial);
        assert_eq!(ObjectState::classify(false, false, true), ObjectState::Remote);
        assert_eq!(ObjectState::classify(false, false, false), ObjectState::Missing);
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MiB");
    }

    #[test]
    fn status_serializes_lowercase() {
        let status = ObjectStatus {
            id: "a".to_string(),
            state: ObjectState::Remote,
            local: false,
            remote: true,
        };
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"state\":\"remote\""));
    }
}
