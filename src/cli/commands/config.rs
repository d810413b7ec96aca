//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager, RemoteConfig};
use crate::error::{TierError, TierResult};
use crate::ui::{self, UiContext};
use std::path::PathBuf;

/// Execute the config command
///
/// `config` is the effective configuration (file plus command-line
/// overrides); `set` edits the file contents only.
pub fn execute(args: ConfigArgs, config: &Config, manager: &ConfigManager) -> TierResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => show_path(manager),
        Some(ConfigAction::Init { force }) => init_config(manager, force)?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, &key, &value)?,
    }

    Ok(())
}

fn show_config(config: &Config) -> TierResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

fn init_config(manager: &ConfigManager, force: bool) -> TierResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn(
            &ctx,
            &format!(
                "Config already exists at {} (use --force to overwrite)",
                path.display()
            ),
        );
        return Ok(());
    }

    manager.save(&Config::default())?;
    ui::step_ok(
        &ctx,
        &format!("Configuration initialized at {}", path.display()),
    );

    Ok(())
}

fn set_value(manager: &ConfigManager, key: &str, value: &str) -> TierResult<()> {
    let ctx = UiContext::detect();
    let mut config = manager.load()?;

    apply_value(&mut config, key, value)?;

    manager.save(&config)?;
    ui::step_ok(&ctx, &format!("Set {} = {}", key, value));

    Ok(())
}

/// Apply a dot-separated key to a configuration
fn apply_value(config: &mut Config, key: &str, value: &str) -> TierResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => match value {
            "text" | "json" => config.general.log_format = value.to_string(),
            _ => {
                return Err(TierError::User(format!(
                    "Invalid log format: {}. Use text/json",
                    value
                )))
            }
        },

        ["remote"] => config.remote = Some(RemoteConfig::from_location(value)),
        ["remote", "timeout_secs"] => match config.remote.as_mut() {
            Some(RemoteConfig::Http { timeout_secs, .. }) => *timeout_secs = parse_u64(value)?,
            _ => {
                return Err(TierError::User(
                    "remote.timeout_secs applies to an http remote only".to_string(),
                ))
            }
        },

        ["local", "path"] => config.local.path = Some(PathBuf::from(value)),

        ["cache", "lazy"] => config.cache.lazy = parse_bool(value)?,
        ["cache", "chunk_size"] => {
            let size = parse_u64(value)?;
            if size == 0 {
                return Err(TierError::User("cache.chunk_size must be positive".to_string()));
            }
            config.cache.chunk_size = usize::try_from(size)
                .map_err(|_| TierError::User(format!("Invalid chunk size: {}", value)))?;
        }
        ["cache", "persist_state"] => config.cache.persist_state = parse_bool(value)?,
        ["cache", "state_file"] => config.cache.state_file = Some(PathBuf::from(value)),

        _ => {
            return Err(TierError::User(format!(
                "Unknown config key: {}. Valid keys: {}",
                key,
                VALID_KEYS.join(", ")
            )))
        }
    }

    Ok(())
}

const VALID_KEYS: [&str; 8] = [
    "general.log_format",
    "remote",
    "remote.timeout_secs",
    "local.path",
    "cache.lazy",
    "cache.chunk_size",
    "cache.persist_state",
    "cache.state_file",
];

fn parse_bool(value: &str) -> TierResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(TierError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_u64(value: &str) -> TierResult<u64> {
    value
        .parse()
        .map_err(|_| TierError::User(format!("Invalid number: {}", value)))
}
