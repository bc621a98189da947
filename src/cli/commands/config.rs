//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{CacheIsolation, Config, ConfigManager, LOCAL_CONFIG_NAME};
use crate::error::{ConvcacheError, ConvcacheResult};
use crate::ui::{self, UiContext};
use std::path::Path;
use tokio::fs;

const VALID_KEYS: [&str; 4] = [
    "general.verbose",
    "general.log_format",
    "cache.isolation",
    "cache.memoize",
];

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> ConvcacheResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => show_path(manager),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value, local }) => {
            if local {
                let cwd = std::env::current_dir()
                    .map_err(|e| ConvcacheError::io("getting current directory", e))?;
                set_local_value(&cwd.join(LOCAL_CONFIG_NAME), &key, &value).await?
            } else {
                set_value(manager, config, &key, &value).await?
            }
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> ConvcacheResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

async fn init_config(manager: &ConfigManager, force: bool) -> ConvcacheResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;

    ui::step_ok_detail(
        &ctx,
        "Configuration initialized",
        &path.display().to_string(),
    );

    Ok(())
}

async fn set_value(
    manager: &ConfigManager,
    config: &Config,
    key: &str,
    value: &str,
) -> ConvcacheResult<()> {
    let ctx = UiContext::detect();
    let mut config = config.clone();

    match key {
        "general.verbose" => config.general.verbose = parse_bool(value)?,
        "general.log_format" => config.general.log_format = parse_log_format(value)?,
        "cache.isolation" => config.cache.isolation = parse_isolation(value)?,
        "cache.memoize" => config.cache.memoize = parse_bool(value)?,
        _ => {
            ui::step_error_detail(&ctx, "Unknown config key", key);
            ui::remark(&ctx, "Valid keys:");
            print_valid_keys();
            return Err(ConvcacheError::User(format!("Unknown config key: {}", key)));
        }
    }

    manager.save(&config).await?;
    ui::step_ok(&ctx, &format!("Set {} = {}", key, value));

    Ok(())
}

/// Write a single key to a project-local config, keeping its other keys
async fn set_local_value(path: &Path, key: &str, value: &str) -> ConvcacheResult<()> {
    let ctx = UiContext::detect();
    let toml_value = typed_value(key, value)?;

    let mut doc: toml::Table = if path.exists() {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| ConvcacheError::io(format!("reading {}", path.display()), e))?;
        content
            .parse()
            .map_err(|e: toml::de::Error| ConvcacheError::ConfigInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
    } else {
        toml::Table::new()
    };

    set_toml_value(&mut doc, key, toml_value)?;

    let content = toml::to_string_pretty(&doc)?;
    fs::write(path, content)
        .await
        .map_err(|e| ConvcacheError::io(format!("writing {}", path.display()), e))?;

    ui::step_ok(
        &ctx,
        &format!("Set {} = {} in {}", key, value, path.display()),
    );

    Ok(())
}

/// Validate a key and convert its value to the TOML type stored for it
fn typed_value(key: &str, value: &str) -> ConvcacheResult<toml::Value> {
    match key {
        "general.verbose" | "cache.memoize" => Ok(toml::Value::Boolean(parse_bool(value)?)),
        "general.log_format" => Ok(toml::Value::String(parse_log_format(value)?)),
        "cache.isolation" => {
            parse_isolation(value)?;
            Ok(toml::Value::String(value.to_string()))
        }
        _ => Err(ConvcacheError::User(format!("Unknown config key: {}", key))),
    }
}

/// Set a `section.key` path, creating the section table if needed
fn set_toml_value(doc: &mut toml::Table, key: &str, value: toml::Value) -> ConvcacheResult<()> {
    let (section, leaf) = key
        .split_once('.')
        .ok_or_else(|| ConvcacheError::User(format!("Expected section.key, got: {}", key)))?;

    let table = doc
        .entry(section)
        .or_insert_with(|| toml::Value::Table(toml::Table::new()))
        .as_table_mut()
        .ok_or_else(|| ConvcacheError::User(format!("Expected table at key: {}", section)))?;

    table.insert(leaf.to_string(), value);
    Ok(())
}

fn parse_bool(value: &str) -> ConvcacheResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConvcacheError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_log_format(value: &str) -> ConvcacheResult<String> {
    match value {
        "text" | "json" => Ok(value.to_string()),
        _ => Err(ConvcacheError::User(format!(
            "Invalid log format: {}. Use text/json",
            value
        ))),
    }
}

fn parse_isolation(value: &str) -> ConvcacheResult<CacheIsolation> {
    match value {
        "thread" => Ok(CacheIsolation::Thread),
        "session" => Ok(CacheIsolation::Session),
        _ => Err(ConvcacheError::User(format!(
            "Invalid isolation: {}. Use thread/session",
            value
        ))),
    }
}

fn print_valid_keys() {
    for key in VALID_KEYS {
        eprintln!("  {}", key);
    }
}
