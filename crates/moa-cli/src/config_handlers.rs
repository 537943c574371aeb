//! Handlers for the `moa config` subcommands.
//!
//! The `cmd_config_*` functions are generic over [`ConfigManager`], so they
//! only depend on how a config type loads, serializes, and exports itself.
//! The dotted-key TOML helpers below them work on plain [`toml::Value`] trees.

use std::path::PathBuf;

use moa_core::{ConfigManager, Error, MoaConfig, Result};

use crate::cli::ConfigAction;

// ============================================================================
// Command dispatch
// ============================================================================

pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path::<MoaConfig>(config_path),
        ConfigAction::Get { key } => cmd_config_get::<MoaConfig>(config_path, &key),
        ConfigAction::Set { key, value } => cmd_config_set::<MoaConfig>(config_path, &key, &value),
        ConfigAction::Init { file, force } => cmd_config_init::<MoaConfig>(file.as_deref(), force),
        ConfigAction::Export { docker_env } => {
            let config = MoaConfig::load(config_path)?;
            cmd_config_export(&config, docker_env)
        }
    }
}

// ============================================================================
// Generic command handlers
// ============================================================================

/// Show the resolved config file path.
pub fn cmd_config_path<C: ConfigManager>(config_path: Option<&str>) -> Result<()> {
    let path = C::resolve_config_path(config_path).ok_or_else(|| {
        Error::config("Could not determine config directory for this platform")
    })?;
    println!("{}", path.display());
    if !path.exists() {
        eprintln!(
            "(file does not exist; run `{} config init` to create it)",
            C::project_name()
        );
    }
    Ok(())
}

/// Print a configuration value by dotted key.
pub fn cmd_config_get<C: ConfigManager>(config_path: Option<&str>, key: &str) -> Result<()> {
    let config = C::load(config_path)?;
    let value = toml::Value::try_from(&config).map_err(|e| Error::config(e.to_string()))?;
    let found = get_nested_value(&value, key)
        .ok_or_else(|| Error::config(format!("Key '{key}' not found in configuration")))?;
    println!("{}", format_toml_value(found));
    Ok(())
}

/// Set a configuration value by dotted key in the config file.
///
/// The file must exist and the result must still load as `C`.
pub fn cmd_config_set<C: ConfigManager>(
    config_path: Option<&str>,
    key: &str,
    value: &str,
) -> Result<()> {
    let path = C::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory"))?;
    if !path.exists() {
        return Err(Error::config(format!(
            "Config file does not exist at {}. Run `{} config init` first.",
            path.display(),
            C::project_name()
        )));
    }

    let content = std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?;
    let mut doc: toml::Value = toml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;

    set_nested_value(&mut doc, key, parse_value(value))?;
    let toml_str = toml::to_string_pretty(&doc).map_err(|e| Error::config(e.to_string()))?;

    toml::from_str::<C>(&toml_str)
        .map_err(|e| Error::config(format!("'{key} = {value}' is not a valid setting: {e}")))?;

    std::fs::write(&path, toml_str).map_err(|e| Error::io_with_path(e, &path))?;
    println!("Set {key} = {value} in {}", path.display());
    Ok(())
}

/// Write a default configuration file.
pub fn cmd_config_init<C: ConfigManager>(file: Option<&str>, force: bool) -> Result<()> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => C::default_config_path()
            .ok_or_else(|| Error::config("Could not determine config directory"))?,
    };

    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }

    let toml_str = C::default().to_toml_string()?;
    std::fs::write(&path, &toml_str).map_err(|e| Error::io_with_path(e, &path))?;

    println!("Config file created at {}", path.display());
    Ok(())
}

/// Print the configuration as environment variables.
pub fn cmd_config_export<C: ConfigManager>(config: &C, docker_env: bool) -> Result<()> {
    for line in export_lines(config, docker_env)? {
        println!("{line}");
    }
    Ok(())
}

fn export_lines<C: ConfigManager>(config: &C, docker_env: bool) -> Result<Vec<String>> {
    let prefix = if docker_env { "--env " } else { "" };
    Ok(config
        .to_env_vars()?
        .into_iter()
        .map(|(key, value)| format!("{prefix}{key}={value}"))
        .collect())
}

// ============================================================================
// TOML dotted-key helpers
// ============================================================================

/// Navigate a dotted key path in a TOML value tree.
pub fn get_nested_value<'a>(value: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.')
        .try_fold(value, |current, part| current.as_table()?.get(part))
}

/// Set a value at a dotted key path, creating intermediate tables as needed.
pub fn set_nested_value(root: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    let (parents, leaf) = match key.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, key),
    };
    if leaf.is_empty() {
        return Err(Error::config("Empty key path"));
    }

    let mut current = root;
    for part in parents.into_iter().flat_map(|p| p.split('.')) {
        let table = current
            .as_table_mut()
            .ok_or_else(|| Error::config("Cannot navigate into a non-table value"))?;
        current = table
            .entry(part.to_string())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }

    current
        .as_table_mut()
        .ok_or_else(|| Error::config("Cannot set key on a non-table value"))?
        .insert(leaf.to_string(), value);
    Ok(())
}

/// Parse a command-line string into a TOML value: bool, then integer, then float, then string.
pub fn parse_value(s: &str) -> toml::Value {
    if let Ok(b) = s.parse::<bool>() {
        return toml::Value::Boolean(b);
    }
    if let Ok(i) = s.parse::<i64>() {
        return toml::Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return toml::Value::Float(f);
    }
    toml::Value::String(s.to_string())
}

pub fn format_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::Array(_) | toml::Value::Table(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| format!("{value:?}"))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
