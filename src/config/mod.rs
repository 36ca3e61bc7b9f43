/// Configuration system for the admin console.
///
/// Layered, later layers override earlier ones:
///
/// 1. **Built-in defaults**: [`schema::ConsoleConfig::default()`]
/// 2. **User global config**: `~/.admin-console/config.toml`
/// 3. **Environment variables**: `ADMIN_CONSOLE_*` (highest precedence)
///
/// Missing sections or keys in the TOML file fall back to the defaults.
///
/// # Usage
///
/// ```rust,ignore
/// use admin_console::config;
///
/// let cfg = config::load();
/// println!("backend: {}", cfg.api.base_url);
/// ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::ConsoleConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration: defaults → global TOML → env vars.
pub fn load() -> ConsoleConfig {
    let mut config = global_config_path()
        .and_then(|path| load_toml_file(&path))
        .unwrap_or_default();

    apply_env_overrides(&mut config);
    config
}

/// Load a TOML config file. Missing or malformed files yield `None`.
fn load_toml_file(path: &Path) -> Option<ConsoleConfig> {
    let content = fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.admin-console/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".admin-console").join("config.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides.
///
/// Supported variables:
/// - `ADMIN_CONSOLE_BASE_URL`: backend API root
/// - `ADMIN_CONSOLE_STORAGE`: session file path (`memory` = do not persist)
/// - `ADMIN_CONSOLE_LOG`: tracing filter directive
fn apply_env_overrides(config: &mut ConsoleConfig) {
    if let Ok(val) = std::env::var("ADMIN_CONSOLE_BASE_URL")
        && !val.is_empty()
    {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("ADMIN_CONSOLE_STORAGE")
        && !val.is_empty()
    {
        if val.eq_ignore_ascii_case("memory") {
            config.storage.ephemeral = true;
        } else {
            config.storage.path = val;
        }
    }
    if let Ok(val) = std::env::var("ADMIN_CONSOLE_LOG")
        && !val.is_empty()
    {
        config.logging.filter = val;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / show
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.admin-console/config.toml`.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;
    write_default_config(&path, force)?;
    Ok(path)
}

fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }

    fs::write(path, ConsoleConfig::default_toml()).context("failed to write config file")
}

/// Set a single dotted key (e.g. `api.base_url`) in the global config file.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;
    set_config_value_in(&path, key, value)
}

fn set_config_value_in(path: &Path, key: &str, value: &str) -> Result<()> {
    // Start from the existing file, or from serialized defaults when absent.
    let content = if path.exists() {
        fs::read_to_string(path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&ConsoleConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    // Reject values that no longer fit the schema before touching the file.
    let updated = toml::to_string_pretty(&root).context("failed to serialize config")?;
    toml::from_str::<ConsoleConfig>(&updated)
        .with_context(|| format!("invalid value for '{key}'"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(path, updated).context("failed to write config file")
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// Sections are created on demand; the new value takes the type of the value
/// it replaces (string when the key is new).
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let (sections, leaf) = match key.rsplit_once('.') {
        Some((sections, leaf)) => (sections.split('.').collect::<Vec<_>>(), leaf),
        None => (Vec::new(), key),
    };
    if leaf.is_empty() || sections.iter().any(|s| s.is_empty()) {
        anyhow::bail!("invalid config key '{key}'");
    }

    let mut current = root;
    for section in sections {
        let table = current
            .as_table_mut()
            .with_context(|| format!("expected table above '{section}' in '{key}'"))?;
        current = table
            .entry(section.to_string())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }

    let table = current
        .as_table_mut()
        .with_context(|| format!("expected table for '{key}'"))?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        _ => toml::Value::String(raw_value.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    toml::to_string_pretty(&load()).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
