/// Configuration schema and defaults for the admin console.
///
/// Sections: `[api]`, `[storage]`, `[logging]`. Every field has a built-in
/// default; users only set what they want to change.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_BASE_URL;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level console configuration (`~/.admin-console/config.toml`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API root prefixed to every endpoint path, e.g. `https://host/api`.
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [storage]
// ---------------------------------------------------------------------------

/// Where the operator session is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Session file. Empty means `~/.admin-console/storage.json`.
    pub path: String,
    /// Keep the session in memory only (every run needs a fresh login).
    pub ephemeral: bool,
}

impl StorageConfig {
    /// Resolved session file, `None` when the session must not persist.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        if self.ephemeral {
            return None;
        }
        if self.path.is_empty() {
            crate::storage::default_storage_path()
        } else {
            Some(PathBuf::from(&self.path))
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Diagnostic logging (stderr).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `warn` or `admin_console=debug`.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl ConsoleConfig {
    /// Annotated default config written by `admin-console config init`.
    pub fn default_toml() -> String {
        format!(
            r#"# admin-console configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (ADMIN_CONSOLE_*)
#   2. User global config (~/.admin-console/config.toml)
#   3. Built-in defaults

[api]
base_url = "{DEFAULT_BASE_URL}"   # or ADMIN_CONSOLE_BASE_URL

[storage]
path = ""           # empty = ~/.admin-console/storage.json, or ADMIN_CONSOLE_STORAGE
ephemeral = false   # true = never persist the session

[logging]
filter = "warn"     # tracing filter, or ADMIN_CONSOLE_LOG
"#
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
