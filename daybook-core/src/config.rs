//! Daybook configuration.
//!
//! Layered with the `config` crate: built-in defaults, then the optional
//! TOML file, then `DAYBOOK__*` environment variables
//! (e.g. `DAYBOOK__SERVER__PORT=8080`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{DaybookError, DaybookResult};
use crate::pagination::PaginationConfig;
use crate::store::{SqliteStore, Store};

static DEFAULT_DATABASE_PATH: &str = "~/.daybook/daybook.db";

/// Database path value that selects a transient in-memory database.
pub const IN_MEMORY_DATABASE: &str = ":memory:";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaybookConfig {
    pub database: PathBuf,
    pub server: ServerConfig,
    pub pagination: PaginationConfig,
    pub log: LogConfig,
}

impl Default for DaybookConfig {
    fn default() -> Self {
        DaybookConfig {
            database: PathBuf::from(DEFAULT_DATABASE_PATH),
            server: ServerConfig::default(),
            pagination: PaginationConfig::default(),
            log: LogConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 4096,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` takes precedence.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            filter: "info".to_string(),
        }
    }
}

impl DaybookConfig {
    /// `$DAYBOOK_CONFIG`, or `<config dir>/daybook/config.toml`.
    pub fn config_path() -> DaybookResult<PathBuf> {
        if let Some(path) = std::env::var_os("DAYBOOK_CONFIG") {
            return Ok(PathBuf::from(path));
        }

        let config_dir = dirs::config_dir()
            .ok_or_else(|| DaybookError::Config("Could not determine config directory".into()))?
            .join("daybook");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default config file location plus environment.
    pub fn load() -> DaybookResult<Self> {
        let path = Self::config_path()?;
        Self::load_from(Some(&path))
    }

    /// Load from `path` (if given and present) plus environment.
    pub fn load_from(path: Option<&Path>) -> DaybookResult<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        let config: DaybookConfig = builder
            .add_source(
                Environment::with_prefix("DAYBOOK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.pagination.validate()?;
        Ok(config)
    }

    /// Database path with `~` expanded.
    pub fn database_path(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.database.to_string_lossy()).into_owned();
        PathBuf::from(expanded)
    }

    pub fn is_in_memory(&self) -> bool {
        self.database.as_os_str() == IN_MEMORY_DATABASE
    }

    /// Open the configured SQLite database.
    pub fn open_store(&self) -> DaybookResult<Arc<dyn Store>> {
        let store = if self.is_in_memory() {
            SqliteStore::open_in_memory()?
        } else {
            SqliteStore::open(&self.database_path())?
        };
        Ok(Arc::new(store))
    }

    /// Create a config file with every option commented out.
    pub fn create_default_config(path: &Path) -> DaybookResult<()> {
        let defaults = DaybookConfig::default();
        let contents = format!(
            "\
# daybook configuration

# SQLite database file (\"{IN_MEMORY_DATABASE}\" for a throwaway database):
# database = \"{}\"

# [server]
# host = \"{}\"
# port = {}

# [pagination]
# default_page_size = {}
# max_page_size = {}

# [log]
# filter = \"{}\"
",
            DEFAULT_DATABASE_PATH,
            defaults.server.host,
            defaults.server.port,
            defaults.pagination.default_page_size,
            defaults.pagination.max_page_size,
            defaults.log.filter,
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DaybookError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| DaybookError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
