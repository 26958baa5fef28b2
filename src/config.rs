//! Configuration management for geosearch using the prefer crate.
//!
//! Resolution order, lowest to highest priority:
//! built-in defaults, config file (`geosearch.{toml,yaml,json}` discovered by
//! prefer, or `--config`), environment variables (`.env` is loaded first).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::repository::util::redact_url_password;
use crate::repository::{DbContext, DieselError, PoolOptions};

pub const DEFAULT_APP_NAME: &str = "GeoSearch API";
pub const DEFAULT_APP_VERSION: &str = "0.1.0";
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_DESCRIPTION_FILE: &str = "description.md";
pub const DEFAULT_POOL_SIZE: usize = 10;
pub const DEFAULT_POOL_TIMEOUT_SECS: u64 = 30;

/// Origins allowed by CORS when none are configured.
pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:8080",
    "http://127.0.0.1:8080",
    "http://localhost:8000",
    "http://127.0.0.1:8000",
];

/// Parse a boolean flag from a query string or environment variable.
///
/// Accepts `true/false`, `t/f`, `1/0`, `yes/no`, `y/n` and `on/off`,
/// case-insensitively.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" | "on" => Some(true),
        "false" | "f" | "0" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

/// Errors raised while resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("DATABASE_URL is not set (use the environment, a .env file, or database_url in the config file)")]
    MissingDatabaseUrl,
    #[error("Database setup failed: {0}")]
    Database(#[from] DieselError),
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, prefer::FromValue)]
pub struct Config {
    /// Service name shown in the API document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    /// Service version shown in the API document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    /// Database URL (`postgres://...` or `memory:<seed.json>`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    /// Markdown file with the long API description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_path: Option<String>,
    /// Listen address for `serve`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    /// Maximum pooled database connections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_size: Option<usize>,
    /// Seconds to wait for a pooled connection (0 disables the timeout).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_timeout_secs: Option<u64>,
    /// Disable TLS for PostgreSQL connections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_tls: Option<bool>,
    /// Browser origins allowed to call the API.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[prefer(default)]
    pub cors_origins: Vec<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    #[prefer(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers geosearch config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("geosearch").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("Ignoring config file: {}", e);
                        Self::default()
                    }
                },
                None => Self::default(),
            },
            // No config file found
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let mut config = Self::parse(&contents, ext).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse config text in the format named by `ext`.
    pub fn parse(contents: &str, ext: &str) -> Result<Self, String> {
        match ext {
            "toml" => toml::from_str(contents).map_err(|e| format!("invalid TOML: {}", e)),
            "yaml" | "yml" => {
                serde_yaml::from_str(contents).map_err(|e| format!("invalid YAML: {}", e))
            }
            _ => serde_json::from_str(contents).map_err(|e| format!("invalid JSON: {}", e)),
        }
    }

    /// Get the base directory for resolving relative paths.
    /// Returns the config file's parent directory if available, otherwise None.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        settings.base_dir = base_dir.to_path_buf();
        settings.description_path = base_dir.join(DEFAULT_DESCRIPTION_FILE);

        if let Some(ref name) = self.app_name {
            settings.app_name = name.clone();
        }
        if let Some(ref version) = self.app_version {
            settings.app_version = version.clone();
        }
        if let Some(ref url) = self.database_url {
            settings.database_url = Some(url.clone());
        }
        if let Some(ref path) = self.description_path {
            settings.description_path = self.resolve_path(path, base_dir);
        }
        if let Some(ref bind) = self.bind {
            settings.bind = bind.clone();
        }
        if let Some(size) = self.pool_size {
            settings.pool_size = size.max(1);
        }
        if let Some(secs) = self.pool_timeout_secs {
            settings.pool_timeout_secs = secs;
        }
        if let Some(no_tls) = self.no_tls {
            settings.no_tls = no_tls;
        }
        if !self.cors_origins.is_empty() {
            settings.cors_origins = self.cors_origins.clone();
        }
    }
}

/// Environment variable overrides.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub database_url: Option<String>,
    pub bind: Option<String>,
    pub description: Option<String>,
    pub no_tls: bool,
}

impl EnvOverrides {
    /// Read `DATABASE_URL`, `GEOSEARCH_BIND`, `GEOSEARCH_DESCRIPTION` and
    /// `GEOSEARCH_NO_TLS`. Empty values count as unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build overrides from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|s| !s.is_empty());
        let no_tls = match var("GEOSEARCH_NO_TLS") {
            Some(raw) => parse_flag(&raw).unwrap_or_else(|| {
                tracing::warn!("Ignoring unrecognized GEOSEARCH_NO_TLS value '{}'", raw);
                false
            }),
            None => false,
        };

        Self {
            database_url: var("DATABASE_URL"),
            bind: var("GEOSEARCH_BIND"),
            description: var("GEOSEARCH_DESCRIPTION"),
            no_tls,
        }
    }

    pub fn apply(&self, settings: &mut Settings) {
        if let Some(ref url) = self.database_url {
            tracing::debug!(
                "Using DATABASE_URL from environment: {}",
                redact_url_password(url)
            );
            settings.database_url = Some(url.clone());
        }
        if let Some(ref bind) = self.bind {
            settings.bind = bind.clone();
        }
        if let Some(ref description) = self.description {
            settings.description = Some(description.clone());
        }
        if self.no_tls {
            settings.no_tls = true;
        }
    }
}

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub app_name: String,
    pub app_version: String,
    /// Long description for the API document. Loaded from
    /// `description_path` unless set through the environment.
    pub description: Option<String>,
    pub description_path: PathBuf,
    pub database_url: Option<String>,
    pub bind: String,
    pub pool_size: usize,
    pub pool_timeout_secs: u64,
    pub no_tls: bool,
    pub cors_origins: Vec<String>,
    /// Directory relative paths resolve against.
    pub base_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            app_version: DEFAULT_APP_VERSION.to_string(),
            description: None,
            description_path: base_dir.join(DEFAULT_DESCRIPTION_FILE),
            database_url: None,
            bind: DEFAULT_BIND.to_string(),
            pool_size: DEFAULT_POOL_SIZE,
            pool_timeout_secs: DEFAULT_POOL_TIMEOUT_SECS,
            no_tls: false,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            base_dir,
        }
    }
}

impl Settings {
    /// The configured database URL, required by every command that queries.
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::MissingDatabaseUrl)
    }

    /// Description text, empty when none was found.
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            max_size: self.pool_size,
            timeout: (self.pool_timeout_secs > 0)
                .then(|| std::time::Duration::from_secs(self.pool_timeout_secs)),
            no_tls: self.no_tls,
        }
    }

    /// Build the process-wide database context.
    pub fn create_db_context(&self) -> Result<DbContext, ConfigError> {
        let url = self.database_url()?;
        Ok(DbContext::from_url(url, &self.pool_options(), &self.base_dir)?)
    }
}

/// Reads the long-form API description from a markdown file.
pub struct Description {
    path: PathBuf,
}

impl Description {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File contents, or an empty string (with a warning) if it is missing.
    pub fn load(&self) -> String {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    "description file not readable at {}: {}",
                    self.path.display(),
                    e
                );
                String::new()
            }
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
}

/// Load settings: config file, then environment, then the description file.
pub async fn load_settings(options: LoadOptions) -> Result<Settings, ConfigError> {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await?,
        None => Config::load().await,
    };
    Ok(resolve_settings(&config, &EnvOverrides::from_env()))
}

/// Combine a loaded config file with environment overrides.
pub fn resolve_settings(config: &Config, env: &EnvOverrides) -> Settings {
    let mut settings = Settings::default();
    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| settings.base_dir.clone());

    config.apply_to_settings(&mut settings, &base_dir);
    env.apply(&mut settings);

    if settings.description.is_none() {
        settings.description = Some(Description::new(&settings.description_path).load());
    }

    settings
}
