//! Application configuration loaded from YAML.
//!
//! # Responsibility
//! - Describe the database location, pool sizing, seed sources and logging.
//! - Fall back to built-in defaults field by field.
//!
//! # Invariants
//! - Every field has a default, so an empty document is a valid config.
//! - Pool settings are clamped before use; see [`PoolSettings::clamped`].

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_yaml::Error },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub application: ApplicationConfig,
    pub database: DatabaseConfig,
    pub seed: SeedConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    pub name: String,
    pub version: String,
    pub description: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: "EduBase".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Course and degree program catalog".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file. Created on first open.
    pub path: PathBuf,
    pub pool: PoolSettings,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("edubase.sqlite3"),
            pool: PoolSettings::default(),
        }
    }
}

impl DatabaseConfig {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pool: PoolSettings::default(),
        }
    }
}

/// Connection pool sizing and timeouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    pub max_size: u32,
    pub min_idle: u32,
    pub idle_timeout_ms: u64,
    pub connection_timeout_ms: u64,
    pub max_lifetime_ms: u64,
    /// Prepared statements cached per connection.
    pub statement_cache_size: usize,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout_ms: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_size: 10,
            min_idle: 2,
            idle_timeout_ms: 30_000,
            connection_timeout_ms: 30_000,
            max_lifetime_ms: 1_800_000,
            statement_cache_size: 250,
            busy_timeout_ms: 5_000,
        }
    }
}

impl PoolSettings {
    /// Returns a copy that the pool builder accepts: at least one connection,
    /// `min_idle <= max_size`, and non-zero timeouts.
    pub fn clamped(&self) -> Self {
        let max_size = self.max_size.max(1);
        Self {
            max_size,
            min_idle: self.min_idle.min(max_size),
            idle_timeout_ms: self.idle_timeout_ms.max(1),
            connection_timeout_ms: self.connection_timeout_ms.max(1),
            max_lifetime_ms: self.max_lifetime_ms.max(1),
            statement_cache_size: self.statement_cache_size,
            busy_timeout_ms: self.busy_timeout_ms,
        }
    }
}

/// JSON seed files merged at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub courses: PathBuf,
    pub programs: PathBuf,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            courses: PathBuf::from("data/courses.json"),
            programs: PathBuf::from("data/programs.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for rolling log files. Stderr only when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: crate::logging::default_log_level().to_string(),
            dir: None,
        }
    }
}

impl AppConfig {
    /// Parses a YAML document.
    pub fn from_yaml_str(text: &str, origin: &Path) -> ConfigResult<Self> {
        // An empty file deserializes as YAML null, not as an empty mapping.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Reads and parses `path`; a missing file is an error.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&text, path)?;
        info!(
            "event=config_load module=config status=ok path={}",
            path.display()
        );
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(
                "event=config_load module=config status=default path={} reason=not_found",
                path.display()
            );
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, PoolSettings};
    use std::path::{Path, PathBuf};

    #[test]
    fn empty_document_yields_defaults() {
        let config = AppConfig::from_yaml_str("  \n", Path::new("empty.yml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.database.pool.max_size, 10);
        assert_eq!(config.database.pool.statement_cache_size, 250);
    }

    #[test]
    fn partial_document_keeps_remaining_defaults() {
        let yaml = "
database:
  path: /tmp/catalog.sqlite3
  pool:
    max_size: 4
seed:
  courses: seeds/courses.json
";
        let config = AppConfig::from_yaml_str(yaml, Path::new("partial.yml")).unwrap();
        assert_eq!(config.database.path, PathBuf::from("/tmp/catalog.sqlite3"));
        assert_eq!(config.database.pool.max_size, 4);
        assert_eq!(config.database.pool.min_idle, 2);
        assert_eq!(config.seed.courses, PathBuf::from("seeds/courses.json"));
        assert_eq!(config.seed.programs, PathBuf::from("data/programs.json"));
        assert_eq!(config.application.name, "EduBase");
    }

    #[test]
    fn malformed_document_reports_origin() {
        let err = AppConfig::from_yaml_str("database: [unclosed", Path::new("bad.yml"))
            .expect_err("malformed yaml must fail");
        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, PathBuf::from("bad.yml")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_or_default_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(dir.path().join("absent.yml")).unwrap();
        assert_eq!(config, AppConfig::default());

        let err = AppConfig::load(dir.path().join("absent.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn clamped_pool_settings_are_buildable() {
        let settings = PoolSettings {
            max_size: 0,
            min_idle: 5,
            connection_timeout_ms: 0,
            ..PoolSettings::default()
        }
        .clamped();
        assert_eq!(settings.max_size, 1);
        assert_eq!(settings.min_idle, 1);
        assert_eq!(settings.connection_timeout_ms, 1);
    }
}
