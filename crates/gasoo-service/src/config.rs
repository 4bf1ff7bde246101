//! Server configuration.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use gasoo_types::{MAX_LEVEL, MIN_LEVEL};

/// Environment variable overriding `server.bind`.
pub const ENV_BIND: &str = "GASOO_BIND";
/// Environment variable overriding only the port of `server.bind`.
pub const ENV_PORT: &str = "PORT";
/// Environment variable overriding `storage.path`.
pub const ENV_DATABASE: &str = "GASOO_DATABASE";
/// Environment variable overriding `storage.backend`.
pub const ENV_STORAGE: &str = "GASOO_STORAGE";

/// Server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server settings.
    pub server: ServerConfig,
    /// Storage settings.
    pub storage: StorageConfig,
    /// Usage simulator settings.
    pub simulation: SimulationConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Apply `GASOO_BIND`, `PORT`, `GASOO_DATABASE` and `GASOO_STORAGE`.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// `PORT` is applied after `GASOO_BIND` and replaces only the port,
    /// keeping whichever host is configured.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup(ENV_BIND) {
            self.server.bind = bind;
        }

        if let Some(port) = lookup(ENV_PORT) {
            let port: u16 = port.trim().parse().map_err(|_| ConfigError::Env {
                var: ENV_PORT,
                message: format!("'{}' is not a valid port", port),
            })?;
            self.server.set_port(port);
        }

        if let Some(path) = lookup(ENV_DATABASE) {
            self.storage.path = PathBuf::from(path);
        }

        if let Some(backend) = lookup(ENV_STORAGE) {
            self.storage.backend = backend.parse().map_err(|message| ConfigError::Env {
                var: ENV_STORAGE,
                message,
            })?;
        }

        Ok(())
    }

    /// Validate the configuration and return any errors.
    ///
    /// This checks:
    /// - Server bind address is valid (host:port format)
    /// - Storage path is not empty for the SQLite backend
    /// - Simulation interval and initial level are within bounds
    /// - Tank capacity is positive
    ///
    /// # Example
    ///
    /// ```
    /// use gasoo_service::Config;
    ///
    /// let config = Config::default();
    /// config.validate().expect("Default config should be valid");
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        errors.extend(self.server.validate());
        errors.extend(self.storage.validate());
        errors.extend(self.simulation.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:5000").
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
        }
    }
}

impl ServerConfig {
    /// Replace the port of the bind address, keeping the host.
    pub fn set_port(&mut self, port: u16) {
        let host = match self.bind.rsplit_once(':') {
            Some((host, _)) if !host.is_empty() => host.to_string(),
            _ => "127.0.0.1".to_string(),
        };
        self.bind = format!("{}:{}", host, port);
    }

    /// Validate server configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.bind.is_empty() {
            errors.push(ValidationError {
                field: "server.bind".to_string(),
                message: "bind address cannot be empty".to_string(),
            });
        } else {
            match self.bind.rsplit_once(':') {
                None => {
                    errors.push(ValidationError {
                        field: "server.bind".to_string(),
                        message: format!(
                            "invalid bind address '{}': expected format 'host:port'",
                            self.bind
                        ),
                    });
                }
                Some((_, port_str)) => match port_str.parse::<u16>() {
                    Ok(0) => {
                        errors.push(ValidationError {
                            field: "server.bind".to_string(),
                            message: "port cannot be 0".to_string(),
                        });
                    }
                    Err(_) => {
                        errors.push(ValidationError {
                            field: "server.bind".to_string(),
                            message: format!(
                                "invalid port '{}': must be a number 1-65535",
                                port_str
                            ),
                        });
                    }
                    Ok(_) => {}
                },
            }
        }

        errors
    }
}

/// Which [`ReadingStore`](gasoo_store::ReadingStore) backs the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// SQLite database at `storage.path`.
    #[default]
    Sqlite,
    /// Process-local memory; contents are lost on restart.
    Memory,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Sqlite => write!(f, "sqlite"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(format!(
                "unknown storage backend '{}': use 'sqlite' or 'memory'",
                s
            )),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage backend.
    pub backend: StorageBackend,
    /// Database file path (SQLite backend only).
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: gasoo_store::default_db_path(),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.backend == StorageBackend::Sqlite && self.path.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "storage.path".to_string(),
                message: "database path cannot be empty".to_string(),
            });
        }

        errors
    }
}

/// Minimum simulation interval in seconds.
pub const MIN_SIMULATION_INTERVAL: u64 = 1;
/// Maximum simulation interval in seconds (1 day).
pub const MAX_SIMULATION_INTERVAL: u64 = 86_400;

/// Usage simulator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Whether the simulator runs.
    pub enabled: bool,
    /// Seconds between simulated readings.
    pub interval_secs: u64,
    /// Starting level when the store is empty.
    pub initial_level: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 60,
            initial_level: 35.0,
        }
    }
}

impl SimulationConfig {
    /// Validate simulation configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.interval_secs < MIN_SIMULATION_INTERVAL {
            errors.push(ValidationError {
                field: "simulation.interval_secs".to_string(),
                message: format!(
                    "interval {} is too short (minimum {} second)",
                    self.interval_secs, MIN_SIMULATION_INTERVAL
                ),
            });
        } else if self.interval_secs > MAX_SIMULATION_INTERVAL {
            errors.push(ValidationError {
                field: "simulation.interval_secs".to_string(),
                message: format!(
                    "interval {} is too long (maximum {} seconds / 1 day)",
                    self.interval_secs, MAX_SIMULATION_INTERVAL
                ),
            });
        }

        if !(MIN_LEVEL..=MAX_LEVEL).contains(&self.initial_level) {
            errors.push(ValidationError {
                field: "simulation.initial_level".to_string(),
                message: format!(
                    "initial level {} must be between {} and {}",
                    self.initial_level, MIN_LEVEL, MAX_LEVEL
                ),
            });
        }

        errors
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid {var}: {message}")]
    Env { var: &'static str, message: String },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field path (e.g., `server.bind` or `simulation.interval_secs`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gasoo")
        .join("server.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server.bind, "127.0.0.1:5000");
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert!(config.simulation.enabled);
        assert_eq!(config.simulation.interval_secs, 60);
        assert_eq!(config.simulation.initial_level, 35.0);
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.path, gasoo_store::default_db_path());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        let config = Config {
            server: ServerConfig {
                bind: "0.0.0.0:9090".to_string(),
            },
            storage: StorageConfig {
                backend: StorageBackend::Memory,
                path: PathBuf::from("/tmp/test.db"),
            },
            simulation: SimulationConfig {
                enabled: false,
                interval_secs: 5,
                initial_level: 80.0,
            },
        };

        config.save(&config_path).unwrap();
        let loaded = Config::load(&config_path).unwrap();

        assert_eq!(loaded.server.bind, "0.0.0.0:9090");
        assert_eq!(loaded.storage.backend, StorageBackend::Memory);
        assert_eq!(loaded.storage.path, PathBuf::from("/tmp/test.db"));
        assert!(!loaded.simulation.enabled);
        assert_eq!(loaded.simulation.interval_secs, 5);
        assert_eq!(loaded.simulation.initial_level, 80.0);
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("invalid.toml");
        std::fs::write(&config_path, "this is not valid { toml").unwrap();

        let result = Config::load(&config_path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_config_partial_toml() {
        let toml = r#"
            [server]
            bind = "192.168.1.1:8888"

            [storage]
            backend = "memory"

            [simulation]
            interval_secs = 10
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.bind, "192.168.1.1:8888");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.path, gasoo_store::default_db_path());
        assert_eq!(config.simulation.interval_secs, 10);
        assert!(config.simulation.enabled);
    }

    #[test]
    fn test_default_config_path() {
        let path = default_config_path();
        assert!(path.ends_with("gasoo/server.toml"));
    }

    #[test]
    fn test_storage_backend_from_str() {
        assert_eq!("SQLite".parse::<StorageBackend>(), Ok(StorageBackend::Sqlite));
        assert_eq!("memory".parse::<StorageBackend>(), Ok(StorageBackend::Memory));
        assert!("postgres".parse::<StorageBackend>().is_err());
    }

    // ==========================================================================
    // Environment override tests
    // ==========================================================================

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides_from(lookup(&[
                ("GASOO_BIND", "0.0.0.0:7000"),
                ("GASOO_DATABASE", "/srv/gasoo.db"),
                ("GASOO_STORAGE", "memory"),
            ]))
            .unwrap();

        assert_eq!(config.server.bind, "0.0.0.0:7000");
        assert_eq!(config.storage.path, PathBuf::from("/srv/gasoo.db"));
        assert_eq!(config.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn test_port_override_keeps_host() {
        let mut config = Config::default();
        config.apply_overrides_from(lookup(&[("PORT", "8081")])).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8081");

        let mut config = Config::default();
        config
            .apply_overrides_from(lookup(&[("GASOO_BIND", "[::1]:5000"), ("PORT", "6000")]))
            .unwrap();
        assert_eq!(config.server.bind, "[::1]:6000");
    }

    #[test]
    fn test_invalid_env_values() {
        let mut config = Config::default();
        let err = config
            .apply_overrides_from(lookup(&[("PORT", "http")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "PORT", .. }));

        let err = config
            .apply_overrides_from(lookup(&[("GASOO_STORAGE", "redis")]))
            .unwrap_err();
        assert!(err.to_string().contains("GASOO_STORAGE"));
    }

    #[test]
    fn test_no_env_leaves_config_untouched() {
        let mut config = Config::default();
        config.apply_overrides_from(|_| None).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:5000");
    }

    // ==========================================================================
    // Validation tests
    // ==========================================================================

    #[test]
    fn test_default_config_validates() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_bind_validation() {
        let valid = ServerConfig {
            bind: "127.0.0.1:5000".to_string(),
        };
        assert!(valid.validate().is_empty());

        let valid_ipv6 = ServerConfig {
            bind: "[::1]:5000".to_string(),
        };
        assert!(valid_ipv6.validate().is_empty());

        let empty = ServerConfig {
            bind: "".to_string(),
        };
        let errors = empty.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("cannot be empty"));

        let no_port = ServerConfig {
            bind: "127.0.0.1".to_string(),
        };
        let errors = no_port.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("host:port"));

        let port_zero = ServerConfig {
            bind: "127.0.0.1:0".to_string(),
        };
        assert!(port_zero.validate()[0].message.contains("cannot be 0"));

        let bad_port = ServerConfig {
            bind: "127.0.0.1:abc".to_string(),
        };
        assert!(bad_port.validate()[0].message.contains("must be a number"));
    }

    #[test]
    fn test_storage_path_validation() {
        let empty = StorageConfig {
            backend: StorageBackend::Sqlite,
            path: PathBuf::new(),
        };
        let errors = empty.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("cannot be empty"));

        // The memory backend ignores the path
        let memory = StorageConfig {
            backend: StorageBackend::Memory,
            path: PathBuf::new(),
        };
        assert!(memory.validate().is_empty());
    }

    #[test]
    fn test_simulation_validation() {
        let zero = SimulationConfig {
            interval_secs: 0,
            ..Default::default()
        };
        assert!(zero.validate()[0].message.contains("too short"));

        let long = SimulationConfig {
            interval_secs: MAX_SIMULATION_INTERVAL + 1,
            ..Default::default()
        };
        assert!(long.validate()[0].message.contains("too long"));

        let overfull = SimulationConfig {
            initial_level: 120.0,
            ..Default::default()
        };
        let errors = overfull.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "simulation.initial_level");
    }

    #[test]
    fn test_config_validation_collects_all_errors() {
        let mut config = Config::default();
        config.server.bind = "nope".to_string();
        config.simulation.initial_level = -1.0;

        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 2);
                let display = ConfigError::Validation(errors).to_string();
                assert!(display.contains("server.bind"));
                assert!(display.contains("simulation.initial_level"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_error_display() {
        let error = ValidationError {
            field: "server.bind".to_string(),
            message: "invalid port".to_string(),
        };
        assert_eq!(format!("{}", error), "server.bind: invalid port");
    }
}
