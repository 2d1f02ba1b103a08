use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON file holding the host configuration
    #[serde(default = "default_store_path")]
    pub path: String,
    /// Absolute URL of the host's modules root, used to build the callback
    #[serde(default = "default_modules_root_url")]
    pub modules_root_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_store_path() -> String {
    "host-config.json".to_string()
}

fn default_modules_root_url() -> String {
    "http://localhost/env-production/".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            modules_root_url: default_modules_root_url(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AdminConfig {
    /// Load from `file` (or `hybridauth_admin.*` in the working directory),
    /// then from `HYBRIDAUTH__*` environment variables
    pub fn load(file: Option<&str>) -> Result<Self, config::ConfigError> {
        let file = match file {
            Some(path) => config::File::with_name(path).required(true),
            None => config::File::with_name("hybridauth_admin").required(false),
        };

        let config = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix("HYBRIDAUTH").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    pub fn load_or_default() -> Self {
        Self::load(None).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config file: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// An explicitly given file must load; without one, fall back to defaults
    pub fn load_for_cli(file: Option<&str>) -> Result<Self, config::ConfigError> {
        match file {
            Some(path) => Self::load(Some(path)),
            None => Ok(Self::load_or_default()),
        }
    }

    pub fn log_level(&self) -> tracing::Level {
        match self.logging.level.to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "info" => tracing::Level::INFO,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults() {
        let config = AdminConfig::default();
        assert_eq!(config.store.path, "host-config.json");
        assert_eq!(config.store.modules_root_url, "http://localhost/env-production/");
        assert_eq!(config.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[store]\npath = \"/etc/itop/host-config.json\"\n\n[logging]\nlevel = \"DEBUG\""
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let config = AdminConfig::load(Some(&path)).unwrap();
        assert_eq!(config.store.path, "/etc/itop/host-config.json");
        assert_eq!(config.store.modules_root_url, "http://localhost/env-production/");
        assert_eq!(config.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(AdminConfig::load(Some("/nonexistent/hybridauth_admin.toml")).is_err());
        assert!(AdminConfig::load_for_cli(Some("/nonexistent/typo.toml")).is_err());
    }

    #[test]
    fn test_explicit_file_is_used() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[store]\npath = \"/srv/itop/host-config.json\"").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let config = AdminConfig::load_for_cli(Some(&path)).unwrap();
        assert_eq!(config.store.path, "/srv/itop/host-config.json");
    }

    #[test]
    fn test_unknown_log_level_falls_back_to_info() {
        let mut config = AdminConfig::default();
        config.logging.level = "verbose".to_string();
        assert_eq!(config.log_level(), tracing::Level::INFO);
    }
}
