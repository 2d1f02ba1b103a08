//! Access to the host application's configuration.
//!
//! The resolver never touches global state: it is handed a [`SettingsStore`]
//! and a [`UrlBuilder`] at construction.

use crate::error::HybridAuthError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Host configuration store
pub trait SettingsStore {
    /// Read one setting of a module, `None` when unset
    fn module_setting(&self, module: &str, key: &str) -> Result<Option<Value>, HybridAuthError>;

    /// Read every setting of a module at once
    fn module_settings(&self, module: &str) -> Result<Map<String, Value>, HybridAuthError>;

    fn set_module_setting(&self, module: &str, key: &str, value: Value) -> Result<(), HybridAuthError>;

    /// Login modes allowed by the host, in order
    fn allowed_login_types(&self) -> Result<Vec<String>, HybridAuthError>;

    fn set_allowed_login_types(&self, login_types: Vec<String>) -> Result<(), HybridAuthError>;
}

impl<T: SettingsStore + ?Sized> SettingsStore for &T {
    fn module_setting(&self, module: &str, key: &str) -> Result<Option<Value>, HybridAuthError> {
        (**self).module_setting(module, key)
    }

    fn module_settings(&self, module: &str) -> Result<Map<String, Value>, HybridAuthError> {
        (**self).module_settings(module)
    }

    fn set_module_setting(&self, module: &str, key: &str, value: Value) -> Result<(), HybridAuthError> {
        (**self).set_module_setting(module, key, value)
    }

    fn allowed_login_types(&self) -> Result<Vec<String>, HybridAuthError> {
        (**self).allowed_login_types()
    }

    fn set_allowed_login_types(&self, login_types: Vec<String>) -> Result<(), HybridAuthError> {
        (**self).set_allowed_login_types(login_types)
    }
}

/// Builds absolute URLs of the host application
pub trait UrlBuilder {
    fn modules_root_url(&self) -> String;
}

/// URL builder with a fixed modules root
#[derive(Clone, Debug)]
pub struct StaticUrlBuilder {
    modules_root: String,
}

impl StaticUrlBuilder {
    pub fn new(modules_root: impl Into<String>) -> Self {
        Self {
            modules_root: modules_root.into(),
        }
    }
}

impl UrlBuilder for StaticUrlBuilder {
    fn modules_root_url(&self) -> String {
        self.modules_root.clone()
    }
}

/// Whole host configuration as persisted by [`JsonFileStore`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub allowed_login_types: Vec<String>,

    #[serde(default)]
    pub modules: BTreeMap<String, Map<String, Value>>,
}

impl HostConfig {
    fn module_setting(&self, module: &str, key: &str) -> Option<Value> {
        self.modules
            .get(module)
            .and_then(|settings| settings.get(key))
            .cloned()
    }

    fn module_settings(&self, module: &str) -> Map<String, Value> {
        self.modules.get(module).cloned().unwrap_or_default()
    }

    fn set_module_setting(&mut self, module: &str, key: &str, value: Value) {
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }
}

/// In-process store, for tests and for hosts that keep their configuration in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    config: RwLock<HostConfig>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: HostConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }

    /// Copy of the current configuration
    pub fn snapshot(&self) -> HostConfig {
        self.config.read().clone()
    }
}

impl SettingsStore for MemoryStore {
    fn module_setting(&self, module: &str, key: &str) -> Result<Option<Value>, HybridAuthError> {
        Ok(self.config.read().module_setting(module, key))
    }

    fn module_settings(&self, module: &str) -> Result<Map<String, Value>, HybridAuthError> {
        Ok(self.config.read().module_settings(module))
    }

    fn set_module_setting(&self, module: &str, key: &str, value: Value) -> Result<(), HybridAuthError> {
        self.config.write().set_module_setting(module, key, value);
        Ok(())
    }

    fn allowed_login_types(&self) -> Result<Vec<String>, HybridAuthError> {
        Ok(self.config.read().allowed_login_types.clone())
    }

    fn set_allowed_login_types(&self, login_types: Vec<String>) -> Result<(), HybridAuthError> {
        self.config.write().allowed_login_types = login_types;
        Ok(())
    }
}

/// Store backed by a JSON file.
///
/// The file is read again on every access. Writes replace it through a
/// temporary file in the same directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole file; a missing file is an empty configuration
    pub fn load(&self) -> Result<HostConfig, HybridAuthError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(HostConfig::default()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HostConfig::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, config: &HostConfig) -> Result<(), HybridAuthError> {
        let content = serde_json::to_string_pretty(config)?;

        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| HybridAuthError::Store(format!("Invalid store path: {}", self.path.display())))?;
        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        if let Err(e) = write_and_replace(&tmp_path, &self.path, &content) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        tracing::debug!("Saved host configuration to {}", self.path.display());
        Ok(())
    }

    fn update<F: FnOnce(&mut HostConfig)>(&self, change: F) -> Result<(), HybridAuthError> {
        let mut config = self.load()?;
        change(&mut config);
        self.save(&config)
    }
}

fn write_and_replace(tmp_path: &Path, path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = fs::File::create(tmp_path)?;
    file.write_all(content.as_bytes())?;
    file.write_all(b"\n")?;
    file.sync_all()?;
    fs::rename(tmp_path, path)
}

impl SettingsStore for JsonFileStore {
    fn module_setting(&self, module: &str, key: &str) -> Result<Option<Value>, HybridAuthError> {
        Ok(self.load()?.module_setting(module, key))
    }

    fn module_settings(&self, module: &str) -> Result<Map<String, Value>, HybridAuthError> {
        Ok(self.load()?.module_settings(module))
    }

    fn set_module_setting(&self, module: &str, key: &str, value: Value) -> Result<(), HybridAuthError> {
        self.update(|config| config.set_module_setting(module, key, value))
    }

    fn allowed_login_types(&self) -> Result<Vec<String>, HybridAuthError> {
        Ok(self.load()?.allowed_login_types)
    }

    fn set_allowed_login_types(&self, login_types: Vec<String>) -> Result<(), HybridAuthError> {
        self.update(|config| config.allowed_login_types = login_types)
    }
}
