//! Persistent selector settings and the behaviour of the settings surface.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use config::{Config, Environment, File, FileFormat};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::{Configuration, StoredSettings};

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

/// Default settings file, relative to the working directory
pub const DEFAULT_SETTINGS_FILE: &str = ".odoo-pr-linker.toml";

/// Environment variable prefix for settings overrides
pub const ENV_PREFIX: &str = "ODOO_PR_LINKER";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("could not read settings: {0}")]
    Read(String),

    #[error("could not write settings: {0}")]
    Write(String),

    #[error("could not encode settings: {0}")]
    Encode(String),
}

impl From<config::ConfigError> for SettingsError {
    fn from(err: config::ConfigError) -> Self {
        SettingsError::Read(err.to_string())
    }
}

#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Result<StoredSettings, SettingsError>;

    async fn save(&self, settings: &StoredSettings) -> Result<(), SettingsError>;
}

/// Configuration for one page load: stored values, with the built-in defaults
/// substituted for anything missing, blank or unreadable.
pub async fn load_config(store: &dyn SettingsStore) -> Configuration {
    match store.load().await {
        Ok(stored) => Configuration::resolve(&stored, &Configuration::default()),
        Err(err) => {
            warn!("Using default config: {err}");
            Configuration::default()
        }
    }
}

/// What the settings form shows when it opens.
pub async fn load_settings_for_display(store: &dyn SettingsStore) -> Configuration {
    let defaults = Configuration::settings_defaults();
    match store.load().await {
        Ok(stored) => Configuration::resolve(&stored, &defaults),
        Err(err) => {
            warn!("Could not load config: {err}");
            defaults
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Saved(Configuration),
    Failed(SettingsError),
}

/// Saves the form values, trimmed, with blanks replaced by defaults.
pub async fn save_settings(
    store: &dyn SettingsStore,
    branch_selector: &str,
    pull_request_body_selector: &str,
) -> SaveStatus {
    let entered = StoredSettings {
        branch_selector: Some(branch_selector.to_string()),
        pull_request_body_selector: Some(pull_request_body_selector.to_string()),
    };
    let config = Configuration::resolve(&entered, &Configuration::settings_defaults());

    match store.save(&StoredSettings::from(&config)).await {
        Ok(()) => {
            info!(
                branch_selector = config.branch_selector,
                pull_request_body_selector = config.pull_request_body_selector,
                "Saved settings"
            );
            SaveStatus::Saved(config)
        }
        Err(err) => {
            error!("Could not save config: {err}");
            SaveStatus::Failed(err)
        }
    }
}

/// Restores the settings-surface defaults.
pub async fn reset_settings(store: &dyn SettingsStore) -> SaveStatus {
    let defaults = Configuration::settings_defaults();
    save_settings(
        store,
        &defaults.branch_selector,
        &defaults.pull_request_body_selector,
    )
    .await
}

/// TOML file store, overridable through `ODOO_PR_LINKER_*` environment variables.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new(DEFAULT_SETTINGS_FILE)
    }
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn load(&self) -> Result<StoredSettings, SettingsError> {
        let mut builder = Config::builder();

        if self.path.exists() {
            builder = builder.add_source(File::from(self.path.as_path()).format(FileFormat::Toml));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(false));

        let settings: StoredSettings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    async fn save(&self, settings: &StoredSettings) -> Result<(), SettingsError> {
        let toml_content =
            toml::to_string_pretty(settings).map_err(|e| SettingsError::Encode(e.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SettingsError::Write(e.to_string()))?;
        }
        tokio::fs::write(&self.path, toml_content)
            .await
            .map_err(|e| SettingsError::Write(format!("{}: {e}", self.path.display())))?;
        Ok(())
    }
}

/// Process-local store, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: Mutex<StoredSettings>,
}

impl MemorySettingsStore {
    pub fn new(settings: StoredSettings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<StoredSettings, SettingsError> {
        self.settings
            .lock()
            .map(|settings| settings.clone())
            .map_err(|e| SettingsError::Read(e.to_string()))
    }

    async fn save(&self, settings: &StoredSettings) -> Result<(), SettingsError> {
        let mut guard = self
            .settings
            .lock()
            .map_err(|e| SettingsError::Write(e.to_string()))?;
        *guard = settings.clone();
        Ok(())
    }
}
