//! Configuration management for PantryPal
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//!
//! Precedence, lowest to highest: built-in defaults, YAML file, environment
//! variables, command-line flags.

use crate::error::{PantryError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for PantryPal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Local persistence settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every request path is appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds); expiry surfaces as a network error
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Where credentials are persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    /// OS native credential store
    #[default]
    Keyring,
    /// The same embedded database as the chat cache
    File,
    /// Process memory only; nothing survives exit
    Memory,
}

impl std::str::FromStr for CredentialBackend {
    type Err = PantryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keyring" => Ok(CredentialBackend::Keyring),
            "file" => Ok(CredentialBackend::File),
            "memory" => Ok(CredentialBackend::Memory),
            other => Err(PantryError::Config(format!(
                "Invalid credential backend: {}. Must be one of: keyring, file, memory",
                other
            ))),
        }
    }
}

/// Local storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the chat cache database; defaults to the platform
    /// data directory
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Credential persistence backend
    #[serde(default)]
    pub credential_backend: CredentialBackend,

    /// Keyring service name used to namespace credential entries
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,
}

fn default_keyring_service() -> String {
    "pantrypal".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            credential_backend: CredentialBackend::default(),
            keyring_service: default_keyring_service(),
        }
    }
}

impl StorageConfig {
    /// Resolves the data directory and makes sure it exists.
    ///
    /// # Errors
    ///
    /// Returns `PantryError::Storage` if no platform data directory can be
    /// determined or the directory cannot be created.
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        let dir = match &self.data_dir {
            Some(dir) => PathBuf::from(dir),
            None => ProjectDirs::from("com", "pantrypal", "pantrypal")
                .ok_or_else(|| PantryError::Storage("Could not determine data directory".into()))?
                .data_dir()
                .to_path_buf(),
        };

        std::fs::create_dir_all(&dir).map_err(|e| {
            PantryError::Storage(format!(
                "Failed to create data directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        Ok(dir)
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error: defaults are used and a warning is
    /// logged.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PantryError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| PantryError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        // `API_BASE` is honoured for compatibility with existing deployments;
        // the namespaced variable wins when both are set.
        if let Ok(base) = std::env::var("API_BASE") {
            self.api.base_url = base;
        }

        if let Ok(base) = std::env::var("PANTRYPAL_API_BASE") {
            self.api.base_url = base;
        }

        if let Ok(timeout) = std::env::var("PANTRYPAL_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.api.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid PANTRYPAL_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(dir) = std::env::var("PANTRYPAL_DATA_DIR") {
            tracing::debug!(data_dir = %dir, "Env override: PANTRYPAL_DATA_DIR");
            self.storage.data_dir = Some(dir);
        }

        if let Ok(backend) = std::env::var("PANTRYPAL_CREDENTIAL_BACKEND") {
            match backend.parse() {
                Ok(value) => self.storage.credential_backend = value,
                Err(_) => tracing::warn!("Invalid PANTRYPAL_CREDENTIAL_BACKEND: {}", backend),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(base) = &cli.api_base {
            self.api.base_url = base.clone();
        }

        if let Some(dir) = &cli.data_dir {
            self.storage.data_dir = Some(dir.clone());
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api.base_url).map_err(|e| {
            PantryError::Config(format!("Invalid api.base_url '{}': {}", self.api.base_url, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(PantryError::Config(format!(
                "api.base_url must use http or https, got: {}",
                url.scheme()
            ))
            .into());
        }

        if self.api.timeout_seconds == 0 {
            return Err(PantryError::Config(
                "api.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.api.timeout_seconds > 300 {
            return Err(PantryError::Config(
                "api.timeout_seconds must be less than or equal to 300".to_string(),
            )
            .into());
        }

        if self.storage.keyring_service.trim().is_empty() {
            return Err(PantryError::Config(
                "storage.keyring_service cannot be empty".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
