//! Configuration management infrastructure.
//!
//! Trust anchors for chain validation and the banner texts shown for each
//! verdict are read from a TOML file; every field has a default so a partial
//! (or missing) file still yields a usable configuration.

use crate::infra::error::{SmimeError, SmimeResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Placeholder replaced with the signer identity in banner templates.
pub const SENDER_PLACEHOLDER: &str = "{sender}";
/// Placeholder replaced with the issuer organization in banner templates.
pub const ISSUER_PLACEHOLDER: &str = "{issuer}";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfiguration {
    /// Trust anchors used by the chain-validating cascade stages
    pub trust: TrustConfig,

    /// Localized banner texts
    pub banner: BannerTexts,
}

/// Trust anchor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustConfig {
    /// PEM bundle of trusted CA certificates
    pub ca_file: Option<PathBuf>,

    /// Hashed directory of trusted CA certificates (`c_rehash` layout)
    pub ca_dir: Option<PathBuf>,

    /// Whether to load the system default trust locations
    pub use_system_roots: bool,
}

/// Banner texts. `valid` and `unverified` must contain `{sender}`;
/// `{issuer}` is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BannerTexts {
    pub valid: String,
    pub unverified: String,
    pub invalid: String,
    /// Substituted for `{issuer}` when the certificate names no organization
    pub unknown_issuer: String,
    /// Joins signer addresses when a certificate asserts more than one
    pub email_separator: String,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            ca_file: None,
            ca_dir: None,
            use_system_roots: true,
        }
    }
}

impl Default for BannerTexts {
    fn default() -> Self {
        Self {
            valid: "Valid signature from {sender}, certificate issued by {issuer}.".to_string(),
            unverified: "Signature from {sender} is intact, but the certificate issued by {issuer} could not be verified.".to_string(),
            invalid: "Invalid signature! The message may have been tampered with.".to_string(),
            unknown_issuer: "an unknown issuer".to_string(),
            email_separator: ", ".to_string(),
        }
    }
}

/// Configuration manager for handling config files
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new configuration manager with default path
    pub fn new() -> SmimeResult<Self> {
        let config_path = Self::default_config_path()?;
        Ok(Self { config_path })
    }

    /// Create a configuration manager with custom path
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> SmimeResult<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Ok(config_dir.join("smime-verify").join("config.toml"))
        } else {
            Ok(PathBuf::from("smime-verify-config.toml"))
        }
    }

    /// Get the configuration file path
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration from file, falling back to defaults if it doesn't exist
    pub fn load_or_default(&self) -> SmimeResult<VerifierConfiguration> {
        if self.config_path.exists() {
            self.load()
        } else {
            log::debug!(
                "Configuration file not found, using defaults: {}",
                self.config_path.display()
            );
            Ok(VerifierConfiguration::default())
        }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub fn load_or_create_default(&self) -> SmimeResult<VerifierConfiguration> {
        if self.config_path.exists() {
            self.load()
        } else {
            log::info!(
                "Configuration file not found, creating default: {}",
                self.config_path.display()
            );
            let default_config = VerifierConfiguration::default();
            self.save(&default_config)?;
            Ok(default_config)
        }
    }

    /// Load configuration from file
    pub fn load(&self) -> SmimeResult<VerifierConfiguration> {
        log::info!("Loading configuration from: {}", self.config_path.display());

        let content = fs::read_to_string(&self.config_path).map_err(|e| {
            SmimeError::ConfigurationError(format!(
                "Failed to read config file {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        let config: VerifierConfiguration = toml::from_str(&content).map_err(|e| {
            SmimeError::ConfigurationError(format!("Failed to parse config file: {e}"))
        })?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &VerifierConfiguration) -> SmimeResult<()> {
        log::info!("Saving configuration to: {}", self.config_path.display());

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SmimeError::ConfigurationError(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let content = toml::to_string_pretty(config).map_err(|e| {
            SmimeError::ConfigurationError(format!("Failed to serialize config: {e}"))
        })?;

        fs::write(&self.config_path, content).map_err(|e| {
            SmimeError::ConfigurationError(format!(
                "Failed to write config file {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// Export the effective configuration as a portable format
    pub fn export_config(&self, format: ExportFormat) -> SmimeResult<String> {
        let config = self.load_or_default()?;

        match format {
            ExportFormat::Toml => toml::to_string_pretty(&config)
                .map_err(|e| SmimeError::ConfigurationError(format!("TOML export failed: {e}"))),
            ExportFormat::Json => serde_json::to_string_pretty(&config)
                .map_err(|e| SmimeError::ConfigurationError(format!("JSON export failed: {e}"))),
            ExportFormat::Yaml => serde_yaml::to_string(&config)
                .map_err(|e| SmimeError::ConfigurationError(format!("YAML export failed: {e}"))),
        }
    }

    /// Import configuration from a string and save it
    pub fn import_config(&self, content: &str, format: ExportFormat) -> SmimeResult<()> {
        let config: VerifierConfiguration = match format {
            ExportFormat::Toml => toml::from_str(content).map_err(|e| {
                SmimeError::ConfigurationError(format!("TOML import failed: {e}"))
            })?,
            ExportFormat::Json => serde_json::from_str(content).map_err(|e| {
                SmimeError::ConfigurationError(format!("JSON import failed: {e}"))
            })?,
            ExportFormat::Yaml => serde_yaml::from_str(content).map_err(|e| {
                SmimeError::ConfigurationError(format!("YAML import failed: {e}"))
            })?,
        };

        validate_config(&config)?;
        self.save(&config)
    }
}

/// Configuration export/import formats
#[derive(Debug, Clone, Copy)]
pub enum ExportFormat {
    Toml,
    Json,
    Yaml,
}

/// Validate configuration values
pub fn validate_config(config: &VerifierConfiguration) -> SmimeResult<()> {
    if let Some(ca_file) = &config.trust.ca_file {
        if !ca_file.is_file() {
            return Err(SmimeError::ConfigurationError(format!(
                "CA file doesn't exist: {}",
                ca_file.display()
            )));
        }
    }

    if let Some(ca_dir) = &config.trust.ca_dir {
        if !ca_dir.is_dir() {
            return Err(SmimeError::ConfigurationError(format!(
                "CA directory doesn't exist: {}",
                ca_dir.display()
            )));
        }
    }

    for (name, template) in [
        ("valid", &config.banner.valid),
        ("unverified", &config.banner.unverified),
    ] {
        if !template.contains(SENDER_PLACEHOLDER) {
            return Err(SmimeError::ConfigurationError(format!(
                "Banner text '{name}' must contain {SENDER_PLACEHOLDER}"
            )));
        }
    }

    Ok(())
}
