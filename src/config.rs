use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub capture: CaptureConfig,
}

/// Extraction service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Base URL of the Generative Language API.
    pub base_url: String,
    /// Model used for field extraction.
    pub model: String,
    /// API key. Usually left unset here and supplied via GEMINI_API_KEY.
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureConfig {
    /// Recognizer language tag passed to the capture backend.
    pub language: String,
    /// Preferred input device, when the backend supports selection.
    pub device: Option<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::DEFAULT_BASE_URL.to_string(),
            model: defaults::DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            device: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Propagates errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - GEMINI_API_KEY → extraction.api_key
    /// - RAPIDVOICE_MODEL → extraction.model
    /// - RAPIDVOICE_BASE_URL → extraction.base_url
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var(defaults::API_KEY_ENV)
            && !key.is_empty()
        {
            self.extraction.api_key = Some(key);
        }

        if let Ok(model) = std::env::var(defaults::MODEL_ENV)
            && !model.is_empty()
        {
            self.extraction.model = model;
        }

        if let Ok(url) = std::env::var(defaults::BASE_URL_ENV)
            && !url.is_empty()
        {
            self.extraction.base_url = url;
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/rapidvoice/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rapidvoice")
            .join("config.toml")
    }

    /// A commented configuration template with every key at its default.
    pub fn dump_template() -> &'static str {
        r#"# rapidvoice configuration
# Place at ~/.config/rapidvoice/config.toml

[extraction]
# Base URL of the Generative Language API
# base_url = "https://generativelanguage.googleapis.com"

# Model used for field extraction
# model = "gemini-2.0-flash"

# API key. Prefer the GEMINI_API_KEY environment variable over storing
# the key in this file.
# api_key = ""

# Request timeout in seconds
# timeout_secs = 60

[capture]
# Recognition language tag
# language = "en-US"

# Capture device (default: system default microphone)
# device = ""
"#
    }
}
