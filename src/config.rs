//! Configuration management for the Assistants MCP Gateway
//!
//! Handles environment variables, the optional providers file, and the
//! legacy single-key configuration.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, GatewayError, Result};
use crate::providers::ProviderCapabilities;

/// Default HTTP bind address for `serve`
pub const DEFAULT_BIND: &str = "127.0.0.1:8787";

/// Configuration for the gateway process
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding configuration files
    pub config_dir: PathBuf,

    /// Path to the multi-provider configuration file
    pub providers_path: PathBuf,

    /// Legacy single-provider API key
    pub openai_api_key: Option<String>,

    /// Override for the backend base URL
    pub openai_base_url: Option<String>,

    /// Optional organization header
    pub openai_organization: Option<String>,

    /// Include debug detail in error data
    pub debug: bool,

    /// Bind address for the HTTP host
    pub http_bind: SocketAddr,
}

impl Config {
    /// Create a configuration from the process environment
    pub fn new() -> Result<Self> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| {
                GatewayError::Config(ConfigError::DirNotFound {
                    path: "~".to_string(),
                })
            })?
            .join(".assistants-mcp");

        Self::from_lookup(config_dir, |name| std::env::var(name).ok())
    }

    /// Create a configuration from an arbitrary variable source
    pub fn from_lookup<F>(config_dir: PathBuf, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let providers_path = non_empty("ASSISTANTS_MCP_PROVIDERS")
            .map(PathBuf::from)
            .unwrap_or_else(|| config_dir.join("providers.json"));

        let debug = non_empty("ASSISTANTS_MCP_DEBUG")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let bind = non_empty("ASSISTANTS_MCP_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let http_bind = bind.parse().map_err(|_| {
            GatewayError::Config(ConfigError::InvalidConfig {
                message: format!("ASSISTANTS_MCP_BIND is not a socket address: {}", bind),
            })
        })?;

        Ok(Self {
            config_dir,
            providers_path,
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_base_url: non_empty("OPENAI_BASE_URL"),
            openai_organization: non_empty("OPENAI_ORGANIZATION"),
            debug,
            http_bind,
        })
    }

    /// Check if a providers file exists
    pub fn providers_file_exists(&self) -> bool {
        self.providers_path.exists()
    }

    /// Legacy single-provider settings taken from the environment
    pub fn legacy(&self) -> LegacyConfig {
        LegacyConfig {
            api_key: self.openai_api_key.clone(),
            base_url: self.openai_base_url.clone(),
            organization: self.openai_organization.clone(),
        }
    }

    /// Resolve the provider configuration.
    ///
    /// A providers file wins; otherwise the legacy environment settings are
    /// bridged into an equivalent one-entry configuration.
    pub fn providers_config(&self) -> Result<ProvidersConfig> {
        if !self.providers_file_exists() {
            return Ok(ProvidersConfig::from_legacy(self.legacy()));
        }

        let path = self.providers_path.display().to_string();
        let content = std::fs::read_to_string(&self.providers_path).map_err(|e| {
            GatewayError::Config(ConfigError::ProvidersFile {
                path: path.clone(),
                message: e.to_string(),
            })
        })?;

        let mut config: ProvidersConfig = serde_json::from_str(&content).map_err(|e| {
            GatewayError::Config(ConfigError::ProvidersFile {
                path,
                message: e.to_string(),
            })
        })?;

        // Environment fills OpenAI keys the file leaves out.
        if let Some(key) = &self.openai_api_key {
            config.fill_missing_api_keys(key);
        }

        Ok(config)
    }
}

/// Which implementation backs a configured provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI Assistants v2 API
    OpenAi,
    /// Declared for discovery only; every operation fails as not implemented
    Declared,
}

/// Settings handed to a provider's `initialize`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    /// Capability override (used by declared providers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<ProviderCapabilities>,
}

/// One entry of the providers file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEntry {
    #[serde(rename = "type")]
    pub kind: ProviderKind,

    #[serde(flatten)]
    pub config: ProviderConfig,
}

/// Multi-provider configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_provider: Option<String>,

    #[serde(default)]
    pub providers: BTreeMap<String, ProviderEntry>,
}

impl ProvidersConfig {
    /// Bridge a legacy single-key configuration into a one-entry registry config
    pub fn from_legacy(legacy: LegacyConfig) -> Self {
        let mut providers = BTreeMap::new();
        providers.insert(
            LEGACY_PROVIDER_NAME.to_string(),
            ProviderEntry {
                kind: ProviderKind::OpenAi,
                config: ProviderConfig {
                    api_key: legacy.api_key,
                    base_url: legacy.base_url,
                    organization: legacy.organization,
                    ..ProviderConfig::default()
                },
            },
        );

        Self {
            default_provider: Some(LEGACY_PROVIDER_NAME.to_string()),
            providers,
        }
    }

    /// Set `api_key` on every OpenAI entry that has none
    pub fn fill_missing_api_keys(&mut self, api_key: &str) {
        for entry in self.providers.values_mut() {
            if entry.kind == ProviderKind::OpenAi && entry.config.api_key.is_none() {
                entry.config.api_key = Some(api_key.to_string());
            }
        }
    }

    /// Copy of this configuration with a per-request key forwarded to every
    /// OpenAI entry.
    pub fn with_api_key(&self, api_key: &str) -> Self {
        let mut config = self.clone();
        for entry in config.providers.values_mut() {
            if entry.kind == ProviderKind::OpenAi {
                entry.config.api_key = Some(api_key.to_string());
            }
        }
        config
    }
}

/// Name given to the provider synthesized from legacy settings
pub const LEGACY_PROVIDER_NAME: &str = "openai";

/// Pre-registry configuration: one key, one backend
#[derive(Debug, Clone, Default)]
pub struct LegacyConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub organization: Option<String>,
}

/// OpenAI API constants
pub mod openai {
    /// Base URL for the OpenAI API
    pub const API_BASE_URL: &str = "https://api.openai.com/v1";

    /// Beta header required by the Assistants API
    pub const BETA_HEADER: (&str, &str) = ("OpenAI-Beta", "assistants=v2");
}
