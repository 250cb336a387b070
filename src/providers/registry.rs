//! Named provider registry
//!
//! Built once from configuration. Providers that fail to initialize are
//! logged and left out, so everything reachable through the registry is
//! usable (or at least declared).

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::{LegacyConfig, ProviderEntry, ProviderKind, ProvidersConfig};
use crate::error::Result;
use crate::providers::declared::DeclaredProvider;
use crate::providers::openai::OpenAiProvider;
use crate::providers::{Provider, ProviderMetadata};

/// Provider instances keyed by name, plus the default name
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn Provider>>,
    default_provider: Option<String>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.provider_names())
            .field("default_provider", &self.default_provider)
            .finish()
    }
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and initialize every configured provider
    pub async fn from_config(config: &ProvidersConfig) -> Self {
        let mut registry = Self::new();

        for (name, entry) in &config.providers {
            match create_provider(name, entry).await {
                Ok(provider) => {
                    tracing::debug!(provider = %name, kind = ?entry.kind, "provider registered");
                    registry.register(name.clone(), provider);
                }
                Err(e) => {
                    tracing::warn!(provider = %name, error = %e, "provider failed to initialize; not registered");
                }
            }
        }

        registry.default_provider = match &config.default_provider {
            Some(name) if registry.providers.contains_key(name) => Some(name.clone()),
            Some(name) => {
                tracing::warn!(provider = %name, "configured default provider is unavailable");
                None
            }
            None if registry.providers.len() == 1 => registry.providers.keys().next().cloned(),
            None => None,
        };

        registry
    }

    /// Bridge a legacy single-key configuration into a one-entry registry
    pub async fn from_legacy(legacy: LegacyConfig) -> Self {
        Self::from_config(&ProvidersConfig::from_legacy(legacy)).await
    }

    /// Register (or replace) a provider under `name`
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Choose the default provider; ignored if `name` is not registered
    pub fn set_default(&mut self, name: &str) -> bool {
        if self.providers.contains_key(name) {
            self.default_provider = Some(name.to_string());
            true
        } else {
            false
        }
    }

    pub fn get_provider(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    pub fn default_provider(&self) -> Option<Arc<dyn Provider>> {
        self.default_provider
            .as_deref()
            .and_then(|name| self.get_provider(name))
    }

    pub fn default_provider_name(&self) -> Option<&str> {
        self.default_provider.as_deref()
    }

    /// Sorted provider names
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    pub fn metadata(&self) -> Vec<ProviderMetadata> {
        self.providers
            .values()
            .map(|p| p.metadata().clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }
}

async fn create_provider(name: &str, entry: &ProviderEntry) -> Result<Arc<dyn Provider>> {
    let mut provider: Box<dyn Provider> = match entry.kind {
        ProviderKind::OpenAi => Box::new(OpenAiProvider::new(name)),
        ProviderKind::Declared => Box::new(DeclaredProvider::new(name)),
    };
    provider.initialize(&entry.config).await?;
    Ok(Arc::from(provider))
}
