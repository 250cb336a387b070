//! Providers declared in configuration without an implementation.
//!
//! They show up in discovery with whatever capabilities the configuration
//! advertises, and every operation fails as not implemented.

use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::error::Result;
use crate::providers::{Provider, ProviderCapabilities, ProviderMetadata};

pub struct DeclaredProvider {
    metadata: ProviderMetadata,
}

impl DeclaredProvider {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            metadata: ProviderMetadata {
                display_name: name.clone(),
                name,
                version: "unimplemented".to_string(),
                capabilities: ProviderCapabilities::default(),
                config_schema: None,
            },
        }
    }
}

#[async_trait]
impl Provider for DeclaredProvider {
    fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    async fn initialize(&mut self, config: &ProviderConfig) -> Result<()> {
        if let Some(capabilities) = config.capabilities {
            self.metadata.capabilities = capabilities;
        }
        Ok(())
    }

    async fn validate_connection(&self) -> bool {
        false
    }
}
