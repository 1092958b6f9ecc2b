//! Registry metadata sources
//!
//! This module provides:
//! - HTTP client shared foundation with retry logic
//! - npm registry source
//! - The `MetadataSource` trait the scanner fetches packuments through

mod client;
mod npm;

pub use client::HttpClient;
pub use npm::{NpmRegistry, DEFAULT_REGISTRY};

use crate::config::ScanConfig;
use crate::domain::Packument;
use crate::error::RegistryError;
use async_trait::async_trait;
use std::sync::Arc;

/// Anything that can return registry metadata for a package name
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Get the registry name used in error messages
    fn registry_name(&self) -> &str;

    /// Fetch the packument for a package
    async fn fetch(&self, package: &str) -> Result<Packument, RegistryError>;
}

/// Create the metadata source described by a scan configuration
pub fn create_source(config: &ScanConfig) -> Result<Arc<dyn MetadataSource>, RegistryError> {
    let client = HttpClient::new()?.with_prefer_online(config.prefer_online);
    Ok(Arc::new(NpmRegistry::with_base_url(
        client,
        config.registry.as_str(),
    )))
}
