//! npm registry metadata source
//!
//! Fetches full packuments from an npm-compatible registry.
//! API endpoint: {registry}/{package}, with scoped names encoded as `@scope%2Fname`

use crate::domain::Packument;
use crate::error::RegistryError;
use crate::registry::{HttpClient, MetadataSource};
use async_trait::async_trait;
use tracing::debug;

/// Public npm registry base URL
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// npm registry metadata source
#[derive(Debug, Clone)]
pub struct NpmRegistry {
    client: HttpClient,
    base_url: String,
}

impl NpmRegistry {
    /// Create a source for a registry base URL
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Build the URL for a package
    fn build_url(&self, package: &str) -> String {
        format!("{}/{}", self.base_url, encode_package_name(package))
    }
}

/// Escape the scope separator the way the registry expects
fn encode_package_name(package: &str) -> String {
    if package.starts_with('@') {
        package.replacen('/', "%2F", 1)
    } else {
        package.to_string()
    }
}

#[async_trait]
impl MetadataSource for NpmRegistry {
    fn registry_name(&self) -> &str {
        "npm"
    }

    async fn fetch(&self, package: &str) -> Result<Packument, RegistryError> {
        let url = self.build_url(package);
        debug!(package, url = %url, "fetching packument");

        let packument: Packument = self
            .client
            .get_json(&url, package, self.registry_name())
            .await?;

        Ok(packument.fill_missing_versions())
    }
}
