//! Provider metadata handed to every resource

use crate::client::PlatformClient;

/// Product identifier reported alongside operations
pub const DEFAULT_PRODUCT_ID: &str = concat!("platform-provider/", env!("CARGO_PKG_VERSION"));

/// Everything a resource needs to talk to the platform
///
/// Built once per configured provider by the host and shared by all
/// resources. Version strings may be empty when unknown; version gates
/// treat an empty version as "not reported".
#[derive(Debug, Clone)]
pub struct ProviderMeta {
    pub url: String,
    pub client: PlatformClient,
    pub product_id: String,
    pub platform_version: String,
    pub access_version: String,
}

impl ProviderMeta {
    pub fn new(client: PlatformClient) -> Self {
        Self {
            url: client.base_url().to_string(),
            client,
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            platform_version: String::new(),
            access_version: String::new(),
        }
    }

    pub fn with_product_id(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = product_id.into();
        self
    }

    pub fn with_platform_version(mut self, version: impl Into<String>) -> Self {
        self.platform_version = version.into();
        self
    }

    pub fn with_access_version(mut self, version: impl Into<String>) -> Self {
        self.access_version = version.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let client = PlatformClient::new("https://platform.example.com").unwrap();
        let meta = ProviderMeta::new(client)
            .with_access_version("7.130.1")
            .with_platform_version("7.104.2");

        assert_eq!(meta.url, "https://platform.example.com/");
        assert_eq!(meta.access_version, "7.130.1");
        assert_eq!(meta.platform_version, "7.104.2");
        assert!(meta.product_id.starts_with("platform-provider/"));
    }
}
