//! Resource registry

use indexmap::IndexMap;
use platform_client::ProviderMeta;

use crate::error::{ResourceError, Result};
use crate::resource::{Erased, HostResource, Resource};
use crate::resources::{LifecycleResource, StageResource};

/// Maximum Levenshtein distance for "did you mean" hints
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// All resources of one configured provider
pub struct Provider {
    meta: ProviderMeta,
    resources: IndexMap<&'static str, Box<dyn HostResource>>,
}

impl Provider {
    /// Provider with the stage and lifecycle resources registered
    pub fn new(meta: ProviderMeta) -> Self {
        let mut provider = Self::empty(meta);
        let stage = StageResource::new(&provider.meta);
        let lifecycle = LifecycleResource::new(&provider.meta);
        provider.register(stage);
        provider.register(lifecycle);
        provider
    }

    pub fn empty(meta: ProviderMeta) -> Self {
        Self {
            meta,
            resources: IndexMap::new(),
        }
    }

    pub fn register<R: Resource + 'static>(&mut self, resource: R) {
        self.resources
            .insert(resource.type_name(), Box::new(Erased(resource)));
    }

    pub fn meta(&self) -> &ProviderMeta {
        &self.meta
    }

    /// Registered type names, in registration order
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }

    pub fn resource(&self, type_name: &str) -> Result<&dyn HostResource> {
        match self.resources.get(type_name) {
            Some(resource) => Ok(resource.as_ref()),
            None => Err(ResourceError::UnknownResourceType {
                name: type_name.to_string(),
                help: self.suggest(type_name).map(|s| format!("did you mean '{}'?", s)),
            }),
        }
    }

    fn suggest(&self, type_name: &str) -> Option<&'static str> {
        self.type_names()
            .map(|name| (name, strsim::levenshtein(type_name, name)))
            .filter(|(_, distance)| *distance <= MAX_SUGGESTION_DISTANCE)
            .min_by_key(|(_, distance)| *distance)
            .map(|(name, _)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform_client::PlatformClient;

    fn provider() -> Provider {
        let client = PlatformClient::new("https://platform.example.com").unwrap();
        Provider::new(ProviderMeta::new(client))
    }

    #[test]
    fn test_registers_both_resources() {
        let provider = provider();
        assert_eq!(
            provider.type_names().collect::<Vec<_>>(),
            vec!["platform_lifecycle_stage", "platform_lifecycle"]
        );
        assert_eq!(
            provider.resource("platform_lifecycle").unwrap().type_name(),
            "platform_lifecycle"
        );
    }

    #[test]
    fn test_unknown_type_suggests_closest() {
        let provider = provider();
        let err = provider.resource("platform_lifecycle_stag").err().unwrap();

        match err {
            ResourceError::UnknownResourceType { name, help } => {
                assert_eq!(name, "platform_lifecycle_stag");
                assert_eq!(help.as_deref(), Some("did you mean 'platform_lifecycle_stage'?"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = provider.resource("repository").err().unwrap();
        assert!(matches!(
            err,
            ResourceError::UnknownResourceType { help: None, .. }
        ));
    }
}
