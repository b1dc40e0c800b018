//! Plugin-based provider registry
//!
//! The registry lets provider crates register a factory under a type name,
//! so the daemon can build whichever provider the configuration names
//! without a hardcoded match.
//!
//! ## Registration
//!
//! ```rust,ignore
//! use upsert_core::ProviderRegistry;
//!
//! // In upsert-provider-route53
//! pub fn register(registry: &ProviderRegistry) {
//!     registry.register_provider("route53", Box::new(Route53Factory));
//! }
//! ```

use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::traits::{DnsProviderClient, DnsProviderFactory};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Provider registry for plugin-based provider client creation
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Registered DNS provider factories
    providers: RwLock<HashMap<String, Box<dyn DnsProviderFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a DNS provider factory
    ///
    /// # Parameters
    ///
    /// - `name`: Provider type name (e.g., "route53")
    /// - `factory`: Factory object for creating provider instances
    pub fn register_provider(&self, name: impl Into<String>, factory: Box<dyn DnsProviderFactory>) {
        let name = name.into();
        let mut providers = self.providers.write().unwrap_or_else(PoisonError::into_inner);
        providers.insert(name, factory);
    }

    /// Create a provider client from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DnsProviderClient>)`: Created provider instance
    /// - `Err(Error)`: If provider type is not registered or creation fails
    pub fn create_provider(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProviderClient>> {
        let provider_type = config.type_name();
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);

        let factory = providers
            .get(provider_type)
            .ok_or_else(|| Error::config(format!("Unknown provider type: {}", provider_type)))?;

        factory.create(config)
    }

    /// List all registered provider types
    pub fn list_providers(&self) -> Vec<String> {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a provider type is registered
    pub fn has_provider(&self, name: &str) -> bool {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        providers.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::RecordMutationRequest;
    use crate::traits::ChangeDescriptor;
    use async_trait::async_trait;

    struct NullProvider;

    #[async_trait]
    impl DnsProviderClient for NullProvider {
        async fn mutate_record(&self, _request: &RecordMutationRequest) -> Result<ChangeDescriptor> {
            Ok(ChangeDescriptor::new("null", "INSYNC"))
        }

        fn provider_name(&self) -> &'static str {
            "null"
        }
    }

    struct NullProviderFactory;

    impl DnsProviderFactory for NullProviderFactory {
        fn create(&self, _config: &ProviderConfig) -> Result<Box<dyn DnsProviderClient>> {
            Ok(Box::new(NullProvider))
        }
    }

    fn custom(factory: &str) -> ProviderConfig {
        ProviderConfig::Custom {
            factory: factory.to_string(),
            config: serde_json::json!({}),
        }
    }

    #[test]
    fn test_registry_registration() {
        let registry = ProviderRegistry::new();

        assert!(!registry.has_provider("null"));

        registry.register_provider("null", Box::new(NullProviderFactory));

        assert!(registry.has_provider("null"));
        assert_eq!(registry.list_providers(), vec!["null".to_string()]);
    }

    #[test]
    fn create_dispatches_on_type_name() {
        let registry = ProviderRegistry::new();
        registry.register_provider("null", Box::new(NullProviderFactory));

        let provider = registry.create_provider(&custom("null")).unwrap();
        assert_eq!(provider.provider_name(), "null");
    }

    #[test]
    fn unknown_type_is_config_error() {
        let registry = ProviderRegistry::new();
        let err = registry.create_provider(&custom("nope")).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("nope"));
    }
}
