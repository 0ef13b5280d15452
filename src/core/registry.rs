//! Provider registry
//!
//! Maps provider keys (`system`, `property`, `system:tags`, `property:checkbox`,
//! ...) to one provider per family. The registry is read-only once built and
//! cheap to clone, so it is the only state shared across subscriptions.

use std::collections::HashMap;
use std::sync::Arc;

use super::error::{ProviderFamily, RuleError};
use super::live::{self, LiveResult};
use super::params::FilterParams;
use super::provider::{FilterProvider, GroupByProvider, OrderByProvider};
use super::set::DocIdSet;

#[derive(Default)]
struct Providers {
    filters: HashMap<String, Arc<dyn FilterProvider>>,
    group_by: HashMap<String, Arc<dyn GroupByProvider>>,
    order_by: HashMap<String, Arc<dyn OrderByProvider>>,
}

/// Registry for resolving provider keys to implementations
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    inner: Arc<Providers>,
}

impl ProviderRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Resolve a filter provider by exact key
    pub fn filter_provider(&self, key: &str) -> Result<Arc<dyn FilterProvider>, RuleError> {
        self.inner
            .filters
            .get(key)
            .cloned()
            .ok_or_else(|| RuleError::unsupported(ProviderFamily::Filter, key))
    }

    /// Resolve a group-by provider by exact key
    pub fn group_by_provider(&self, key: &str) -> Result<Arc<dyn GroupByProvider>, RuleError> {
        self.inner
            .group_by
            .get(key)
            .cloned()
            .ok_or_else(|| RuleError::unsupported(ProviderFamily::GroupBy, key))
    }

    /// Resolve an order-by provider by exact key
    pub fn order_by_provider(&self, key: &str) -> Result<Arc<dyn OrderByProvider>, RuleError> {
        self.inner
            .order_by
            .get(key)
            .cloned()
            .ok_or_else(|| RuleError::unsupported(ProviderFamily::OrderBy, key))
    }

    /// Evaluate a filter clause through the provider its `type` names
    ///
    /// A missing provider becomes an error item rather than a failed call.
    pub fn filter(&self, params: &FilterParams) -> LiveResult<DocIdSet> {
        match self.filter_provider(&params.kind) {
            Ok(provider) => provider.filter(params, self),
            Err(e) => live::fail(e),
        }
    }

    /// All keys registered for a family, sorted
    pub fn keys(&self, family: ProviderFamily) -> Vec<&str> {
        let mut keys: Vec<&str> = match family {
            ProviderFamily::Filter => self.inner.filters.keys().map(String::as_str).collect(),
            ProviderFamily::GroupBy => self.inner.group_by.keys().map(String::as_str).collect(),
            ProviderFamily::OrderBy => self.inner.order_by.keys().map(String::as_str).collect(),
        };
        keys.sort_unstable();
        keys
    }
}

/// Collects providers before the registry is frozen
#[derive(Default)]
pub struct RegistryBuilder {
    providers: Providers,
}

impl RegistryBuilder {
    /// Register a filter provider; a later registration under the same key wins
    pub fn filter(mut self, key: impl Into<String>, provider: Arc<dyn FilterProvider>) -> Self {
        self.providers.filters.insert(key.into(), provider);
        self
    }

    pub fn group_by(mut self, key: impl Into<String>, provider: Arc<dyn GroupByProvider>) -> Self {
        self.providers.group_by.insert(key.into(), provider);
        self
    }

    pub fn order_by(mut self, key: impl Into<String>, provider: Arc<dyn OrderByProvider>) -> Self {
        self.providers.order_by.insert(key.into(), provider);
        self
    }

    pub fn build(self) -> ProviderRegistry {
        ProviderRegistry {
            inner: Arc::new(self.providers),
        }
    }
}
