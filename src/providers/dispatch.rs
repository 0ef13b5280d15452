//! Dispatch providers
//!
//! `system` clauses are routed to `system:<key>`. `property` clauses follow
//! the declared type of the property and are routed to `property:<type>`,
//! switching to a new provider whenever the type changes.

use futures::StreamExt;
use std::sync::Arc;

use crate::core::error::RuleError;
use crate::core::live::{self, LiveResult, LiveStream};
use crate::core::params::{FilterParams, GroupByParams, OrderByParams};
use crate::core::provider::{FilterProvider, GroupByProvider, LiveItems, OrderByProvider};
use crate::core::registry::ProviderRegistry;
use crate::core::set::{DocId, DocIdSet, GroupMap};
use crate::facts::PropertySchemaSource;

fn system_key(key: &str) -> String {
    format!("system:{key}")
}

/// The provider key of a property's current type, `None` while undefined
fn property_kind(properties: &dyn PropertySchemaSource, key: &str) -> LiveStream<Option<String>> {
    let kinds = properties
        .property_info(key)
        .map(|info| info.map(|info| format!("property:{}", info.kind)))
        .boxed();
    live::distinct(kinds)
}

pub struct SystemFilterProvider;

impl FilterProvider for SystemFilterProvider {
    fn filter(&self, params: &FilterParams, registry: &ProviderRegistry) -> LiveResult<DocIdSet> {
        match registry.filter_provider(&system_key(&params.key)) {
            Ok(provider) => provider.filter(params, registry),
            Err(e) => live::fail(e),
        }
    }
}

pub struct SystemGroupByProvider;

impl GroupByProvider for SystemGroupByProvider {
    fn group_by(
        &self,
        items: LiveItems,
        params: &GroupByParams,
        registry: &ProviderRegistry,
    ) -> LiveResult<GroupMap> {
        match registry.group_by_provider(&system_key(&params.key)) {
            Ok(provider) => provider.group_by(items, params, registry),
            Err(e) => live::fail(e),
        }
    }
}

pub struct SystemOrderByProvider;

impl OrderByProvider for SystemOrderByProvider {
    fn order_by(
        &self,
        items: LiveItems,
        params: &OrderByParams,
        registry: &ProviderRegistry,
    ) -> LiveResult<Vec<DocId>> {
        match registry.order_by_provider(&system_key(&params.key)) {
            Ok(provider) => provider.order_by(items, params, registry),
            Err(e) => live::fail(e),
        }
    }
}

/// Filters through the provider of the property's declared type
///
/// An undefined property is an [`RuleError::UnknownProperty`] error item.
pub struct PropertyFilterProvider {
    properties: Arc<dyn PropertySchemaSource>,
}

impl PropertyFilterProvider {
    pub fn new(properties: Arc<dyn PropertySchemaSource>) -> Self {
        Self { properties }
    }
}

impl FilterProvider for PropertyFilterProvider {
    fn filter(&self, params: &FilterParams, registry: &ProviderRegistry) -> LiveResult<DocIdSet> {
        let registry = registry.clone();
        let params = params.clone();
        let kinds = property_kind(self.properties.as_ref(), &params.key);

        live::switch_map(kinds, move |kind| {
            let Some(kind) = kind else {
                return live::fail(RuleError::UnknownProperty(params.key.clone()));
            };
            tracing::trace!(property = %params.key, provider = %kind, "Dispatching property filter");
            match registry.filter_provider(&kind) {
                Ok(provider) => provider.filter(&params, &registry),
                Err(e) => live::fail(e),
            }
        })
    }
}

/// Groups through the provider of the property's declared type
///
/// An undefined property groups nothing.
pub struct PropertyGroupByProvider {
    properties: Arc<dyn PropertySchemaSource>,
}

impl PropertyGroupByProvider {
    pub fn new(properties: Arc<dyn PropertySchemaSource>) -> Self {
        Self { properties }
    }
}

impl GroupByProvider for PropertyGroupByProvider {
    fn group_by(
        &self,
        items: LiveItems,
        params: &GroupByParams,
        registry: &ProviderRegistry,
    ) -> LiveResult<GroupMap> {
        let registry = registry.clone();
        let params = params.clone();
        let kinds = property_kind(self.properties.as_ref(), &params.key);

        live::switch_map(kinds, move |kind| {
            let Some(kind) = kind else {
                return live::once(Ok(GroupMap::new()));
            };
            tracing::trace!(property = %params.key, provider = %kind, "Dispatching property group-by");
            match registry.group_by_provider(&kind) {
                Ok(provider) => provider.group_by(items.clone(), &params, &registry),
                Err(e) => live::fail(e),
            }
        })
    }
}

/// Orders through the provider of the property's declared type
///
/// An undefined property yields an empty ordering.
pub struct PropertyOrderByProvider {
    properties: Arc<dyn PropertySchemaSource>,
}

impl PropertyOrderByProvider {
    pub fn new(properties: Arc<dyn PropertySchemaSource>) -> Self {
        Self { properties }
    }
}

impl OrderByProvider for PropertyOrderByProvider {
    fn order_by(
        &self,
        items: LiveItems,
        params: &OrderByParams,
        registry: &ProviderRegistry,
    ) -> LiveResult<Vec<DocId>> {
        let registry = registry.clone();
        let params = params.clone();
        let kinds = property_kind(self.properties.as_ref(), &params.key);

        live::switch_map(kinds, move |kind| {
            let Some(kind) = kind else {
                return live::once(Ok(Vec::new()));
            };
            tracing::trace!(property = %params.key, provider = %kind, "Dispatching property order-by");
            match registry.order_by_provider(&kind) {
                Ok(provider) => provider.order_by(items.clone(), &params, &registry),
                Err(e) => live::fail(e),
            }
        })
    }
}
