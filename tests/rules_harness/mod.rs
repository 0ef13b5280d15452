//! Shared test harness for rule engine integration tests
//!
//! Provides a [`Fixture`] wiring an `InMemoryWorkspace` to a
//! `CollectionRulesService` with every built-in provider registered, plus a
//! [`SpyOrderBy`] provider that records how the engine drives it.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! mod rules_harness;
//! use rules_harness::*;
//! ```

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use collection_rules::prelude::*;

/// Install a test subscriber once; `RUST_LOG` controls verbosity
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A workspace and a service evaluating rules against it
pub struct Fixture {
    pub workspace: InMemoryWorkspace,
    pub service: CollectionRulesService,
}

impl Fixture {
    /// Unthrottled fixture: every merged state is emitted
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default().with_throttle(Duration::ZERO))
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::build(config, |builder| builder)
    }

    /// Fixture with extra providers registered on top of the built-in ones
    pub fn with_providers(extra: impl FnOnce(RegistryBuilder) -> RegistryBuilder) -> Self {
        Self::build(EngineConfig::default().with_throttle(Duration::ZERO), extra)
    }

    fn build(config: EngineConfig, extra: impl FnOnce(RegistryBuilder) -> RegistryBuilder) -> Self {
        init_tracing();
        let workspace = InMemoryWorkspace::new();
        let builder = register_workspace_providers(ProviderRegistry::builder(), &workspace.sources());
        let service = CollectionRulesService::new(extra(builder).build(), config);
        Self { workspace, service }
    }

    pub fn watch(&self, options: WatchOptions) -> RuleStream {
        self.service.watch(options).expect("watch should resolve every provider")
    }
}

/// Next successful result of a subscription
pub async fn next_result(stream: &mut RuleStream) -> RuleResult {
    stream
        .next()
        .await
        .expect("stream ended unexpectedly")
        .expect("rule failed")
}

/// Every id of a result, in group order
pub fn items(result: &RuleResult) -> Vec<&str> {
    result.all_items().map(String::as_str).collect()
}

pub fn group_keys(result: &RuleResult) -> Vec<&str> {
    result.groups.iter().map(|g| g.key.as_str()).collect()
}

pub fn tag_filter(method: &str, value: &str) -> FilterParams {
    FilterParams::new("system:tags", "tags", method).with_value(value)
}

/// Sets a flag when dropped
pub struct DropFlag(pub Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Order-by provider that keeps input order and counts the item sets it receives
#[derive(Default)]
pub struct SpyOrderBy {
    pub deliveries: Arc<AtomicUsize>,
    pub dropped: Arc<AtomicBool>,
}

impl SpyOrderBy {
    pub fn deliveries(&self) -> usize {
        self.deliveries.load(Ordering::SeqCst)
    }

    pub fn is_dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }
}

impl OrderByProvider for SpyOrderBy {
    fn order_by(
        &self,
        items: LiveItems,
        _params: &OrderByParams,
        _registry: &ProviderRegistry,
    ) -> LiveResult<Vec<DocId>> {
        let deliveries = self.deliveries.clone();
        let guard = DropFlag(self.dropped.clone());
        items
            .subscribe()
            .map(move |items| -> Result<Vec<DocId>, RuleError> {
                let _alive = &guard;
                deliveries.fetch_add(1, Ordering::SeqCst);
                Ok(items.to_vec())
            })
            .boxed()
    }
}
