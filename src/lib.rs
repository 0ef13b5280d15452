//! # Collection Rules
//!
//! A reactive, rule-based document query engine.
//!
//! A rule is a list of filter clauses plus an optional group-by and order-by
//! clause. Given a rule, the engine produces a live stream of results that is
//! recomputed whenever the underlying workspace facts change.
//!
//! ## Features
//!
//! - **Pluggable Providers**: Filters, groupings and orderings are looked up by key in a registry
//! - **Live Results**: Every stage is a continuously-updating stream
//! - **Fault Isolation**: A failing filter clause is reported per clause, the rest keep evaluating
//! - **Fan-out Grouping**: A document can belong to several groups (e.g. one per tag)
//! - **Throttled Output**: Bursts of fact changes collapse into one emission per window
//! - **Configuration-Based**: Engine settings load from YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use collection_rules::prelude::*;
//!
//! let workspace = InMemoryWorkspace::new();
//! workspace.put_tag(TagMeta::new("t1", "urgent"));
//! workspace.upsert_doc(DocRecord::new("d1").with_tags(["t1"]));
//!
//! let registry = register_workspace_providers(ProviderRegistry::builder(), &workspace.sources()).build();
//! let service = CollectionRulesService::new(registry, EngineConfig::default());
//!
//! let options = WatchOptions::new(vec![
//!     FilterParams::new("system", "tags", "include-any-of").with_value("t1"),
//! ])
//! .with_order_by(OrderByParams::new("system", "updatedAt").descending());
//!
//! let mut results = service.watch(options)?;
//! while let Some(result) = results.next().await {
//!     let result = result?;
//!     for group in &result.groups {
//!         println!("{}: {:?}", group.key, group.items);
//!     }
//! }
//! ```

pub mod config;
pub mod core;
pub mod facts;
pub mod providers;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        error::{ProviderFamily, RuleError},
        live::{LiveResult, LiveStream},
        merge::{RuleGroup, RuleResult, UNGROUPED},
        params::{FilterParams, GroupByParams, OrderByParams, WatchOptions},
        provider::{FilterProvider, GroupByProvider, LiveItems, OrderByProvider},
        registry::{ProviderRegistry, RegistryBuilder},
        service::{CollectionRulesService, RuleStream},
        set::{DocId, DocIdSet, GroupMap},
    };

    // === Facts ===
    pub use crate::facts::{
        DocMode, DocRecord, DocsSource, FavoriteSource, PropertyInfo, PropertySchemaSource,
        ShareSource, TagMeta, TagSource, WorkspaceSources,
    };

    // === Providers ===
    pub use crate::providers::register_workspace_providers;

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryWorkspace;

    // === Config ===
    pub use crate::config::EngineConfig;

    // === External dependencies ===
    pub use chrono::{DateTime, NaiveDate, Utc};
    pub use futures::StreamExt;
    pub use uuid::Uuid;
}
