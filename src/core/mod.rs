//! Core module containing the rule engine's types, contracts and orchestrator

pub mod error;
pub mod live;
pub mod merge;
pub mod params;
pub mod provider;
pub mod registry;
pub mod service;
pub mod set;

pub use error::{ProviderFamily, RuleError};
pub use live::{LiveResult, LiveStream};
pub use merge::{RuleGroup, RuleResult, UNGROUPED};
pub use params::{FilterParams, GroupByParams, OrderByParams, WatchOptions};
pub use provider::{FilterProvider, GroupByProvider, LiveItems, OrderByProvider};
pub use registry::{ProviderRegistry, RegistryBuilder};
pub use service::{CollectionRulesService, RuleStream};
pub use set::{DocId, DocIdSet, GroupMap};
