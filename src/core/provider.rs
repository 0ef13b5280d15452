//! Provider contracts for the three clause families
//!
//! A provider evaluates one clause kind against live document facts. Providers
//! are registered in a [`ProviderRegistry`] under a string key and receive the
//! registry on every call, so dispatch providers can re-resolve a concrete
//! provider at evaluation time.
//!
//! Every returned stream is live: it emits the current result, then a new one
//! whenever the result changes. Errors are emitted as items, never panics.

use super::live::{LiveResult, SharedLive};
use super::params::{FilterParams, GroupByParams, OrderByParams};
use super::registry::ProviderRegistry;
use super::set::{DocId, DocIdSet, GroupMap};

/// The already-filtered id set handed to group-by and order-by providers
pub type LiveItems = SharedLive<DocIdSet>;

/// Answers which documents currently satisfy a filter clause
///
/// Implementations must not emit a new set when the content is unchanged.
/// An unknown `method` or undecodable `value` is emitted as an error item.
pub trait FilterProvider: Send + Sync {
    fn filter(&self, params: &FilterParams, registry: &ProviderRegistry) -> LiveResult<DocIdSet>;
}

/// Partitions a live id set into named buckets
///
/// Buckets only ever contain ids from `items`. A document without a group is
/// left out of the map; a document with several groups appears in each.
pub trait GroupByProvider: Send + Sync {
    fn group_by(
        &self,
        items: LiveItems,
        params: &GroupByParams,
        registry: &ProviderRegistry,
    ) -> LiveResult<GroupMap>;
}

/// Produces a live total order over a live id set
///
/// The sequence only contains ids from `items`. When the ordering key becomes
/// invalid the provider emits an empty ordering rather than an error.
pub trait OrderByProvider: Send + Sync {
    fn order_by(
        &self,
        items: LiveItems,
        params: &OrderByParams,
        registry: &ProviderRegistry,
    ) -> LiveResult<Vec<DocId>>;
}
