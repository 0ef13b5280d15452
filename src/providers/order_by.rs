//! Leaf order-by providers
//!
//! Documents without a sort key always sort last, in input order. `desc`
//! reverses the keyed documents only. Sorting is stable, so ties keep the
//! order of the filtered set.

use futures::StreamExt;
use std::sync::Arc;

use super::field::Field;
use super::{items_with_docs, live_tags};
use crate::core::error::RuleError;
use crate::core::live::{self, LiveResult};
use crate::core::params::OrderByParams;
use crate::core::provider::{LiveItems, OrderByProvider};
use crate::core::registry::ProviderRegistry;
use crate::core::set::DocId;
use crate::facts::{DocsSource, TagSource};

fn sort_keyed<K: Ord>(entries: Vec<(DocId, Option<K>)>, desc: bool) -> Vec<DocId> {
    let (mut keyed, unkeyed): (Vec<_>, Vec<_>) = entries.into_iter().partition(|(_, key)| key.is_some());
    keyed.sort_by(|(_, a), (_, b)| match desc {
        true => b.cmp(a),
        false => a.cmp(b),
    });
    keyed.into_iter().chain(unkeyed).map(|(id, _)| id).collect()
}

/// Orders by the value of a [`Field`]
pub struct FieldOrderBy {
    docs: Arc<dyn DocsSource>,
    field: Field,
}

impl FieldOrderBy {
    pub fn new(docs: Arc<dyn DocsSource>, field: Field) -> Self {
        Self { docs, field }
    }
}

impl OrderByProvider for FieldOrderBy {
    fn order_by(
        &self,
        items: LiveItems,
        params: &OrderByParams,
        _registry: &ProviderRegistry,
    ) -> LiveResult<Vec<DocId>> {
        let field = self.field;
        let key = params.key.clone();
        let desc = params.desc;

        let ordered = items_with_docs(&items, self.docs.docs())
            .map(move |(items, docs)| -> Result<Vec<DocId>, RuleError> {
                let entries = items
                    .into_iter()
                    .map(|id| {
                        let value = docs.get(&id).and_then(|doc| field.value(doc, &key));
                        (id, value)
                    })
                    .collect();
                Ok(sort_keyed(entries, desc))
            })
            .boxed();
        live::distinct(ordered)
    }
}

/// Orders by the sorted names of a document's live tags
pub struct TagsOrderBy {
    docs: Arc<dyn DocsSource>,
    tags: Arc<dyn TagSource>,
}

impl TagsOrderBy {
    pub fn new(docs: Arc<dyn DocsSource>, tags: Arc<dyn TagSource>) -> Self {
        Self { docs, tags }
    }
}

impl OrderByProvider for TagsOrderBy {
    fn order_by(
        &self,
        items: LiveItems,
        params: &OrderByParams,
        _registry: &ProviderRegistry,
    ) -> LiveResult<Vec<DocId>> {
        let desc = params.desc;
        let facts = live::combine_latest(self.docs.docs(), self.tags.tags());

        let ordered = live::combine_latest(items.subscribe(), facts)
            .map(move |(items, (docs, tags))| -> Result<Vec<DocId>, RuleError> {
                let entries = items
                    .into_iter()
                    .map(|id| {
                        let names = docs.get(&id).map(|doc| {
                            let mut names: Vec<String> = live_tags(doc, &tags).map(|tag| tag.name.clone()).collect();
                            names.sort();
                            names
                        });
                        (id, names.filter(|names| !names.is_empty()))
                    })
                    .collect();
                Ok(sort_keyed(entries, desc))
            })
            .boxed();
        live::distinct(ordered)
    }
}
