//! Leaf group-by providers

use futures::StreamExt;
use std::sync::Arc;

use super::field::Field;
use super::{items_with_docs, live_tags};
use crate::core::error::RuleError;
use crate::core::live::{self, LiveResult};
use crate::core::params::GroupByParams;
use crate::core::provider::{GroupByProvider, LiveItems};
use crate::core::registry::ProviderRegistry;
use crate::core::set::GroupMap;
use crate::facts::{DocsSource, TagSource};

/// Groups by the value of a [`Field`]
///
/// Documents without a value (or with empty text) are left ungrouped.
pub struct FieldGroupBy {
    docs: Arc<dyn DocsSource>,
    field: Field,
}

impl FieldGroupBy {
    pub fn new(docs: Arc<dyn DocsSource>, field: Field) -> Self {
        Self { docs, field }
    }
}

impl GroupByProvider for FieldGroupBy {
    fn group_by(
        &self,
        items: LiveItems,
        params: &GroupByParams,
        _registry: &ProviderRegistry,
    ) -> LiveResult<GroupMap> {
        let field = self.field;
        let key = params.key.clone();

        let grouped = items_with_docs(&items, self.docs.docs())
            .map(move |(items, docs)| -> Result<GroupMap, RuleError> {
                let mut groups = GroupMap::new();
                for id in &items {
                    let Some(value) = docs.get(id).and_then(|doc| field.value(doc, &key)) else {
                        continue;
                    };
                    let label = value.group_key();
                    if !label.is_empty() {
                        groups.entry(label).or_default().insert(id.clone());
                    }
                }
                Ok(groups)
            })
            .boxed();
        live::distinct(grouped)
    }
}

/// Groups by tag id, one bucket per live tag
///
/// A document with several tags appears in each of their buckets.
pub struct TagsGroupBy {
    docs: Arc<dyn DocsSource>,
    tags: Arc<dyn TagSource>,
}

impl TagsGroupBy {
    pub fn new(docs: Arc<dyn DocsSource>, tags: Arc<dyn TagSource>) -> Self {
        Self { docs, tags }
    }
}

impl GroupByProvider for TagsGroupBy {
    fn group_by(
        &self,
        items: LiveItems,
        _params: &GroupByParams,
        _registry: &ProviderRegistry,
    ) -> LiveResult<GroupMap> {
        let facts = live::combine_latest(self.docs.docs(), self.tags.tags());
        let grouped = live::combine_latest(items.subscribe(), facts)
            .map(|(items, (docs, tags))| -> Result<GroupMap, RuleError> {
                let mut groups = GroupMap::new();
                for id in &items {
                    let Some(doc) = docs.get(id) else {
                        continue;
                    };
                    for tag in live_tags(doc, &tags) {
                        groups.entry(tag.id.clone()).or_default().insert(id.clone());
                    }
                }
                Ok(groups)
            })
            .boxed();
        live::distinct(grouped)
    }
}

#[cfg(all(test, feature = "in-memory"))]
mod tests {
    use super::*;
    use crate::core::live::LivePublisher;
    use crate::core::set::DocIdSet;
    use crate::facts::{DocRecord, TagMeta};
    use crate::storage::InMemoryWorkspace;

    fn publish(ids: &[&str]) -> LivePublisher<DocIdSet> {
        let publisher = LivePublisher::new();
        publisher.publish(ids.iter().copied().collect());
        publisher
    }

    #[tokio::test]
    async fn test_text_groups_skip_empty_values() {
        let workspace = InMemoryWorkspace::new();
        workspace.upsert_doc(DocRecord::new("d1").with_property("status", "done"));
        workspace.upsert_doc(DocRecord::new("d2").with_property("status", ""));
        workspace.upsert_doc(DocRecord::new("d3").with_property("status", "done"));
        workspace.upsert_doc(DocRecord::new("d4").with_property("status", "todo"));
        let provider = FieldGroupBy::new(workspace.sources().docs, Field::Text);

        let items = publish(&["d1", "d2", "d3"]);
        let params = GroupByParams::new("property", "status");
        let mut grouped = provider.group_by(items.subscriber(), &params, &ProviderRegistry::default());

        let groups = grouped.next().await.unwrap().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups["done"], DocIdSet::from(["d1", "d3"]));
    }

    #[tokio::test]
    async fn test_groups_follow_items() {
        let workspace = InMemoryWorkspace::new();
        workspace.upsert_doc(DocRecord::new("d1").with_property("done", "true"));
        workspace.upsert_doc(DocRecord::new("d2"));
        let provider = FieldGroupBy::new(workspace.sources().docs, Field::Checkbox);

        let items = publish(&["d1"]);
        let params = GroupByParams::new("property", "done");
        let mut grouped = provider.group_by(items.subscriber(), &params, &ProviderRegistry::default());
        let groups = grouped.next().await.unwrap().unwrap();
        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["true"]);

        items.publish(DocIdSet::from(["d1", "d2"]));
        let groups = grouped.next().await.unwrap().unwrap();
        assert_eq!(groups["false"], DocIdSet::from(["d2"]));
    }

    #[tokio::test]
    async fn test_tags_fan_out_and_ignore_deleted_tags() {
        let workspace = InMemoryWorkspace::new();
        workspace.put_tag(TagMeta::new("t1", "urgent"));
        workspace.put_tag(TagMeta::new("t2", "later"));
        workspace.upsert_doc(DocRecord::new("d1").with_tags(["t1", "t2"]));
        workspace.upsert_doc(DocRecord::new("d2").with_tags(["gone"]));
        let sources = workspace.sources();
        let provider = TagsGroupBy::new(sources.docs, sources.tags);

        let items = publish(&["d1", "d2"]);
        let params = GroupByParams::new("system", "tags");
        let mut grouped = provider.group_by(items.subscriber(), &params, &ProviderRegistry::default());

        let groups = grouped.next().await.unwrap().unwrap();
        assert_eq!(groups["t1"], DocIdSet::from(["d1"]));
        assert_eq!(groups["t2"], DocIdSet::from(["d1"]));
        assert!(!groups.contains_key("gone"));
    }
}
