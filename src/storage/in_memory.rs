//! In-memory workspace facts for testing and development

use anyhow::{Result, anyhow};
use futures::StreamExt;
use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::watch;

use crate::core::live::{self, LiveStream};
use crate::core::set::DocIdSet;
use crate::facts::{
    DocIndex, DocRecord, DocsSource, FavoriteSource, PropertyInfo, PropertySchemaSource,
    ShareSource, TagIndex, TagMeta, TagSource, WorkspaceSources,
};

/// In-memory workspace
///
/// Every concern is held in its own watch channel, so a mutation only wakes
/// the subscribers of that concern. Readers always see the latest snapshot.
#[derive(Clone)]
pub struct InMemoryWorkspace {
    inner: Arc<Channels>,
}

struct Channels {
    docs: watch::Sender<Arc<DocIndex>>,
    tags: watch::Sender<Arc<TagIndex>>,
    favorites: watch::Sender<DocIdSet>,
    shared: watch::Sender<DocIdSet>,
    properties: watch::Sender<IndexMap<String, PropertyInfo>>,
}

impl InMemoryWorkspace {
    /// Create an empty workspace
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Channels {
                docs: watch::Sender::new(Arc::default()),
                tags: watch::Sender::new(Arc::default()),
                favorites: watch::Sender::new(DocIdSet::new()),
                shared: watch::Sender::new(DocIdSet::new()),
                properties: watch::Sender::new(IndexMap::new()),
            }),
        }
    }

    /// Bundle this workspace as the source of every fact
    pub fn sources(&self) -> WorkspaceSources {
        WorkspaceSources::from_store(Arc::new(self.clone()))
    }

    /// Insert or replace a document
    pub fn upsert_doc(&self, doc: DocRecord) {
        tracing::trace!(doc_id = %doc.id, "Upserting document");
        self.inner.docs.send_modify(|docs| {
            Arc::make_mut(docs).insert(doc.id.clone(), doc);
        });
    }

    /// Modify an existing document in place
    pub fn update_doc(&self, id: &str, update: impl FnOnce(&mut DocRecord)) -> Result<()> {
        let found = self.inner.docs.send_if_modified(|docs| {
            if !docs.contains_key(id) {
                return false;
            }
            match Arc::make_mut(docs).get_mut(id) {
                Some(doc) => {
                    update(doc);
                    true
                }
                None => false,
            }
        });
        if !found {
            return Err(anyhow!("Document not found: {}", id));
        }
        tracing::trace!(doc_id = %id, "Updated document");
        Ok(())
    }

    /// Remove a document; returns whether it existed
    pub fn remove_doc(&self, id: &str) -> bool {
        let removed = self
            .inner
            .docs
            .send_if_modified(|docs| docs.contains_key(id) && Arc::make_mut(docs).shift_remove(id).is_some());
        tracing::trace!(doc_id = %id, removed, "Removing document");
        removed
    }

    pub fn doc(&self, id: &str) -> Option<DocRecord> {
        self.inner.docs.borrow().get(id).cloned()
    }

    pub fn doc_count(&self) -> usize {
        self.inner.docs.borrow().len()
    }

    /// Create or rename a tag
    pub fn put_tag(&self, tag: TagMeta) {
        tracing::trace!(tag_id = %tag.id, "Putting tag");
        self.inner.tags.send_modify(|tags| {
            Arc::make_mut(tags).insert(tag.id.clone(), tag);
        });
    }

    /// Delete a tag; documents keep the dangling id
    pub fn delete_tag(&self, id: &str) -> bool {
        let removed = self
            .inner
            .tags
            .send_if_modified(|tags| tags.contains_key(id) && Arc::make_mut(tags).shift_remove(id).is_some());
        tracing::trace!(tag_id = %id, removed, "Deleting tag");
        removed
    }

    pub fn set_favorite(&self, id: &str, favorite: bool) {
        tracing::trace!(doc_id = %id, favorite, "Setting favorite");
        toggle(&self.inner.favorites, id, favorite);
    }

    pub fn set_shared(&self, id: &str, shared: bool) {
        tracing::trace!(doc_id = %id, shared, "Setting shared");
        toggle(&self.inner.shared, id, shared);
    }

    /// Declare (or retype) a custom property
    pub fn define_property(&self, info: PropertyInfo) {
        tracing::trace!(property = %info.id, kind = %info.kind, "Defining property");
        self.inner.properties.send_if_modified(|properties| {
            if properties.get(&info.id) == Some(&info) {
                return false;
            }
            properties.insert(info.id.clone(), info);
            true
        });
    }

    /// Remove a property from the schema; values on documents are left alone
    pub fn delete_property(&self, id: &str) -> bool {
        let removed = self
            .inner
            .properties
            .send_if_modified(|properties| properties.shift_remove(id).is_some());
        tracing::trace!(property = %id, removed, "Deleting property");
        removed
    }
}

impl Default for InMemoryWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

fn toggle(set: &watch::Sender<DocIdSet>, id: &str, member: bool) {
    set.send_if_modified(|ids| match member {
        true => ids.insert(id),
        false => ids.remove(id),
    });
}

impl DocsSource for InMemoryWorkspace {
    fn docs(&self) -> LiveStream<Arc<DocIndex>> {
        live::from_watch(self.inner.docs.subscribe())
    }
}

impl TagSource for InMemoryWorkspace {
    fn tags(&self) -> LiveStream<Arc<TagIndex>> {
        live::from_watch(self.inner.tags.subscribe())
    }
}

impl FavoriteSource for InMemoryWorkspace {
    fn favorite_doc_ids(&self) -> LiveStream<DocIdSet> {
        live::from_watch(self.inner.favorites.subscribe())
    }
}

impl ShareSource for InMemoryWorkspace {
    fn shared_doc_ids(&self) -> LiveStream<DocIdSet> {
        live::from_watch(self.inner.shared.subscribe())
    }
}

impl PropertySchemaSource for InMemoryWorkspace {
    fn property_info(&self, key: &str) -> LiveStream<Option<PropertyInfo>> {
        let key = key.to_string();
        let schema = live::from_watch(self.inner.properties.subscribe())
            .map(move |properties| properties.get(&key).cloned())
            .boxed();
        live::distinct(schema)
    }
}
