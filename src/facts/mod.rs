//! Read interfaces onto the workspace facts the rule engine consumes
//!
//! The engine never owns document state. Doc, tag, favorite, share and
//! property-schema services live elsewhere and are seen only through the live,
//! read-only views below. [`InMemoryWorkspace`] implements all of them.
//!
//! [`InMemoryWorkspace`]: crate::storage::InMemoryWorkspace

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::live::LiveStream;
use crate::core::set::{DocId, DocIdSet};

/// Tag identifier
pub type TagId = String;

/// Live index of every document, keyed by id
pub type DocIndex = IndexMap<DocId, DocRecord>;

/// Live index of every valid tag, keyed by id
pub type TagIndex = IndexMap<TagId, TagMeta>;

/// The editor a document opens in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocMode {
    #[default]
    Page,
    Edgeless,
}

impl DocMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocMode::Page => "page",
            DocMode::Edgeless => "edgeless",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "page" => Some(DocMode::Page),
            "edgeless" => Some(DocMode::Edgeless),
            _ => None,
        }
    }
}

impl fmt::Display for DocMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the providers know about one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocRecord {
    pub id: DocId,

    /// Moved to trash (still present in the index)
    #[serde(default)]
    pub trash: bool,

    #[serde(default)]
    pub primary_mode: DocMode,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,

    /// Tag ids as stored on the document; may reference deleted tags
    #[serde(default)]
    pub tags: Vec<TagId>,

    /// Custom property values, raw, keyed by property id
    #[serde(default)]
    pub properties: HashMap<String, String>,

    /// Journal date, when the document is a journal entry
    pub journal: Option<NaiveDate>,

    /// The document has no content
    #[serde(default)]
    pub empty: bool,
}

impl DocRecord {
    pub fn new(id: impl Into<DocId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TagId>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_mode(mut self, mode: DocMode) -> Self {
        self.primary_mode = mode;
        self
    }

    pub fn with_created(mut self, at: DateTime<Utc>, by: Option<&str>) -> Self {
        self.created_at = Some(at);
        self.created_by = by.map(str::to_string);
        self
    }

    pub fn with_updated(mut self, at: DateTime<Utc>, by: Option<&str>) -> Self {
        self.updated_at = Some(at);
        self.updated_by = by.map(str::to_string);
        self
    }

    pub fn with_journal(mut self, date: NaiveDate) -> Self {
        self.journal = Some(date);
        self
    }

    pub fn trashed(mut self) -> Self {
        self.trash = true;
        self
    }

    pub fn emptied(mut self) -> Self {
        self.empty = true;
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// A valid (not deleted) tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagMeta {
    pub id: TagId,
    pub name: String,
}

impl TagMeta {
    pub fn new(id: impl Into<TagId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Declared schema of one custom property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub id: String,

    /// Data type, resolved to the provider key `property:<kind>`
    #[serde(rename = "type")]
    pub kind: String,
}

impl PropertyInfo {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
        }
    }
}

/// Live view of the documents of a workspace
pub trait DocsSource: Send + Sync {
    fn docs(&self) -> LiveStream<Arc<DocIndex>>;
}

/// Live view of the valid tags of a workspace
pub trait TagSource: Send + Sync {
    fn tags(&self) -> LiveStream<Arc<TagIndex>>;
}

/// Live view of the documents the current user marked favorite
pub trait FavoriteSource: Send + Sync {
    fn favorite_doc_ids(&self) -> LiveStream<DocIdSet>;
}

/// Live view of the documents shared publicly
pub trait ShareSource: Send + Sync {
    fn shared_doc_ids(&self) -> LiveStream<DocIdSet>;
}

/// Live view of the custom property schema
pub trait PropertySchemaSource: Send + Sync {
    /// The property's declared schema, `None` while it is not defined
    fn property_info(&self, key: &str) -> LiveStream<Option<PropertyInfo>>;
}

/// One handle per fact source, handed to provider constructors
#[derive(Clone)]
pub struct WorkspaceSources {
    pub docs: Arc<dyn DocsSource>,
    pub tags: Arc<dyn TagSource>,
    pub favorites: Arc<dyn FavoriteSource>,
    pub shared: Arc<dyn ShareSource>,
    pub properties: Arc<dyn PropertySchemaSource>,
}

impl WorkspaceSources {
    /// Use one store for every source
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: DocsSource + TagSource + FavoriteSource + ShareSource + PropertySchemaSource + 'static,
    {
        Self {
            docs: store.clone(),
            tags: store.clone(),
            favorites: store.clone(),
            shared: store.clone(),
            properties: store,
        }
    }
}
