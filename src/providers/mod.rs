//! Built-in providers over workspace facts
//!
//! [`register_workspace_providers`] installs every provider under the keys
//! rules use:
//!
//! | family   | keys |
//! |----------|------|
//! | filter   | `system`, `property`, `{system,property}:tags`, `property:checkbox`, `property:text`, `property:date`, `{system,property}:{createdAt,updatedAt,docPrimaryMode,journal,createdBy,updatedBy}`, `system:trash`, `system:empty-journal`, `system:favorite`, `system:shared` |
//! | group-by | `system`, `property`, `{system,property}:tags`, `property:checkbox`, `property:text`, `property:date`, `{system,property}:{createdAt,updatedAt,docPrimaryMode,journal,createdBy,updatedBy}` |
//! | order-by | same keys as group-by |
//!
//! `system` and `property` are dispatch providers: they resolve the concrete
//! provider from the clause key (or the property's declared type) at
//! evaluation time.

pub mod dispatch;
pub mod field;
pub mod filters;
pub mod group_by;
pub mod order_by;

use futures::StreamExt;
use std::sync::Arc;

use crate::core::error::RuleError;
use crate::core::live::{self, LiveResult, LiveStream};
use crate::core::params::FilterParams;
use crate::core::provider::{FilterProvider, LiveItems};
use crate::core::registry::RegistryBuilder;
use crate::core::set::DocIdSet;
use crate::facts::{DocIndex, DocRecord, TagIndex, TagMeta, WorkspaceSources};

use dispatch::{
    PropertyFilterProvider, PropertyGroupByProvider, PropertyOrderByProvider, SystemFilterProvider,
    SystemGroupByProvider, SystemOrderByProvider,
};
use field::Field;
use filters::{
    CheckboxFilter, DateFilter, DocFlag, DocModeFilter, FlagFilter, Membership, MembershipFilter,
    TagsFilter, TextFilter, UserFilter,
};
use group_by::{FieldGroupBy, TagsGroupBy};
use order_by::{FieldOrderBy, TagsOrderBy};

/// Fields reachable under both the `system:` and `property:` prefixes
const SHARED_FIELDS: [(&str, Field); 6] = [
    ("createdAt", Field::CreatedAt),
    ("updatedAt", Field::UpdatedAt),
    ("docPrimaryMode", Field::PrimaryMode),
    ("journal", Field::Journal),
    ("createdBy", Field::CreatedBy),
    ("updatedBy", Field::UpdatedBy),
];

/// Fields only reachable as custom properties
const PROPERTY_FIELDS: [(&str, Field); 3] = [
    ("checkbox", Field::Checkbox),
    ("text", Field::Text),
    ("date", Field::Date),
];

/// Register every built-in provider backed by `sources`
pub fn register_workspace_providers(builder: RegistryBuilder, sources: &WorkspaceSources) -> RegistryBuilder {
    let docs = sources.docs.clone();

    let mut builder = builder
        .filter("system", Arc::new(SystemFilterProvider))
        .filter("property", Arc::new(PropertyFilterProvider::new(sources.properties.clone())))
        .group_by("system", Arc::new(SystemGroupByProvider))
        .group_by("property", Arc::new(PropertyGroupByProvider::new(sources.properties.clone())))
        .order_by("system", Arc::new(SystemOrderByProvider))
        .order_by("property", Arc::new(PropertyOrderByProvider::new(sources.properties.clone())));

    let tags_filter = Arc::new(TagsFilter::new(docs.clone(), sources.tags.clone()));
    let tags_group = Arc::new(TagsGroupBy::new(docs.clone(), sources.tags.clone()));
    let tags_order = Arc::new(TagsOrderBy::new(docs.clone(), sources.tags.clone()));
    for prefix in ["system", "property"] {
        let key = format!("{prefix}:tags");
        builder = builder
            .filter(key.clone(), tags_filter.clone())
            .group_by(key.clone(), tags_group.clone())
            .order_by(key, tags_order.clone());
    }

    for (name, field) in SHARED_FIELDS {
        for prefix in ["system", "property"] {
            builder = register_field(builder, &format!("{prefix}:{name}"), field, sources);
        }
    }
    for (name, field) in PROPERTY_FIELDS {
        builder = register_field(builder, &format!("property:{name}"), field, sources);
    }

    let builder = builder
        .filter("system:trash", Arc::new(FlagFilter::new(docs.clone(), DocFlag::Trash)))
        .filter("system:empty-journal", Arc::new(FlagFilter::new(docs.clone(), DocFlag::EmptyJournal)))
        .filter(
            "system:favorite",
            Arc::new(MembershipFilter::new(docs.clone(), Membership::Favorite(sources.favorites.clone()))),
        )
        .filter(
            "system:shared",
            Arc::new(MembershipFilter::new(docs, Membership::Shared(sources.shared.clone()))),
        );

    tracing::debug!("Registered workspace providers");
    builder
}

/// Register the filter, group-by and order-by providers of one field
fn register_field(builder: RegistryBuilder, key: &str, field: Field, sources: &WorkspaceSources) -> RegistryBuilder {
    let docs = sources.docs.clone();
    let filter: Arc<dyn FilterProvider> = match field {
        Field::Checkbox => Arc::new(CheckboxFilter::new(docs.clone())),
        Field::Text => Arc::new(TextFilter::new(docs.clone())),
        Field::Date | Field::CreatedAt | Field::UpdatedAt => Arc::new(DateFilter::new(docs.clone(), field)),
        Field::CreatedBy | Field::UpdatedBy => Arc::new(UserFilter::new(docs.clone(), field)),
        Field::PrimaryMode => Arc::new(DocModeFilter::new(docs.clone())),
        Field::Journal => Arc::new(FlagFilter::new(docs.clone(), DocFlag::Journal)),
    };
    builder
        .filter(key, filter)
        .group_by(key, Arc::new(FieldGroupBy::new(docs.clone(), field)))
        .order_by(key, Arc::new(FieldOrderBy::new(docs, field)))
}

/// A compiled filter clause
pub(crate) type DocPredicate = Box<dyn Fn(&DocRecord) -> bool + Send>;

/// The ids of every document satisfying `predicate`, re-evaluated on each change
pub(crate) fn match_docs<F>(docs: LiveStream<Arc<DocIndex>>, predicate: F) -> LiveResult<DocIdSet>
where
    F: Fn(&DocRecord) -> bool + Send + 'static,
{
    let matched = docs
        .map(move |docs| -> Result<DocIdSet, RuleError> {
            Ok(docs
                .values()
                .filter(|doc| predicate(doc))
                .map(|doc| doc.id.clone())
                .collect())
        })
        .boxed();
    live::distinct(matched)
}

/// The filtered items paired with the document index they refer to
pub(crate) fn items_with_docs(
    items: &LiveItems,
    docs: LiveStream<Arc<DocIndex>>,
) -> LiveStream<(DocIdSet, Arc<DocIndex>)> {
    live::combine_latest(items.subscribe(), docs)
}

/// The tags of a document that still exist, in the order the document lists them
pub(crate) fn live_tags<'a>(doc: &'a DocRecord, tags: &'a TagIndex) -> impl Iterator<Item = &'a TagMeta> {
    doc.tags.iter().filter_map(|id| tags.get(id))
}

/// Decode a `"true"`/`"false"` operand
pub(crate) fn parse_flag(provider: &str, params: &FilterParams) -> Result<bool, RuleError> {
    match params.value.as_deref() {
        Some("true") => Ok(true),
        Some("false") => Ok(false),
        other => Err(RuleError::invalid_value(provider, other, "expected \"true\" or \"false\"")),
    }
}
