//! Leaf filter providers
//!
//! Each provider validates the clause up front and returns an error stream for
//! an unknown method or an undecodable operand. A valid clause is evaluated
//! against every document in the index (trashed ones included) and
//! re-evaluated whenever the facts it reads change.

use chrono::{Duration, NaiveDate, Utc};
use futures::StreamExt;
use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use super::field::{Field, parse_day};
use super::{DocPredicate, live_tags, match_docs, parse_flag};
use crate::core::error::RuleError;
use crate::core::live::{self, LiveResult, LiveStream};
use crate::core::params::FilterParams;
use crate::core::provider::FilterProvider;
use crate::core::registry::ProviderRegistry;
use crate::core::set::DocIdSet;
use crate::facts::{DocMode, DocRecord, DocsSource, FavoriteSource, ShareSource, TagSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagMethod {
    IncludeAll,
    IncludeAnyOf,
    NotIncludeAll,
    NotIncludeAnyOf,
    IsEmpty,
    IsNotEmpty,
}

impl TagMethod {
    fn parse(method: &str) -> Option<Self> {
        match method {
            "include" | "include-all" => Some(TagMethod::IncludeAll),
            "include-any-of" => Some(TagMethod::IncludeAnyOf),
            "not-include-all" => Some(TagMethod::NotIncludeAll),
            "not-include-any-of" => Some(TagMethod::NotIncludeAnyOf),
            "is-empty" => Some(TagMethod::IsEmpty),
            "is-not-empty" => Some(TagMethod::IsNotEmpty),
            _ => None,
        }
    }

    /// An empty operand list leaves the list methods unconstrained
    fn matches(self, has: &HashSet<&str>, wanted: &[String]) -> bool {
        let all = || wanted.iter().all(|tag| has.contains(tag.as_str()));
        let any = || wanted.iter().any(|tag| has.contains(tag.as_str()));
        match self {
            TagMethod::IsEmpty => has.is_empty(),
            TagMethod::IsNotEmpty => !has.is_empty(),
            _ if wanted.is_empty() => true,
            TagMethod::IncludeAll => all(),
            TagMethod::IncludeAnyOf => any(),
            TagMethod::NotIncludeAll => !all(),
            TagMethod::NotIncludeAnyOf => !any(),
        }
    }
}

/// Filters on the tags of a document
///
/// Only tags that still exist count; references to deleted tags are ignored.
pub struct TagsFilter {
    docs: Arc<dyn DocsSource>,
    tags: Arc<dyn TagSource>,
}

impl TagsFilter {
    pub fn new(docs: Arc<dyn DocsSource>, tags: Arc<dyn TagSource>) -> Self {
        Self { docs, tags }
    }
}

impl FilterProvider for TagsFilter {
    fn filter(&self, params: &FilterParams, _registry: &ProviderRegistry) -> LiveResult<DocIdSet> {
        let Some(method) = TagMethod::parse(&params.method) else {
            return live::fail(RuleError::unsupported_method("tags", &params.method));
        };
        let wanted: Vec<String> = params.values().into_iter().map(str::to_string).collect();

        let matched = live::combine_latest(self.docs.docs(), self.tags.tags())
            .map(move |(docs, tags)| -> Result<DocIdSet, RuleError> {
                Ok(docs
                    .values()
                    .filter(|doc| {
                        let has: HashSet<&str> = live_tags(doc, &tags).map(|tag| tag.id.as_str()).collect();
                        method.matches(&has, &wanted)
                    })
                    .map(|doc| doc.id.clone())
                    .collect())
            })
            .boxed();
        live::distinct(matched)
    }
}

/// Filters on a checkbox property (unset counts as unchecked)
pub struct CheckboxFilter {
    docs: Arc<dyn DocsSource>,
}

impl CheckboxFilter {
    pub fn new(docs: Arc<dyn DocsSource>) -> Self {
        Self { docs }
    }

    fn predicate(params: &FilterParams) -> Result<DocPredicate, RuleError> {
        let negate = match params.method.as_str() {
            "is" => false,
            "is-not" => true,
            other => return Err(RuleError::unsupported_method("checkbox", other)),
        };
        let wanted = parse_flag("checkbox", params)?;
        let key = params.key.clone();
        Ok(Box::new(move |doc: &DocRecord| ((doc.property(&key) == Some("true")) == wanted) != negate))
    }
}

impl FilterProvider for CheckboxFilter {
    fn filter(&self, params: &FilterParams, _registry: &ProviderRegistry) -> LiveResult<DocIdSet> {
        match Self::predicate(params) {
            Ok(predicate) => match_docs(self.docs.docs(), predicate),
            Err(e) => live::fail(e),
        }
    }
}

/// Filters on a text property
///
/// `contains` is case-insensitive; an unset value compares as empty text.
pub struct TextFilter {
    docs: Arc<dyn DocsSource>,
}

impl TextFilter {
    pub fn new(docs: Arc<dyn DocsSource>) -> Self {
        Self { docs }
    }

    fn predicate(params: &FilterParams) -> Result<DocPredicate, RuleError> {
        let key = params.key.clone();
        let operand = params.value.clone().unwrap_or_default();
        let predicate: DocPredicate = match params.method.as_str() {
            "is" => Box::new(move |doc: &DocRecord| doc.property(&key).unwrap_or_default() == operand),
            "is-not" => Box::new(move |doc: &DocRecord| doc.property(&key).unwrap_or_default() != operand),
            "contains" => {
                let needle = operand.to_lowercase();
                Box::new(move |doc: &DocRecord| {
                    doc.property(&key)
                        .unwrap_or_default()
                        .to_lowercase()
                        .contains(&needle)
                })
            }
            "is-empty" => Box::new(move |doc: &DocRecord| doc.property(&key).unwrap_or_default().is_empty()),
            "is-not-empty" => Box::new(move |doc: &DocRecord| !doc.property(&key).unwrap_or_default().is_empty()),
            other => return Err(RuleError::unsupported_method("text", other)),
        };
        Ok(predicate)
    }
}

impl FilterProvider for TextFilter {
    fn filter(&self, params: &FilterParams, _registry: &ProviderRegistry) -> LiveResult<DocIdSet> {
        match Self::predicate(params) {
            Ok(predicate) => match_docs(self.docs.docs(), predicate),
            Err(e) => live::fail(e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateMethod {
    After(NaiveDate),
    Before(NaiveDate),
    LastDays(i64),
    IsEmpty,
    IsNotEmpty,
}

fn last_days(method: &str) -> Option<i64> {
    static LAST_DAYS_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = LAST_DAYS_REGEX.get_or_init(|| Regex::new(r"^last-(\d+)-days$").unwrap());
    regex.captures(method)?.get(1)?.as_str().parse().ok()
}

impl DateMethod {
    fn parse(params: &FilterParams) -> Result<Self, RuleError> {
        let day = || {
            params
                .value
                .as_deref()
                .and_then(parse_day)
                .ok_or_else(|| RuleError::invalid_value("date", params.value.as_deref(), "expected YYYY-MM-DD"))
        };
        match params.method.as_str() {
            "after" => Ok(DateMethod::After(day()?)),
            "before" => Ok(DateMethod::Before(day()?)),
            "is-empty" => Ok(DateMethod::IsEmpty),
            "is-not-empty" => Ok(DateMethod::IsNotEmpty),
            other => last_days(other)
                .map(DateMethod::LastDays)
                .ok_or_else(|| RuleError::unsupported_method("date", other)),
        }
    }

    /// `last-N-days` covers the N calendar days ending today (UTC)
    fn matches(self, value: Option<NaiveDate>, today: NaiveDate) -> bool {
        match (self, value) {
            (DateMethod::IsEmpty, value) => value.is_none(),
            (DateMethod::IsNotEmpty, value) => value.is_some(),
            (_, None) => false,
            (DateMethod::After(bound), Some(day)) => day > bound,
            (DateMethod::Before(bound), Some(day)) => day < bound,
            (DateMethod::LastDays(days), Some(day)) => day <= today && day > today - Duration::days(days),
        }
    }
}

/// Filters on a date property or on the created/updated timestamps
pub struct DateFilter {
    docs: Arc<dyn DocsSource>,
    field: Field,
}

impl DateFilter {
    pub fn new(docs: Arc<dyn DocsSource>, field: Field) -> Self {
        Self { docs, field }
    }
}

impl FilterProvider for DateFilter {
    fn filter(&self, params: &FilterParams, _registry: &ProviderRegistry) -> LiveResult<DocIdSet> {
        let method = match DateMethod::parse(params) {
            Ok(method) => method,
            Err(e) => return live::fail(e),
        };
        let field = self.field;
        let key = params.key.clone();
        match_docs(self.docs.docs(), move |doc| {
            let day = field.value(doc, &key).and_then(|value| value.day());
            method.matches(day, Utc::now().date_naive())
        })
    }
}

/// Filters on the primary editor mode (`page` or `edgeless`)
pub struct DocModeFilter {
    docs: Arc<dyn DocsSource>,
}

impl DocModeFilter {
    pub fn new(docs: Arc<dyn DocsSource>) -> Self {
        Self { docs }
    }

    fn predicate(params: &FilterParams) -> Result<DocPredicate, RuleError> {
        let negate = match params.method.as_str() {
            "is" => false,
            "is-not" => true,
            other => return Err(RuleError::unsupported_method("docPrimaryMode", other)),
        };
        let mode = params
            .value
            .as_deref()
            .and_then(DocMode::parse)
            .ok_or_else(|| {
                RuleError::invalid_value("docPrimaryMode", params.value.as_deref(), "expected page or edgeless")
            })?;
        Ok(Box::new(move |doc: &DocRecord| (doc.primary_mode == mode) != negate))
    }
}

impl FilterProvider for DocModeFilter {
    fn filter(&self, params: &FilterParams, _registry: &ProviderRegistry) -> LiveResult<DocIdSet> {
        match Self::predicate(params) {
            Ok(predicate) => match_docs(self.docs.docs(), predicate),
            Err(e) => live::fail(e),
        }
    }
}

/// A boolean attribute of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFlag {
    Trash,
    Journal,
    /// A journal entry without content
    EmptyJournal,
}

impl DocFlag {
    fn name(self) -> &'static str {
        match self {
            DocFlag::Trash => "trash",
            DocFlag::Journal => "journal",
            DocFlag::EmptyJournal => "empty-journal",
        }
    }

    fn of(self, doc: &DocRecord) -> bool {
        match self {
            DocFlag::Trash => doc.trash,
            DocFlag::Journal => doc.journal.is_some(),
            DocFlag::EmptyJournal => doc.journal.is_some() && doc.empty,
        }
    }
}

/// Filters on a [`DocFlag`] with the single method `is`
pub struct FlagFilter {
    docs: Arc<dyn DocsSource>,
    flag: DocFlag,
}

impl FlagFilter {
    pub fn new(docs: Arc<dyn DocsSource>, flag: DocFlag) -> Self {
        Self { docs, flag }
    }
}

impl FilterProvider for FlagFilter {
    fn filter(&self, params: &FilterParams, _registry: &ProviderRegistry) -> LiveResult<DocIdSet> {
        let flag = self.flag;
        if params.method != "is" {
            return live::fail(RuleError::unsupported_method(flag.name(), &params.method));
        }
        match parse_flag(flag.name(), params) {
            Ok(wanted) => match_docs(self.docs.docs(), move |doc| flag.of(doc) == wanted),
            Err(e) => live::fail(e),
        }
    }
}

/// Filters on the creator or last editor
pub struct UserFilter {
    docs: Arc<dyn DocsSource>,
    field: Field,
}

impl UserFilter {
    pub fn new(docs: Arc<dyn DocsSource>, field: Field) -> Self {
        Self { docs, field }
    }

    fn user(field: Field, doc: &DocRecord) -> Option<&str> {
        match field {
            Field::UpdatedBy => doc.updated_by.as_deref(),
            _ => doc.created_by.as_deref(),
        }
    }
}

impl FilterProvider for UserFilter {
    fn filter(&self, params: &FilterParams, _registry: &ProviderRegistry) -> LiveResult<DocIdSet> {
        let field = self.field;
        match params.method.as_str() {
            "include" => {
                let users: HashSet<String> = params.values().into_iter().map(str::to_string).collect();
                match_docs(self.docs.docs(), move |doc| {
                    users.is_empty() || Self::user(field, doc).is_some_and(|user| users.contains(user))
                })
            }
            "is-empty" => match_docs(self.docs.docs(), move |doc| Self::user(field, doc).is_none()),
            "is-not-empty" => match_docs(self.docs.docs(), move |doc| Self::user(field, doc).is_some()),
            other => live::fail(RuleError::unsupported_method("user", other)),
        }
    }
}

/// A set of documents maintained outside the doc index
#[derive(Clone)]
pub enum Membership {
    Favorite(Arc<dyn FavoriteSource>),
    Shared(Arc<dyn ShareSource>),
}

impl Membership {
    fn name(&self) -> &'static str {
        match self {
            Membership::Favorite(_) => "favorite",
            Membership::Shared(_) => "shared",
        }
    }

    fn members(&self) -> LiveStream<DocIdSet> {
        match self {
            Membership::Favorite(source) => source.favorite_doc_ids(),
            Membership::Shared(source) => source.shared_doc_ids(),
        }
    }
}

/// Filters on membership in a [`Membership`] set with the single method `is`
///
/// Ids in the set that are not in the doc index never match.
pub struct MembershipFilter {
    docs: Arc<dyn DocsSource>,
    membership: Membership,
}

impl MembershipFilter {
    pub fn new(docs: Arc<dyn DocsSource>, membership: Membership) -> Self {
        Self { docs, membership }
    }
}

impl FilterProvider for MembershipFilter {
    fn filter(&self, params: &FilterParams, _registry: &ProviderRegistry) -> LiveResult<DocIdSet> {
        let name = self.membership.name();
        if params.method != "is" {
            return live::fail(RuleError::unsupported_method(name, &params.method));
        }
        let wanted = match parse_flag(name, params) {
            Ok(wanted) => wanted,
            Err(e) => return live::fail(e),
        };

        let matched = live::combine_latest(self.docs.docs(), self.membership.members())
            .map(move |(docs, members)| -> Result<DocIdSet, RuleError> {
                Ok(docs
                    .keys()
                    .filter(|id| members.contains(id) == wanted)
                    .cloned()
                    .collect())
            })
            .boxed();
        live::distinct(matched)
    }
}
