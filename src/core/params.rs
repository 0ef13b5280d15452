//! Rule clauses and watch options
//!
//! Clauses are immutable value objects built by the rule definition (a saved
//! view, a collection) and handed to [`CollectionRulesService::watch`]. They use
//! the same field names as the stored rule JSON:
//!
//! ```json
//! {
//!   "filters": [{"type": "system", "key": "tags", "method": "include-any-of", "value": "t1,t2"}],
//!   "groupBy": {"type": "property", "key": "status"},
//!   "orderBy": {"type": "system", "key": "updatedAt", "desc": true},
//!   "extraAllowList": ["pinned-doc"],
//!   "extraFilters": [{"type": "system", "key": "trash", "method": "is", "value": "false"}]
//! }
//! ```
//!
//! [`CollectionRulesService::watch`]: crate::core::service::CollectionRulesService::watch

use serde::{Deserialize, Serialize};

use super::set::DocId;

/// One filter clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    /// Provider key (e.g. "system", "property", "system:tags")
    #[serde(rename = "type")]
    pub kind: String,

    /// Property id or system field name
    pub key: String,

    /// Provider-specific predicate selector (e.g. "include", "is-empty")
    pub method: String,

    /// Provider-specific encoded operand (e.g. comma-joined ids)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl FilterParams {
    pub fn new(kind: impl Into<String>, key: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            key: key.into(),
            method: method.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Split the operand as a comma-joined list, skipping blank entries
    pub fn values(&self) -> Vec<&str> {
        self.value
            .as_deref()
            .map(|v| v.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }
}

/// The group-by clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupByParams {
    #[serde(rename = "type")]
    pub kind: String,
    pub key: String,
}

impl GroupByParams {
    pub fn new(kind: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            key: key.into(),
        }
    }
}

/// The order-by clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderByParams {
    #[serde(rename = "type")]
    pub kind: String,
    pub key: String,

    /// Sort descending
    #[serde(default)]
    pub desc: bool,
}

impl OrderByParams {
    pub fn new(kind: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            key: key.into(),
            desc: false,
        }
    }

    pub fn descending(mut self) -> Self {
        self.desc = true;
        self
    }
}

/// Everything one `watch()` subscription evaluates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchOptions {
    /// Primary, user-authored clauses; intersected, errors isolated per clause
    #[serde(default)]
    pub filters: Vec<FilterParams>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<GroupByParams>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderByParams>,

    /// Ids admitted regardless of the primary filters
    #[serde(default)]
    pub extra_allow_list: Vec<DocId>,

    /// System-authored clauses applied after the allow list; errors propagate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_filters: Option<Vec<FilterParams>>,
}

impl WatchOptions {
    pub fn new(filters: Vec<FilterParams>) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }

    /// Parse options from stored rule JSON
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_group_by(mut self, group_by: GroupByParams) -> Self {
        self.group_by = Some(group_by);
        self
    }

    pub fn with_order_by(mut self, order_by: OrderByParams) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn with_allow_list<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<DocId>,
    {
        self.extra_allow_list = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_extra_filters(mut self, filters: Vec<FilterParams>) -> Self {
        self.extra_filters = Some(filters);
        self
    }

    /// The extra clauses, if any are present
    pub(crate) fn active_extra_filters(&self) -> Option<&[FilterParams]> {
        self.extra_filters.as_deref().filter(|f| !f.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_split_and_trim() {
        let params = FilterParams::new("system", "tags", "include-any-of").with_value("t1, t2,,t3 ");
        assert_eq!(params.values(), vec!["t1", "t2", "t3"]);
        assert!(FilterParams::new("system", "tags", "is-empty").values().is_empty());
    }

    #[test]
    fn test_options_from_rule_json() {
        let json = r#"{
            "filters": [{"type": "system", "key": "tags", "method": "include", "value": "t1"}],
            "groupBy": {"type": "system", "key": "tags"},
            "orderBy": {"type": "system", "key": "updatedAt", "desc": true},
            "extraAllowList": ["d9"],
            "extraFilters": [{"type": "system", "key": "trash", "method": "is", "value": "false"}]
        }"#;

        let options = WatchOptions::from_json_str(json).unwrap();
        assert_eq!(options.filters[0].kind, "system");
        assert_eq!(options.filters[0].value.as_deref(), Some("t1"));
        assert_eq!(options.group_by, Some(GroupByParams::new("system", "tags")));
        assert_eq!(
            options.order_by,
            Some(OrderByParams::new("system", "updatedAt").descending())
        );
        assert_eq!(options.extra_allow_list, vec!["d9".to_string()]);
        assert_eq!(options.active_extra_filters().map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_empty_extra_filters_are_inactive() {
        let options = WatchOptions::new(vec![]).with_extra_filters(vec![]);
        assert!(options.active_extra_filters().is_none());
    }

    #[test]
    fn test_clause_serializes_with_type_field() {
        let params = FilterParams::new("system:trash", "trash", "is").with_value("true");
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["type"], "system:trash");
        assert_eq!(json["value"], "true");
    }
}
