//! Typed access to the document attributes providers compare, group and sort on

use chrono::{DateTime, NaiveDate, Utc};

use crate::facts::DocRecord;

/// Date operands and date property values are calendar days
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// A document attribute a provider reads
///
/// Property-backed fields read `DocRecord::properties[key]`; the others ignore
/// the clause key and read the system attribute directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Checkbox,
    Text,
    Date,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
    PrimaryMode,
    Journal,
}

/// The value of a [`Field`] on one document
///
/// A given field always yields the same variant, so values of one field are
/// totally ordered.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
    Day(NaiveDate),
    Time(DateTime<Utc>),
}

impl Field {
    pub fn value(self, doc: &DocRecord, key: &str) -> Option<FieldValue> {
        match self {
            Field::Checkbox => Some(FieldValue::Flag(doc.property(key) == Some("true"))),
            Field::Text => doc
                .property(key)
                .filter(|value| !value.is_empty())
                .map(|value| FieldValue::Text(value.to_string())),
            Field::Date => doc.property(key).and_then(parse_day).map(FieldValue::Day),
            Field::CreatedAt => doc.created_at.map(FieldValue::Time),
            Field::UpdatedAt => doc.updated_at.map(FieldValue::Time),
            Field::CreatedBy => doc.created_by.clone().map(FieldValue::Text),
            Field::UpdatedBy => doc.updated_by.clone().map(FieldValue::Text),
            Field::PrimaryMode => Some(FieldValue::Text(doc.primary_mode.to_string())),
            Field::Journal => Some(FieldValue::Flag(doc.journal.is_some())),
        }
    }
}

impl FieldValue {
    /// Bucket label used by group-by
    ///
    /// Timestamps are bucketed per UTC calendar day.
    pub fn group_key(&self) -> String {
        match self {
            FieldValue::Flag(flag) => flag.to_string(),
            FieldValue::Text(text) => text.clone(),
            FieldValue::Day(day) => day.format(DAY_FORMAT).to_string(),
            FieldValue::Time(time) => time.date_naive().format(DAY_FORMAT).to_string(),
        }
    }

    pub fn day(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Day(day) => Some(*day),
            FieldValue::Time(time) => Some(time.date_naive()),
            _ => None,
        }
    }
}

pub fn parse_day(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DAY_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::DocMode;
    use chrono::TimeZone;

    #[test]
    fn test_property_fields_read_by_key() {
        let doc = DocRecord::new("d1")
            .with_property("done", "true")
            .with_property("status", "")
            .with_property("due", "2024-03-01");

        assert_eq!(Field::Checkbox.value(&doc, "done"), Some(FieldValue::Flag(true)));
        assert_eq!(Field::Checkbox.value(&doc, "other"), Some(FieldValue::Flag(false)));
        assert_eq!(Field::Text.value(&doc, "status"), None);
        assert_eq!(
            Field::Date.value(&doc, "due"),
            Some(FieldValue::Day(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()))
        );
    }

    #[test]
    fn test_system_fields_ignore_key() {
        let at = Utc.with_ymd_and_hms(2024, 5, 6, 23, 30, 0).unwrap();
        let doc = DocRecord::new("d1")
            .with_mode(DocMode::Edgeless)
            .with_created(at, Some("alice"));

        assert_eq!(Field::PrimaryMode.value(&doc, "ignored"), Some(FieldValue::Text("edgeless".into())));
        assert_eq!(Field::CreatedBy.value(&doc, ""), Some(FieldValue::Text("alice".into())));
        assert_eq!(Field::UpdatedBy.value(&doc, ""), None);
        assert_eq!(Field::Journal.value(&doc, ""), Some(FieldValue::Flag(false)));
        assert_eq!(Field::CreatedAt.value(&doc, "").unwrap().group_key(), "2024-05-06");
    }

    #[test]
    fn test_parse_day_rejects_garbage() {
        assert!(parse_day("yesterday").is_none());
        assert!(parse_day(" 2024-01-31 ").is_some());
    }
}
