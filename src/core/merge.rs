//! Final merge of the filter, order and group stages

use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

use super::error::RuleError;
use super::set::{DocId, DocIdSet, GroupMap};

/// Key of the bucket holding documents no group claimed
pub const UNGROUPED: &str = "";

/// One output group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleGroup {
    pub key: String,
    pub items: Vec<DocId>,
}

/// One emission of a `watch()` subscription
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleResult {
    pub groups: Vec<RuleGroup>,

    /// One slot per primary filter clause, `None` where the clause evaluated
    pub filter_errors: Vec<Option<RuleError>>,
}

impl RuleResult {
    /// Every id in the result, in group order (fanned-out ids repeat)
    pub fn all_items(&self) -> impl Iterator<Item = &DocId> {
        self.groups.iter().flat_map(|g| g.items.iter())
    }

    pub fn group(&self, key: &str) -> Option<&RuleGroup> {
        self.groups.iter().find(|g| g.key == key)
    }
}

/// Lay the filtered ids out into groups
///
/// Walks `ordered` followed by any filtered id the ordering missed, skips ids
/// no longer in `filtered`, and appends each survivor to every group whose
/// bucket holds it (or to [`UNGROUPED`]). Groups appear in first-seen order and
/// items keep the walk order.
pub fn merge_groups(grouped: &GroupMap, ordered: &[DocId], filtered: &DocIdSet) -> Vec<RuleGroup> {
    let mut memberships: HashMap<&str, Vec<&str>> = HashMap::new();
    for (key, bucket) in grouped {
        for id in bucket {
            memberships.entry(id.as_str()).or_default().push(key.as_str());
        }
    }

    let final_ordered: IndexSet<&DocId> = ordered.iter().chain(filtered.iter()).collect();

    let mut out: IndexMap<&str, Vec<DocId>> = IndexMap::new();
    for id in final_ordered {
        if !filtered.contains(id) {
            continue;
        }
        match memberships.get(id.as_str()) {
            Some(keys) => {
                for key in keys {
                    out.entry(*key).or_default().push(id.clone());
                }
            }
            None => out.entry(UNGROUPED).or_default().push(id.clone()),
        }
    }

    out.into_iter()
        .map(|(key, items)| RuleGroup {
            key: key.to_string(),
            items,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(items: &[&str]) -> Vec<DocId> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_ungrouped_items_follow_order() {
        let filtered = DocIdSet::from(["d1", "d2", "d3"]);
        let groups = merge_groups(&GroupMap::new(), &ids(&["d3", "d1", "d2"]), &filtered);
        assert_eq!(
            groups,
            vec![RuleGroup {
                key: UNGROUPED.to_string(),
                items: ids(&["d3", "d1", "d2"]),
            }]
        );
    }

    #[test]
    fn test_missing_ordered_ids_are_appended() {
        let filtered = DocIdSet::from(["d1", "d2", "d3"]);
        let groups = merge_groups(&GroupMap::new(), &ids(&["d2"]), &filtered);
        assert_eq!(groups[0].items, ids(&["d2", "d1", "d3"]));
    }

    #[test]
    fn test_stale_ordered_ids_are_dropped() {
        let filtered = DocIdSet::from(["d1"]);
        let groups = merge_groups(&GroupMap::new(), &ids(&["gone", "d1"]), &filtered);
        assert_eq!(groups[0].items, ids(&["d1"]));
    }

    #[test]
    fn test_fan_out_and_first_seen_group_order() {
        let mut grouped = GroupMap::new();
        grouped.insert("t1".to_string(), DocIdSet::from(["d1", "d2"]));
        grouped.insert("t2".to_string(), DocIdSet::from(["d2", "stale"]));

        let filtered = DocIdSet::from(["d1", "d2", "d3"]);
        let groups = merge_groups(&grouped, &ids(&["d3", "d2", "d1"]), &filtered);

        assert_eq!(
            groups,
            vec![
                RuleGroup { key: "".to_string(), items: ids(&["d3"]) },
                RuleGroup { key: "t1".to_string(), items: ids(&["d2", "d1"]) },
                RuleGroup { key: "t2".to_string(), items: ids(&["d2"]) },
            ]
        );
    }

    #[test]
    fn test_empty_filtered_yields_no_groups() {
        let groups = merge_groups(&GroupMap::new(), &ids(&["d1"]), &DocIdSet::new());
        assert!(groups.is_empty());
    }
}
