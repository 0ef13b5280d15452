//! Document id sets, the currency passed between pipeline stages

use indexmap::{IndexMap, IndexSet};

/// Opaque document identifier
pub type DocId = String;

/// Group key to bucket of document ids, in first-seen group order
pub type GroupMap = IndexMap<String, DocIdSet>;

/// A set of document ids with content equality
///
/// Iteration follows insertion order, so a set materialized without an
/// ordering stage still lists documents in a stable order. Two sets are equal
/// when they hold the same ids, whatever order they were inserted in; every
/// stage boundary relies on that to suppress no-op recomputation.
#[derive(Debug, Clone, Default)]
pub struct DocIdSet(IndexSet<DocId>);

impl DocIdSet {
    pub fn new() -> Self {
        Self(IndexSet::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    /// Insert an id, returning `false` if it was already present
    pub fn insert(&mut self, id: impl Into<DocId>) -> bool {
        self.0.insert(id.into())
    }

    /// Remove an id, keeping the order of the rest
    pub fn remove(&mut self, id: &str) -> bool {
        self.0.shift_remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocId> {
        self.0.iter()
    }

    /// Ids present in both sets, in `self`'s order
    pub fn intersection(&self, other: &DocIdSet) -> DocIdSet {
        // Iterate the smaller side, then restore self's order
        if self.len() <= other.len() {
            self.iter().filter(|id| other.contains(id)).cloned().collect()
        } else {
            let shared: IndexSet<&DocId> = other.iter().filter(|id| self.contains(id)).collect();
            self.iter().filter(|id| shared.contains(id)).cloned().collect()
        }
    }

    /// Ids of `self` followed by the ids only `other` has
    pub fn union(&self, other: &DocIdSet) -> DocIdSet {
        let mut out = self.clone();
        out.extend(other.iter().cloned());
        out
    }

    /// Ids of `self` that `other` lacks
    pub fn difference(&self, other: &DocIdSet) -> DocIdSet {
        self.iter().filter(|id| !other.contains(id)).cloned().collect()
    }

    pub fn is_subset(&self, other: &DocIdSet) -> bool {
        self.len() <= other.len() && self.iter().all(|id| other.contains(id))
    }

    pub fn to_vec(&self) -> Vec<DocId> {
        self.0.iter().cloned().collect()
    }
}

impl PartialEq for DocIdSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.is_subset(other)
    }
}

impl Eq for DocIdSet {}

impl FromIterator<DocId> for DocIdSet {
    fn from_iter<I: IntoIterator<Item = DocId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for DocIdSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_string).collect())
    }
}

impl Extend<DocId> for DocIdSet {
    fn extend<I: IntoIterator<Item = DocId>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl IntoIterator for DocIdSet {
    type Item = DocId;
    type IntoIter = indexmap::set::IntoIter<DocId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a DocIdSet {
    type Item = &'a DocId;
    type IntoIter = indexmap::set::Iter<'a, DocId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<const N: usize> From<[&str; N]> for DocIdSet {
    fn from(ids: [&str; N]) -> Self {
        ids.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_insertion_order() {
        let a = DocIdSet::from(["d1", "d2", "d3"]);
        let b = DocIdSet::from(["d3", "d1", "d2"]);
        assert_eq!(a, b);
        assert_ne!(a, DocIdSet::from(["d1", "d2"]));
    }

    #[test]
    fn test_intersection_keeps_left_order() {
        let a = DocIdSet::from(["d4", "d1", "d3", "d2"]);
        let b = DocIdSet::from(["d2", "d3"]);
        assert_eq!(a.intersection(&b).to_vec(), vec!["d3", "d2"]);
        // Larger right-hand side takes the other branch
        assert_eq!(b.intersection(&a).to_vec(), vec!["d2", "d3"]);
    }

    #[test]
    fn test_union_and_difference() {
        let a = DocIdSet::from(["d1", "d2"]);
        let b = DocIdSet::from(["d2", "d3"]);
        assert_eq!(a.union(&b).to_vec(), vec!["d1", "d2", "d3"]);
        assert_eq!(a.difference(&b).to_vec(), vec!["d1"]);
    }

    #[test]
    fn test_subset() {
        let a = DocIdSet::from(["d1"]);
        let b = DocIdSet::from(["d1", "d2"]);
        assert!(a.is_subset(&b));
        assert!(!b.is_subset(&a));
        assert!(DocIdSet::new().is_subset(&a));
    }

    #[test]
    fn test_insert_reports_duplicates() {
        let mut set = DocIdSet::new();
        assert!(set.insert("d1"));
        assert!(!set.insert("d1"));
        assert_eq!(set.len(), 1);
    }
}
