extern crate alloc;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

/// A many-to-one collapse from source catalog ids to target ids.
///
/// Ids absent from the mapping are kept as-is (identity). The mapping is a
/// forest of depth one: no id maps to itself, and every target is itself
/// unmapped. Manual merges supplied by a caller and computed reductions share
/// this one type; composition is sequential application, not data merging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseMapping {
    map: BTreeMap<String, String>,
}

impl CollapseMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `source` collapses onto `target`.
    ///
    /// Two fix-ups keep the forest invariant under chained merges: the target
    /// is compressed through any existing entry (merging A onto B after B was
    /// merged onto C lands A on C), and entries already pointing at `source`
    /// are re-targeted. A merge that resolves to itself is dropped.
    pub fn insert(&mut self, source: impl Into<String>, target: impl Into<String>) {
        let source = source.into();
        let mut target = target.into();

        if let Some(root) = self.map.get(&target) {
            target = root.clone();
        }
        if source == target {
            return;
        }

        let stale: Vec<String> = self
            .map
            .iter()
            .filter(|(_, to)| **to == source)
            .map(|(from, _)| from.clone())
            .collect();
        for from in stale {
            if from == target {
                self.map.remove(&from);
            } else {
                self.map.insert(from, target.clone());
            }
        }

        self.map.insert(source, target);
    }

    /// The target for `source`, if it is mapped.
    pub fn get(&self, source: &str) -> Option<&str> {
        self.map.get(source).map(String::as_str)
    }

    /// The final id for `source`: its target, or `source` itself if unmapped.
    pub fn resolve<'a>(&'a self, source: &'a str) -> &'a str {
        self.get(source).unwrap_or(source)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for CollapseMapping {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (source, target) in iter {
            mapping.insert(source, target);
        }
        mapping
    }
}
