use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnOrder {
    /// First-seen order while scanning the sorted batch.
    #[default]
    Discovery,
    /// Ascending identifier order; stable across runs over the same data.
    Sorted,
}

/// Frozen identifier → column mapping.
///
/// Built once before any row is encoded and shared read-only afterwards, so a
/// given identifier targets the same column for every row of one construction.
#[derive(Debug, Clone)]
pub struct ColumnIndex<K> {
    labels: Vec<K>,
    by_key: HashMap<K, usize>,
}

impl<K> ColumnIndex<K>
where
    K: Clone + Eq + Hash + Ord,
{
    pub fn discover<I>(keys: I, order: ColumnOrder) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        let mut labels = Vec::new();
        let mut by_key = HashMap::new();
        for key in keys {
            if !by_key.contains_key(&key) {
                by_key.insert(key.clone(), labels.len());
                labels.push(key);
            }
        }
        let mut index = Self { labels, by_key };
        if order == ColumnOrder::Sorted {
            index.sort();
        }
        index
    }

    fn sort(&mut self) {
        self.labels.sort();
        for (col, key) in self.labels.iter().enumerate() {
            self.by_key.insert(key.clone(), col);
        }
    }

    pub fn column(&self, key: &K) -> Option<usize> {
        self.by_key.get(key).copied()
    }

    pub fn label(&self, col: usize) -> Option<&K> {
        self.labels.get(col)
    }

    pub fn labels(&self) -> &[K] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.by_key.contains_key(key)
    }
}

impl<K> Default for ColumnIndex<K> {
    fn default() -> Self {
        Self {
            labels: Vec::new(),
            by_key: HashMap::new(),
        }
    }
}
