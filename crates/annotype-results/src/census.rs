use std::collections::BTreeMap;

use annotype_common::{TypeClass, TypeResult};

use crate::table::Results;

/// How often each class is referenced across a set of annotations.
///
/// Every node of a tree counts, so `dict[str, str]` records `dict` once and
/// `str` twice. Reserved classes (`None`, `...`) are counted like any other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassCensus {
    counts: BTreeMap<TypeClass, usize>,
    annotations: usize,
}

impl ClassCensus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: &TypeResult) {
        self.annotations += 1;
        for class in result.classes() {
            *self.counts.entry(class.clone()).or_default() += 1;
        }
    }

    pub fn from_results(results: &Results) -> Self {
        let mut census = Self::new();
        results
            .values()
            .flat_map(|m| m.values())
            .flat_map(|c| c.values())
            .flat_map(|f| f.values())
            .flatten()
            .for_each(|result| census.record(result));
        census
    }

    pub fn count(&self, class: &TypeClass) -> usize {
        self.counts.get(class).copied().unwrap_or(0)
    }

    /// Number of distinct classes seen.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Number of annotations recorded.
    pub fn annotations(&self) -> usize {
        self.annotations
    }

    /// Most referenced first; ties in class order.
    pub fn entries(&self) -> Vec<(&TypeClass, usize)> {
        let mut entries: Vec<_> = self.counts.iter().map(|(class, n)| (class, *n)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    pub fn merge(&mut self, other: ClassCensus) {
        self.annotations += other.annotations;
        for (class, n) in other.counts {
            *self.counts.entry(class).or_default() += n;
        }
    }
}
