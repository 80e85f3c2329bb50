//! Per-identifier accumulation of parked ticks.

use rustc_hash::FxHashMap;

/// Running total of parked ticks per vehicle identifier.
///
/// Each scan worker owns one `Totals` exclusively; the merge step folds all
/// of them into a single map after every worker has finished. Keys carry no
/// ordering guarantee.
#[derive(Debug, Default)]
pub struct Totals {
    map: FxHashMap<u64, i64>,
}

impl Totals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-sizes the map; worth it when the caller knows the id population.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Adds `ticks` to the running total for `id`, inserting it if unseen.
    ///
    /// One probe per record: the entry API resolves lookup-or-insert in a
    /// single hash walk, never an existence check followed by a write.
    #[inline]
    pub fn add(&mut self, id: u64, ticks: i64) {
        *self.map.entry(id).or_insert(0) += ticks;
    }

    /// Folds another worker's totals into this one. Addition commutes, so
    /// merge order across workers cannot change any final total.
    pub fn absorb(&mut self, other: Totals) {
        for (id, ticks) in other.map {
            self.add(id, ticks);
        }
    }

    pub fn get(&self, id: u64) -> Option<i64> {
        self.map.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, i64)> + '_ {
        self.map.iter().map(|(&id, &ticks)| (id, ticks))
    }

    /// Drains into a vector sorted by identifier, for deterministic output.
    pub fn into_sorted_vec(self) -> Vec<(u64, i64)> {
        let mut entries: Vec<(u64, i64)> = self.map.into_iter().collect();
        entries.sort_unstable_by_key(|&(id, _)| id);
        entries
    }
}

impl IntoIterator for Totals {
    type Item = (u64, i64);
    type IntoIter = <FxHashMap<u64, i64> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.map.into_iter()
    }
}
