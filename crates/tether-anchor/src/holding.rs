//! The set of regions an anchor currently holds.

use std::collections::HashSet;

use tether_topology::RegionCoord;

/// Regions an anchor holds a loader ticket for.
///
/// Plain set bookkeeping; the loader calls that must accompany every change
/// live in [`Anchor`](crate::Anchor).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoldingSet {
    regions: HashSet<RegionCoord>,
}

impl HoldingSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            regions: HashSet::new(),
        }
    }

    /// Check whether a region is held.
    pub fn contains(&self, coord: &RegionCoord) -> bool {
        self.regions.contains(coord)
    }

    /// Record a region as held. Returns true if it was not held before.
    pub fn insert(&mut self, coord: RegionCoord) -> bool {
        self.regions.insert(coord)
    }

    /// Forget a region. Returns true if it was held.
    pub fn remove(&mut self, coord: &RegionCoord) -> bool {
        self.regions.remove(coord)
    }

    /// Number of held regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Iterate held regions (arbitrary order).
    pub fn iter(&self) -> impl Iterator<Item = &RegionCoord> {
        self.regions.iter()
    }

    /// Held regions that `keep` rejects.
    ///
    /// Collected up front so the caller can mutate the set while walking the
    /// result.
    pub fn stale<F>(&self, keep: F) -> Vec<RegionCoord>
    where
        F: Fn(&RegionCoord) -> bool,
    {
        self.regions.iter().filter(|c| !keep(c)).copied().collect()
    }

    /// Remove and return every held region.
    pub fn drain(&mut self) -> Vec<RegionCoord> {
        self.regions.drain().collect()
    }

    /// Borrow as a std set.
    pub fn as_set(&self) -> &HashSet<RegionCoord> {
        &self.regions
    }
}

impl FromIterator<RegionCoord> for HoldingSet {
    fn from_iter<I: IntoIterator<Item = RegionCoord>>(iter: I) -> Self {
        Self {
            regions: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a HoldingSet {
    type Item = &'a RegionCoord;
    type IntoIter = std::collections::hash_set::Iter<'a, RegionCoord>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}
