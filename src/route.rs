//! An aircraft's ordered, distinct sequence of sector indices, with a cursor.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::SectorIndex;

pub struct Route {
    sectors: Vec<SectorIndex>,
    cursor: usize,
}

impl Route {
    /// Builds a route of random length `k` in `[1, num_sectors]` over `k`
    /// distinct sector indices.
    pub fn random(num_sectors: usize, rng: &mut impl Rng) -> Self {
        debug_assert!(num_sectors > 0, "a route needs at least one sector to draw from");
        let len = rng.gen_range(1..=num_sectors);
        let mut sectors: Vec<SectorIndex> = (0..num_sectors).collect();
        sectors.shuffle(rng);
        sectors.truncate(len);
        Self { sectors, cursor: 0 }
    }

    /// Builds a route from an explicit, caller-guaranteed-distinct sequence.
    /// Used by tests to pin down exact routes instead of random ones.
    pub fn from_sectors(sectors: Vec<SectorIndex>) -> Self {
        Self { sectors, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    pub fn sectors(&self) -> &[SectorIndex] {
        &self.sectors
    }

    /// Advances the cursor and returns the next sector, or `None` at route end.
    pub fn next(&mut self) -> Option<SectorIndex> {
        let next = self.sectors.get(self.cursor).copied();
        if next.is_some() {
            self.cursor += 1;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn random_route_has_distinct_sectors_within_bounds() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let route = Route::random(5, &mut rng);
            assert!(!route.is_empty());
            assert!(route.len() <= 5);
            let unique: HashSet<_> = route.sectors().iter().collect();
            assert_eq!(unique.len(), route.sectors().len());
        }
    }

    #[test]
    fn next_yields_sectors_in_order_then_none() {
        let mut route = Route::from_sectors(vec![2, 0, 1]);
        assert_eq!(route.next(), Some(2));
        assert_eq!(route.next(), Some(0));
        assert_eq!(route.next(), Some(1));
        assert_eq!(route.next(), None);
        assert_eq!(route.next(), None);
    }
}
