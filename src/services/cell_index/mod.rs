//! Bidirectional index between rendered cell handles and grid instants.
//!
//! The rendering layer registers each cell it realizes under an opaque
//! handle. Pointer events arrive with a handle and are resolved directly;
//! touch-move events only carry coordinates, so they go through a
//! [`HitTest`] implementation first. The index belongs to one mounted grid
//! and is cleared when that grid is torn down.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use chrono::{DateTime, Utc};

use crate::models::cell::minute_key;

/// Resolves a screen coordinate to the handle of the cell under it.
#[cfg_attr(test, mockall::automock)]
pub trait HitTest<H> {
    fn handle_at(&self, x: f32, y: f32) -> Option<H>;
}

#[derive(Debug, Clone)]
pub struct CellIndex<H> {
    by_handle: HashMap<H, DateTime<Utc>>,
    /// Keyed by slot minute, so lookups ignore sub-minute noise
    by_date: BTreeMap<i64, H>,
}

impl<H: Copy + Eq + Hash> CellIndex<H> {
    pub fn new() -> Self {
        Self {
            by_handle: HashMap::new(),
            by_date: BTreeMap::new(),
        }
    }

    /// Associate `handle` with `date`, replacing any stale association on
    /// either side.
    pub fn register(&mut self, handle: H, date: DateTime<Utc>) {
        if let Some(previous_date) = self.by_handle.insert(handle, date) {
            self.by_date.remove(&minute_key(previous_date));
        }
        if let Some(previous_handle) = self.by_date.insert(minute_key(date), handle) {
            if previous_handle != handle {
                self.by_handle.remove(&previous_handle);
            }
        }
    }

    pub fn unregister(&mut self, handle: H) -> Option<DateTime<Utc>> {
        let date = self.by_handle.remove(&handle)?;
        self.by_date.remove(&minute_key(date));
        Some(date)
    }

    pub fn date_for(&self, handle: H) -> Option<DateTime<Utc>> {
        self.by_handle.get(&handle).copied()
    }

    pub fn handle_for(&self, date: DateTime<Utc>) -> Option<H> {
        self.by_date.get(&minute_key(date)).copied()
    }

    /// Hit-test a coordinate and resolve the cell under it.
    pub fn resolve_point<T: HitTest<H> + ?Sized>(
        &self,
        hit_test: &T,
        x: f32,
        y: f32,
    ) -> Option<DateTime<Utc>> {
        hit_test
            .handle_at(x, y)
            .and_then(|handle| self.date_for(handle))
    }

    pub fn clear(&mut self) {
        self.by_handle.clear();
        self.by_date.clear();
    }

    pub fn len(&self) -> usize {
        self.by_handle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_handle.is_empty()
    }
}

impl<H: Copy + Eq + Hash> Default for CellIndex<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mockall::predicate::eq;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_register_and_lookup_both_ways() {
        let mut index = CellIndex::new();
        index.register(7u32, at(9));
        index.register(8u32, at(10));
        assert_eq!(index.date_for(7), Some(at(9)));
        assert_eq!(index.handle_for(at(10)), Some(8));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_reregistering_handle_drops_stale_date() {
        let mut index = CellIndex::new();
        index.register(7u32, at(9));
        index.register(7u32, at(11));
        assert_eq!(index.handle_for(at(9)), None);
        assert_eq!(index.handle_for(at(11)), Some(7));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_reregistering_date_drops_stale_handle() {
        let mut index = CellIndex::new();
        index.register(7u32, at(9));
        index.register(8u32, at(9));
        assert_eq!(index.date_for(7), None);
        assert_eq!(index.date_for(8), Some(at(9)));
    }

    #[test]
    fn test_handle_lookup_matches_at_minute_resolution() {
        let mut index = CellIndex::new();
        index.register(4u32, at(9));
        let with_millis = at(9) + chrono::Duration::milliseconds(1500);
        assert_eq!(index.handle_for(with_millis), Some(4));

        // Same slot registered with noise replaces the stale handle
        index.register(5u32, with_millis);
        assert_eq!(index.date_for(4), None);
        assert_eq!(index.handle_for(at(9)), Some(5));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_unregister_and_clear() {
        let mut index = CellIndex::new();
        index.register(1u32, at(9));
        index.register(2u32, at(10));
        assert_eq!(index.unregister(1), Some(at(9)));
        assert_eq!(index.handle_for(at(9)), None);
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.date_for(2), None);
    }

    #[test]
    fn test_resolve_point_uses_hit_test() {
        let mut index = CellIndex::new();
        index.register(3u32, at(14));

        let mut hit_test = MockHitTest::<u32>::new();
        hit_test
            .expect_handle_at()
            .with(eq(12.0), eq(40.0))
            .returning(|_, _| Some(3));
        hit_test
            .expect_handle_at()
            .with(eq(500.0), eq(500.0))
            .returning(|_, _| None);

        assert_eq!(index.resolve_point(&hit_test, 12.0, 40.0), Some(at(14)));
        assert_eq!(index.resolve_point(&hit_test, 500.0, 500.0), None);
    }
}
