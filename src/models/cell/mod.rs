// Cell module
// Hour cells painted on the availability grid and the ordered selection built from them

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

/// Identifier of a physical location. `None` wherever a location is optional
/// means the session is remote.
pub type LocationId = i64;

/// Length of one selectable grid cell.
pub fn cell_duration() -> Duration {
    Duration::hours(1)
}

/// Cells are compared at minute resolution.
pub(crate) fn minute_key(date: DateTime<Utc>) -> i64 {
    date.timestamp().div_euclid(60)
}

/// One selectable hour slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeCell {
    pub date: DateTime<Utc>,
    pub location: Option<LocationId>,
    /// First cell of a contiguous block
    pub is_first: bool,
    /// Last cell of a contiguous block
    pub is_last: bool,
}

impl TimeCell {
    /// Create an untagged cell. Boundary flags are filled in by
    /// [`Selection::retag`] or the merge corrections.
    pub fn new(date: DateTime<Utc>, location: Option<LocationId>) -> Self {
        Self {
            date,
            location,
            is_first: false,
            is_last: false,
        }
    }

    /// Exclusive end of the slot.
    pub fn end(&self) -> DateTime<Utc> {
        self.date + cell_duration()
    }

    /// True when `next` starts exactly where this cell ends and shares its location.
    pub fn continues_into(&self, next: &TimeCell) -> bool {
        minute_key(self.end()) == minute_key(next.date) && self.location == next.location
    }

    pub fn same_slot(&self, date: DateTime<Utc>) -> bool {
        minute_key(self.date) == minute_key(date)
    }
}

/// A block boundary forced onto one slot, independent of its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryMark {
    pub date: DateTime<Utc>,
    pub is_first: bool,
    pub is_last: bool,
}

impl BoundaryMark {
    pub fn first(date: DateTime<Utc>) -> Self {
        Self {
            date,
            is_first: true,
            is_last: false,
        }
    }

    pub fn last(date: DateTime<Utc>) -> Self {
        Self {
            date,
            is_first: false,
            is_last: true,
        }
    }
}

/// Ordered, deduplicated list of painted cells.
///
/// Cells are kept sorted ascending by `date` and no two cells share a
/// minute. Order matters: boundary flags are computed from neighbours.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    cells: Vec<TimeCell>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selection from arbitrary cells, sorting and dropping later
    /// duplicates of the same slot. Flags are kept as given.
    pub fn from_cells(cells: impl IntoIterator<Item = TimeCell>) -> Self {
        let mut cells: Vec<TimeCell> = cells.into_iter().collect();
        cells.sort_by_key(|cell| minute_key(cell.date));
        cells.dedup_by_key(|cell| minute_key(cell.date));
        Self { cells }
    }

    pub fn cells(&self) -> &[TimeCell] {
        &self.cells
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeCell> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Index of the cell occupying `date`'s slot.
    pub fn position(&self, date: DateTime<Utc>) -> Option<usize> {
        position_in(&self.cells, date)
    }

    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        self.position(date).is_some()
    }

    pub fn get(&self, date: DateTime<Utc>) -> Option<&TimeCell> {
        self.position(date).map(|index| &self.cells[index])
    }

    pub fn dates(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.cells.iter().map(|cell| cell.date)
    }

    /// Same slots selected, ignoring locations and flags.
    pub fn same_dates(&self, other: &Selection) -> bool {
        self.len() == other.len()
            && self
                .dates()
                .zip(other.dates())
                .all(|(a, b)| minute_key(a) == minute_key(b))
    }

    /// Cells whose start falls on `date` in `tz`.
    pub fn cells_on_local_date<Tz: TimeZone>(&self, date: NaiveDate, tz: &Tz) -> Vec<TimeCell> {
        self.cells
            .iter()
            .filter(|cell| cell.date.with_timezone(tz).date_naive() == date)
            .copied()
            .collect()
    }

    /// Recompute every boundary flag from true discontinuities: a location
    /// change or a gap between neighbouring slots.
    pub fn retag(&mut self) {
        let flags: Vec<(bool, bool)> = (0..self.cells.len())
            .map(|i| {
                let starts = i == 0 || !self.cells[i - 1].continues_into(&self.cells[i]);
                let ends = self
                    .cells
                    .get(i + 1)
                    .map_or(true, |next| !self.cells[i].continues_into(next));
                (starts, ends)
            })
            .collect();

        for (cell, (is_first, is_last)) in self.cells.iter_mut().zip(flags) {
            cell.is_first = is_first;
            cell.is_last = is_last;
        }
    }

    pub fn retagged(mut self) -> Self {
        self.retag();
        self
    }

    /// Set the flags carried by `marks` on top of the current ones. Marks for
    /// slots that are not selected are skipped.
    pub fn mark_boundaries(&mut self, marks: &[BoundaryMark]) {
        for mark in marks {
            if let Some(index) = self.position(mark.date) {
                let cell = &mut self.cells[index];
                cell.is_first |= mark.is_first;
                cell.is_last |= mark.is_last;
            }
        }
    }

    /// Split into visual blocks using the boundary flags.
    pub fn blocks(&self) -> Vec<&[TimeCell]> {
        let mut blocks = Vec::new();
        let mut start = 0;
        for (i, cell) in self.cells.iter().enumerate() {
            let next_starts = self.cells.get(i + 1).map_or(true, |next| next.is_first);
            if cell.is_last || next_starts {
                blocks.push(&self.cells[start..=i]);
                start = i + 1;
            }
        }
        blocks
    }
}

impl IntoIterator for Selection {
    type Item = TimeCell;
    type IntoIter = std::vec::IntoIter<TimeCell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = &'a TimeCell;
    type IntoIter = std::slice::Iter<'a, TimeCell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

impl FromIterator<TimeCell> for Selection {
    fn from_iter<I: IntoIterator<Item = TimeCell>>(iter: I) -> Self {
        Self::from_cells(iter)
    }
}

/// Binary search a sorted cell slice by slot.
pub(crate) fn position_in(cells: &[TimeCell], date: DateTime<Utc>) -> Option<usize> {
    let key = minute_key(date);
    cells
        .binary_search_by_key(&key, |cell| minute_key(cell.date))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_from_cells_sorts_and_dedups() {
        let selection = Selection::from_cells(vec![
            TimeCell::new(at(11), Some(1)),
            TimeCell::new(at(9), Some(1)),
            TimeCell::new(at(11), Some(2)),
        ]);
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.cells()[0].date, at(9));
        assert_eq!(selection.get(at(11)).unwrap().location, Some(1));
    }

    #[test]
    fn test_contains_matches_at_minute_resolution() {
        let selection = Selection::from_cells(vec![TimeCell::new(at(9), None)]);
        let with_seconds = at(9) + Duration::seconds(30);
        assert!(selection.contains(with_seconds));
        assert!(!selection.contains(at(10)));
    }

    #[test]
    fn test_retag_marks_gaps_and_location_changes() {
        let selection = Selection::from_cells(vec![
            TimeCell::new(at(9), Some(1)),
            TimeCell::new(at(10), Some(1)),
            TimeCell::new(at(11), Some(2)),
            TimeCell::new(at(13), Some(2)),
        ])
        .retagged();

        let flags: Vec<(bool, bool)> = selection
            .iter()
            .map(|cell| (cell.is_first, cell.is_last))
            .collect();
        assert_eq!(
            flags,
            vec![(true, false), (false, true), (true, true), (true, true)]
        );
    }

    #[test]
    fn test_mark_boundaries_only_adds_flags() {
        let mut selection = Selection::from_cells(vec![
            TimeCell::new(at(9), None),
            TimeCell::new(at(10), None),
            TimeCell::new(at(11), None),
        ])
        .retagged();
        selection.mark_boundaries(&[
            BoundaryMark::last(at(9)),
            BoundaryMark::first(at(10)),
            BoundaryMark::first(at(14)),
        ]);

        let flags: Vec<(bool, bool)> = selection
            .iter()
            .map(|cell| (cell.is_first, cell.is_last))
            .collect();
        assert_eq!(flags, vec![(true, true), (true, false), (false, true)]);
        assert_eq!(selection.blocks().len(), 2);
    }

    #[test]
    fn test_blocks_follow_flags() {
        let selection = Selection::from_cells(vec![
            TimeCell::new(at(9), None),
            TimeCell::new(at(10), None),
            TimeCell::new(at(12), None),
        ])
        .retagged();
        let blocks = selection.blocks();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].len(), 2);
        assert_eq!(blocks[1][0].date, at(12));
    }

    #[test]
    fn test_same_dates_ignores_locations() {
        let a = Selection::from_cells(vec![TimeCell::new(at(9), Some(1))]);
        let b = Selection::from_cells(vec![TimeCell::new(at(9), Some(7))]);
        assert!(a.same_dates(&b));
        assert_ne!(a, b);
    }
}
