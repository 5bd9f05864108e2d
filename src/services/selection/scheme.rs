use chrono::{DateTime, Utc};

use crate::models::cell::{LocationId, TimeCell};
use crate::services::grid::TimeGrid;

/// Cells covered by a linear drag from `start` to `end`, inclusive.
///
/// The range is taken from `start`'s day column in grid order. When `end`
/// sits in a different column it is projected onto `start`'s column by row.
/// Every produced cell carries `location`, the location in force when the
/// gesture began. Returns an empty list when `start` is not on the grid.
pub fn linear_range(
    grid: &TimeGrid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    location: Option<LocationId>,
) -> Vec<TimeCell> {
    let Some((col, start_row)) = grid.position_of(start) else {
        return Vec::new();
    };
    let Some(column) = grid.column(col) else {
        return Vec::new();
    };
    let end_row = grid
        .position_of(end)
        .map_or(start_row, |(_, row)| row.min(column.len().saturating_sub(1)));

    let (low, high) = if start_row <= end_row {
        (start_row, end_row)
    } else {
        (end_row, start_row)
    };

    let mut cells: Vec<TimeCell> = column[low..=high]
        .iter()
        .map(|date| TimeCell::new(*date, location))
        .collect();

    if let Some(first) = cells.first_mut() {
        first.is_first = true;
    }
    if let Some(last) = cells.last_mut() {
        last.is_last = true;
    }
    cells
}
