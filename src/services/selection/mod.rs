// Selection service
// Turns a gesture's start/end cells into a draft and merges it into the selection

mod merge;
mod scheme;

pub use merge::{apply_add_corrections, apply_remove_corrections, merge};
pub use scheme::linear_range;

use chrono::{DateTime, Utc};

use crate::models::cell::{LocationId, Selection};
use crate::services::grid::TimeGrid;

/// Whether a gesture paints or erases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Add,
    Remove,
}

/// The selection that would result from a linear drag from `start` to `end`
/// over `current`.
pub fn draft_selection(
    grid: &TimeGrid,
    current: &Selection,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    mode: SelectionMode,
    location: Option<LocationId>,
) -> Selection {
    let touched = linear_range(grid, start, end, location);
    merge(current, &touched, mode)
}
