use std::collections::HashSet;

use crate::models::cell::{minute_key, position_in, BoundaryMark, Selection, TimeCell};

use super::SelectionMode;

/// Merge a gesture's cells into the canonical selection.
///
/// The merged cells are re-tagged from their gaps and location changes,
/// then the boundary corrections are laid on top. A repaint that cuts into
/// an existing block therefore redraws as separate sub-blocks even when the
/// locations match.
pub fn merge(current: &Selection, touched: &[TimeCell], mode: SelectionMode) -> Selection {
    let (cells, marks) = match mode {
        SelectionMode::Add => (
            union(current.cells(), touched),
            apply_add_corrections(current.cells(), touched),
        ),
        SelectionMode::Remove => (
            difference(current.cells(), touched),
            apply_remove_corrections(current.cells(), touched),
        ),
    };
    let mut merged = Selection::from_cells(cells).retagged();
    merged.mark_boundaries(&marks);
    merged
}

/// Boundaries forced when `added` is painted over `current`.
///
/// When the first added cell already exists and has a predecessor, that
/// predecessor ends its block and the painted range starts a new one. When
/// the last added cell already exists and has a successor, the painted range
/// ends there and the successor starts a new block.
pub fn apply_add_corrections(current: &[TimeCell], added: &[TimeCell]) -> Vec<BoundaryMark> {
    let mut marks = Vec::new();

    if let Some(first) = added.first() {
        if let Some(index) = position_in(current, first.date) {
            if index > 0 {
                marks.push(BoundaryMark::last(current[index - 1].date));
                marks.push(BoundaryMark::first(first.date));
            }
        }
    }

    if let Some(last) = added.last() {
        if let Some(index) = position_in(current, last.date) {
            if let Some(successor) = current.get(index + 1) {
                marks.push(BoundaryMark::first(successor.date));
                marks.push(BoundaryMark::last(last.date));
            }
        }
    }

    marks
}

/// Boundaries forced on the cells of `current` that survive removing `removed`.
///
/// Around the first removed cell, the surviving predecessor becomes a block
/// end and the surviving successor a block start. The surviving successor of
/// the last removed cell also becomes a block start, which covers a hole
/// punched in the middle of a longer block.
pub fn apply_remove_corrections(current: &[TimeCell], removed: &[TimeCell]) -> Vec<BoundaryMark> {
    let removed_indices: Vec<usize> = removed
        .iter()
        .filter_map(|cell| position_in(current, cell.date))
        .collect();
    let removed_set: HashSet<usize> = removed_indices.iter().copied().collect();
    let survives = |index: usize| index < current.len() && !removed_set.contains(&index);

    let mut marks = Vec::new();
    if let (Some(&first), Some(&last)) = (
        removed_indices.iter().min(),
        removed_indices.iter().max(),
    ) {
        if first > 0 && survives(first - 1) {
            marks.push(BoundaryMark::last(current[first - 1].date));
        }
        if survives(first + 1) {
            marks.push(BoundaryMark::first(current[first + 1].date));
        }
        if survives(last + 1) {
            marks.push(BoundaryMark::first(current[last + 1].date));
        }
    }
    marks
}

/// Union keyed by slot; cells from `added` replace existing ones.
fn union(current: &[TimeCell], added: &[TimeCell]) -> Vec<TimeCell> {
    let added_keys: HashSet<i64> = added.iter().map(|cell| minute_key(cell.date)).collect();
    current
        .iter()
        .filter(|cell| !added_keys.contains(&minute_key(cell.date)))
        .chain(added.iter())
        .copied()
        .collect()
}

fn difference(current: &[TimeCell], removed: &[TimeCell]) -> Vec<TimeCell> {
    let removed_keys: HashSet<i64> = removed.iter().map(|cell| minute_key(cell.date)).collect();
    current
        .iter()
        .filter(|cell| !removed_keys.contains(&minute_key(cell.date)))
        .copied()
        .collect()
}
