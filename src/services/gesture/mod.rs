//! Gesture state machine for painting and erasing availability.
//!
//! A gesture is `Idle` until a pointer-down/touch-start lands on a cell.
//! Starting on an empty cell paints, starting on a selected cell erases.
//! While selecting, each hovered cell recomputes a draft from the canonical
//! selection without committing it; release commits the last draft.
//!
//! Release must always be able to close a gesture, including when the
//! pointer comes up outside every cell. Callers wire [`GestureEvent::Release`]
//! to a window/document-level listener, not only to per-cell handlers, and a
//! release while idle is a no-op so both may fire.

use chrono::{DateTime, Utc};

use crate::models::cell::{LocationId, Selection};
use crate::services::grid::TimeGrid;
use crate::services::selection::{draft_selection, SelectionMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureMode {
    Adding,
    Removing,
}

impl GestureMode {
    pub fn selection_mode(self) -> SelectionMode {
        match self {
            GestureMode::Adding => SelectionMode::Add,
            GestureMode::Removing => SelectionMode::Remove,
        }
    }
}

/// An in-progress drag or tap.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveGesture {
    pub mode: GestureMode,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Location painted by this gesture, fixed at gesture start
    pub location: Option<LocationId>,
    pub draft: Selection,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum GestureState {
    #[default]
    Idle,
    Selecting(ActiveGesture),
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, GestureState::Idle)
    }

    pub fn active(&self) -> Option<&ActiveGesture> {
        match self {
            GestureState::Idle => None,
            GestureState::Selecting(gesture) => Some(gesture),
        }
    }
}

/// Input delivered by the rendering layer, already resolved to grid instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    Start {
        cell: DateTime<Utc>,
        location: Option<LocationId>,
    },
    /// Pointer entered a cell, or a touch moved. `None` when the touch
    /// position did not resolve to any cell.
    Hover { cell: Option<DateTime<Utc>> },
    Release,
    Cancel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    Ignored,
    DraftUpdated,
    Committed(Selection),
    Cancelled,
}

/// Pure transition function of the gesture state machine.
pub fn transition(
    state: GestureState,
    event: GestureEvent,
    grid: &TimeGrid,
    current: &Selection,
) -> (GestureState, GestureOutcome) {
    match (state, event) {
        (GestureState::Idle, GestureEvent::Start { cell, location }) => {
            if !grid.contains(cell) {
                log::warn!("Gesture start at {} is not on the grid, ignoring", cell);
                return (GestureState::Idle, GestureOutcome::Ignored);
            }
            let mode = if current.contains(cell) {
                GestureMode::Removing
            } else {
                GestureMode::Adding
            };
            // Drafting the start cell right away means a stationary tap,
            // which never produces a move event, still toggles one cell.
            let draft = draft_selection(grid, current, cell, cell, mode.selection_mode(), location);
            log::debug!("Gesture started at {} ({:?})", cell, mode);
            let gesture = ActiveGesture {
                mode,
                start: cell,
                end: cell,
                location,
                draft,
            };
            (GestureState::Selecting(gesture), GestureOutcome::DraftUpdated)
        }
        (GestureState::Selecting(mut gesture), GestureEvent::Hover { cell: Some(cell) }) => {
            if cell == gesture.end {
                return (GestureState::Selecting(gesture), GestureOutcome::Ignored);
            }
            if !grid.contains(cell) {
                return (GestureState::Selecting(gesture), GestureOutcome::Ignored);
            }
            gesture.end = cell;
            gesture.draft = draft_selection(
                grid,
                current,
                gesture.start,
                cell,
                gesture.mode.selection_mode(),
                gesture.location,
            );
            (GestureState::Selecting(gesture), GestureOutcome::DraftUpdated)
        }
        (GestureState::Selecting(gesture), GestureEvent::Hover { cell: None }) => {
            log::warn!("Touch moved outside the grid, keeping last draft");
            (GestureState::Selecting(gesture), GestureOutcome::Ignored)
        }
        (GestureState::Selecting(gesture), GestureEvent::Release) => {
            log::debug!(
                "Gesture committed: {} cells selected ({:?} {} to {})",
                gesture.draft.len(),
                gesture.mode,
                gesture.start,
                gesture.end
            );
            (GestureState::Idle, GestureOutcome::Committed(gesture.draft))
        }
        (GestureState::Selecting(_), GestureEvent::Cancel) => {
            log::debug!("Gesture cancelled");
            (GestureState::Idle, GestureOutcome::Cancelled)
        }
        (state @ GestureState::Selecting(_), GestureEvent::Start { .. }) => {
            (state, GestureOutcome::Ignored)
        }
        (GestureState::Idle, _) => (GestureState::Idle, GestureOutcome::Ignored),
    }
}

/// Holds the gesture state for one mounted grid.
#[derive(Debug, Clone, Default)]
pub struct SelectionGesture {
    state: GestureState,
}

impl SelectionGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn active(&self) -> Option<&ActiveGesture> {
        self.state.active()
    }

    pub fn is_active(&self) -> bool {
        !self.state.is_idle()
    }

    /// The draft being previewed, if a gesture is in progress.
    pub fn draft(&self) -> Option<&Selection> {
        self.active().map(|gesture| &gesture.draft)
    }

    pub fn dispatch(
        &mut self,
        event: GestureEvent,
        grid: &TimeGrid,
        current: &Selection,
    ) -> GestureOutcome {
        let state = std::mem::take(&mut self.state);
        let (next, outcome) = transition(state, event, grid, current);
        self.state = next;
        outcome
    }

    pub fn begin(
        &mut self,
        cell: DateTime<Utc>,
        location: Option<LocationId>,
        grid: &TimeGrid,
        current: &Selection,
    ) -> GestureOutcome {
        self.dispatch(GestureEvent::Start { cell, location }, grid, current)
    }

    pub fn update_hover(
        &mut self,
        cell: Option<DateTime<Utc>>,
        grid: &TimeGrid,
        current: &Selection,
    ) -> GestureOutcome {
        self.dispatch(GestureEvent::Hover { cell }, grid, current)
    }

    /// End the gesture, returning the selection to commit.
    pub fn finish(&mut self, grid: &TimeGrid, current: &Selection) -> Option<Selection> {
        match self.dispatch(GestureEvent::Release, grid, current) {
            GestureOutcome::Committed(selection) => Some(selection),
            _ => None,
        }
    }

    pub fn cancel(&mut self, grid: &TimeGrid, current: &Selection) {
        self.dispatch(GestureEvent::Cancel, grid, current);
    }
}
