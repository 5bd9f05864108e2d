//! Availability editor for one mounted grid.
//!
//! Owns the grid, the cell index and the gesture state for as long as the
//! editing surface is mounted. The rendering layer forwards raw pointer and
//! touch input here and redraws from [`AvailabilityEditor::display_selection`].

use std::hash::Hash;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::Result;
use crate::models::cell::{LocationId, Selection};
use crate::models::recurring::RecurringWeek;
use crate::models::settings::EditorSettings;
use crate::models::timespan::Availabilities;
use crate::services::cell_index::{CellIndex, HitTest};
use crate::services::collapse::{build_availabilities_preserving, seed_for_grid};
use crate::services::gesture::{GestureOutcome, SelectionGesture};
use crate::services::grid::{GridBounds, TimeGrid};
use crate::services::recurring::{build_recurring, RecurringPayload};

pub struct AvailabilityEditor<H: Copy + Eq + Hash> {
    grid: TimeGrid,
    index: CellIndex<H>,
    gesture: SelectionGesture,
    selection: Selection,
    /// Stored spans on covered dates that the grid cannot show
    preserved: Availabilities,
}

impl<H: Copy + Eq + Hash> AvailabilityEditor<H> {
    pub fn new(grid: TimeGrid, selection: Selection) -> Self {
        Self {
            grid,
            index: CellIndex::new(),
            gesture: SelectionGesture::new(),
            selection,
            preserved: Availabilities::new(),
        }
    }

    /// Mount a date-specific editor starting at `start_date`, seeded from the
    /// persisted availability that falls on the grid. Stored spans on the
    /// same dates outside the grid rows are returned unchanged on submit.
    pub fn mount(
        settings: &EditorSettings,
        start_date: NaiveDate,
        tz: Tz,
        availabilities: &Availabilities,
    ) -> Result<Self> {
        settings.validate()?;
        let bounds = GridBounds::new(settings.num_days, settings.min_hour, settings.max_hour)?;
        let grid = TimeGrid::new(start_date, bounds, tz);

        let seed = seed_for_grid(availabilities, &grid);

        log::debug!(
            "Mounted editor for {} day(s) from {} with {} selected cell(s)",
            bounds.num_days(),
            start_date,
            seed.selection.len()
        );
        let mut editor = Self::new(grid, seed.selection);
        editor.preserved = seed.preserved;
        Ok(editor)
    }

    /// Mount a recurring editor showing the reference week.
    pub fn mount_recurring(
        settings: &EditorSettings,
        tz: Tz,
        selection: Selection,
    ) -> Result<Self> {
        settings.validate()?;
        let bounds = GridBounds::new(7, settings.min_hour, settings.max_hour)?;
        let grid = TimeGrid::new(settings.recurring_anchor.anchor(), bounds, tz);
        Ok(Self::new(grid, selection))
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    pub fn index(&self) -> &CellIndex<H> {
        &self.index
    }

    /// Record that the rendering layer realized `handle` for `date`.
    pub fn register_cell(&mut self, handle: H, date: DateTime<Utc>) {
        self.index.register(handle, date);
    }

    pub fn unregister_cell(&mut self, handle: H) {
        self.index.unregister(handle);
    }

    /// The canonical selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// What to draw: the draft while a gesture is active, otherwise the
    /// canonical selection.
    pub fn display_selection(&self) -> &Selection {
        self.gesture.draft().unwrap_or(&self.selection)
    }

    pub fn is_selecting(&self) -> bool {
        self.gesture.is_active()
    }

    pub fn pointer_down(&mut self, handle: H, location: Option<LocationId>) -> GestureOutcome {
        match self.index.date_for(handle) {
            Some(date) => self.pointer_down_at(date, location),
            None => {
                log::warn!("Pointer down on an unregistered cell, ignoring");
                GestureOutcome::Ignored
            }
        }
    }

    pub fn pointer_down_at(
        &mut self,
        date: DateTime<Utc>,
        location: Option<LocationId>,
    ) -> GestureOutcome {
        self.gesture.begin(date, location, &self.grid, &self.selection)
    }

    pub fn pointer_enter(&mut self, handle: H) -> GestureOutcome {
        let date = self.index.date_for(handle);
        self.gesture.update_hover(date, &self.grid, &self.selection)
    }

    pub fn hover_at(&mut self, date: DateTime<Utc>) -> GestureOutcome {
        self.gesture.update_hover(Some(date), &self.grid, &self.selection)
    }

    /// Touch moves carry only coordinates; resolve them through hit-testing.
    pub fn touch_move<T: HitTest<H> + ?Sized>(&mut self, hit_test: &T, x: f32, y: f32) -> GestureOutcome {
        let date = self.index.resolve_point(hit_test, x, y);
        self.gesture.update_hover(date, &self.grid, &self.selection)
    }

    /// End the gesture. Wire this to a global release listener as well as
    /// to the cells; calling it while idle does nothing.
    pub fn pointer_up(&mut self) -> bool {
        match self.gesture.finish(&self.grid, &self.selection) {
            Some(committed) => {
                self.selection = committed;
                true
            }
            None => false,
        }
    }

    pub fn cancel(&mut self) {
        self.gesture.cancel(&self.grid, &self.selection);
    }

    /// Replace the canonical selection, e.g. after a server round-trip.
    pub fn reset_selection(&mut self, selection: Selection) {
        self.cancel();
        self.selection = selection;
    }

    /// Date-specific payload for every date a grid cell starts on.
    pub fn availabilities(&self, previous: &Availabilities) -> Availabilities {
        build_availabilities_preserving(
            &self.selection,
            self.grid.timezone(),
            self.grid.covered_dates(),
            previous,
            &self.preserved,
        )
    }

    /// Per-weekday payload for a recurring editor.
    pub fn recurring(&self, week: &RecurringWeek) -> RecurringPayload {
        build_recurring(&self.selection, self.grid.timezone(), week)
    }

    /// Tear down: drop any gesture in progress and release every handle.
    pub fn unmount(&mut self) {
        self.cancel();
        self.index.clear();
    }
}

impl<H: Copy + Eq + Hash> Drop for AvailabilityEditor<H> {
    fn drop(&mut self) {
        self.unmount();
    }
}
