use std::fs;
use std::path::Path;

use anyhow::{Context, Result as AnyResult};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

use crate::error::Result;
use crate::models::cell::LocationId;
use crate::models::settings::EditorSettings;
use crate::models::timespan::Availabilities;
use crate::services::editor::AvailabilityEditor;

/// One scripted drag from `from` to `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayGesture {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<LocationId>,
    /// Abort the gesture instead of releasing it
    #[serde(default)]
    pub cancel: bool,
}

/// A recorded editing session against a date-specific grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayScript {
    pub start_date: NaiveDate,
    #[serde(default)]
    pub existing: Availabilities,
    #[serde(default)]
    pub gestures: Vec<ReplayGesture>,
}

pub fn load_script(path: &Path) -> AnyResult<ReplayScript> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read replay script from {}", path.display()))?;
    serde_json::from_str(&data).map_err(|err| map_deser_error(err, path))
}

fn map_deser_error(err: SerdeError, path: &Path) -> anyhow::Error {
    anyhow::Error::new(err).context(format!(
        "failed to deserialize replay script from {}",
        path.display()
    ))
}

/// Mount an editor over the script's grid, play every gesture through it and
/// return the payload a submit would send.
pub fn replay(settings: &EditorSettings, tz: Tz, script: &ReplayScript) -> Result<Availabilities> {
    let mut editor: AvailabilityEditor<usize> =
        AvailabilityEditor::mount(settings, script.start_date, tz, &script.existing)?;

    for (i, gesture) in script.gestures.iter().enumerate() {
        editor.pointer_down_at(gesture.from, gesture.location.or(settings.default_location));
        editor.hover_at(gesture.to);
        if gesture.cancel {
            editor.cancel();
            log::debug!("Gesture {} cancelled", i);
        } else if !editor.pointer_up() {
            log::warn!("Gesture {} starting at {} did not commit", i, gesture.from);
        }
    }

    Ok(editor.availabilities(&script.existing))
}
