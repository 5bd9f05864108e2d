// Settings module
// Editor configuration persisted as TOML

use serde::{Deserialize, Serialize};

use crate::error::{AvailabilityError, Result};
use crate::models::cell::LocationId;
use crate::models::recurring::RecurringWeek;

/// Configuration for a mounted availability editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// First hour shown in each day column
    pub min_hour: u32,
    /// Last hour shown in each day column (inclusive, 24 = next midnight)
    pub max_hour: u32,
    /// Number of day columns
    pub num_days: u32,
    /// IANA timezone name; resolved from the environment when unset
    pub timezone: Option<String>,
    /// Reference week recurring templates are stored in
    pub recurring_anchor: RecurringWeek,
    /// Location painted by new gestures when the UI supplies none
    pub default_location: Option<LocationId>,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            min_hour: 6,
            max_hour: 22,
            num_days: 7,
            timezone: None,
            recurring_anchor: RecurringWeek::default(),
            default_location: None,
        }
    }
}

impl EditorSettings {
    pub fn validate(&self) -> Result<()> {
        if self.min_hour > self.max_hour || self.max_hour > 24 {
            return Err(AvailabilityError::InvalidGridBounds {
                min_hour: self.min_hour,
                max_hour: self.max_hour,
            });
        }

        if self.num_days == 0 {
            return Err(AvailabilityError::InvalidDayCount(self.num_days));
        }

        if let Some(ref name) = self.timezone {
            if name.trim().is_empty() {
                return Err(AvailabilityError::InvalidSettings(
                    "timezone cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = EditorSettings::default();
        assert_eq!(settings.min_hour, 6);
        assert_eq!(settings.max_hour, 22);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_inverted_hours_are_rejected() {
        let settings = EditorSettings {
            min_hour: 18,
            max_hour: 9,
            ..EditorSettings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(AvailabilityError::InvalidGridBounds {
                min_hour: 18,
                max_hour: 9
            })
        );
    }

    #[test]
    fn test_zero_days_rejected() {
        let settings = EditorSettings {
            num_days: 0,
            ..EditorSettings::default()
        };
        assert_eq!(settings.validate(), Err(AvailabilityError::InvalidDayCount(0)));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: EditorSettings = toml::from_str(
            "min_hour = 8\ntimezone = \"America/New_York\"\nrecurring_anchor = \"2018-01-03\"\n",
        )
        .unwrap();
        assert_eq!(settings.min_hour, 8);
        assert_eq!(settings.max_hour, 22);
        assert_eq!(settings.timezone.as_deref(), Some("America/New_York"));
        assert_eq!(settings.recurring_anchor, RecurringWeek::default());
    }
}
