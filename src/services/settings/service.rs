use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use directories::ProjectDirs;

use crate::models::settings::EditorSettings;
use crate::services::timezone::parse_timezone;

/// Environment variable consulted when the settings name no timezone.
pub const TIMEZONE_ENV_VAR: &str = "AVAILABILITY_TZ";

const SETTINGS_FILE: &str = "settings.toml";

/// Loads and saves editor settings as TOML.
pub struct SettingsService {
    path: PathBuf,
}

impl SettingsService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Service bound to `settings.toml` in the platform config directory.
    pub fn with_default_path() -> Result<Self> {
        let dirs = ProjectDirs::from("com", "TutorAvailability", "AvailabilityEditor")
            .context("Failed to determine config directory")?;
        Ok(Self::new(dirs.config_dir().join(SETTINGS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, falling back to defaults when the file does not exist.
    pub fn load(&self) -> Result<EditorSettings> {
        if !self.path.exists() {
            log::info!(
                "No settings file at {}, using defaults",
                self.path.display()
            );
            return Ok(EditorSettings::default());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let settings: EditorSettings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings in {}", self.path.display()))?;
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings in {}: {}", self.path.display(), e))?;

        log::info!("Loaded settings from {}", self.path.display());
        Ok(settings)
    }

    pub fn save(&self, settings: &EditorSettings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create dir {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))?;

        log::info!("Saved settings to {}", self.path.display());
        Ok(())
    }

    /// Reset settings to defaults
    pub fn reset(&self) -> Result<()> {
        self.save(&EditorSettings::default())
    }
}

/// Resolve the viewer's timezone.
///
/// Order: the settings value, then `AVAILABILITY_TZ`, then `TZ`, then UTC.
/// An explicitly configured but unknown name is an error; unknown names in
/// the environment are logged and skipped.
pub fn resolve_timezone(settings: &EditorSettings) -> Result<Tz> {
    if let Some(ref name) = settings.timezone {
        return parse_timezone(name).map_err(|e| anyhow!(e));
    }

    for var in [TIMEZONE_ENV_VAR, "TZ"] {
        if let Ok(raw) = std::env::var(var) {
            match parse_timezone(&raw) {
                Ok(tz) => {
                    log::info!("Using timezone {} from {}", tz.name(), var);
                    return Ok(tz);
                }
                Err(err) => log::warn!("Ignoring {}: {}", var, err),
            }
        }
    }

    log::info!("No timezone configured, using UTC");
    Ok(chrono_tz::UTC)
}
