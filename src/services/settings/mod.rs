mod service;

pub use service::{resolve_timezone, SettingsService, TIMEZONE_ENV_VAR};
