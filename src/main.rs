// Availability replay tool
// Plays a recorded editing session against a grid and prints the submit payload

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use tutor_availability::services::replay::{load_script, replay};
use tutor_availability::services::settings::{resolve_timezone, SettingsService};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "availability-replay",
    version,
    about = "Replay availability gestures and print the resulting payload"
)]
struct Args {
    /// Settings file to use instead of the platform default
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON script with the start date, existing availability and gestures
    script: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();

    log::info!("Starting availability replay");

    let args = Args::parse();
    let settings_service = match args.config {
        Some(path) => SettingsService::new(path),
        None => SettingsService::with_default_path()?,
    };
    let settings = settings_service.load()?;
    let tz = resolve_timezone(&settings)?;

    let script = load_script(&args.script)?;
    log::info!(
        "Replaying {} gesture(s) from {} in {}",
        script.gestures.len(),
        args.script.display(),
        tz.name()
    );

    let payload = replay(&settings, tz, &script).context("Replay failed")?;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_accept_config_and_script() {
        let args = Args::try_parse_from([
            "availability-replay",
            "--config",
            "settings.toml",
            "session.json",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("settings.toml")));
        assert_eq!(args.script, PathBuf::from("session.json"));
    }

    #[test]
    fn test_args_require_script() {
        assert!(Args::try_parse_from(["availability-replay"]).is_err());
    }

    #[test]
    fn test_args_reject_extra_positional() {
        assert!(Args::try_parse_from(["availability-replay", "a.json", "b.json"]).is_err());
    }
}
