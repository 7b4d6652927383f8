//! Cashcast forecast CLI
//!
//! Reads a JSON snapshot (from the path given as the first argument, the
//! configured `input.snapshot_path`, or stdin), runs the forecast pipeline and
//! writes the JSON report to stdout. Logs go to stderr.

use std::io::{self, Read, Write};
use std::process::ExitCode;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cashcast_core::{ForecastInput, ForecastPipeline};
use cashcast_shared::{AppConfig, AppError, AppResult};

fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cashcast=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let app_error = classify(&err);
            error!(code = app_error.error_code(), "{err:#}");
            ExitCode::from(app_error.exit_code())
        }
    }
}

fn run() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    let path = std::env::args()
        .nth(1)
        .or_else(|| config.input.snapshot_path.clone());
    let raw = read_snapshot(path.as_deref())?;
    let input: ForecastInput = serde_json::from_str(&raw)
        .map_err(AppError::from)
        .context("Snapshot is not a valid forecast input")?;

    let today = resolve_today(config.projection.reference_date, config.projection.tz()?, Utc::now());
    info!(%today, timezone = %config.projection.timezone, "Resolved reference date");

    let report = ForecastPipeline::from_config(&config)
        .run(&input, today)
        .map_err(|err| AppError::Validation(err.to_string()))?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &report).map_err(AppError::from)?;
    writeln!(stdout).map_err(|err| AppError::Output(err.to_string()))?;
    Ok(())
}

/// The `AppError` behind a failure; anything else is internal.
fn classify(err: &anyhow::Error) -> AppError {
    err.downcast_ref::<AppError>()
        .cloned()
        .unwrap_or_else(|| AppError::Internal(format!("{err:#}")))
}

fn read_snapshot(path: Option<&str>) -> AppResult<String> {
    match path {
        Some(path) => {
            info!(path, "Reading snapshot");
            std::fs::read_to_string(path)
                .map_err(|err| AppError::Input(format!("Cannot read {path}: {err}")))
        }
        None => {
            info!("Reading snapshot from stdin");
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .map_err(|err| AppError::Input(format!("Cannot read stdin: {err}")))?;
            Ok(raw)
        }
    }
}

/// The configured reference date, or the current calendar date in `tz`.
fn resolve_today(
    fixed: Option<NaiveDate>,
    tz: Tz,
    now: chrono::DateTime<Utc>,
) -> NaiveDate {
    fixed.unwrap_or_else(|| now.with_timezone(&tz).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_resolve_today_uses_zone() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 3, 0, 0).unwrap();
        assert_eq!(
            resolve_today(None, chrono_tz::America::Los_Angeles, now),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
        assert_eq!(
            resolve_today(None, chrono_tz::UTC, now),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_resolve_today_prefers_fixed_date() {
        let fixed = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(resolve_today(Some(fixed), chrono_tz::UTC, now), fixed);
    }

    #[test]
    fn test_classify_keeps_app_errors() {
        let err = anyhow::Error::new(AppError::Input("gone".into())).context("Reading snapshot");
        assert_eq!(classify(&err).exit_code(), 66);
    }

    #[test]
    fn test_classify_unknown_errors_as_internal() {
        let err = anyhow::anyhow!("worker panicked");
        let classified = classify(&err);
        assert_eq!(classified.error_code(), "INTERNAL_ERROR");
        assert_eq!(classified.exit_code(), 70);
    }

    #[test]
    fn test_missing_snapshot_is_input_error() {
        let err = read_snapshot(Some("/nonexistent/snapshot.json")).unwrap_err();
        assert_eq!(err.exit_code(), 66);
    }
}
