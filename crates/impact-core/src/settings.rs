use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

use crate::error::{Result, StormError};
use crate::models::DateWindow;

/// Default lower bound of the analysis window. Event recording was
/// standardised to the full set of event types from this date on.
pub const DEFAULT_START_DATE: &str = "1996-01-01";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Rank storm event categories by human and economic harm
#[derive(Parser, Debug, Clone)]
#[command(
    name = "storm-impact",
    about = "Rank storm event categories by human and economic harm",
    version
)]
pub struct Settings {
    /// Storm events CSV export (optionally gzip-compressed, `.gz`)
    #[arg(long, env = "STORM_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// First event date included in the analysis (YYYY-MM-DD)
    #[arg(long, env = "STORM_START_DATE", default_value = DEFAULT_START_DATE)]
    pub start_date: NaiveDate,

    /// Last event date included in the analysis (YYYY-MM-DD); open-ended if omitted
    #[arg(long, env = "STORM_END_DATE")]
    pub end_date: Option<NaiveDate>,

    /// Number of rows shown per ranking (1-1000)
    #[arg(long, env = "STORM_TOP", default_value = "10", value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub top: u32,

    /// Output format
    #[arg(long, env = "STORM_FORMAT", default_value = "table", value_parser = ["table", "json"])]
    pub format: String,

    /// Skip the documented outlier corrections (audit mode)
    #[arg(long)]
    pub skip_patches: bool,

    /// Logging level
    #[arg(long, env = "STORM_LOG_LEVEL", default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments, apply `--debug`, and validate.
    pub fn load() -> Result<Self> {
        Self::load_from_args(std::env::args_os())
    }

    /// Same as [`Settings::load`] but accepts an explicit argument list,
    /// enabling unit-testing without spawning subprocesses.
    pub fn load_from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut settings = Settings::parse_from(args);

        // --debug overrides log level.
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Reject combinations clap cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(StormError::Config(format!(
                    "end date {end} precedes start date {}",
                    self.start_date
                )));
            }
        }
        Ok(())
    }

    /// The analysis date window.
    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.start_date, self.end_date)
    }

    /// Whether the report should be emitted as JSON.
    pub fn json_output(&self) -> bool {
        self.format == "json"
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
