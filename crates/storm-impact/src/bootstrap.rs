use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File names probed when `--data-file` is not given.
const DATA_FILE_NAMES: [&str; 2] = ["StormData.csv", "StormData.csv.gz"];

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a CLI log-level name to an [`EnvFilter`] directive.
///
/// Unrecognised names are passed through so that full directives such as
/// `"impact_data=debug"` still work.
pub fn filter_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Logs go to stderr so stdout carries only the report. Falls back to
/// `"info"` if the level cannot be parsed as a filter.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(filter_directive(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .init();

    Ok(())
}

// ── Data-file discovery ────────────────────────────────────────────────────────

/// Attempt to locate the storm events export.
///
/// Checks, in order, `StormData.csv` then `StormData.csv.gz` in the working
/// directory, then in `./data/`, then `~/.storm-impact/StormData.csv`.
/// Returns the first that exists.
pub fn discover_data_file() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    discover_data_file_in(&cwd, dirs::home_dir().as_deref())
}

/// Same as [`discover_data_file`] with explicit roots (used for testing).
pub fn discover_data_file_in(cwd: &Path, home: Option<&Path>) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    for dir in [cwd.to_path_buf(), cwd.join("data")] {
        candidates.extend(DATA_FILE_NAMES.iter().map(|name| dir.join(name)));
    }
    if let Some(home) = home {
        candidates.push(home.join(".storm-impact").join(DATA_FILE_NAMES[0]));
    }
    candidates.into_iter().find(|p| p.is_file())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).expect("create parent");
        std::fs::write(path, "BGN_DATE\n").expect("write file");
    }

    // ── filter_directive ──────────────────────────────────────────────────────

    #[test]
    fn test_filter_directive_maps_levels() {
        assert_eq!(filter_directive("DEBUG"), "debug");
        assert_eq!(filter_directive("info"), "info");
        assert_eq!(filter_directive("WARNING"), "warn");
        assert_eq!(filter_directive("ERROR"), "error");
    }

    #[test]
    fn test_filter_directive_passes_through_directives() {
        assert_eq!(filter_directive("impact_data=debug"), "impact_data=debug");
    }

    // ── discover_data_file_in ─────────────────────────────────────────────────

    #[test]
    fn test_discover_returns_none_when_absent() {
        let cwd = TempDir::new().expect("tempdir");
        let home = TempDir::new().expect("tempdir");
        assert!(discover_data_file_in(cwd.path(), Some(home.path())).is_none());
    }

    #[test]
    fn test_discover_prefers_working_directory() {
        let cwd = TempDir::new().expect("tempdir");
        let direct = cwd.path().join("StormData.csv");
        touch(&direct);
        touch(&cwd.path().join("data").join("StormData.csv"));

        assert_eq!(discover_data_file_in(cwd.path(), None), Some(direct));
    }

    #[test]
    fn test_discover_finds_gzip_in_data_dir() {
        let cwd = TempDir::new().expect("tempdir");
        let gz = cwd.path().join("data").join("StormData.csv.gz");
        touch(&gz);

        assert_eq!(discover_data_file_in(cwd.path(), None), Some(gz));
    }

    #[test]
    fn test_discover_falls_back_to_home() {
        let cwd = TempDir::new().expect("tempdir");
        let home = TempDir::new().expect("tempdir");
        let in_home = home.path().join(".storm-impact").join("StormData.csv");
        touch(&in_home);

        assert_eq!(
            discover_data_file_in(cwd.path(), Some(home.path())),
            Some(in_home)
        );
    }

    #[test]
    fn test_discover_ignores_directories_with_data_name() {
        let cwd = TempDir::new().expect("tempdir");
        std::fs::create_dir_all(cwd.path().join("StormData.csv")).expect("mkdir");
        assert!(discover_data_file_in(cwd.path(), None).is_none());
    }
}
