//! Date-window and zero-harm filtering.
//!
//! Projects [`RawRecord`] rows onto [`Record`], keeping only events inside
//! the analysis window that caused at least some harm.

use chrono::NaiveDate;
use impact_core::models::{DamageTotals, DateWindow, RawRecord, Record};
use impact_core::{Result, StormError};
use tracing::{debug, info};

/// Records kept by [`filter_records`] plus counts of what was dropped.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub records: Vec<Record>,
    /// Rows dated outside the window.
    pub outside_window: usize,
    /// Rows inside the window with no fatalities, injuries or damage.
    pub zero_harm: usize,
}

/// Restrict `raw` to `window`, drop zero-harm rows and project the rest.
///
/// Every row's date is validated, including rows that end up dropped, so a
/// malformed date anywhere in the input aborts with
/// [`StormError::DateParse`].
pub fn filter_records(raw: Vec<RawRecord>, window: &DateWindow) -> Result<FilterOutcome> {
    let total = raw.len();
    let mut outcome = FilterOutcome::default();

    for row in raw {
        let date =
            parse_event_date(&row.begin_date).ok_or_else(|| StormError::DateParse {
                record_id: row.reference_number.trim().to_string(),
                value: row.begin_date.clone(),
            })?;

        if !window.contains(date) {
            outcome.outside_window += 1;
            continue;
        }
        if is_zero_harm(&row) {
            outcome.zero_harm += 1;
            continue;
        }

        outcome.records.push(project(row, date)?);
    }

    debug!(
        "Filter: {} outside window, {} zero-harm",
        outcome.outside_window, outcome.zero_harm
    );
    info!(
        "Kept {} of {} records between {} and {}",
        outcome.records.len(),
        total,
        window.start,
        window
            .end
            .map_or_else(|| "present".to_string(), |d| d.to_string())
    );
    Ok(outcome)
}

/// `true` when the row records no fatalities, injuries, property or crop
/// damage. Remarks and category play no part in the decision.
pub fn is_zero_harm(row: &RawRecord) -> bool {
    row.fatalities <= 0.0
        && row.injuries <= 0.0
        && row.property_damage <= 0.0
        && row.crop_damage <= 0.0
}

/// Parse the date part of a begin-date cell.
///
/// Accepts the export's `M/D/YYYY H:MM:SS` form, a bare `M/D/YYYY`, and ISO
/// `YYYY-MM-DD`; any time component is ignored.
pub fn parse_event_date(value: &str) -> Option<NaiveDate> {
    let date_part = value.split_whitespace().next()?;
    NaiveDate::parse_from_str(date_part, "%m/%d/%Y")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%Y-%m-%d"))
        .ok()
}

/// Parse a reference number such as `"605943"` or `"605943.0"`.
pub fn parse_record_id(value: &str) -> Result<u64> {
    let trimmed = value.trim();
    let whole = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    whole
        .parse::<u64>()
        .map_err(|_| StormError::RecordId(value.to_string()))
}

fn project(row: RawRecord, date: NaiveDate) -> Result<Record> {
    Ok(Record {
        date,
        record_id: parse_record_id(&row.reference_number)?,
        state: row.state,
        category: row.event_type,
        location: row.location,
        fatalities: count(row.fatalities),
        injuries: count(row.injuries),
        property_damage_magnitude: row.property_damage.max(0.0),
        property_damage_unit: row.property_damage_exp.trim().to_string(),
        crop_damage_magnitude: row.crop_damage.max(0.0),
        crop_damage_unit: row.crop_damage_exp.trim().to_string(),
        remarks: row.remarks,
        damage: DamageTotals::default(),
    })
}

fn count(value: f64) -> u64 {
    value.max(0.0).round() as u64
}

// ── Tests ─────────────────────────────────────────────────────────────────────
