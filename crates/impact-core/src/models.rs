use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// One row of the storm events export, as read from CSV.
///
/// Only the columns the pipeline needs are mapped; every other column in the
/// export is ignored by the CSV deserialiser. Date and record id stay as raw
/// strings here and are validated by the filter stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Event begin date, e.g. `"4/18/1950 0:00:00"`.
    #[serde(rename = "BGN_DATE")]
    pub begin_date: String,
    /// Two-letter state code.
    #[serde(rename = "STATE", default)]
    pub state: String,
    /// Free-text event type label.
    #[serde(rename = "EVTYPE")]
    pub event_type: String,
    /// Free-text begin location.
    #[serde(rename = "BGN_LOCATI", default)]
    pub location: String,
    #[serde(rename = "FATALITIES", deserialize_with = "zero_if_blank")]
    pub fatalities: f64,
    #[serde(rename = "INJURIES", deserialize_with = "zero_if_blank")]
    pub injuries: f64,
    #[serde(rename = "PROPDMG", deserialize_with = "zero_if_blank")]
    pub property_damage: f64,
    /// Unit suffix for `PROPDMG` (`K`, `M`, `B`, or anything else).
    #[serde(rename = "PROPDMGEXP", default)]
    pub property_damage_exp: String,
    #[serde(rename = "CROPDMG", deserialize_with = "zero_if_blank")]
    pub crop_damage: f64,
    /// Unit suffix for `CROPDMG`.
    #[serde(rename = "CROPDMGEXP", default)]
    pub crop_damage_exp: String,
    #[serde(rename = "REMARKS", default)]
    pub remarks: String,
    /// Unique reference number, e.g. `"605943"` or `"605943.0"`.
    #[serde(rename = "REFNUM")]
    pub reference_number: String,
}

/// Deserialise a numeric CSV cell, treating an empty cell as zero.
///
/// Non-finite values (`inf`, `NaN`, or literals past `f64::MAX`) are
/// rejected so the row fails as a CSV error naming its position.
fn zero_if_blank<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    let value = trimmed.parse::<f64>().map_err(serde::de::Error::custom)?;
    if !value.is_finite() {
        return Err(serde::de::Error::custom(format!(
            "numeric cell {trimmed:?} is not a finite number"
        )));
    }
    Ok(value)
}

/// Property and crop damage in US dollars, reconstructed from magnitude and
/// unit code.
///
/// A `None` sub-amount means the unit code was not one of `K`/`M`/`B`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageTotals {
    pub property: Option<f64>,
    pub crop: Option<f64>,
}

impl DamageTotals {
    /// Combined damage.
    ///
    /// `None` only when both sub-amounts are unmapped; otherwise a missing
    /// side contributes zero.
    pub fn total(&self) -> Option<f64> {
        match (self.property, self.crop) {
            (None, None) => None,
            (p, c) => Some(p.unwrap_or(0.0) + c.unwrap_or(0.0)),
        }
    }
}

/// A single storm event that survived the filter stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    pub state: String,
    /// Event category. Rewritten in place by the normaliser.
    pub category: String,
    pub location: String,
    pub fatalities: u64,
    pub injuries: u64,
    pub property_damage_magnitude: f64,
    /// Raw unit code, possibly empty.
    pub property_damage_unit: String,
    pub crop_damage_magnitude: f64,
    pub crop_damage_unit: String,
    pub remarks: String,
    /// Stable identifier. Never reassigned; used as the join key for patches.
    pub record_id: u64,
    /// Derived damage amounts; all `None` until reconstruction runs.
    pub damage: DamageTotals,
}

/// Closed date interval a record must fall in; `end` of `None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// `true` when `date` lies within the window, both ends inclusive.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && self.end.map_or(true, |end| date <= end)
    }
}

/// Per-category totals and percentage shares produced by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub category: String,
    /// Number of records grouped under this category.
    pub event_count: u64,
    pub total_fatalities: u64,
    pub total_injuries: u64,
    /// Sum of combined damage, ignoring records with no mapped unit.
    pub total_damage: f64,
    pub total_property_damage: f64,
    pub total_crop_damage: f64,
    /// Share of all fatalities, in percent, rounded to 3 decimals.
    pub fatalities_share: f64,
    pub injuries_share: f64,
    pub damage_share: f64,
}

/// The harm measure a ranking is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    Fatalities,
    Injuries,
    Damage,
}

impl Measure {
    /// All measures in report order.
    pub const ALL: [Measure; 3] = [Measure::Fatalities, Measure::Injuries, Measure::Damage];

    /// The row's total for this measure.
    pub fn total(self, row: &AggregateRow) -> f64 {
        match self {
            Measure::Fatalities => row.total_fatalities as f64,
            Measure::Injuries => row.total_injuries as f64,
            Measure::Damage => row.total_damage,
        }
    }

    /// The row's percentage share for this measure.
    pub fn share(self, row: &AggregateRow) -> f64 {
        match self {
            Measure::Fatalities => row.fatalities_share,
            Measure::Injuries => row.injuries_share,
            Measure::Damage => row.damage_share,
        }
    }

    /// Human-readable column label.
    pub fn label(self) -> &'static str {
        match self {
            Measure::Fatalities => "Fatalities",
            Measure::Injuries => "Injuries",
            Measure::Damage => "Damage (USD)",
        }
    }
}
