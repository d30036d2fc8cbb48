//! Event category normalisation.
//!
//! Collapses the free-text `EVTYPE` vocabulary (hundreds of spellings,
//! abbreviations and compound labels) into a small set of canonical keys
//! used for grouping. Wind variants are intentionally left ungrouped.

use std::collections::BTreeSet;

use tracing::debug;

use crate::models::Record;

/// Canonical key for every thunderstorm label (`TSTM WIND`, `THUNDERSTORM WINDS/HAIL`, ...).
pub const THUNDERSTORM: &str = "THUNDERSTORM";

/// Key substituted for a label that is empty after trimming.
pub const UNKNOWN: &str = "UNKNOWN";

/// A keyword rule: any label containing `needle` becomes `replacement`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordRule {
    pub needle: &'static str,
    pub replacement: &'static str,
}

const fn rule(needle: &'static str, replacement: &'static str) -> KeywordRule {
    KeywordRule {
        needle,
        replacement,
    }
}

/// Keyword rules in evaluation order. When several match, the last one wins.
pub const KEYWORD_RULES: &[KeywordRule] = &[
    rule("FLD", "FLOOD"),
    rule("FLOOD", "FLOOD"),
    rule("COLD", "COLD"),
    rule("DRY", "DRY"),
    rule("HEAT", "HEAT"),
    rule("SNOW", "SNOW"),
    rule("RAIN", "RAIN"),
    rule("RIP CURRENT", "RIP CURRENT"),
    rule("HURRICANE", "HURRICANE"),
];

/// Map a raw event label to its canonical category key.
///
/// 1. Uppercase, then strip leading whitespace.
/// 2. Anything mentioning `TSTM` or `THUNDERSTORM` becomes [`THUNDERSTORM`].
/// 3. Every [`KEYWORD_RULES`] entry is tested against the result of step 2;
///    the last matching rule decides the key.
/// 4. Labels matching nothing keep their step-1 form.
///
/// The mapping is idempotent.
///
/// # Examples
///
/// ```
/// use impact_core::normalize::normalize_category;
///
/// assert_eq!(normalize_category("Tstm Wind"), "THUNDERSTORM");
/// assert_eq!(normalize_category("  urban/sml stream fld"), "FLOOD");
/// assert_eq!(normalize_category("HIGH WIND"), "HIGH WIND");
/// ```
pub fn normalize_category(raw: &str) -> String {
    let upper = raw.to_uppercase();
    let cleaned = upper.trim_start();
    if cleaned.is_empty() {
        return UNKNOWN.to_string();
    }

    let base = if cleaned.contains("TSTM") || cleaned.contains(THUNDERSTORM) {
        THUNDERSTORM
    } else {
        cleaned
    };

    KEYWORD_RULES
        .iter()
        .rev()
        .find(|r| base.contains(r.needle))
        .map_or(base, |r| r.replacement)
        .to_string()
}

/// Rewrite the category of every record in place.
pub fn normalize_records(records: &mut [Record]) {
    for record in records.iter_mut() {
        record.category = normalize_category(&record.category);
    }
    debug!("Normalised categories for {} records", records.len());
}

/// Number of distinct category labels across `records`.
pub fn category_census(records: &[Record]) -> usize {
    records
        .iter()
        .map(|r| r.category.as_str())
        .collect::<BTreeSet<_>>()
        .len()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
