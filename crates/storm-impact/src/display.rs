//! Plain-text and JSON rendering of the category rankings.
//!
//! Each ranking becomes a fixed-width table with one row per category plus
//! a totals row covering every category, not just the rows shown.

use impact_core::formatting::{format_dollars_compact, format_number};
use impact_core::models::{AggregateRow, Measure};
use impact_core::Result;
use impact_data::aggregator::{CategoryAggregator, CategoryTotals};
use impact_data::analysis::{AnalysisMetadata, AnalysisResult};
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

const RANK_WIDTH: usize = 4;
const TOTAL_WIDTH: usize = 16;
const SHARE_WIDTH: usize = 9;

/// JSON shape of a report: run metadata plus the three truncated rankings.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub metadata: &'a AnalysisMetadata,
    pub fatalities: &'a [AggregateRow],
    pub injuries: &'a [AggregateRow],
    pub damage: &'a [AggregateRow],
}

impl<'a> JsonReport<'a> {
    pub fn new(result: &'a AnalysisResult, top: usize) -> Self {
        Self {
            metadata: &result.metadata,
            fatalities: result.rankings.top(Measure::Fatalities, top),
            injuries: result.rankings.top(Measure::Injuries, top),
            damage: result.rankings.top(Measure::Damage, top),
        }
    }
}

/// Render the report as pretty-printed JSON.
pub fn render_json(result: &AnalysisResult, top: usize) -> Result<String> {
    Ok(serde_json::to_string_pretty(&JsonReport::new(result, top))?)
}

/// Render the summary line followed by one table per [`Measure`].
pub fn render_report(result: &AnalysisResult, top: usize) -> String {
    let totals = CategoryAggregator::calculate_totals(&result.rows);
    let mut out = render_summary(&result.metadata);
    for measure in Measure::ALL {
        out.push('\n');
        out.push_str(&render_ranking(
            measure,
            result.rankings.top(measure, top),
            &totals,
        ));
    }
    out
}

/// One-line description of what the run looked at.
pub fn render_summary(meta: &AnalysisMetadata) -> String {
    let end = meta
        .window
        .end
        .map_or_else(|| "present".to_string(), |d| d.to_string());
    let mut line = format!(
        "{} events from {} to {} ({} rows read, {} categories after normalisation from {})",
        format_number(meta.records_analyzed as f64, 0),
        meta.window.start,
        end,
        format_number(meta.rows_loaded as f64, 0),
        meta.categories_after,
        meta.categories_before,
    );
    if meta.patches.is_empty() {
        line.push_str(", outlier patches skipped");
    }
    line.push('\n');
    line
}

/// Render one ranking table.
pub fn render_ranking(measure: Measure, rows: &[AggregateRow], totals: &CategoryTotals) -> String {
    let category_width = rows
        .iter()
        .map(|r| r.category.width())
        .chain(["Category".width(), "TOTAL".width()])
        .max()
        .unwrap_or(0);

    let mut out = format!("Top {} categories by {}\n", rows.len(), measure_title(measure));
    out.push_str(&line(
        "#",
        "Category",
        measure.label(),
        "Share",
        category_width,
    ));
    out.push_str(&"-".repeat(RANK_WIDTH + category_width + TOTAL_WIDTH + SHARE_WIDTH + 6));
    out.push('\n');

    for (i, row) in rows.iter().enumerate() {
        out.push_str(&line(
            &(i + 1).to_string(),
            &row.category,
            &format_total(measure, measure.total(row)),
            &format!("{:.3}%", measure.share(row)),
            category_width,
        ));
    }

    let grand_total = match measure {
        Measure::Fatalities => totals.fatalities as f64,
        Measure::Injuries => totals.injuries as f64,
        Measure::Damage => totals.damage,
    };
    out.push_str(&line(
        "",
        "TOTAL",
        &format_total(measure, grand_total),
        "",
        category_width,
    ));
    out
}

fn measure_title(measure: Measure) -> &'static str {
    match measure {
        Measure::Fatalities => "fatalities",
        Measure::Injuries => "injuries",
        Measure::Damage => "economic damage",
    }
}

fn format_total(measure: Measure, value: f64) -> String {
    match measure {
        Measure::Damage => format_dollars_compact(value),
        Measure::Fatalities | Measure::Injuries => format_number(value, 0),
    }
}

fn line(rank: &str, category: &str, total: &str, share: &str, category_width: usize) -> String {
    format!(
        "{:>rw$}  {}  {:>tw$}  {:>sw$}\n",
        rank,
        pad_right(category, category_width),
        total,
        share,
        rw = RANK_WIDTH,
        tw = TOTAL_WIDTH,
        sw = SHARE_WIDTH,
    )
}

/// Left-align `s` to `width` display columns.
fn pad_right(s: &str, width: usize) -> String {
    let pad = width.saturating_sub(s.width());
    format!("{s}{}", " ".repeat(pad))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
