//! End-to-end analysis pipeline.
//!
//! Orchestrates loading, filtering, category normalisation, outlier patching,
//! damage reconstruction and aggregation, returning an [`AnalysisResult`]
//! ready for presentation.

use std::path::Path;

use chrono::Utc;
use impact_core::damage::{apply_known_patches, reconstruct_damage, PatchReport};
use impact_core::models::{AggregateRow, DateWindow, RawRecord, Record};
use impact_core::normalize::{category_census, normalize_records};
use impact_core::Result;
use serde::Serialize;
use tracing::info;

use crate::aggregator::{CategoryAggregator, Rankings};
use crate::filter::filter_records;
use crate::reader::load_raw_records;

// ── Public types ──────────────────────────────────────────────────────────────

/// Knobs for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub window: DateWindow,
    /// Apply the known outlier patches before computing damage.
    pub apply_patches: bool,
}

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Data file the rows were read from, when loaded from disk.
    pub source: Option<String>,
    pub window: DateWindow,
    /// Rows read before any filtering.
    pub rows_loaded: usize,
    pub rows_outside_window: usize,
    pub rows_zero_harm: usize,
    /// Records that reached aggregation.
    pub records_analyzed: usize,
    /// Distinct raw categories among analysed records.
    pub categories_before: usize,
    /// Distinct categories after normalisation.
    pub categories_after: usize,
    /// Records whose property and crop units were both unmapped.
    pub records_without_damage: usize,
    /// One entry per known patch; empty when patches were skipped.
    pub patches: Vec<PatchReport>,
    /// Wall-clock seconds spent reading the CSV.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent in filter, normalise, reconstruct and aggregate.
    pub transform_time_seconds: f64,
}

/// The complete output of [`analyze_storm_data`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Filtered, normalised and reconstructed records.
    pub records: Vec<Record>,
    /// One row per category, sorted by category name.
    pub rows: Vec<AggregateRow>,
    pub rankings: Rankings,
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the full pipeline on the export at `path`.
pub fn analyze_storm_data(path: &Path, options: &PipelineOptions) -> Result<AnalysisResult> {
    let load_start = std::time::Instant::now();
    let raw = load_raw_records(path)?;
    let load_time = load_start.elapsed().as_secs_f64();

    let mut result = analyze_raw_records(raw, options)?;
    result.metadata.source = Some(path.display().to_string());
    result.metadata.load_time_seconds = load_time;
    Ok(result)
}

/// Run every stage after loading.
///
/// 1. Filter by date window and drop zero-harm rows.
/// 2. Normalise categories.
/// 3. Apply known outlier patches (unless disabled).
/// 4. Reconstruct damage amounts.
/// 5. Aggregate and rank.
pub fn analyze_raw_records(
    raw: Vec<RawRecord>,
    options: &PipelineOptions,
) -> Result<AnalysisResult> {
    let transform_start = std::time::Instant::now();
    let rows_loaded = raw.len();

    // ── Step 1: Filter ────────────────────────────────────────────────────────
    let outcome = filter_records(raw, &options.window)?;
    let mut records = outcome.records;

    // ── Step 2: Normalise ─────────────────────────────────────────────────────
    let categories_before = category_census(&records);
    normalize_records(&mut records);
    let categories_after = category_census(&records);
    info!(
        "Normalised {} categories into {}",
        categories_before, categories_after
    );

    // ── Step 3: Patch ─────────────────────────────────────────────────────────
    let patches = if options.apply_patches {
        apply_known_patches(&mut records)
    } else {
        info!("Outlier patches skipped");
        Vec::new()
    };

    // ── Step 4: Reconstruct ───────────────────────────────────────────────────
    reconstruct_damage(&mut records);
    let records_without_damage = records
        .iter()
        .filter(|r| r.damage.total().is_none())
        .count();

    // ── Step 5: Aggregate ─────────────────────────────────────────────────────
    let rows = CategoryAggregator::aggregate(&records);
    let rankings = Rankings::from_rows(&rows);
    let transform_time = transform_start.elapsed().as_secs_f64();

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        source: None,
        window: options.window,
        rows_loaded,
        rows_outside_window: outcome.outside_window,
        rows_zero_harm: outcome.zero_harm,
        records_analyzed: records.len(),
        categories_before,
        categories_after,
        records_without_damage,
        patches,
        load_time_seconds: 0.0,
        transform_time_seconds: transform_time,
    };

    Ok(AnalysisResult {
        records,
        rows,
        rankings,
        metadata,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
