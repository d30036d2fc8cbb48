//! Damage reconstruction: unit codes, dollar amounts, and the outlier patch.
//!
//! The export stores each damage amount as a magnitude plus a one-letter
//! order-of-magnitude suffix. This module turns the pair into dollars and
//! carries the audited corrections for known data-entry errors, which must
//! be applied before any totals are computed.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::models::{DamageTotals, Record};

// ── DamageUnit ────────────────────────────────────────────────────────────────

/// Closed set of recognised damage unit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DamageUnit {
    /// `K`, thousands of dollars.
    Thousand,
    /// `M`, millions of dollars.
    Million,
    /// `B`, billions of dollars.
    Billion,
}

impl DamageUnit {
    /// Resolve a raw unit code.
    ///
    /// Only `K`, `M` and `B` map (surrounding whitespace is ignored). Every
    /// other code, including empty, lowercase letters, digits and symbols
    /// such as `+` or `?`, is unmapped.
    ///
    /// # Examples
    ///
    /// ```
    /// use impact_core::damage::DamageUnit;
    ///
    /// assert_eq!(DamageUnit::from_code("B"), Some(DamageUnit::Billion));
    /// assert_eq!(DamageUnit::from_code(" K "), Some(DamageUnit::Thousand));
    /// assert_eq!(DamageUnit::from_code(""), None);
    /// assert_eq!(DamageUnit::from_code("h"), None);
    /// ```
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "K" => Some(DamageUnit::Thousand),
            "M" => Some(DamageUnit::Million),
            "B" => Some(DamageUnit::Billion),
            _ => None,
        }
    }

    /// The single-letter code for this unit.
    pub fn code(&self) -> &'static str {
        match self {
            DamageUnit::Thousand => "K",
            DamageUnit::Million => "M",
            DamageUnit::Billion => "B",
        }
    }

    /// Dollar multiplier applied to a magnitude carrying this unit.
    pub fn multiplier(&self) -> f64 {
        match self {
            DamageUnit::Thousand => 1e3,
            DamageUnit::Million => 1e6,
            DamageUnit::Billion => 1e9,
        }
    }
}

/// Dollar amount for `magnitude` with unit `code`, or `None` when the code is
/// unmapped.
pub fn damage_amount(magnitude: f64, code: &str) -> Option<f64> {
    DamageUnit::from_code(code).map(|unit| magnitude * unit.multiplier())
}

/// Compute property and crop damage for a single record.
pub fn damage_totals(record: &Record) -> DamageTotals {
    DamageTotals {
        property: damage_amount(
            record.property_damage_magnitude,
            &record.property_damage_unit,
        ),
        crop: damage_amount(record.crop_damage_magnitude, &record.crop_damage_unit),
    }
}

/// Fill in the derived damage amounts for every record.
///
/// Recomputes from the current unit codes, so running it again after a patch
/// reflects the corrected code.
pub fn reconstruct_damage(records: &mut [Record]) {
    let mut unmapped = 0usize;
    for record in records.iter_mut() {
        record.damage = damage_totals(record);
        if record.damage.total().is_none() {
            unmapped += 1;
        }
    }
    debug!(
        "Reconstructed damage for {} records ({} with no mapped unit)",
        records.len(),
        unmapped
    );
}

// ── Outlier patches ───────────────────────────────────────────────────────────

/// Which damage sub-field a patch rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageField {
    Property,
    Crop,
}

/// A named, identifier-keyed correction of a single record's unit code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierPatch {
    pub name: &'static str,
    pub record_id: u64,
    pub field: DamageField,
    pub from: DamageUnit,
    pub to: DamageUnit,
    /// Evidence for the correction.
    pub reason: &'static str,
}

/// January 2006 Napa River flood, California.
///
/// Coded as 115 `B` (about $115 billion) while the remarks put the damage in
/// the tens of millions of dollars; the unit is a keying error for `M`.
pub const NAPA_FLOOD_2006: OutlierPatch = OutlierPatch {
    name: "napa-flood-2006",
    record_id: 605943,
    field: DamageField::Property,
    from: DamageUnit::Billion,
    to: DamageUnit::Million,
    reason: "remarks describe tens of millions of dollars in damage; \
             the coded B unit implies roughly $115 billion",
};

/// Every correction applied by a normal pipeline run, in order.
pub const KNOWN_PATCHES: &[OutlierPatch] = &[NAPA_FLOOD_2006];

/// Result of applying one [`OutlierPatch`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PatchOutcome {
    /// The unit code was rewritten.
    Applied,
    /// The record already carries the corrected code.
    AlreadyApplied,
    /// The record exists but its code is neither the expected nor the
    /// corrected one; it was left untouched.
    Mismatch { found: String },
    /// No record with the patch's id is present.
    NotFound,
}

/// Apply `patch` to the record with matching `record_id`.
///
/// The record is located strictly by id, never by magnitude. Re-applying a
/// patch is a no-op that reports [`PatchOutcome::AlreadyApplied`].
pub fn apply_patch(records: &mut [Record], patch: &OutlierPatch) -> PatchOutcome {
    let Some(record) = records.iter_mut().find(|r| r.record_id == patch.record_id) else {
        debug!(
            "Patch {}: record {} not present",
            patch.name, patch.record_id
        );
        return PatchOutcome::NotFound;
    };

    let unit = match patch.field {
        DamageField::Property => &mut record.property_damage_unit,
        DamageField::Crop => &mut record.crop_damage_unit,
    };

    match DamageUnit::from_code(unit) {
        Some(u) if u == patch.from => {
            info!(
                "Patch {}: record {} unit {} -> {}",
                patch.name,
                patch.record_id,
                patch.from.code(),
                patch.to.code()
            );
            *unit = patch.to.code().to_string();
            PatchOutcome::Applied
        }
        Some(u) if u == patch.to => PatchOutcome::AlreadyApplied,
        _ => {
            warn!(
                "Patch {}: record {} has unit {:?}, expected {}; left unchanged",
                patch.name,
                patch.record_id,
                unit,
                patch.from.code()
            );
            PatchOutcome::Mismatch {
                found: unit.clone(),
            }
        }
    }
}

/// Audit entry for one patch applied during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatchReport {
    pub name: &'static str,
    pub record_id: u64,
    pub outcome: PatchOutcome,
}

/// Apply every entry of [`KNOWN_PATCHES`] and report the outcomes in order.
pub fn apply_known_patches(records: &mut [Record]) -> Vec<PatchReport> {
    KNOWN_PATCHES
        .iter()
        .map(|patch| PatchReport {
            name: patch.name,
            record_id: patch.record_id,
            outcome: apply_patch(records, patch),
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
