//! Per-category aggregation and rankings.
//!
//! Groups normalised, damage-reconstructed records by category, sums each
//! harm measure, computes percentage shares and orders the result.

use std::collections::BTreeMap;

use impact_core::formatting::percentage;
use impact_core::models::{AggregateRow, Measure, Record};
use serde::Serialize;

/// Decimal places kept on every percentage share.
pub const SHARE_DECIMALS: u32 = 3;

// ── CategoryTotals ────────────────────────────────────────────────────────────

/// Running sums for one category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTotals {
    pub event_count: u64,
    pub fatalities: u64,
    pub injuries: u64,
    pub damage: f64,
    pub property_damage: f64,
    pub crop_damage: f64,
}

impl CategoryTotals {
    /// Add a single record's measures to the running totals.
    ///
    /// Counts saturate at `u64::MAX`. Damage amounts with no mapped unit are
    /// skipped rather than treated as an invalid sum.
    pub fn add_record(&mut self, record: &Record) {
        self.event_count = self.event_count.saturating_add(1);
        self.fatalities = self.fatalities.saturating_add(record.fatalities);
        self.injuries = self.injuries.saturating_add(record.injuries);
        if let Some(total) = record.damage.total() {
            self.damage += total;
        }
        if let Some(property) = record.damage.property {
            self.property_damage += property;
        }
        if let Some(crop) = record.damage.crop {
            self.crop_damage += crop;
        }
    }

    /// Combine two partial totals.
    pub fn merge(&mut self, other: &CategoryTotals) {
        self.event_count = self.event_count.saturating_add(other.event_count);
        self.fatalities = self.fatalities.saturating_add(other.fatalities);
        self.injuries = self.injuries.saturating_add(other.injuries);
        self.damage += other.damage;
        self.property_damage += other.property_damage;
        self.crop_damage += other.crop_damage;
    }
}

// ── Rankings ──────────────────────────────────────────────────────────────────

/// The three full rankings, one per [`Measure`].
#[derive(Debug, Clone, Serialize)]
pub struct Rankings {
    pub fatalities: Vec<AggregateRow>,
    pub injuries: Vec<AggregateRow>,
    pub damage: Vec<AggregateRow>,
}

impl Rankings {
    pub fn from_rows(rows: &[AggregateRow]) -> Self {
        Self {
            fatalities: CategoryAggregator::rank(rows, Measure::Fatalities),
            injuries: CategoryAggregator::rank(rows, Measure::Injuries),
            damage: CategoryAggregator::rank(rows, Measure::Damage),
        }
    }

    /// The full ranking for `measure`.
    pub fn get(&self, measure: Measure) -> &[AggregateRow] {
        match measure {
            Measure::Fatalities => &self.fatalities,
            Measure::Injuries => &self.injuries,
            Measure::Damage => &self.damage,
        }
    }

    /// The first `n` rows of the ranking for `measure`.
    pub fn top(&self, measure: Measure, n: usize) -> &[AggregateRow] {
        CategoryAggregator::top_n(self.get(measure), n)
    }
}

// ── CategoryAggregator ────────────────────────────────────────────────────────

/// Stateless helper that groups records by category.
pub struct CategoryAggregator;

impl CategoryAggregator {
    /// Aggregate `records` into one row per category.
    ///
    /// Returns rows sorted by category name (ascending). The input is not
    /// modified and its order does not affect the result.
    pub fn aggregate(records: &[Record]) -> Vec<AggregateRow> {
        let groups = Self::group(records);
        let grand = groups
            .values()
            .fold(CategoryTotals::default(), |mut acc, totals| {
                acc.merge(totals);
                acc
            });

        groups
            .into_iter()
            .map(|(category, totals)| AggregateRow {
                fatalities_share: percentage(
                    totals.fatalities as f64,
                    grand.fatalities as f64,
                    SHARE_DECIMALS,
                ),
                injuries_share: percentage(
                    totals.injuries as f64,
                    grand.injuries as f64,
                    SHARE_DECIMALS,
                ),
                damage_share: percentage(totals.damage, grand.damage, SHARE_DECIMALS),
                category,
                event_count: totals.event_count,
                total_fatalities: totals.fatalities,
                total_injuries: totals.injuries,
                total_damage: totals.damage,
                total_property_damage: totals.property_damage,
                total_crop_damage: totals.crop_damage,
            })
            .collect()
    }

    /// Order `rows` by `measure` descending, breaking ties by category name
    /// ascending.
    pub fn rank(rows: &[AggregateRow], measure: Measure) -> Vec<AggregateRow> {
        let mut ranked = rows.to_vec();
        ranked.sort_by(|a, b| {
            measure
                .total(b)
                .total_cmp(&measure.total(a))
                .then_with(|| a.category.cmp(&b.category))
        });
        ranked
    }

    /// The first `n` rows of an already ranked slice.
    pub fn top_n(ranked: &[AggregateRow], n: usize) -> &[AggregateRow] {
        &ranked[..n.min(ranked.len())]
    }

    /// Sum every row back into grand totals.
    pub fn calculate_totals(rows: &[AggregateRow]) -> CategoryTotals {
        let mut totals = CategoryTotals::default();
        for row in rows {
            totals.event_count = totals.event_count.saturating_add(row.event_count);
            totals.fatalities = totals.fatalities.saturating_add(row.total_fatalities);
            totals.injuries = totals.injuries.saturating_add(row.total_injuries);
            totals.damage += row.total_damage;
            totals.property_damage += row.total_property_damage;
            totals.crop_damage += row.total_crop_damage;
        }
        totals
    }

    // ── Private ───────────────────────────────────────────────────────────────

    fn group(records: &[Record]) -> BTreeMap<String, CategoryTotals> {
        // BTreeMap keeps keys sorted, so output order is input-independent.
        let mut map: BTreeMap<String, CategoryTotals> = BTreeMap::new();
        for record in records {
            map.entry(record.category.clone())
                .or_default()
                .add_record(record);
        }
        map
    }
}

/// `true` when two share sums agree within the rounding error `rows` shares
/// rounded to [`SHARE_DECIMALS`] places can accumulate.
#[cfg(test)]
pub(crate) fn shares_close(a: f64, b: f64, rows: usize) -> bool {
    let tolerance = 0.5 * 10_f64.powi(-(SHARE_DECIMALS as i32)) * rows.max(1) as f64;
    (a - b).abs() <= tolerance
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use impact_core::damage::{apply_patch, reconstruct_damage, NAPA_FLOOD_2006};
    use impact_core::models::DamageTotals;

    fn make_record(
        id: u64,
        category: &str,
        fatalities: u64,
        injuries: u64,
        damage: DamageTotals,
    ) -> Record {
        Record {
            date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            state: "TX".to_string(),
            category: category.to_string(),
            location: String::new(),
            fatalities,
            injuries,
            property_damage_magnitude: 0.0,
            property_damage_unit: String::new(),
            crop_damage_magnitude: 0.0,
            crop_damage_unit: String::new(),
            remarks: String::new(),
            record_id: id,
            damage,
        }
    }

    fn dmg(property: Option<f64>, crop: Option<f64>) -> DamageTotals {
        DamageTotals { property, crop }
    }

    fn sample() -> Vec<Record> {
        vec![
            make_record(1, "TORNADO", 5, 40, dmg(Some(2.0e6), None)),
            make_record(2, "TORNADO", 1, 10, dmg(Some(1.0e6), Some(5.0e5))),
            make_record(3, "HEAT", 12, 30, dmg(None, None)),
            make_record(4, "FLOOD", 2, 0, dmg(Some(4.0e6), Some(1.0e6))),
            make_record(5, "THUNDERSTORM", 0, 20, dmg(Some(3.0e3), None)),
            make_record(6, "LIGHTNING", 3, 0, dmg(None, Some(7.0e3))),
        ]
    }

    fn find<'a>(rows: &'a [AggregateRow], category: &str) -> &'a AggregateRow {
        rows.iter().find(|r| r.category == category).unwrap()
    }

    // ── aggregate ─────────────────────────────────────────────────────────────

    #[test]
    fn test_aggregate_groups_by_category() {
        let rows = CategoryAggregator::aggregate(&sample());
        let cats: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(cats, vec!["FLOOD", "HEAT", "LIGHTNING", "THUNDERSTORM", "TORNADO"]);

        let tornado = find(&rows, "TORNADO");
        assert_eq!(tornado.event_count, 2);
        assert_eq!(tornado.total_fatalities, 6);
        assert_eq!(tornado.total_injuries, 50);
        assert!((tornado.total_damage - 3.5e6).abs() < 1e-6);
        assert!((tornado.total_property_damage - 3.0e6).abs() < 1e-6);
        assert!((tornado.total_crop_damage - 5.0e5).abs() < 1e-6);
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(CategoryAggregator::aggregate(&[]).is_empty());
    }

    #[test]
    fn test_missing_damage_is_excluded_not_poisoning() {
        let rows = CategoryAggregator::aggregate(&sample());
        let heat = find(&rows, "HEAT");
        assert_eq!(heat.total_damage, 0.0);
        assert_eq!(heat.damage_share, 0.0);
        // Other categories still carry finite totals.
        assert!(rows.iter().all(|r| r.total_damage.is_finite()));
    }

    #[test]
    fn test_partition_every_record_counted_once() {
        let records = sample();
        let rows = CategoryAggregator::aggregate(&records);
        let counted: u64 = rows.iter().map(|r| r.event_count).sum();
        assert_eq!(counted, records.len() as u64);
    }

    #[test]
    fn test_sum_invariant_per_measure() {
        let records = sample();
        let rows = CategoryAggregator::aggregate(&records);
        let totals = CategoryAggregator::calculate_totals(&rows);

        let fatalities: u64 = records.iter().map(|r| r.fatalities).sum();
        let injuries: u64 = records.iter().map(|r| r.injuries).sum();
        let damage: f64 = records.iter().filter_map(|r| r.damage.total()).sum();

        assert_eq!(totals.fatalities, fatalities);
        assert_eq!(totals.injuries, injuries);
        assert!((totals.damage - damage).abs() < 1e-6);
    }

    #[test]
    fn test_shares_sum_to_hundred() {
        let rows = CategoryAggregator::aggregate(&sample());
        for measure in Measure::ALL {
            let sum: f64 = rows.iter().map(|r| measure.share(r)).sum();
            assert!(
                shares_close(sum, 100.0, rows.len()),
                "{measure:?} shares sum to {sum}"
            );
        }
    }

    #[test]
    fn test_share_values_rounded_to_three_places() {
        let rows = CategoryAggregator::aggregate(&sample());
        // HEAT: 12 of 23 fatalities = 52.1739...%
        assert_eq!(find(&rows, "HEAT").fatalities_share, 52.174);
        // TORNADO: 50 of 100 injuries.
        assert_eq!(find(&rows, "TORNADO").injuries_share, 50.0);
    }

    #[test]
    fn test_share_tie_rounds_half_to_even() {
        // 1 of 1600 fatalities is exactly 0.0625%.
        let mut records = vec![make_record(1, "A", 1, 0, dmg(None, None))];
        records.push(make_record(2, "B", 1599, 0, dmg(None, None)));
        let rows = CategoryAggregator::aggregate(&records);
        assert_eq!(find(&rows, "A").fatalities_share, 0.062);
    }

    #[test]
    fn test_zero_grand_total_yields_zero_shares() {
        let records = vec![make_record(1, "A", 0, 0, dmg(None, None))];
        let rows = CategoryAggregator::aggregate(&records);
        assert_eq!(rows[0].fatalities_share, 0.0);
        assert_eq!(rows[0].damage_share, 0.0);
    }

    #[test]
    fn test_aggregate_order_independent() {
        let records = sample();
        let mut reversed = records.clone();
        reversed.reverse();
        let mut rotated = records.clone();
        rotated.rotate_left(2);

        let a = CategoryAggregator::aggregate(&records);
        assert_eq!(a, CategoryAggregator::aggregate(&reversed));
        assert_eq!(a, CategoryAggregator::aggregate(&rotated));
    }

    #[test]
    fn test_aggregate_does_not_mutate_input() {
        let records = sample();
        let before = records.clone();
        let _ = CategoryAggregator::aggregate(&records);
        assert_eq!(records, before);
    }

    // ── rank / top_n ──────────────────────────────────────────────────────────

    #[test]
    fn test_rank_by_each_measure() {
        let rows = CategoryAggregator::aggregate(&sample());
        let rankings = Rankings::from_rows(&rows);

        let order = |m: Measure| -> Vec<String> {
            rankings.get(m).iter().map(|r| r.category.clone()).collect()
        };
        assert_eq!(
            order(Measure::Fatalities),
            vec!["HEAT", "TORNADO", "LIGHTNING", "FLOOD", "THUNDERSTORM"]
        );
        assert_eq!(
            order(Measure::Injuries),
            vec!["TORNADO", "HEAT", "THUNDERSTORM", "FLOOD", "LIGHTNING"]
        );
        assert_eq!(
            order(Measure::Damage),
            vec!["FLOOD", "TORNADO", "LIGHTNING", "THUNDERSTORM", "HEAT"]
        );
    }

    #[test]
    fn test_rank_ties_break_by_category_ascending() {
        let records = vec![
            make_record(1, "ZETA", 4, 0, dmg(None, None)),
            make_record(2, "ALPHA", 4, 0, dmg(None, None)),
            make_record(3, "MIDDLE", 4, 0, dmg(None, None)),
            make_record(4, "TOP", 9, 0, dmg(None, None)),
        ];
        let rows = CategoryAggregator::aggregate(&records);
        let ranked = CategoryAggregator::rank(&rows, Measure::Fatalities);
        let cats: Vec<&str> = ranked.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(cats, vec!["TOP", "ALPHA", "MIDDLE", "ZETA"]);
    }

    #[test]
    fn test_top_n_is_prefix() {
        let rows = CategoryAggregator::aggregate(&sample());
        let rankings = Rankings::from_rows(&rows);
        let top = rankings.top(Measure::Injuries, 2);
        assert_eq!(top, &rankings.injuries[..2]);
        assert_eq!(rankings.top(Measure::Injuries, 100).len(), rows.len());
        assert!(rankings.top(Measure::Injuries, 0).is_empty());
    }

    // ── outlier patch through aggregation ─────────────────────────────────────

    #[test]
    fn test_napa_patch_lowers_flood_damage_total() {
        let mut napa = make_record(605943, "FLOOD", 0, 0, DamageTotals::default());
        napa.property_damage_magnitude = 115.0;
        napa.property_damage_unit = "B".to_string();
        let mut other = make_record(7, "FLOOD", 0, 0, DamageTotals::default());
        other.property_damage_magnitude = 10.0;
        other.property_damage_unit = "M".to_string();
        let mut records = vec![napa, other];

        reconstruct_damage(&mut records);
        let before = find(&CategoryAggregator::aggregate(&records), "FLOOD").total_damage;

        apply_patch(&mut records, &NAPA_FLOOD_2006);
        reconstruct_damage(&mut records);
        let after = find(&CategoryAggregator::aggregate(&records), "FLOOD").total_damage;

        assert!((before - after - (1.15e11 - 1.15e8)).abs() < 1.0);
        assert!((after - 1.25e8).abs() < 1e-3);
    }

    // ── overflow ──────────────────────────────────────────────────────────────

    #[test]
    fn test_huge_counts_saturate_instead_of_overflowing() {
        let records = vec![
            make_record(1, "A", u64::MAX, u64::MAX, DamageTotals::default()),
            make_record(2, "A", 1, 1, DamageTotals::default()),
            make_record(3, "B", 1, 0, DamageTotals::default()),
        ];
        let rows = CategoryAggregator::aggregate(&records);

        let a = find(&rows, "A");
        assert_eq!(a.total_fatalities, u64::MAX);
        assert_eq!(a.total_injuries, u64::MAX);
        assert_eq!(a.event_count, 2);

        let totals = CategoryAggregator::calculate_totals(&rows);
        assert_eq!(totals.fatalities, u64::MAX);
        assert_eq!(totals.event_count, 3);
    }
}
