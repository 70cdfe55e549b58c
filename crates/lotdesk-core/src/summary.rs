//! Dashboard counters and KPI figures over the raw listing collection.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

use crate::model::Listing;

/// Headline counts shown above the listing table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ListingSummary {
    pub total: usize,
    pub scored: usize,
    pub pending: usize,
    pub decided: usize,
    pub undecided: usize,
}

impl ListingSummary {
    #[must_use]
    pub fn from_listings(listings: &[Listing]) -> Self {
        listings.iter().fold(Self::default(), |mut acc, listing| {
            acc.total += 1;
            if listing.is_scored() {
                acc.scored += 1;
            } else {
                acc.pending += 1;
            }
            if listing.is_decided() {
                acc.decided += 1;
            } else {
                acc.undecided += 1;
            }
            acc
        })
    }
}

/// Listings older than this many days count as aged inventory.
pub const AGED_AFTER_DAYS: i64 = 30;
/// Score at or above which a listing counts as converted.
pub const CONVERSION_SCORE: f64 = 70.0;
/// Margin applied to the average price for the profit estimate.
pub const PROFIT_MARGIN: f64 = 0.15;

const SECONDS_PER_DAY: i64 = 86_400;

/// KPI panel figures. Rates are percentages in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct KpiMetrics {
    pub total_listings: usize,
    pub total_value: f64,
    pub average_price: f64,
    pub active_buyers: usize,
    pub scoring_rate: f64,
    pub average_score: f64,
    pub aged_inventory: usize,
    pub conversion_rate: f64,
    pub average_profit_per_unit: f64,
    pub lead_to_purchase_days: f64,
}

impl KpiMetrics {
    /// Compute the panel as of `now`; an empty collection is all zeros.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_listings(listings: &[Listing], now: DateTime<Utc>) -> Self {
        if listings.is_empty() {
            return Self::default();
        }
        let n = listings.len() as f64;

        let total_value: f64 = listings.iter().map(|l| l.price.unwrap_or(0.0)).sum();
        let average_price = total_value / n;

        // A missing buyer id is one distinct value of its own.
        let active_buyers = listings
            .iter()
            .map(|l| l.buyer_id.as_deref())
            .collect::<HashSet<_>>()
            .len();

        let scores: Vec<f64> = listings.iter().filter_map(|l| l.score).collect();
        let average_score = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };

        let converted = listings
            .iter()
            .filter(|l| l.score.unwrap_or(0.0) >= CONVERSION_SCORE)
            .count();

        let created: Vec<DateTime<Utc>> = listings
            .iter()
            .filter_map(|l| l.created_at.as_deref().and_then(parse_created_at))
            .collect();
        let aged_cutoff = now - chrono::Duration::days(AGED_AFTER_DAYS);
        let aged_inventory = created.iter().filter(|at| **at < aged_cutoff).count();
        let total_days: i64 = created
            .iter()
            .map(|at| ceil_days((now - *at).num_seconds()))
            .sum();

        Self {
            total_listings: listings.len(),
            total_value,
            average_price,
            active_buyers,
            scoring_rate: scores.len() as f64 / n * 100.0,
            average_score,
            aged_inventory,
            conversion_rate: converted as f64 / n * 100.0,
            average_profit_per_unit: average_price * PROFIT_MARGIN,
            lead_to_purchase_days: total_days as f64 / n,
        }
    }
}

fn ceil_days(seconds: i64) -> i64 {
    seconds.div_euclid(SECONDS_PER_DAY) + i64::from(seconds.rem_euclid(SECONDS_PER_DAY) != 0)
}

/// Parse a backend `created_at`: RFC 3339, a naive timestamp taken as UTC,
/// or a bare date at midnight UTC.
#[must_use]
pub fn parse_created_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(at) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(at.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
}

/// Distinct makes, sorted, for the make filter drop-down.
///
/// Makes differing only by case are listed once, under their first spelling.
#[must_use]
pub fn unique_makes(listings: &[Listing]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut makes: Vec<String> = listings
        .iter()
        .filter(|l| !l.make.is_empty())
        .filter(|l| seen.insert(l.make.to_lowercase()))
        .map(|l| l.make.clone())
        .collect();
    makes.sort_by(|a, b| crate::view::sort::locale_cmp(a, b));
    makes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::seed::demo_listings;

    #[test]
    fn summary_counts_partition_total() {
        let listings = demo_listings();
        let summary = ListingSummary::from_listings(&listings);
        assert_eq!(summary.total, listings.len());
        assert_eq!(summary.scored + summary.pending, summary.total);
        assert_eq!(summary.decided + summary.undecided, summary.total);
        assert_eq!(summary.scored, 5);
        assert_eq!(summary.decided, 3);
    }

    #[test]
    fn empty_summary_is_zero() {
        assert_eq!(ListingSummary::from_listings(&[]), ListingSummary::default());
    }

    fn at(raw: &str) -> DateTime<Utc> {
        parse_created_at(raw).expect("timestamp")
    }

    #[test]
    fn kpis_are_zero_for_empty_collection() {
        let now = at("2024-06-01T00:00:00Z");
        assert_eq!(KpiMetrics::from_listings(&[], now), KpiMetrics::default());
    }

    #[test]
    fn kpis_over_demo_listings() {
        let now = at("2024-06-01T00:00:00Z");
        let kpi = KpiMetrics::from_listings(&demo_listings(), now);
        assert_eq!(kpi.total_listings, 8);
        assert!((kpi.total_value - 186_790.0).abs() < 1e-6);
        assert!((kpi.average_price - 23_348.75).abs() < 1e-6);
        assert!((kpi.scoring_rate - 62.5).abs() < 1e-9);
        assert!((kpi.average_score - 79.6).abs() < 1e-9);
        // 92, 88, 81 and 73 reach the conversion score; 64 does not.
        assert!((kpi.conversion_rate - 50.0).abs() < 1e-9);
        assert!((kpi.average_profit_per_unit - 23_348.75 * 0.15).abs() < 1e-6);
        // No buyer ids and no timestamps in the demo set.
        assert_eq!(kpi.active_buyers, 1);
        assert_eq!(kpi.aged_inventory, 0);
        assert!(kpi.lead_to_purchase_days.abs() < f64::EPSILON);
    }

    #[test]
    fn kpis_age_and_lead_time_use_created_at() {
        let now = at("2024-06-01T12:00:00Z");
        let mut old = Listing::new("old", "Ford", "F-150");
        old.created_at = Some("2024-04-01T12:00:00Z".into());
        old.buyer_id = Some("b-1".into());
        let mut fresh = Listing::new("fresh", "Kia", "Soul");
        fresh.created_at = Some("2024-05-31T00:00:00".into());
        fresh.buyer_id = Some("b-2".into());
        let mut undated = Listing::new("undated", "Kia", "Rio");
        undated.created_at = Some("last tuesday".into());
        undated.buyer_id = Some("b-1".into());

        let kpi = KpiMetrics::from_listings(&[old, fresh, undated], now);
        assert_eq!(kpi.active_buyers, 2);
        assert_eq!(kpi.aged_inventory, 1);
        // 61 days plus 1.5 days rounded up to 2, over three listings.
        assert!((kpi.lead_to_purchase_days - 21.0).abs() < 1e-9);
        assert!(kpi.average_price.abs() < f64::EPSILON);
        assert!(kpi.average_score.abs() < f64::EPSILON);
    }

    #[test]
    fn created_at_formats() {
        assert_eq!(at("2024-05-01"), at("2024-05-01T00:00:00Z"));
        assert_eq!(at("2024-05-01T02:00:00+02:00"), at("2024-05-01T00:00:00.000"));
        assert!(parse_created_at("05/01/2024").is_none());
    }

    #[test]
    fn unique_makes_are_sorted_and_deduplicated() {
        let listings = vec![
            Listing::new("1", "toyota", "a"),
            Listing::new("2", "Honda", "b"),
            Listing::new("3", "Toyota", "c"),
            Listing::new("4", "", "d"),
            Listing::new("5", "audi", "e"),
        ];
        assert_eq!(unique_makes(&listings), vec!["audi", "Honda", "toyota"]);
    }
}
