//! Built-in demo listings used when no backend is reachable and to seed one.

use super::listing::{Decision, Listing};

struct Row {
    id: &'static str,
    vin: &'static str,
    year: i64,
    make: &'static str,
    model: &'static str,
    trim: &'static str,
    miles: f64,
    price: f64,
    score: Option<f64>,
    dom: i64,
    source: &'static str,
    location: &'static str,
    radius: i64,
    reasons: &'static [&'static str],
    buy_max: f64,
    decision: Option<(&'static str, &'static [&'static str])>,
}

const ROWS: &[Row] = &[
    Row {
        id: "1",
        vin: "1HGCM82633A004352",
        year: 2019,
        make: "Toyota",
        model: "Camry",
        trim: "SE",
        miles: 41_000.0,
        price: 18_950.0,
        score: Some(88.0),
        dom: 27,
        source: "AutoTrader",
        location: "Austin, TX",
        radius: 52,
        reasons: &["PriceVsBaseline", "LowDOM"],
        buy_max: 19_600.0,
        decision: Some(("approved", &["Under market"])),
    },
    Row {
        id: "2",
        vin: "1C4RJEBG3MC123456",
        year: 2021,
        make: "Jeep",
        model: "Grand Cherokee",
        trim: "Limited",
        miles: 36_000.0,
        price: 27_990.0,
        score: Some(73.0),
        dom: 44,
        source: "Facebook Marketplace",
        location: "Dallas, TX",
        radius: 18,
        reasons: &["LowMiles"],
        buy_max: 28_600.0,
        decision: None,
    },
    Row {
        id: "3",
        vin: "5YJ3E1EA7KF317000",
        year: 2019,
        make: "Tesla",
        model: "Model 3",
        trim: "Long Range",
        miles: 58_000.0,
        price: 21_900.0,
        score: Some(92.0),
        dom: 12,
        source: "Bring a Trailer",
        location: "Denver, CO",
        radius: 420,
        reasons: &["PriceVsBaseline", "LowDOM"],
        buy_max: 23_000.0,
        decision: Some(("approved", &["Strong resale", "Low DOM"])),
    },
    Row {
        id: "4",
        vin: "2HGFC2F59JH512345",
        year: 2018,
        make: "Honda",
        model: "Civic",
        trim: "EX",
        miles: 62_500.0,
        price: 15_400.0,
        score: None,
        dom: 9,
        source: "Craigslist",
        location: "Houston, TX",
        radius: 35,
        reasons: &[],
        buy_max: 15_900.0,
        decision: None,
    },
    Row {
        id: "5",
        vin: "1FTEW1EP5JFA12345",
        year: 2018,
        make: "Ford",
        model: "F-150",
        trim: "XLT",
        miles: 88_000.0,
        price: 24_500.0,
        score: Some(64.0),
        dom: 61,
        source: "Cars.com",
        location: "San Antonio, TX",
        radius: 80,
        reasons: &["HighDOM"],
        buy_max: 23_800.0,
        decision: Some(("rejected", &["Over budget"])),
    },
    Row {
        id: "6",
        vin: "JF1VA1C68L9812345",
        year: 2020,
        make: "Subaru",
        model: "WRX",
        trim: "Premium",
        miles: 30_200.0,
        price: 26_750.0,
        score: None,
        dom: 5,
        source: "AutoTrader",
        location: "Boulder, CO",
        radius: 25,
        reasons: &[],
        buy_max: 27_100.0,
        decision: None,
    },
    Row {
        id: "7",
        vin: "WBA5R1C50LFH12345",
        year: 2020,
        make: "BMW",
        model: "3 Series",
        trim: "330i",
        miles: 27_900.0,
        price: 31_200.0,
        score: Some(81.0),
        dom: 19,
        source: "Carvana",
        location: "Phoenix, AZ",
        radius: 140,
        reasons: &["LowMiles", "PriceVsBaseline"],
        buy_max: 32_000.0,
        decision: None,
    },
    Row {
        id: "8",
        vin: "2HGFC1F30KH654321",
        year: 2019,
        make: "Honda",
        model: "Accord",
        trim: "Sport",
        miles: 45_300.0,
        price: 20_100.0,
        score: None,
        dom: 33,
        source: "Facebook Marketplace",
        location: "Austin, TX",
        radius: 15,
        reasons: &[],
        buy_max: 20_700.0,
        decision: None,
    },
];

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}

/// The demo listing set, in a fixed order.
#[must_use]
pub fn demo_listings() -> Vec<Listing> {
    ROWS.iter()
        .map(|row| Listing {
            id: row.id.to_string(),
            make: row.make.to_string(),
            model: row.model.to_string(),
            vin: Some(row.vin.to_string()),
            location: Some(row.location.to_string()),
            score: row.score,
            decision: row.decision.map(|(status, reasons)| Decision {
                buy_max: Some(row.buy_max),
                status: Some(status.to_string()),
                reasons: Some(strings(reasons)),
            }),
            vehicle_key: Some(format!("{}-{}-{}", row.year, row.make, row.vin).to_lowercase()),
            year: Some(row.year),
            trim: Some(row.trim.to_string()),
            miles: Some(row.miles),
            price: Some(row.price),
            dom: Some(row.dom),
            source: Some(row.source.to_string()),
            radius: Some(row.radius),
            reason_codes: strings(row.reasons),
            buy_max: Some(row.buy_max),
            ..Listing::default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn demo_ids_and_vins_are_unique() {
        let listings = demo_listings();
        let ids: HashSet<_> = listings.iter().map(|l| l.id.as_str()).collect();
        let vins: HashSet<_> = listings.iter().filter_map(|l| l.vin.as_deref()).collect();
        assert_eq!(ids.len(), listings.len());
        assert_eq!(vins.len(), listings.len());
    }

    #[test]
    fn demo_set_mixes_scored_and_pending() {
        let listings = demo_listings();
        assert!(listings.iter().any(Listing::is_scored));
        assert!(listings.iter().any(|l| !l.is_scored()));
        assert!(listings.iter().any(Listing::is_decided));
    }
}
