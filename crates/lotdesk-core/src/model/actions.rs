//! Request and response payloads for the side-effecting listing actions:
//! rescoring, notification and CSV export.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::listing::Listing;
use crate::error::ErrorCode;

// ---------------------------------------------------------------------------
// Rescoring
// ---------------------------------------------------------------------------

/// One row of a rescore batch, built from a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub vehicle_key: String,
    pub vin: String,
    pub price: Option<f64>,
    pub miles: Option<f64>,
    pub dom: Option<i64>,
    pub source: Option<String>,
}

impl ScoreRequest {
    /// Build a score request for a listing, or `None` if it has no VIN.
    ///
    /// Results are merged back by VIN, so VIN-less rows are never sent.
    #[must_use]
    pub fn from_listing(listing: &Listing) -> Option<Self> {
        let vin = listing.vin.as_deref().filter(|v| !v.is_empty())?;
        Some(Self {
            vehicle_key: listing.vehicle_key_or_id().to_string(),
            vin: vin.to_string(),
            price: listing.price,
            miles: listing.miles,
            dom: listing.dom,
            source: listing.source.clone(),
        })
    }
}

/// A score row as returned by `POST /score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    #[serde(default)]
    pub vehicle_key: Option<String>,
    pub vin: String,
    pub score: f64,
    #[serde(rename = "buyMax")]
    pub buy_max: f64,
    #[serde(rename = "reasonCodes", default)]
    pub reason_codes: Vec<String>,
}

/// Fields merged into a listing after rescoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rescore {
    pub score: f64,
    #[serde(rename = "buyMax")]
    pub buy_max: f64,
    #[serde(rename = "reasonCodes")]
    pub reason_codes: Vec<String>,
}

/// Rescore results keyed by VIN.
pub type RescoreMap = HashMap<String, Rescore>;

/// Collapse backend score rows into a VIN-keyed map (last row wins).
#[must_use]
pub fn rescore_map(results: Vec<ScoreResult>) -> RescoreMap {
    results
        .into_iter()
        .map(|r| {
            (
                r.vin,
                Rescore {
                    score: r.score,
                    buy_max: r.buy_max,
                    reason_codes: r.reason_codes,
                },
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyRequest {
    pub vehicle_key: String,
    pub vin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Backend acknowledgement for one notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyAck {
    pub vehicle_key: String,
    pub vin: String,
    pub notified: bool,
    pub channel: String,
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Which listings an export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    All,
    Daily,
    Range,
    Selected,
}

impl ExportKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Daily => "daily",
            Self::Range => "range",
            Self::Selected => "selected",
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportKind {
    type Err = ExportRequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "daily" | "today" => Ok(Self::Daily),
            "range" => Ok(Self::Range),
            "selected" => Ok(Self::Selected),
            other => Err(ExportRequestError::UnknownKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub export_type: ExportKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_listing_ids: Option<Vec<String>>,
}

/// Reasons an export request is refused before it reaches the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportRequestError {
    #[error("unknown export type '{0}': expected one of all, daily, range, selected")]
    UnknownKind(String),
    #[error("start date and end date are required for range export")]
    MissingRange,
    #[error("start date {start} cannot be after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
    #[error("at least one listing must be selected for selective export")]
    NoSelection,
}

impl ExportRequestError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NoSelection => ErrorCode::NothingSelected,
            Self::UnknownKind(_) | Self::MissingRange | Self::InvertedRange { .. } => {
                ErrorCode::InvalidExportRequest
            }
        }
    }
}

impl ExportRequest {
    /// A CSV export request of the given kind with no range or selection.
    #[must_use]
    pub fn new(export_type: ExportKind) -> Self {
        Self {
            export_type,
            start_date: None,
            end_date: None,
            format: "csv".to_string(),
            buyer_id: None,
            selected_listing_ids: None,
        }
    }

    #[must_use]
    pub const fn with_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    #[must_use]
    pub fn with_selection(mut self, ids: Vec<String>) -> Self {
        self.selected_listing_ids = Some(ids);
        self
    }

    /// Check the request against the backend's export rules.
    ///
    /// # Errors
    ///
    /// Returns [`ExportRequestError`] for a range export without both dates
    /// or with `start > end`, and for a selected export with no ids.
    pub fn validate(&self) -> Result<(), ExportRequestError> {
        match self.export_type {
            ExportKind::Range => match (self.start_date, self.end_date) {
                (Some(start), Some(end)) if start > end => {
                    Err(ExportRequestError::InvertedRange { start, end })
                }
                (Some(_), Some(_)) => Ok(()),
                _ => Err(ExportRequestError::MissingRange),
            },
            ExportKind::Selected => {
                if self
                    .selected_listing_ids
                    .as_ref()
                    .is_some_and(|ids| !ids.is_empty())
                {
                    Ok(())
                } else {
                    Err(ExportRequestError::NoSelection)
                }
            }
            ExportKind::All | ExportKind::Daily => Ok(()),
        }
    }
}

/// CSV attachment returned by an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedFile {
    pub filename: String,
    pub csv: String,
}

impl ExportedFile {
    /// Number of data rows (header excluded).
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.csv
            .lines()
            .filter(|line| !line.trim().is_empty())
            .count()
            .saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
    }

    #[test]
    fn score_request_skips_listing_without_vin() {
        let listing = Listing::new("1", "Ford", "Focus");
        assert!(ScoreRequest::from_listing(&listing).is_none());
    }

    #[test]
    fn score_request_uses_vehicle_key_or_id() {
        let mut listing = Listing::new("9", "Ford", "Focus");
        listing.vin = Some("VIN9".into());
        listing.price = Some(9000.0);
        let req = ScoreRequest::from_listing(&listing).expect("has vin");
        assert_eq!(req.vehicle_key, "9");
        assert_eq!(req.vin, "VIN9");
        assert_eq!(req.price, Some(9000.0));
    }

    #[test]
    fn rescore_map_keys_by_vin() {
        let map = rescore_map(vec![ScoreResult {
            vehicle_key: None,
            vin: "V1".into(),
            score: 77.0,
            buy_max: 12000.0,
            reason_codes: vec!["LowMiles".into()],
        }]);
        assert_eq!(map["V1"].score, 77.0);
        assert_eq!(map["V1"].reason_codes, vec!["LowMiles".to_string()]);
    }

    #[test]
    fn range_export_requires_ordered_dates() {
        let missing = ExportRequest::new(ExportKind::Range).with_range(Some(date("2024-01-01")), None);
        assert_eq!(missing.validate(), Err(ExportRequestError::MissingRange));

        let inverted = ExportRequest::new(ExportKind::Range)
            .with_range(Some(date("2024-02-01")), Some(date("2024-01-01")));
        assert!(matches!(
            inverted.validate(),
            Err(ExportRequestError::InvertedRange { .. })
        ));

        let ok = ExportRequest::new(ExportKind::Range)
            .with_range(Some(date("2024-01-01")), Some(date("2024-01-31")));
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn selected_export_requires_ids() {
        let empty = ExportRequest::new(ExportKind::Selected).with_selection(vec![]);
        assert_eq!(empty.validate(), Err(ExportRequestError::NoSelection));
        assert_eq!(
            ExportRequestError::NoSelection.code(),
            ErrorCode::NothingSelected
        );
        let some = ExportRequest::new(ExportKind::Selected).with_selection(vec!["1".into()]);
        assert!(some.validate().is_ok());
    }

    #[test]
    fn export_request_serializes_like_backend_schema() {
        let req = ExportRequest::new(ExportKind::Range)
            .with_range(Some(date("2024-03-01")), Some(date("2024-03-05")));
        let value = serde_json::to_value(&req).expect("serialize");
        assert_eq!(value["export_type"], "range");
        assert_eq!(value["start_date"], "2024-03-01");
        assert_eq!(value["format"], "csv");
        assert!(value.get("selected_listing_ids").is_none());
    }

    #[test]
    fn export_kind_parses_aliases() {
        assert_eq!("Daily".parse::<ExportKind>(), Ok(ExportKind::Daily));
        assert_eq!("today".parse::<ExportKind>(), Ok(ExportKind::Daily));
        assert!("weekly".parse::<ExportKind>().is_err());
    }

    #[test]
    fn record_count_excludes_header() {
        let file = ExportedFile {
            filename: "x.csv".into(),
            csv: "id,vin\n1,A\n2,B\n".into(),
        };
        assert_eq!(file.record_count(), 2);
        let empty = ExportedFile {
            filename: "x.csv".into(),
            csv: String::new(),
        };
        assert_eq!(empty.record_count(), 0);
    }
}
