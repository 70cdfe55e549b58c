//! Single-key stable sort over listings.
//!
//! Values are lifted into [`SortValue`] before comparison. Present values
//! compare by type: numbers arithmetically, text with Unicode collation.
//! Mismatched types and list values compare equal. A missing value always
//! sorts after a present one, in both directions.

use feruca::Collator;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::ViewError;
use crate::model::Listing;

// ---------------------------------------------------------------------------
// Sort keys
// ---------------------------------------------------------------------------

/// A sortable listing column: every listing field plus the two synthetic
/// decision columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SortKey {
    #[serde(rename = "id")]
    Id,
    #[serde(rename = "vehicle_key")]
    VehicleKey,
    #[serde(rename = "vin")]
    Vin,
    #[serde(rename = "year")]
    Year,
    #[serde(rename = "make")]
    Make,
    #[serde(rename = "model")]
    Model,
    #[serde(rename = "trim")]
    Trim,
    #[serde(rename = "miles")]
    Miles,
    #[serde(rename = "price")]
    Price,
    #[serde(rename = "score")]
    Score,
    #[serde(rename = "dom")]
    Dom,
    #[serde(rename = "source")]
    Source,
    #[serde(rename = "radius")]
    Radius,
    #[serde(rename = "reasonCodes")]
    ReasonCodes,
    #[serde(rename = "buyMax")]
    BuyMax,
    #[serde(rename = "location")]
    Location,
    #[serde(rename = "buyer_id")]
    BuyerId,
    #[serde(rename = "buyer_username")]
    BuyerUsername,
    #[serde(rename = "created_at")]
    CreatedAt,
    #[serde(rename = "decision_status")]
    DecisionStatus,
    #[serde(rename = "decision_reasons")]
    DecisionReasons,
}

impl SortKey {
    pub const ALL: [Self; 21] = [
        Self::Id,
        Self::VehicleKey,
        Self::Vin,
        Self::Year,
        Self::Make,
        Self::Model,
        Self::Trim,
        Self::Miles,
        Self::Price,
        Self::Score,
        Self::Dom,
        Self::Source,
        Self::Radius,
        Self::ReasonCodes,
        Self::BuyMax,
        Self::Location,
        Self::BuyerId,
        Self::BuyerUsername,
        Self::CreatedAt,
        Self::DecisionStatus,
        Self::DecisionReasons,
    ];

    /// Field name as it appears in the backend JSON.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::VehicleKey => "vehicle_key",
            Self::Vin => "vin",
            Self::Year => "year",
            Self::Make => "make",
            Self::Model => "model",
            Self::Trim => "trim",
            Self::Miles => "miles",
            Self::Price => "price",
            Self::Score => "score",
            Self::Dom => "dom",
            Self::Source => "source",
            Self::Radius => "radius",
            Self::ReasonCodes => "reasonCodes",
            Self::BuyMax => "buyMax",
            Self::Location => "location",
            Self::BuyerId => "buyer_id",
            Self::BuyerUsername => "buyer_username",
            Self::CreatedAt => "created_at",
            Self::DecisionStatus => "decision_status",
            Self::DecisionReasons => "decision_reasons",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        Self::ALL
            .into_iter()
            .find(|key| {
                key.as_str()
                    .chars()
                    .filter(|c| *c != '_')
                    .flat_map(char::to_lowercase)
                    .eq(normalized.chars())
            })
            .ok_or_else(|| ViewError::UnknownSortKey(s.trim().to_string()))
    }
}

impl<'de> Deserialize<'de> for SortKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => f.write_str("asc"),
            Self::Desc => f.write_str("desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            other => Err(ViewError::UnknownSortDirection(other.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for SortDirection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// The single active sort column and its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            key: SortKey::Score,
            direction: SortDirection::Desc,
        }
    }
}

impl SortConfig {
    #[must_use]
    pub const fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Header-click semantics: the same key flips direction, a new key
    /// starts ascending.
    #[must_use]
    pub fn toggled(self, key: SortKey) -> Self {
        if self.key == key {
            Self::new(key, self.direction.flipped())
        } else {
            Self::new(key, SortDirection::Asc)
        }
    }
}

// ---------------------------------------------------------------------------
// Values and comparison
// ---------------------------------------------------------------------------

/// A listing field lifted into a comparable value.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(f64),
    Text(String),
    /// A present value with no ordering (list columns such as `reasonCodes`).
    Unordered,
    Missing,
}

impl SortValue {
    fn text(value: Option<&str>) -> Self {
        value.map_or(Self::Missing, |s| Self::Text(s.to_string()))
    }

    #[allow(clippy::cast_precision_loss)]
    fn int(value: Option<i64>) -> Self {
        value.map_or(Self::Missing, |n| Self::Number(n as f64))
    }

    fn float(value: Option<f64>) -> Self {
        value.map_or(Self::Missing, Self::Number)
    }
}

/// Extract the comparison value of `key` from a listing.
#[must_use]
pub fn sort_value(listing: &Listing, key: SortKey) -> SortValue {
    match key {
        SortKey::Id => SortValue::Text(listing.id.clone()),
        SortKey::VehicleKey => SortValue::text(listing.vehicle_key.as_deref()),
        SortKey::Vin => SortValue::text(listing.vin.as_deref()),
        SortKey::Year => SortValue::int(listing.year),
        SortKey::Make => SortValue::Text(listing.make.clone()),
        SortKey::Model => SortValue::Text(listing.model.clone()),
        SortKey::Trim => SortValue::text(listing.trim.as_deref()),
        SortKey::Miles => SortValue::float(listing.miles),
        SortKey::Price => SortValue::float(listing.price),
        SortKey::Score => SortValue::float(listing.score),
        SortKey::Dom => SortValue::int(listing.dom),
        SortKey::Source => SortValue::text(listing.source.as_deref()),
        SortKey::Radius => SortValue::int(listing.radius),
        SortKey::ReasonCodes => SortValue::Unordered,
        SortKey::BuyMax => SortValue::float(listing.buy_max),
        SortKey::Location => SortValue::text(listing.location.as_deref()),
        SortKey::BuyerId => SortValue::text(listing.buyer_id.as_deref()),
        SortKey::BuyerUsername => SortValue::text(listing.buyer_username.as_deref()),
        SortKey::CreatedAt => SortValue::text(listing.created_at.as_deref()),
        SortKey::DecisionStatus => {
            SortValue::text(listing.decision.as_ref().and_then(|d| d.status.as_deref()))
        }
        SortKey::DecisionReasons => SortValue::Text(
            listing
                .decision
                .as_ref()
                .map(crate::model::Decision::joined_reasons)
                .unwrap_or_default(),
        ),
    }
}

thread_local! {
    static COLLATOR: RefCell<Collator> = RefCell::new(Collator::default());
}

/// Locale-aware string ordering using the Unicode Collation Algorithm
/// (CLDR root order): accents and case are secondary to the base letters,
/// and lowercase sorts before uppercase on a case-only difference.
#[must_use]
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    COLLATOR.with(|collator| collator.borrow_mut().collate(a, b))
}

/// Compare two values under a direction.
///
/// `Missing` sorts last regardless of direction. A number against text, or
/// anything against `Unordered`, is `Equal`.
#[must_use]
pub fn compare_values(a: &SortValue, b: &SortValue, direction: SortDirection) -> Ordering {
    match (a, b) {
        (SortValue::Missing, SortValue::Missing) => Ordering::Equal,
        (SortValue::Missing, _) => Ordering::Greater,
        (_, SortValue::Missing) => Ordering::Less,
        (SortValue::Number(x), SortValue::Number(y)) => direction.apply(x.total_cmp(y)),
        (SortValue::Text(x), SortValue::Text(y)) => direction.apply(locale_cmp(x, y)),
        _ => Ordering::Equal,
    }
}

/// Stable sort of `rows` by `config`.
///
/// Each row's value is extracted once; rows comparing equal keep their
/// input order in either direction.
pub fn sort_listings(rows: &mut Vec<&Listing>, config: SortConfig) {
    let mut keyed: Vec<(SortValue, &Listing)> = rows
        .iter()
        .map(|listing| (sort_value(listing, config.key), *listing))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_values(a, b, config.direction));
    rows.clear();
    rows.extend(keyed.into_iter().map(|(_, listing)| listing));
}

/// Stable sort of positions into `listings`, same ordering as [`sort_listings`].
pub fn sort_indices(listings: &[Listing], indices: &mut Vec<usize>, config: SortConfig) {
    let mut keyed: Vec<(SortValue, usize)> = indices
        .iter()
        .filter_map(|&idx| listings.get(idx).map(|l| (sort_value(l, config.key), idx)))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_values(a, b, config.direction));
    indices.clear();
    indices.extend(keyed.into_iter().map(|(_, idx)| idx));
}
