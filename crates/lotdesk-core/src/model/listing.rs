use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Buyer or administrator disposition on a listing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Decision {
    #[serde(rename = "buyMax", default, skip_serializing_if = "Option::is_none")]
    pub buy_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasons: Option<Vec<String>>,
}

impl Decision {
    /// The decision status when it is non-empty.
    ///
    /// An empty status string counts as "no decision", matching how the
    /// backend defaults an unset disposition to `""`.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref().filter(|s| !s.is_empty())
    }

    /// Reasons joined with `", "`, or the empty string when absent.
    #[must_use]
    pub fn joined_reasons(&self) -> String {
        self.reasons
            .as_deref()
            .map(|reasons| reasons.join(", "))
            .unwrap_or_default()
    }
}

/// A single vehicle listing as served by the backend.
///
/// The view-model reads `id`, the search fields, `score` and `decision`.
/// Everything else is payload carried through untouched; attributes this
/// struct does not name are kept in [`Listing::extra`] so a listing
/// serializes back to the shape it was loaded in.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub miles: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dom: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<i64>,
    #[serde(rename = "reasonCodes", default)]
    pub reason_codes: Vec<String>,
    #[serde(rename = "buyMax", default, skip_serializing_if = "Option::is_none")]
    pub buy_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Listing {
    /// Minimal listing with identity and the two required text fields.
    #[must_use]
    pub fn new(id: impl Into<String>, make: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            make: make.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    /// True when the listing has been scored.
    #[must_use]
    pub const fn is_scored(&self) -> bool {
        self.score.is_some()
    }

    /// True when a non-empty decision status is recorded.
    #[must_use]
    pub fn is_decided(&self) -> bool {
        self.decision_status().is_some()
    }

    #[must_use]
    pub fn decision_status(&self) -> Option<&str> {
        self.decision.as_ref().and_then(Decision::status)
    }

    /// Identifier sent to the backend for score and notify calls.
    ///
    /// Falls back to the listing id when no `vehicle_key` was supplied.
    #[must_use]
    pub fn vehicle_key_or_id(&self) -> &str {
        self.vehicle_key.as_deref().unwrap_or(&self.id)
    }
}
