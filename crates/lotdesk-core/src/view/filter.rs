//! Multi-criteria listing filter.
//!
//! Every field of [`FilterCriteria`] is a conjunctive clause; an empty field
//! imposes no constraint, so the default criteria pass every row.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ViewError;
use crate::model::Listing;

/// Score/decision status constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// No constraint (the `""` option).
    #[default]
    Any,
    /// `score` is present.
    Scored,
    /// `score` is absent.
    Pending,
    /// `decision.status` is non-empty.
    Decided,
    /// `decision.status` is empty or absent.
    Undecided,
}

impl StatusFilter {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Any => "",
            Self::Scored => "scored",
            Self::Pending => "pending",
            Self::Decided => "decided",
            Self::Undecided => "undecided",
        }
    }

    /// Returns true if the listing satisfies this status clause.
    #[must_use]
    pub fn matches(self, listing: &Listing) -> bool {
        match self {
            Self::Any => true,
            Self::Scored => listing.is_scored(),
            Self::Pending => !listing.is_scored(),
            Self::Decided => listing.is_decided(),
            Self::Undecided => !listing.is_decided(),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "any" | "all" => Ok(Self::Any),
            "scored" => Ok(Self::Scored),
            "pending" | "unscored" => Ok(Self::Pending),
            "decided" => Ok(Self::Decided),
            "undecided" => Ok(Self::Undecided),
            other => Err(ViewError::UnknownStatusFilter(other.to_string())),
        }
    }
}

/// Filter criteria applied to the raw listing collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive substring matched against make, model, VIN and location.
    pub search_term: String,
    pub status: StatusFilter,
    /// Case-insensitive exact match on make.
    pub make: String,
}

impl FilterCriteria {
    /// Returns true if no filter criteria are active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search_term.is_empty() && self.status == StatusFilter::Any && self.make.is_empty()
    }

    /// Returns true if the listing satisfies all active criteria.
    #[must_use]
    pub fn matches(&self, listing: &Listing) -> bool {
        Matcher::new(self).matches(listing)
    }

    /// Apply this filter, preserving input order among passing rows.
    #[must_use]
    pub fn apply<'a>(&self, listings: &'a [Listing]) -> Vec<&'a Listing> {
        let matcher = Matcher::new(self);
        listings.iter().filter(|l| matcher.matches(l)).collect()
    }

    /// Positions in `listings` of the rows passing this filter, ascending.
    #[must_use]
    pub fn matching_indices(&self, listings: &[Listing]) -> Vec<usize> {
        let matcher = Matcher::new(self);
        listings
            .iter()
            .enumerate()
            .filter_map(|(idx, l)| matcher.matches(l).then_some(idx))
            .collect()
    }
}

/// Criteria with the search term and make lowercased once per pass.
struct Matcher {
    term: String,
    status: StatusFilter,
    make: String,
}

impl Matcher {
    fn new(criteria: &FilterCriteria) -> Self {
        Self {
            term: criteria.search_term.to_lowercase(),
            status: criteria.status,
            make: criteria.make.to_lowercase(),
        }
    }

    fn matches(&self, listing: &Listing) -> bool {
        if !self.term.is_empty() {
            let hit = [
                Some(listing.make.as_str()),
                Some(listing.model.as_str()),
                listing.vin.as_deref(),
                listing.location.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&self.term));
            if !hit {
                return false;
            }
        }
        if !self.status.matches(listing) {
            return false;
        }
        if !self.make.is_empty() && listing.make.to_lowercase() != self.make {
            return false;
        }
        true
    }
}

/// Filter `listings` by `criteria` (stable, `O(n)`).
#[must_use]
pub fn filter_listings<'a>(listings: &'a [Listing], criteria: &FilterCriteria) -> Vec<&'a Listing> {
    criteria.apply(listings)
}
