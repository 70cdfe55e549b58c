//! Offline source over the built-in demo listings.

use chrono::{DateTime, Utc};
use std::cell::RefCell;
use tracing::debug;

use super::{ListingSource, SourceError};
use crate::model::seed::demo_listings;
use crate::model::{
    ExportRequest, ExportedFile, Listing, NotifyAck, NotifyRequest, RescoreMap, ScoreRequest,
};

/// Serves the demo listings without a backend.
///
/// `ingest` replaces the served set, so a seeded collection is what later
/// loads return. Actions that need the real scoring or export services are
/// reported as unsupported.
#[derive(Debug)]
pub struct SeedSource {
    listings: RefCell<Vec<Listing>>,
}

impl Default for SeedSource {
    fn default() -> Self {
        Self::new(demo_listings())
    }
}

impl SeedSource {
    #[must_use]
    pub const fn new(listings: Vec<Listing>) -> Self {
        Self {
            listings: RefCell::new(listings),
        }
    }

    const fn unsupported(operation: &'static str) -> SourceError {
        SourceError::Unsupported {
            operation,
            backend: "offline",
        }
    }
}

impl ListingSource for SeedSource {
    fn name(&self) -> &'static str {
        "offline"
    }

    fn check_health(&self) -> bool {
        true
    }

    fn load_all(&self) -> Result<Vec<Listing>, SourceError> {
        Ok(self.listings.borrow().clone())
    }

    fn load_buyer(
        &self,
        buyer_id: &str,
        _start: Option<DateTime<Utc>>,
        _end: Option<DateTime<Utc>>,
    ) -> Result<Vec<Listing>, SourceError> {
        Ok(self
            .listings
            .borrow()
            .iter()
            .filter(|l| l.buyer_id.as_deref() == Some(buyer_id))
            .cloned()
            .collect())
    }

    fn rescore(&self, _batch: &[ScoreRequest]) -> Result<RescoreMap, SourceError> {
        Err(Self::unsupported("rescore"))
    }

    fn notify(&self, _request: &NotifyRequest) -> Result<Vec<NotifyAck>, SourceError> {
        Err(Self::unsupported("notify"))
    }

    fn ingest(&self, listings: &[Listing]) -> Result<Vec<Listing>, SourceError> {
        let stored: Vec<Listing> = listings
            .iter()
            .enumerate()
            .map(|(idx, listing)| {
                let mut listing = listing.clone();
                if listing.id.is_empty() {
                    listing.id = format!("seed-{}", idx + 1);
                }
                listing
            })
            .collect();
        debug!(rows = stored.len(), "offline ingest");
        self.listings.replace(stored.clone());
        Ok(stored)
    }

    fn export(&self, _request: &ExportRequest) -> Result<ExportedFile, SourceError> {
        Err(Self::unsupported("export"))
    }
}
