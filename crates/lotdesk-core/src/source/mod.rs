//! The listing data source collaborator.
//!
//! [`ListingSource`] is everything the desk needs from a backend. Two
//! implementations ship: [`HttpListingSource`] talks to the live API and
//! [`SeedSource`] serves the built-in demo set offline.

pub mod http;
pub mod seed;

use chrono::{DateTime, Utc};

use crate::error::ErrorCode;
use crate::model::{
    ExportRequest, ExportedFile, Listing, NotifyAck, NotifyRequest, RescoreMap, ScoreRequest,
};

pub use http::HttpListingSource;
pub use seed::SeedSource;

/// Failure reported by a listing source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// The request never produced an HTTP response.
    #[error("backend not reachable at {url}: {message}")]
    Transport { url: String, message: String },
    /// The backend answered with a non-2xx status.
    #[error("backend returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    /// The response body did not have the expected shape.
    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("{operation} is not supported by the {backend} source")]
    Unsupported {
        operation: &'static str,
        backend: &'static str,
    },
}

impl SourceError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Transport { .. } => ErrorCode::BackendUnreachable,
            Self::Status { .. } => ErrorCode::BackendRejected,
            Self::Decode { .. } => ErrorCode::DecodeFailed,
            Self::Unsupported { .. } => ErrorCode::Unsupported,
        }
    }

    /// True when the backend could not be reached at all.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Supplies the raw listing collection and performs listing actions.
pub trait ListingSource {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// True when the backend answers its health probe.
    fn check_health(&self) -> bool;

    /// The full listing collection.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the listings cannot be fetched or decoded.
    fn load_all(&self) -> Result<Vec<Listing>, SourceError>;

    /// Listings belonging to one buyer, optionally limited to a creation window.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the listings cannot be fetched or decoded.
    fn load_buyer(
        &self,
        buyer_id: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<Listing>, SourceError>;

    /// Score a batch of listings; results are keyed by VIN.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the backend refuses or cannot be reached.
    fn rescore(&self, batch: &[ScoreRequest]) -> Result<RescoreMap, SourceError>;

    /// Send a notification for one listing.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the backend refuses or cannot be reached.
    fn notify(&self, request: &NotifyRequest) -> Result<Vec<NotifyAck>, SourceError>;

    /// Store listings on the backend and return them as persisted.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the backend refuses or cannot be reached.
    fn ingest(&self, listings: &[Listing]) -> Result<Vec<Listing>, SourceError>;

    /// Produce a CSV export.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the backend refuses or cannot be reached.
    fn export(&self, request: &ExportRequest) -> Result<ExportedFile, SourceError>;
}

impl<S: ListingSource + ?Sized> ListingSource for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn check_health(&self) -> bool {
        (**self).check_health()
    }

    fn load_all(&self) -> Result<Vec<Listing>, SourceError> {
        (**self).load_all()
    }

    fn load_buyer(
        &self,
        buyer_id: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<Listing>, SourceError> {
        (**self).load_buyer(buyer_id, start, end)
    }

    fn rescore(&self, batch: &[ScoreRequest]) -> Result<RescoreMap, SourceError> {
        (**self).rescore(batch)
    }

    fn notify(&self, request: &NotifyRequest) -> Result<Vec<NotifyAck>, SourceError> {
        (**self).notify(request)
    }

    fn ingest(&self, listings: &[Listing]) -> Result<Vec<Listing>, SourceError> {
        (**self).ingest(listings)
    }

    fn export(&self, request: &ExportRequest) -> Result<ExportedFile, SourceError> {
        (**self).export(request)
    }
}
