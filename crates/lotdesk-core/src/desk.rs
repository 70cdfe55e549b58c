//! Session controller tying a [`ListingSource`] to a [`ListingViewModel`].
//!
//! The desk performs the page-level actions (load, seed, rescore, notify,
//! export) and keeps the view's raw collection in step with the backend.
//! A failed load never clears the view: the last collection that loaded
//! successfully stays on screen and the backend is marked unreachable.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use crate::error::ErrorCode;
use crate::model::{
    ExportKind, ExportRequest, ExportRequestError, ExportedFile, Listing, NotifyAck,
    NotifyRequest, ScoreRequest,
};
use crate::source::{ListingSource, SourceError};
use crate::view::{ListingViewModel, ViewError};

/// Last observed backend reachability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendStatus {
    #[default]
    Unknown,
    Reachable,
    Unreachable,
}

impl fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::Reachable => f.write_str("reachable"),
            Self::Unreachable => f.write_str("unreachable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeskError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    View(#[from] ViewError),
    #[error(transparent)]
    Export(#[from] ExportRequestError),
    #[error("no listing with VIN '{0}'")]
    ListingNotFound(String),
    #[error("no listings selected")]
    NothingSelected,
}

impl DeskError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Source(err) => err.code(),
            Self::View(err) => err.code(),
            Self::Export(err) => err.code(),
            Self::ListingNotFound(_) => ErrorCode::ListingNotFound,
            Self::NothingSelected => ErrorCode::NothingSelected,
        }
    }

    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

/// A listing review session.
#[derive(Debug)]
pub struct ListingDesk<S> {
    source: S,
    view: ListingViewModel,
    status: BackendStatus,
}

impl<S: ListingSource> ListingDesk<S> {
    /// A desk over `source` with an empty view.
    pub fn new(source: S) -> Self {
        Self::with_view(source, ListingViewModel::default())
    }

    /// A desk over `source` starting from a pre-configured view.
    pub const fn with_view(source: S, view: ListingViewModel) -> Self {
        Self {
            source,
            view,
            status: BackendStatus::Unknown,
        }
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    pub const fn view(&self) -> &ListingViewModel {
        &self.view
    }

    pub const fn view_mut(&mut self) -> &mut ListingViewModel {
        &mut self.view
    }

    pub const fn status(&self) -> BackendStatus {
        self.status
    }

    /// Probe the backend and, when it answers, load the collection.
    ///
    /// Returns the resulting status; load failures only downgrade it.
    pub fn connect(&mut self) -> BackendStatus {
        if self.source.check_health() {
            self.status = BackendStatus::Reachable;
            info!(source = self.source.name(), "backend reachable");
            if let Err(err) = self.refresh() {
                warn!(error = %err, "initial load failed");
            }
        } else {
            self.status = BackendStatus::Unreachable;
            warn!(source = self.source.name(), "backend not reachable");
        }
        self.status
    }

    /// Reload the full collection.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Source`] if the load fails. The view keeps its
    /// previous collection.
    pub fn refresh(&mut self) -> Result<usize, DeskError> {
        let listings = self
            .source
            .load_all()
            .inspect_err(|err| self.mark_failure(err))?;
        let count = listings.len();
        self.view.replace_raw_collection(listings);
        self.status = BackendStatus::Reachable;
        info!(count, "loaded listings");
        Ok(count)
    }

    /// Load one buyer's listings, optionally limited to a creation window.
    ///
    /// Replaces the collection like [`ListingDesk::refresh`].
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Source`] if the load fails. The view keeps its
    /// previous collection.
    pub fn refresh_buyer(
        &mut self,
        buyer_id: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<usize, DeskError> {
        let listings = self
            .source
            .load_buyer(buyer_id, start, end)
            .inspect_err(|err| self.mark_failure(err))?;
        let count = listings.len();
        self.view.replace_raw_collection(listings);
        self.status = BackendStatus::Reachable;
        info!(buyer_id, count, "loaded buyer listings");
        Ok(count)
    }

    /// Push `listings` to the backend and show what it stored.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Source`] if ingest fails; the view is unchanged.
    pub fn seed(&mut self, listings: &[Listing]) -> Result<usize, DeskError> {
        let stored = self.source.ingest(listings).inspect_err(|err| self.mark_failure(err))?;
        let count = stored.len();
        self.view.replace_raw_collection(stored);
        self.status = BackendStatus::Reachable;
        info!(count, "seeded listings");
        Ok(count)
    }

    /// Rescore every filtered row that has a VIN and merge the results.
    ///
    /// Returns the number of score results received.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Source`] if scoring fails; no listing changes.
    pub fn rescore_visible(&mut self) -> Result<usize, DeskError> {
        let batch: Vec<ScoreRequest> = self
            .view
            .visible_rows()
            .filter_map(ScoreRequest::from_listing)
            .collect();
        if batch.is_empty() {
            info!("no listings with a VIN to rescore");
            return Ok(0);
        }
        let scores = self
            .source
            .rescore(&batch)
            .inspect_err(|err| self.mark_failure(err))?;
        let received = scores.len();
        let updated = self.view.apply_rescore(&scores);
        info!(sent = batch.len(), received, updated, "rescored listings");
        Ok(received)
    }

    /// Notify on the listing with `vin`.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::ListingNotFound`] if no loaded listing has that
    /// VIN, or [`DeskError::Source`] if the backend call fails.
    pub fn notify(&mut self, vin: &str) -> Result<Vec<NotifyAck>, DeskError> {
        let listing = self
            .view
            .find_by_vin(vin)
            .ok_or_else(|| DeskError::ListingNotFound(vin.to_string()))?;
        let request = NotifyRequest {
            vehicle_key: listing.vehicle_key_or_id().to_string(),
            vin: vin.to_string(),
            channel: None,
            message: None,
        };
        let acks = self
            .source
            .notify(&request)
            .inspect_err(|err| self.mark_failure(err))?;
        info!(vin, acks = acks.len(), "notification sent");
        Ok(acks)
    }

    /// Export listings as CSV.
    ///
    /// `Selected` exports carry the current selection.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::NothingSelected`] for a selected export with an
    /// empty selection, [`DeskError::Export`] for an invalid date range, or
    /// [`DeskError::Source`] if the backend call fails.
    pub fn export(
        &mut self,
        kind: ExportKind,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<ExportedFile, DeskError> {
        let mut request = ExportRequest::new(kind).with_range(start, end);
        if kind == ExportKind::Selected {
            let ids: Vec<String> = self
                .view
                .selected_ids()
                .into_iter()
                .map(str::to_string)
                .collect();
            if ids.is_empty() {
                return Err(DeskError::NothingSelected);
            }
            request = request.with_selection(ids);
        }
        request.validate()?;
        let file = self
            .source
            .export(&request)
            .inspect_err(|err| self.mark_failure(err))?;
        info!(
            kind = %kind,
            filename = %file.filename,
            records = file.record_count(),
            "exported listings"
        );
        Ok(file)
    }

    fn mark_failure(&mut self, err: &SourceError) {
        if err.is_unreachable() {
            self.status = BackendStatus::Unreachable;
        }
        warn!(error = %err, code = %err.code(), "listing source call failed");
    }
}
