//! The listing view-model.
//!
//! [`ListingViewModel`] owns the raw listing collection plus the control
//! state (filter criteria, sort config, pagination, selection) and derives
//! what a review page renders, always in the order filter → sort → paginate.
//!
//! The filtered and sorted view is cached as a list of positions into the raw
//! collection and recomputed after every mutator, so readers never see a
//! combination of filter, sort and page that belongs to different states.

pub mod filter;
pub mod paginate;
pub mod selection;
pub mod sort;

use std::collections::HashSet;
use std::num::NonZeroUsize;

use tracing::debug;

use crate::error::ErrorCode;
use crate::model::{Listing, RescoreMap};

pub use filter::{FilterCriteria, StatusFilter, filter_listings};
pub use paginate::{
    DEFAULT_ROWS_PER_PAGE, PageMarker, Pagination, page_window, paginate,
    row_range, total_pages,
};
pub use selection::SelectionSet;
pub use sort::{SortConfig, SortDirection, SortKey, SortValue, sort_listings};

/// Control input rejected at the view-model boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("unknown sort key '{0}'")]
    UnknownSortKey(String),
    #[error("unknown sort direction '{0}': expected asc or desc")]
    UnknownSortDirection(String),
    #[error("unknown status filter '{0}'")]
    UnknownStatusFilter(String),
    #[error("rows per page must be at least 1")]
    InvalidRowsPerPage,
}

impl ViewError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownSortKey(_) => ErrorCode::UnknownSortKey,
            Self::UnknownStatusFilter(_) => ErrorCode::InvalidFilterValue,
            Self::UnknownSortDirection(_) | Self::InvalidRowsPerPage => {
                ErrorCode::InvalidControlInput
            }
        }
    }
}

/// Raw listings plus the control state that projects them into a page.
#[derive(Debug, Clone, Default)]
pub struct ListingViewModel {
    raw: Vec<Listing>,
    ids: HashSet<String>,
    criteria: FilterCriteria,
    sort: SortConfig,
    pagination: Pagination,
    selection: SelectionSet,
    /// Positions into `raw`, filtered and sorted.
    visible: Vec<usize>,
}

impl ListingViewModel {
    /// A view over `listings` with default controls (score descending, 25 rows).
    #[must_use]
    pub fn new(listings: Vec<Listing>) -> Self {
        Self::with_settings(listings, SortConfig::default(), DEFAULT_ROWS_PER_PAGE)
    }

    #[must_use]
    pub fn with_settings(
        listings: Vec<Listing>,
        sort: SortConfig,
        rows_per_page: NonZeroUsize,
    ) -> Self {
        let ids = listings.iter().map(|l| l.id.clone()).collect();
        let mut vm = Self {
            raw: listings,
            ids,
            criteria: FilterCriteria::default(),
            sort,
            pagination: Pagination::new(rows_per_page),
            selection: SelectionSet::new(),
            visible: Vec::new(),
        };
        vm.recompute();
        vm
    }

    // -----------------------------------------------------------------------
    // Read accessors
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn raw(&self) -> &[Listing] {
        &self.raw
    }

    #[must_use]
    pub const fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    #[must_use]
    pub const fn sort(&self) -> SortConfig {
        self.sort
    }

    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.pagination.current_page
    }

    #[must_use]
    pub const fn rows_per_page(&self) -> NonZeroUsize {
        self.pagination.rows_per_page
    }

    /// Number of rows passing the current filter.
    #[must_use]
    pub fn filtered_count(&self) -> usize {
        self.visible.len()
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        total_pages(self.visible.len(), self.pagination.rows_per_page)
    }

    /// Every filtered row, in sort order.
    pub fn visible_rows(&self) -> impl Iterator<Item = &Listing> + '_ {
        self.visible.iter().filter_map(|&idx| self.raw.get(idx))
    }

    /// The rows of 1-based `page` of the filtered and sorted view.
    #[must_use]
    pub fn sorted_slice(&self, page: usize) -> Vec<&Listing> {
        paginate(&self.visible, page, self.pagination.rows_per_page)
            .iter()
            .filter_map(|&idx| self.raw.get(idx))
            .collect()
    }

    /// The rows of the current page.
    #[must_use]
    pub fn page_rows(&self) -> Vec<&Listing> {
        self.sorted_slice(self.pagination.current_page)
    }

    /// 1-based inclusive row numbers shown on the current page.
    #[must_use]
    pub fn row_range(&self) -> (usize, usize) {
        row_range(
            self.pagination.current_page,
            self.pagination.rows_per_page,
            self.visible.len(),
        )
    }

    #[must_use]
    pub fn page_window(&self) -> Vec<PageMarker> {
        page_window(self.pagination.current_page, self.total_pages())
    }

    /// True iff the filtered set is non-empty and wholly selected.
    #[must_use]
    pub fn is_all_selected(&self) -> bool {
        self.selection.is_all_selected(self.visible_ids())
    }

    /// True iff the selection is non-empty and a strict subset of the
    /// filtered set.
    #[must_use]
    pub fn is_indeterminate(&self) -> bool {
        self.selection.is_indeterminate(self.visible_ids())
    }

    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    /// Selected ids, ascending.
    #[must_use]
    pub fn selected_ids(&self) -> Vec<&str> {
        self.selection.sorted_ids()
    }

    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&Listing> {
        self.raw.iter().find(|l| l.id == id)
    }

    #[must_use]
    pub fn find_by_vin(&self, vin: &str) -> Option<&Listing> {
        self.raw.iter().find(|l| l.vin.as_deref() == Some(vin))
    }

    fn visible_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.visible_rows().map(|l| l.id.as_str())
    }

    // -----------------------------------------------------------------------
    // Mutators
    // -----------------------------------------------------------------------

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.criteria.search_term = term.into();
        self.recompute();
    }

    pub fn set_status_filter(&mut self, status: StatusFilter) {
        self.criteria.status = status;
        self.recompute();
    }

    pub fn set_make_filter(&mut self, make: impl Into<String>) {
        self.criteria.make = make.into();
        self.recompute();
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.recompute();
    }

    /// Header-click sort: the active key flips direction, a new key starts
    /// ascending.
    pub fn set_sort(&mut self, key: SortKey) {
        self.sort = self.sort.toggled(key);
        self.recompute();
    }

    pub fn set_sort_config(&mut self, sort: SortConfig) {
        self.sort = sort;
        self.recompute();
    }

    /// Move to `page`, clamped into `[1, total_pages]`; returns the page
    /// actually shown.
    pub fn set_page(&mut self, page: usize) -> usize {
        self.pagination.current_page = page;
        self.pagination.clamp_to(self.visible.len());
        self.pagination.current_page
    }

    /// Change the page size and re-clamp the current page.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::InvalidRowsPerPage`] for zero; state is unchanged.
    pub fn set_rows_per_page(&mut self, rows: usize) -> Result<(), ViewError> {
        let rows = NonZeroUsize::new(rows).ok_or(ViewError::InvalidRowsPerPage)?;
        self.pagination.rows_per_page = rows;
        self.pagination.clamp_to(self.visible.len());
        Ok(())
    }

    /// Select or deselect one listing. Ids not in the raw collection are
    /// ignored; returns whether the selection was touched.
    pub fn toggle_selection(&mut self, id: &str, selected: bool) -> bool {
        if !self.ids.contains(id) {
            debug!(id, "ignoring selection of unknown listing");
            return false;
        }
        self.selection.toggle(id, selected);
        true
    }

    /// Select every filtered row (not just the current page), or clear.
    pub fn select_all(&mut self, selected: bool) {
        let visible: Vec<&str> = self
            .visible
            .iter()
            .filter_map(|&idx| self.raw.get(idx))
            .map(|l| l.id.as_str())
            .collect();
        self.selection.select_all(selected, visible);
        debug!(selected = self.selection.len(), "select all");
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Clear search, status and make filters; sort, page size and selection
    /// are kept.
    pub fn reset_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.recompute();
    }

    /// Swap in a freshly loaded collection. Selected ids that no longer exist
    /// are dropped; control state is kept and the page re-clamped.
    pub fn replace_raw_collection(&mut self, listings: Vec<Listing>) {
        self.ids = listings.iter().map(|l| l.id.clone()).collect();
        self.raw = listings;
        let ids = &self.ids;
        let pruned = self.selection.retain(|id| ids.contains(id));
        debug!(rows = self.raw.len(), pruned, "replaced raw collection");
        self.recompute();
    }

    /// Merge rescore results into every listing whose VIN is a key of
    /// `scores`; returns the number of listings updated.
    pub fn apply_rescore(&mut self, scores: &RescoreMap) -> usize {
        let mut updated = 0;
        for listing in &mut self.raw {
            let Some(rescore) = listing.vin.as_deref().and_then(|vin| scores.get(vin)) else {
                continue;
            };
            listing.score = Some(rescore.score);
            listing.buy_max = Some(rescore.buy_max);
            listing.reason_codes.clone_from(&rescore.reason_codes);
            updated += 1;
        }
        debug!(updated, results = scores.len(), "applied rescore");
        self.recompute();
        updated
    }

    fn recompute(&mut self) {
        let mut visible = self.criteria.matching_indices(&self.raw);
        sort::sort_indices(&self.raw, &mut visible, self.sort);
        self.visible = visible;
        self.pagination.clamp_to(self.visible.len());
        debug!(
            raw = self.raw.len(),
            filtered = self.visible.len(),
            sort = %self.sort.key,
            direction = %self.sort.direction,
            page = self.pagination.current_page,
            "recomputed listing view"
        );
    }
}
