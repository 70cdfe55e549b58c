//! Page slicing, page clamping and the pager's page-button window.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Rows per page used when nothing else is configured.
pub const DEFAULT_ROWS_PER_PAGE: NonZeroUsize = match NonZeroUsize::new(25) {
    Some(n) => n,
    None => unreachable!(),
};

/// Current page (1-based) and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: usize,
    pub rows_per_page: NonZeroUsize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
        }
    }
}

impl Pagination {
    #[must_use]
    pub const fn new(rows_per_page: NonZeroUsize) -> Self {
        Self {
            current_page: 1,
            rows_per_page,
        }
    }

    /// Clamp `current_page` into `[1, total_pages(row_count)]`.
    pub fn clamp_to(&mut self, row_count: usize) {
        let last = total_pages(row_count, self.rows_per_page);
        self.current_page = self.current_page.clamp(1, last);
    }
}

/// `max(1, ceil(row_count / rows_per_page))`.
#[must_use]
pub const fn total_pages(row_count: usize, rows_per_page: NonZeroUsize) -> usize {
    let pages = row_count.div_ceil(rows_per_page.get());
    if pages == 0 { 1 } else { pages }
}

/// The rows of 1-based `page`; empty when the page lies past the end.
#[must_use]
pub fn paginate<T>(rows: &[T], page: usize, rows_per_page: NonZeroUsize) -> &[T] {
    let per = rows_per_page.get();
    let start = page.saturating_sub(1).saturating_mul(per).min(rows.len());
    let end = start.saturating_add(per).min(rows.len());
    &rows[start..end]
}

/// 1-based inclusive `(first, last)` row numbers shown on `page`, or
/// `(0, 0)` when there are no rows.
#[must_use]
pub fn row_range(page: usize, rows_per_page: NonZeroUsize, row_count: usize) -> (usize, usize) {
    if row_count == 0 {
        return (0, 0);
    }
    let per = rows_per_page.get();
    let first = page.saturating_sub(1).saturating_mul(per).saturating_add(1);
    let last = page.saturating_mul(per).min(row_count);
    (first.min(row_count), last)
}

/// One button of the pager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "page")]
pub enum PageMarker {
    Page(usize),
    Gap,
}

/// Pager buttons for `current` of `total` pages.
///
/// The first page, the last page and `current ± 1` are shown; a page at
/// exactly `current ± 2` that is not otherwise shown collapses into a gap.
#[must_use]
pub fn page_window(current: usize, total: usize) -> Vec<PageMarker> {
    let total = total.max(1);
    let current = current.clamp(1, total);
    (1..=total)
        .filter_map(|page| {
            if page == 1 || page == total || page.abs_diff(current) <= 1 {
                Some(PageMarker::Page(page))
            } else if page.abs_diff(current) == 2 {
                Some(PageMarker::Gap)
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn per(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).expect("non-zero")
    }

    #[test]
    fn total_pages_is_at_least_one() {
        assert_eq!(total_pages(0, per(10)), 1);
        assert_eq!(total_pages(10, per(10)), 1);
        assert_eq!(total_pages(11, per(10)), 2);
        assert_eq!(total_pages(3, per(2)), 2);
    }

    #[test]
    fn paginate_slices_pages() {
        let rows = [1, 2, 3, 4, 5];
        assert_eq!(paginate(&rows, 1, per(2)), &[1, 2]);
        assert_eq!(paginate(&rows, 3, per(2)), &[5]);
        assert!(paginate(&rows, 4, per(2)).is_empty());
        assert_eq!(paginate(&rows, 0, per(2)), &[1, 2]);
    }

    #[test]
    fn clamp_pulls_page_back_into_range() {
        let mut pagination = Pagination {
            current_page: 7,
            rows_per_page: per(10),
        };
        pagination.clamp_to(25);
        assert_eq!(pagination.current_page, 3);
        pagination.clamp_to(0);
        assert_eq!(pagination.current_page, 1);
    }

    #[test]
    fn row_range_matches_pager_label() {
        assert_eq!(row_range(1, per(25), 60), (1, 25));
        assert_eq!(row_range(3, per(25), 60), (51, 60));
        assert_eq!(row_range(1, per(25), 0), (0, 0));
    }

    #[test]
    fn page_window_small_total_shows_every_page() {
        assert_eq!(
            page_window(2, 3),
            vec![PageMarker::Page(1), PageMarker::Page(2), PageMarker::Page(3)]
        );
        assert_eq!(page_window(1, 0), vec![PageMarker::Page(1)]);
    }

    #[test]
    fn page_window_collapses_distant_pages() {
        assert_eq!(
            page_window(5, 10),
            vec![
                PageMarker::Page(1),
                PageMarker::Gap,
                PageMarker::Page(4),
                PageMarker::Page(5),
                PageMarker::Page(6),
                PageMarker::Gap,
                PageMarker::Page(10),
            ]
        );
        assert_eq!(
            page_window(1, 6),
            vec![
                PageMarker::Page(1),
                PageMarker::Page(2),
                PageMarker::Gap,
                PageMarker::Page(6),
            ]
        );
    }
}
