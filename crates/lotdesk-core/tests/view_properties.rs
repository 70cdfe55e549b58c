//! Property tests for the listing view-model derivations.
//!
//! Covers: filter identity and conjunction, sort stability and the
//! missing-last rule, header toggling, page coverage and clamping, and the
//! selection scope/pruning rules.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::num::NonZeroUsize;

use lotdesk_core::model::Listing;
use lotdesk_core::view::sort::{compare_values, sort_value};
use lotdesk_core::view::{
    FilterCriteria, ListingViewModel, SortConfig, SortDirection, SortValue, StatusFilter,
    filter_listings, paginate, sort_listings, total_pages,
};
use proptest::prelude::*;

use generators::*;

fn ids<'a>(rows: impl IntoIterator<Item = &'a Listing>) -> Vec<String> {
    rows.into_iter().map(|l| l.id.clone()).collect()
}

fn position(id: &str) -> usize {
    id.parse().unwrap_or(usize::MAX)
}

/// Independent statement of each filter clause.
fn satisfies(listing: &Listing, criteria: &FilterCriteria) -> bool {
    let term = criteria.search_term.to_lowercase();
    let search_ok = term.is_empty()
        || [
            Some(listing.make.clone()),
            Some(listing.model.clone()),
            listing.vin.clone(),
            listing.location.clone(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&term));

    let status = listing
        .decision
        .as_ref()
        .and_then(|d| d.status.clone())
        .unwrap_or_default();
    let status_ok = match criteria.status {
        StatusFilter::Any => true,
        StatusFilter::Scored => listing.score.is_some(),
        StatusFilter::Pending => listing.score.is_none(),
        StatusFilter::Decided => !status.is_empty(),
        StatusFilter::Undecided => status.is_empty(),
    };

    let make_ok =
        criteria.make.is_empty() || listing.make.to_lowercase() == criteria.make.to_lowercase();

    search_ok && status_ok && make_ok
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(512))]

    #[test]
    fn filter_with_empty_criteria_is_identity(listings in arb_listings(40)) {
        let filtered = filter_listings(&listings, &FilterCriteria::default());
        prop_assert_eq!(ids(filtered), ids(&listings));
    }

    #[test]
    fn filter_is_conjunction_of_clauses(listings in arb_listings(40), criteria in arb_criteria()) {
        let filtered: HashSet<String> = ids(filter_listings(&listings, &criteria)).into_iter().collect();
        for listing in &listings {
            prop_assert_eq!(
                filtered.contains(&listing.id),
                satisfies(listing, &criteria),
                "listing {} under {:?}", listing.id, criteria
            );
        }
        // stable: passing rows keep input order
        let ordered = ids(filter_listings(&listings, &criteria));
        let mut sorted = ordered.clone();
        sorted.sort_by_key(|id| position(id));
        prop_assert_eq!(ordered, sorted);
    }

    #[test]
    fn sort_is_stable_for_equal_values(
        listings in arb_listings(40),
        key in arb_sort_key(),
        descending in any::<bool>(),
    ) {
        let direction = if descending { SortDirection::Desc } else { SortDirection::Asc };
        let mut rows: Vec<&Listing> = listings.iter().collect();
        sort_listings(&mut rows, SortConfig::new(key, direction));

        for pair in rows.windows(2) {
            let a = sort_value(pair[0], key);
            let b = sort_value(pair[1], key);
            let ord = compare_values(&a, &b, direction);
            prop_assert_ne!(ord, Ordering::Greater, "adjacent rows out of order");
            if ord == Ordering::Equal && !matches!((&a, &b), (SortValue::Number(_), SortValue::Text(_)) | (SortValue::Text(_), SortValue::Number(_))) {
                prop_assert!(position(&pair[0].id) < position(&pair[1].id));
            }
        }
    }

    #[test]
    fn missing_values_sort_after_present_values(
        listings in arb_listings(40),
        key in arb_sort_key(),
        descending in any::<bool>(),
    ) {
        let direction = if descending { SortDirection::Desc } else { SortDirection::Asc };
        let mut rows: Vec<&Listing> = listings.iter().collect();
        sort_listings(&mut rows, SortConfig::new(key, direction));

        let first_missing = rows
            .iter()
            .position(|l| sort_value(l, key) == SortValue::Missing)
            .unwrap_or(rows.len());
        for row in &rows[first_missing..] {
            prop_assert_eq!(sort_value(row, key), SortValue::Missing);
        }
    }

    #[test]
    fn set_sort_toggles_between_directions(key in arb_sort_key(), other in arb_sort_key()) {
        prop_assume!(key != other);
        let mut vm = ListingViewModel::default();
        vm.set_sort(other);
        vm.set_sort(key);
        prop_assert_eq!(vm.sort().direction, SortDirection::Asc);
        vm.set_sort(key);
        prop_assert_eq!(vm.sort().direction, SortDirection::Desc);
        vm.set_sort(key);
        prop_assert_eq!(vm.sort().direction, SortDirection::Asc);
    }

    #[test]
    fn pages_concatenate_to_sorted_view(listings in arb_listings(60), per in 1usize..12) {
        let per = NonZeroUsize::new(per).expect("non-zero");
        let pages = total_pages(listings.len(), per);
        let mut rebuilt = Vec::new();
        for page in 1..=pages {
            rebuilt.extend(paginate(&listings, page, per).iter().cloned());
        }
        prop_assert_eq!(ids(&rebuilt), ids(&listings));
        prop_assert!(paginate(&listings, pages + 1, per).is_empty());
    }

    #[test]
    fn view_pages_cover_filtered_rows(
        listings in arb_listings(60),
        criteria in arb_criteria(),
        per in 1usize..12,
    ) {
        let mut vm = ListingViewModel::new(listings);
        vm.set_criteria(criteria);
        vm.set_rows_per_page(per).expect("valid rows");
        let mut rebuilt = Vec::new();
        for page in 1..=vm.total_pages() {
            rebuilt.extend(ids(vm.sorted_slice(page)));
        }
        prop_assert_eq!(rebuilt, ids(vm.visible_rows()));
    }

    #[test]
    fn current_page_is_clamped_after_shrinking(
        listings in arb_listings(60),
        criteria in arb_criteria(),
        page in 1usize..80,
        per in 1usize..6,
        bigger in 6usize..30,
    ) {
        let mut vm = ListingViewModel::new(listings);
        vm.set_rows_per_page(per).expect("valid rows");
        vm.set_page(page);
        prop_assert!(vm.current_page() >= 1 && vm.current_page() <= vm.total_pages());

        vm.set_rows_per_page(bigger).expect("valid rows");
        prop_assert!(vm.current_page() >= 1 && vm.current_page() <= vm.total_pages());

        vm.set_criteria(criteria);
        prop_assert!(vm.current_page() >= 1 && vm.current_page() <= vm.total_pages());
        if vm.filtered_count() > 0 {
            prop_assert!(!vm.page_rows().is_empty());
        }
    }

    #[test]
    fn select_all_covers_filtered_set(
        listings in arb_listings(40),
        criteria in arb_criteria(),
        narrower in arb_criteria(),
    ) {
        let mut vm = ListingViewModel::new(listings);
        vm.set_rows_per_page(3).expect("valid rows");
        vm.set_criteria(criteria);
        vm.select_all(true);

        let visible = ids(vm.visible_rows());
        let mut selected: Vec<String> = vm.selected_ids().into_iter().map(str::to_string).collect();
        let mut expected = visible.clone();
        expected.sort();
        selected.sort();
        prop_assert_eq!(&selected, &expected);
        prop_assert_eq!(vm.is_all_selected(), !visible.is_empty());

        vm.set_criteria(narrower);
        let still_visible: HashSet<String> = ids(vm.visible_rows()).into_iter().collect();
        let now: HashSet<String> = vm.selected_ids().into_iter().map(str::to_string).collect();
        for id in visible.iter().filter(|id| still_visible.contains(*id)) {
            prop_assert!(now.contains(id));
        }
    }

    #[test]
    fn replace_prunes_selection_to_new_ids(
        first in arb_listings(30),
        second in arb_listings(30),
    ) {
        let mut vm = ListingViewModel::new(first);
        vm.select_all(true);
        vm.replace_raw_collection(second.clone());
        let new_ids: HashSet<String> = ids(&second).into_iter().collect();
        for id in vm.selected_ids() {
            prop_assert!(new_ids.contains(id));
        }
    }
}
