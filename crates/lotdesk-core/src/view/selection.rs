//! Row selection, kept independent of filtering and pagination.

use std::collections::HashSet;

/// A set of selected listing ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: HashSet<String>,
}

impl SelectionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Add or remove one id.
    pub fn toggle(&mut self, id: &str, selected: bool) {
        if selected {
            self.ids.insert(id.to_string());
        } else {
            self.ids.remove(id);
        }
    }

    /// Replace the selection with `visible` (when `selected`) or clear it.
    pub fn select_all<'a>(&mut self, selected: bool, visible: impl IntoIterator<Item = &'a str>) {
        self.ids.clear();
        if selected {
            self.ids.extend(visible.into_iter().map(str::to_string));
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop every id for which `keep` returns false; returns how many went.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| keep(id));
        before - self.ids.len()
    }

    /// True iff `visible` is non-empty and every id in it is selected.
    #[must_use]
    pub fn is_all_selected<'a>(&self, visible: impl IntoIterator<Item = &'a str>) -> bool {
        let mut any = false;
        for id in visible {
            any = true;
            if !self.ids.contains(id) {
                return false;
            }
        }
        any
    }

    /// True iff the selection is non-empty and a strict subset of `visible`.
    #[must_use]
    pub fn is_indeterminate<'a>(&self, visible: impl IntoIterator<Item = &'a str>) -> bool {
        if self.ids.is_empty() {
            return false;
        }
        let visible: HashSet<&str> = visible.into_iter().collect();
        self.ids.len() < visible.len() && self.ids.iter().all(|id| visible.contains(id.as_str()))
    }

    /// Selected ids in ascending order.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.ids.iter().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
