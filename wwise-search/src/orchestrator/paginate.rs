//! Fixed-size windowed view over one source's merged results.
//!
//! Pagination is a pure function of `(items, current_page, PAGE_SIZE)`.
//! `current_page` is always clamped to `[1, total_pages()]`.

use crate::types::SearchResult;

/// Results per page, for every source.
pub const PAGE_SIZE: usize = 20;

/// Page state of a single source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    current_page: usize,
    items: Vec<SearchResult>,
}

/// What a source currently has to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageView<'a> {
    /// The last search matched nothing (or no search has run).
    NoResults,
    Page {
        page: usize,
        total_pages: usize,
        total_results: usize,
        items: &'a [SearchResult],
    },
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            current_page: 1,
            items: Vec::new(),
        }
    }
}

impl PageState {
    /// Page state for a fresh result set, positioned on page 1.
    pub fn new(items: Vec<SearchResult>) -> Self {
        Self {
            current_page: 1,
            items,
        }
    }

    /// Replace the result set wholesale and return to page 1.
    pub fn replace(&mut self, items: Vec<SearchResult>) {
        self.items = items;
        self.current_page = 1;
    }

    /// Drop all results.
    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }

    pub fn items(&self) -> &[SearchResult] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// `max(1, ceil(len / PAGE_SIZE))`
    pub fn total_pages(&self) -> usize {
        self.items.len().div_ceil(PAGE_SIZE).max(1)
    }

    /// Move to page `page`, clamped into the valid range. Returns the page
    /// actually selected.
    pub fn set_page(&mut self, page: i64) -> usize {
        let last = i64::try_from(self.total_pages()).unwrap_or(i64::MAX);
        let clamped = page.clamp(1, last);
        self.current_page = usize::try_from(clamped).unwrap_or(1);
        self.current_page
    }

    pub fn next_page(&mut self) -> usize {
        self.step(1)
    }

    pub fn prev_page(&mut self) -> usize {
        self.step(-1)
    }

    pub fn first_page(&mut self) -> usize {
        self.set_page(1)
    }

    pub fn last_page(&mut self) -> usize {
        self.set_page(i64::MAX)
    }

    fn step(&mut self, delta: i64) -> usize {
        let current = i64::try_from(self.current_page).unwrap_or(i64::MAX);
        self.set_page(current.saturating_add(delta))
    }

    /// Items on the current page.
    pub fn visible_window(&self) -> &[SearchResult] {
        let start = (self.current_page - 1) * PAGE_SIZE;
        let end = (self.current_page * PAGE_SIZE).min(self.items.len());
        self.items.get(start..end).unwrap_or(&[])
    }

    /// 0-based offset of the first visible item.
    pub fn window_offset(&self) -> usize {
        (self.current_page - 1) * PAGE_SIZE
    }

    pub fn view(&self) -> PageView<'_> {
        if self.items.is_empty() {
            return PageView::NoResults;
        }
        PageView::Page {
            page: self.current_page,
            total_pages: self.total_pages(),
            total_results: self.items.len(),
            items: self.visible_window(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<SearchResult> {
        (0..n)
            .map(|i| {
                let mut result = SearchResult::named(format!("obj{i}"), "Sound");
                result.guid = Some(format!("{{{i}}}"));
                result
            })
            .collect()
    }

    #[test]
    fn empty_state_has_one_page_and_no_results() {
        let state = PageState::default();
        assert_eq!(state.total_pages(), 1);
        assert_eq!(state.current_page(), 1);
        assert!(state.visible_window().is_empty());
        assert_eq!(state.view(), PageView::NoResults);
    }

    #[test]
    fn total_pages_is_ceiling() {
        for (len, pages) in [(1, 1), (19, 1), (20, 1), (21, 2), (40, 2), (41, 3), (205, 11)] {
            assert_eq!(PageState::new(items(len)).total_pages(), pages, "len {len}");
        }
    }

    #[test]
    fn window_lengths_for_every_valid_page() {
        for len in [1, 7, 20, 21, 45, 60] {
            let mut state = PageState::new(items(len));
            for page in 1..=state.total_pages() {
                state.set_page(page as i64);
                let expected = PAGE_SIZE.min(len - (page - 1) * PAGE_SIZE);
                assert_eq!(state.visible_window().len(), expected, "len {len} page {page}");
            }
        }
    }

    #[test]
    fn window_slices_in_merge_order() {
        let mut state = PageState::new(items(45));
        state.set_page(3);
        let names: Vec<_> = state.visible_window().iter().map(|r| r.name.clone()).collect();
        assert_eq!(names.first().map(String::as_str), Some("obj40"));
        assert_eq!(names.last().map(String::as_str), Some("obj44"));
        assert_eq!(state.window_offset(), 40);
    }

    #[test]
    fn set_page_clamps_low_and_high() {
        let mut state = PageState::new(items(45));
        assert_eq!(state.set_page(0), 1);
        assert_eq!(state.set_page(-5), 1);
        assert_eq!(state.set_page(4), 3);
        assert_eq!(state.set_page(i64::MAX), 3);
        assert_eq!(state.set_page(i64::MIN), 1);
        assert_eq!(state.set_page(2), 2);
    }

    #[test]
    fn navigation_helpers_clamp() {
        let mut state = PageState::new(items(30));
        assert_eq!(state.prev_page(), 1);
        assert_eq!(state.next_page(), 2);
        assert_eq!(state.next_page(), 2);
        assert_eq!(state.first_page(), 1);
        assert_eq!(state.last_page(), 2);
    }

    #[test]
    fn replace_resets_to_first_page() {
        let mut state = PageState::new(items(60));
        state.set_page(3);
        state.replace(items(5));
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.len(), 5);
    }

    #[test]
    fn clear_empties_state() {
        let mut state = PageState::new(items(5));
        state.clear();
        assert!(state.is_empty());
        assert_eq!(state.view(), PageView::NoResults);
    }

    #[test]
    fn view_reports_totals() {
        let mut state = PageState::new(items(25));
        state.next_page();
        match state.view() {
            PageView::Page {
                page,
                total_pages,
                total_results,
                items,
            } => {
                assert_eq!((page, total_pages, total_results), (2, 2, 25));
                assert_eq!(items.len(), 5);
            }
            PageView::NoResults => panic!("expected a page"),
        }
    }
}
