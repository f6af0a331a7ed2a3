// Paging domain model - page/size/count tracking for one result set
use serde::{Deserialize, Serialize};

/// Page sizes offered by the dashboard controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PageSize {
    Five,
    #[default]
    Ten,
    Twenty,
    Fifty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("page size {0} is not one of 5, 10, 20 or 50")]
pub struct InvalidPageSize(pub u32);

impl PageSize {
    pub const ALL: [PageSize; 4] = [
        PageSize::Five,
        PageSize::Ten,
        PageSize::Twenty,
        PageSize::Fifty,
    ];

    pub fn get(self) -> u32 {
        match self {
            PageSize::Five => 5,
            PageSize::Ten => 10,
            PageSize::Twenty => 20,
            PageSize::Fifty => 50,
        }
    }
}

impl TryFrom<u32> for PageSize {
    type Error = InvalidPageSize;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        PageSize::ALL
            .into_iter()
            .find(|size| size.get() == value)
            .ok_or(InvalidPageSize(value))
    }
}

impl From<PageSize> for u32 {
    fn from(size: PageSize) -> Self {
        size.get()
    }
}

/// Pagination state for one logical result set.
///
/// `page` always stays within `[1, total_pages()]`. The total count is
/// whatever the server last reported and may lag local changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedQueryState {
    page: u32,
    size: PageSize,
    total_count: u64,
}

impl Default for PagedQueryState {
    fn default() -> Self {
        Self::new(PageSize::default())
    }
}

impl PagedQueryState {
    pub fn new(size: PageSize) -> Self {
        Self {
            page: 1,
            size,
            total_count: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> PageSize {
        self.size
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// `ceil(total_count / size)`, never less than 1
    pub fn total_pages(&self) -> u32 {
        let pages = self.total_count.div_ceil(u64::from(self.size.get())).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Moves to `requested`, clamped into range. Returns true when the
    /// current page changed and a refetch is due.
    pub fn set_page(&mut self, requested: u32) -> bool {
        let target = requested.clamp(1, self.total_pages());
        if target == self.page {
            return false;
        }
        self.page = target;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> bool {
        self.set_page(self.page.saturating_sub(1))
    }

    /// Changing density invalidates the old offset, so the page always
    /// returns to 1. Callers must always refetch afterwards.
    pub fn set_size(&mut self, size: PageSize) {
        self.size = size;
        self.page = 1;
    }

    pub fn reset_page(&mut self) {
        self.page = 1;
    }

    /// Records the server-reported count. Returns true when the current
    /// page fell out of range and was clamped, meaning the page on screen
    /// was fetched for an offset that no longer exists.
    pub fn apply_server_count(&mut self, count: u64) -> bool {
        self.total_count = count;
        let total_pages = self.total_pages();
        if self.page > total_pages {
            self.page = total_pages;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn state_with(count: u64, size: PageSize) -> PagedQueryState {
        let mut state = PagedQueryState::new(size);
        state.apply_server_count(count);
        state
    }

    #[test]
    fn test_total_pages_floor_is_one() {
        let state = state_with(0, PageSize::Ten);
        assert_eq!(state.total_pages(), 1);
        assert!(!state.has_next());
        assert!(!state.has_previous());
    }

    #[test]
    fn test_set_page_past_end_clamps_to_last_page() {
        let mut state = state_with(23, PageSize::Ten);
        assert_eq!(state.total_pages(), 3);

        assert!(state.set_page(4));
        assert_eq!(state.page(), 3);

        // Already on the last page, so nothing changes and no refetch
        assert!(!state.set_page(9));
        assert_eq!(state.page(), 3);
    }

    #[test]
    fn test_set_page_zero_clamps_to_first_page() {
        let mut state = state_with(23, PageSize::Ten);
        state.set_page(2);
        assert!(state.set_page(0));
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_set_size_resets_page() {
        let mut state = state_with(100, PageSize::Ten);
        state.set_page(7);
        state.set_size(PageSize::Twenty);
        assert_eq!(state.page(), 1);
        assert_eq!(state.total_pages(), 5);
    }

    #[test]
    fn test_shrinking_count_clamps_and_requests_refetch() {
        let mut state = state_with(50, PageSize::Ten);
        state.set_page(5);

        assert!(state.apply_server_count(31));
        assert_eq!(state.page(), 4);

        assert!(!state.apply_server_count(40));
        assert_eq!(state.page(), 4);
    }

    #[test]
    fn test_next_and_previous_stop_at_bounds() {
        let mut state = state_with(15, PageSize::Five);
        assert!(!state.previous_page());
        assert!(state.next_page());
        assert!(state.next_page());
        assert!(!state.next_page());
        assert_eq!(state.page(), 3);
        assert!(state.previous_page());
        assert_eq!(state.page(), 2);
    }

    #[test]
    fn test_page_size_conversion() {
        assert_eq!(PageSize::try_from(20), Ok(PageSize::Twenty));
        assert_eq!(PageSize::try_from(7), Err(InvalidPageSize(7)));
        assert_eq!(serde_json::to_string(&PageSize::Fifty).unwrap(), "50");
        assert!(serde_json::from_str::<PageSize>("25").is_err());
    }

    #[derive(Debug, Clone)]
    enum Op {
        SetPage(u32),
        ServerCount(u64),
        Size(PageSize),
    }

    fn page_size() -> impl Strategy<Value = PageSize> {
        prop::sample::select(PageSize::ALL.to_vec())
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u32..40).prop_map(Op::SetPage),
            (0u64..400).prop_map(Op::ServerCount),
            page_size().prop_map(Op::Size),
        ]
    }

    proptest! {
        #[test]
        fn prop_total_pages_formula(count in 0u64..10_000, size in page_size()) {
            let mut state = state_with(count, size);
            let expected = count.div_ceil(u64::from(size.get())).max(1);
            prop_assert_eq!(u64::from(state.total_pages()), expected);

            state.set_size(size);
            prop_assert_eq!(state.page(), 1);
        }

        #[test]
        fn prop_page_stays_in_range(ops in prop::collection::vec(op(), 0..60)) {
            let mut state = PagedQueryState::default();
            for op in ops {
                match op {
                    Op::SetPage(page) => { state.set_page(page); }
                    Op::ServerCount(count) => { state.apply_server_count(count); }
                    Op::Size(size) => state.set_size(size),
                }
                prop_assert!(state.page() >= 1);
                prop_assert!(state.page() <= state.total_pages());
            }
        }
    }
}
