//! Page-button layout for list views.
//!
//! Given the current and last page, decides which page numbers get a button and where
//! the gaps (rendered as an ellipsis) fall. The first, current and last page always get
//! a button.

use std::collections::BTreeSet;

use crate::dto::PageMeta;

pub const DEFAULT_MAX_WINDOW: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlot {
    pub page: i64,
    /// Pages were skipped between the previous slot and this one.
    pub ellipsis_before: bool,
}

/// Page numbers to render, ascending.
///
/// Empty when there is at most one page. With `fixed_start` the window is always
/// `1..=max_window`; otherwise it is centred on `current` and shifted, not shrunk, at
/// either edge.
pub fn window(current: i64, last: i64, max_window: i64, fixed_start: bool) -> Vec<PageSlot> {
    if last <= 1 {
        return Vec::new();
    }

    let size = max_window.max(1);
    let (start, end) = if fixed_start {
        (1, last.min(size))
    } else {
        let start = current.saturating_sub(size / 2).max(1);
        let end = last.min(start.saturating_add(size - 1));
        ((end - size + 1).max(1), end)
    };

    let mut pages: BTreeSet<i64> = (start..=end).collect();
    pages.extend([1, current, last]);

    let mut previous: Option<i64> = None;
    pages
        .into_iter()
        .filter(|p| (1..=last).contains(p))
        .map(|page| {
            let slot = PageSlot {
                page,
                ellipsis_before: previous.is_some_and(|prev| page - prev > 1),
            };
            previous = Some(page);
            slot
        })
        .collect()
}

/// Pagination control state: page buttons plus previous/next affordances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    current: i64,
    last: i64,
    slots: Vec<PageSlot>,
}

impl Pagination {
    pub fn new(current: i64, last: i64) -> Self {
        Self::with_window(current, last, DEFAULT_MAX_WINDOW, false)
    }

    pub fn with_window(current: i64, last: i64, max_window: i64, fixed_start: bool) -> Self {
        Self {
            current,
            last,
            slots: window(current, last, max_window, fixed_start),
        }
    }

    pub fn slots(&self) -> &[PageSlot] {
        &self.slots
    }

    /// Whether the control is rendered at all.
    pub fn is_visible(&self) -> bool {
        !self.slots.is_empty()
    }

    pub const fn is_current(&self, page: i64) -> bool {
        page == self.current
    }

    pub const fn previous_disabled(&self) -> bool {
        self.current <= 1
    }

    pub const fn next_disabled(&self) -> bool {
        self.current >= self.last
    }

    /// Page to navigate to when `page` is clicked.
    pub fn target(&self, page: i64) -> i64 {
        page.clamp(1, self.last.max(1))
    }

    pub fn previous_target(&self) -> i64 {
        self.target(self.current.saturating_sub(1))
    }

    pub fn next_target(&self) -> i64 {
        self.target(self.current.saturating_add(1))
    }
}

impl From<&PageMeta> for Pagination {
    fn from(meta: &PageMeta) -> Self {
        Self::new(meta.current_page, meta.last_page)
    }
}
