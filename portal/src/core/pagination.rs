//! Page index and total-page estimation.
//!
//! List endpoints return a bare page of items with no total count, so the
//! number of pages is inferred from how full the last fetched page was. The
//! estimate is recomputed from every fetch result and never adjusted on its own.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Pagination controls with more pages than this collapse into ellipses.
const MAX_UNCOLLAPSED_PAGES: u32 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    /// 1-based.
    pub current_page: u32,
    pub page_size: u32,
    /// Best-effort, never below `current_page`. A step back from an empty
    /// page moves both to the previous page together.
    pub estimated_total_pages: u32,
}

impl PaginationState {
    pub fn new(page_size: u32) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
            estimated_total_pages: 1,
        }
    }

    /// Back to the first page; the estimate is unknown until the next fetch.
    pub fn reset(&mut self) {
        self.current_page = 1;
        self.estimated_total_pages = 1;
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.estimated_total_pages
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// Estimate derived from one fetched page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageEstimate {
    pub estimated_total_pages: u32,
    /// Set when the fetched page was empty and not the first: the caller must
    /// move to this page instead of showing an empty one.
    pub step_back_to: Option<u32>,
}

/// Infer the page count from `returned` items on `current_page`.
pub fn estimate_total_pages(current_page: u32, page_size: u32, returned: usize) -> PageEstimate {
    let current_page = current_page.max(1);
    if returned == 0 {
        if current_page > 1 {
            let previous = current_page - 1;
            return PageEstimate {
                estimated_total_pages: previous,
                step_back_to: Some(previous),
            };
        }
        return PageEstimate {
            estimated_total_pages: 1,
            step_back_to: None,
        };
    }
    let full = returned >= page_size as usize;
    PageEstimate {
        estimated_total_pages: if full { current_page + 1 } else { current_page },
        step_back_to: None,
    }
}

/// One slot in the pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

/// Page buttons to show for `current` of `total` pages.
///
/// Up to seven pages are listed in full. Beyond that the first and last pages
/// stay visible and the current neighbourhood is bracketed by ellipses.
pub fn page_items(current: u32, total: u32) -> Vec<PageItem> {
    if total <= MAX_UNCOLLAPSED_PAGES {
        return (1..=total).map(PageItem::Page).collect();
    }
    let mut items = Vec::with_capacity(MAX_UNCOLLAPSED_PAGES as usize);
    if current <= 4 {
        items.extend((1..=5).map(PageItem::Page));
        items.push(PageItem::Ellipsis);
        items.push(PageItem::Page(total));
    } else if current >= total - 3 {
        items.push(PageItem::Page(1));
        items.push(PageItem::Ellipsis);
        items.extend((total - 4..=total).map(PageItem::Page));
    } else {
        items.push(PageItem::Page(1));
        items.push(PageItem::Ellipsis);
        items.extend((current - 1..=current + 1).map(PageItem::Page));
        items.push(PageItem::Ellipsis);
        items.push(PageItem::Page(total));
    }
    items
}

/// Render model for the pagination control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    /// Hidden when there are fewer than two pages.
    pub visible: bool,
    pub current_page: u32,
    pub previous_enabled: bool,
    pub next_enabled: bool,
    pub items: Vec<PageItem>,
}

impl PaginationView {
    pub fn new(state: &PaginationState, loading: bool) -> Self {
        let total = state.estimated_total_pages.max(state.current_page);
        let visible = total > 1;
        Self {
            visible,
            current_page: state.current_page,
            previous_enabled: state.has_previous() && !loading,
            next_enabled: state.has_next() && !loading,
            items: if visible {
                page_items(state.current_page, total)
            } else {
                Vec::new()
            },
        }
    }

    /// Single-line text form, e.g. `‹ 1 [2] 3 … 9 ›`.
    pub fn render_line(&self) -> String {
        let mut parts = Vec::with_capacity(self.items.len() + 2);
        parts.push(if self.previous_enabled { "‹" } else { " " }.to_string());
        for item in &self.items {
            parts.push(match item {
                PageItem::Page(page) if *page == self.current_page => format!("[{page}]"),
                PageItem::Page(page) => page.to_string(),
                PageItem::Ellipsis => "…".to_string(),
            });
        }
        parts.push(if self.next_enabled { "›" } else { " " }.to_string());
        parts.join(" ").trim().to_string()
    }
}
