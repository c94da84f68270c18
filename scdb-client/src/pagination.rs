//! Pagination utilities for the admin paper list

/// Default admin list page size
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Pages shown on either side of the current page
const WINDOW_RADIUS: u64 = 2;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: u64,
    /// Total number of pages
    pub total_pages: u64,
    /// Offset for the backend `offset` parameter
    pub offset: u64,
    pub page_size: u32,
}

/// One entry of a page selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page(u64),
    Ellipsis,
}

/// Calculate pagination metadata from total results and requested page
///
/// The page is clamped into `[1, total_pages]`; a zero page size is treated
/// as one.
///
/// # Examples
/// ```
/// use scdb_client::pagination::calculate_pagination;
///
/// // 45 results at 20 per page = 3 pages
/// let p = calculate_pagination(45, 2, 20);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 20);
///
/// // Requesting out-of-bounds page gets clamped
/// let p = calculate_pagination(45, 99, 20);
/// assert_eq!(p.page, 3);
/// assert_eq!(p.offset, 40);
/// ```
pub fn calculate_pagination(total_results: u64, requested_page: u64, page_size: u32) -> Pagination {
    let page_size = page_size.max(1);
    let size = u64::from(page_size);
    let total_pages = total_results.div_ceil(size);
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * size;

    Pagination {
        page,
        total_pages,
        offset,
        page_size,
    }
}

impl Pagination {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// First, last and current±2 pages; a gap at current±3 becomes an ellipsis
    ///
    /// Empty when everything fits on one page.
    pub fn page_window(&self) -> Vec<PageLink> {
        if self.total_pages <= 1 {
            return Vec::new();
        }

        let low = self.page.saturating_sub(WINDOW_RADIUS);
        let high = self.page + WINDOW_RADIUS;

        let mut links = Vec::new();
        for p in 1..=self.total_pages {
            if p == 1 || p == self.total_pages || (p >= low && p <= high) {
                links.push(PageLink::Page(p));
            } else if p + WINDOW_RADIUS + 1 == self.page || p == high + 1 {
                links.push(PageLink::Ellipsis);
            }
        }
        links
    }
}
