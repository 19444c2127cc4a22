//! Paginated response envelope and page-number navigation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Page sizes offered by list tables
pub const TABLE_PAGE_SIZES: &[u32] = &[5, 10, 20, 50];

/// Page sizes offered by card grids
pub const GRID_PAGE_SIZES: &[u32] = &[8, 12, 16, 24];

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Number of contiguous page buttons shown around the current page
pub const PAGE_WINDOW: u32 = 5;

/// Pagination metadata returned by list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub current_page: u32,
    pub items_per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

/// `{ items, meta }` envelope returned by list endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> PaginatedResponse<T> {
    /// Check the envelope invariants
    ///
    /// `items` never exceeds `itemsPerPage`, and when there is anything to
    /// show the current page lies within `[1, totalPages]`.
    pub fn check(&self) -> Result<(), String> {
        let meta = &self.meta;
        if self.items.len() as u64 > meta.items_per_page as u64 {
            return Err(format!(
                "page holds {} items but itemsPerPage is {}",
                self.items.len(),
                meta.items_per_page
            ));
        }
        if meta.total_items > 0 && (meta.current_page < 1 || meta.current_page > meta.total_pages)
        {
            return Err(format!(
                "currentPage {} is outside 1..={}",
                meta.current_page, meta.total_pages
            ));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.meta.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.meta.current_page < self.meta.total_pages
    }

    /// 1-based range of items shown on this page, e.g. `(11, 20)`
    pub fn range(&self) -> Option<(u64, u64)> {
        if self.meta.total_items == 0 || self.items.is_empty() {
            return None;
        }
        let per_page = self.meta.items_per_page as u64;
        let start = (self.meta.current_page.max(1) as u64 - 1) * per_page + 1;
        let end = (self.meta.current_page as u64 * per_page).min(self.meta.total_items);
        Some((start, end))
    }

    /// "Showing 11 - 20 of 42 products"
    pub fn summary(&self, noun_plural: &str) -> String {
        match self.range() {
            Some((start, end)) => format!(
                "Showing {} - {} of {} {}",
                start, end, self.meta.total_items, noun_plural
            ),
            None => format!("No {} found", noun_plural),
        }
    }
}

/// Optional `page` / `limit` query parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PaginationParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PaginationParams {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    /// Query pairs for the parameters that are set
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

/// One entry in the page-number strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page { number: u32, current: bool },
    Ellipsis,
}

impl PageLink {
    /// Button label: the page number or "…"
    pub fn label(&self) -> String {
        match self {
            PageLink::Page { number, .. } => number.to_string(),
            PageLink::Ellipsis => "…".to_string(),
        }
    }

    /// Target page when clicked
    pub fn target(&self) -> Option<u32> {
        match self {
            PageLink::Page { number, .. } => Some(*number),
            PageLink::Ellipsis => None,
        }
    }
}

impl fmt::Display for PageLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageLink::Page { number, current: true } => write!(f, "[{}]", number),
            PageLink::Page { number, .. } => write!(f, "{}", number),
            PageLink::Ellipsis => write!(f, "…"),
        }
    }
}

/// Page-number strip for `current` of `total` pages
///
/// Shows up to `max_visible` contiguous pages centred on the current page,
/// shifted to stay within `[1, total]`. The first page is prepended when
/// the window does not start at 1 (with an ellipsis if the window starts
/// beyond 2), and the last page appended likewise.
pub fn page_window(current: u32, total: u32, max_visible: u32) -> Vec<PageLink> {
    if total == 0 || max_visible == 0 {
        return Vec::new();
    }
    let current = current.clamp(1, total);

    let mut start = current.saturating_sub(max_visible / 2).max(1);
    let end = (start + max_visible - 1).min(total);
    if end - start + 1 < max_visible {
        start = (end + 1).saturating_sub(max_visible).max(1);
    }

    let mut links = Vec::new();
    if start > 1 {
        links.push(PageLink::Page {
            number: 1,
            current: false,
        });
        if start > 2 {
            links.push(PageLink::Ellipsis);
        }
    }

    for number in start..=end {
        links.push(PageLink::Page {
            number,
            current: number == current,
        });
    }

    if end < total {
        if end < total - 1 {
            links.push(PageLink::Ellipsis);
        }
        links.push(PageLink::Page {
            number: total,
            current: false,
        });
    }

    links
}

/// Render a strip as a single line, e.g. `1 … 4 5 [6] 7 8 … 20`
pub fn render_window(links: &[PageLink]) -> String {
    links
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(links: &[PageLink]) -> Vec<String> {
        links.iter().map(|l| l.label()).collect()
    }

    fn envelope(items: usize, meta: PageMeta) -> PaginatedResponse<u32> {
        PaginatedResponse {
            items: (0..items as u32).collect(),
            meta,
        }
    }

    #[test]
    fn test_window_middle() {
        let links = page_window(6, 20, PAGE_WINDOW);
        assert_eq!(
            labels(&links),
            vec!["1", "…", "4", "5", "6", "7", "8", "…", "20"]
        );
        assert_eq!(render_window(&links), "1 … 4 5 [6] 7 8 … 20");
    }

    #[test]
    fn test_window_start() {
        assert_eq!(
            labels(&page_window(1, 20, 5)),
            vec!["1", "2", "3", "4", "5", "…", "20"]
        );
        assert_eq!(
            labels(&page_window(3, 20, 5)),
            vec!["1", "2", "3", "4", "5", "…", "20"]
        );
    }

    #[test]
    fn test_window_near_start_no_ellipsis() {
        // Window 2..=6: page 1 shown without an ellipsis
        assert_eq!(
            labels(&page_window(4, 20, 5)),
            vec!["1", "2", "3", "4", "5", "6", "…", "20"]
        );
    }

    #[test]
    fn test_window_end_shifts_left() {
        assert_eq!(
            labels(&page_window(20, 20, 5)),
            vec!["1", "…", "16", "17", "18", "19", "20"]
        );
        assert_eq!(
            labels(&page_window(18, 20, 5)),
            vec!["1", "…", "16", "17", "18", "19", "20"]
        );
    }

    #[test]
    fn test_window_near_end_no_ellipsis() {
        // Window 15..=19: last page follows directly
        assert_eq!(
            labels(&page_window(17, 20, 5)),
            vec!["1", "…", "15", "16", "17", "18", "19", "20"]
        );
    }

    #[test]
    fn test_window_few_pages() {
        assert_eq!(labels(&page_window(2, 3, 5)), vec!["1", "2", "3"]);
        assert_eq!(labels(&page_window(1, 1, 5)), vec!["1"]);
        assert!(page_window(1, 0, 5).is_empty());
    }

    #[test]
    fn test_window_marks_current_and_clamps() {
        let links = page_window(99, 4, 5);
        assert_eq!(
            links.last(),
            Some(&PageLink::Page {
                number: 4,
                current: true
            })
        );
        assert_eq!(PageLink::Ellipsis.target(), None);
    }

    #[test]
    fn test_envelope_invariants() {
        let ok = envelope(
            10,
            PageMeta {
                current_page: 2,
                items_per_page: 10,
                total_items: 42,
                total_pages: 5,
            },
        );
        assert!(ok.check().is_ok());

        let too_many = envelope(
            11,
            PageMeta {
                current_page: 1,
                items_per_page: 10,
                total_items: 42,
                total_pages: 5,
            },
        );
        assert!(too_many.check().is_err());

        let out_of_range = envelope(
            0,
            PageMeta {
                current_page: 6,
                items_per_page: 10,
                total_items: 42,
                total_pages: 5,
            },
        );
        assert!(out_of_range.check().is_err());

        let empty = envelope(
            0,
            PageMeta {
                current_page: 1,
                items_per_page: 10,
                total_items: 0,
                total_pages: 0,
            },
        );
        assert!(empty.check().is_ok());
    }

    #[test]
    fn test_range_and_summary() {
        let last_page = envelope(
            2,
            PageMeta {
                current_page: 5,
                items_per_page: 10,
                total_items: 42,
                total_pages: 5,
            },
        );
        assert_eq!(last_page.range(), Some((41, 42)));
        assert_eq!(last_page.summary("products"), "Showing 41 - 42 of 42 products");
        assert!(last_page.has_previous());
        assert!(!last_page.has_next());
    }

    #[test]
    fn test_meta_wire_format() {
        let json = r#"{"items":[1,2],"meta":{"currentPage":1,"itemsPerPage":10,"totalItems":2,"totalPages":1}}"#;
        let parsed: PaginatedResponse<u32> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.items, vec![1, 2]);
        assert_eq!(parsed.meta.total_pages, 1);
    }

    #[test]
    fn test_params_to_query() {
        assert!(PaginationParams::default().to_query().is_empty());
        assert_eq!(
            PaginationParams::new(3, 20).to_query(),
            vec![
                ("page".to_string(), "3".to_string()),
                ("limit".to_string(), "20".to_string())
            ]
        );
    }
}
