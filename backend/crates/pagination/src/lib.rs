//! Offset pagination primitives shared by Eat What Now endpoints.
//!
//! A [`PageWindow`] describes the `limit`/`offset` slice a client asked for.
//! Windows only exist for well-formed input: a positive `limit` and a
//! non-negative `offset`. Anything else means "no pagination", and callers
//! return the whole result set. [`PageMeta`] carries the derived page number
//! and page count, and [`Page`] is the `{ data, meta }` envelope serialised
//! to clients.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing a [`PageWindow`] from typed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageWindowError {
    /// The limit was zero.
    #[error("limit must be greater than zero")]
    ZeroLimit,
}

/// A validated `limit`/`offset` pair.
///
/// # Examples
/// ```
/// use pagination::PageWindow;
///
/// let window = PageWindow::new(2, 4).expect("valid window");
/// assert_eq!(window.page(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    limit: u32,
    offset: u64,
}

impl PageWindow {
    /// Build a window, rejecting a zero limit.
    ///
    /// # Errors
    /// Returns [`PageWindowError::ZeroLimit`] when `limit` is zero.
    pub const fn new(limit: u32, offset: u64) -> Result<Self, PageWindowError> {
        if limit == 0 {
            return Err(PageWindowError::ZeroLimit);
        }
        Ok(Self { limit, offset })
    }

    /// Interpret raw query-string values.
    ///
    /// Returns `None` unless `limit` parses as a positive integer. A missing
    /// offset defaults to zero; an offset that is present but not a
    /// non-negative integer disables pagination as well.
    ///
    /// # Examples
    /// ```
    /// use pagination::PageWindow;
    ///
    /// assert!(PageWindow::from_query(Some("10"), None).is_some());
    /// assert!(PageWindow::from_query(Some("0"), None).is_none());
    /// assert!(PageWindow::from_query(Some("10"), Some("-1")).is_none());
    /// assert!(PageWindow::from_query(None, Some("5")).is_none());
    /// ```
    #[must_use]
    pub fn from_query(limit: Option<&str>, offset: Option<&str>) -> Option<Self> {
        let limit = limit?.trim().parse::<u32>().ok()?;
        let offset = match offset {
            Some(raw) => raw.trim().parse::<u64>().ok()?,
            None => 0,
        };
        Self::new(limit, offset).ok()
    }

    /// Maximum number of items in the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items skipped before the page starts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// One-based page number, `floor(offset / limit) + 1`.
    #[must_use]
    pub const fn page(&self) -> u64 {
        match self.offset.checked_div(self.limit as u64) {
            Some(full_pages) => full_pages.saturating_add(1),
            None => 1,
        }
    }

    /// Number of pages needed for `total` items, `ceil(total / limit)`.
    #[must_use]
    pub const fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit as u64)
    }
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Number of items matching the request before windowing.
    pub total: u64,
    /// Requested page size, absent when the request was unpaginated.
    pub limit: Option<u32>,
    /// Requested offset, zero when the request was unpaginated.
    pub offset: u64,
    /// One-based page number.
    pub page: u64,
    /// Number of pages at the requested page size.
    pub total_pages: u64,
}

impl PageMeta {
    /// Derive metadata for `total` items viewed through `window`.
    ///
    /// An unpaginated request reports a single page covering every item.
    ///
    /// # Examples
    /// ```
    /// use pagination::{PageMeta, PageWindow};
    ///
    /// let meta = PageMeta::new(5, PageWindow::new(2, 0).ok());
    /// assert_eq!(meta.total_pages, 3);
    /// assert_eq!(meta.page, 1);
    /// ```
    #[must_use]
    pub const fn new(total: u64, window: Option<PageWindow>) -> Self {
        match window {
            Some(window) => Self {
                total,
                limit: Some(window.limit()),
                offset: window.offset(),
                page: window.page(),
                total_pages: window.total_pages(total),
            },
            None => Self {
                total,
                limit: None,
                offset: 0,
                page: 1,
                total_pages: 1,
            },
        }
    }
}

/// Response envelope pairing page data with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items in this page.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PageMeta,
}

impl<T> Page<T> {
    /// Wrap `data` with metadata derived from `total` and `window`.
    #[must_use]
    pub fn new(data: Vec<T>, total: u64, window: Option<PageWindow>) -> Self {
        Self {
            data,
            meta: PageMeta::new(total, window),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for window parsing and metadata arithmetic.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(Some("2"), Some("0"), Some((2, 0)))]
    #[case(Some("2"), None, Some((2, 0)))]
    #[case(Some(" 5 "), Some("10"), Some((5, 10)))]
    #[case(Some("0"), Some("0"), None)]
    #[case(Some("-2"), Some("0"), None)]
    #[case(Some("two"), Some("0"), None)]
    #[case(Some("2.5"), Some("0"), None)]
    #[case(Some("2"), Some("-1"), None)]
    #[case(Some("2"), Some("x"), None)]
    #[case(None, Some("4"), None)]
    fn from_query_only_accepts_well_formed_windows(
        #[case] limit: Option<&str>,
        #[case] offset: Option<&str>,
        #[case] expected: Option<(u32, u64)>,
    ) {
        let window = PageWindow::from_query(limit, offset);
        assert_eq!(window.map(|w| (w.limit(), w.offset())), expected);
    }

    #[rstest]
    fn new_rejects_zero_limit() {
        assert_eq!(PageWindow::new(0, 3), Err(PageWindowError::ZeroLimit));
    }

    #[rstest]
    #[case(2, 0, 1)]
    #[case(2, 1, 1)]
    #[case(2, 2, 2)]
    #[case(2, 4, 3)]
    #[case(10, 95, 10)]
    fn page_is_floor_of_offset_over_limit_plus_one(
        #[case] limit: u32,
        #[case] offset: u64,
        #[case] expected: u64,
    ) {
        let window = PageWindow::new(limit, offset).expect("valid window");
        assert_eq!(window.page(), expected);
    }

    #[rstest]
    #[case(5, 2, 3)]
    #[case(4, 2, 2)]
    #[case(0, 2, 0)]
    #[case(1, 10, 1)]
    fn total_pages_rounds_up(#[case] total: u64, #[case] limit: u32, #[case] expected: u64) {
        let window = PageWindow::new(limit, 0).expect("valid window");
        assert_eq!(window.total_pages(total), expected);
    }

    #[rstest]
    fn unpaginated_meta_reports_single_page() {
        let meta = PageMeta::new(7, None);
        assert_eq!(meta.limit, None);
        assert_eq!(meta.offset, 0);
        assert_eq!(meta.page, 1);
        assert_eq!(meta.total_pages, 1);
    }

    #[rstest]
    fn page_serialises_camel_case_meta() {
        let page = Page::new(vec!["a", "b"], 5, PageWindow::new(2, 0).ok());
        let value = serde_json::to_value(&page).expect("serialise page");
        assert_eq!(
            value,
            json!({
                "data": ["a", "b"],
                "meta": { "total": 5, "limit": 2, "offset": 0, "page": 1, "totalPages": 3 }
            })
        );
    }
}
