//! Pagination arithmetic for list endpoints

/// Page size used when the client does not ask for one
pub const DEFAULT_PAGE_SIZE: i64 = 30;

/// Largest page a client may request
pub const MAX_PAGE_SIZE: i64 = 100;

/// Pagination metadata calculated from total results and the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Rows per page
    pub size: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
}

impl Pagination {
    /// Calculate pagination metadata
    ///
    /// The page is not clamped to `total_pages`: asking past the end yields
    /// an empty page, and clients stop loading once `page > total_pages`.
    ///
    /// # Examples
    /// ```
    /// use kitoboy_common::pagination::Pagination;
    ///
    /// // 65 avatars at 30 per page = 3 pages (30 + 30 + 5)
    /// let p = Pagination::new(Some(2), None, 65);
    /// assert_eq!(p.page, 2);
    /// assert_eq!(p.total_pages, 3);
    /// assert_eq!(p.offset, 30);
    /// ```
    pub fn new(requested_page: Option<i64>, requested_size: Option<i64>, total_results: i64) -> Self {
        let page = requested_page.unwrap_or(1).max(1);
        let size = requested_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let total = total_results.max(0);
        let total_pages = total / size + i64::from(total % size != 0);
        // Page is client supplied; saturate instead of overflowing
        let offset = page.saturating_sub(1).saturating_mul(size);

        Self {
            page,
            size,
            total_pages,
            offset,
        }
    }

    /// Whether every page has been served
    pub fn is_exhausted(&self) -> bool {
        self.page > self.total_pages
    }
}
