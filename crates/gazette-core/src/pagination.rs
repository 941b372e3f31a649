//! Pagination math.
//!
//! Pure, stateless slicing of an ordered result set into fixed-size
//! pages. The store applies the computed offset/limit; the metadata
//! feeds the listing responses.

/// Parse the raw `page` query parameter. Absent, non-numeric or
/// out-of-domain values all mean the first page.
pub fn parse_page_param(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|&p| p >= 1)
        .unwrap_or(1)
}

/// A clamped window into an ordered result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page actually served (after clamping).
    pub page: u64,
    pub per_page: u64,
    pub offset: u64,
    pub limit: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PageWindow {
    /// Compute the window for `requested_page` over `total_items` rows.
    ///
    /// Out-of-range requests clamp to the last valid page; an empty set
    /// yields page 1 of 1 with an empty window. Never fails.
    pub fn compute(total_items: u64, per_page: u64, requested_page: u64) -> Self {
        let per_page = per_page.max(1);
        let total_pages = total_items.div_ceil(per_page).max(1);
        let page = requested_page.clamp(1, total_pages);

        Self {
            page,
            per_page,
            offset: (page - 1) * per_page,
            limit: per_page,
            total_items,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        }
    }
}
