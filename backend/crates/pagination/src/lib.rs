//! Offset pagination primitives shared by dashboard list endpoints.
//!
//! The dashboard pages through filtered result sets with a one-based page
//! number and a fixed page size. This crate keeps the arithmetic in one place
//! so list queries, page counts, and the page-link strip rendered next to a
//! table always agree:
//!
//! - [`PageRequest`] validates the page number and size and derives the
//!   number of rows to skip.
//! - [`page_count`] turns a match count into the number of pages.
//! - [`page_links`] produces the compact strip of page numbers and ellipses.
//! - [`Page`] is the serialisable envelope returned to clients.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Number of links shown before the strip collapses into ellipses.
pub const MAX_UNCOLLAPSED_LINKS: u64 = 7;

/// Errors raised when constructing a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// Page numbers are one-based.
    #[error("page number must be at least 1")]
    ZeroPage,
    /// A page must hold at least one item.
    #[error("page size must be at least 1")]
    ZeroPageSize,
}

/// A validated one-based page number paired with a page size.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::new(3, 6).expect("valid request");
/// assert_eq!(request.offset(), 12);
/// assert_eq!(request.limit(), 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    page_size: u64,
}

impl PageRequest {
    /// Validate and construct a page request.
    ///
    /// # Errors
    /// Returns [`PaginationError::ZeroPage`] or
    /// [`PaginationError::ZeroPageSize`] when either value is zero.
    pub const fn new(page: u64, page_size: u64) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::ZeroPage);
        }
        if page_size == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        Ok(Self { page, page_size })
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Number of matching items to skip before this page starts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Number of items to take; identical to [`PageRequest::page_size`].
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.page_size
    }
}

/// Number of pages needed to show `total_items` with `page_size` per page.
///
/// A zero page size yields zero pages rather than dividing by zero.
///
/// # Examples
/// ```
/// use pagination::page_count;
///
/// assert_eq!(page_count(13, 6), 3);
/// assert_eq!(page_count(12, 6), 2);
/// assert_eq!(page_count(0, 6), 0);
/// ```
#[must_use]
pub const fn page_count(total_items: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

/// Parse a user-supplied page number, falling back to the first page.
///
/// Query strings are untrusted: missing, non-numeric, or zero values all
/// resolve to page 1.
#[must_use]
pub fn parse_page(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|page| *page > 0)
        .unwrap_or(1)
}

/// One entry in the page-link strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    /// A clickable page number.
    Page(u64),
    /// A gap standing in for the collapsed pages.
    Ellipsis,
}

impl Serialize for PageLink {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Page(page) => serializer.serialize_u64(*page),
            Self::Ellipsis => serializer.serialize_str("..."),
        }
    }
}

/// Build the page-link strip for `current_page` out of `total_pages`.
///
/// Up to [`MAX_UNCOLLAPSED_LINKS`] pages are listed in full. Longer strips
/// keep the first and last pages plus the neighbourhood of the current page,
/// replacing the rest with [`PageLink::Ellipsis`].
///
/// # Examples
/// ```
/// use pagination::{page_links, PageLink::{Ellipsis, Page}};
///
/// assert_eq!(
///     page_links(5, 10),
///     vec![Page(1), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(10)],
/// );
/// ```
#[must_use]
pub fn page_links(current_page: u64, total_pages: u64) -> Vec<PageLink> {
    use PageLink::{Ellipsis, Page};

    if total_pages == 0 {
        return Vec::new();
    }
    if total_pages <= MAX_UNCOLLAPSED_LINKS {
        return (1..=total_pages).map(Page).collect();
    }

    let current = current_page.clamp(1, total_pages);
    if current <= 3 {
        vec![
            Page(1),
            Page(2),
            Page(3),
            Ellipsis,
            Page(total_pages - 1),
            Page(total_pages),
        ]
    } else if current >= total_pages - 2 {
        vec![
            Page(1),
            Page(2),
            Ellipsis,
            Page(total_pages - 2),
            Page(total_pages - 1),
            Page(total_pages),
        ]
    } else {
        vec![
            Page(1),
            Ellipsis,
            Page(current - 1),
            Page(current),
            Page(current + 1),
            Ellipsis,
            Page(total_pages),
        ]
    }
}

/// Serialisable page of items with enough context to render navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    items: Vec<T>,
    page: u64,
    page_size: u64,
    total_pages: u64,
    links: Vec<PageLink>,
}

impl<T> Page<T> {
    /// Wrap `items` fetched for `request` out of `total_pages` pages.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total_pages: u64) -> Self {
        Self {
            items,
            page: request.page(),
            page_size: request.page_size(),
            total_pages,
            links: page_links(request.page(), total_pages),
        }
    }

    /// Items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    /// Total number of pages for the same filter.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total_pages
    }

    /// Page-link strip for the current page.
    #[must_use]
    pub fn links(&self) -> &[PageLink] {
        &self.links
    }
}
