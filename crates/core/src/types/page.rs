//! Pagination window over a server-side resource list.

use serde::{Deserialize, Serialize};

/// One page of a resource list.
///
/// The backend names the item array after the resource (`products`,
/// `orders`, ...); all of those names deserialize into [`Page::items`].
///
/// Invariants for a well-formed page:
/// - `page * size` is the offset of the first item
/// - `total_pages == ceil(total_elements / size)`
/// - `first == (page == 0)` and `last == (page + 1 >= total_pages)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    /// Items on this page.
    #[serde(
        default,
        alias = "products",
        alias = "orders",
        alias = "users",
        alias = "categories",
        alias = "content"
    )]
    pub items: Vec<T>,
    /// Zero-based page index.
    pub page: u32,
    /// Requested page size.
    pub size: u32,
    /// Number of items across all pages.
    pub total_elements: u64,
    /// Number of pages.
    pub total_pages: u32,
    /// Whether this is the first page.
    pub first: bool,
    /// Whether this is the last page.
    pub last: bool,
}

impl<T> Page<T> {
    /// Number of pages needed for `total_elements` items at `size` per page.
    ///
    /// A size of zero is treated as one.
    #[must_use]
    pub fn total_pages_for(total_elements: u64, size: u32) -> u32 {
        let size = u64::from(size.max(1));
        u32::try_from(total_elements.div_ceil(size)).unwrap_or(u32::MAX)
    }

    /// An empty page with consistent metadata.
    #[must_use]
    pub const fn empty(page: u32, size: u32) -> Self {
        Self {
            items: Vec::new(),
            page,
            size,
            total_elements: 0,
            total_pages: 0,
            first: page == 0,
            last: true,
        }
    }

    /// Offset of the first item of this page within the whole list.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// Whether more pages follow this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        !self.last
    }

    /// Check the pagination invariants.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.total_pages == Self::total_pages_for(self.total_elements, self.size)
            && self.first == (self.page == 0)
            && self.last == (self.page.saturating_add(1) >= self.total_pages)
    }

    /// Drop items on this page that fail `keep`, shrinking the totals to
    /// match. Returns how many were removed.
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, keep: F) -> usize {
        let before = self.items.len();
        self.items.retain(keep);
        let removed = before - self.items.len();
        if removed > 0 {
            self.total_elements = self.total_elements.saturating_sub(removed as u64);
            self.total_pages = Self::total_pages_for(self.total_elements, self.size);
            self.last = self.page.saturating_add(1) >= self.total_pages;
        }
        removed
    }

    /// Transform the items, keeping pagination metadata.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            first: self.first,
            last: self.last,
        }
    }
}

impl<T: Clone> Page<T> {
    /// Cut page `page` out of a complete in-memory list.
    #[must_use]
    pub fn window(all: &[T], page: u32, size: u32) -> Self {
        let size = size.max(1);
        let total_elements = all.len() as u64;
        let total_pages = Self::total_pages_for(total_elements, size);
        let start = usize::try_from(u64::from(page) * u64::from(size)).unwrap_or(usize::MAX);
        let items = all
            .iter()
            .skip(start)
            .take(size as usize)
            .cloned()
            .collect();

        Self {
            items,
            page,
            size,
            total_elements,
            total_pages,
            first: page == 0,
            last: page.saturating_add(1) >= total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(Page::<()>::total_pages_for(0, 10), 0);
        assert_eq!(Page::<()>::total_pages_for(10, 10), 1);
        assert_eq!(Page::<()>::total_pages_for(11, 10), 2);
        assert_eq!(Page::<()>::total_pages_for(5, 0), 5);
    }

    #[test]
    fn test_window_middle_page() {
        let all: Vec<u32> = (0..25).collect();
        let page = Page::window(&all, 1, 10);
        assert_eq!(page.items, (10..20).collect::<Vec<_>>());
        assert_eq!(page.offset(), 10);
        assert_eq!(page.total_pages, 3);
        assert!(!page.first);
        assert!(!page.last);
        assert!(page.is_consistent());
    }

    #[test]
    fn test_window_last_and_beyond() {
        let all: Vec<u32> = (0..25).collect();
        let last = Page::window(&all, 2, 10);
        assert_eq!(last.items.len(), 5);
        assert!(last.last);
        assert!(last.is_consistent());

        let beyond = Page::window(&all, 7, 10);
        assert!(beyond.items.is_empty());
        assert!(beyond.last);
    }

    #[test]
    fn test_empty_list_is_first_and_last() {
        let page = Page::<u32>::window(&[], 0, 10);
        assert!(page.first);
        assert!(page.last);
        assert!(page.is_consistent());
        assert_eq!(page, Page::empty(0, 10));
    }

    #[test]
    fn test_deserialize_resource_keyed_items() {
        let json = r#"{
            "orders": [1, 2],
            "page": 0,
            "size": 2,
            "totalElements": 3,
            "totalPages": 2,
            "first": true,
            "last": false
        }"#;
        let page: Page<u32> = serde_json::from_str(json).expect("deserialize");
        assert_eq!(page.items, vec![1, 2]);
        assert!(page.has_next());
        assert!(page.is_consistent());
    }

    #[test]
    fn test_retain_shrinks_totals() {
        let all: Vec<u32> = (0..11).collect();
        let mut page = Page::window(&all, 0, 10);
        assert!(!page.last);

        assert_eq!(page.retain(|n| *n != 3), 1);
        assert_eq!(page.total_elements, 10);
        assert_eq!(page.total_pages, 1);
        assert!(page.last);
        assert!(page.is_consistent());

        assert_eq!(page.retain(|_| true), 0);
    }

    #[test]
    fn test_inconsistent_page_detected() {
        let page = Page::<u32> {
            items: vec![],
            page: 0,
            size: 10,
            total_elements: 30,
            total_pages: 2,
            first: true,
            last: false,
        };
        assert!(!page.is_consistent());
    }
}
