//! Page arithmetic and previous/next link generation.

use serde::{Deserialize, Serialize};

use super::validate::ValidationError;

/// Query string accepted by paginated collections (`?page=n`).
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

/// A 1-based page of fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Pages below 1 (or missing) resolve to the first page.
    pub fn new(page: Option<i64>, per_page: u32) -> Self {
        let page = page
            .unwrap_or(1)
            .clamp(1, u32::MAX as i64) as u32;
        Self {
            page,
            per_page: per_page.max(1),
        }
    }

    /// Like `new`, but a page number too large to address is a 400
    /// rather than being clamped onto some other page.
    pub fn from_query(query: &PageQuery, per_page: u32) -> Result<Self, ValidationError> {
        if query.page.is_some_and(|page| page > u32::MAX as i64) {
            return Err(ValidationError::new(
                "page",
                format!("The page must not be greater than {}", u32::MAX),
            ));
        }
        Ok(Self::new(query.page, per_page))
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }

    pub fn limit(&self) -> u64 {
        self.per_page as u64
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self, total: u64) -> bool {
        (self.page as u64) * (self.per_page as u64) < total
    }
}

/// Paginated collection response.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub previous: Option<String>,
    pub next: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Wrap one page of `results` with links relative to `collection_url`.
    pub fn new(results: Vec<T>, total: u64, request: PageRequest, collection_url: &str) -> Self {
        let previous = request
            .has_previous()
            .then(|| page_url(collection_url, request.page - 1));
        let next = request
            .has_next(total)
            .then(|| page_url(collection_url, request.page + 1));

        Self {
            count: total,
            previous,
            next,
            results,
        }
    }
}

pub fn page_url(collection_url: &str, page: u32) -> String {
    format!("{}?page={}", collection_url, page)
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://localhost/service/notifications/";

    #[test]
    fn test_defaults_to_first_page() {
        let request = PageRequest::new(None, 4);
        assert_eq!(request.page, 1);
        assert_eq!(request.offset(), 0);

        assert_eq!(PageRequest::new(Some(0), 4).page, 1);
        assert_eq!(PageRequest::new(Some(-3), 4).page, 1);
    }

    #[test]
    fn test_unaddressable_page_rejected() {
        let query = PageQuery {
            page: Some(99_999_999_999_999),
        };
        assert_eq!(PageRequest::from_query(&query, 4).unwrap_err().field, "page");

        let query = PageQuery {
            page: Some(u32::MAX as i64),
        };
        assert_eq!(PageRequest::from_query(&query, 4).unwrap().page, u32::MAX);
        assert_eq!(PageRequest::from_query(&PageQuery::default(), 4).unwrap().page, 1);
    }

    #[test]
    fn test_offset_and_limit() {
        let request = PageRequest::new(Some(3), 4);
        assert_eq!(request.offset(), 8);
        assert_eq!(request.limit(), 4);
    }

    #[test]
    fn test_single_page_has_no_links() {
        let page = Page::new(vec![1, 2], 2, PageRequest::new(Some(1), 4), URL);
        assert_eq!(page.count, 2);
        assert!(page.previous.is_none());
        assert!(page.next.is_none());
    }

    #[test]
    fn test_page_past_the_end() {
        let page: Page<i32> = Page::new(vec![], 2, PageRequest::new(Some(2), 4), URL);
        assert!(page.results.is_empty());
        assert_eq!(page.previous.as_deref(), Some("http://localhost/service/notifications/?page=1"));
        assert!(page.next.is_none());
    }

    #[test]
    fn test_middle_page_links_both_ways() {
        let page = Page::new(vec![5, 6, 7, 8], 10, PageRequest::new(Some(2), 4), URL);
        assert_eq!(page.previous.as_deref(), Some("http://localhost/service/notifications/?page=1"));
        assert_eq!(page.next.as_deref(), Some("http://localhost/service/notifications/?page=3"));
    }

    #[test]
    fn test_exact_boundary_has_no_next() {
        let request = PageRequest::new(Some(2), 4);
        assert!(!request.has_next(8));
        assert!(request.has_next(9));
    }
}
