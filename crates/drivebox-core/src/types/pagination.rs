//! Pagination request and response types.

use serde::{Deserialize, Serialize};

/// A page of results requested by a caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PageRequest {
    /// Row offset for this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Row limit for this page.
    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    50
}

/// A page of results returned to a caller.
#[derive(Debug, Clone, Serialize)]
pub struct PageResponse<T: Serialize> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl<T: Serialize> PageResponse<T> {
    pub fn new(items: Vec<T>, request: &PageRequest, total: u64) -> Self {
        let page_size = request.page_size.max(1);
        let total_pages = total.div_ceil(u64::from(page_size)) as u32;
        Self {
            items,
            page: request.page,
            page_size: request.page_size,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_limit() {
        let request = PageRequest { page: 3, page_size: 20 };
        assert_eq!(request.offset(), 40);
        assert_eq!(request.limit(), 20);
    }

    #[test]
    fn test_page_zero_clamps_offset() {
        let request = PageRequest { page: 0, page_size: 20 };
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let request = PageRequest { page: 1, page_size: 10 };
        let response: PageResponse<u32> = PageResponse::new(vec![], &request, 21);
        assert_eq!(response.total_pages, 3);
    }
}
