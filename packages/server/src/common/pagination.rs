//! Offset pagination for list endpoints.
//!
//! ```rust,ignore
//! let page = PageArgs::new(query.page, query.limit).validate();
//! let swaps = Swap::list_for_member(member_id, None, page, pool).await?;
//! ```

use serde::{Deserialize, Serialize};

/// Default page size when the caller omits `limit`.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound on `limit`.
pub const MAX_PAGE_SIZE: u32 = 100;

/// 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageArgs {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageArgs {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageArgs {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    /// Clamp to a usable range: page >= 1, 1 <= limit <= MAX_PAGE_SIZE.
    pub fn validate(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// SQL LIMIT
    pub fn limit(&self) -> i64 {
        i64::from(self.limit)
    }

    /// SQL OFFSET
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let page = PageArgs::new(None, None);
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_offset_for_later_pages() {
        let page = PageArgs::new(Some(3), Some(10));
        assert_eq!(page.offset(), 20);
        assert_eq!(page.limit(), 10);
    }

    #[test]
    fn test_validate_clamps() {
        let page = PageArgs::new(Some(0), Some(5000)).validate();
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, MAX_PAGE_SIZE);

        let page = PageArgs::new(Some(2), Some(0)).validate();
        assert_eq!(page.limit, 1);
    }
}
