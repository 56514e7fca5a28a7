//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Offset/limit query parameters accepted by every list endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ListQuery {
    /// Number of records to skip.
    #[serde(default)]
    pub skip: u64,
    /// Maximum number of records to return.
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    100
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}

/// Response wrapper pairing a page of records with the unpaginated total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// Total number of matching records across all pages.
    pub total: u64,
    /// The records in the current page.
    pub items: Vec<T>,
}

impl<T> ListResponse<T> {
    /// Creates a new list response.
    #[must_use]
    pub const fn new(total: u64, items: Vec<T>) -> Self {
        Self { total, items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query() {
        let q = ListQuery::default();
        assert_eq!(q.skip, 0);
        assert_eq!(q.limit, 100);
    }

    #[test]
    fn test_list_response() {
        let r = ListResponse::new(3, vec![1, 2]);
        assert_eq!(r.total, 3);
        assert_eq!(r.items.len(), 2);
    }
}
