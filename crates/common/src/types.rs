//! Common type definitions

use serde::{Deserialize, Serialize};

/// Defaults applied when a caller omits a pagination field
///
/// `page` falls back to 1 and `limit` to 10 unless a service overrides them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationDefaults {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    10
}

impl Default for PaginationDefaults {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

/// Pagination parameters as they arrive from a caller
///
/// Both fields are optional; missing or non-positive values are replaced by
/// [`PaginationDefaults`] in [`PaginationQuery::resolve`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PaginationQuery {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self { page, limit }
    }

    /// Resolve into concrete, strictly positive pagination values
    pub fn resolve(&self, defaults: &PaginationDefaults) -> Pagination {
        let pick = |value: Option<i64>, fallback: u64| match value {
            Some(v) if v > 0 => v as u64,
            _ => fallback.max(1),
        };

        Pagination {
            page: pick(self.page, defaults.page),
            limit: pick(self.limit, defaults.limit),
        }
    }
}

/// Resolved pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        PaginationQuery::default().resolve(&PaginationDefaults::default())
    }
}

impl Pagination {
    /// Number of rows to skip: `(page - 1) * limit`
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// `ceil(total / limit)`; zero when there is nothing to page through
    pub fn last_page(&self, total: u64) -> u64 {
        total.div_ceil(self.limit.max(1))
    }

    pub fn meta(&self, total: u64) -> PageMeta {
        PageMeta {
            total,
            page: self.page,
            last_page: self.last_page(total),
        }
    }
}

/// Pagination block returned next to a page of data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub page: u64,
    pub last_page: u64,
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: u64, pagination: &Pagination) -> Self {
        Self {
            data,
            meta: pagination.meta(total),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_uses_defaults_when_absent() {
        let pagination = PaginationQuery::default().resolve(&PaginationDefaults::default());
        assert_eq!(pagination, Pagination { page: 1, limit: 10 });
    }

    #[test]
    fn test_resolve_replaces_non_positive_values() {
        let pagination =
            PaginationQuery::new(Some(0), Some(-5)).resolve(&PaginationDefaults::default());
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.limit, 10);
    }

    #[test]
    fn test_resolve_keeps_explicit_values() {
        let pagination =
            PaginationQuery::new(Some(3), Some(25)).resolve(&PaginationDefaults::default());
        assert_eq!(pagination, Pagination { page: 3, limit: 25 });
    }

    #[test]
    fn test_resolve_honours_custom_defaults() {
        let defaults = PaginationDefaults { page: 2, limit: 50 };
        let pagination = PaginationQuery::new(None, Some(5)).resolve(&defaults);
        assert_eq!(pagination, Pagination { page: 2, limit: 5 });
    }

    #[test]
    fn test_offset() {
        assert_eq!(Pagination { page: 1, limit: 10 }.offset(), 0);
        assert_eq!(Pagination { page: 2, limit: 10 }.offset(), 10);
        assert_eq!(Pagination { page: 4, limit: 7 }.offset(), 21);
    }

    #[test]
    fn test_last_page_rounds_up() {
        let pagination = Pagination { page: 1, limit: 10 };
        assert_eq!(pagination.last_page(0), 0);
        assert_eq!(pagination.last_page(1), 1);
        assert_eq!(pagination.last_page(10), 1);
        assert_eq!(pagination.last_page(15), 2);
        assert_eq!(pagination.last_page(21), 3);
    }

    #[test]
    fn test_meta_serializes_camel_case() {
        let meta = Pagination { page: 2, limit: 10 }.meta(15);
        let json = serde_json::to_value(meta).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "total": 15, "page": 2, "lastPage": 2 })
        );
    }
}
