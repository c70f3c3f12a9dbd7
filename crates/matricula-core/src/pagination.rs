//! Page-based pagination for list endpoints.
//!
//! List endpoints accept `page` and `limit` query parameters:
//! - `page`: page number (1-indexed, default: 1)
//! - `limit`: items per page (1-100, default: 10)
//!
//! Unparsable values fall back to the defaults instead of rejecting the
//! request. Rows are always returned newest first.
//!
//! Responses carry a [`PaginationMeta`] flattened next to the rows:
//!
//! ```json
//! {
//!   "students": [...],
//!   "total": 42,
//!   "totalPages": 5,
//!   "currentPage": 1
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Deserializes a query value into an optional i64.
///
/// Empty and non-numeric values become `None` so the defaults apply.
fn deserialize_lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(i64),
        String(String),
    }

    Ok(
        match Option::<NumberOrString>::deserialize(deserializer)? {
            Some(NumberOrString::Number(n)) => Some(n),
            Some(NumberOrString::String(s)) => s.trim().parse::<i64>().ok(),
            None => None,
        },
    )
}

/// Query parameters for pagination.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PaginationParams {
    /// Page number (1-indexed, default: 1)
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    pub page: Option<i64>,
    /// Items per page (1-100, default: 10)
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    pub limit: Option<i64>,
}

impl PaginationParams {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    /// Returns the effective limit, clamped to [1, 100].
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Returns the effective page, at least 1.
    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(DEFAULT_PAGE).max(1)
    }

    /// Rows to skip. Saturates for page numbers past the end of `i64`.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

/// Pagination metadata returned with every list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Total number of rows matching the filters
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
    #[serde(rename = "currentPage")]
    pub current_page: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, params: &PaginationParams) -> Self {
        let limit = params.limit();
        Self {
            total,
            total_pages: (total + limit - 1) / limit,
            current_page: params.page(),
        }
    }
}
