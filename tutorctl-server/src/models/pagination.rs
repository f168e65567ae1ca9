//! Pagination for list endpoints

use serde::Deserialize;

use super::ValidationError;

/// Smallest page size a client may request
pub const MIN_PAGE_SIZE: i64 = 5;

/// Largest page size a client may request
pub const MAX_PAGE_SIZE: i64 = 10;

/// Validated page request: a LIMIT/OFFSET pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    limit: i64,
    offset: i64,
}

impl Pagination {
    /// Validate a page request.
    ///
    /// - `page_id` must be at least 1
    /// - `page_size` must be within 5..=10
    /// - offset is `(page_id - 1) * page_size`
    pub fn new(page_id: i64, page_size: i64) -> Result<Self, ValidationError> {
        if page_id < 1 {
            return Err(ValidationError::OutOfRange {
                field: "page_id",
                min: 1,
                max: i64::MAX,
            });
        }

        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ValidationError::OutOfRange {
                field: "page_size",
                min: MIN_PAGE_SIZE,
                max: MAX_PAGE_SIZE,
            });
        }

        Ok(Self {
            limit: page_size,
            offset: (page_id - 1).saturating_mul(page_size),
        })
    }

    /// Unchecked LIMIT/OFFSET for store-level callers that page outside
    /// the HTTP bounds. Negative values are clamped to zero.
    pub fn raw(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.max(0),
            offset: offset.max(0),
        }
    }

    /// SQL OFFSET value.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// SQL LIMIT value.
    pub fn limit(&self) -> i64 {
        self.limit
    }
}

/// Query parameters for pagination (`?page_id=N&page_size=M`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page_id: Option<i64>,
    pub page_size: Option<i64>,
}

impl TryFrom<PageParams> for Pagination {
    type Error = ValidationError;

    fn try_from(params: PageParams) -> Result<Self, Self::Error> {
        let page_id = params
            .page_id
            .ok_or(ValidationError::Missing { field: "page_id" })?;
        let page_size = params
            .page_size
            .ok_or(ValidationError::Missing { field: "page_size" })?;
        Self::new(page_id, page_size)
    }
}
