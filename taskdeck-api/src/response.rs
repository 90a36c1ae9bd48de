/// Success envelope and pagination helpers
///
/// Every successful response is wrapped in
/// `{success: true, message?, data?}` so clients handle one shape for the
/// whole API. Pagination metadata rides alongside list payloads.

use serde::{Deserialize, Serialize};

/// Uniform success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Always true
    pub success: bool,

    /// Optional human-readable message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Response payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Envelope with data only
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    /// Envelope with a message and data
    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Envelope with a message only (e.g. delete acknowledgements)
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Raw page/limit query parameters
///
/// Parsed leniently: values that are absent or fail to parse as a positive
/// integer fall back to the defaults (page 1, limit 10) rather than
/// erroring. No upper bound is enforced on `limit`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageParams {
    pub fn page(&self) -> i64 {
        parse_positive_or(self.page.as_deref(), 1)
    }

    pub fn limit(&self) -> i64 {
        parse_positive_or(self.limit.as_deref(), 10)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

fn parse_positive_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.parse::<i64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

/// Pagination metadata returned with list payloads
#[derive(Debug, Serialize)]
pub struct Pagination {
    pub current_page: i64,

    /// ceil(total / limit)
    pub total_pages: i64,

    /// Total matching rows before slicing
    pub total: i64,

    pub limit: i64,
}

impl Pagination {
    pub fn new(current_page: i64, limit: i64, total: i64) -> Self {
        Self {
            current_page,
            total_pages: (total + limit - 1) / limit,
            total,
            limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<&str>, limit: Option<&str>) -> PageParams {
        PageParams {
            page: page.map(String::from),
            limit: limit.map(String::from),
        }
    }

    #[test]
    fn test_defaults_when_absent() {
        let p = params(None, None);
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 10);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_defaults_when_non_numeric() {
        let p = params(Some("abc"), Some("ten"));
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 10);
    }

    #[test]
    fn test_defaults_when_non_positive() {
        let p = params(Some("0"), Some("-5"));
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 10);
    }

    #[test]
    fn test_offset_computation() {
        let p = params(Some("3"), Some("25"));
        assert_eq!(p.page(), 3);
        assert_eq!(p.limit(), 25);
        assert_eq!(p.offset(), 50);
    }

    #[test]
    fn test_total_pages_is_ceiling() {
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 10, 1).total_pages, 1);
        assert_eq!(Pagination::new(1, 10, 10).total_pages, 1);
        assert_eq!(Pagination::new(1, 10, 11).total_pages, 2);
        assert_eq!(Pagination::new(1, 3, 7).total_pages, 3);
    }

    #[test]
    fn test_envelope_shapes() {
        let json = serde_json::to_value(ApiResponse::data(vec![1, 2, 3])).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"][2], 3);
        assert!(json.get("message").is_none());

        let json = serde_json::to_value(ApiResponse::message("Task deleted successfully")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Task deleted successfully");
        assert!(json.get("data").is_none());
    }
}
