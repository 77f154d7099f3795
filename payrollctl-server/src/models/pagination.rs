//! Limit/offset pagination for the employee listing

/// Maximum rows per page
pub const MAX_LIMIT: i64 = 5000;

/// Default rows per page
pub const DEFAULT_LIMIT: i64 = 50;

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Rows to return (1..=5000)
    pub limit: i64,
    /// Rows to skip (>= 0)
    pub offset: i64,
}

impl Page {
    /// Create pagination with clamping.
    ///
    /// - Limit is clamped to 1..=5000
    /// - Offset is clamped to a minimum of 0
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LIMIT),
            offset: offset.max(0),
        }
    }

    /// Build from optional query parameters.
    pub fn from_params(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self::new(limit.unwrap_or(DEFAULT_LIMIT), offset.unwrap_or(0))
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let p = Page::from_params(None, None);
        assert_eq!(p, Page::default());
        assert_eq!(p.limit, 50);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn clamps_limit() {
        assert_eq!(Page::new(0, 0).limit, 1);
        assert_eq!(Page::new(-10, 0).limit, 1);
        assert_eq!(Page::new(30_000, 0).limit, 5000);
        assert_eq!(Page::new(5000, 0).limit, 5000);
        assert_eq!(Page::new(120, 0).limit, 120);
    }

    #[test]
    fn clamps_offset() {
        assert_eq!(Page::new(10, -5).offset, 0);
        assert_eq!(Page::new(10, 250).offset, 250);
    }
}
