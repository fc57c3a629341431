use serde::Deserialize;

use crate::config::FilterConfig;

/// Raw `page` / `limit` query values; parsed leniently by `Pagination::from_query`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Missing, non-numeric or non-positive values fall back to page 1 and the configured
    /// default limit; the limit is capped at `max_limit`.
    pub fn from_query(query: &PageQuery, config: &FilterConfig) -> Self {
        let page = parse_positive(query.page.as_deref()).unwrap_or(1);
        let limit = parse_positive(query.limit.as_deref())
            .unwrap_or(config.default_limit)
            .min(config.max_limit);

        Self { page, limit }
    }

    /// Saturates instead of overflowing on absurd page numbers; such pages are simply empty.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok()).filter(|n| *n > 0)
}
