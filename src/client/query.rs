//! List query parameters accepted by every backend list endpoint.

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// Pagination, sorting and free-text search for a list request.
///
/// # Example
///
/// ```
/// use invoice_engine::client::ListQuery;
///
/// let query: ListQuery = serde_json::from_str(
///     r#"{"pageIndex": 2, "pageSize": 20, "sortBy": "name", "sortOrder": "desc", "search": "  Acme "}"#,
/// ).unwrap();
/// assert_eq!(query.cache_key(), "page=2;size=20;sort=name:desc;search=acme");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Zero-based page.
    #[serde(default)]
    pub page_index: u32,
    /// Items per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Field to sort by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    /// Sort direction, ignored without `sort_by`.
    #[serde(default)]
    pub sort_order: SortOrder,
    /// Free-text filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

fn default_page_size() -> u32 {
    10
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: default_page_size(),
            sort_by: None,
            sort_order: SortOrder::Asc,
            search: None,
        }
    }
}

impl ListQuery {
    /// A normalised key: equivalent queries map to the same string.
    ///
    /// Search text is trimmed and lower-cased, blank search and sort fields
    /// are dropped, and a zero page size falls back to the default.
    pub fn cache_key(&self) -> String {
        let page_size = if self.page_size == 0 {
            default_page_size()
        } else {
            self.page_size
        };
        let mut key = format!("page={};size={}", self.page_index, page_size);

        if let Some(sort_by) = self.sort_by.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let order = match self.sort_order {
                SortOrder::Asc => "asc",
                SortOrder::Desc => "desc",
            };
            key.push_str(&format!(";sort={}:{}", sort_by, order));
        }

        if let Some(search) = self
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
        {
            key.push_str(&format!(";search={}", search));
        }

        key
    }
}
