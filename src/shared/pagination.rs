use crate::shared::response::PageLinks;
use axum::http::Uri;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// A list request that cannot be turned into a valid query.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct QueryError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Common list parameters shared by every paginated endpoint.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FindAllQuery {
    /// Case-insensitive substring searched across the searchable fields
    pub query: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<SortOrder>,
    pub sort_field: Option<String>,
    /// `TRUE` to include soft-deleted rows (admins only)
    pub with_deleted: Option<String>,
}

impl FindAllQuery {
    /// Page number, at least 1.
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size, defaulting to 10 and capped at 100.
    pub fn limit(&self) -> i64 {
        match self.limit {
            Some(l) if l > 0 => l.min(MAX_LIMIT),
            _ => DEFAULT_LIMIT,
        }
    }

    /// Row offset of the page; saturates for absurdly large pages.
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    pub fn wants_deleted(&self) -> bool {
        self.with_deleted
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("TRUE"))
    }

    /// Trimmed, non-empty search term.
    pub fn search_term(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

/// One page of results plus navigation numbers.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub next_page: Option<i64>,
    pub prev_page: Option<i64>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if total > 0 && limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };

        Self {
            items,
            total,
            page,
            limit,
            total_pages,
            next_page: (page.saturating_mul(limit) < total).then(|| page + 1),
            prev_page: (page > 1).then(|| page - 1),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
            next_page: self.next_page,
            prev_page: self.prev_page,
        }
    }
}

/// Builds self/first/last/prev/next links for a paginated listing.
pub struct PaginationLinkBuilder {
    base_url: String,
    page: i64,
    limit: i64,
    total_pages: i64,
}

impl PaginationLinkBuilder {
    /// Uses the path of the request URI as the base URL.
    pub fn from_uri(uri: &Uri, page: i64, limit: i64, total: i64) -> Self {
        Self::new(uri.path(), page, limit, total)
    }

    pub fn new(base_url: impl Into<String>, page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if total > 0 && limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };

        Self {
            base_url: base_url.into(),
            page,
            limit,
            total_pages,
        }
    }

    pub fn build(self) -> PageLinks {
        PageLinks {
            self_link: Some(self.page_link(self.page)),
            first: Some(self.page_link(1)),
            last: (self.total_pages > 0).then(|| self.page_link(self.total_pages)),
            prev: (self.page > 1).then(|| self.page_link(self.page - 1)),
            next: (self.page < self.total_pages).then(|| self.page_link(self.page + 1)),
        }
    }

    fn page_link(&self, page: i64) -> String {
        format!("{}?page={}&limit={}", self.base_url, page, self.limit)
    }
}
