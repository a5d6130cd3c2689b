//! Offset pagination with a length-aware page payload.
//!
//! The serialized `Page` carries both the records and enough link
//! metadata for a client to walk the listing without computing URLs.

use std::collections::HashMap;

use serde::Serialize;

/// Which slice of a listing the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u64,
    pub per_page: u64,
    /// Path used to build page links (no query string).
    pub path: String,
}

impl PageRequest {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
            path: String::new(),
        }
    }

    /// Read `?page=N` from a query map. Missing, non-numeric and
    /// non-positive values all resolve to page 1.
    pub fn from_query(query: &HashMap<String, String>, per_page: u64) -> Self {
        let page = query
            .get("page")
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|n| *n >= 1)
            .map(|n| n as u64)
            .unwrap_or(1);
        Self::new(page, per_page)
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    fn url(&self, page: u64) -> String {
        format!("{}?page={}", self.path, page)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Page<T> {
    pub current_page: u64,
    pub data: Vec<T>,
    pub per_page: u64,
    pub total: u64,
    pub last_page: u64,
    /// 1-based position of the first item on this page; `None` when empty.
    pub from: Option<u64>,
    pub to: Option<u64>,
    pub path: String,
    pub first_page_url: String,
    pub last_page_url: String,
    pub next_page_url: Option<String>,
    pub prev_page_url: Option<String>,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, request: &PageRequest) -> Self {
        let per_page = request.per_page.max(1);
        let last_page = total.div_ceil(per_page).max(1);
        let current = request.page;

        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            let from = request.offset() + 1;
            (Some(from), Some(from + data.len() as u64 - 1))
        };

        Self {
            current_page: current,
            per_page,
            total,
            last_page,
            from,
            to,
            path: request.path.clone(),
            first_page_url: request.url(1),
            last_page_url: request.url(last_page),
            next_page_url: (current < last_page).then(|| request.url(current + 1)),
            prev_page_url: (current > 1).then(|| request.url(current - 1)),
            data,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            current_page: self.current_page,
            data: self.data.into_iter().map(f).collect(),
            per_page: self.per_page,
            total: self.total,
            last_page: self.last_page,
            from: self.from,
            to: self.to,
            path: self.path,
            first_page_url: self.first_page_url,
            last_page_url: self.last_page_url,
            next_page_url: self.next_page_url,
            prev_page_url: self.prev_page_url,
        }
    }
}
