use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw `?page=&page_size=` query parameters as sent by clients.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageQuery {
    pub fn resolve(&self, default_size: u32) -> PageRequest {
        PageRequest::resolve(self.page, self.page_size, default_size)
    }
}

/// A normalized page request. `page` is 1-based and both fields are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Normalizes client input: missing or non-positive values fall back to
    /// page 1 / `default_size`, and sizes above `MAX_PAGE_SIZE` are capped.
    pub fn resolve(page: Option<i64>, page_size: Option<i64>, default_size: u32) -> Self {
        let page = match page {
            Some(p) if p >= 1 => u32::try_from(p).unwrap_or(u32::MAX),
            _ => 1,
        };
        let page_size = match page_size {
            Some(s) if s >= 1 => u32::try_from(s).unwrap_or(MAX_PAGE_SIZE).min(MAX_PAGE_SIZE),
            _ => default_size,
        };
        Self::new(page, page_size)
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

/// One page of results plus the totals needed to render a pager.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total_items: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total_items: i64) -> Self {
        Self {
            data,
            page: request.page,
            page_size: request.page_size,
            total_items,
            total_pages: total_pages(total_items, request.page_size),
        }
    }

    /// Cuts the requested window out of a fully materialized result set.
    /// A page starting past the end yields an empty `data` with the real totals.
    pub fn slice(mut items: Vec<T>, request: PageRequest) -> Self {
        let total = items.len();
        let start = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let data = if start >= total {
            Vec::new()
        } else {
            let end = start.saturating_add(request.page_size as usize).min(total);
            items.truncate(end);
            items.split_off(start)
        };
        Self::new(data, request, total as i64)
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

fn total_pages(total_items: i64, page_size: u32) -> i64 {
    if total_items <= 0 {
        return 0;
    }
    let size = i64::from(page_size.max(1));
    (total_items + size - 1) / size
}
