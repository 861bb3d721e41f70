use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 200;

/// 1-indexed `page` / `page_size` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default, deserialize_with = "lenient_page_number")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "lenient_page_number")]
    pub page_size: Option<u64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(i64),
    Text(String),
}

/// Reads a paging value the way the query string carries it. Empty, negative
/// or non-numeric input counts as absent so the caller falls back to the default.
pub fn lenient_page_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawNumber>::deserialize(deserializer)?;
    let value = match raw {
        Some(RawNumber::Int(n)) => Some(n),
        Some(RawNumber::Text(text)) => text.trim().parse::<i64>().ok(),
        None => None,
    };
    Ok(value.and_then(|n| u64::try_from(n).ok()))
}

impl PageQuery {
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
        }
    }

    pub fn page(&self) -> u64 {
        match self.page {
            Some(page) if page >= 1 => page,
            _ => 1,
        }
    }

    pub fn page_size_or(&self, default: u64) -> u64 {
        match self.page_size {
            Some(size) if size >= 1 => size.min(MAX_PAGE_SIZE),
            _ => default,
        }
    }

    pub fn page_size(&self) -> u64 {
        self.page_size_or(DEFAULT_PAGE_SIZE)
    }
}

/// Paged list envelope: `{list, total, page, page_size}`.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub list: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    pub fn new(list: Vec<T>, total: u64, page: u64, page_size: u64) -> Self {
        Self {
            list,
            total,
            page,
            page_size,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            list: self.list.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}
