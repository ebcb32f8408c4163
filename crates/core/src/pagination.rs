//! Page request / page envelope shared by every search endpoint.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

pub const DEFAULT_PAGE_NUM: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 1000;

/// 1-based page number and page size, as sent by clients (`pageInfo`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default = "default_page_num")]
    pub page_num: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_num() -> u32 {
    DEFAULT_PAGE_NUM
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_num: DEFAULT_PAGE_NUM,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page_num: u32, page_size: u32) -> DomainResult<Self> {
        let page = Self { page_num, page_size };
        page.validate()?;
        Ok(page)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.page_num == 0 {
            return Err(DomainError::validation("pageNum must be greater than 0"));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(DomainError::validation(format!(
                "pageSize must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(())
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page_num.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

/// Page metadata returned alongside `pageData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page_num: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub page_data: Vec<T>,
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    /// Build a page; an empty result reports zero items and zero pages.
    pub fn new(items: Vec<T>, total_items: u64, request: PageRequest) -> Self {
        let (page_data, total_pages) = if total_items > 0 {
            (items, total_items.div_ceil(u64::from(request.page_size.max(1))))
        } else {
            (Vec::new(), 0)
        };

        Self {
            page_data,
            page_info: PageInfo {
                page_num: request.page_num,
                page_size: request.page_size,
                total_items,
                total_pages,
            },
        }
    }
}
