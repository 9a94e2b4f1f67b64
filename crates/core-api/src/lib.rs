// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{collections::BTreeMap, num::NonZeroU32};

/// 1-based page number.
pub type PageNumber = NonZeroU32;

pub const FIRST_PAGE: PageNumber = PageNumber::MIN;

pub type PageSize = NonZeroU32;

pub type PaginationOffset = u64;

pub type PaginationLimit = u64;

/// Filter for the media type (prefix match) of file resources.
pub const FILTER_KEY_MEDIA_TYPE: &str = "mediaType";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pagination {
    pub limit: Option<PaginationLimit>,
    pub offset: Option<PaginationOffset>,
}

impl Pagination {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            limit: None,
            offset: None,
        }
    }

    /// Mandatory offset
    ///
    /// Returns the offset if specified or 0 otherwise.
    #[must_use]
    pub fn mandatory_offset(&self) -> PaginationOffset {
        self.offset.unwrap_or(0)
    }

    /// Mandatory limit
    ///
    /// Returns the limit if specified or the maximum value otherwise.
    #[must_use]
    pub fn mandatory_limit(&self) -> PaginationLimit {
        self.limit.unwrap_or(PaginationLimit::MAX)
    }
}

/// Named filter values, e.g. a media type.
pub type Filters = BTreeMap<String, String>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Params {
    #[cfg_attr(feature = "serde", serde(default))]
    pub search_text: String,

    #[cfg_attr(feature = "serde", serde(default))]
    pub filters: Filters,
}

impl Params {
    /// Trim the search text.
    ///
    /// Returns `true` if modified.
    pub fn normalize(&mut self) -> bool {
        let trimmed = self.search_text.trim();
        if trimmed.len() == self.search_text.len() {
            return false;
        }
        self.search_text = trimmed.to_owned();
        true
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct PageRequest {
    pub page: PageNumber,
    pub page_size: PageSize,
    #[cfg_attr(feature = "serde", serde(default))]
    pub params: Params,
}

impl PageRequest {
    #[must_use]
    pub fn pagination(&self) -> Pagination {
        let limit = PaginationLimit::from(self.page_size.get());
        let offset = PaginationOffset::from(self.page.get() - 1) * limit;
        Pagination {
            limit: Some(limit),
            offset: Some(offset),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Page<T> {
    pub items: Vec<T>,

    /// Might be 0 if no items are available at all.
    pub total_pages: u32,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_pages: 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn has_page(&self, page: PageNumber) -> bool {
        page.get() <= self.total_pages
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Number of pages needed for `total_count` items.
#[must_use]
pub fn count_pages(total_count: usize, page_size: PageSize) -> u32 {
    let page_size = page_size.get() as usize;
    total_count.div_ceil(page_size) as u32
}
