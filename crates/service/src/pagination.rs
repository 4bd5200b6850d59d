//! Pagination utilities for the service layer
//!
//! `PageRequest` carries the 0-based page index, page size and sort order
//! accepted by the list and search endpoints; `Page` is the slice handed back
//! together with total-count metadata.

use std::fmt;

use serde::Serialize;

use crate::errors::ServiceError;

pub const DEFAULT_PAGE: u64 = 0;
pub const DEFAULT_SIZE: u64 = 10;
pub const MAX_SIZE: u64 = 100;
pub const DEFAULT_SORT: &str = "createTime";
pub const DEFAULT_DIRECTION: &str = "desc";
/// SQL `OFFSET` is a signed 64-bit value.
pub const MAX_OFFSET: u64 = i64::MAX as u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// Only `desc` (any case) sorts descending; every other value sorts ascending.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") { Direction::Desc } else { Direction::Asc }
    }
}

/// User columns a page may be ordered by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Id,
    Username,
    Email,
    Phone,
    Nickname,
    Status,
    CreateTime,
    UpdateTime,
}

impl SortField {
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        let field = match raw.trim() {
            "id" => SortField::Id,
            "username" => SortField::Username,
            "email" => SortField::Email,
            "phone" => SortField::Phone,
            "nickname" => SortField::Nickname,
            "status" => SortField::Status,
            "createTime" | "create_time" => SortField::CreateTime,
            "updateTime" | "update_time" => SortField::UpdateTime,
            other => return Err(ServiceError::Validation(format!("unsupported sort field: {other}"))),
        };
        Ok(field)
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortField::Id => "id",
            SortField::Username => "username",
            SortField::Email => "email",
            SortField::Phone => "phone",
            SortField::Nickname => "nickname",
            SortField::Status => "status",
            SortField::CreateTime => "createTime",
            SortField::UpdateTime => "updateTime",
        };
        f.write_str(name)
    }
}

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// 0-based page index
    pub page: u64,
    /// items per page, within `1..=MAX_SIZE`
    pub size: u64,
    pub sort: SortField,
    pub direction: Direction,
}

impl PageRequest {
    /// Build from raw query values; `size` is clamped to `1..=MAX_SIZE` and
    /// a page whose offset cannot be expressed is a validation failure.
    pub fn parse(page: u64, size: u64, sort: &str, direction: &str) -> Result<Self, ServiceError> {
        let req = Self {
            page,
            size: size.clamp(1, MAX_SIZE),
            sort: SortField::parse(sort)?,
            direction: Direction::parse(direction),
        };
        req.checked_offset()?;
        Ok(req)
    }

    pub fn offset(&self) -> u64 { self.page.saturating_mul(self.size) }

    /// Row offset of this page, within `0..=MAX_OFFSET`.
    pub fn checked_offset(&self) -> Result<u64, ServiceError> {
        self.page
            .checked_mul(self.size)
            .filter(|offset| *offset <= MAX_OFFSET)
            .ok_or_else(|| ServiceError::Validation(format!("page {} is out of range", self.page)))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: DEFAULT_PAGE, size: DEFAULT_SIZE, sort: SortField::CreateTime, direction: Direction::Desc }
    }
}

/// One page of results plus total-count metadata.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    /// 0-based index of this page
    pub number: u64,
    pub size: u64,
    pub number_of_elements: u64,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, total_elements: u64, req: &PageRequest) -> Self {
        let total_pages = total_elements.div_ceil(req.size.max(1));
        let number_of_elements = content.len() as u64;
        Self {
            empty: content.is_empty(),
            content,
            total_elements,
            total_pages,
            number: req.page,
            size: req.size,
            number_of_elements,
            first: req.page == 0,
            last: req.page.saturating_add(1) >= total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            number: self.number,
            size: self.size,
            number_of_elements: self.number_of_elements,
            first: self.first,
            last: self.last,
            empty: self.empty,
        }
    }
}
