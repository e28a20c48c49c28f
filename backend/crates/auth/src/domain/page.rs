//! Pagination Types
//!
//! Filter, page request, and page result used by the admin listing.

use crate::domain::value_object::role::Role;

/// Upper bound on page size; larger requests are clamped to the default.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default page size.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Filter for the admin user listing.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Substring match on username or email
    pub search: Option<String>,
    /// Exact role match
    pub role: Option<Role>,
    /// Locked-state match
    pub locked: Option<bool>,
}

/// Sortable account fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Username,
    Email,
}

impl SortField {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            "username" => Some(Self::Username),
            "email" => Some(Self::Email),
            _ => None,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// A zero-based page request with clamped bounds.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort_by: SortField,
    pub direction: SortDirection,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort_by: SortField::default(),
            direction: SortDirection::default(),
        }
    }
}

impl PageRequest {
    /// Build a request from raw query values, falling back to defaults for
    /// anything out of range or unrecognized.
    pub fn clamped(
        page: i64,
        size: i64,
        sort_by: Option<&str>,
        direction: Option<&str>,
    ) -> Self {
        let page = if page < 0 { 0 } else { page as u32 };
        let size = if size <= 0 || size > MAX_PAGE_SIZE as i64 {
            DEFAULT_PAGE_SIZE
        } else {
            size as u32
        };
        let sort_by = sort_by.and_then(SortField::from_code).unwrap_or_default();
        let direction = direction
            .and_then(SortDirection::from_code)
            .unwrap_or_default();

        Self {
            page,
            size,
            sort_by,
            direction,
        }
    }

    /// Row offset of this page.
    pub fn offset(&self) -> u64 {
        self.page as u64 * self.size as u64
    }
}

/// One page of results plus paging metadata.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, page_number: u32, page_size: u32, total_elements: u64) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total_elements.div_ceil(page_size as u64) as u32
        };
        Self {
            content,
            page_number,
            page_size,
            total_elements,
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page_number + 1 < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 0
    }

    /// Convert the content, keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}
