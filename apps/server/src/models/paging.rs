//! Page requests, sort specifications and result pages.

use crate::{Error, Result};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// `asc` in any case sorts ascending; every other value sorts descending.
    pub fn parse_lenient(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("asc") {
            Direction::Asc
        } else {
            Direction::Desc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => f.write_str("asc"),
            Direction::Desc => f.write_str("desc"),
        }
    }
}

/// A sortable property of an entity.
///
/// Implementors are closed enums so that only known columns ever reach SQL.
pub trait SortField: Copy + Default + fmt::Debug + Send + Sync + 'static {
    /// Name of the entity this field belongs to, used in error messages.
    const ENTITY: &'static str;

    /// JSON property name (`departmentName`).
    fn property(&self) -> &'static str;

    /// Database column name (`department_name`).
    fn column(&self) -> &'static str;

    /// Whether the column holds text (ordered byte-wise).
    fn is_text(&self) -> bool;

    fn all() -> &'static [Self];

    /// Parse a JSON property name. Snake case column names are accepted too.
    fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        Self::all()
            .iter()
            .copied()
            .find(|f| f.property() == raw || f.column() == raw)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::all().iter().map(|f| f.property()).collect();
                Error::Validation(format!(
                    "Unknown sort property '{}' for {}; expected one of: {}",
                    raw,
                    Self::ENTITY,
                    known.join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort<F: SortField> {
    pub field: F,
    pub direction: Direction,
}

impl<F: SortField> Sort<F> {
    pub fn new(field: F, direction: Direction) -> Self {
        Self { field, direction }
    }

    /// Parse the `sort=field[,asc|desc]` list parameter form.
    pub fn parse_param(raw: &str) -> Result<Self> {
        let mut parts = raw.splitn(2, ',');
        let field = F::parse(parts.next().unwrap_or_default())?;
        let direction = match parts.next() {
            Some(dir) => Direction::parse_lenient(dir),
            None => Direction::Asc,
        };
        Ok(Self { field, direction })
    }

    /// Render back into the `field,direction` form used in links.
    pub fn to_param(&self) -> String {
        format!("{},{}", self.field.property(), self.direction)
    }
}

/// Zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest<F: SortField> {
    pub page: u32,
    pub size: u32,
    pub sort: Sort<F>,
}

impl<F: SortField> PageRequest<F> {
    pub fn new(page: u32, size: u32, sort: Sort<F>) -> Result<Self> {
        if size == 0 {
            return Err(Error::Validation(
                "Page size must be at least 1".to_string(),
            ));
        }
        Ok(Self { page, size, sort })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.size)
    }
}

/// One page of results plus the total across all pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, number: u32, size: u32, total_elements: u64) -> Self {
        Self {
            items,
            number,
            size,
            total_elements,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(u64::from(self.size))
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.number) + 1 < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}
