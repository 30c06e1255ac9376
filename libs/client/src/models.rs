//! Wire types of the partner universities API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

pub type Links = BTreeMap<String, Link>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniversityRef {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct University {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub department_name: String,
    pub department_url: Option<String>,
    pub contact_person: Option<String>,
    pub max_outgoing_students: i32,
    pub max_incoming_students: i32,
    pub next_spring_semester_start: Option<String>,
    pub next_autumn_semester_start: Option<String>,
    #[serde(default)]
    pub modules: Vec<Module>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: i64,
    pub name: String,
    pub semester: i32,
    pub credit_points: i32,
    pub university: UniversityRef,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// Body for creating or replacing a university.
///
/// `modules: None` leaves existing modules alone on update; `Some(vec![])`
/// removes them all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UniversityInput {
    pub name: String,
    pub country: String,
    pub department_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    pub max_outgoing_students: i32,
    pub max_incoming_students: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_spring_semester_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_autumn_semester_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules: Option<Vec<NestedModuleInput>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NestedModuleInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub semester: i32,
    pub credit_points: i32,
}

/// Body for creating or replacing a module.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInput {
    pub name: String,
    pub semester: i32,
    pub credit_points: i32,
    pub university: UniversityRef,
}

impl ModuleInput {
    pub fn new(name: impl Into<String>, semester: i32, credit_points: i32, university_id: i64) -> Self {
        Self {
            name: name.into(),
            semester,
            credit_points,
            university: UniversityRef { id: university_id },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u32,
}

/// One page of a collection, with the paging links the server emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: PageMetadata,
    pub links: Links,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.links.contains_key("next")
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PagedBody<T> {
    #[serde(rename = "_embedded", default = "BTreeMap::new")]
    pub embedded: BTreeMap<String, Vec<T>>,
    #[serde(rename = "_links", default)]
    pub links: Links,
    pub page: PageMetadata,
}

impl<T> PagedBody<T> {
    pub(crate) fn into_page(mut self, rel: &str) -> Page<T> {
        Page {
            items: self.embedded.remove(rel).unwrap_or_default(),
            page: self.page,
            links: self.links,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CollectionBody<T> {
    #[serde(rename = "_embedded", default = "BTreeMap::new")]
    pub embedded: BTreeMap<String, Vec<T>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IndexBody {
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// `page`, `size` and `sort` (`field` or `field,asc|desc`) for list calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort: Option<String>,
}

impl PageParams {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
            sort: None,
        }
    }

    pub fn sorted(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub(crate) fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size", size.to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        pairs
    }
}

/// Filters and ordering for `/universities/search`. Unset values take the
/// server defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub name: Option<String>,
    pub country: Option<String>,
    pub department_name: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort_by: Option<String>,
    pub direction: Option<String>,
}

impl SearchParams {
    pub(crate) fn pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("name", self.name.clone()),
            ("country", self.country.clone()),
            ("departmentName", self.department_name.clone()),
            ("page", self.page.map(|p| p.to_string())),
            ("size", self.size.map(|s| s.to_string())),
            ("sortBy", self.sort_by.clone()),
            ("direction", self.direction.clone()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub store: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub message: String,
}
