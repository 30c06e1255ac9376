//! URL templates for hypermedia links.
//!
//! Every href the API emits is produced here from ids and query values, so
//! route paths and link shapes cannot drift apart.

use crate::models::{Sort, SortField, UniversityFilter};
use url::form_urlencoded;

#[derive(Debug, Clone, Default)]
pub struct LinkBuilder {
    base: String,
}

impl LinkBuilder {
    /// `base` is prepended verbatim (minus a trailing slash); empty yields
    /// absolute paths such as `/universities/1`.
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    fn path(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn root(&self) -> String {
        self.path("/")
    }

    pub fn health(&self) -> String {
        self.path("/health")
    }

    pub fn universities(&self) -> String {
        self.path("/universities")
    }

    pub fn university(&self, id: i64) -> String {
        self.path(&format!("/universities/{id}"))
    }

    pub fn university_modules(&self, id: i64) -> String {
        self.path(&format!("/universities/{id}/modules"))
    }

    pub fn university_search(&self) -> String {
        self.path("/universities/search")
    }

    pub fn modules(&self) -> String {
        self.path("/modules")
    }

    pub fn module(&self, id: i64) -> String {
        self.path(&format!("/modules/{id}"))
    }

    /// `{collection}?page=..&size=..&sort=field,dir`
    pub fn collection_page<F: SortField>(
        &self,
        collection: &str,
        page: u64,
        size: u32,
        sort: &Sort<F>,
    ) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("page", &page.to_string())
            .append_pair("size", &size.to_string())
            .append_pair("sort", &sort.to_param())
            .finish();
        format!("{collection}?{query}")
    }

    /// `/universities/search?name=..&country=..&departmentName=..&page=..`
    pub fn search_page<F: SortField>(
        &self,
        filter: &UniversityFilter,
        page: u64,
        size: u32,
        sort: &Sort<F>,
    ) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("name", &filter.name)
            .append_pair("country", &filter.country)
            .append_pair("departmentName", &filter.department_name)
            .append_pair("page", &page.to_string())
            .append_pair("size", &size.to_string())
            .append_pair("sortBy", sort.field.property())
            .append_pair("direction", &sort.direction.to_string())
            .finish();
        format!("{}?{query}", self.university_search())
    }
}
