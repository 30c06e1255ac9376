//! HAL-style response bodies: `_links`, `_embedded` and `page` metadata.

use crate::{
    api::links::LinkBuilder,
    models::{Module, Page, University},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

pub type Links = BTreeMap<String, Link>;

fn links<const N: usize>(pairs: [(&str, String); N]) -> Links {
    pairs
        .into_iter()
        .map(|(rel, href)| (rel.to_string(), Link { href }))
        .collect()
}

/// An entity with its links inlined next to its fields.
#[derive(Debug, Clone, Serialize)]
pub struct EntityModel<T> {
    #[serde(flatten)]
    pub content: T,
    #[serde(rename = "_links")]
    pub links: Links,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PagedModel<T> {
    #[serde(rename = "_embedded")]
    pub embedded: BTreeMap<&'static str, Vec<EntityModel<T>>>,
    #[serde(rename = "_links")]
    pub links: Links,
    pub page: PageMetadata,
}

/// A non-paged list, e.g. the modules of one university.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionModel<T> {
    #[serde(rename = "_embedded")]
    pub embedded: BTreeMap<&'static str, Vec<EntityModel<T>>>,
    #[serde(rename = "_links")]
    pub links: Links,
}

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize)]
pub struct IndexModel {
    #[serde(rename = "_links")]
    pub links: Links,
}

pub fn university_model(builder: &LinkBuilder, university: University) -> EntityModel<University> {
    let self_href = builder.university(university.id);
    let mut links = links([
        ("self", self_href.clone()),
        ("modules", builder.university_modules(university.id)),
        ("update", self_href.clone()),
        ("delete", self_href),
    ]);
    if let Some(url) = university
        .department_url
        .as_ref()
        .filter(|url| !url.is_empty())
    {
        links.insert("departmentUrl".to_string(), Link { href: url.clone() });
    }

    EntityModel {
        content: university,
        links,
    }
}

pub fn module_model(builder: &LinkBuilder, module: Module) -> EntityModel<Module> {
    let self_href = builder.module(module.id);
    EntityModel {
        links: links([
            ("self", self_href.clone()),
            ("modules", builder.modules()),
            ("university", builder.university(module.university.id)),
            ("update", self_href.clone()),
            ("delete", self_href),
        ]),
        content: module,
    }
}

/// Wrap one page of models in the paging envelope.
///
/// `page_href` renders the link to any page number with the request's size
/// and sort (and filters, for search).
pub fn paged_model<T>(
    rel: &'static str,
    page: Page<EntityModel<T>>,
    page_href: impl Fn(u64) -> String,
) -> PagedModel<T> {
    let total_pages = page.total_pages();
    let number = u64::from(page.number);
    let last = total_pages.saturating_sub(1);

    let mut links = links([
        ("self", page_href(number)),
        ("first", page_href(0)),
        ("last", page_href(last)),
    ]);
    if page.has_previous() {
        links.insert(
            "prev".to_string(),
            Link {
                href: page_href(number - 1),
            },
        );
    }
    if page.has_next() {
        links.insert(
            "next".to_string(),
            Link {
                href: page_href(number + 1),
            },
        );
    }

    let metadata = PageMetadata {
        size: page.size,
        total_elements: page.total_elements,
        total_pages,
        number: page.number,
    };

    PagedModel {
        embedded: BTreeMap::from([(rel, page.items)]),
        links,
        page: metadata,
    }
}

pub fn university_modules_model(
    builder: &LinkBuilder,
    university_id: i64,
    modules: Vec<Module>,
) -> CollectionModel<Module> {
    let items = modules
        .into_iter()
        .map(|m| module_model(builder, m))
        .collect();
    CollectionModel {
        embedded: BTreeMap::from([("modules", items)]),
        links: links([
            ("self", builder.university_modules(university_id)),
            ("university", builder.university(university_id)),
        ]),
    }
}

pub fn index_model(builder: &LinkBuilder) -> IndexModel {
    IndexModel {
        links: links([
            ("self", builder.root()),
            ("universities", builder.universities()),
            ("modules", builder.modules()),
            ("search", builder.university_search()),
            ("health", builder.health()),
        ]),
    }
}
