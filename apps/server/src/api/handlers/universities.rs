//! University endpoints

use super::{clamp_size, created, json_body, path_id, query_params, PageQuery};
use crate::{
    api::representation::{paged_model, university_model, university_modules_model},
    models::{
        Direction, Sort, SortField, UniversityFilter, UniversityPayload, UniversitySortField,
    },
    state::AppState,
    Result,
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

/// Query parameters for `/universities/search`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub department_name: String,
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort_by: Option<String>,
    pub direction: Option<String>,
}

/// GET /universities
pub async fn list_universities(
    State(state): State<AppState>,
    query: std::result::Result<Query<PageQuery>, QueryRejection>,
) -> Result<Response> {
    let request = query_params(query)?.into_request::<UniversitySortField>(&state.config.api)?;
    let page = state.university_service.find_all(&request).await?;

    let links = &state.links;
    let collection = links.universities();
    let body = paged_model(
        "universities",
        page.map(|u| university_model(links, u)),
        |n| links.collection_page(&collection, n, request.size, &request.sort),
    );

    Ok(Json(body).into_response())
}

/// GET /universities/search
pub async fn search_universities(
    State(state): State<AppState>,
    query: std::result::Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Response> {
    let query = query_params(query)?;
    let api = &state.config.api;
    let size = clamp_size(query.size, api.search_default_page_size, api.max_page_size);
    let sort_by = query.sort_by.as_deref().unwrap_or("name");
    let direction = query.direction.as_deref().unwrap_or("asc");

    let filter = UniversityFilter {
        name: query.name,
        country: query.country,
        department_name: query.department_name,
    };

    let page = state
        .university_service
        .search_universities(&filter, query.page.unwrap_or(0), size, sort_by, direction)
        .await?;

    // Paging links carry the normalized sort (`direction=DESC` -> `desc`).
    let sort = Sort::new(
        UniversitySortField::parse(sort_by)?,
        Direction::parse_lenient(direction),
    );

    let links = &state.links;
    let body = paged_model(
        "universities",
        page.map(|u| university_model(links, u)),
        |n| links.search_page(&filter, n, size, &sort),
    );

    Ok(Json(body).into_response())
}

/// GET /universities/{id}
pub async fn get_university(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Response> {
    let id = path_id(id)?;
    let university = state.university_service.find_by_id(id).await?;
    Ok(Json(university_model(&state.links, university)).into_response())
}

/// POST /universities
pub async fn create_university(
    State(state): State<AppState>,
    body: std::result::Result<Json<UniversityPayload>, JsonRejection>,
) -> Result<Response> {
    let draft = json_body(body)?.into_draft()?;
    let university = state.university_service.save(draft).await?;
    let location = state.links.university(university.id);
    Ok(created(location, university_model(&state.links, university)))
}

/// PUT /universities/{id}
pub async fn update_university(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
    body: std::result::Result<Json<UniversityPayload>, JsonRejection>,
) -> Result<Response> {
    let id = path_id(id)?;
    let draft = json_body(body)?.into_draft()?;
    let result = state.university_service.update(id, draft).await?;

    let is_created = result.is_created();
    let model = university_model(&state.links, result.entity);
    if is_created {
        return Ok(created(state.links.university(id), model));
    }
    Ok((StatusCode::OK, Json(model)).into_response())
}

/// DELETE /universities/{id}
pub async fn delete_university(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Response> {
    let id = path_id(id)?;
    state.university_service.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// GET /universities/{id}/modules
pub async fn list_university_modules(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Response> {
    let id = path_id(id)?;
    let modules = state.module_service.find_by_university_id(id).await?;
    Ok(Json(university_modules_model(&state.links, id, modules)).into_response())
}
