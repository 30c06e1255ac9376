//! Module endpoints

use super::{created, json_body, path_id, query_params, PageQuery};
use crate::{
    api::representation::{module_model, paged_model},
    models::{ModulePayload, ModuleSortField},
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

/// GET /modules
pub async fn list_modules(
    State(state): State<AppState>,
    query: std::result::Result<Query<PageQuery>, QueryRejection>,
) -> Result<Response> {
    let request = query_params(query)?.into_request::<ModuleSortField>(&state.config.api)?;
    let page = state.module_service.find_all(&request).await?;

    let links = &state.links;
    let collection = links.modules();
    let body = paged_model("modules", page.map(|m| module_model(links, m)), |n| {
        links.collection_page(&collection, n, request.size, &request.sort)
    });

    Ok(Json(body).into_response())
}

/// GET /modules/{id}
pub async fn get_module(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Response> {
    let id = path_id(id)?;
    let module = state.module_service.find_by_id(id).await?;
    Ok(Json(module_model(&state.links, module)).into_response())
}

/// POST /modules
pub async fn create_module(
    State(state): State<AppState>,
    body: std::result::Result<Json<ModulePayload>, JsonRejection>,
) -> Result<Response> {
    let draft = json_body(body)?.into_draft()?;
    let module = state.module_service.save(draft).await?;
    let location = state.links.module(module.id);
    Ok(created(location, module_model(&state.links, module)))
}

/// PUT /modules/{id}
pub async fn update_module(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
    body: std::result::Result<Json<ModulePayload>, JsonRejection>,
) -> Result<Response> {
    let id = path_id(id)?;
    let draft = json_body(body)?.into_draft()?;
    let result = state.module_service.update(id, draft).await?;

    let is_created = result.is_created();
    let model = module_model(&state.links, result.entity);
    if is_created {
        return Ok(created(state.links.module(id), model));
    }
    Ok((StatusCode::OK, Json(model)).into_response())
}

/// DELETE /modules/{id}
pub async fn delete_module(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Response> {
    let id = path_id(id)?;
    state.module_service.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
