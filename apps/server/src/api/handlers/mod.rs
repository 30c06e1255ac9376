//! HTTP handlers

pub mod modules;
pub mod root;
pub mod universities;

use crate::{
    config::ApiConfig,
    models::{PageRequest, Sort, SortField},
    Error, Result,
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Json, Path, Query,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// `?page=&size=&sort=field[,asc|desc]` for collection listings.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort: Option<String>,
}

impl PageQuery {
    /// Apply defaults and clamp `size` to `1..=max_page_size`.
    pub fn into_request<F: SortField>(self, api: &ApiConfig) -> Result<PageRequest<F>> {
        let size = clamp_size(self.size, api.default_page_size, api.max_page_size);
        let sort = match self.sort.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Sort::parse_param(raw)?,
            _ => Sort::default(),
        };
        PageRequest::new(self.page.unwrap_or(0), size, sort)
    }
}

pub(crate) fn clamp_size(requested: Option<u32>, default: u32, max: u32) -> u32 {
    requested.unwrap_or(default).clamp(1, max.max(1))
}

// Extractor rejections are reported in the same JSON shape as domain errors.

pub(crate) fn json_body<T: DeserializeOwned>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(value)| value).map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Error::PayloadTooLarge(rejection.body_text())
        } else {
            Error::Validation(rejection.body_text())
        }
    })
}

pub(crate) fn query_params<T: DeserializeOwned>(
    query: std::result::Result<Query<T>, QueryRejection>,
) -> Result<T> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| Error::Validation(rejection.body_text()))
}

pub(crate) fn path_id(path: std::result::Result<Path<i64>, PathRejection>) -> Result<i64> {
    path.map(|Path(id)| id)
        .map_err(|rejection| Error::Validation(rejection.body_text()))
}

/// `201 Created` with a `Location` header.
pub(crate) fn created<T: Serialize>(location: String, body: T) -> Response {
    (
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(body),
    )
        .into_response()
}
