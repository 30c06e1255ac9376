//! Async client for the partner universities REST API.

use crate::error::{ClientError, Result};
use crate::models::{
    CollectionBody, ErrorBody, Health, IndexBody, Links, Module, ModuleInput, Page, PageParams,
    PagedBody, SearchParams, University, UniversityInput,
};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one deployment of the API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct PartnerUniversitiesClient {
    http: reqwest::Client,
    base: Url,
}

impl PartnerUniversitiesClient {
    /// Create a client for `base_url` (e.g. `http://localhost:8080`).
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(concat!("partner-universities-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_http_client(base_url, http)
    }

    pub fn with_http_client(base_url: &str, http: reqwest::Client) -> Result<Self> {
        // A trailing slash keeps any path prefix when joining relative paths.
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    /// Resolve an href returned by the server (absolute or root-relative).
    fn resolve(&self, href: &str) -> Result<Url> {
        match Url::parse(href) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => Ok(self.base.join(href)?),
            Err(e) => Err(e.into()),
        }
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!(%method, %url, "Sending request");
        self.http
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::UnexpectedResponse(e.to_string()))
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<()> {
        let response = builder.send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        url: Url,
        rel: &str,
    ) -> Result<Page<T>> {
        let body: PagedBody<T> = self.send_json(self.request(Method::GET, url)).await?;
        Ok(body.into_page(rel))
    }

    // ---- Entry point -------------------------------------------------------

    /// `GET /`: the link relations the server advertises.
    pub async fn discover(&self) -> Result<Links> {
        let body: IndexBody = self
            .send_json(self.request(Method::GET, self.url("/")?))
            .await?;
        Ok(body.links)
    }

    pub async fn health(&self) -> Result<Health> {
        self.send_json(self.request(Method::GET, self.url("/health")?))
            .await
    }

    // ---- Universities ------------------------------------------------------

    pub async fn list_universities(&self, params: &PageParams) -> Result<Page<University>> {
        let url = with_query(self.url("/universities")?, params.pairs());
        self.get_page(url, "universities").await
    }

    pub async fn search_universities(&self, params: &SearchParams) -> Result<Page<University>> {
        let url = with_query(self.url("/universities/search")?, params.pairs());
        self.get_page(url, "universities").await
    }

    pub async fn get_university(&self, id: i64) -> Result<University> {
        self.send_json(self.request(Method::GET, self.url(&format!("/universities/{id}"))?))
            .await
    }

    pub async fn create_university(&self, input: &UniversityInput) -> Result<University> {
        let university: University = self
            .send_json(
                self.request(Method::POST, self.url("/universities")?)
                    .json(input),
            )
            .await?;
        tracing::info!(id = university.id, "Created university");
        Ok(university)
    }

    pub async fn update_university(&self, id: i64, input: &UniversityInput) -> Result<University> {
        self.put(&format!("/universities/{id}"), input).await
    }

    pub async fn delete_university(&self, id: i64) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, self.url(&format!("/universities/{id}"))?))
            .await
    }

    pub async fn university_modules(&self, id: i64) -> Result<Vec<Module>> {
        let mut body: CollectionBody<Module> = self
            .send_json(self.request(
                Method::GET,
                self.url(&format!("/universities/{id}/modules"))?,
            ))
            .await?;
        Ok(body.embedded.remove("modules").unwrap_or_default())
    }

    // ---- Modules -----------------------------------------------------------

    pub async fn list_modules(&self, params: &PageParams) -> Result<Page<Module>> {
        let url = with_query(self.url("/modules")?, params.pairs());
        self.get_page(url, "modules").await
    }

    pub async fn get_module(&self, id: i64) -> Result<Module> {
        self.send_json(self.request(Method::GET, self.url(&format!("/modules/{id}"))?))
            .await
    }

    pub async fn create_module(&self, input: &ModuleInput) -> Result<Module> {
        let module: Module = self
            .send_json(self.request(Method::POST, self.url("/modules")?).json(input))
            .await?;
        tracing::info!(id = module.id, university_id = module.university.id, "Created module");
        Ok(module)
    }

    pub async fn update_module(&self, id: i64, input: &ModuleInput) -> Result<Module> {
        self.put(&format!("/modules/{id}"), input).await
    }

    pub async fn delete_module(&self, id: i64) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, self.url(&format!("/modules/{id}"))?))
            .await
    }

    // ---- Paging ------------------------------------------------------------

    /// Follow the `next` link of a page. `None` on the last page.
    pub async fn next_page<T: DeserializeOwned>(
        &self,
        page: &Page<T>,
        rel: &str,
    ) -> Result<Option<Page<T>>> {
        match page.links.get("next") {
            Some(link) => Ok(Some(self.get_page(self.resolve(&link.href)?, rel).await?)),
            None => Ok(None),
        }
    }

    async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.send_json(self.request(Method::PUT, self.url(path)?).json(body))
            .await
    }
}

fn with_query(mut url: Url, pairs: Vec<(&'static str, String)>) -> Url {
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    url
}

/// Turn non-success responses into [`ClientError::Api`].
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => (body.error, body.message),
        Err(_) => (default_code(status).to_string(), text),
    };
    tracing::debug!(status = status.as_u16(), %code, "API request failed");
    Err(ClientError::Api {
        status: status.as_u16(),
        code,
        message,
    })
}

fn default_code(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("error")
}
