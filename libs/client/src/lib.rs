//! Client SDK for the partner universities API.
//!
//! ```no_run
//! # async fn run() -> partner_universities_client::Result<()> {
//! use partner_universities_client::{PartnerUniversitiesClient, SearchParams};
//!
//! let client = PartnerUniversitiesClient::new("http://localhost:8080")?;
//! let page = client
//!     .search_universities(&SearchParams {
//!         name: Some("Test".into()),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("{} matches", page.page.total_elements);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
pub mod models;

pub use client::PartnerUniversitiesClient;
pub use error::{ClientError, Result};
pub use models::{
    Health, Link, Links, Module, ModuleInput, NestedModuleInput, Page, PageMetadata, PageParams,
    SearchParams, University, UniversityInput, UniversityRef,
};
