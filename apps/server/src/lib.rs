//! Partner universities server library
//!
//! REST backend for partner universities and the academic modules they
//! offer: hypermedia CRUD, paginated listing and filtered search over a
//! PostgreSQL (or in-memory) store.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

pub use error::{Error, Result};
