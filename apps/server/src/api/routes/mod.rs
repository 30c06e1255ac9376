//! Route tables

pub mod modules;
pub mod universities;

pub use modules::module_routes;
pub use universities::university_routes;
