//! Business logic layer
//!
//! Services apply the domain rules (ownership, cascade, update policy) on top
//! of the repositories they are constructed with.

pub mod module;
pub mod university;

pub use module::ModuleService;
pub use university::UniversityService;
