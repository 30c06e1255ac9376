//! Domain models

pub mod module;
pub mod paging;
pub mod university;

pub use module::{
    Module, ModuleDraft, ModulePayload, ModuleSortField, UniversityRef, WriteOperation,
    WriteResult,
};
pub use paging::{Direction, Page, PageRequest, Sort, SortField};
pub use university::{
    NestedModuleDraft, NestedModulePayload, University, UniversityDraft, UniversityFilter,
    UniversityPayload, UniversitySortField,
};
