//! Repository trait definitions

use crate::{
    models::{
        Module, ModuleDraft, ModuleSortField, Page, PageRequest, University, UniversityDraft,
        UniversityFilter, UniversitySortField,
    },
    Result,
};
use async_trait::async_trait;

/// Storage of universities together with the modules they own.
#[async_trait]
pub trait UniversityRepository: Send + Sync {
    /// One page of universities, modules embedded.
    async fn find_all(&self, request: &PageRequest<UniversitySortField>)
        -> Result<Page<University>>;

    /// Universities matching every filter, ordered by the requested field with
    /// id ascending as tie-breaker.
    async fn search(
        &self,
        filter: &UniversityFilter,
        request: &PageRequest<UniversitySortField>,
    ) -> Result<Page<University>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<University>>;

    async fn exists(&self, id: i64) -> Result<bool>;

    /// Insert a university and its nested modules in one unit of work.
    /// `id = None` assigns a fresh id.
    async fn insert(&self, id: Option<i64>, draft: &UniversityDraft) -> Result<University>;

    /// Overwrite every field of an existing university. When the draft lists
    /// modules they replace the owned set. `None` if the id is unknown.
    async fn update(&self, id: i64, draft: &UniversityDraft) -> Result<Option<University>>;

    /// Delete the university row. Returns the number of rows removed.
    async fn delete(&self, id: i64) -> Result<u64>;

    /// Cheap round trip to the backing store.
    async fn ping(&self) -> Result<()>;
}

#[async_trait]
pub trait ModuleRepository: Send + Sync {
    async fn find_all(&self, request: &PageRequest<ModuleSortField>) -> Result<Page<Module>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Module>>;

    /// Modules owned by a university, ordered by id.
    async fn find_by_university_id(&self, university_id: i64) -> Result<Vec<Module>>;

    async fn insert(&self, id: Option<i64>, draft: &ModuleDraft) -> Result<Module>;

    async fn update(&self, id: i64, draft: &ModuleDraft) -> Result<Option<Module>>;

    async fn delete(&self, id: i64) -> Result<u64>;

    async fn delete_by_university_id(&self, university_id: i64) -> Result<u64>;
}
