//! Module service - business rules for academic modules

use crate::{
    db::{ModuleRepository, UniversityRepository},
    models::{Module, ModuleDraft, ModuleSortField, Page, PageRequest, WriteResult},
    Error, Result,
};
use std::sync::Arc;

pub struct ModuleService {
    modules: Arc<dyn ModuleRepository>,
    universities: Arc<dyn UniversityRepository>,
    allow_update_create: bool,
}

impl ModuleService {
    pub fn new(
        modules: Arc<dyn ModuleRepository>,
        universities: Arc<dyn UniversityRepository>,
    ) -> Self {
        Self::new_with_policy(modules, universities, false)
    }

    pub fn new_with_policy(
        modules: Arc<dyn ModuleRepository>,
        universities: Arc<dyn UniversityRepository>,
        allow_update_create: bool,
    ) -> Self {
        Self {
            modules,
            universities,
            allow_update_create,
        }
    }

    pub async fn find_all(&self, request: &PageRequest<ModuleSortField>) -> Result<Page<Module>> {
        self.modules.find_all(request).await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Module> {
        self.modules
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::module_not_found(id))
    }

    /// Modules owned by a university, ordered by id.
    pub async fn find_by_university_id(&self, university_id: i64) -> Result<Vec<Module>> {
        if !self.universities.exists(university_id).await? {
            return Err(Error::university_not_found(university_id));
        }
        self.modules.find_by_university_id(university_id).await
    }

    /// Create a module under an existing university.
    pub async fn save(&self, draft: ModuleDraft) -> Result<Module> {
        self.ensure_university(draft.university_id).await?;

        let module = self.modules.insert(None, &draft).await?;
        tracing::info!(
            module_id = module.id,
            university_id = module.university_id(),
            "Created module"
        );
        Ok(module)
    }

    /// Overwrite every field of a module, including its owner.
    ///
    /// An unknown id is created under that id when update-as-create is
    /// enabled and rejected with NotFound otherwise.
    pub async fn update(&self, id: i64, draft: ModuleDraft) -> Result<WriteResult<Module>> {
        self.ensure_university(draft.university_id).await?;

        if let Some(module) = self.modules.update(id, &draft).await? {
            tracing::info!(
                module_id = id,
                university_id = module.university_id(),
                "Updated module"
            );
            return Ok(WriteResult::updated(module));
        }

        if !self.allow_update_create {
            return Err(Error::module_not_found(id));
        }

        let module = self.modules.insert(Some(id), &draft).await?;
        tracing::info!(
            module_id = id,
            university_id = module.university_id(),
            "Created module via update"
        );
        Ok(WriteResult::created(module))
    }

    /// Returns whether a row was removed. Missing ids are not an error.
    pub async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let removed = self.modules.delete(id).await? > 0;
        if removed {
            tracing::info!(module_id = id, "Deleted module");
        } else {
            tracing::debug!(module_id = id, "Delete of unknown module ignored");
        }
        Ok(removed)
    }

    /// Bulk delete used by the university delete cascade.
    pub async fn delete_by_university_id(&self, university_id: i64) -> Result<u64> {
        let removed = self.modules.delete_by_university_id(university_id).await?;
        tracing::debug!(university_id, removed, "Deleted modules of university");
        Ok(removed)
    }

    async fn ensure_university(&self, university_id: i64) -> Result<()> {
        if self.universities.exists(university_id).await? {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "university {university_id} does not exist"
            )))
        }
    }
}
