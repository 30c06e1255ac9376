//! University service - business rules for partner universities

use crate::{
    db::UniversityRepository,
    models::{
        Direction, Page, PageRequest, Sort, SortField, University, UniversityDraft,
        UniversityFilter, UniversitySortField, WriteResult,
    },
    services::ModuleService,
    Error, Result,
};
use std::sync::Arc;

pub struct UniversityService {
    universities: Arc<dyn UniversityRepository>,
    modules: Arc<ModuleService>,
    allow_update_create: bool,
}

impl UniversityService {
    pub fn new(universities: Arc<dyn UniversityRepository>, modules: Arc<ModuleService>) -> Self {
        Self::new_with_policy(universities, modules, false)
    }

    pub fn new_with_policy(
        universities: Arc<dyn UniversityRepository>,
        modules: Arc<ModuleService>,
        allow_update_create: bool,
    ) -> Self {
        Self {
            universities,
            modules,
            allow_update_create,
        }
    }

    pub async fn find_all(
        &self,
        request: &PageRequest<UniversitySortField>,
    ) -> Result<Page<University>> {
        self.universities.find_all(request).await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<University> {
        self.universities
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::university_not_found(id))
    }

    /// Create a university, persisting any nested modules under it.
    pub async fn save(&self, draft: UniversityDraft) -> Result<University> {
        let university = self.universities.insert(None, &draft).await?;
        tracing::info!(
            university_id = university.id,
            modules = university.modules.len(),
            "Created university"
        );
        Ok(university)
    }

    /// Full-field overwrite. A `modules` list in the draft replaces the owned
    /// set and re-parents each listed module to this university.
    pub async fn update(&self, id: i64, draft: UniversityDraft) -> Result<WriteResult<University>> {
        if let Some(university) = self.universities.update(id, &draft).await? {
            tracing::info!(
                university_id = id,
                modules_replaced = draft.modules.is_some(),
                "Updated university"
            );
            return Ok(WriteResult::updated(university));
        }

        if !self.allow_update_create {
            return Err(Error::university_not_found(id));
        }

        let university = self.universities.insert(Some(id), &draft).await?;
        tracing::info!(university_id = id, "Created university via update");
        Ok(WriteResult::created(university))
    }

    /// Delete a university and every module it owns.
    ///
    /// Modules go first; the foreign key cascade covers anything a concurrent
    /// writer adds in between. Missing ids are not an error.
    pub async fn delete_by_id(&self, id: i64) -> Result<bool> {
        if !self.universities.exists(id).await? {
            tracing::debug!(university_id = id, "Delete of unknown university ignored");
            return Ok(false);
        }

        let modules_removed = self.modules.delete_by_university_id(id).await?;
        let removed = self.universities.delete(id).await? > 0;
        tracing::info!(university_id = id, modules_removed, "Deleted university");
        Ok(removed)
    }

    /// Case-sensitive substring search over name, country and department.
    ///
    /// `direction` equal to `asc` (any case) sorts ascending, anything else
    /// descending. Unknown `sort_by` properties are rejected.
    pub async fn search_universities(
        &self,
        filter: &UniversityFilter,
        page: u32,
        size: u32,
        sort_by: &str,
        direction: &str,
    ) -> Result<Page<University>> {
        let sort = Sort::new(
            UniversitySortField::parse(sort_by)?,
            Direction::parse_lenient(direction),
        );
        let request = PageRequest::new(page, size, sort)?;

        tracing::debug!(
            name = %filter.name,
            country = %filter.country,
            department_name = %filter.department_name,
            sort = %sort.to_param(),
            page,
            size,
            "Searching universities"
        );

        self.universities.search(filter, &request).await
    }

    pub async fn ping(&self) -> Result<()> {
        self.universities.ping().await
    }
}
