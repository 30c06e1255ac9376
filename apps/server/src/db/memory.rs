//! In-process repository implementation.
//!
//! Mirrors the PostgreSQL schema rules (foreign key from modules to
//! universities, cascade on delete, byte-wise text ordering) so tests and
//! local runs observe the same behaviour without a database.

use async_trait::async_trait;
use std::{
    cmp::Ordering,
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::{
    db::traits::{ModuleRepository, UniversityRepository},
    models::{
        Direction, Module, ModuleDraft, ModuleSortField, NestedModuleDraft, Page, PageRequest,
        SortField, University, UniversityDraft, UniversityFilter, UniversitySortField,
    },
    Error, Result,
};

#[derive(Default)]
struct Tables {
    /// Universities without their `modules` (assembled on read).
    universities: BTreeMap<i64, University>,
    modules: BTreeMap<i64, Module>,
    next_university_id: i64,
    next_module_id: i64,
}

impl Tables {
    fn allocate_university_id(&mut self, requested: Option<i64>) -> Result<i64> {
        allocate(
            &mut self.next_university_id,
            requested,
            |id| self.universities.contains_key(&id),
            "universities",
        )
    }

    fn allocate_module_id(&mut self, requested: Option<i64>) -> Result<i64> {
        allocate(
            &mut self.next_module_id,
            requested,
            |id| self.modules.contains_key(&id),
            "modules",
        )
    }

    fn modules_of(&self, university_id: i64) -> Vec<Module> {
        // BTreeMap iteration keeps id order.
        self.modules
            .values()
            .filter(|m| m.university_id() == university_id)
            .cloned()
            .collect()
    }

    fn assemble(&self, university: &University) -> University {
        let mut assembled = university.clone();
        assembled.modules = self.modules_of(university.id);
        assembled
    }

    fn check_university_ref(&self, university_id: i64) -> Result<()> {
        if self.universities.contains_key(&university_id) {
            Ok(())
        } else {
            Err(Error::ConstraintViolation(format!(
                "modules.university_id references missing university {university_id}"
            )))
        }
    }

    fn replace_modules(&mut self, university_id: i64, modules: &[NestedModuleDraft]) -> Result<()> {
        let mut kept = Vec::with_capacity(modules.len());

        for nested in modules {
            let draft = ModuleDraft {
                name: nested.name.clone(),
                semester: nested.semester,
                credit_points: nested.credit_points,
                university_id,
            };
            let id = match nested.id.filter(|id| self.modules.contains_key(id)) {
                Some(id) => id,
                None => self.allocate_module_id(None)?,
            };
            self.modules.insert(id, Module::from_draft(id, &draft));
            kept.push(id);
        }

        self.modules
            .retain(|id, m| m.university_id() != university_id || kept.contains(id));
        Ok(())
    }
}

fn allocate(
    next: &mut i64,
    requested: Option<i64>,
    taken: impl Fn(i64) -> bool,
    table: &str,
) -> Result<i64> {
    match requested {
        Some(id) if taken(id) => Err(Error::ConstraintViolation(format!(
            "duplicate key value violates unique constraint \"{table}_pkey\" (id={id})"
        ))),
        Some(id) => {
            *next = (*next).max(id);
            Ok(id)
        }
        None => loop {
            *next = next.checked_add(1).ok_or_else(|| {
                Error::ConstraintViolation(format!("{table}_id_seq reached its maximum value"))
            })?;
            if !taken(*next) {
                break Ok(*next);
            }
        },
    }
}

fn directed(ordering: Ordering, direction: Direction) -> Ordering {
    match direction {
        Direction::Asc => ordering,
        Direction::Desc => ordering.reverse(),
    }
}

fn compare_universities(a: &University, b: &University, field: UniversitySortField) -> Ordering {
    use UniversitySortField as F;
    match field {
        F::Id => a.id.cmp(&b.id),
        F::Name => a.name.cmp(&b.name),
        F::Country => a.country.cmp(&b.country),
        F::DepartmentName => a.department_name.cmp(&b.department_name),
        F::DepartmentUrl => a.department_url.cmp(&b.department_url),
        F::ContactPerson => a.contact_person.cmp(&b.contact_person),
        F::MaxOutgoingStudents => a.max_outgoing_students.cmp(&b.max_outgoing_students),
        F::MaxIncomingStudents => a.max_incoming_students.cmp(&b.max_incoming_students),
        F::NextSpringSemesterStart => a
            .next_spring_semester_start
            .cmp(&b.next_spring_semester_start),
        F::NextAutumnSemesterStart => a
            .next_autumn_semester_start
            .cmp(&b.next_autumn_semester_start),
    }
}

fn compare_modules(a: &Module, b: &Module, field: ModuleSortField) -> Ordering {
    match field {
        ModuleSortField::Id => a.id.cmp(&b.id),
        ModuleSortField::Name => a.name.cmp(&b.name),
        ModuleSortField::Semester => a.semester.cmp(&b.semester),
        ModuleSortField::CreditPoints => a.credit_points.cmp(&b.credit_points),
    }
}

/// Sort, then cut out the requested page.
fn paginate<T, F>(
    mut items: Vec<T>,
    request: &PageRequest<F>,
    compare: impl Fn(&T, &T, F) -> Ordering,
    id_of: impl Fn(&T) -> i64,
) -> Page<T>
where
    F: SortField,
{
    let sort = request.sort;
    items.sort_by(|a, b| {
        directed(compare(a, b, sort.field), sort.direction).then_with(|| id_of(a).cmp(&id_of(b)))
    });

    let total = items.len() as u64;
    let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(request.limit()).unwrap_or(usize::MAX);
    let page_items = items.into_iter().skip(offset).take(limit).collect();
    Page::new(page_items, request.page, request.size, total)
}

/// Process-local store. Cloning shares the same tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Lock poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UniversityRepository for InMemoryStore {
    async fn find_all(
        &self,
        request: &PageRequest<UniversitySortField>,
    ) -> Result<Page<University>> {
        let tables = self.read();
        let all: Vec<University> = tables.universities.values().cloned().collect();
        Ok(paginate(all, request, compare_universities, |u| u.id).map(|u| tables.assemble(&u)))
    }

    async fn search(
        &self,
        filter: &UniversityFilter,
        request: &PageRequest<UniversitySortField>,
    ) -> Result<Page<University>> {
        let tables = self.read();
        let matching: Vec<University> = tables
            .universities
            .values()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect();
        Ok(paginate(matching, request, compare_universities, |u| u.id)
            .map(|u| tables.assemble(&u)))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<University>> {
        let tables = self.read();
        Ok(tables.universities.get(&id).map(|u| tables.assemble(u)))
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        Ok(self.read().universities.contains_key(&id))
    }

    async fn insert(&self, id: Option<i64>, draft: &UniversityDraft) -> Result<University> {
        let mut tables = self.write();
        let id = tables.allocate_university_id(id)?;
        tables
            .universities
            .insert(id, University::from_draft(id, draft, Vec::new()));
        if let Some(modules) = &draft.modules {
            tables.replace_modules(id, modules)?;
        }
        let stored = &tables.universities[&id];
        Ok(tables.assemble(stored))
    }

    async fn update(&self, id: i64, draft: &UniversityDraft) -> Result<Option<University>> {
        let mut tables = self.write();
        if !tables.universities.contains_key(&id) {
            return Ok(None);
        }
        tables
            .universities
            .insert(id, University::from_draft(id, draft, Vec::new()));
        if let Some(modules) = &draft.modules {
            tables.replace_modules(id, modules)?;
        }
        let stored = &tables.universities[&id];
        Ok(Some(tables.assemble(stored)))
    }

    async fn delete(&self, id: i64) -> Result<u64> {
        let mut tables = self.write();
        if tables.universities.remove(&id).is_none() {
            return Ok(0);
        }
        // ON DELETE CASCADE
        tables.modules.retain(|_, m| m.university_id() != id);
        Ok(1)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl ModuleRepository for InMemoryStore {
    async fn find_all(&self, request: &PageRequest<ModuleSortField>) -> Result<Page<Module>> {
        let all: Vec<Module> = self.read().modules.values().cloned().collect();
        Ok(paginate(all, request, compare_modules, |m| m.id))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Module>> {
        Ok(self.read().modules.get(&id).cloned())
    }

    async fn find_by_university_id(&self, university_id: i64) -> Result<Vec<Module>> {
        Ok(self.read().modules_of(university_id))
    }

    async fn insert(&self, id: Option<i64>, draft: &ModuleDraft) -> Result<Module> {
        let mut tables = self.write();
        tables.check_university_ref(draft.university_id)?;
        let id = tables.allocate_module_id(id)?;
        let module = Module::from_draft(id, draft);
        tables.modules.insert(id, module.clone());
        Ok(module)
    }

    async fn update(&self, id: i64, draft: &ModuleDraft) -> Result<Option<Module>> {
        let mut tables = self.write();
        if !tables.modules.contains_key(&id) {
            return Ok(None);
        }
        tables.check_university_ref(draft.university_id)?;
        let module = Module::from_draft(id, draft);
        tables.modules.insert(id, module.clone());
        Ok(Some(module))
    }

    async fn delete(&self, id: i64) -> Result<u64> {
        Ok(u64::from(self.write().modules.remove(&id).is_some()))
    }

    async fn delete_by_university_id(&self, university_id: i64) -> Result<u64> {
        let mut tables = self.write();
        let before = tables.modules.len();
        tables.modules.retain(|_, m| m.university_id() != university_id);
        Ok((before - tables.modules.len()) as u64)
    }
}
