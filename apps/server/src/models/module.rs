//! Academic modules offered by a partner university.

use super::paging::SortField;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Reference to the owning university, serialized as `{"id": N}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniversityRef {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: i64,
    pub name: String,
    pub semester: i32,
    pub credit_points: i32,
    pub university: UniversityRef,
}

impl Module {
    pub(crate) fn from_draft(id: i64, draft: &ModuleDraft) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            semester: draft.semester,
            credit_points: draft.credit_points,
            university: UniversityRef {
                id: draft.university_id,
            },
        }
    }

    pub fn university_id(&self) -> i64 {
        self.university.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuleSortField {
    #[default]
    Id,
    Name,
    Semester,
    CreditPoints,
}

impl SortField for ModuleSortField {
    const ENTITY: &'static str = "Module";

    fn property(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Semester => "semester",
            Self::CreditPoints => "creditPoints",
        }
    }

    fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Semester => "semester",
            Self::CreditPoints => "credit_points",
        }
    }

    fn is_text(&self) -> bool {
        matches!(self, Self::Name)
    }

    fn all() -> &'static [Self] {
        &[Self::Id, Self::Name, Self::Semester, Self::CreditPoints]
    }
}

/// Module fields ready to persist, owner included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleDraft {
    pub name: String,
    pub semester: i32,
    pub credit_points: i32,
    pub university_id: i64,
}

/// Request body for `POST /modules` and `PUT /modules/{id}`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ModulePayload {
    pub name: String,
    #[validate(range(min = 0, message = "semester must be >= 0"))]
    pub semester: i32,
    #[validate(range(min = 0, message = "creditPoints must be >= 0"))]
    pub credit_points: i32,
    pub university: Option<UniversityRef>,
}

impl ModulePayload {
    /// Validate field ranges and require an owning university reference.
    /// Whether that university exists is checked by the service.
    pub fn into_draft(self) -> Result<ModuleDraft> {
        self.validate()?;
        let university = self.university.ok_or_else(|| {
            Error::Validation("university is required (expected {\"id\": <universityId>})".into())
        })?;
        Ok(ModuleDraft {
            name: self.name,
            semester: self.semester,
            credit_points: self.credit_points,
            university_id: university.id,
        })
    }
}

/// Whether a save inserted a new row or changed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOperation {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriteResult<T> {
    pub entity: T,
    pub operation: WriteOperation,
}

impl<T> WriteResult<T> {
    pub fn created(entity: T) -> Self {
        Self {
            entity,
            operation: WriteOperation::Created,
        }
    }

    pub fn updated(entity: T) -> Self {
        Self {
            entity,
            operation: WriteOperation::Updated,
        }
    }

    pub fn is_created(&self) -> bool {
        self.operation == WriteOperation::Created
    }
}
