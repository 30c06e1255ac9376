//! University aggregate and its write payloads.

use super::module::Module;
use super::paging::SortField;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A partner university together with the modules it owns (ordered by id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct University {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub department_name: String,
    pub department_url: Option<String>,
    pub contact_person: Option<String>,
    pub max_outgoing_students: i32,
    pub max_incoming_students: i32,
    pub next_spring_semester_start: Option<String>,
    pub next_autumn_semester_start: Option<String>,
    #[serde(default)]
    pub modules: Vec<Module>,
}

impl University {
    pub(crate) fn from_draft(id: i64, draft: &UniversityDraft, modules: Vec<Module>) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            country: draft.country.clone(),
            department_name: draft.department_name.clone(),
            department_url: draft.department_url.clone(),
            contact_person: draft.contact_person.clone(),
            max_outgoing_students: draft.max_outgoing_students,
            max_incoming_students: draft.max_incoming_students,
            next_spring_semester_start: draft.next_spring_semester_start.clone(),
            next_autumn_semester_start: draft.next_autumn_semester_start.clone(),
            modules,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UniversitySortField {
    #[default]
    Id,
    Name,
    Country,
    DepartmentName,
    DepartmentUrl,
    ContactPerson,
    MaxOutgoingStudents,
    MaxIncomingStudents,
    NextSpringSemesterStart,
    NextAutumnSemesterStart,
}

impl SortField for UniversitySortField {
    const ENTITY: &'static str = "University";

    fn property(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Country => "country",
            Self::DepartmentName => "departmentName",
            Self::DepartmentUrl => "departmentUrl",
            Self::ContactPerson => "contactPerson",
            Self::MaxOutgoingStudents => "maxOutgoingStudents",
            Self::MaxIncomingStudents => "maxIncomingStudents",
            Self::NextSpringSemesterStart => "nextSpringSemesterStart",
            Self::NextAutumnSemesterStart => "nextAutumnSemesterStart",
        }
    }

    fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Country => "country",
            Self::DepartmentName => "department_name",
            Self::DepartmentUrl => "department_url",
            Self::ContactPerson => "contact_person",
            Self::MaxOutgoingStudents => "max_outgoing_students",
            Self::MaxIncomingStudents => "max_incoming_students",
            Self::NextSpringSemesterStart => "next_spring_semester_start",
            Self::NextAutumnSemesterStart => "next_autumn_semester_start",
        }
    }

    fn is_text(&self) -> bool {
        !matches!(
            self,
            Self::Id | Self::MaxOutgoingStudents | Self::MaxIncomingStudents
        )
    }

    fn all() -> &'static [Self] {
        &[
            Self::Id,
            Self::Name,
            Self::Country,
            Self::DepartmentName,
            Self::DepartmentUrl,
            Self::ContactPerson,
            Self::MaxOutgoingStudents,
            Self::MaxIncomingStudents,
            Self::NextSpringSemesterStart,
            Self::NextAutumnSemesterStart,
        ]
    }
}

/// Substring filters for university search. Matching is case-sensitive,
/// all filters must match and an empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniversityFilter {
    pub name: String,
    pub country: String,
    pub department_name: String,
}

impl UniversityFilter {
    pub fn matches(&self, university: &University) -> bool {
        university.name.contains(&self.name)
            && university.country.contains(&self.country)
            && university.department_name.contains(&self.department_name)
    }
}

/// Validated university fields, ready to persist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniversityDraft {
    pub name: String,
    pub country: String,
    pub department_name: String,
    pub department_url: Option<String>,
    pub contact_person: Option<String>,
    pub max_outgoing_students: i32,
    pub max_incoming_students: i32,
    pub next_spring_semester_start: Option<String>,
    pub next_autumn_semester_start: Option<String>,
    /// `None` leaves the owned module set untouched on update.
    /// `Some` replaces it entirely.
    pub modules: Option<Vec<NestedModuleDraft>>,
}

/// A module listed inside a university payload. It always belongs to the
/// enclosing university, whatever reference it carried on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NestedModuleDraft {
    /// Id of an existing module to keep (and re-parent); unknown ids are
    /// created as new modules.
    pub id: Option<i64>,
    pub name: String,
    pub semester: i32,
    pub credit_points: i32,
}

/// Request body for `POST /universities` and `PUT /universities/{id}`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UniversityPayload {
    pub name: String,
    pub country: String,
    pub department_name: String,
    #[validate(url(message = "departmentUrl must be a valid URL"))]
    pub department_url: Option<String>,
    pub contact_person: Option<String>,
    #[validate(range(min = 0, message = "maxOutgoingStudents must be >= 0"))]
    pub max_outgoing_students: i32,
    #[validate(range(min = 0, message = "maxIncomingStudents must be >= 0"))]
    pub max_incoming_students: i32,
    pub next_spring_semester_start: Option<String>,
    pub next_autumn_semester_start: Option<String>,
    pub modules: Option<Vec<NestedModulePayload>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct NestedModulePayload {
    pub id: Option<i64>,
    pub name: String,
    #[validate(range(min = 0, message = "semester must be >= 0"))]
    pub semester: i32,
    #[validate(range(min = 0, message = "creditPoints must be >= 0"))]
    pub credit_points: i32,
}

impl UniversityPayload {
    pub fn into_draft(mut self) -> Result<UniversityDraft> {
        // Blank optional fields mean "unset" and skip their validators.
        self.department_url = blank_to_none(self.department_url);
        self.next_spring_semester_start = blank_to_none(self.next_spring_semester_start);
        self.next_autumn_semester_start = blank_to_none(self.next_autumn_semester_start);
        self.validate()?;
        validate_semester_start("nextSpringSemesterStart", &self.next_spring_semester_start)?;
        validate_semester_start("nextAutumnSemesterStart", &self.next_autumn_semester_start)?;

        let modules = match self.modules {
            Some(modules) => {
                let mut drafts = Vec::with_capacity(modules.len());
                for module in modules {
                    module.validate()?;
                    drafts.push(NestedModuleDraft {
                        id: module.id,
                        name: module.name,
                        semester: module.semester,
                        credit_points: module.credit_points,
                    });
                }
                Some(drafts)
            }
            None => None,
        };

        Ok(UniversityDraft {
            name: self.name,
            country: self.country,
            department_name: self.department_name,
            department_url: self.department_url,
            contact_person: self.contact_person,
            max_outgoing_students: self.max_outgoing_students,
            max_incoming_students: self.max_incoming_students,
            next_spring_semester_start: self.next_spring_semester_start,
            next_autumn_semester_start: self.next_autumn_semester_start,
            modules,
        })
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn validate_semester_start(field: &str, value: &Option<String>) -> Result<()> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(()),
        Some(raw) => chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(|_| ())
            .map_err(|_| Error::Validation(format!("{field} must be a date (YYYY-MM-DD), got '{raw}'"))),
    }
}
