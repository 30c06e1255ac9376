//! PostgreSQL-backed repository implementations

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;

use crate::{
    db::traits::{ModuleRepository, UniversityRepository},
    models::{
        Direction, Module, ModuleDraft, ModuleSortField, NestedModuleDraft, Page, PageRequest,
        Sort, SortField, University, UniversityDraft, UniversityFilter, UniversityRef,
        UniversitySortField,
    },
    Result,
};

const UNIVERSITY_COLUMNS: &str = "id, name, country, department_name, department_url, \
     contact_person, max_outgoing_students, max_incoming_students, \
     next_spring_semester_start, next_autumn_semester_start";

const MODULE_COLUMNS: &str = "id, name, semester, credit_points, university_id";

#[derive(Debug, sqlx::FromRow)]
struct UniversityRow {
    id: i64,
    name: String,
    country: String,
    department_name: String,
    department_url: Option<String>,
    contact_person: Option<String>,
    max_outgoing_students: i32,
    max_incoming_students: i32,
    next_spring_semester_start: Option<String>,
    next_autumn_semester_start: Option<String>,
}

impl UniversityRow {
    fn into_university(self, modules: Vec<Module>) -> University {
        University {
            id: self.id,
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
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ModuleRow {
    id: i64,
    name: String,
    semester: i32,
    credit_points: i32,
    university_id: i64,
}

impl From<ModuleRow> for Module {
    fn from(row: ModuleRow) -> Self {
        Module {
            id: row.id,
            name: row.name,
            semester: row.semester,
            credit_points: row.credit_points,
            university: UniversityRef {
                id: row.university_id,
            },
        }
    }
}

/// Repositories for both tables over one connection pool.
#[derive(Clone)]
pub struct PostgresStore {
    pub(crate) pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Embed each university's modules, ordered by module id.
    async fn attach_modules(&self, rows: Vec<UniversityRow>) -> Result<Vec<University>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let sql = format!(
            "SELECT {MODULE_COLUMNS} FROM modules WHERE university_id = ANY($1) ORDER BY id ASC"
        );
        let module_rows: Vec<ModuleRow> = sqlx::query_as(&sql)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;

        let mut by_university: HashMap<i64, Vec<Module>> = HashMap::new();
        for row in module_rows {
            by_university
                .entry(row.university_id)
                .or_default()
                .push(row.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let modules = by_university.remove(&row.id).unwrap_or_default();
                row.into_university(modules)
            })
            .collect())
    }
}

/// `ORDER BY` clause for a whitelisted sort field.
///
/// Text is compared byte-wise and NULLs sort lowest, so both backends agree
/// on ordering. Ties are broken by id ascending.
fn order_by<F: SortField>(sort: &Sort<F>) -> String {
    let direction = sort.direction.as_sql();
    if sort.field.column() == "id" {
        return format!("ORDER BY id {direction}");
    }
    let collate = if sort.field.is_text() {
        " COLLATE \"C\""
    } else {
        ""
    };
    let nulls = match sort.direction {
        Direction::Asc => "NULLS FIRST",
        Direction::Desc => "NULLS LAST",
    };
    format!(
        "ORDER BY {}{collate} {direction} {nulls}, id ASC",
        sort.field.column()
    )
}

fn limit_offset<F: SortField>(request: &PageRequest<F>) -> (i64, i64) {
    let limit = i64::try_from(request.limit()).unwrap_or(i64::MAX);
    let offset = i64::try_from(request.offset()).unwrap_or(i64::MAX);
    (limit, offset)
}

/// Escape `LIKE` wildcards so filters match literally.
fn like_contains(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('%');
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn to_total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

/// Keep the id sequence ahead of rows inserted under an explicit id.
async fn sync_sequence(conn: &mut PgConnection, table: &str) -> Result<()> {
    let sql = format!(
        "SELECT setval(pg_get_serial_sequence('{table}', 'id'), \
         GREATEST((SELECT COALESCE(MAX(id), 0) FROM {table}), 1))"
    );
    sqlx::query(&sql).execute(&mut *conn).await?;
    Ok(())
}

async fn insert_university_row(
    conn: &mut PgConnection,
    id: Option<i64>,
    draft: &UniversityDraft,
) -> Result<UniversityRow> {
    let sql = format!(
        "INSERT INTO universities ({UNIVERSITY_COLUMNS})
         VALUES (COALESCE($1::BIGINT, nextval(pg_get_serial_sequence('universities', 'id'))),
                 $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING {UNIVERSITY_COLUMNS}"
    );
    let row: UniversityRow = sqlx::query_as(&sql)
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.country)
        .bind(&draft.department_name)
        .bind(&draft.department_url)
        .bind(&draft.contact_person)
        .bind(draft.max_outgoing_students)
        .bind(draft.max_incoming_students)
        .bind(&draft.next_spring_semester_start)
        .bind(&draft.next_autumn_semester_start)
        .fetch_one(&mut *conn)
        .await?;

    if id.is_some() {
        sync_sequence(conn, "universities").await?;
    }
    Ok(row)
}

async fn insert_module_row(
    conn: &mut PgConnection,
    id: Option<i64>,
    draft: &ModuleDraft,
) -> Result<Module> {
    let sql = format!(
        "INSERT INTO modules ({MODULE_COLUMNS})
         VALUES (COALESCE($1::BIGINT, nextval(pg_get_serial_sequence('modules', 'id'))),
                 $2, $3, $4, $5)
         RETURNING {MODULE_COLUMNS}"
    );
    let row: ModuleRow = sqlx::query_as(&sql)
        .bind(id)
        .bind(&draft.name)
        .bind(draft.semester)
        .bind(draft.credit_points)
        .bind(draft.university_id)
        .fetch_one(&mut *conn)
        .await?;

    if id.is_some() {
        sync_sequence(conn, "modules").await?;
    }
    Ok(row.into())
}

async fn update_module_row(
    conn: &mut PgConnection,
    id: i64,
    draft: &ModuleDraft,
) -> Result<Option<Module>> {
    let sql = format!(
        "UPDATE modules
         SET name = $2, semester = $3, credit_points = $4, university_id = $5
         WHERE id = $1
         RETURNING {MODULE_COLUMNS}"
    );
    let row: Option<ModuleRow> = sqlx::query_as(&sql)
        .bind(id)
        .bind(&draft.name)
        .bind(draft.semester)
        .bind(draft.credit_points)
        .bind(draft.university_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.map(Module::from))
}

async fn modules_of(conn: &mut PgConnection, university_id: i64) -> Result<Vec<Module>> {
    let sql =
        format!("SELECT {MODULE_COLUMNS} FROM modules WHERE university_id = $1 ORDER BY id ASC");
    let rows: Vec<ModuleRow> = sqlx::query_as(&sql)
        .bind(university_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows.into_iter().map(Module::from).collect())
}

/// Make `modules` the complete module set of `university_id`.
///
/// Listed ids that exist are re-parented and overwritten, everything else in
/// the list is inserted, and prior modules missing from the list are deleted.
async fn replace_modules(
    conn: &mut PgConnection,
    university_id: i64,
    modules: &[NestedModuleDraft],
) -> Result<Vec<Module>> {
    let mut kept: Vec<i64> = Vec::with_capacity(modules.len());

    for nested in modules {
        let draft = ModuleDraft {
            name: nested.name.clone(),
            semester: nested.semester,
            credit_points: nested.credit_points,
            university_id,
        };

        let updated = match nested.id {
            Some(id) => update_module_row(conn, id, &draft).await?,
            None => None,
        };
        let module = match updated {
            Some(module) => module,
            None => insert_module_row(conn, None, &draft).await?,
        };
        kept.push(module.id);
    }

    let removed = sqlx::query("DELETE FROM modules WHERE university_id = $1 AND NOT (id = ANY($2))")
        .bind(university_id)
        .bind(&kept)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    tracing::debug!(
        university_id,
        kept = kept.len(),
        removed,
        "Replaced module set"
    );

    modules_of(conn, university_id).await
}

#[async_trait]
impl UniversityRepository for PostgresStore {
    async fn find_all(
        &self,
        request: &PageRequest<UniversitySortField>,
    ) -> Result<Page<University>> {
        let (limit, offset) = limit_offset(request);
        let sql = format!(
            "SELECT {UNIVERSITY_COLUMNS} FROM universities {} LIMIT $1 OFFSET $2",
            order_by(&request.sort)
        );
        let rows: Vec<UniversityRow> = sqlx::query_as(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM universities")
            .fetch_one(&self.pool)
            .await?;

        let items = self.attach_modules(rows).await?;
        Ok(Page::new(items, request.page, request.size, to_total(total)))
    }

    async fn search(
        &self,
        filter: &UniversityFilter,
        request: &PageRequest<UniversitySortField>,
    ) -> Result<Page<University>> {
        const WHERE: &str = "WHERE name LIKE $1 ESCAPE '\\'
               AND country LIKE $2 ESCAPE '\\'
               AND department_name LIKE $3 ESCAPE '\\'";

        let name = like_contains(&filter.name);
        let country = like_contains(&filter.country);
        let department_name = like_contains(&filter.department_name);
        let (limit, offset) = limit_offset(request);

        let sql = format!(
            "SELECT {UNIVERSITY_COLUMNS} FROM universities {WHERE} {} LIMIT $4 OFFSET $5",
            order_by(&request.sort)
        );
        let rows: Vec<UniversityRow> = sqlx::query_as(&sql)
            .bind(&name)
            .bind(&country)
            .bind(&department_name)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM universities {WHERE}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(&name)
            .bind(&country)
            .bind(&department_name)
            .fetch_one(&self.pool)
            .await?;

        let items = self.attach_modules(rows).await?;
        Ok(Page::new(items, request.page, request.size, to_total(total)))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<University>> {
        let sql = format!("SELECT {UNIVERSITY_COLUMNS} FROM universities WHERE id = $1");
        let row: Option<UniversityRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.attach_modules(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM universities WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn insert(&self, id: Option<i64>, draft: &UniversityDraft) -> Result<University> {
        let mut tx = self.pool.begin().await?;

        let row = insert_university_row(&mut tx, id, draft).await?;
        let modules = match &draft.modules {
            Some(modules) => replace_modules(&mut tx, row.id, modules).await?,
            None => Vec::new(),
        };

        tx.commit().await?;
        Ok(row.into_university(modules))
    }

    async fn update(&self, id: i64, draft: &UniversityDraft) -> Result<Option<University>> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE universities
             SET name = $2, country = $3, department_name = $4, department_url = $5,
                 contact_person = $6, max_outgoing_students = $7, max_incoming_students = $8,
                 next_spring_semester_start = $9, next_autumn_semester_start = $10
             WHERE id = $1
             RETURNING {UNIVERSITY_COLUMNS}"
        );
        let row: Option<UniversityRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(&draft.name)
            .bind(&draft.country)
            .bind(&draft.department_name)
            .bind(&draft.department_url)
            .bind(&draft.contact_person)
            .bind(draft.max_outgoing_students)
            .bind(draft.max_incoming_students)
            .bind(&draft.next_spring_semester_start)
            .bind(&draft.next_autumn_semester_start)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        let modules = match &draft.modules {
            Some(modules) => replace_modules(&mut tx, id, modules).await?,
            None => modules_of(&mut tx, id).await?,
        };

        tx.commit().await?;
        Ok(Some(row.into_university(modules)))
    }

    async fn delete(&self, id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM universities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ModuleRepository for PostgresStore {
    async fn find_all(&self, request: &PageRequest<ModuleSortField>) -> Result<Page<Module>> {
        let (limit, offset) = limit_offset(request);
        let sql = format!(
            "SELECT {MODULE_COLUMNS} FROM modules {} LIMIT $1 OFFSET $2",
            order_by(&request.sort)
        );
        let rows: Vec<ModuleRow> = sqlx::query_as(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM modules")
            .fetch_one(&self.pool)
            .await?;

        Ok(Page::new(
            rows.into_iter().map(Module::from).collect(),
            request.page,
            request.size,
            to_total(total),
        ))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Module>> {
        let sql = format!("SELECT {MODULE_COLUMNS} FROM modules WHERE id = $1");
        let row: Option<ModuleRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Module::from))
    }

    async fn find_by_university_id(&self, university_id: i64) -> Result<Vec<Module>> {
        let mut conn = self.pool.acquire().await?;
        modules_of(&mut conn, university_id).await
    }

    async fn insert(&self, id: Option<i64>, draft: &ModuleDraft) -> Result<Module> {
        let mut tx = self.pool.begin().await?;
        let module = insert_module_row(&mut tx, id, draft).await?;
        tx.commit().await?;
        Ok(module)
    }

    async fn update(&self, id: i64, draft: &ModuleDraft) -> Result<Option<Module>> {
        let mut conn = self.pool.acquire().await?;
        update_module_row(&mut conn, id, draft).await
    }

    async fn delete(&self, id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM modules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_by_university_id(&self, university_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM modules WHERE university_id = $1")
            .bind(university_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
