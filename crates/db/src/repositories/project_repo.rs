//! Repository for the `projects` table.

use chrono::NaiveDate;
use prodesk_core::pagination::Page;
use prodesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::{
    CreateProject, PageRequest, Project, ProjectFilter, ProjectSort, SaveOutcome, UpdateProject,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, version, project_number, project_name, start_date, project_manager, \
     net_price, gross_price, status, comments, created_at, updated_at";

/// Provides CRUD and paged listing operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row (id assigned,
    /// version 0).
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects
                (project_number, project_name, start_date, project_manager,
                 net_price, gross_price, status, comments)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(input.project_number)
            .bind(&input.project_name)
            .bind(input.start_date)
            .bind(&input.project_manager)
            .bind(input.net_price)
            .bind(input.gross_price)
            .bind(&input.status)
            .bind(&input.comments)
            .fetch_one(pool)
            .await
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Version-checked full update.
    ///
    /// The UPDATE only matches when the stored version equals the version
    /// the caller last read, and bumps it by 1 in the same statement; the
    /// database is the arbiter of which concurrent writer wins. A zero-row
    /// result is disambiguated with an existence probe.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<SaveOutcome, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                project_number = $2,
                project_name = $3,
                start_date = $4,
                project_manager = $5,
                net_price = $6,
                gross_price = $7,
                status = $8,
                comments = $9,
                version = version + 1,
                updated_at = NOW()
             WHERE id = $1 AND version = $10
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(input.project_number)
            .bind(&input.project_name)
            .bind(input.start_date)
            .bind(&input.project_manager)
            .bind(input.net_price)
            .bind(input.gross_price)
            .bind(&input.status)
            .bind(&input.comments)
            .bind(input.version)
            .fetch_optional(pool)
            .await?;

        if let Some(project) = updated {
            return Ok(SaveOutcome::Saved(project));
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM projects WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;

        if exists {
            tracing::debug!(id, submitted_version = input.version, "Stale version on update");
            Ok(SaveOutcome::VersionConflict)
        } else {
            Ok(SaveOutcome::Missing)
        }
    }

    /// Permanently delete a project by ID. Returns `true` if a row was
    /// removed; deleting a nonexistent id is a no-op.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Total number of projects, ignoring any filter.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM projects")
            .fetch_one(pool)
            .await
    }

    /// Paged, sorted, filtered listing plus the filtered total count.
    pub async fn list(
        pool: &PgPool,
        page: &PageRequest,
        sort: &ProjectSort,
        filter: &ProjectFilter,
    ) -> Result<Page<Project>, sqlx::Error> {
        let (where_clause, bind_values, bind_idx) = build_project_filter(filter);

        let query = format!(
            "SELECT {COLUMNS} FROM projects {where_clause} {} LIMIT ${bind_idx} OFFSET ${}",
            sort.order_by(),
            bind_idx + 1
        );
        let q = bind_filter_values(sqlx::query_as::<_, Project>(&query), &bind_values);
        let items = q
            .bind(page.page_size)
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*)::BIGINT FROM projects {where_clause}");
        let q = bind_filter_values_scalar(sqlx::query_scalar::<_, i64>(&count_query), &bind_values);
        let total = q.fetch_one(pool).await?;

        Ok(Page::new(items, page.page, page.page_size, total))
    }
}

// ---------------------------------------------------------------------------
// Filter building
// ---------------------------------------------------------------------------

/// An owned bind value for dynamically built filter queries.
enum BindValue {
    Int(i32),
    Text(String),
    Date(NaiveDate),
}

/// Build the WHERE clause and bind list for a project filter.
///
/// Returns the clause (empty string for an empty filter), the values to
/// bind in order, and the next free parameter index.
fn build_project_filter(filter: &ProjectFilter) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    if let Some(number) = filter.project_number {
        conditions.push(format!("project_number = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Int(number));
    }

    if let Some(ref name) = filter.name_contains {
        conditions.push(format!("project_name ILIKE ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(format!("%{name}%")));
    }

    if let Some(ref manager) = filter.manager_contains {
        conditions.push(format!("project_manager ILIKE ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(format!("%{manager}%")));
    }

    if let Some(ref status) = filter.status {
        conditions.push(format!("status = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(status.clone()));
    }

    if let Some(from) = filter.started_from {
        conditions.push(format!("start_date >= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Date(from));
    }

    if let Some(to) = filter.started_to {
        conditions.push(format!("start_date <= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Date(to));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_filter_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::Int(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Date(v) => q = q.bind(*v),
        }
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
fn bind_filter_values_scalar<'q>(
    mut q: sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::Int(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Date(v) => q = q.bind(*v),
        }
    }
    q
}
