//! Project entity model, DTOs, and list query parameters.

use chrono::NaiveDate;
use prodesk_core::pagination::{clamp_page, clamp_page_size};
use prodesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A project row from the `projects` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    /// Optimistic-lock counter; bumped by the storage layer on every
    /// successful update.
    pub version: i32,
    pub project_number: Option<i32>,
    pub project_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub project_manager: Option<String>,
    pub net_price: Option<i32>,
    pub gross_price: Option<i32>,
    pub status: Option<String>,
    pub comments: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project. Every business field is optional; a
/// blank form is a valid record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProject {
    pub project_number: Option<i32>,
    pub project_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub project_manager: Option<String>,
    pub net_price: Option<i32>,
    pub gross_price: Option<i32>,
    pub status: Option<String>,
    pub comments: Option<String>,
}

/// DTO for a version-checked full update.
///
/// Carries the complete desired state of the record: `None` writes SQL NULL
/// rather than keeping the stored value, because the editor submits a whole
/// validated draft. `version` is the version the caller last read.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProject {
    pub project_number: Option<i32>,
    pub project_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub project_manager: Option<String>,
    pub net_price: Option<i32>,
    pub gross_price: Option<i32>,
    pub status: Option<String>,
    pub comments: Option<String>,
    pub version: i32,
}

/// Result of a version-checked update.
#[derive(Debug, Clone)]
pub enum SaveOutcome {
    /// The row was updated; carries the persisted state with the new version.
    Saved(Project),
    /// The row exists but its stored version differs from the submitted one.
    VersionConflict,
    /// No row with the given id exists.
    Missing,
}

// ---------------------------------------------------------------------------
// List query parameters
// ---------------------------------------------------------------------------

/// Page coordinates for a list query. Always clamped on construction.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    /// 0-based page index.
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page: clamp_page(page),
            page_size: clamp_page_size(page_size),
        }
    }

    pub fn offset(&self) -> i64 {
        self.page * self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Whitelisted sort columns. Sorting never interpolates caller strings into
/// SQL; unknown names are rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    ProjectNumber,
    ProjectName,
    StartDate,
    ProjectManager,
    NetPrice,
    GrossPrice,
    Status,
    UpdatedAt,
}

impl SortField {
    /// The column this field sorts by.
    pub fn column(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::ProjectNumber => "project_number",
            SortField::ProjectName => "project_name",
            SortField::StartDate => "start_date",
            SortField::ProjectManager => "project_manager",
            SortField::NetPrice => "net_price",
            SortField::GrossPrice => "gross_price",
            SortField::Status => "status",
            SortField::UpdatedAt => "updated_at",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(SortField::Id),
            "project_number" => Some(SortField::ProjectNumber),
            "project_name" => Some(SortField::ProjectName),
            "start_date" => Some(SortField::StartDate),
            "project_manager" => Some(SortField::ProjectManager),
            "net_price" => Some(SortField::NetPrice),
            "gross_price" => Some(SortField::GrossPrice),
            "status" => Some(SortField::Status),
            "updated_at" => Some(SortField::UpdatedAt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn keyword(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Caller-supplied ordering over whitelisted record fields.
#[derive(Debug, Clone, Copy)]
pub struct ProjectSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for ProjectSort {
    fn default() -> Self {
        Self {
            field: SortField::Id,
            direction: SortDirection::Asc,
        }
    }
}

impl ProjectSort {
    /// Parse `"column"` or `"column:desc"` into a sort.
    pub fn parse(input: &str) -> Result<Self, String> {
        let (name, dir) = match input.split_once(':') {
            Some((name, dir)) => (name, dir),
            None => (input, "asc"),
        };

        let field = SortField::parse(name)
            .ok_or_else(|| format!("Unknown sort column '{name}'"))?;

        let direction = match dir {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            other => return Err(format!("Unknown sort direction '{other}'")),
        };

        Ok(Self { field, direction })
    }

    /// ORDER BY fragment. A deterministic `id` tiebreak keeps pages
    /// disjoint when the sort key has duplicates.
    pub fn order_by(&self) -> String {
        let column = self.field.column();
        let dir = self.direction.keyword();
        if self.field == SortField::Id {
            format!("ORDER BY id {dir}")
        } else {
            format!("ORDER BY {column} {dir}, id ASC")
        }
    }
}

/// Per-field predicates composed with AND. An empty filter matches all rows.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    /// Exact project number.
    pub project_number: Option<i32>,
    /// Case-insensitive substring of the project name.
    pub name_contains: Option<String>,
    /// Case-insensitive substring of the project manager.
    pub manager_contains: Option<String>,
    /// Exact status token.
    pub status: Option<String>,
    /// Start date on or after.
    pub started_from: Option<NaiveDate>,
    /// Start date on or before.
    pub started_to: Option<NaiveDate>,
}

impl ProjectFilter {
    pub fn is_empty(&self) -> bool {
        self.project_number.is_none()
            && self.name_contains.is_none()
            && self.manager_contains.is_none()
            && self.status.is_none()
            && self.started_from.is_none()
            && self.started_to.is_none()
    }
}
