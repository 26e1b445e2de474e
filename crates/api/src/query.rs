//! Shared query parameter types for API handlers.

use chrono::NaiveDate;
use prodesk_db::models::project::{PageRequest, ProjectFilter, ProjectSort};
use serde::Deserialize;

/// Query parameters for the paged project listing
/// (`?page=&page_size=&sort=&name=...`).
///
/// Page coordinates are clamped in [`PageRequest::new`]; the sort string is
/// validated against the column whitelist and rejected with a 400 when
/// unknown.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// 0-based page index.
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    /// `"column"` or `"column:desc"`.
    pub sort: Option<String>,

    // Filter predicates, combined with AND.
    pub number: Option<i32>,
    pub name: Option<String>,
    pub manager: Option<String>,
    pub status: Option<String>,
    pub started_from: Option<NaiveDate>,
    pub started_to: Option<NaiveDate>,
}

impl ListParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }

    pub fn sort(&self) -> Result<ProjectSort, String> {
        match &self.sort {
            Some(raw) => ProjectSort::parse(raw),
            None => Ok(ProjectSort::default()),
        }
    }

    pub fn filter(&self) -> ProjectFilter {
        ProjectFilter {
            project_number: self.number,
            name_contains: self.name.clone(),
            manager_contains: self.manager.clone(),
            status: self.status.clone(),
            started_from: self.started_from,
            started_to: self.started_to,
        }
    }
}
