//! The edit-form draft and its validation/conversion layer.
//!
//! The draft holds exactly what the user typed, one optional string per
//! bound field. Nothing touches the persisted record until the whole draft
//! validates; the typed result is then submitted through the repository.

use chrono::NaiveDate;
use prodesk_core::collaboration::fields;
use prodesk_db::models::project::{CreateProject, Project, UpdateProject};
use serde::Serialize;

/// Validation message for integer-typed text fields.
pub const NUMBER_ERROR: &str = "Only numbers are allowed";

/// Validation message for the start-date field.
pub const DATE_ERROR: &str = "Not a valid date (expected YYYY-MM-DD)";

/// A field-level validation failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Draft of the edit form. `None` is a blank field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectForm {
    pub project_number: Option<String>,
    pub project_name: Option<String>,
    pub start_date: Option<String>,
    pub project_manager: Option<String>,
    pub net_price: Option<String>,
    pub gross_price: Option<String>,
    pub status: Option<String>,
    pub comments: Option<String>,
}

/// The typed content of a draft that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedForm {
    pub project_number: Option<i32>,
    pub project_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub project_manager: Option<String>,
    pub net_price: Option<i32>,
    pub gross_price: Option<i32>,
    pub status: Option<String>,
    pub comments: Option<String>,
}

impl ProjectForm {
    /// Populate a draft from a persisted record.
    pub fn from_record(project: &Project) -> Self {
        Self {
            project_number: project.project_number.map(|n| n.to_string()),
            project_name: project.project_name.clone(),
            start_date: project.start_date.map(|d| d.to_string()),
            project_manager: project.project_manager.clone(),
            net_price: project.net_price.map(|n| n.to_string()),
            gross_price: project.gross_price.map(|n| n.to_string()),
            status: project.status.clone(),
            comments: project.comments.clone(),
        }
    }

    /// Set one field by wire name. Blank input reads as a cleared field.
    ///
    /// Unknown field names are rejected so a misbehaving client cannot
    /// invent bindings.
    pub fn set(&mut self, field: &str, value: Option<String>) -> Result<(), String> {
        let value = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let slot = match field {
            fields::PROJECT_NUMBER => &mut self.project_number,
            fields::PROJECT_NAME => &mut self.project_name,
            fields::START_DATE => &mut self.start_date,
            fields::PROJECT_MANAGER => &mut self.project_manager,
            fields::NET_PRICE => &mut self.net_price,
            fields::GROSS_PRICE => &mut self.gross_price,
            fields::STATUS => &mut self.status,
            fields::COMMENTS => &mut self.comments,
            _ => return Err(format!("Unknown field '{field}'")),
        };
        *slot = value;
        Ok(())
    }

    /// Validate and convert every field, collecting field-level errors.
    ///
    /// Integer fields must parse, the start date must be ISO `YYYY-MM-DD`;
    /// text fields pass through as typed. All fields are checked so the
    /// user sees every problem at once.
    pub fn validate(&self) -> Result<ValidatedForm, Vec<FieldError>> {
        let mut errors = Vec::new();

        let project_number = parse_int(fields::PROJECT_NUMBER, &self.project_number, &mut errors);
        let net_price = parse_int(fields::NET_PRICE, &self.net_price, &mut errors);
        let gross_price = parse_int(fields::GROSS_PRICE, &self.gross_price, &mut errors);
        let start_date = parse_date(fields::START_DATE, &self.start_date, &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidatedForm {
            project_number,
            project_name: self.project_name.clone(),
            start_date,
            project_manager: self.project_manager.clone(),
            net_price,
            gross_price,
            status: self.status.clone(),
            comments: self.comments.clone(),
        })
    }
}

impl ValidatedForm {
    pub fn into_create(self) -> CreateProject {
        CreateProject {
            project_number: self.project_number,
            project_name: self.project_name,
            start_date: self.start_date,
            project_manager: self.project_manager,
            net_price: self.net_price,
            gross_price: self.gross_price,
            status: self.status,
            comments: self.comments,
        }
    }

    /// Build the version-checked update DTO; `version` is the version the
    /// editor last read.
    pub fn into_update(self, version: i32) -> UpdateProject {
        UpdateProject {
            project_number: self.project_number,
            project_name: self.project_name,
            start_date: self.start_date,
            project_manager: self.project_manager,
            net_price: self.net_price,
            gross_price: self.gross_price,
            status: self.status,
            comments: self.comments,
            version,
        }
    }
}

fn parse_int(field: &str, raw: &Option<String>, errors: &mut Vec<FieldError>) -> Option<i32> {
    let raw = raw.as_deref()?;
    match raw.parse::<i32>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(FieldError {
                field: field.to_string(),
                message: NUMBER_ERROR.to_string(),
            });
            None
        }
    }
}

fn parse_date(field: &str, raw: &Option<String>, errors: &mut Vec<FieldError>) -> Option<NaiveDate> {
    let raw = raw.as_deref()?;
    match raw.parse::<NaiveDate>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(FieldError {
                field: field.to_string(),
                message: DATE_ERROR.to_string(),
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_form_validates_to_all_none() {
        let validated = ProjectForm::default().validate().unwrap();
        assert!(validated.project_number.is_none());
        assert!(validated.start_date.is_none());
        assert!(validated.comments.is_none());
    }

    #[test]
    fn test_numeric_fields_convert() {
        let mut form = ProjectForm::default();
        form.set("project_number", Some("42".into())).unwrap();
        form.set("net_price", Some("125000".into())).unwrap();

        let validated = form.validate().unwrap();
        assert_eq!(validated.project_number, Some(42));
        assert_eq!(validated.net_price, Some(125_000));
    }

    #[test]
    fn test_non_numeric_input_reports_field_error() {
        let mut form = ProjectForm::default();
        form.set("project_number", Some("abc".into())).unwrap();

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "project_number");
        assert_eq!(errors[0].message, NUMBER_ERROR);
    }

    #[test]
    fn test_all_bad_fields_reported_at_once() {
        let mut form = ProjectForm::default();
        form.set("project_number", Some("x".into())).unwrap();
        form.set("net_price", Some("y".into())).unwrap();
        form.set("start_date", Some("soon".into())).unwrap();

        let errors = form.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["project_number", "net_price", "start_date"]);
    }

    #[test]
    fn test_date_parses_iso_format() {
        let mut form = ProjectForm::default();
        form.set("start_date", Some("2026-03-01".into())).unwrap();
        let validated = form.validate().unwrap();
        assert_eq!(
            validated.start_date,
            NaiveDate::from_ymd_opt(2026, 3, 1)
        );
    }

    #[test]
    fn test_blank_and_whitespace_clear_fields() {
        let mut form = ProjectForm::default();
        form.set("comments", Some("note".into())).unwrap();
        form.set("comments", Some("   ".into())).unwrap();
        assert!(form.comments.is_none());

        form.set("status", Some("".into())).unwrap();
        assert!(form.status.is_none());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut form = ProjectForm::default();
        assert!(form.set("version", Some("7".into())).is_err());
        assert!(form.set("id", Some("1".into())).is_err());
    }

    #[test]
    fn test_round_trip_from_record_preserves_text() {
        let mut form = ProjectForm::default();
        form.set("project_number", Some("7".into())).unwrap();
        form.set("project_name", Some("Quay wall".into())).unwrap();
        form.set("start_date", Some("2025-11-20".into())).unwrap();

        let validated = form.validate().unwrap();
        assert_eq!(validated.project_number, Some(7));
        assert_eq!(validated.project_name.as_deref(), Some("Quay wall"));
    }
}
