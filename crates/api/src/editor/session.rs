//! Per-client editor session: the state machine behind the detail form.
//!
//! One session exists per connected client. The current-record slot is the
//! state: `None` is Empty (blank form), `Some` is Loaded. Commands return
//! outcome enums; collaboration side effects (presence, broadcasts) are
//! applied by the caller from the outcomes so the session itself stays
//! storage-only.

use prodesk_core::collaboration::record_topic;
use prodesk_core::types::DbId;
use prodesk_db::models::project::{Project, SaveOutcome};
use prodesk_db::repositories::ProjectRepo;
use sqlx::PgPool;

use super::form::{FieldError, ProjectForm};

/// Outcome of a select command.
#[derive(Debug)]
pub enum SelectOutcome {
    /// Record fetched; session is Loaded on its topic.
    Loaded { project: Project, topic: String },
    /// The record does not exist (deleted by someone else); session is
    /// Empty and the caller should refresh its list.
    NotFound { id: DbId },
}

/// Outcome of a save command.
#[derive(Debug)]
pub enum EditorSaveOutcome {
    /// Persisted; session is back to Empty.
    Saved(Project),
    /// Field conversion failed; state unchanged, draft intact.
    Invalid(Vec<FieldError>),
    /// Another writer committed first; state unchanged, draft intact so
    /// the user loses nothing.
    Conflict,
    /// The record was deleted underneath the editor; session is Empty.
    Deleted { id: DbId },
}

/// The server-side half of the master-detail screen for one client.
#[derive(Debug, Default)]
pub struct EditorSession {
    record: Option<Project>,
    form: ProjectForm,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The loaded record, if any.
    pub fn record(&self) -> Option<&Project> {
        self.record.as_ref()
    }

    /// The current draft.
    pub fn form(&self) -> &ProjectForm {
        &self.form
    }

    /// Collaboration topic of the loaded record. Empty state (including a
    /// blank new-record form) is not a shared topic.
    pub fn topic(&self) -> Option<String> {
        self.record.as_ref().map(|p| record_topic(p.id))
    }

    /// Select a record: fetch by id and populate the draft from it.
    pub async fn select(&mut self, pool: &PgPool, id: DbId) -> Result<SelectOutcome, sqlx::Error> {
        match ProjectRepo::find_by_id(pool, id).await? {
            Some(project) => {
                self.form = ProjectForm::from_record(&project);
                let topic = record_topic(project.id);
                self.record = Some(project.clone());
                Ok(SelectOutcome::Loaded { project, topic })
            }
            None => {
                self.clear();
                Ok(SelectOutcome::NotFound { id })
            }
        }
    }

    /// Apply one field edit to the draft. The persisted record is untouched.
    pub fn edit(&mut self, field: &str, value: Option<String>) -> Result<(), String> {
        self.form.set(field, value)
    }

    /// Validate the draft and write it through the repository.
    ///
    /// An Empty slot inserts a new record; a Loaded slot performs the
    /// version-checked update with the version read at select time.
    pub async fn save(&mut self, pool: &PgPool) -> Result<EditorSaveOutcome, sqlx::Error> {
        let validated = match self.form.validate() {
            Ok(validated) => validated,
            Err(errors) => return Ok(EditorSaveOutcome::Invalid(errors)),
        };

        let Some((id, version)) = self.record.as_ref().map(|p| (p.id, p.version)) else {
            let project = ProjectRepo::create(pool, &validated.into_create()).await?;
            self.clear();
            return Ok(EditorSaveOutcome::Saved(project));
        };

        let update = validated.into_update(version);
        match ProjectRepo::update(pool, id, &update).await? {
            SaveOutcome::Saved(project) => {
                self.clear();
                Ok(EditorSaveOutcome::Saved(project))
            }
            SaveOutcome::VersionConflict => Ok(EditorSaveOutcome::Conflict),
            SaveOutcome::Missing => {
                self.clear();
                Ok(EditorSaveOutcome::Deleted { id })
            }
        }
    }

    /// Discard in-memory edits and return to the Empty state.
    pub fn cancel(&mut self) {
        self.clear();
    }

    fn clear(&mut self) {
        self.record = None;
        self.form = ProjectForm::default();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use prodesk_db::models::project::CreateProject;

    async fn seed_one(pool: &PgPool, name: &str) -> Project {
        ProjectRepo::create(
            pool,
            &CreateProject {
                project_name: Some(name.to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn select_loads_record_and_topic(pool: PgPool) {
        let seeded = seed_one(&pool, "Quay wall").await;

        let mut session = EditorSession::new();
        let outcome = session.select(&pool, seeded.id).await.unwrap();

        assert_matches!(outcome, SelectOutcome::Loaded { ref topic, .. } if topic == &format!("projects/{}", seeded.id));
        assert_eq!(session.topic(), Some(format!("projects/{}", seeded.id)));
        assert_eq!(
            session.form().project_name.as_deref(),
            Some("Quay wall")
        );
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn select_missing_record_clears_session(pool: PgPool) {
        let mut session = EditorSession::new();
        let outcome = session.select(&pool, 999_999).await.unwrap();

        assert_matches!(outcome, SelectOutcome::NotFound { id: 999_999 });
        assert!(session.record().is_none());
        assert!(session.topic().is_none());
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn save_from_empty_creates_record(pool: PgPool) {
        let mut session = EditorSession::new();
        session.edit("project_name", Some("New build".into())).unwrap();
        session.edit("project_number", Some("42".into())).unwrap();

        let outcome = session.save(&pool).await.unwrap();
        let saved = assert_matches!(outcome, EditorSaveOutcome::Saved(p) => p);

        assert_eq!(saved.project_number, Some(42));
        assert_eq!(saved.version, 0);

        // Session returned to Empty.
        assert!(session.record().is_none());
        assert_eq!(session.form(), &ProjectForm::default());

        // The record is actually persisted.
        let fetched = ProjectRepo::find_by_id(&pool, saved.id).await.unwrap();
        assert_eq!(fetched.unwrap().project_name.as_deref(), Some("New build"));
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn save_loaded_record_bumps_version(pool: PgPool) {
        let seeded = seed_one(&pool, "Before").await;

        let mut session = EditorSession::new();
        session.select(&pool, seeded.id).await.unwrap();
        session.edit("project_name", Some("After".into())).unwrap();

        let outcome = session.save(&pool).await.unwrap();
        let saved = assert_matches!(outcome, EditorSaveOutcome::Saved(p) => p);
        assert_eq!(saved.version, seeded.version + 1);
        assert_eq!(saved.project_name.as_deref(), Some("After"));
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn invalid_draft_leaves_record_unpersisted(pool: PgPool) {
        let mut session = EditorSession::new();
        session.edit("project_number", Some("abc".into())).unwrap();

        let outcome = session.save(&pool).await.unwrap();
        let errors = assert_matches!(outcome, EditorSaveOutcome::Invalid(e) => e);
        assert_eq!(errors[0].field, "project_number");

        // Nothing was written, and the draft survived.
        assert_eq!(ProjectRepo::count(&pool).await.unwrap(), 0);
        assert_eq!(session.form().project_number.as_deref(), Some("abc"));
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn conflict_preserves_the_users_edits(pool: PgPool) {
        let seeded = seed_one(&pool, "Shared").await;

        // Two sessions load the same record.
        let mut first = EditorSession::new();
        first.select(&pool, seeded.id).await.unwrap();
        let mut second = EditorSession::new();
        second.select(&pool, seeded.id).await.unwrap();

        first.edit("status", Some("approved".into())).unwrap();
        assert_matches!(
            first.save(&pool).await.unwrap(),
            EditorSaveOutcome::Saved(_)
        );

        second.edit("status", Some("rejected".into())).unwrap();
        let outcome = second.save(&pool).await.unwrap();
        assert_matches!(outcome, EditorSaveOutcome::Conflict);

        // The second session keeps its record slot and draft intact.
        assert!(second.record().is_some());
        assert_eq!(second.form().status.as_deref(), Some("rejected"));

        // The first writer's data is what persisted.
        let stored = ProjectRepo::find_by_id(&pool, seeded.id).await.unwrap().unwrap();
        assert_eq!(stored.status.as_deref(), Some("approved"));
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn save_after_external_delete_reports_deleted(pool: PgPool) {
        let seeded = seed_one(&pool, "Vanishing").await;

        let mut session = EditorSession::new();
        session.select(&pool, seeded.id).await.unwrap();

        ProjectRepo::delete(&pool, seeded.id).await.unwrap();

        let outcome = session.save(&pool).await.unwrap();
        assert_matches!(outcome, EditorSaveOutcome::Deleted { id } if id == seeded.id);
        assert!(session.record().is_none());
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn cancel_discards_edits(pool: PgPool) {
        let seeded = seed_one(&pool, "Keep me").await;

        let mut session = EditorSession::new();
        session.select(&pool, seeded.id).await.unwrap();
        session.edit("project_name", Some("Scratched".into())).unwrap();
        session.cancel();

        assert!(session.record().is_none());
        assert_eq!(session.form(), &ProjectForm::default());

        let stored = ProjectRepo::find_by_id(&pool, seeded.id).await.unwrap().unwrap();
        assert_eq!(stored.project_name.as_deref(), Some("Keep me"));
    }
}
