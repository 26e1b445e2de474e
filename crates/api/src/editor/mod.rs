//! The detail-editor surface: the server-side half of the master-detail
//! screen.
//!
//! [`form`] holds the draft mapping layer (raw field text in, validated
//! typed values out); [`session`] holds the per-client state machine that
//! drives select / edit / save / cancel against the repository.

pub mod form;
pub mod session;

pub use form::{FieldError, ProjectForm};
pub use session::{EditorSaveOutcome, EditorSession, SelectOutcome};
