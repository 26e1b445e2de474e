//! Shared leaf crate for the Prodesk workspace.
//!
//! Holds the pieces every other crate agrees on: scalar type aliases, the
//! domain error taxonomy, pagination helpers, and the collaboration
//! topic/protocol definitions. This crate has zero internal dependencies so
//! the db, events, and api layers can all reference it freely.

pub mod collaboration;
pub mod error;
pub mod pagination;
pub mod types;
