//! Prodesk collaboration plumbing.
//!
//! The publish/subscribe layer that scopes presence and live field traffic
//! to one record at a time:
//!
//! - [`TopicBus`] — topic-keyed fan-out hub backed by
//!   `tokio::sync::broadcast`, one lazily created channel per record topic.
//! - [`TopicEvent`] — the envelope carried on the bus.
//! - [`PresenceRegistry`] — in-memory roster of which sessions are viewing
//!   which topic.
//!
//! Nothing in this crate touches storage; CRUD correctness does not depend
//! on it.

pub mod bus;
pub mod presence;

pub use bus::{TopicBus, TopicEvent};
pub use presence::PresenceRegistry;
