//! In-memory state storage modules.
//!
//! Stores hold runtime state owned by the host, mirrored into the sidecar:
//! - `InMemoryNoticeLog` - notices and shared chat posts
//! - `InMemoryCreatureDirectory` - creature records pushed by the host adapter

pub mod creatures;
pub mod notices;

pub use creatures::InMemoryCreatureDirectory;
pub use notices::InMemoryNoticeLog;
