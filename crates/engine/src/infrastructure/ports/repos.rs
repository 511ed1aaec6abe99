//! Storage port traits: settings, notices, creatures.

use async_trait::async_trait;
use misrecall_domain::{ActorId, ActorKind, CreatureRecord, ModuleSettings, NoticeId, NoticeRecord};

use super::error::RepoError;
use super::types::ChatPost;

// =============================================================================
// Settings Storage
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepo: Send + Sync {
    async fn get_global(&self) -> Result<Option<ModuleSettings>, RepoError>;
    async fn save_global(&self, settings: &ModuleSettings) -> Result<(), RepoError>;
}

// =============================================================================
// Chat Log
// =============================================================================

/// The host chat log, as far as notices are concerned.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NoticeLog: Send + Sync {
    async fn create(&self, notice: &NoticeRecord) -> Result<(), RepoError>;
    async fn get(&self, id: NoticeId) -> Result<Option<NoticeRecord>, RepoError>;
    /// Replace a stored notice. Fails with `NotFound` for unknown ids.
    async fn update(&self, notice: &NoticeRecord) -> Result<(), RepoError>;
    async fn post_public(&self, post: ChatPost) -> Result<(), RepoError>;
    async fn whisper(&self, post: ChatPost) -> Result<(), RepoError>;
    /// Remove and return posts not yet delivered to the host, oldest first.
    async fn drain_posts(&self) -> Result<Vec<ChatPost>, RepoError>;
}

// =============================================================================
// Actor Directory
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CreatureDirectory: Send + Sync {
    async fn get(&self, id: &ActorId) -> Result<Option<CreatureRecord>, RepoError>;
    async fn upsert(&self, creature: CreatureRecord) -> Result<(), RepoError>;
    /// Synchronous so the event classifier can call it inline.
    fn actor_kind(&self, id: &ActorId) -> Option<ActorKind>;
}
