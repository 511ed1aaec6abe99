//! In-memory chat log for notices and shared posts.

use std::collections::VecDeque;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::RwLock;

use misrecall_domain::{NoticeId, NoticeRecord};

use crate::infrastructure::ports::{ChatPost, NoticeLog, RepoError};

/// Notices kept before the oldest are evicted.
pub const DEFAULT_MAX_NOTICES: usize = 500;
/// Undelivered posts kept before the oldest are dropped.
pub const DEFAULT_MAX_PENDING_POSTS: usize = 200;

/// Notice storage for the sidecar service.
///
/// Updates never move a notice back to an older attempt, so a late write
/// from a superseded generation cannot clobber a newer one. Both the notices
/// and the outgoing post queue are bounded.
pub struct InMemoryNoticeLog {
    notices: DashMap<NoticeId, NoticeRecord>,
    posts: RwLock<VecDeque<ChatPost>>,
    max_notices: usize,
    max_pending_posts: usize,
}

impl Default for InMemoryNoticeLog {
    fn default() -> Self {
        Self::with_limits(DEFAULT_MAX_NOTICES, DEFAULT_MAX_PENDING_POSTS)
    }
}

impl InMemoryNoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(max_notices: usize, max_pending_posts: usize) -> Self {
        Self {
            notices: DashMap::new(),
            posts: RwLock::new(VecDeque::new()),
            max_notices: max_notices.max(1),
            max_pending_posts: max_pending_posts.max(1),
        }
    }

    fn evict_oldest_notices(&self) {
        while self.notices.len() > self.max_notices {
            let oldest = self
                .notices
                .iter()
                .min_by_key(|entry| entry.value().created_at)
                .map(|entry| *entry.key());
            let Some(id) = oldest else {
                break;
            };
            self.notices.remove(&id);
            tracing::debug!(notice_id = %id, "Evicted oldest notice");
        }
    }

    async fn enqueue(&self, post: ChatPost) {
        let mut posts = self.posts.write().await;
        posts.push_back(post);
        while posts.len() > self.max_pending_posts {
            if let Some(dropped) = posts.pop_front() {
                tracing::warn!(speaker = %dropped.speaker, "Dropped undelivered chat post");
            }
        }
    }
}

#[async_trait]
impl NoticeLog for InMemoryNoticeLog {
    async fn create(&self, notice: &NoticeRecord) -> Result<(), RepoError> {
        self.notices.insert(notice.id, notice.clone());
        self.evict_oldest_notices();
        Ok(())
    }

    async fn get(&self, id: NoticeId) -> Result<Option<NoticeRecord>, RepoError> {
        Ok(self.notices.get(&id).map(|entry| entry.value().clone()))
    }

    async fn update(&self, notice: &NoticeRecord) -> Result<(), RepoError> {
        let mut stored = self
            .notices
            .get_mut(&notice.id)
            .ok_or_else(|| RepoError::not_found("Notice", notice.id))?;

        if stored.attempt() > notice.attempt() {
            tracing::debug!(
                notice_id = %notice.id,
                stored_attempt = stored.attempt(),
                attempt = notice.attempt(),
                "Ignoring update from a superseded attempt"
            );
            return Ok(());
        }

        *stored = notice.clone();
        Ok(())
    }

    async fn post_public(&self, post: ChatPost) -> Result<(), RepoError> {
        self.enqueue(post).await;
        Ok(())
    }

    async fn whisper(&self, post: ChatPost) -> Result<(), RepoError> {
        self.enqueue(post).await;
        Ok(())
    }

    async fn drain_posts(&self) -> Result<Vec<ChatPost>, RepoError> {
        Ok(self.posts.write().await.drain(..).collect())
    }
}
