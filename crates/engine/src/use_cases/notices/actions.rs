//! Command dispatch for notice buttons.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use misrecall_domain::{Caller, DomainError, NoticeAction, NoticeId, NoticeRecord, NoticeState, UserId};

use super::presenter::present_shared;
use crate::infrastructure::ports::{ChatPost, NoticeLog, RepoError};
use crate::use_cases::generation::{Generated, GenerationOrchestrator, OrchestratorError};

/// Extra input some actions need.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionExtra {
    /// Recipient for `share-player`
    pub recipient: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ActionOutcome {
    /// Plain text for the caller to put on the clipboard.
    Copy { text: String },
    Regenerate(Generated),
    /// The post also waits in the notice log until the host drains it.
    ShareAll { post: ChatPost },
    #[serde(rename_all = "camelCase")]
    SharePlayer { recipient: UserId, post: ChatPost },
}

pub struct NoticeActions {
    notices: Arc<dyn NoticeLog>,
    orchestrator: Arc<GenerationOrchestrator>,
}

impl NoticeActions {
    pub fn new(notices: Arc<dyn NoticeLog>, orchestrator: Arc<GenerationOrchestrator>) -> Self {
        Self {
            notices,
            orchestrator,
        }
    }

    /// Single entry point for every notice button.
    ///
    /// Only privileged callers may act, and only on affordances the notice's
    /// current state enables.
    pub async fn handle(
        &self,
        notice_id: NoticeId,
        action_tag: &str,
        extra: ActionExtra,
        caller: &Caller,
    ) -> Result<ActionOutcome, NoticeActionError> {
        let action = NoticeAction::from_tag(action_tag)?;

        if !caller.is_privileged() {
            return Err(NoticeActionError::NotPrivileged);
        }

        let notice = self
            .notices
            .get(notice_id)
            .await?
            .ok_or(NoticeActionError::NoticeNotFound(notice_id))?;

        if !notice.allows(action) {
            return Err(NoticeActionError::Unavailable {
                action: action.tag(),
                state: notice.state(),
            });
        }

        tracing::debug!(notice_id = %notice_id, action = action.tag(), "Notice action");

        match action {
            NoticeAction::Copy => Ok(ActionOutcome::Copy {
                text: shared_text(&notice)?.to_string(),
            }),
            NoticeAction::Regenerate => {
                let generated = self.orchestrator.regenerate(notice_id, caller).await?;
                Ok(ActionOutcome::Regenerate(generated))
            }
            NoticeAction::ShareAll => {
                let html = present_shared(&notice.creature_name, shared_text(&notice)?);
                let post = ChatPost::public(notice.creature_name.clone(), html);
                self.notices.post_public(post.clone()).await?;
                tracing::info!(notice_id = %notice_id, "Shared misinformation with everyone");
                Ok(ActionOutcome::ShareAll { post })
            }
            NoticeAction::SharePlayer => {
                let recipient = extra
                    .recipient
                    .ok_or(NoticeActionError::MissingRecipient)?;
                let html = present_shared(&notice.creature_name, shared_text(&notice)?);
                let post = ChatPost::whisper(notice.creature_name.clone(), html, recipient.clone());
                self.notices.whisper(post.clone()).await?;
                tracing::info!(notice_id = %notice_id, recipient = %recipient, "Shared misinformation with player");
                Ok(ActionOutcome::SharePlayer { recipient, post })
            }
        }
    }
}

fn shared_text(notice: &NoticeRecord) -> Result<&str, NoticeActionError> {
    notice
        .last_content()
        .ok_or(NoticeActionError::Unavailable {
            action: NoticeAction::Copy.tag(),
            state: notice.state(),
        })
}

#[derive(Debug, thiserror::Error)]
pub enum NoticeActionError {
    #[error("{0}")]
    UnknownAction(#[from] DomainError),
    #[error("Only a GM can act on notices")]
    NotPrivileged,
    #[error("Notice not found: {0}")]
    NoticeNotFound(NoticeId),
    #[error("Action {action} is not available while the notice is {state:?}")]
    Unavailable {
        action: &'static str,
        state: NoticeState,
    },
    #[error("share-player needs a recipient")]
    MissingRecipient,
    #[error(transparent)]
    Generation(#[from] OrchestratorError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}
