//! Notice entity - the GM-only chat entry that shows generated misinformation
//!
//! A notice moves between three display states:
//!
//! ```text
//!            start_attempt            complete
//!   (new) ──────────────> Loading ───────────────> Content
//!                           │  ^                      │
//!                      fail │  │ start_attempt        │ start_attempt
//!                           v  │                      │
//!                          Error <────────────────────┘ (via Loading)
//! ```
//!
//! The last generated text only exists in `Content`; entering `Loading` or
//! `Error` clears it so copy and share never see stale output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{ActorId, NoticeId, UserId};

/// What started a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerType {
    /// GM clicked a button on the creature
    #[default]
    Manual,
    /// A player critically failed Recall Knowledge against the creature
    CriticalFailure,
}

impl TriggerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::CriticalFailure => "critical-failure",
        }
    }
}

/// Who or what triggered a generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerMeta {
    #[serde(default)]
    pub trigger_type: TriggerType,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub user_name: Option<String>,
}

impl TriggerMeta {
    pub fn manual() -> Self {
        Self::default()
    }

    pub fn critical_failure(user_id: Option<UserId>, user_name: Option<String>) -> Self {
        Self {
            trigger_type: TriggerType::CriticalFailure,
            user_id,
            user_name,
        }
    }
}

/// Display state of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeState {
    Loading,
    Content,
    Error,
}

/// Interactive affordance on a rendered notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoticeAction {
    Copy,
    Regenerate,
    ShareAll,
    SharePlayer,
}

impl NoticeAction {
    pub const ALL: [NoticeAction; 4] = [
        NoticeAction::Copy,
        NoticeAction::Regenerate,
        NoticeAction::ShareAll,
        NoticeAction::SharePlayer,
    ];

    /// Tag carried in the rendered markup's `data-action` attribute.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Regenerate => "regenerate",
            Self::ShareAll => "share-all",
            Self::SharePlayer => "share-player",
        }
    }

    pub fn from_tag(tag: &str) -> Result<Self, DomainError> {
        Self::ALL
            .into_iter()
            .find(|action| action.tag() == tag)
            .ok_or_else(|| DomainError::parse(format!("Unknown notice action: {tag}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeRecord {
    pub id: NoticeId,
    pub creature_id: ActorId,
    pub creature_name: String,
    pub trigger: TriggerMeta,
    /// Users the notice is whispered to
    pub whisper_to: Vec<UserId>,
    state: NoticeState,
    last_content: Option<String>,
    error_message: Option<String>,
    /// Incremented every time a generation starts
    attempt: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NoticeRecord {
    /// A fresh notice in `Loading` state for attempt 1.
    pub fn loading(
        creature_id: ActorId,
        creature_name: impl Into<String>,
        trigger: TriggerMeta,
        whisper_to: Vec<UserId>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: NoticeId::new(),
            creature_id,
            creature_name: creature_name.into(),
            trigger,
            whisper_to,
            state: NoticeState::Loading,
            last_content: None,
            error_message: None,
            attempt: 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn state(&self) -> NoticeState {
        self.state
    }

    pub fn last_content(&self) -> Option<&str> {
        self.last_content.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Enter `Loading` for a new attempt and return its number.
    ///
    /// Starting while another attempt is loading supersedes it: the older
    /// attempt's result will be discarded by [`Self::complete`] / [`Self::fail`].
    pub fn start_attempt(&mut self, now: DateTime<Utc>) -> u64 {
        self.attempt += 1;
        self.state = NoticeState::Loading;
        self.last_content = None;
        self.error_message = None;
        self.updated_at = now;
        self.attempt
    }

    /// Record a successful generation. Returns `false` (and leaves the
    /// notice untouched) when `attempt` is no longer the current one.
    pub fn complete(&mut self, attempt: u64, content: impl Into<String>, now: DateTime<Utc>) -> bool {
        if !self.is_current(attempt) {
            return false;
        }
        self.state = NoticeState::Content;
        self.last_content = Some(content.into());
        self.error_message = None;
        self.updated_at = now;
        true
    }

    /// Record a failed generation. Same staleness rule as [`Self::complete`].
    pub fn fail(&mut self, attempt: u64, message: impl Into<String>, now: DateTime<Utc>) -> bool {
        if !self.is_current(attempt) {
            return false;
        }
        self.state = NoticeState::Error;
        self.last_content = None;
        self.error_message = Some(message.into());
        self.updated_at = now;
        true
    }

    fn is_current(&self, attempt: u64) -> bool {
        self.state == NoticeState::Loading && self.attempt == attempt
    }

    /// Whether an affordance is usable in the current state.
    pub fn allows(&self, action: NoticeAction) -> bool {
        match action {
            NoticeAction::Copy | NoticeAction::ShareAll | NoticeAction::SharePlayer => {
                self.state == NoticeState::Content && self.last_content.is_some()
            }
            NoticeAction::Regenerate => self.state != NoticeState::Loading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loading_notice() -> NoticeRecord {
        NoticeRecord::loading(
            ActorId::new("dragon"),
            "Adult Red Dragon",
            TriggerMeta::manual(),
            vec![UserId::new("gm")],
            Utc::now(),
        )
    }

    #[test]
    fn new_notice_is_loading_without_content() {
        let notice = loading_notice();
        assert_eq!(notice.state(), NoticeState::Loading);
        assert_eq!(notice.last_content(), None);
        assert_eq!(notice.attempt(), 1);
        for action in NoticeAction::ALL {
            assert!(!notice.allows(action), "{action:?} must be disabled while loading");
        }
    }

    #[test]
    fn completion_stores_content_and_enables_actions() {
        let mut notice = loading_notice();
        assert!(notice.complete(1, "- It fears cold iron.", Utc::now()));
        assert_eq!(notice.state(), NoticeState::Content);
        assert_eq!(notice.last_content(), Some("- It fears cold iron."));
        assert!(NoticeAction::ALL.iter().all(|a| notice.allows(*a)));
    }

    #[test]
    fn failed_notice_reports_no_content() {
        let mut notice = loading_notice();
        assert!(notice.fail(1, "API error: quota exceeded", Utc::now()));
        assert_eq!(notice.state(), NoticeState::Error);
        assert_eq!(notice.last_content(), None);
        assert_eq!(notice.error_message(), Some("API error: quota exceeded"));
        assert!(!notice.allows(NoticeAction::Copy));
        assert!(!notice.allows(NoticeAction::ShareAll));
        assert!(!notice.allows(NoticeAction::SharePlayer));
        assert!(notice.allows(NoticeAction::Regenerate));
    }

    #[test]
    fn restarting_clears_previous_content() {
        let mut notice = loading_notice();
        notice.complete(1, "old lies", Utc::now());
        let attempt = notice.start_attempt(Utc::now());
        assert_eq!(attempt, 2);
        assert_eq!(notice.state(), NoticeState::Loading);
        assert_eq!(notice.last_content(), None);
    }

    #[test]
    fn overlapping_attempts_keep_only_the_latest() {
        let mut notice = loading_notice();
        let second = notice.start_attempt(Utc::now());

        assert!(!notice.complete(1, "superseded", Utc::now()));
        assert!(notice.complete(second, "latest", Utc::now()));
        assert_eq!(notice.last_content(), Some("latest"));
    }

    #[test]
    fn stale_attempts_are_ignored() {
        let mut notice = loading_notice();
        notice.fail(1, "timeout", Utc::now());
        let second = notice.start_attempt(Utc::now());

        assert!(!notice.complete(1, "late answer", Utc::now()));
        assert_eq!(notice.state(), NoticeState::Loading);

        assert!(notice.complete(second, "fresh answer", Utc::now()));
        assert!(!notice.fail(second, "too late", Utc::now()));
        assert_eq!(notice.last_content(), Some("fresh answer"));
    }

    #[test]
    fn action_tags_parse_back() {
        for action in NoticeAction::ALL {
            assert_eq!(NoticeAction::from_tag(action.tag()), Ok(action));
        }
        assert!(NoticeAction::from_tag("delete").is_err());
    }

    #[test]
    fn trigger_type_serializes_kebab_case() {
        let json = serde_json::to_string(&TriggerType::CriticalFailure).expect("serialize");
        assert_eq!(json, "\"critical-failure\"");
    }
}
