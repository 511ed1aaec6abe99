//! Automatic generation from game events.
//!
//! The host adapter forwards every chat message seen by the GM client. A
//! qualifying critical failure against a creature starts a generation
//! attributed to the message author.

use std::sync::Arc;

use serde::Serialize;

use misrecall_domain::{
    classify, ActorId, ActorKind, Caller, Classification, GameEvent, NoticeId, TriggerMeta,
};

use crate::infrastructure::ports::CreatureDirectory;
use crate::use_cases::generation::{GenerationOrchestrator, OrchestratorError};
use crate::use_cases::settings::SettingsOps;

/// Why an event did not start a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    AutoTriggerDisabled,
    NotPrivileged,
    NotRecallKnowledge,
    NotCriticalFailure,
    NoTarget,
    CreatureNotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum TriggerOutcome {
    Skipped {
        reason: SkipReason,
    },
    #[serde(rename_all = "camelCase")]
    Generated {
        notice_id: NoticeId,
        creature_id: ActorId,
    },
    /// The notice was created and shows the error.
    #[serde(rename_all = "camelCase")]
    Failed {
        notice_id: NoticeId,
        creature_id: ActorId,
        error: String,
    },
}

impl TriggerOutcome {
    fn skipped(reason: SkipReason) -> Self {
        Self::Skipped { reason }
    }
}

pub struct AutoTrigger {
    orchestrator: Arc<GenerationOrchestrator>,
    creatures: Arc<dyn CreatureDirectory>,
    settings: Arc<SettingsOps>,
}

impl AutoTrigger {
    pub fn new(
        orchestrator: Arc<GenerationOrchestrator>,
        creatures: Arc<dyn CreatureDirectory>,
        settings: Arc<SettingsOps>,
    ) -> Self {
        Self {
            orchestrator,
            creatures,
            settings,
        }
    }

    /// Classify `event` and generate for its target when it is a critical
    /// failure on Recall Knowledge. `selected_targets` are the author's
    /// current in-scene targets.
    pub async fn on_game_event(
        &self,
        event: &GameEvent,
        caller: &Caller,
        selected_targets: &[ActorId],
    ) -> Result<TriggerOutcome, OrchestratorError> {
        let settings = self.settings.get_global().await?;
        if !settings.auto_trigger {
            return Ok(TriggerOutcome::skipped(SkipReason::AutoTriggerDisabled));
        }
        if !caller.is_privileged() {
            return Ok(TriggerOutcome::skipped(SkipReason::NotPrivileged));
        }

        let creatures = self.creatures.clone();
        let lookup = move |id: &ActorId| -> Option<ActorKind> { creatures.actor_kind(id) };
        let classification = classify(event, &lookup, selected_targets);

        tracing::debug!(
            event_id = event.id.as_deref().unwrap_or_default(),
            qualifying = classification.is_qualifying_check,
            critical_failure = classification.is_critical_failure,
            target = ?classification.target_id,
            "Classified game event"
        );

        if let Some(reason) = skip_reason(&classification) {
            return Ok(TriggerOutcome::skipped(reason));
        }
        let Some(target_id) = classification.target_id else {
            return Ok(TriggerOutcome::skipped(SkipReason::NoTarget));
        };

        let Some(creature) = self.creatures.get(&target_id).await? else {
            tracing::warn!(target = %target_id, "Critical failure target is not in the directory");
            return Ok(TriggerOutcome::skipped(SkipReason::CreatureNotFound));
        };

        let author = event.author.clone().unwrap_or_default();
        let trigger = TriggerMeta::critical_failure(author.id, author.name);

        tracing::info!(
            creature = %creature.name,
            player = trigger.user_name.as_deref().unwrap_or("unknown"),
            "Recall Knowledge critical failure detected"
        );

        match self.orchestrator.generate(&creature, trigger, caller).await {
            Ok(generated) => Ok(TriggerOutcome::Generated {
                notice_id: generated.notice_id,
                creature_id: creature.id,
            }),
            Err(OrchestratorError::Generation { notice_id, source }) => {
                Ok(TriggerOutcome::Failed {
                    notice_id,
                    creature_id: creature.id,
                    error: source.to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }
}

fn skip_reason(classification: &Classification) -> Option<SkipReason> {
    if !classification.is_qualifying_check {
        Some(SkipReason::NotRecallKnowledge)
    } else if !classification.is_critical_failure {
        Some(SkipReason::NotCriticalFailure)
    } else {
        None
    }
}

/// Container for trigger use cases.
pub struct TriggerUseCases {
    pub auto: Arc<AutoTrigger>,
}

impl TriggerUseCases {
    pub fn new(auto: Arc<AutoTrigger>) -> Self {
        Self { auto }
    }
}
