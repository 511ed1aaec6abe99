//! Generate misinformation for a creature and keep its notice in step.

use std::sync::Arc;

use serde::Serialize;

use misrecall_domain::{
    ActorId, Caller, CreatureRecord, EndpointConfig, NoticeId, NoticeRecord, PromptTemplate,
    TriggerMeta,
};

use crate::infrastructure::ports::{
    ClockPort, CreatureDirectory, GenerationError, LlmPort, LlmRequest, NoticeLog, RepoError,
};
use crate::prompt_templates::build_prompt;
use crate::use_cases::settings::{SettingsError, SettingsOps};

/// Result of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Generated {
    pub notice_id: NoticeId,
    pub attempt: u64,
    pub text: String,
}

/// Runs the loading -> content/error sequence for a notice.
///
/// Preconditions are checked in order: NPC actor, privileged caller,
/// configured endpoint. Settings are read once per call.
pub struct GenerationOrchestrator {
    llm: Arc<dyn LlmPort>,
    notices: Arc<dyn NoticeLog>,
    creatures: Arc<dyn CreatureDirectory>,
    settings: Arc<SettingsOps>,
    clock: Arc<dyn ClockPort>,
}

impl GenerationOrchestrator {
    pub fn new(
        llm: Arc<dyn LlmPort>,
        notices: Arc<dyn NoticeLog>,
        creatures: Arc<dyn CreatureDirectory>,
        settings: Arc<SettingsOps>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            llm,
            notices,
            creatures,
            settings,
            clock,
        }
    }

    /// Start a new notice for `creature` and fill it.
    ///
    /// On a generation failure the notice is moved to its error state first,
    /// then the error is returned.
    pub async fn generate(
        &self,
        creature: &CreatureRecord,
        trigger: TriggerMeta,
        caller: &Caller,
    ) -> Result<Generated, OrchestratorError> {
        let pending = self.start(creature, trigger, caller).await?;
        self.finish(pending).await
    }

    /// Rerun generation for an existing notice, reusing its creature and
    /// trigger attribution.
    ///
    /// Not guarded against an attempt already in flight; the older attempt's
    /// result is discarded when it arrives.
    pub async fn regenerate(
        &self,
        notice_id: NoticeId,
        caller: &Caller,
    ) -> Result<Generated, OrchestratorError> {
        let pending = self.start_regenerate(notice_id, caller).await?;
        self.finish(pending).await
    }

    /// Check preconditions and store a loading notice without calling the
    /// model. Pair with [`Self::finish`].
    pub async fn start(
        &self,
        creature: &CreatureRecord,
        trigger: TriggerMeta,
        caller: &Caller,
    ) -> Result<PendingGeneration, OrchestratorError> {
        let (config, template) = self.check_preconditions(creature, caller).await?;

        let notice = NoticeRecord::loading(
            creature.id.clone(),
            creature.name.clone(),
            trigger,
            vec![caller.id.clone()],
            self.clock.now(),
        );
        self.notices.create(&notice).await?;

        tracing::info!(
            notice_id = %notice.id,
            creature = %creature.name,
            trigger = notice.trigger.trigger_type.as_str(),
            "Generating misinformation"
        );

        Ok(PendingGeneration {
            notice_id: notice.id,
            attempt: notice.attempt(),
            creature: creature.clone(),
            config,
            template,
        })
    }

    /// Move an existing notice back to loading under a new attempt.
    pub async fn start_regenerate(
        &self,
        notice_id: NoticeId,
        caller: &Caller,
    ) -> Result<PendingGeneration, OrchestratorError> {
        let mut notice = self
            .notices
            .get(notice_id)
            .await?
            .ok_or(OrchestratorError::NoticeNotFound(notice_id))?;

        let creature = self
            .creatures
            .get(&notice.creature_id)
            .await?
            .ok_or_else(|| OrchestratorError::CreatureNotFound(notice.creature_id.clone()))?;

        let (config, template) = self.check_preconditions(&creature, caller).await?;

        let attempt = notice.start_attempt(self.clock.now());
        self.notices.update(&notice).await?;

        tracing::info!(
            notice_id = %notice.id,
            creature = %creature.name,
            attempt,
            "Regenerating misinformation"
        );

        Ok(PendingGeneration {
            notice_id,
            attempt,
            creature,
            config,
            template,
        })
    }

    /// Call the model and move the notice to content or error.
    pub async fn finish(&self, pending: PendingGeneration) -> Result<Generated, OrchestratorError> {
        let PendingGeneration {
            notice_id,
            attempt,
            creature,
            config,
            template,
        } = pending;

        let prompt = build_prompt(Some(&creature), &template);
        let request = LlmRequest::user(prompt.user).with_system_prompt(prompt.system);

        match self.llm.complete(&config, request).await {
            Ok(text) => {
                self.record_content(notice_id, attempt, &text).await?;
                Ok(Generated {
                    notice_id,
                    attempt,
                    text,
                })
            }
            Err(e) => {
                tracing::error!(notice_id = %notice_id, attempt, error = %e, "Generation failed");
                if let Err(source) = self.record_error(notice_id, attempt, &e).await {
                    return Err(OrchestratorError::Unrecorded {
                        notice_id,
                        generation: e,
                        source,
                    });
                }
                Err(OrchestratorError::Generation {
                    notice_id,
                    source: e,
                })
            }
        }
    }

    async fn check_preconditions(
        &self,
        creature: &CreatureRecord,
        caller: &Caller,
    ) -> Result<(EndpointConfig, PromptTemplate), OrchestratorError> {
        if !creature.is_creature() {
            return Err(OrchestratorError::NotACreature(creature.id.clone()));
        }
        if !caller.is_privileged() {
            return Err(OrchestratorError::NotPrivileged);
        }

        let settings = self.settings.get_global().await?;
        let config = settings
            .endpoint_config()
            .ok_or(OrchestratorError::NotConfigured)?;
        Ok((config, settings.prompt_template))
    }

    // Both recorders apply to the stored copy; a newer attempt may have
    // started meanwhile.

    async fn record_content(
        &self,
        notice_id: NoticeId,
        attempt: u64,
        text: &str,
    ) -> Result<(), OrchestratorError> {
        let mut notice = self
            .notices
            .get(notice_id)
            .await?
            .ok_or(OrchestratorError::NoticeNotFound(notice_id))?;

        if notice.complete(attempt, text, self.clock.now()) {
            self.notices.update(&notice).await?;
            tracing::info!(notice_id = %notice_id, attempt, "Misinformation ready");
        } else {
            tracing::debug!(
                notice_id = %notice_id,
                attempt,
                current_attempt = notice.attempt(),
                "Discarding result of a superseded attempt"
            );
        }
        Ok(())
    }

    async fn record_error(
        &self,
        notice_id: NoticeId,
        attempt: u64,
        error: &GenerationError,
    ) -> Result<(), RepoError> {
        let mut notice = self
            .notices
            .get(notice_id)
            .await?
            .ok_or_else(|| RepoError::not_found("Notice", notice_id))?;

        if notice.fail(attempt, error.to_string(), self.clock.now()) {
            self.notices.update(&notice).await?;
        }
        Ok(())
    }
}

/// A loading notice whose model call has not run yet.
#[derive(Debug, Clone)]
pub struct PendingGeneration {
    pub notice_id: NoticeId,
    pub attempt: u64,
    creature: CreatureRecord,
    config: EndpointConfig,
    template: PromptTemplate,
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("Actor {0} is not a creature")]
    NotACreature(ActorId),
    #[error("Only a GM can generate misinformation")]
    NotPrivileged,
    #[error("No API endpoint configured. Set one in the module settings.")]
    NotConfigured,
    #[error("Notice not found: {0}")]
    NoticeNotFound(NoticeId),
    #[error("Creature not found: {0}")]
    CreatureNotFound(ActorId),
    /// The notice exists and shows this error.
    #[error("{source}")]
    Generation {
        notice_id: NoticeId,
        #[source]
        source: GenerationError,
    },
    /// Generation failed and the notice still shows it as loading.
    #[error("{generation} (notice not updated: {source})")]
    Unrecorded {
        notice_id: NoticeId,
        generation: GenerationError,
        #[source]
        source: RepoError,
    },
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl From<SettingsError> for OrchestratorError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::Repo(e) => Self::Repo(e),
        }
    }
}
