//! Application state and composition.

use std::sync::Arc;

use misrecall_domain::ModuleSettings;

use crate::infrastructure::{
    clock::SystemClock,
    ports::{ClockPort, CreatureDirectory, LlmPort, NoticeLog, SettingsRepo},
};
use crate::stores::{InMemoryCreatureDirectory, InMemoryNoticeLog};
use crate::use_cases;

/// Main application state.
///
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
}

/// Container for the storage ports.
pub struct Repositories {
    pub notices: Arc<dyn NoticeLog>,
    pub creatures: Arc<dyn CreatureDirectory>,
}

/// Container for all use cases.
pub struct UseCases {
    pub settings: Arc<use_cases::SettingsOps>,
    pub generation: use_cases::GenerationUseCases,
    pub notices: use_cases::NoticeUseCases,
    pub trigger: use_cases::TriggerUseCases,
}

impl App {
    /// Wire the sidecar with in-memory notice and creature stores.
    pub fn new(
        llm: Arc<dyn LlmPort>,
        settings_repo: Arc<dyn SettingsRepo>,
        seed: ModuleSettings,
    ) -> Self {
        Self::with_ports(
            llm,
            settings_repo,
            Arc::new(InMemoryNoticeLog::new()),
            Arc::new(InMemoryCreatureDirectory::new()),
            Arc::new(SystemClock::new()),
            seed,
        )
    }

    pub fn with_ports(
        llm: Arc<dyn LlmPort>,
        settings_repo: Arc<dyn SettingsRepo>,
        notices: Arc<dyn NoticeLog>,
        creatures: Arc<dyn CreatureDirectory>,
        clock: Arc<dyn ClockPort>,
        seed: ModuleSettings,
    ) -> Self {
        let settings = Arc::new(use_cases::SettingsOps::new(
            settings_repo,
            llm.clone(),
            seed,
        ));

        let orchestrator = Arc::new(use_cases::generation::GenerationOrchestrator::new(
            llm,
            notices.clone(),
            creatures.clone(),
            settings.clone(),
            clock,
        ));

        let actions = Arc::new(use_cases::notices::NoticeActions::new(
            notices.clone(),
            orchestrator.clone(),
        ));

        let auto = Arc::new(use_cases::trigger::AutoTrigger::new(
            orchestrator.clone(),
            creatures.clone(),
            settings.clone(),
        ));

        Self {
            repositories: Repositories { notices, creatures },
            use_cases: UseCases {
                settings,
                generation: use_cases::GenerationUseCases::new(orchestrator),
                notices: use_cases::NoticeUseCases::new(actions),
                trigger: use_cases::TriggerUseCases::new(auto),
            },
        }
    }
}
