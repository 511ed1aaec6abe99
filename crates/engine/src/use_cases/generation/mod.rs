//! Misinformation generation use cases.

use std::sync::Arc;

mod orchestrator;

pub use orchestrator::{Generated, GenerationOrchestrator, OrchestratorError, PendingGeneration};

/// Container for generation use cases.
pub struct GenerationUseCases {
    pub orchestrator: Arc<GenerationOrchestrator>,
}

impl GenerationUseCases {
    pub fn new(orchestrator: Arc<GenerationOrchestrator>) -> Self {
        Self { orchestrator }
    }
}
