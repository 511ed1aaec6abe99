//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Settings persistence (SQLite today)
//! - The host chat log and actor directory (in-memory in the sidecar)
//! - LLM calls (any OpenAI-compatible endpoint)
//! - Clock (for testing)

mod error;
mod external;
mod repos;
mod testing;
mod types;

// =============================================================================
// Storage Ports
// =============================================================================
pub use repos::{CreatureDirectory, NoticeLog, SettingsRepo};

pub use types::{Audience, ChatPost};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{
    ChatMessage, LlmPort, LlmRequest, MessageRole, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use external::MockLlmPort;

#[cfg(test)]
pub use repos::{MockCreatureDirectory, MockNoticeLog, MockSettingsRepo};

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::ClockPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::{GenerationError, RepoError};
