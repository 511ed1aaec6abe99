//! Error types for port operations.

/// Storage operation errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Entity not found - includes entity type and ID for actionable error messages.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Database operation failed - includes operation name for tracing.
    #[error("Database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepoError {
    /// Create a NotFound error with entity type and ID context.
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Create a Database error with operation context.
    pub fn database(operation: &'static str, message: impl ToString) -> Self {
        Self::Database {
            operation,
            message: message.to_string(),
        }
    }

    /// Create a Serialization error.
    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }

    /// Check if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Failures of a single chat-completion request.
///
/// The display text is what ends up in a notice's error state, so it is
/// written for the GM, not for logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// No endpoint configured; raised before any network call.
    #[error("No API endpoint configured. Set one in the module settings.")]
    NotConfigured,

    #[error("Network error: could not reach the API endpoint ({0})")]
    Network(String),

    /// 2xx status but no `choices[0].message` in the body.
    #[error("Invalid response from the API: {0}")]
    MalformedResponse(String),

    #[error("API error: {message}")]
    Upstream { status: u16, message: String },
}

impl GenerationError {
    pub fn network(message: impl ToString) -> Self {
        Self::Network(message.to_string())
    }

    pub fn malformed(message: impl ToString) -> Self {
        Self::MalformedResponse(message.to_string())
    }

    pub fn upstream(status: u16, message: impl ToString) -> Self {
        Self::Upstream {
            status,
            message: message.to_string(),
        }
    }
}
