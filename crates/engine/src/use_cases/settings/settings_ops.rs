//! Module settings management use cases.
//!
//! Settings have a single global scope. Nothing is stored until the first
//! update; until then reads return the seed defaults (environment overrides
//! applied at startup).

use std::sync::Arc;

use serde::Serialize;

use misrecall_domain::{ModuleSettings, PromptTemplate};

use crate::infrastructure::ports::{
    GenerationError, LlmPort, LlmRequest, RepoError, SettingsRepo,
};
use crate::prompt_templates;

/// Prompt sent by the connection test.
pub const CONNECTION_TEST_PROMPT: &str = "Say \"Connection successful\" in exactly those words.";

const CONNECTION_TEST_PHRASE: &str = "connection successful";

/// Settings as returned to clients: secret masked, template warnings attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub settings: ModuleSettings,
    /// Placeholders in the template that no creature facet fills
    pub unknown_placeholders: Vec<String>,
}

impl SettingsView {
    fn of(settings: &ModuleSettings) -> Self {
        Self {
            settings: settings.masked(),
            unknown_placeholders: settings.prompt_template.unknown_placeholders(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTest {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Settings operations use case.
pub struct SettingsOps {
    repo: Arc<dyn SettingsRepo>,
    llm: Arc<dyn LlmPort>,
    seed: ModuleSettings,
}

impl SettingsOps {
    pub fn new(repo: Arc<dyn SettingsRepo>, llm: Arc<dyn LlmPort>, seed: ModuleSettings) -> Self {
        Self { repo, llm, seed }
    }

    /// Get the current settings, secret included.
    ///
    /// Returns the seed defaults if none have been saved.
    pub async fn get_global(&self) -> Result<ModuleSettings, SettingsError> {
        Ok(self
            .repo
            .get_global()
            .await?
            .unwrap_or_else(|| self.seed.clone()))
    }

    pub async fn view(&self) -> Result<SettingsView, SettingsError> {
        let settings = self.get_global().await?;
        Ok(SettingsView::of(&settings))
    }

    /// Replace the settings with a client's copy.
    ///
    /// A key sent back as the mask keeps the stored secret.
    pub async fn update_global(&self, update: ModuleSettings) -> Result<SettingsView, SettingsError> {
        let current = self.get_global().await?;
        let settings = current.merge_update(update);
        self.repo.save_global(&settings).await?;

        let view = SettingsView::of(&settings);
        if !view.unknown_placeholders.is_empty() {
            tracing::warn!(
                placeholders = ?view.unknown_placeholders,
                "Prompt template references unknown placeholders; they will render empty"
            );
        }
        tracing::info!(settings = ?settings, "Module settings updated");
        Ok(view)
    }

    /// Reset settings to the seed defaults.
    pub async fn reset_global(&self) -> Result<SettingsView, SettingsError> {
        self.repo.save_global(&self.seed).await?;
        tracing::info!("Module settings reset to defaults");
        Ok(SettingsView::of(&self.seed))
    }

    /// Render a template (the stored one when `None`) against the sample creature.
    pub async fn preview(&self, template: Option<PromptTemplate>) -> Result<String, SettingsError> {
        let template = match template {
            Some(template) => template,
            None => self.get_global().await?.prompt_template,
        };
        Ok(prompt_templates::preview(&template))
    }

    /// Ask the configured model to echo a fixed phrase.
    ///
    /// Failures are reported in the result, never as an error.
    pub async fn test_connection(&self) -> Result<ConnectionTest, SettingsError> {
        let settings = self.get_global().await?;
        let Some(config) = settings.endpoint_config() else {
            return Ok(ConnectionTest {
                success: false,
                reply: None,
                error: Some(GenerationError::NotConfigured.to_string()),
            });
        };

        match self
            .llm
            .complete(&config, LlmRequest::user(CONNECTION_TEST_PROMPT))
            .await
        {
            Ok(reply) => {
                let success = reply.to_lowercase().contains(CONNECTION_TEST_PHRASE);
                tracing::info!(success, endpoint = %config.endpoint, "Connection test finished");
                Ok(ConnectionTest {
                    success,
                    reply: Some(reply),
                    error: None,
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, endpoint = %config.endpoint, "Connection test failed");
                Ok(ConnectionTest {
                    success: false,
                    reply: None,
                    error: Some(e.to_string()),
                })
            }
        }
    }
}

/// Errors that can occur during settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockLlmPort, MockSettingsRepo};
    use misrecall_domain::value_objects::MASKED_SECRET;

    fn stored(key: &str) -> ModuleSettings {
        ModuleSettings {
            api_key: key.to_string(),
            ..ModuleSettings::default()
        }
    }

    #[tokio::test]
    async fn get_returns_seed_when_nothing_stored() {
        let mut repo = MockSettingsRepo::new();
        repo.expect_get_global().returning(|| Ok(None));

        let seed = ModuleSettings {
            model: "llama3".to_string(),
            ..ModuleSettings::default()
        };
        let ops = SettingsOps::new(Arc::new(repo), Arc::new(MockLlmPort::new()), seed.clone());

        assert_eq!(ops.get_global().await.expect("settings"), seed);
    }

    #[tokio::test]
    async fn view_masks_the_key() {
        let mut repo = MockSettingsRepo::new();
        repo.expect_get_global()
            .returning(|| Ok(Some(stored("sk-secret"))));
        let ops = SettingsOps::new(
            Arc::new(repo),
            Arc::new(MockLlmPort::new()),
            ModuleSettings::default(),
        );

        let view = ops.view().await.expect("view");
        assert_eq!(view.settings.api_key, MASKED_SECRET);
    }

    #[tokio::test]
    async fn update_with_masked_key_keeps_secret() {
        let mut repo = MockSettingsRepo::new();
        repo.expect_get_global()
            .returning(|| Ok(Some(stored("sk-secret"))));
        repo.expect_save_global()
            .withf(|s| s.api_key == "sk-secret" && s.model == "gpt-4o" && !s.auto_trigger)
            .times(1)
            .returning(|_| Ok(()));
        let ops = SettingsOps::new(
            Arc::new(repo),
            Arc::new(MockLlmPort::new()),
            ModuleSettings::default(),
        );

        let update = ModuleSettings {
            api_key: MASKED_SECRET.to_string(),
            model: " gpt-4o ".to_string(),
            auto_trigger: false,
            prompt_template: PromptTemplate::new("{{name}} hates {{colour}}"),
            ..ModuleSettings::default()
        };
        let view = ops.update_global(update).await.expect("update");

        assert_eq!(view.unknown_placeholders, vec!["colour".to_string()]);
        assert_eq!(view.settings.api_key, MASKED_SECRET);
    }

    #[tokio::test]
    async fn reset_saves_seed() {
        let seed = ModuleSettings::default();
        let expected = seed.clone();
        let mut repo = MockSettingsRepo::new();
        repo.expect_save_global()
            .withf(move |s| *s == expected)
            .times(1)
            .returning(|_| Ok(()));
        let ops = SettingsOps::new(Arc::new(repo), Arc::new(MockLlmPort::new()), seed);

        let view = ops.reset_global().await.expect("reset");
        assert!(view.settings.prompt_template.is_default());
    }

    #[tokio::test]
    async fn preview_uses_given_template() {
        let ops = SettingsOps::new(
            Arc::new(MockSettingsRepo::new()),
            Arc::new(MockLlmPort::new()),
            ModuleSettings::default(),
        );

        let text = ops
            .preview(Some(PromptTemplate::new("About {{name}}: {{weaknesses}}")))
            .await
            .expect("preview");
        assert_eq!(text, "About Adult Red Dragon: cold 15");
    }

    #[tokio::test]
    async fn connection_test_checks_reply_phrase() {
        let mut repo = MockSettingsRepo::new();
        repo.expect_get_global().returning(|| Ok(None));
        let mut llm = MockLlmPort::new();
        llm.expect_complete()
            .withf(|_, request| {
                request.system_prompt.is_none()
                    && request.user_prompt() == Some(CONNECTION_TEST_PROMPT)
            })
            .returning(|_, _| Ok("Connection successful.".to_string()));
        let ops = SettingsOps::new(Arc::new(repo), Arc::new(llm), ModuleSettings::default());

        let result = ops.test_connection().await.expect("test");
        assert!(result.success);
    }

    #[tokio::test]
    async fn connection_test_reports_failure() {
        let mut repo = MockSettingsRepo::new();
        repo.expect_get_global().returning(|| Ok(None));
        let mut llm = MockLlmPort::new();
        llm.expect_complete()
            .returning(|_, _| Err(GenerationError::upstream(401, "Invalid API key")));
        let ops = SettingsOps::new(Arc::new(repo), Arc::new(llm), ModuleSettings::default());

        let result = ops.test_connection().await.expect("test");
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("API error: Invalid API key"));
    }

    #[tokio::test]
    async fn connection_test_without_endpoint_skips_network() {
        let mut repo = MockSettingsRepo::new();
        repo.expect_get_global().returning(|| {
            Ok(Some(ModuleSettings {
                api_endpoint: String::new(),
                ..ModuleSettings::default()
            }))
        });
        let mut llm = MockLlmPort::new();
        llm.expect_complete().never();
        let ops = SettingsOps::new(Arc::new(repo), Arc::new(llm), ModuleSettings::default());

        let result = ops.test_connection().await.expect("test");
        assert!(!result.success);
        assert!(result.error.is_some());
    }
}
