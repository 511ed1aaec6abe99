//! Module settings value object
//!
//! Settings are global (one row), read once at the start of every
//! operation and persisted as JSON. The API key is a secret: it never
//! appears in `Debug` output and is masked before leaving the service.

use serde::{Deserialize, Serialize};

use super::prompt_template::PromptTemplate;

pub const DEFAULT_API_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const MASKED_SECRET: &str = "********";

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModuleSettings {
    /// Root of an OpenAI-compatible API, without `/chat/completions`
    pub api_endpoint: String,
    pub api_key: String,
    pub model: String,
    /// Whether classified game events may start generations
    pub auto_trigger: bool,
    pub prompt_template: PromptTemplate,
}

impl Default for ModuleSettings {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            auto_trigger: true,
            prompt_template: PromptTemplate::default(),
        }
    }
}

impl std::fmt::Debug for ModuleSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleSettings")
            .field("api_endpoint", &self.api_endpoint)
            .field("api_key", &mask(&self.api_key))
            .field("model", &self.model)
            .field("auto_trigger", &self.auto_trigger)
            .field("prompt_template_is_default", &self.prompt_template.is_default())
            .finish()
    }
}

impl ModuleSettings {
    /// Defaults overridden by `MISRECALL_API_ENDPOINT`, `MISRECALL_API_KEY`,
    /// `MISRECALL_MODEL` and `MISRECALL_AUTO_TRIGGER` when set.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_endpoint: env_or("MISRECALL_API_ENDPOINT", defaults.api_endpoint),
            api_key: env_or("MISRECALL_API_KEY", defaults.api_key),
            model: env_or("MISRECALL_MODEL", defaults.model),
            auto_trigger: env_or("MISRECALL_AUTO_TRIGGER", defaults.auto_trigger),
            prompt_template: defaults.prompt_template,
        }
    }

    /// A copy safe to return to clients: a non-empty key becomes `********`.
    pub fn masked(&self) -> Self {
        Self {
            api_key: mask(&self.api_key).to_string(),
            ..self.clone()
        }
    }

    /// Apply an update coming back from a client. A key still equal to the
    /// mask keeps the stored secret.
    pub fn merge_update(&self, mut update: ModuleSettings) -> ModuleSettings {
        if update.api_key == MASKED_SECRET {
            update.api_key = self.api_key.clone();
        }
        update.api_endpoint = update.api_endpoint.trim().to_string();
        update.model = update.model.trim().to_string();
        update
    }

    /// Connection details, or `None` when no endpoint is configured.
    pub fn endpoint_config(&self) -> Option<EndpointConfig> {
        let endpoint = self.api_endpoint.trim();
        if endpoint.is_empty() {
            return None;
        }
        Some(EndpointConfig {
            endpoint: endpoint.to_string(),
            api_key: Some(self.api_key.trim().to_string()).filter(|key| !key.is_empty()),
            model: self.model.trim().to_string(),
        })
    }
}

/// Everything the generation client needs for one request.
#[derive(Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl std::fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_deref().map(mask))
            .field("model", &self.model)
            .finish()
    }
}

fn mask(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        MASKED_SECRET
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
