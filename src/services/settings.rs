use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::{ProviderConfig, ProviderKind};
use crate::services::prompt::DEFAULT_MAX_HISTORY;

/// Server-held credential for the single-provider proxy route.
pub const PROXY_API_KEY_ENV: &str = "WARRIORBOT_API_KEY";

/// Baseline persona used whenever the caller supplies no system prompt.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are WarriorBot, a warm and knowledgeable assistant \
for a sickle cell disease support community. Offer practical, compassionate guidance about \
living with sickle cell disease: pain management, hydration, nutrition, treatment questions, \
and emotional support. Keep answers concise and encouraging. You are not a doctor; for medical \
decisions, always point people to their care team. If someone describes an emergency, tell them \
to call 911 or their local emergency number immediately.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub system_prompt: String,
    pub max_history: usize,
    /// Fallback order is the order of this list.
    pub providers: Vec<ProviderConfig>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_history: DEFAULT_MAX_HISTORY,
            providers: vec![
                ProviderConfig::new(ProviderKind::Groq),
                ProviderConfig::new(ProviderKind::OpenRouter),
                ProviderConfig::new(ProviderKind::Gemini),
            ],
        }
    }
}

impl AppSettings {
    /// Loads settings once at startup: `WARRIORBOT_CONFIG` path if set, else
    /// the platform config dir, else defaults. Credentials missing from the
    /// file are filled from each backend's environment variable. The result
    /// is immutable for the life of the process.
    pub fn load() -> Self {
        let path = std::env::var("WARRIORBOT_CONFIG")
            .map(PathBuf::from)
            .ok()
            .or_else(default_path);

        let mut settings = match path {
            Some(ref p) if p.exists() => Self::read(p).unwrap_or_default(),
            _ => Self::default(),
        };
        settings.fill_credentials_from_env();
        settings
    }

    fn read(path: &Path) -> Option<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => Some(settings),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring malformed settings file");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read settings file");
                None
            }
        }
    }

    fn fill_credentials_from_env(&mut self) {
        for provider in &mut self.providers {
            if provider.api_key.as_deref().map_or(true, str::is_empty) {
                if let Ok(key) = std::env::var(provider.kind.credential_env_var()) {
                    if !key.is_empty() {
                        provider.api_key = Some(key);
                    }
                }
            }
        }
    }
}

fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("warriorbot").join("settings.json"))
}
