use std::env;

use crate::offline::OfflineDelays;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// `None` selects offline mode.
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub offline_delays: OfflineDelays,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::offline()
    }
}

impl GatewayConfig {
    pub fn offline() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            offline_delays: OfflineDelays::default(),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(non_empty_env)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_key = lookup("GEMINI_API_KEY").or_else(|| lookup("API_KEY"));
        let api_base = lookup("GEMINI_API_BASE")
            .map(|value| value.trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let model = lookup("EWASTED_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Self {
            api_key,
            api_base,
            model,
            offline_delays: OfflineDelays::default(),
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        let api_base = api_base.into();
        let trimmed = api_base.trim().trim_end_matches('/');
        if !trimmed.is_empty() {
            self.api_base = trimmed.to_string();
        }
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        if !model.trim().is_empty() {
            self.model = model.trim().to_string();
        }
        self
    }

    pub fn with_offline_delays(mut self, delays: OfflineDelays) -> Self {
        self.offline_delays = delays;
        self
    }

    pub fn is_live(&self) -> bool {
        self.api_key.is_some()
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
