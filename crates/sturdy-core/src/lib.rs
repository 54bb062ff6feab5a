pub mod guidance;
pub mod journal;
pub mod sanitize;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

pub use journal::{JournalEntry, JournalError, JournalStore};

// --- Limits ---

pub const MAX_DESCRIPTION_CHARS: usize = 800;
pub const MAX_CHILD_NAME_CHARS: usize = 120;
pub const MAX_NEUROTYPE_CHARS: usize = 120;
pub const MAX_CONTEXT_CHARS: usize = 800;
/// Ages above this are treated as a typo and dropped.
pub const MAX_CHILD_AGE_YEARS: f64 = 25.0;

// --- Types (matching the client's request/response JSON) ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, schemars::JsonSchema)]
pub enum ScenarioType {
    /// Crisis in the moment: meltdown, aggression, refusal.
    #[default]
    #[serde(rename = "SOS")]
    Sos,
    /// Task avoidance, stalled routines, homework standoffs.
    ExecutiveFunction,
    /// Repair after a conflict the parent regrets.
    Rupture,
}

impl ScenarioType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioType::Sos => "SOS",
            ScenarioType::ExecutiveFunction => "ExecutiveFunction",
            ScenarioType::Rupture => "Rupture",
        }
    }
}

impl fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Gentle,
    Moderate,
    Firm,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Gentle => "gentle",
            Tone::Moderate => "moderate",
            Tone::Firm => "firm",
        }
    }
}

/// Coarse age bucket used to pitch the language of a script.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AgeBand {
    #[serde(rename = "0-9")]
    Young,
    #[serde(rename = "10-13")]
    Tween,
    #[serde(rename = "14-18")]
    Teen,
    #[serde(rename = "unknown")]
    Unknown,
}

impl AgeBand {
    pub fn from_age(age_years: Option<f64>) -> Self {
        match age_years {
            Some(age) if age.is_nan() => AgeBand::Unknown,
            Some(age) if age <= 9.0 => AgeBand::Young,
            Some(age) if age < 14.0 => AgeBand::Tween,
            Some(_) => AgeBand::Teen,
            None => AgeBand::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBand::Young => "0-9",
            AgeBand::Tween => "10-13",
            AgeBand::Teen => "14-18",
            AgeBand::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScriptRequest {
    /// What is happening, in the parent's words
    pub description: String,
    #[serde(default)]
    pub scenario_type: ScenarioType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_age_years: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neurotype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<Tone>,
    /// Anything else the parent wants considered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("description is required")]
    EmptyDescription,
}

impl ScriptRequest {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn age_band(&self) -> AgeBand {
        AgeBand::from_age(self.child_age_years)
    }

    /// Return a copy with every free-text field sanitized and bounded.
    /// Optional fields that sanitize to nothing are dropped.
    pub fn sanitized(&self) -> Result<ScriptRequest, RequestError> {
        let description = sanitize::sanitize(Some(&self.description), MAX_DESCRIPTION_CHARS);
        if description.is_empty() {
            return Err(RequestError::EmptyDescription);
        }
        let optional = |value: &Option<String>, max: usize| {
            Some(sanitize::sanitize(value.as_deref(), max)).filter(|s| !s.is_empty())
        };
        Ok(ScriptRequest {
            description,
            scenario_type: self.scenario_type,
            child_age_years: self
                .child_age_years
                .filter(|a| (0.0..=MAX_CHILD_AGE_YEARS).contains(a)),
            child_name: optional(&self.child_name, MAX_CHILD_NAME_CHARS),
            neurotype: optional(&self.neurotype, MAX_NEUROTYPE_CHARS),
            tone: self.tone,
            context: optional(&self.context, MAX_CONTEXT_CHARS),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScriptResponse {
    pub validation: String,
    pub shift: String,
    /// Always quote-delimited
    pub script: String,
    pub scenario_type: ScenarioType,
    pub raw_model_response: String,
    /// Set only when the response is a fallback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// --- Storage ---

/// Resolve the data directory (~/.sturdy/).
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sturdy")
}

// --- AI Settings ---

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    pub provider: String,
    pub api_key: String,
    pub model: String,
    /// Only used by OpenAI-compatible endpoints and self-hosted providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

pub fn settings_path() -> PathBuf {
    data_dir().join("settings.json")
}

pub fn read_settings() -> AiSettings {
    read_settings_from(&settings_path())
}

pub fn read_settings_from(path: &std::path::Path) -> AiSettings {
    if !path.exists() {
        return AiSettings::default();
    }
    fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

/// Layer `STURDY_PROVIDER`, `STURDY_MODEL`, `STURDY_API_KEY` and
/// `STURDY_BASE_URL` over stored settings. Binaries call this once at
/// startup; libraries only ever see the resulting struct.
pub fn apply_env_overrides(settings: AiSettings) -> AiSettings {
    apply_overrides(settings, |key| std::env::var(key).ok())
}

fn apply_overrides(mut settings: AiSettings, lookup: impl Fn(&str) -> Option<String>) -> AiSettings {
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    if let Some(provider) = var("STURDY_PROVIDER") {
        settings.provider = provider;
    }
    if let Some(model) = var("STURDY_MODEL") {
        settings.model = model;
    }
    if let Some(key) = var("STURDY_API_KEY") {
        settings.api_key = key;
    }
    if let Some(url) = var("STURDY_BASE_URL") {
        settings.base_url = Some(url);
    }
    settings
}

pub fn ai_configured(settings: &AiSettings) -> bool {
    if settings.provider.is_empty() || settings.model.is_empty() {
        return false;
    }
    match settings.provider.as_str() {
        "ollama" => true,
        // Self-hosted endpoints may run without a key but need an address
        "openai-compatible" => settings.base_url.as_deref().is_some_and(|u| !u.is_empty()),
        _ => !settings.api_key.is_empty(),
    }
}
