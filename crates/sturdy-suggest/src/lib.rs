pub mod engine;
pub mod parse;
pub mod prompt;

use async_trait::async_trait;
use sturdy_core::{AiSettings, RequestError, ScenarioType, ScriptRequest, ScriptResponse};

pub use engine::{backend_for, CompletionBackend, GenerateError};

/// Why a response carries defaults instead of model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    NotConfigured,
    Upstream,
}

#[derive(Debug, Clone)]
pub struct Generated {
    pub response: ScriptResponse,
    pub fallback: Option<Fallback>,
}

/// Anything that turns a request into a calm script.
#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    /// Rejects invalid requests; every other failure comes back as a default response.
    async fn generate(&self, request: &ScriptRequest) -> Result<Generated, RequestError>;
}

/// Fixed response used whenever the model cannot be reached.
pub fn default_response(scenario: ScenarioType, reason: &str) -> ScriptResponse {
    ScriptResponse {
        validation: parse::DEFAULT_VALIDATION.to_string(),
        shift: parse::DEFAULT_SHIFT.to_string(),
        script: parse::DEFAULT_SCRIPT.to_string(),
        scenario_type: scenario,
        raw_model_response: format!("[fallback] {reason}"),
        error: Some(reason.to_string()),
    }
}

/// Prompt, model call and parse over a pluggable backend.
pub struct ScriptService {
    backend: Box<dyn CompletionBackend>,
}

impl ScriptService {
    pub fn new(backend: Box<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    pub fn from_settings(settings: &AiSettings) -> Self {
        tracing::info!(provider = %settings.provider, model = %settings.model, "script service ready");
        Self::new(backend_for(settings))
    }
}

#[async_trait]
impl ScriptGenerator for ScriptService {
    async fn generate(&self, request: &ScriptRequest) -> Result<Generated, RequestError> {
        let request = request.sanitized()?;
        let scenario = request.scenario_type;

        let system = prompt::system_prompt();
        let user_msg = prompt::user_message(&request);

        tracing::info!(
            scenario = %scenario,
            age_band = request.age_band().label(),
            chars = request.description.chars().count(),
            "requesting script"
        );

        match self.backend.complete(&system, &user_msg).await {
            Ok(raw) => {
                tracing::debug!("raw LLM output:\n{}", raw);
                let parsed = parse::parse_model_output(&raw);
                Ok(Generated {
                    response: ScriptResponse {
                        validation: parsed.validation,
                        shift: parsed.shift,
                        script: parsed.script,
                        scenario_type: scenario,
                        raw_model_response: raw,
                        error: None,
                    },
                    fallback: None,
                })
            }
            Err(e) => {
                let fallback = if e.is_configuration() {
                    Fallback::NotConfigured
                } else {
                    Fallback::Upstream
                };
                tracing::warn!(error = %e, ?fallback, "script generation fell back to defaults");
                Ok(Generated {
                    response: default_response(scenario, &e.to_string()),
                    fallback: Some(fallback),
                })
            }
        }
    }
}

/// Generate with the given settings. Never fails past request validation.
pub async fn generate_script(
    request: &ScriptRequest,
    settings: &AiSettings,
) -> Result<ScriptResponse, RequestError> {
    ScriptService::from_settings(settings)
        .generate(request)
        .await
        .map(|g| g.response)
}
