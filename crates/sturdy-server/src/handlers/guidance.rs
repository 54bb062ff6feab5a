use axum::Json;
use serde::Serialize;
use sturdy_core::{guidance, ScenarioType};

#[derive(Debug, Serialize)]
pub struct ScenarioGuidance {
    pub scenario: ScenarioType,
    pub text: &'static str,
}

#[derive(Debug, Serialize)]
pub struct GuidanceResponse {
    pub principles: &'static str,
    pub scenarios: Vec<ScenarioGuidance>,
}

pub async fn get_guidance() -> Json<GuidanceResponse> {
    let scenarios = [
        ScenarioType::Sos,
        ScenarioType::ExecutiveFunction,
        ScenarioType::Rupture,
    ]
    .into_iter()
    .map(|scenario| ScenarioGuidance {
        scenario,
        text: guidance::for_scenario(scenario),
    })
    .collect();

    Json(GuidanceResponse {
        principles: guidance::CORE_PRINCIPLES,
        scenarios,
    })
}
