use std::sync::Arc;

use miette::IntoDiagnostic;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::Deserialize;
use sturdy_core::{JournalEntry, JournalStore, ScriptRequest};
use sturdy_suggest::{ScriptGenerator, ScriptService};
use tracing_subscriber::EnvFilter;

// --- Request types ---

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
struct GenerateScriptRequest {
    #[serde(flatten)]
    request: ScriptRequest,
    /// Save the generated script to the local journal
    #[serde(default)]
    save_to_journal: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct GetJournalEntryRequest {
    /// UUID of the journal entry
    id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct ListJournalRequest {
    /// Maximum number of entries to return, newest first (default 20)
    #[serde(default)]
    limit: Option<usize>,
}

// --- Server ---

#[derive(Clone)]
pub struct SturdyServer {
    generator: Arc<dyn ScriptGenerator>,
    journal: JournalStore,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl SturdyServer {
    pub fn new(generator: Arc<dyn ScriptGenerator>, journal: JournalStore) -> Self {
        Self {
            generator,
            journal,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Generate a calm script for a parent. Takes {description (required, max 800 chars), scenarioType?: \"SOS\"|\"ExecutiveFunction\"|\"Rupture\", childAgeYears?, childName?, neurotype?, tone?: \"gentle\"|\"moderate\"|\"firm\", context?, saveToJournal?}. Returns JSON {validation, shift, script, scenarioType, rawModelResponse, error?}. If the AI provider is unavailable the result still contains a usable default script and an `error` field."
    )]
    async fn generate_script(
        &self,
        Parameters(req): Parameters<GenerateScriptRequest>,
    ) -> Result<CallToolResult, McpError> {
        let generated = match self.generator.generate(&req.request).await {
            Ok(g) => g,
            Err(e) => return Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        };

        if req.save_to_journal {
            // Journal the sanitized request so stored text matches what the model saw
            if let Ok(clean) = req.request.sanitized() {
                let entry = JournalEntry::new(&clean, generated.response.clone());
                if let Err(e) = self.journal.save(&entry) {
                    tracing::warn!(error = %e, "failed to save journal entry");
                }
            }
        }

        let json = serde_json::to_string_pretty(&generated.response)
            .unwrap_or_else(|e| format!("Serialization error: {}", e));
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get the parenting principles and per-scenario guidance that shape every script")]
    fn get_guidance(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(
            sturdy_core::guidance::full_text(),
        )]))
    }

    #[tool(description = "List saved journal entries, newest first. Returns one line per entry: id, date, scenario, description excerpt.")]
    fn list_journal(
        &self,
        Parameters(req): Parameters<ListJournalRequest>,
    ) -> Result<CallToolResult, McpError> {
        match self.journal.list() {
            Ok(entries) => {
                let limit = req.limit.unwrap_or(20);
                let text = if entries.is_empty() {
                    "No journal entries yet. Use generate_script with saveToJournal to create one."
                        .to_string()
                } else {
                    entries
                        .iter()
                        .take(limit)
                        .map(format_entry_line)
                        .collect::<Vec<_>>()
                        .join("\n")
                };
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        }
    }

    #[tool(description = "Get the full JSON of one journal entry by id")]
    fn get_journal_entry(
        &self,
        Parameters(req): Parameters<GetJournalEntryRequest>,
    ) -> Result<CallToolResult, McpError> {
        let entry = JournalStore::parse_id(&req.id).and_then(|id| self.journal.get(id));
        match entry {
            Ok(entry) => {
                let json = serde_json::to_string_pretty(&entry)
                    .unwrap_or_else(|e| format!("Serialization error: {}", e));
                Ok(CallToolResult::success(vec![Content::text(json)]))
            }
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        }
    }
}

#[tool_handler]
impl ServerHandler for SturdyServer {
    fn get_info(&self) -> ServerInfo {
        let instructions = format!(
            "{}\n\n{}",
            INSTRUCTIONS,
            sturdy_core::guidance::full_text()
        );
        ServerInfo {
            instructions: Some(instructions.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// --- Helpers ---

fn format_entry_line(entry: &JournalEntry) -> String {
    let excerpt = sturdy_core::sanitize::truncate_chars(&entry.description, 60);
    let ellipsis = if excerpt.len() < entry.description.len() { "..." } else { "" };
    format!(
        "{} {} [{}] {}{}",
        entry.id,
        entry.created_at.format("%Y-%m-%d %H:%M"),
        entry.scenario_type,
        excerpt.replace('\n', " "),
        ellipsis
    )
}

const INSTRUCTIONS: &str = r#"sturdy writes calm scripts: words a parent can say to a child in a hard moment.

Call `generate_script` with the parent's description of what is happening. Every result has three parts:
- validation: one sentence for the parent
- shift: one sentence reframing the child's behavior
- script: the quoted words to say out loud

Pick scenarioType from the situation: SOS for a crisis happening now, ExecutiveFunction for a stuck task or routine, Rupture for repairing after a conflict. Pass the child's age when known; language is adjusted to the age band (0-9, 10-13, 14-18).

Present the script verbatim. If the result has an `error` field the model was unavailable and the script is a generic default; say so."#;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sturdy_mcp=info,sturdy_suggest=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let settings = sturdy_core::apply_env_overrides(sturdy_core::read_settings());
    let generator: Arc<dyn ScriptGenerator> = Arc::new(ScriptService::from_settings(&settings));

    let service = SturdyServer::new(generator, JournalStore::default_location())
        .serve(rmcp::transport::io::stdio())
        .await
        .inspect_err(|e| tracing::error!("MCP server error: {}", e))
        .into_diagnostic()?;
    service.waiting().await.into_diagnostic()?;
    Ok(())
}
