//! Application state

use std::sync::Arc;

use sturdy_core::JournalStore;
use sturdy_suggest::{ScriptGenerator, ScriptService};

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn ScriptGenerator>,
    pub journal: JournalStore,
    pub ai_configured: bool,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        let journal = match &config.journal_dir {
            Some(dir) => JournalStore::new(dir),
            None => JournalStore::default_location(),
        };
        Self {
            generator: Arc::new(ScriptService::from_settings(&config.ai)),
            journal,
            ai_configured: sturdy_core::ai_configured(&config.ai),
        }
    }
}
