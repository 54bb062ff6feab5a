//! Server configuration

use std::path::PathBuf;

use sturdy_core::AiSettings;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8787";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address (e.g., "127.0.0.1:8787")
    pub bind_address: String,

    /// Model provider settings handed to the script service
    pub ai: AiSettings,

    /// Journal directory; `None` uses ~/.sturdy/journal
    pub journal_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            ai: AiSettings::default(),
            journal_dir: None,
        }
    }
}

impl ServerConfig {
    /// Stored settings plus `STURDY_*` environment overrides.
    pub fn load() -> Self {
        let bind_address = std::env::var("STURDY_BIND")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let journal_dir = std::env::var_os("STURDY_JOURNAL_DIR").map(PathBuf::from);
        Self {
            bind_address,
            ai: sturdy_core::apply_env_overrides(sturdy_core::read_settings()),
            journal_dir,
        }
    }
}
