use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

use crate::{ScenarioType, ScriptRequest, ScriptResponse};

#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("invalid journal entry id: {0}")]
    InvalidId(String),
    #[error("journal entry not found: {0}")]
    NotFound(Uuid),
    #[error("journal I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("journal JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A generated script saved for later reflection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub scenario_type: ScenarioType,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_name: Option<String>,
    pub response: ScriptResponse,
}

impl JournalEntry {
    /// Build an entry from an already sanitized request and its response.
    pub fn new(request: &ScriptRequest, response: ScriptResponse) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            scenario_type: request.scenario_type,
            description: request.description.clone(),
            child_name: request.child_name.clone(),
            response,
        }
    }
}

/// Directory of `<id>.json` files, one per entry.
#[derive(Debug, Clone)]
pub struct JournalStore {
    dir: PathBuf,
}

impl JournalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The store under ~/.sturdy/journal/.
    pub fn default_location() -> Self {
        Self::new(crate::data_dir().join("journal"))
    }

    pub fn parse_id(raw: &str) -> Result<Uuid, JournalError> {
        Uuid::parse_str(raw).map_err(|_| JournalError::InvalidId(raw.to_string()))
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Write an entry with temp file + rename so readers never see a partial file.
    pub fn save(&self, entry: &JournalEntry) -> Result<(), JournalError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(entry)?;
        let tmp = self.dir.join(format!(".{}.json.tmp", entry.id));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, self.path_for(entry.id))?;
        tracing::debug!(id = %entry.id, "saved journal entry");
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> Result<JournalEntry, JournalError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(JournalError::NotFound(id));
        }
        let raw = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// All readable entries, newest first. Unreadable files are skipped.
    pub fn list(&self) -> Result<Vec<JournalEntry>, JournalError> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }
        let mut entries: Vec<JournalEntry> = fs::read_dir(&self.dir)?
            .filter_map(|entry| {
                let entry = entry.ok()?;
                let name = entry.file_name().to_string_lossy().to_string();
                let id = name.strip_suffix(".json")?;
                let id = Uuid::parse_str(id).ok()?;
                match self.get(id) {
                    Ok(e) => Some(e),
                    Err(e) => {
                        tracing::warn!(%id, error = %e, "skipping unreadable journal entry");
                        None
                    }
                }
            })
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    /// Delete an entry. Deleting a missing entry is not an error.
    pub fn delete(&self, id: Uuid) -> Result<(), JournalError> {
        let path = self.path_for(id);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}
