//! Last applied state per project
//!
//! One JSON file per project under the state directory. The stored model is
//! the prior side of the next plan; the stored response document is what the
//! remote system last returned.

use crate::models::Project;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use modelkit::Document;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateEntry {
    /// Project name, also the file stem
    pub project: String,

    /// The model as populated from the last response
    pub model: Project,

    /// The last response document
    pub document: Document,

    /// Last time the state was updated
    pub last_updated: DateTime<Utc>,
}

impl StateEntry {
    pub fn new(project: impl Into<String>, model: Project, document: Document) -> Self {
        Self {
            project: project.into(),
            model,
            document,
            last_updated: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default state directory (~/.local/state/skein)
    pub fn default_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".local").join("state").join("skein"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, project: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(project)))
    }

    /// Load a project's state, or `None` if it was never applied
    pub fn load(&self, project: &str) -> Result<Option<StateEntry>> {
        let path = self.entry_path(project);

        if !path.exists() {
            log::debug!("No state for '{project}' at {}", path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let entry: StateEntry = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        log::debug!("Loaded state from {}", path.display());
        Ok(Some(entry))
    }

    pub fn save(&self, entry: &StateEntry) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create state directory: {}", self.dir.display())
        })?;

        let path = self.entry_path(&entry.project);
        let content =
            serde_json::to_string_pretty(entry).context("Failed to serialize state to JSON")?;

        fs::write(&path, &content)
            .with_context(|| format!("Failed to write state file: {}", path.display()))?;

        log::debug!("Saved state to {}", path.display());
        Ok(())
    }

    /// All stored entries, sorted by project name
    pub fn list(&self) -> Result<Vec<StateEntry>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        let dir = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read state directory: {}", self.dir.display()))?;
        for item in dir {
            let path = item?.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read state file: {}", path.display()))?;
            match serde_json::from_str::<StateEntry>(&content) {
                Ok(entry) => entries.push(entry),
                Err(e) => log::warn!("Skipping unreadable state file {}: {e}", path.display()),
            }
        }
        entries.sort_by(|a, b| a.project.cmp(&b.project));
        Ok(entries)
    }

    /// Delete a project's state; returns whether there was any
    pub fn remove(&self, project: &str) -> Result<bool> {
        let path = self.entry_path(project);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove state file: {}", path.display()))?;
        Ok(true)
    }
}

/// Project names are free text; keep file names portable
fn file_stem(project: &str) -> String {
    project
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
