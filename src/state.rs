//! Applied-identity store
//!
//! The lifecycle core never persists anything. This file keeps the one
//! durable handle per workbook, keyed by `resource_group/name`, so later runs
//! know whether an apply is a create or an update.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    workbooks: BTreeMap<String, String>,
}

/// Persisted map of workbook keys to remote identities
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    state: StateFile,
}

/// Key under which a workbook is tracked
pub fn state_key(resource_group: &str, name: &str) -> String {
    format!("{}/{}", resource_group, name)
}

impl StateStore {
    /// Open a state file; a missing file is an empty store
    pub fn open(path: &Path) -> Result<Self> {
        let state = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read state file {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Corrupt state file {}", path.display()))?
        } else {
            StateFile::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            state,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.state.workbooks.get(key).map(String::as_str)
    }

    /// Find the key tracking `identity`
    pub fn key_for_identity(&self, identity: &str) -> Option<&str> {
        self.state
            .workbooks
            .iter()
            .find(|(_, id)| id.eq_ignore_ascii_case(identity))
            .map(|(key, _)| key.as_str())
    }

    pub fn insert(&mut self, key: String, identity: String) {
        self.state.workbooks.insert(key, identity);
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.state.workbooks.remove(key)
    }

    /// Forget whichever key points at `identity`
    pub fn remove_identity(&mut self, identity: &str) -> bool {
        match self.key_for_identity(identity).map(str::to_string) {
            Some(key) => self.remove(&key).is_some(),
            None => false,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.state
            .workbooks
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Write the store back, via a temp file so a crash never truncates it
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.state)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}
