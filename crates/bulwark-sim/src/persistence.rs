//! Save/load of installation controller state.
//!
//! Only controller state is saved. Entities, regions and power networks
//! belong to the host map and are expected to exist again on load.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use bulwark_core::state::InstallationSave;
use bulwark_core::types::InstallationId;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to access save file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to (de)serialize save data: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("installation {id:?} is not a {expected}")]
    KindMismatch {
        id: InstallationId,
        expected: &'static str,
    },
}

/// Saved state of one installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallationRecord {
    pub id: InstallationId,
    pub state: InstallationSave,
}

/// Full save data written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenseSave {
    pub tick: u64,
    pub seed: u64,
    pub installations: Vec<InstallationRecord>,
}

impl DefenseSave {
    pub fn get(&self, id: InstallationId) -> Option<&InstallationSave> {
        self.installations
            .iter()
            .find(|record| record.id == id)
            .map(|record| &record.state)
    }

    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        Ok(serde_json::from_str(json)?)
    }
}

pub fn save_path(dir: &Path, slot: &str) -> PathBuf {
    dir.join(format!("{slot}.json"))
}

pub fn save_to_file(dir: &Path, slot: &str, data: &DefenseSave) -> Result<(), PersistenceError> {
    fs::create_dir_all(dir).map_err(|source| PersistenceError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = save_path(dir, slot);
    let json = data.to_json()?;
    fs::write(&path, json).map_err(|source| PersistenceError::Io {
        path: path.clone(),
        source,
    })?;
    tracing::info!(
        target: "bulwark::persistence",
        path = %path.display(),
        installations = data.installations.len(),
        "saved"
    );
    Ok(())
}

pub fn load_from_file(dir: &Path, slot: &str) -> Result<DefenseSave, PersistenceError> {
    let path = save_path(dir, slot);
    let json = fs::read_to_string(&path).map_err(|source| PersistenceError::Io {
        path: path.clone(),
        source,
    })?;
    let data = DefenseSave::from_json(&json)?;
    tracing::info!(
        target: "bulwark::persistence",
        path = %path.display(),
        installations = data.installations.len(),
        "loaded"
    );
    Ok(data)
}

pub fn delete_save(dir: &Path, slot: &str) -> Result<(), PersistenceError> {
    let path = save_path(dir, slot);
    if path.exists() {
        fs::remove_file(&path).map_err(|source| PersistenceError::Io { path, source })?;
    }
    Ok(())
}
