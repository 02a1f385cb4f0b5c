use crate::registry::{Registry, RegistryError};
use crate::{Issue, Zone};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

const BUILTIN_SEED: &str = include_str!("../data/seed.json");

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid seed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid seed data: {0}")]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedData {
    pub zones: Vec<Zone>,
    pub issues: Vec<Issue>,
}

impl SeedData {
    pub fn into_registry(self) -> Result<Registry, SeedError> {
        Ok(Registry::new(self.zones, self.issues)?)
    }
}

pub fn parse(content: &str) -> Result<Registry, SeedError> {
    let data: SeedData = serde_json::from_str(content)?;
    data.into_registry()
}

/// The six districts and thirteen reports shipped with the crate.
pub fn builtin() -> Result<Registry, SeedError> {
    parse(BUILTIN_SEED)
}

pub fn load(path: &Path) -> Result<Registry, SeedError> {
    let content = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let registry = parse(&content)?;
    info!(
        path = %path.display(),
        zones = registry.zones().len(),
        issues = registry.issues().len(),
        "loaded seed file"
    );
    Ok(registry)
}
