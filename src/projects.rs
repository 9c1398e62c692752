//! Project name to identifier resolution. Sessions store the identifier so that renaming a
//! project keeps its history.

use std::{collections::BTreeMap, io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("no project named {0:?}")]
    Unknown(String),
    #[error("failed to access project directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("project directory is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait]
pub trait ProjectResolver: Send + Sync {
    async fn resolve(&self, name: &str) -> Result<String, ProjectError>;
}

/// Projects kept in a single JSON object mapping names to identifiers.
pub struct JsonProjectDirectory {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonProjectDirectory {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub async fn list(&self) -> Result<BTreeMap<String, String>, ProjectError> {
        match tokio::fs::read(&self.path).await {
            Ok(content) => Ok(serde_json::from_slice(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Registers a project and returns its identifier. Adding an existing name returns the
    /// identifier it already has.
    pub async fn add(&self, name: &str) -> Result<String, ProjectError> {
        let _guard = self.write_lock.lock().await;
        let mut projects = self.list().await?;
        if let Some(id) = projects.get(name) {
            return Ok(id.clone());
        }

        let id = Uuid::new_v4().to_string();
        projects.insert(name.to_string(), id.clone());
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_vec_pretty(&projects)?).await?;
        info!("Added project {name} with id {id}");
        Ok(id)
    }
}

#[async_trait]
impl ProjectResolver for JsonProjectDirectory {
    async fn resolve(&self, name: &str) -> Result<String, ProjectError> {
        self.list()
            .await?
            .remove(name)
            .ok_or_else(|| ProjectError::Unknown(name.to_string()))
    }
}
