//! Template storage
//!
//! `TemplateStore` is the narrow contract the pipeline consumes. Two
//! implementations ship with the crate:
//! - `MemoryStore`: in-process map behind a `tokio` RwLock
//! - `FileStore`: the same map persisted as a JSON snapshot after every write
//!
//! Both allow concurrent reads and serialize writes. Ids are assigned
//! sequentially from 1 and never reused.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{NewTemplate, Template, TemplateId};
use tokio::sync::RwLock;

use crate::error::StoreError;

/// Persistence contract for templates
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Persist a new template and return its id
    async fn create(&self, template: NewTemplate) -> Result<TemplateId, StoreError>;

    async fn find(&self, id: TemplateId) -> Result<Option<Template>, StoreError>;

    /// All templates in creation order
    async fn list(&self) -> Result<Vec<Template>, StoreError>;

    /// Replace a template body. The embedding is left as it was.
    async fn update_body(&self, id: TemplateId, body: String) -> Result<(), StoreError>;

    /// First template whose title matches exactly
    async fn find_by_title(&self, title: &str) -> Result<Option<Template>, StoreError> {
        Ok(self.list().await?.into_iter().find(|t| t.title == title))
    }
}

/// Serializable store state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Snapshot {
    next_id: u64,
    templates: BTreeMap<TemplateId, Template>,
}

impl Snapshot {
    fn insert(&mut self, template: NewTemplate) -> TemplateId {
        self.next_id = self.next_id.max(1);
        let id = TemplateId(self.next_id);
        self.next_id += 1;
        self.templates.insert(id, template.into_template(id));
        id
    }

    fn update_body(&mut self, id: TemplateId, body: String) -> Result<(), StoreError> {
        let template = self
            .templates
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;
        template.body = body;
        Ok(())
    }
}

/// In-memory template store
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn create(&self, template: NewTemplate) -> Result<TemplateId, StoreError> {
        let id = self.inner.write().await.insert(template);
        tracing::debug!("Stored template {}", id);
        Ok(id)
    }

    async fn find(&self, id: TemplateId) -> Result<Option<Template>, StoreError> {
        Ok(self.inner.read().await.templates.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Template>, StoreError> {
        Ok(self.inner.read().await.templates.values().cloned().collect())
    }

    async fn update_body(&self, id: TemplateId, body: String) -> Result<(), StoreError> {
        self.inner.write().await.update_body(id, body)
    }
}

/// Template store persisted as a pretty-printed JSON file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: RwLock<Snapshot>,
}

impl FileStore {
    /// Open the store at `path`; a missing file is an empty store
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let snapshot = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Snapshot::default(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            "Opened template store {} ({} templates)",
            path.display(),
            snapshot.templates.len()
        );

        Ok(Self {
            path,
            inner: RwLock::new(snapshot),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the snapshot to a temp file and rename it over the store file
    async fn persist(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl TemplateStore for FileStore {
    async fn create(&self, template: NewTemplate) -> Result<TemplateId, StoreError> {
        let mut guard = self.inner.write().await;
        let id = guard.insert(template);
        if let Err(e) = self.persist(&guard).await {
            guard.templates.remove(&id);
            return Err(e);
        }
        tracing::debug!("Stored template {} in {}", id, self.path.display());
        Ok(id)
    }

    async fn find(&self, id: TemplateId) -> Result<Option<Template>, StoreError> {
        Ok(self.inner.read().await.templates.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Template>, StoreError> {
        Ok(self.inner.read().await.templates.values().cloned().collect())
    }

    async fn update_body(&self, id: TemplateId, body: String) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        let previous = guard
            .templates
            .get(&id)
            .map(|t| t.body.clone())
            .ok_or(StoreError::NotFound(id))?;
        guard.update_body(id, body)?;
        if let Err(e) = self.persist(&guard).await {
            guard.update_body(id, previous)?;
            return Err(e);
        }
        Ok(())
    }
}
