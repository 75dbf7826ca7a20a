use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use anyhow::{Context, Result};
use calcfleet_protocol::Task;

/// Persistence contract for finished and in-flight tasks.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn save(&self, task: &Task) -> Result<()>;
    async fn get(&self, task_id: &str) -> Result<Option<Task>>;
    async fn delete(&self, task_id: &str) -> Result<()>;
}

/// Persists each task as `<log_dir>/<task_id>.json` for offline inspection.
pub struct FileTaskStore {
    root: PathBuf,
    lock: Mutex<()>,
}

impl FileTaskStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("failed to create task log root {}", root.display()))?;
        Ok(FileTaskStore {
            root,
            lock: Mutex::new(()),
        })
    }

    fn path_for(&self, task_id: &str) -> PathBuf {
        self.root.join(format!("{task_id}.json"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl TaskStore for FileTaskStore {
    async fn save(&self, task: &Task) -> Result<()> {
        let payload = serde_json::to_string(task).context("failed to serialize task")?;
        let path = self.path_for(&task.id);
        let _guard = self.lock.lock().await;
        tokio::fs::write(&path, payload)
            .await
            .with_context(|| format!("failed to write task file {}", path.display()))
    }

    async fn get(&self, task_id: &str) -> Result<Option<Task>> {
        let path = self.path_for(task_id);
        let _guard = self.lock.lock().await;
        if !path.exists() {
            return Ok(None);
        }
        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read task file {}", path.display()))?;
        let task = serde_json::from_str(&raw).context("failed to parse task file")?;
        Ok(Some(task))
    }

    async fn delete(&self, task_id: &str) -> Result<()> {
        let path = self.path_for(task_id);
        let _guard = self.lock.lock().await;
        if path.exists() {
            tokio::fs::remove_file(&path)
                .await
                .with_context(|| format!("failed to delete task file {}", path.display()))?;
        }
        Ok(())
    }
}

/// Keeps tasks in a map; used by tests and short-lived workers.
#[derive(Default)]
pub struct InMemoryTaskStore {
    tasks: Mutex<HashMap<String, Task>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn save(&self, task: &Task) -> Result<()> {
        self.tasks
            .lock()
            .await
            .insert(task.id.clone(), task.clone());
        Ok(())
    }

    async fn get(&self, task_id: &str) -> Result<Option<Task>> {
        Ok(self.tasks.lock().await.get(task_id).cloned())
    }

    async fn delete(&self, task_id: &str) -> Result<()> {
        self.tasks.lock().await.remove(task_id);
        Ok(())
    }
}
