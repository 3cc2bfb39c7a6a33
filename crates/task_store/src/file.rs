//! JSON file task store.
//!
//! The whole task set lives in one JSON document that is rewritten on every
//! mutation. Mutations are serialized by an in-process lock; there is no
//! locking between processes, so only one process may use a given file.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use entities::Task;
use serde::{Deserialize, Serialize};
use tokio::{fs, sync::Mutex};
use tracing::{debug, info, warn};

use crate::{config::DEFAULT_FILE_PATH, TaskStore, TaskStoreError, TaskStoreResult};

const BACKEND_NAME: &str = "File";

/// On-disk layout of the task file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct TaskDocument {
    /// Largest id ever assigned, kept so deleted ids are never handed out
    /// again.
    #[serde(default)]
    last_id: i64,
    #[serde(default)]
    tasks: Vec<Task>,
}

impl TaskDocument {
    fn high_water_mark(&self) -> i64 {
        let max_present = self.tasks.iter().map(|t| t.id).max().unwrap_or(0);
        self.last_id.max(max_present)
    }

    fn next_id(&mut self) -> TaskStoreResult<i64> {
        let next = self
            .high_water_mark()
            .checked_add(1)
            .ok_or(TaskStoreError::IdExhausted)?;
        self.last_id = next;
        Ok(next)
    }

    fn update(&mut self, id: i64, change: impl FnOnce(&mut Task)) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                change(task);
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: i64) -> bool {
        // Legacy documents carry no last_id; pin it before the max can vanish.
        self.last_id = self.high_water_mark();
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() < before
    }
}

/// Accepts both the current document and a bare array of tasks.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredDocument {
    Current(TaskDocument),
    Legacy(Vec<Task>),
}

impl From<StoredDocument> for TaskDocument {
    fn from(stored: StoredDocument) -> Self {
        match stored {
            StoredDocument::Current(doc) => doc,
            StoredDocument::Legacy(tasks) => Self { last_id: 0, tasks },
        }
    }
}

/// Task store backed by a single JSON file.
#[derive(Debug)]
pub struct FileTaskStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Default for FileTaskStore {
    fn default() -> Self {
        Self::new(DEFAULT_FILE_PATH)
    }
}

impl FileTaskStore {
    /// Creates a store for the given file path. Nothing is touched on disk
    /// until `initialize` or the first mutation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document. A missing file is empty; a malformed one is
    /// logged and treated as empty.
    async fn load(&self) -> TaskStoreResult<TaskDocument> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(TaskDocument::default()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<StoredDocument>(&content) {
            Ok(stored) => Ok(stored.into()),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Task file is malformed, treating it as empty"
                );
                Ok(TaskDocument::default())
            }
        }
    }

    /// Replaces the document by writing a sibling temp file and renaming it
    /// over the target, so readers never see a partial write.
    async fn save(&self, doc: &TaskDocument) -> TaskStoreResult<()> {
        let content = serde_json::to_string_pretty(doc)?;
        let temp_path = self.temp_path();
        fs::write(&temp_path, content).await?;
        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_FILE_PATH.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Runs a read-modify-write cycle under the lock. The document is only
    /// written back when `apply` reports a change.
    async fn mutate<F>(&self, apply: F) -> TaskStoreResult<bool>
    where
        F: FnOnce(&mut TaskDocument) -> bool + Send,
    {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await?;
        let changed = apply(&mut doc);
        if changed {
            self.save(&doc).await?;
        }
        Ok(changed)
    }
}

#[async_trait]
impl TaskStore for FileTaskStore {
    async fn initialize(&self) -> TaskStoreResult<()> {
        let _guard = self.lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        if !fs::try_exists(&self.path).await? {
            self.save(&TaskDocument::default()).await?;
        }

        info!(path = %self.path.display(), "Using file-based task storage");
        Ok(())
    }

    async fn close(&self) -> TaskStoreResult<()> {
        Ok(())
    }

    async fn add_task(
        &self,
        title: &str,
        priority: &str,
        due_date: Option<&str>,
    ) -> TaskStoreResult<Task> {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await?;
        let task = Task::new(doc.next_id()?, title, priority, due_date.map(String::from));
        doc.tasks.push(task.clone());
        self.save(&doc).await?;

        debug!(id = task.id, priority, "Added task");
        Ok(task)
    }

    async fn list_tasks(&self) -> TaskStoreResult<Vec<Task>> {
        let mut tasks = self.load().await?.tasks;
        tasks.sort_by_key(|t| t.id);
        Ok(tasks)
    }

    async fn get_task(&self, id: i64) -> TaskStoreResult<Option<Task>> {
        let doc = self.load().await?;
        Ok(doc.tasks.into_iter().find(|t| t.id == id))
    }

    async fn set_completed(&self, id: i64, completed: bool) -> TaskStoreResult<bool> {
        let updated = self
            .mutate(|doc| doc.update(id, |task| task.set_completed(completed)))
            .await?;

        debug!(id, completed, updated, "Set task completion");
        Ok(updated)
    }

    async fn delete_task(&self, id: i64) -> TaskStoreResult<bool> {
        let deleted = self
            .mutate(|doc| doc.remove(id))
            .await?;

        debug!(id, deleted, "Deleted task");
        Ok(deleted)
    }

    async fn set_priority(&self, id: i64, priority: &str) -> TaskStoreResult<bool> {
        let updated = self
            .mutate(|doc| doc.update(id, |task| task.priority = priority.to_string()))
            .await?;

        debug!(id, priority, updated, "Set task priority");
        Ok(updated)
    }

    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }
}
