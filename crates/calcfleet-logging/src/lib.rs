//! Task logging for calcfleet workers
//!
//! Every worker persists its finished tasks through a [`TaskStore`]. The
//! file-backed store writes one compact JSON document per task under a
//! per-worker log directory so runs can be inspected offline.

pub mod task_store;

pub use task_store::{FileTaskStore, InMemoryTaskStore, TaskStore};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Resolve (and create) a per-worker log directory under the log root.
pub fn worker_log_dir(log_root: &Path, worker: &str) -> Result<PathBuf> {
    let dir = log_root.join(worker);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    }
    Ok(dir)
}
