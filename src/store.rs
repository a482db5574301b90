use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::fs;
use tokio::sync::OnceCell;

use crate::error::StorageError;
use crate::logger;

/// A single topic record. `name` and `description` drive search; the
/// optional presentation fields pass through to the client untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: u64,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// The root aggregate loaded from the dataset file. Immutable after load;
/// handlers only ever see shared references.
#[derive(Debug, Serialize, Deserialize)]
pub struct Dataset {
    pub users: Vec<serde_json::Value>,
    pub topics: Vec<Topic>,
}

impl Dataset {
    /// Topics whose name or description contains `query`, case-insensitively.
    /// An empty query matches everything; original order is preserved.
    pub fn search(&self, query: &str) -> Vec<&Topic> {
        let needle = query.to_lowercase();
        self.topics
            .iter()
            .filter(|topic| {
                topic.name.to_lowercase().contains(&needle)
                    || topic.description.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

/// Read-through cache over the dataset file.
///
/// The snapshot is loaded at most once per process. Concurrent callers
/// during the loading window await the same in-flight read rather than
/// each issuing their own; a failed load leaves the cell empty so the
/// next caller retries.
pub struct DataStore {
    path: PathBuf,
    dataset: OnceCell<Dataset>,
    loads: AtomicUsize,
}

impl DataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            dataset: OnceCell::new(),
            loads: AtomicUsize::new(0),
        }
    }

    /// Returns the cached snapshot, loading it on first access.
    pub async fn dataset(&self) -> Result<&Dataset, StorageError> {
        self.dataset.get_or_try_init(|| self.load()).await
    }

    async fn load(&self) -> Result<Dataset, StorageError> {
        self.loads.fetch_add(1, Ordering::SeqCst);

        let raw = fs::read_to_string(&self.path)
            .await
            .map_err(|source| StorageError::Read {
                path: self.path.clone(),
                source,
            })?;

        let dataset: Dataset =
            serde_json::from_str(&raw).map_err(|source| StorageError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        logger::log_dataset_loaded(&self.path, dataset.users.len(), dataset.topics.len());
        Ok(dataset)
    }

    /// Number of storage reads attempted so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}
