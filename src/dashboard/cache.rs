use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::stats::AggregateStatistics;

/// Last accepted statistics per requester profile, written through to a JSON
/// file so a restarted process can still answer when the store is down.
pub struct StatsCache {
    path: Option<PathBuf>,
    entries: RwLock<BTreeMap<i64, AggregateStatistics>>,
}

impl StatsCache {
    pub fn in_memory() -> Self {
        StatsCache {
            path: None,
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Load `path` if it exists. An unreadable or malformed file starts an
    /// empty cache and is overwritten on the next write.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<i64, AggregateStatistics>>(&raw) {
                Ok(entries) => {
                    log::info!("Loaded {} cached statistics from {}", entries.len(), path.display());
                    entries
                }
                Err(e) => {
                    log::warn!("Ignoring malformed stats cache {}: {e}", path.display());
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                log::warn!("Could not read stats cache {}: {e}", path.display());
                BTreeMap::new()
            }
        };
        StatsCache {
            path: Some(path),
            entries: RwLock::new(entries),
        }
    }

    pub async fn get(&self, profile_id: i64) -> Option<AggregateStatistics> {
        self.entries.read().await.get(&profile_id).cloned()
    }

    pub async fn put(&self, profile_id: i64, stats: &AggregateStatistics) -> Result<(), AppError> {
        let mut entries = self.entries.write().await;
        entries.insert(profile_id, stats.clone());
        if let Some(path) = &self.path {
            persist(path, &entries).await?;
        }
        Ok(())
    }
}

/// The write lock is held by the caller, so writers never interleave on the
/// tmp file.
async fn persist(path: &Path, entries: &BTreeMap<i64, AggregateStatistics>) -> Result<(), AppError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await?;
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, serde_json::to_vec_pretty(entries)?).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
