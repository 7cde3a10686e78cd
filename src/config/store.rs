// Provider list storage
//
// The gateway only ever reads a consistent snapshot per request; whoever edits
// the provider list goes through `set_config`.

use super::models::RoutingConfig;
use crate::error::{ProxyError, Result};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use tracing::info;

/// Source of routing snapshots.
pub trait ConfigStore: Send + Sync {
    /// Current snapshot; later `set_config` calls never mutate it.
    fn get_config(&self) -> RoutingConfig;

    /// Replace the routing data.
    fn set_config(&self, config: RoutingConfig) -> Result<()>;
}

/// `ConfigStore` backed by a pretty-printed JSON file.
pub struct FileConfigStore {
    path: Option<PathBuf>,
    current: RwLock<RoutingConfig>,
}

impl FileConfigStore {
    /// Load `path`, creating it with an empty provider list if missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let current = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                ProxyError::Config(format!("invalid provider file {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No provider file at {}, creating an empty one", path.display());
                let empty = RoutingConfig::default();
                write_file(&path, &empty)?;
                empty
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path: Some(path),
            current: RwLock::new(current),
        })
    }

    /// A store that never touches disk.
    pub fn in_memory(config: RoutingConfig) -> Self {
        Self {
            path: None,
            current: RwLock::new(config),
        }
    }
}

impl ConfigStore for FileConfigStore {
    fn get_config(&self) -> RoutingConfig {
        self.current.read().clone()
    }

    fn set_config(&self, config: RoutingConfig) -> Result<()> {
        // Hold the write lock across the file write so readers never see a
        // snapshot that failed to persist.
        let mut current = self.current.write();
        if let Some(path) = &self.path {
            write_file(path, &config)?;
        }
        *current = config;
        Ok(())
    }
}

fn write_file(path: &Path, config: &RoutingConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let data = serde_json::to_string_pretty(config)?;
    std::fs::write(path, data)?;
    Ok(())
}
