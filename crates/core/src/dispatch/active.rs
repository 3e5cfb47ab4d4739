//! Guard against two transfers writing the same local file

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};

/// Local paths with a transfer in flight
#[derive(Debug, Clone, Default)]
pub struct ActiveTransfers {
    paths: Arc<Mutex<HashSet<PathBuf>>>,
}

impl ActiveTransfers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `path` until the returned guard is dropped
    pub fn claim(&self, path: &Path) -> Result<TransferClaim> {
        let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let mut paths = self.paths.lock().unwrap_or_else(|e| e.into_inner());

        if !paths.insert(key.clone()) {
            return Err(Error::conflict(format!(
                "another transfer is already writing {}",
                path.display()
            )));
        }

        Ok(TransferClaim {
            paths: Arc::clone(&self.paths),
            key,
        })
    }

    pub fn is_active(&self, path: &Path) -> bool {
        let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        self.paths
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&key)
    }
}

/// Releases its path when dropped
#[derive(Debug)]
pub struct TransferClaim {
    paths: Arc<Mutex<HashSet<PathBuf>>>,
    key: PathBuf,
}

impl Drop for TransferClaim {
    fn drop(&mut self) {
        self.paths
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}
