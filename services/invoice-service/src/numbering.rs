//! Invoice number counter backed by a single text file.
//!
//! The file holds the last issued number. Calls are serialized inside this
//! process only; two processes sharing the file can still race.

use dreamhaven_models::InvoiceNumber;
use dreamhaven_utils::{InvoiceError, InvoiceResult};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::info;

pub struct InvoiceCounter {
    path: PathBuf,
    starting_number: u32,
    lock: Mutex<()>,
}

impl InvoiceCounter {
    pub fn new(path: impl Into<PathBuf>, starting_number: u32) -> Self {
        Self {
            path: path.into(),
            starting_number,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Increment the stored number and return the new value.
    ///
    /// A missing file is seeded with the starting number first, so the first
    /// invoice is `starting_number + 1`.
    pub async fn next(&self) -> InvoiceResult<InvoiceNumber> {
        let _guard = self.lock.lock().await;

        if !tokio::fs::try_exists(&self.path).await? {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&self.path, self.starting_number.to_string()).await?;
            info!(path = %self.path.display(), start = self.starting_number, "Seeded invoice counter");
        }

        let current = self.read_current().await?;
        let next = current
            .checked_add(1)
            .ok_or_else(|| InvoiceError::storage("Invoice counter overflow"))?;
        tokio::fs::write(&self.path, next.to_string()).await?;

        Ok(InvoiceNumber(next))
    }

    /// Last issued number, or `None` before the first invoice.
    pub async fn peek(&self) -> InvoiceResult<Option<InvoiceNumber>> {
        let _guard = self.lock.lock().await;
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(None);
        }
        Ok(Some(InvoiceNumber(self.read_current().await?)))
    }

    async fn read_current(&self) -> InvoiceResult<u32> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        contents.trim().parse::<u32>().map_err(|e| {
            InvoiceError::storage(format!(
                "Counter file {} holds '{}': {}",
                self.path.display(),
                contents.trim(),
                e
            ))
        })
    }
}
