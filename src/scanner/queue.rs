//! Ordered, de-duplicated list of files awaiting a bulk scan.

use crate::core::error::{Error, Result};
use crate::core::types::UploadItem;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files selected for the next bulk scan, in selection order.
#[derive(Debug, Clone, Default)]
pub struct UploadQueue {
    items: Vec<UploadItem>,
}

impl UploadQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every item whose `(name, size)` is not already queued.
    ///
    /// Returns how many items were actually added.
    pub fn add<I>(&mut self, files: I) -> usize
    where
        I: IntoIterator<Item = UploadItem>,
    {
        let mut added = 0;
        for file in files {
            if self.items.iter().any(|queued| queued.same_identity(&file)) {
                log::debug!("Skipping duplicate selection {} ({} bytes)", file.name, file.size);
                continue;
            }
            self.items.push(file);
            added += 1;
        }
        added
    }

    /// Remove the item at `index`; later items shift down by one.
    pub fn remove(&mut self, index: usize) -> Result<UploadItem> {
        if index >= self.items.len() {
            return Err(Error::QueueIndex {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    /// Drop every queued item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Queued items in order.
    pub fn items(&self) -> &[UploadItem] {
        &self.items
    }

    /// Total bytes queued.
    pub fn total_bytes(&self) -> u64 {
        self.items.iter().map(|i| i.size).sum()
    }

    /// Copy of the current contents; a run iterates this, not the live queue.
    pub fn snapshot(&self) -> Vec<UploadItem> {
        self.items.clone()
    }

    /// Build a queue from filesystem paths.
    ///
    /// Directories are walked when `recursive` is set and skipped with a
    /// warning otherwise. A path that does not exist is an error.
    pub fn from_paths<P: AsRef<Path>>(paths: &[P], recursive: bool) -> Result<Self> {
        let mut queue = Self::new();
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                return Err(Error::PathNotFound(path.to_path_buf()));
            }

            if path.is_dir() {
                if !recursive {
                    log::warn!(
                        "Skipping directory {} (use --recursive to include it)",
                        path.display()
                    );
                    continue;
                }
                let files = collect_dir(path)?;
                queue.add(files);
            } else {
                let item = UploadItem::from_path(path).map_err(|e| Error::file_read(path, e))?;
                queue.add(std::iter::once(item));
            }
        }
        Ok(queue)
    }
}

fn collect_dir(root: &Path) -> Result<Vec<UploadItem>> {
    let mut items = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
            Error::FileRead {
                path,
                source: e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop")),
            }
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let path: PathBuf = entry.into_path();
        let item = UploadItem::from_path(&path).map_err(|e| Error::file_read(&path, e))?;
        items.push(item);
    }
    Ok(items)
}
