use super::data::{DirEntry, SlotInfo};
use crate::error::ListingError;
use crate::fs::Filesystem;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Snapshot of the immediate children of one directory.
///
/// Entries keep the store's enumeration order. Construction never fails;
/// check [`Directory::good`] or use [`Directory::open`] to get a `Result`.
#[derive(Debug)]
pub struct Directory {
    path: PathBuf,
    entries: Vec<DirEntry>,
    error: Option<ListingError>,
}

impl Directory {
    /// Lists `path`, recording the failure instead of returning it.
    pub fn new(fs: &dyn Filesystem, path: &Path) -> Self {
        let (entries, error) = match list_entries(fs, path) {
            Ok(entries) => (entries, None),
            Err(e) => (Vec::new(), Some(e)),
        };
        Self {
            path: path.to_path_buf(),
            entries,
            error,
        }
    }

    /// Lists `path`, failing if it cannot be enumerated.
    pub fn open(fs: &dyn Filesystem, path: &Path) -> Result<Self, ListingError> {
        let mut dir = Self::new(fs, path);
        match dir.error.take() {
            Some(e) => Err(e),
            None => Ok(dir),
        }
    }

    /// True when the listing succeeded.
    pub fn good(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&ListingError> {
        self.error.as_ref()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name of the entry at `index`.
    pub fn entry(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|e| e.name.as_str())
    }

    /// Whether the entry at `index` is a directory. Out of range is `false`.
    pub fn folder(&self, index: usize) -> bool {
        self.entries.get(index).is_some_and(|e| e.is_dir)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DirEntry> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> Vec<DirEntry> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Directory {
    type Item = &'a DirEntry;
    type IntoIter = std::slice::Iter<'a, DirEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn list_entries(fs: &dyn Filesystem, path: &Path) -> Result<Vec<DirEntry>, ListingError> {
    if !fs.exists(path) {
        return Err(ListingError::NotFound(path.to_path_buf()));
    }
    if !fs.is_dir(path) {
        return Err(ListingError::NotADirectory(path.to_path_buf()));
    }
    fs.read_dir(path).map_err(|source| ListingError::Rejected {
        path: path.to_path_buf(),
        source,
    })
}

/// Lists the backup slots stored in a title's backup directory, sorted by name.
///
/// A missing backup directory simply has no slots.
pub fn list_slots(fs: &dyn Filesystem, title_dir: &Path) -> Result<Vec<SlotInfo>, ListingError> {
    if !fs.exists(title_dir) {
        return Ok(Vec::new());
    }

    let dir = Directory::open(fs, title_dir)?;
    let mut slots: Vec<SlotInfo> = dir
        .iter()
        .filter(|entry| entry.is_dir)
        .map(|entry| {
            let path = title_dir.join(&entry.name);
            let modified = fs
                .modified(&path)
                .ok()
                .map(|t| DateTime::<Local>::from(t).to_rfc3339());
            SlotInfo {
                name: entry.name.clone(),
                path,
                modified,
            }
        })
        .collect();

    slots.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(slots)
}
