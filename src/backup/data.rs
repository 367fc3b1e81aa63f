use crate::error::OperationError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default size of the buffer used to stream file contents.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;
/// Largest copy buffer accepted from configuration.
pub const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;
/// Default limit on how many directory levels a walk may descend.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// One immediate child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Progress of the file currently being copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyProgress<'a> {
    /// The file name without its parent directories.
    pub file_name: &'a str,
    /// Bytes written to the destination so far.
    pub copied: u64,
    /// Size of the source file when it was opened.
    pub total: u64,
}

/// Tuning for copy and delete walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    pub chunk_size: usize,
    pub max_depth: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Summary of a copy or delete walk.
///
/// For copies the counters are files/bytes written and directories created;
/// for deletes they are files and directories removed. `failed` lists every
/// entry that was skipped because it could not be read, written or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub files: u64,
    pub bytes: u64,
    pub directories: u64,
    pub failed: Vec<PathBuf>,
}

impl SyncReport {
    /// True when no entry was skipped.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A backup slot found in a title's backup directory.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SlotInfo {
    /// The slot's folder name, shown in the slot list.
    pub name: String,
    /// The absolute path to the slot folder.
    pub path: PathBuf,
    /// The folder's modification timestamp (RFC 3339), when available.
    pub modified: Option<String>,
}

/// Where a backup is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupTarget {
    pub name: String,
    pub path: PathBuf,
    /// True when an existing slot is being overwritten.
    pub existing: bool,
}

/// How a backup or restore ended.
#[derive(Debug)]
pub enum Outcome {
    Completed(SyncReport),
    /// The user declined, cancelled name entry, or nothing was selected.
    Cancelled,
    Failed(OperationError),
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }
}
