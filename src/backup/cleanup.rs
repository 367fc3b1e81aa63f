use super::data::{DirEntry, SyncOptions, SyncReport};
use super::listing::Directory;
use crate::error::DeleteError;
use crate::fs::Filesystem;
use std::path::{Path, PathBuf};

/// Deletes everything under `path`, then `path` itself.
///
/// Only a failure to list `path` is returned as an error. Entries that cannot
/// be removed are recorded in the report and the walk carries on.
pub fn delete_recursively(
    fs: &dyn Filesystem,
    path: &Path,
    options: &SyncOptions,
) -> Result<SyncReport, DeleteError> {
    delete_tree(fs, path, options, false)
}

/// Deletes everything under `path` but keeps `path`.
///
/// Used on mount roots, which can be emptied but not removed.
pub fn empty_directory(
    fs: &dyn Filesystem,
    path: &Path,
    options: &SyncOptions,
) -> Result<SyncReport, DeleteError> {
    delete_tree(fs, path, options, true)
}

struct Frame {
    path: PathBuf,
    entries: Vec<DirEntry>,
    next: usize,
    depth: usize,
}

fn delete_tree(
    fs: &dyn Filesystem,
    path: &Path,
    options: &SyncOptions,
    keep_root: bool,
) -> Result<SyncReport, DeleteError> {
    let root = Directory::open(fs, path)?;
    let mut report = SyncReport::default();
    let mut stack = vec![Frame {
        path: path.to_path_buf(),
        entries: root.into_entries(),
        next: 0,
        depth: 0,
    }];

    loop {
        let Some(frame) = stack.last_mut() else {
            break;
        };

        let Some(entry) = frame.entries.get(frame.next).cloned() else {
            // All children handled; the directory should now be empty.
            let Some(done) = stack.pop() else {
                break;
            };
            if stack.is_empty() && keep_root {
                continue;
            }
            match fs.remove_dir(&done.path) {
                Ok(()) => report.directories += 1,
                Err(e) => {
                    log::warn!("Failed to remove directory {:?}: {}", done.path, e);
                    report.failed.push(done.path);
                }
            }
            continue;
        };
        frame.next += 1;

        let child = frame.path.join(&entry.name);
        let depth = frame.depth + 1;

        if !entry.is_dir {
            match fs.remove_file(&child) {
                Ok(()) => report.files += 1,
                Err(e) => {
                    log::warn!("Failed to remove file {:?}: {}", child, e);
                    report.failed.push(child);
                }
            }
            continue;
        }

        if depth > options.max_depth {
            return Err(DeleteError::DepthExceeded {
                path: child,
                limit: options.max_depth,
            });
        }

        match Directory::open(fs, &child) {
            Ok(listing) => stack.push(Frame {
                path: child,
                entries: listing.into_entries(),
                next: 0,
                depth,
            }),
            Err(e) => {
                log::warn!("Failed to list {:?} for deletion: {}", child, e);
                report.failed.push(child);
            }
        }
    }

    log::info!(
        "Deleted {:?}{}: {} files, {} directories, {} failed",
        path,
        if keep_root { " contents" } else { "" },
        report.files,
        report.directories,
        report.failed.len()
    );
    Ok(report)
}
