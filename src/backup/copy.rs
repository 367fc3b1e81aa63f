use super::data::{CopyProgress, DirEntry, SyncOptions, SyncReport, MAX_CHUNK_SIZE};
use super::listing::Directory;
use crate::error::{CopyError, CreateError};
use crate::frontend::ProgressObserver;
use crate::fs::Filesystem;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Streams `src` into a freshly created `dst` in `chunk_size` pieces.
///
/// The source is opened before the destination, so an unreadable source
/// leaves nothing behind. Returns the number of bytes written.
pub fn copy_file(
    fs: &dyn Filesystem,
    src: &Path,
    dst: &Path,
    chunk_size: usize,
    progress: &mut dyn ProgressObserver,
) -> io::Result<u64> {
    let (mut reader, total) = fs.open_read(src)?;
    let mut writer = fs.create_file(dst)?;

    let file_name = src
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let mut buf = vec![0u8; chunk_size.clamp(1, MAX_CHUNK_SIZE)];
    let mut copied = 0u64;

    loop {
        let read = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buf[..read])?;
        copied += read as u64;
        progress.on_copy_progress(&CopyProgress {
            file_name: &file_name,
            copied,
            total,
        });
    }

    writer.flush()?;
    Ok(copied)
}

struct Frame {
    src: PathBuf,
    dst: PathBuf,
    entries: Vec<DirEntry>,
    next: usize,
    depth: usize,
}

/// Copies the contents of `src` into the existing directory `dst`.
///
/// Subdirectories are created before their contents are copied. A directory
/// that cannot be created stops the whole copy; files that cannot be copied
/// and subdirectories that cannot be listed are recorded in the report and
/// skipped.
pub fn copy_directory(
    fs: &dyn Filesystem,
    src: &Path,
    dst: &Path,
    options: &SyncOptions,
    progress: &mut dyn ProgressObserver,
) -> Result<SyncReport, CopyError> {
    let root = Directory::open(fs, src)?;
    let mut report = SyncReport::default();
    let mut stack = vec![Frame {
        src: src.to_path_buf(),
        dst: dst.to_path_buf(),
        entries: root.into_entries(),
        next: 0,
        depth: 0,
    }];

    loop {
        let Some(frame) = stack.last_mut() else {
            break;
        };
        let Some(entry) = frame.entries.get(frame.next).cloned() else {
            stack.pop();
            continue;
        };
        frame.next += 1;

        let src_path = frame.src.join(&entry.name);
        let dst_path = frame.dst.join(&entry.name);
        let depth = frame.depth + 1;

        if !entry.is_dir {
            match copy_file(fs, &src_path, &dst_path, options.chunk_size, progress) {
                Ok(bytes) => {
                    report.files += 1;
                    report.bytes += bytes;
                }
                Err(e) => {
                    log::warn!("Skipping {:?}: {}", src_path, e);
                    report.failed.push(src_path);
                }
            }
            continue;
        }

        if depth > options.max_depth {
            return Err(CopyError::DepthExceeded {
                path: src_path,
                limit: options.max_depth,
            });
        }

        fs.create_dir(&dst_path).map_err(|source| CreateError {
            path: dst_path.clone(),
            source,
        })?;
        report.directories += 1;

        match Directory::open(fs, &src_path) {
            Ok(listing) => stack.push(Frame {
                src: src_path,
                dst: dst_path,
                entries: listing.into_entries(),
                next: 0,
                depth,
            }),
            Err(e) => {
                log::warn!("Skipping contents of {:?}: {}", src_path, e);
                report.failed.push(src_path);
            }
        }
    }

    log::debug!(
        "Copied {:?} to {:?}: {} files, {} bytes, {} directories, {} skipped",
        src,
        dst,
        report.files,
        report.bytes,
        report.directories,
        report.failed.len()
    );
    Ok(report)
}
