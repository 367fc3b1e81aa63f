use super::cleanup::delete_recursively;
use super::copy::copy_directory;
use super::data::{BackupTarget, Outcome, SyncOptions, SyncReport};
use super::index::SlotCatalog;
use super::{report_failure, skipped_note, BackupContext, StepFailure};
use crate::error::{CommitError, CreateError, OperationError};
use crate::filename_utils;
use crate::frontend::Frontend;
use crate::fs::Filesystem;
use crate::mount::{MountSession, SaveMounter, SAVE_ROOT};
use crate::save_paths::Title;
use chrono::{DateTime, Local};

/// Which slot a backup goes to, as picked in the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupRequest {
    /// Menu cell: 0 creates a new slot, `n` overwrites slot `n`.
    pub cell: usize,
    /// Multi-select mode: no confirmation and no name entry.
    pub batch: bool,
}

/// Picks the folder the backup is written to.
///
/// Returns `Ok(None)` when the user cancels name entry.
pub(crate) fn resolve_target<U: Frontend>(
    frontend: &mut U,
    title: &Title,
    catalog: &SlotCatalog,
    request: &BackupRequest,
    now: DateTime<Local>,
) -> Result<Option<BackupTarget>, OperationError> {
    if request.cell != 0 {
        let slot = catalog
            .slot(request.cell)
            .ok_or(OperationError::SlotNotFound(request.cell))?;
        return Ok(Some(BackupTarget {
            name: slot.name.clone(),
            path: slot.path.clone(),
            existing: true,
        }));
    }

    let suggestion = filename_utils::suggested_slot_name(now, &title.user_name);
    let name = if request.batch {
        suggestion
    } else {
        match frontend.request_name(&suggestion) {
            Some(input) => filename_utils::remove_forbidden_characters(&input),
            None => return Ok(None),
        }
    };

    if name.trim().is_empty() {
        return Err(OperationError::InvalidSlotName(name));
    }

    Ok(Some(BackupTarget {
        path: catalog.slot_path(&name),
        name,
        existing: false,
    }))
}

/// Backs up the title's live save data into a new or existing slot.
///
/// On success the slot catalog is refreshed. A backup that fails part way
/// through has its partially written slot deleted.
pub fn perform_backup<M: SaveMounter, U: Frontend>(
    ctx: &mut BackupContext<'_, M, U>,
    title: &Title,
    catalog: &mut SlotCatalog,
    request: &BackupRequest,
) -> Outcome {
    if !request.batch && !ctx.frontend.confirm("Backup selected save?") {
        return Outcome::Cancelled;
    }

    let target = match resolve_target(ctx.frontend, title, catalog, request, Local::now()) {
        Ok(Some(target)) => target,
        Ok(None) => return Outcome::Cancelled,
        Err(e) => return report_failure(ctx.frontend, StepFailure::new("Failed to backup save.", e)),
    };

    let session = match MountSession::acquire(ctx.mounter, title.id, title.mount_user()) {
        Ok(session) => session,
        Err(e) => return report_failure(ctx.frontend, StepFailure::new("Failed to mount save.", e)),
    };

    match write_backup(ctx.fs, &ctx.options, ctx.frontend, session, &target, catalog) {
        Ok(report) => {
            log::info!(
                "Backup of {:016X} written to {:?} ({} files, {} bytes)",
                title.id,
                target.path,
                report.files,
                report.bytes
            );
            let message = format!("Progress correctly saved to disk.{}", skipped_note(&report));
            ctx.frontend.report_info("Success!", &message);
            Outcome::Completed(report)
        }
        Err(failure) => report_failure(ctx.frontend, failure),
    }
}

/// Replaces the target with a copy of the mounted save, releasing the session on every path.
fn write_backup<M: SaveMounter, U: Frontend>(
    fs: &dyn Filesystem,
    options: &SyncOptions,
    progress: &mut U,
    session: MountSession<'_, M>,
    target: &BackupTarget,
    catalog: &mut SlotCatalog,
) -> Result<SyncReport, StepFailure> {
    let live_root = session.resolve(SAVE_ROOT);

    let mut leftovers = Vec::new();
    if target.existing || fs.exists(&target.path) {
        match delete_recursively(fs, &target.path, options) {
            Ok(cleared) => leftovers = cleared.failed,
            Err(e) => {
                session.release();
                return Err(StepFailure::new(
                    "Failed to delete the existing backup\ndirectory recursively.",
                    e,
                ));
            }
        }
    }

    let created = catalog.ensure_root(fs).and_then(|()| {
        fs.create_dir(&target.path).map_err(|source| CreateError {
            path: target.path.clone(),
            source,
        })
    });
    if let Err(e) = created {
        session.release();
        return Err(StepFailure::new("Failed to create the backup directory.", e));
    }

    let mut report = match copy_directory(fs, &live_root, &target.path, options, progress) {
        Ok(report) => report,
        Err(e) => {
            session.release();
            discard_partial(fs, target, options);
            return Err(StepFailure::new("Failed to backup save.", e));
        }
    };

    if let Err(source) = fs.commit(&target.path) {
        session.release();
        discard_partial(fs, target, options);
        return Err(StepFailure::new(
            "Failed to commit the backup to storage.",
            CommitError {
                path: target.path.clone(),
                source,
            },
        ));
    }

    // Entries of the old slot that survived deletion now sit next to the copy.
    leftovers.append(&mut report.failed);
    report.failed = leftovers;

    if let Err(e) = catalog.refresh(fs) {
        log::warn!("Failed to refresh backup slots: {}", e);
    }

    session.release();
    Ok(report)
}

/// Removes a half-written backup slot.
fn discard_partial(fs: &dyn Filesystem, target: &BackupTarget, options: &SyncOptions) {
    match delete_recursively(fs, &target.path, options) {
        Ok(cleared) if cleared.is_clean() => {
            log::info!("Removed incomplete backup {:?}", target.path)
        }
        Ok(cleared) => log::warn!(
            "Incomplete backup {:?} only partly removed, {} entries left",
            target.path,
            cleared.failed.len()
        ),
        Err(e) => log::error!("Failed to remove incomplete backup {:?}: {}", target.path, e),
    }
}
