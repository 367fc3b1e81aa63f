use super::cleanup::empty_directory;
use super::copy::copy_directory;
use super::data::{Outcome, SlotInfo, SyncOptions, SyncReport};
use super::index::SlotCatalog;
use super::{report_failure, skipped_note, BackupContext, StepFailure};
use crate::error::{CommitError, OperationError};
use crate::frontend::Frontend;
use crate::fs::Filesystem;
use crate::mount::{MountSession, SaveMounter, SAVE_ROOT};
use crate::save_paths::Title;

/// Restores the slot at menu cell `cell` over the title's live save data.
///
/// Cell 0 means nothing is selected and returns without doing anything.
/// The live save is emptied before the slot is copied in; a failure after
/// that point leaves it partially restored.
pub fn restore_backup<M: SaveMounter, U: Frontend>(
    ctx: &mut BackupContext<'_, M, U>,
    title: &Title,
    catalog: &SlotCatalog,
    cell: usize,
) -> Outcome {
    if cell == 0 {
        return Outcome::Cancelled;
    }
    let Some(slot) = catalog.slot(cell) else {
        return report_failure(
            ctx.frontend,
            StepFailure::new("Failed to restore save.", OperationError::SlotNotFound(cell)),
        );
    };
    if !ctx.frontend.confirm("Restore selected save?") {
        return Outcome::Cancelled;
    }

    let session = match MountSession::acquire(ctx.mounter, title.id, title.mount_user()) {
        Ok(session) => session,
        Err(e) => return report_failure(ctx.frontend, StepFailure::new("Failed to mount save.", e)),
    };

    match write_restore(ctx.fs, &ctx.options, ctx.frontend, session, slot) {
        Ok((report, session)) => {
            log::info!(
                "Restored {:?} into save data of {:016X} ({} files, {} bytes)",
                slot.path,
                title.id,
                report.files,
                report.bytes
            );
            let message = format!(
                "{}\nhas been restored successfully.{}",
                slot.name,
                skipped_note(&report)
            );
            ctx.frontend.report_info("Success!", &message);
            session.release();
            Outcome::Completed(report)
        }
        Err(failure) => report_failure(ctx.frontend, failure),
    }
}

/// Replaces the mounted save with the slot's contents and commits it.
///
/// On success the session is handed back so it stays mounted until the
/// result has been reported. Every failure releases it first.
fn write_restore<'m, M: SaveMounter, U: Frontend>(
    fs: &dyn Filesystem,
    options: &SyncOptions,
    progress: &mut U,
    session: MountSession<'m, M>,
    slot: &SlotInfo,
) -> Result<(SyncReport, MountSession<'m, M>), StepFailure> {
    let live_root = session.resolve(SAVE_ROOT);

    let mut leftovers = match empty_directory(fs, &live_root, options) {
        Ok(cleared) => cleared.failed,
        Err(e) => {
            session.release();
            return Err(StepFailure::new("Failed to delete save.", e));
        }
    };

    let mut report = match copy_directory(fs, &slot.path, &live_root, options, progress) {
        Ok(report) => report,
        Err(e) => {
            session.release();
            return Err(StepFailure::new("Failed to restore save.", e));
        }
    };

    if let Err(source) = fs.commit(&live_root) {
        session.release();
        return Err(StepFailure::new(
            "Failed to commit to save device.",
            CommitError {
                path: live_root,
                source,
            },
        ));
    }

    // Old save entries that could not be removed are mixed into the restored data.
    leftovers.append(&mut report.failed);
    report.failed = leftovers;
    Ok((report, session))
}
