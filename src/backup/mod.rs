pub mod cleanup;
pub mod copy;
pub mod create;
pub mod data;
pub mod index;
pub mod listing;
pub mod restore;


pub use cleanup::{delete_recursively, empty_directory};
pub use copy::{copy_directory, copy_file};
pub use create::{perform_backup, BackupRequest};
pub use data::{BackupTarget, CopyProgress, Outcome, SlotInfo, SyncOptions, SyncReport};
pub use index::SlotCatalog;
pub use listing::{list_slots, Directory};
pub use restore::restore_backup;

use crate::error::OperationError;
use crate::frontend::Frontend;
use crate::fs::Filesystem;
use crate::mount::SaveMounter;

/// Everything a backup or restore needs from the outside world.
pub struct BackupContext<'a, M: SaveMounter, U: Frontend> {
    pub fs: &'a dyn Filesystem,
    pub mounter: &'a mut M,
    pub frontend: &'a mut U,
    pub options: SyncOptions,
}

/// A step that aborted an operation, with the message shown to the user.
#[derive(Debug)]
pub(crate) struct StepFailure {
    pub(crate) message: &'static str,
    pub(crate) error: OperationError,
}

impl StepFailure {
    pub(crate) fn new(message: &'static str, error: impl Into<OperationError>) -> Self {
        Self {
            message,
            error: error.into(),
        }
    }
}

/// Reports a failed step and turns it into the operation's outcome.
pub(crate) fn report_failure<U: Frontend>(frontend: &mut U, failure: StepFailure) -> Outcome {
    log::error!("{} {}", failure.message.replace('\n', " "), failure.error);
    frontend.report_error(
        failure.error.code(),
        &format!("{}\n{}", failure.message, failure.error),
    );
    Outcome::Failed(failure.error)
}

/// Extra line for the success message when some entries were skipped.
pub(crate) fn skipped_note(report: &SyncReport) -> String {
    if report.is_clean() {
        return String::new();
    }
    for path in &report.failed {
        log::warn!("Skipped: {:?}", path);
    }
    format!("\n{} item(s) could not be copied or removed.", report.failed.len())
}
