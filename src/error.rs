use std::io;
use std::path::PathBuf;

/// A directory could not be opened or enumerated.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("directory does not exist: {0:?}")]
    NotFound(PathBuf),

    #[error("not a directory: {0:?}")]
    NotADirectory(PathBuf),

    #[error("failed to enumerate {path:?}: {source}")]
    Rejected {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A save filesystem could not be mounted or bound to the logical root.
#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error("no save data for title {title_id:016X} ({owner})")]
    NotFound { title_id: u64, owner: String },

    #[error("a save filesystem is already mounted at {0}")]
    AlreadyMounted(String),

    #[error("failed to bind save filesystem to {root}: {reason}")]
    BindFailed { root: String, reason: String },

    #[error("mount rejected: {0}")]
    Rejected(String),
}

/// A destination directory could not be created.
#[derive(Debug, thiserror::Error)]
#[error("failed to create directory {path:?}: {source}")]
pub struct CreateError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// A storage device could not be flushed.
#[derive(Debug, thiserror::Error)]
#[error("failed to commit {path:?}: {source}")]
pub struct CommitError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Walk-level failures of a recursive copy.
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    #[error(transparent)]
    Listing(#[from] ListingError),

    #[error(transparent)]
    Create(#[from] CreateError),

    #[error("directory tree deeper than {limit} levels at {path:?}")]
    DepthExceeded { path: PathBuf, limit: usize },
}

/// Walk-level failures of a recursive delete.
#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error(transparent)]
    Listing(#[from] ListingError),

    #[error("directory tree deeper than {limit} levels at {path:?}")]
    DepthExceeded { path: PathBuf, limit: usize },
}

/// Anything that aborts a backup or restore.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error(transparent)]
    Mount(#[from] MountError),

    #[error(transparent)]
    Listing(#[from] ListingError),

    #[error(transparent)]
    Create(#[from] CreateError),

    #[error(transparent)]
    Copy(#[from] CopyError),

    #[error(transparent)]
    Delete(#[from] DeleteError),

    #[error(transparent)]
    Commit(#[from] CommitError),

    #[error("no backup in slot {0}")]
    SlotNotFound(usize),

    #[error("backup name {0:?} is empty after removing forbidden characters")]
    InvalidSlotName(String),
}

impl OperationError {
    /// Numeric code shown next to the message in error dialogs.
    pub fn code(&self) -> i32 {
        match self {
            OperationError::Mount(MountError::BindFailed { .. }) => -2,
            OperationError::Mount(_) => -1,
            OperationError::Listing(_) => -3,
            OperationError::Create(_) => -4,
            OperationError::Copy(CopyError::Listing(_)) => -3,
            OperationError::Copy(CopyError::Create(_)) => -4,
            OperationError::Copy(CopyError::DepthExceeded { .. }) => -5,
            OperationError::Delete(DeleteError::Listing(_)) => -3,
            OperationError::Delete(DeleteError::DepthExceeded { .. }) => -5,
            OperationError::Commit(_) => -6,
            OperationError::SlotNotFound(_) => -7,
            OperationError::InvalidSlotName(_) => -8,
        }
    }
}
