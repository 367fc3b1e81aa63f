use crate::error::MountError;
use crate::save_paths;
use std::path::{Path, PathBuf};

/// Logical root the mounted save filesystem is bound to.
pub const SAVE_ROOT: &str = "save:/";

/// The device primitive that mounts a title's save data.
pub trait SaveMounter {
    type Handle;

    /// Opens the save filesystem of `title_id`. `user_id` is `None` for system saves.
    fn mount(&mut self, title_id: u64, user_id: Option<u128>) -> Result<Self::Handle, MountError>;

    /// Binds an opened filesystem to `root` and returns the path it is reachable at.
    fn bind_to_root(&mut self, handle: Self::Handle, root: &str) -> Result<PathBuf, MountError>;

    /// Unbinds the logical root.
    fn unmount(&mut self);
}

/// An exclusive, scoped binding of one title's save data to [`SAVE_ROOT`].
pub struct MountSession<'m, M: SaveMounter> {
    mounter: &'m mut M,
    root: PathBuf,
    released: bool,
}

impl<'m, M: SaveMounter> MountSession<'m, M> {
    /// Mounts and binds the save filesystem.
    ///
    /// If mounting fails nothing needs releasing. If binding fails the
    /// partially acquired session is released before the error is returned.
    pub fn acquire(
        mounter: &'m mut M,
        title_id: u64,
        user_id: Option<u128>,
    ) -> Result<Self, MountError> {
        let handle = mounter.mount(title_id, user_id)?;
        let mut session = Self {
            mounter,
            root: PathBuf::new(),
            released: false,
        };
        match session.mounter.bind_to_root(handle, SAVE_ROOT) {
            Ok(root) => {
                log::info!(
                    "Mounted save data of {:016X} at {} ({:?})",
                    title_id,
                    SAVE_ROOT,
                    root
                );
                session.root = root;
                Ok(session)
            }
            Err(e) => {
                session.release();
                Err(e)
            }
        }
    }

    /// Host path the logical root is bound to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a path under [`SAVE_ROOT`] to the bound location.
    ///
    /// Paths without the save root prefix are returned unchanged.
    pub fn resolve(&self, logical: &str) -> PathBuf {
        match logical.strip_prefix(SAVE_ROOT) {
            Some(rest) => rest
                .split('/')
                .filter(|part| !part.is_empty())
                .fold(self.root.clone(), |path, part| path.join(part)),
            None => PathBuf::from(logical),
        }
    }

    /// Unmounts now instead of at drop.
    pub fn release(mut self) {
        self.unmount_once();
    }

    fn unmount_once(&mut self) {
        if !self.released {
            self.released = true;
            self.mounter.unmount();
            log::info!("Unmounted {}", SAVE_ROOT);
        }
    }
}

impl<M: SaveMounter> Drop for MountSession<'_, M> {
    fn drop(&mut self) {
        self.unmount_once();
    }
}

/// Mounter that serves save data from plain directories.
///
/// Saves live at `<save_root>/<title id>/<user id | system>`, see
/// [`save_paths::save_data_dir`].
#[derive(Debug)]
pub struct DirectoryMounter {
    save_root: PathBuf,
    bound: Option<PathBuf>,
}

impl DirectoryMounter {
    pub fn new(save_root: impl Into<PathBuf>) -> Self {
        Self {
            save_root: save_root.into(),
            bound: None,
        }
    }

    /// The directory currently bound to the save root, if any.
    pub fn bound(&self) -> Option<&Path> {
        self.bound.as_deref()
    }
}

impl SaveMounter for DirectoryMounter {
    type Handle = PathBuf;

    fn mount(&mut self, title_id: u64, user_id: Option<u128>) -> Result<PathBuf, MountError> {
        if self.bound.is_some() {
            return Err(MountError::AlreadyMounted(SAVE_ROOT.to_string()));
        }
        let dir = save_paths::save_data_dir(&self.save_root, title_id, user_id);
        if !dir.is_dir() {
            return Err(MountError::NotFound {
                title_id,
                owner: save_paths::owner_label(user_id),
            });
        }
        Ok(dir)
    }

    fn bind_to_root(&mut self, handle: PathBuf, root: &str) -> Result<PathBuf, MountError> {
        if !handle.is_dir() {
            return Err(MountError::BindFailed {
                root: root.to_string(),
                reason: format!("{:?} is no longer a directory", handle),
            });
        }
        self.bound = Some(handle.clone());
        Ok(handle)
    }

    fn unmount(&mut self) {
        self.bound = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CountingMounter;
    use std::fs;
    use tempfile::tempdir;

    /// Tests that dropping a session releases it exactly once.
    #[test]
    fn test_drop_releases_once() {
        let dir = tempdir().unwrap();
        let mut mounter = CountingMounter::new(dir.path());
        {
            let session = MountSession::acquire(&mut mounter, 1, Some(2)).unwrap();
            assert_eq!(session.root(), dir.path());
        }
        assert_eq!(mounter.mounts, 1);
        assert_eq!(mounter.releases, 1);
    }

    /// Tests that an explicit release is not repeated at drop.
    #[test]
    fn test_explicit_release_not_repeated() {
        let dir = tempdir().unwrap();
        let mut mounter = CountingMounter::new(dir.path());
        let session = MountSession::acquire(&mut mounter, 1, None).unwrap();
        session.release();
        assert_eq!(mounter.releases, 1);
    }

    /// Tests that a failed mount needs no release and a failed bind is released.
    #[test]
    fn test_partial_acquire() {
        let dir = tempdir().unwrap();

        let mut mounter = CountingMounter::new(dir.path());
        mounter.fail_mount = true;
        assert!(MountSession::acquire(&mut mounter, 1, Some(2)).is_err());
        assert_eq!(mounter.releases, 0);

        let mut mounter = CountingMounter::new(dir.path());
        mounter.fail_bind = true;
        assert!(MountSession::acquire(&mut mounter, 1, Some(2)).is_err());
        assert_eq!(mounter.mounts, 1);
        assert_eq!(mounter.releases, 1);
    }

    /// Tests that logical save paths map onto the bound directory.
    #[test]
    fn test_resolve() {
        let dir = tempdir().unwrap();
        let mut mounter = CountingMounter::new(dir.path());
        let session = MountSession::acquire(&mut mounter, 1, None).unwrap();

        assert_eq!(session.resolve("save:/"), dir.path());
        assert_eq!(
            session.resolve("save:/sub/b.dat"),
            dir.path().join("sub").join("b.dat")
        );
        assert_eq!(session.resolve("other/x"), PathBuf::from("other/x"));
    }

    /// Tests that the directory mounter finds user and system saves and refuses a second bind.
    #[test]
    fn test_directory_mounter() {
        let dir = tempdir().unwrap();
        let user_dir = save_paths::save_data_dir(dir.path(), 0x0100_0000_0000_1000, Some(7));
        let system_dir = save_paths::save_data_dir(dir.path(), 0x0100_0000_0000_1000, None);
        fs::create_dir_all(&user_dir).unwrap();
        fs::create_dir_all(&system_dir).unwrap();

        let mut mounter = DirectoryMounter::new(dir.path());
        let handle = mounter.mount(0x0100_0000_0000_1000, Some(7)).unwrap();
        assert_eq!(handle, user_dir);
        mounter.bind_to_root(handle, SAVE_ROOT).unwrap();
        assert_eq!(mounter.bound(), Some(user_dir.as_path()));

        assert!(matches!(
            mounter.mount(0x0100_0000_0000_1000, None),
            Err(MountError::AlreadyMounted(_))
        ));

        mounter.unmount();
        assert_eq!(
            mounter.mount(0x0100_0000_0000_1000, None).unwrap(),
            system_dir
        );
    }

    /// Tests that a title without save data fails to mount.
    #[test]
    fn test_directory_mounter_missing_save() {
        let dir = tempdir().unwrap();
        let mut mounter = DirectoryMounter::new(dir.path());
        assert!(matches!(
            mounter.mount(42, Some(1)),
            Err(MountError::NotFound { title_id: 42, .. })
        ));
    }
}
