use crate::backup::data::{CopyProgress, DirEntry};
use crate::error::MountError;
use crate::frontend::{Frontend, ProgressObserver};
use crate::fs::{Filesystem, StdFilesystem};
use crate::mount::SaveMounter;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::SystemTime;

/// Real filesystem with injectable failures, counting every mutation.
#[derive(Default)]
pub struct FaultyFs {
    inner: StdFilesystem,
    fail_create_dir: Option<String>,
    fail_open: Option<String>,
    fail_remove: Option<String>,
    fail_commit: bool,
    pub mutations: Cell<usize>,
}

impl FaultyFs {
    pub fn fail_create_dir(mut self, name: &str) -> Self {
        self.fail_create_dir = Some(name.to_string());
        self
    }

    pub fn fail_open(mut self, name: &str) -> Self {
        self.fail_open = Some(name.to_string());
        self
    }

    pub fn fail_remove(mut self, name: &str) -> Self {
        self.fail_remove = Some(name.to_string());
        self
    }

    pub fn fail_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    fn matches(rule: &Option<String>, path: &Path) -> bool {
        match (rule, path.file_name()) {
            (Some(name), Some(file_name)) => file_name.to_string_lossy() == name.as_str(),
            _ => false,
        }
    }

    fn injected() -> io::Error {
        io::Error::new(io::ErrorKind::PermissionDenied, "injected failure")
    }

    fn mutate(&self) {
        self.mutations.set(self.mutations.get() + 1);
    }
}

impl Filesystem for FaultyFs {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        self.inner.read_dir(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        self.inner.modified(path)
    }

    fn open_read(&self, path: &Path) -> io::Result<(Box<dyn Read>, u64)> {
        if Self::matches(&self.fail_open, path) {
            return Err(Self::injected());
        }
        self.inner.open_read(path)
    }

    fn create_file(&self, path: &Path) -> io::Result<Box<dyn Write>> {
        self.mutate();
        self.inner.create_file(path)
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        self.mutate();
        if Self::matches(&self.fail_create_dir, path) {
            return Err(Self::injected());
        }
        self.inner.create_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.mutate();
        self.inner.create_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.mutate();
        if Self::matches(&self.fail_remove, path) {
            return Err(Self::injected());
        }
        self.inner.remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        self.mutate();
        self.inner.remove_dir(path)
    }

    fn commit(&self, root: &Path) -> io::Result<()> {
        if self.fail_commit {
            return Err(Self::injected());
        }
        self.inner.commit(root)
    }
}

/// Ordered record of events shared between several doubles.
pub type Journal = Rc<RefCell<Vec<&'static str>>>;

fn note(journal: &Option<Journal>, event: &'static str) {
    if let Some(journal) = journal {
        journal.borrow_mut().push(event);
    }
}

/// Mounter that binds every title to one directory and counts calls.
pub struct CountingMounter {
    root: PathBuf,
    pub fail_mount: bool,
    pub fail_bind: bool,
    pub mounts: usize,
    pub releases: usize,
    pub users: Vec<Option<u128>>,
    pub journal: Option<Journal>,
}

impl CountingMounter {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            fail_mount: false,
            fail_bind: false,
            mounts: 0,
            releases: 0,
            users: Vec::new(),
            journal: None,
        }
    }
}

impl SaveMounter for CountingMounter {
    type Handle = ();

    fn mount(&mut self, _title_id: u64, user_id: Option<u128>) -> Result<(), MountError> {
        self.users.push(user_id);
        if self.fail_mount {
            return Err(MountError::Rejected("injected failure".to_string()));
        }
        self.mounts += 1;
        Ok(())
    }

    fn bind_to_root(&mut self, _handle: (), root: &str) -> Result<PathBuf, MountError> {
        if self.fail_bind {
            return Err(MountError::BindFailed {
                root: root.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(self.root.clone())
    }

    fn unmount(&mut self) {
        self.releases += 1;
        note(&self.journal, "unmount");
    }
}

/// Front end answering from a script and recording everything shown.
#[derive(Default)]
pub struct ScriptedFrontend {
    pub confirmations: VecDeque<bool>,
    pub names: VecDeque<Option<String>>,
    pub prompts: Vec<String>,
    pub errors: Vec<(i32, String)>,
    pub infos: Vec<(String, String)>,
    pub progress: ProgressLog,
    pub journal: Option<Journal>,
}

impl ScriptedFrontend {
    /// Confirms everything and enters `name` when asked for one.
    pub fn accepting(name: Option<&str>) -> Self {
        Self {
            confirmations: VecDeque::from(vec![true; 4]),
            names: VecDeque::from(vec![name.map(str::to_string)]),
            ..Self::default()
        }
    }

    pub fn declining() -> Self {
        Self {
            confirmations: VecDeque::from(vec![false]),
            ..Self::default()
        }
    }
}

impl ProgressObserver for ScriptedFrontend {
    fn on_copy_progress(&mut self, progress: &CopyProgress<'_>) {
        self.progress.on_copy_progress(progress);
    }
}

impl Frontend for ScriptedFrontend {
    fn confirm(&mut self, prompt: &str) -> bool {
        self.prompts.push(prompt.to_string());
        self.confirmations.pop_front().unwrap_or(false)
    }

    fn report_error(&mut self, code: i32, message: &str) {
        self.errors.push((code, message.to_string()));
        note(&self.journal, "error");
    }

    fn report_info(&mut self, title: &str, message: &str) {
        self.infos.push((title.to_string(), message.to_string()));
        note(&self.journal, "info");
    }

    fn request_name(&mut self, _suggestion: &str) -> Option<String> {
        self.names.pop_front().flatten()
    }
}

/// Records progress updates as (file name, copied, total).
#[derive(Default)]
pub struct ProgressLog {
    pub updates: Vec<(String, u64, u64)>,
}

impl ProgressObserver for ProgressLog {
    fn on_copy_progress(&mut self, progress: &CopyProgress<'_>) {
        self.updates
            .push((progress.file_name.to_string(), progress.copied, progress.total));
    }
}

/// Relative paths under `root` with their directory flag, sorted.
pub fn tree_shape(root: &Path) -> Vec<(String, bool)> {
    let mut shape = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            let relative = path
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            let is_dir = path.is_dir();
            if is_dir {
                pending.push(path);
            }
            shape.push((relative, is_dir));
        }
    }
    shape.sort();
    shape
}
