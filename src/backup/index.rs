use super::data::SlotInfo;
use super::listing::list_slots;
use crate::error::{CreateError, ListingError};
use crate::fs::Filesystem;
use crate::save_paths::Title;
use std::path::{Path, PathBuf};

/// The backup slots of one title, in the order the menu shows them.
///
/// Menu cell 0 is the "New..." entry, so slot `n` sits at cell `n`.
#[derive(Debug, Clone)]
pub struct SlotCatalog {
    pub root: PathBuf,
    pub slots: Vec<SlotInfo>,
}

impl SlotCatalog {
    /// Loads the slots stored under the title's backup directory.
    pub fn load(fs: &dyn Filesystem, title: &Title, backup_root: &Path) -> Result<Self, ListingError> {
        let root = title.backup_dir(backup_root);
        let slots = list_slots(fs, &root)?;
        Ok(Self { root, slots })
    }

    /// Re-reads the slot list after slots were added or replaced.
    pub fn refresh(&mut self, fs: &dyn Filesystem) -> Result<(), ListingError> {
        self.slots = list_slots(fs, &self.root)?;
        log::debug!("{} backup slot(s) in {:?}", self.slots.len(), self.root);
        Ok(())
    }

    /// The slot shown at menu cell `cell`. Cell 0 never names a slot.
    pub fn slot(&self, cell: usize) -> Option<&SlotInfo> {
        cell.checked_sub(1).and_then(|i| self.slots.get(i))
    }

    /// Path a new slot called `name` would be written to.
    pub fn slot_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Creates the title's backup directory if it is missing.
    pub fn ensure_root(&self, fs: &dyn Filesystem) -> Result<(), CreateError> {
        if fs.is_dir(&self.root) {
            return Ok(());
        }
        fs.create_dir_all(&self.root).map_err(|source| CreateError {
            path: self.root.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::StdFilesystem;
    use std::fs;
    use tempfile::tempdir;

    fn title() -> Title {
        Title {
            id: 0x10,
            user_id: 1,
            name: "Game".to_string(),
            user_name: "Alice".to_string(),
            system_save: false,
        }
    }

    /// Tests that cells are one-based with cell 0 reserved.
    #[test]
    fn test_slot_cells() {
        let dir = tempdir().unwrap();
        let root = title().backup_dir(dir.path());
        fs::create_dir_all(root.join("first")).unwrap();
        fs::create_dir_all(root.join("second")).unwrap();

        let catalog = SlotCatalog::load(&StdFilesystem, &title(), dir.path()).unwrap();
        assert!(catalog.slot(0).is_none());
        assert_eq!(catalog.slot(1).unwrap().name, "first");
        assert_eq!(catalog.slot(2).unwrap().name, "second");
        assert!(catalog.slot(3).is_none());
    }

    /// Tests that refresh picks up new slots and ensure_root creates the directory.
    #[test]
    fn test_refresh_and_ensure_root() {
        let dir = tempdir().unwrap();
        let mut catalog = SlotCatalog::load(&StdFilesystem, &title(), dir.path()).unwrap();
        assert!(catalog.slots.is_empty());

        catalog.ensure_root(&StdFilesystem).unwrap();
        assert!(catalog.root.is_dir());

        fs::create_dir(catalog.slot_path("new slot")).unwrap();
        catalog.refresh(&StdFilesystem).unwrap();
        assert_eq!(catalog.slots.len(), 1);
        assert_eq!(catalog.slots[0].path, catalog.root.join("new slot"));
    }
}
