use crate::filename_utils;
use std::path::{Path, PathBuf};

/// Folder name used for saves that belong to no user account.
const SYSTEM_SAVE_DIR: &str = "system";

/// A title whose save data can be backed up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title {
    pub id: u64,
    /// The account that owns the save data.
    pub user_id: u128,
    pub name: String,
    /// The owning account's display name, used for suggested backup names.
    pub user_name: String,
    /// System saves are mounted without a user id.
    pub system_save: bool,
}

impl Title {
    /// The user id to mount with, or `None` for system saves.
    pub fn mount_user(&self) -> Option<u128> {
        if self.system_save {
            None
        } else {
            Some(self.user_id)
        }
    }

    /// Directory holding this title's backup slots.
    pub fn backup_dir(&self, backup_root: &Path) -> PathBuf {
        backup_root.join(filename_utils::title_folder_name(self.id, &self.name))
    }
}

/// Where the directory mounter finds a title's live save data.
pub fn save_data_dir(save_root: &Path, title_id: u64, user_id: Option<u128>) -> PathBuf {
    let owner = match user_id {
        Some(user) => format!("{:032X}", user),
        None => SYSTEM_SAVE_DIR.to_string(),
    };
    save_root.join(format!("{:016X}", title_id)).join(owner)
}

/// Human readable owner of a save, for messages.
pub fn owner_label(user_id: Option<u128>) -> String {
    match user_id {
        Some(user) => format!("user {:032X}", user),
        None => "system save".to_string(),
    }
}

/// Parses a hexadecimal title id, with or without a `0x` prefix.
pub fn parse_title_id(value: &str) -> Result<u64, String> {
    let digits = strip_hex_prefix(value);
    u64::from_str_radix(digits, 16).map_err(|e| format!("invalid title id {:?}: {}", value, e))
}

/// Parses a hexadecimal user id, with or without a `0x` prefix.
pub fn parse_user_id(value: &str) -> Result<u128, String> {
    let digits = strip_hex_prefix(value);
    u128::from_str_radix(digits, 16).map_err(|e| format!("invalid user id {:?}: {}", value, e))
}

fn strip_hex_prefix(value: &str) -> &str {
    let trimmed = value.trim();
    trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
}
