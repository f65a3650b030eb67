//! Savegame identification for GTA: San Andreas.
//!
//! The game writes exactly eight save slots with fixed filenames
//! (`GTASAsf1.b` through `GTASAsf8.b`). Everything in this crate that
//! decides "is this file a savegame" goes through the allow-list here.

use anyhow::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// The eight recognized savegame filenames, in slot order.
pub const RECOGNIZED_NAMES: [&str; 8] = [
    "GTASAsf1.b",
    "GTASAsf2.b",
    "GTASAsf3.b",
    "GTASAsf4.b",
    "GTASAsf5.b",
    "GTASAsf6.b",
    "GTASAsf7.b",
    "GTASAsf8.b",
];

/// Check a filename against the allow-list. Exact match only.
pub fn is_recognized(name: &str) -> bool {
    RECOGNIZED_NAMES.contains(&name)
}

/// Slot number (1-8) for a recognized filename, `None` otherwise.
pub fn slot_number(name: &str) -> Option<usize> {
    RECOGNIZED_NAMES.iter().position(|n| *n == name).map(|i| i + 1)
}

/// A savegame found on the local machine: the reference it was discovered
/// through plus the resolved filesystem path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavegameRef {
    /// The reference the file was reached by. For scanned files this is a
    /// `file://` form of the path; for picked documents it is the original
    /// reference string.
    pub uri: String,
    /// Resolved filesystem path.
    pub path: PathBuf,
}

impl SavegameRef {
    /// Build a reference for a file found directly on the filesystem.
    pub fn from_path(path: PathBuf) -> Self {
        let uri = format!("file://{}", path.display());
        Self { uri, path }
    }

    /// The filename component, for display and allow-list checks.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Slot number (1-8) if the filename is a recognized save.
    pub fn slot(&self) -> Option<usize> {
        slot_number(&self.name())
    }
}

/// Detect the default GTA: San Andreas user-files directory for the
/// current platform.
///
/// Checked locations:
/// - **Windows**: `%USERPROFILE%\Documents\GTA San Andreas User Files`
/// - **Linux**: Wine prefixes (`~/.wine/drive_c/users/<user>/...`) and the
///   Steam Proton prefix for app id 12120
///
/// Returns the first existing directory, or `None`.
pub fn default_save_directory() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        detect_windows_save_directory()
    }

    #[cfg(target_os = "linux")]
    {
        detect_linux_save_directory()
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux")))]
    {
        None
    }
}

const USER_FILES_DIR: &str = "GTA San Andreas User Files";

#[cfg(target_os = "windows")]
fn detect_windows_save_directory() -> Option<PathBuf> {
    let userprofile = std::env::var("USERPROFILE").ok()?;
    let dir = PathBuf::from(userprofile)
        .join("Documents")
        .join(USER_FILES_DIR);

    if dir.is_dir() { Some(dir) } else { None }
}

#[cfg(target_os = "linux")]
fn detect_linux_save_directory() -> Option<PathBuf> {
    let home = std::env::var("HOME").ok()?;
    let home = PathBuf::from(home);
    let user = std::env::var("USER").unwrap_or_else(|_| "steamuser".to_string());

    // Plain Wine prefix; newer Wine uses "Documents", older "My Documents".
    for docs in ["Documents", "My Documents"] {
        let dir = home
            .join(".wine")
            .join("drive_c")
            .join("users")
            .join(&user)
            .join(docs)
            .join(USER_FILES_DIR);
        if dir.is_dir() {
            return Some(dir);
        }
    }

    // Steam Proton prefix (GTA: San Andreas app id 12120).
    let proton_suffix = "steamapps/compatdata/12120/pfx/drive_c/users/steamuser/Documents";
    for steam_root in [
        home.join(".local").join("share").join("Steam"),
        home.join(".steam").join("steam"),
    ] {
        let dir = steam_root.join(proton_suffix).join(USER_FILES_DIR);
        if dir.is_dir() {
            return Some(dir);
        }
    }

    None
}

/// SHA-256 of a file's contents as lowercase hex.
pub fn calculate_sha256(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let result = hasher.finalize();
    Ok(format!("{:x}", result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list_is_exact() {
        for name in RECOGNIZED_NAMES {
            assert!(is_recognized(name));
        }

        assert!(!is_recognized("GTASAsf9.b"));
        assert!(!is_recognized("GTASAsf1.B"));
        assert!(!is_recognized("gtasasf1.b"));
        assert!(!is_recognized("GTASAsf1.b.bak"));
        assert!(!is_recognized(""));
    }

    #[test]
    fn test_slot_numbers_follow_list_order() {
        assert_eq!(slot_number("GTASAsf1.b"), Some(1));
        assert_eq!(slot_number("GTASAsf8.b"), Some(8));
        assert_eq!(slot_number("notasave.b"), None);
    }

    #[test]
    fn test_ref_from_path() {
        let save = SavegameRef::from_path(PathBuf::from("/tmp/saves/GTASAsf3.b"));
        assert_eq!(save.name(), "GTASAsf3.b");
        assert_eq!(save.uri, "file:///tmp/saves/GTASAsf3.b");
        assert_eq!(save.slot(), Some(3));
    }

    #[test]
    fn test_calculate_sha256() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("GTASAsf1.b");
        std::fs::write(&file, b"hello world").unwrap();

        let hash = calculate_sha256(&file).unwrap();

        // SHA256 of "hello world" is known
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }
}
