//! List sources for the browse screen.
//!
//! The screen shows one list at a time, backed by either a directory on
//! this machine or the sync service's savegame collection. Both are
//! modeled as one sum type with a uniform `list_entries` capability, so
//! the rest of the code never cares which side it is looking at.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

use crate::savegame::{self, SavegameRef};
use crate::search::{self, Traversal};
use crate::service::{RemoteSavegame, ServiceClient};

/// How a local source collects its entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalScan {
    /// Immediate children of the directory (a picked folder)
    Listing,
    /// Recursive walk from the directory
    Walk,
    /// The system `find` utility
    Find,
}

/// What backs the visible list
pub enum SavegameSource {
    Local { root: PathBuf, scan: LocalScan },
    Remote { client: ServiceClient },
}

/// Discriminant of a source, for display and state checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Local,
    Remote,
}

impl SavegameSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Local { .. } => SourceKind::Local,
            Self::Remote { .. } => SourceKind::Remote,
        }
    }

    /// Collect the source's entries.
    pub async fn list_entries(&self) -> Result<Vec<SavegameEntry>> {
        match self {
            Self::Local { root, scan } => {
                let found = match scan {
                    LocalScan::Listing => search::search(root, Traversal::DirectoryListing)?,
                    LocalScan::Walk => search::search(root, Traversal::Recursive)?,
                    LocalScan::Find => search::search_with_find(root).await?,
                };
                Ok(found.into_iter().map(SavegameEntry::Local).collect())
            }
            Self::Remote { client } => {
                let saves = client.list_savegames().await?;
                Ok(saves.into_iter().map(SavegameEntry::Remote).collect())
            }
        }
    }
}

/// One row of the visible list
#[derive(Debug, Clone)]
pub enum SavegameEntry {
    Local(SavegameRef),
    Remote(RemoteSavegame),
}

impl SavegameEntry {
    pub fn name(&self) -> String {
        match self {
            Self::Local(save) => save.name(),
            Self::Remote(save) => save.name.clone(),
        }
    }

    /// Slot number encoded in the filename, 1 through 8
    pub fn slot(&self) -> Option<usize> {
        savegame::slot_number(&self.name())
    }

    pub fn size(&self) -> Option<u64> {
        match self {
            Self::Local(save) => std::fs::metadata(&save.path).ok().map(|m| m.len()),
            Self::Remote(save) => Some(save.size),
        }
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Local(save) => std::fs::metadata(&save.path)
                .and_then(|m| m.modified())
                .ok()
                .map(DateTime::<Utc>::from),
            Self::Remote(save) => save.modified,
        }
    }

    pub fn local(&self) -> Option<&SavegameRef> {
        match self {
            Self::Local(save) => Some(save),
            Self::Remote(_) => None,
        }
    }

    pub fn remote(&self) -> Option<&RemoteSavegame> {
        match self {
            Self::Local(_) => None,
            Self::Remote(save) => Some(save),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ServiceEndpoint;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_source_lists_recognized_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("GTASAsf1.b"), b"one").unwrap();
        fs::write(root.join("GTASAsf4.b"), b"four").unwrap();
        fs::write(root.join("junk.bin"), b"junk").unwrap();

        let source = SavegameSource::Local {
            root: root.to_path_buf(),
            scan: LocalScan::Listing,
        };
        assert_eq!(source.kind(), SourceKind::Local);

        let mut names: Vec<String> = source
            .list_entries()
            .await
            .unwrap()
            .iter()
            .map(|e| e.name())
            .collect();
        names.sort();
        assert_eq!(names, vec!["GTASAsf1.b", "GTASAsf4.b"]);
    }

    #[tokio::test]
    async fn test_local_walk_source_descends() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let nested = root.join("saves");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("GTASAsf7.b"), b"seven").unwrap();

        let source = SavegameSource::Local {
            root: root.to_path_buf(),
            scan: LocalScan::Walk,
        };
        let entries = source.list_entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name(), "GTASAsf7.b");
        assert_eq!(entries[0].slot(), Some(7));
    }

    #[test]
    fn test_remote_source_kind() {
        let endpoint =
            ServiceEndpoint::from_candidates(&["localhost".to_string()], 9000).unwrap();
        let source = SavegameSource::Remote {
            client: ServiceClient::new(endpoint).unwrap(),
        };
        assert_eq!(source.kind(), SourceKind::Remote);
    }

    #[test]
    fn test_entry_accessors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("GTASAsf3.b");
        fs::write(&path, b"12345").unwrap();

        let local = SavegameEntry::Local(SavegameRef::from_path(path));
        assert_eq!(local.name(), "GTASAsf3.b");
        assert_eq!(local.slot(), Some(3));
        assert_eq!(local.size(), Some(5));
        assert!(local.local().is_some());
        assert!(local.remote().is_none());

        let remote = SavegameEntry::Remote(RemoteSavegame {
            name: "GTASAsf8.b".to_string(),
            size: 202752,
            modified: None,
        });
        assert_eq!(remote.name(), "GTASAsf8.b");
        assert_eq!(remote.slot(), Some(8));
        assert_eq!(remote.size(), Some(202752));
        assert!(remote.local().is_none());
        assert!(remote.remote().is_some());
    }
}
