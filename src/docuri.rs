//! Document reference resolution.
//!
//! Saves can be reached through three kinds of reference: Android storage
//! framework URIs recorded by the companion phone app
//! (`content://<authority>/...`), `file://` URIs produced by the pickers,
//! and bare filesystem paths. All of them are resolved to a plain path
//! before the filename is checked against the allow-list.
//!
//! For the external-storage provider's primary volume the conventional
//! `/storage/emulated/0/<relative>` path is reconstructed from the document
//! id. Any other authority falls back to the reference's raw path
//! component, which may not correspond to an accessible location — callers
//! get an empty match out of that, not an error.

use percent_encoding::percent_decode_str;
use std::path::PathBuf;

use crate::savegame::{self, SavegameRef};

/// Authority of the Android external storage document provider.
pub const EXTERNAL_STORAGE_AUTHORITY: &str = "com.android.externalstorage.documents";

/// Conventional mount point of the primary external storage volume.
const EXTERNAL_STORAGE_ROOT: &str = "/storage/emulated/0";

/// A parsed document reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    raw: String,
    authority: Option<String>,
    path: Option<String>,
    document_id: Option<String>,
}

impl DocumentRef {
    /// Parse a reference string. Never fails; missing pieces come back as
    /// `None` from the accessors.
    pub fn parse(raw: &str) -> Self {
        if let Some(rest) = raw.strip_prefix("content://") {
            let (authority, path_part) = match rest.split_once('/') {
                Some((auth, path)) => (auth, Some(path)),
                None => (rest, None),
            };

            let segments: Vec<&str> = path_part
                .map(|p| p.split('/').collect())
                .unwrap_or_default();

            let path = path_part.map(|_| {
                let decoded: Vec<String> =
                    segments.iter().map(|s| decode_segment(s)).collect();
                format!("/{}", decoded.join("/"))
            });

            let document_id = document_id_from_segments(&segments);

            Self {
                raw: raw.to_string(),
                authority: Some(authority.to_string()),
                path,
                document_id,
            }
        } else if let Some(rest) = raw.strip_prefix("file://") {
            Self {
                raw: raw.to_string(),
                authority: None,
                path: Some(decode_segment(rest)),
                document_id: None,
            }
        } else {
            // Bare filesystem path; taken literally, no decoding.
            Self {
                raw: raw.to_string(),
                authority: None,
                path: if raw.is_empty() { None } else { Some(raw.to_string()) },
                document_id: None,
            }
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    /// Decoded path component, including the leading slash.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Decoded document id (the segment after `document/`, or the tree id
    /// for tree-only references).
    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }
}

fn decode_segment(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

/// Extract the document id from undecoded path segments.
///
/// `document/<id>` wins over the tree id so that
/// `tree/<tid>/document/<id>` resolves to the child document.
fn document_id_from_segments(segments: &[&str]) -> Option<String> {
    if let Some(pos) = segments.iter().position(|s| *s == "document") {
        return segments.get(pos + 1).map(|s| decode_segment(s));
    }
    if segments.first() == Some(&"tree") {
        return segments.get(1).map(|s| decode_segment(s));
    }
    None
}

/// Resolve an external-storage document id (`<volume>:<relative path>`) to
/// a conventional path. Only the primary volume is handled; everything
/// else returns `None` and the caller falls back to the raw path.
fn resolve_external_storage(doc_id: &str) -> Option<String> {
    let (volume, relative) = doc_id.split_once(':')?;
    if volume.eq_ignore_ascii_case("primary") {
        Some(format!("{}/{}", EXTERNAL_STORAGE_ROOT, relative))
    } else {
        None
    }
}

/// Resolve any reference to a filesystem path.
///
/// Returns `None` when the reference has no usable path component.
pub fn resolve_to_path(reference: &str) -> Option<PathBuf> {
    let doc = DocumentRef::parse(reference);

    if doc.authority() == Some(EXTERNAL_STORAGE_AUTHORITY) {
        if let Some(resolved) = doc.document_id().and_then(resolve_external_storage) {
            return Some(PathBuf::from(resolved));
        }
    }

    doc.path().map(PathBuf::from)
}

/// Resolve a reference to a savegame, applying the allow-list.
///
/// Returns `None` when the path component is absent or the filename is not
/// a recognized save.
pub fn resolve_savegame(reference: &str) -> Option<SavegameRef> {
    let path = resolve_to_path(reference)?;
    let name = path.file_name()?.to_string_lossy();

    if savegame::is_recognized(&name) {
        Some(SavegameRef {
            uri: reference.to_string(),
            path,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_volume_reconstructs_conventional_path() {
        let path = resolve_to_path(
            "content://com.android.externalstorage.documents/document/primary%3AGTASAsf3.b",
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/storage/emulated/0/GTASAsf3.b"));

        // Unencoded colon is accepted too
        let path = resolve_to_path(
            "content://com.android.externalstorage.documents/document/primary:GTASAsf3.b",
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/storage/emulated/0/GTASAsf3.b"));
    }

    #[test]
    fn test_primary_volume_is_case_insensitive() {
        let path = resolve_to_path(
            "content://com.android.externalstorage.documents/document/Primary%3AGTASAsf1.b",
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/storage/emulated/0/GTASAsf1.b"));
    }

    #[test]
    fn test_tree_reference_resolves_to_directory() {
        let path = resolve_to_path(
            "content://com.android.externalstorage.documents/tree/primary%3AGTASAUF",
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/storage/emulated/0/GTASAUF"));
    }

    #[test]
    fn test_unknown_authority_falls_back_to_raw_path() {
        let path =
            resolve_to_path("content://com.example.cloud/saves/GTASAsf2.b").unwrap();
        assert_eq!(path, PathBuf::from("/saves/GTASAsf2.b"));
    }

    #[test]
    fn test_non_primary_volume_falls_back_to_raw_path() {
        // Known authority but a volume we do not special-case: the raw
        // path component is used, inaccessible as it may be.
        let path = resolve_to_path(
            "content://com.android.externalstorage.documents/document/1A2B-3C4D%3AGTASAsf1.b",
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/document/1A2B-3C4D:GTASAsf1.b"));
    }

    #[test]
    fn test_file_uri_and_bare_path() {
        assert_eq!(
            resolve_to_path("file:///home/cj/saves/GTASAsf5.b").unwrap(),
            PathBuf::from("/home/cj/saves/GTASAsf5.b")
        );
        assert_eq!(
            resolve_to_path("/home/cj/saves/GTASAsf5.b").unwrap(),
            PathBuf::from("/home/cj/saves/GTASAsf5.b")
        );
    }

    #[test]
    fn test_missing_path_component_yields_nothing() {
        assert_eq!(resolve_to_path("content://com.example.cloud"), None);
        assert_eq!(resolve_to_path(""), None);
    }

    #[test]
    fn test_resolve_savegame_applies_allow_list() {
        let save = resolve_savegame(
            "content://com.android.externalstorage.documents/document/primary%3AGTASAsf3.b",
        )
        .unwrap();
        assert_eq!(save.path, PathBuf::from("/storage/emulated/0/GTASAsf3.b"));
        assert_eq!(save.name(), "GTASAsf3.b");
        assert_eq!(
            save.uri,
            "content://com.android.externalstorage.documents/document/primary%3AGTASAsf3.b"
        );

        // Valid reference, unrecognized filename: silently no match
        assert_eq!(
            resolve_savegame(
                "content://com.android.externalstorage.documents/document/primary%3Anotes.txt"
            ),
            None
        );
    }

    #[test]
    fn test_document_segment_wins_over_tree_id() {
        let doc = DocumentRef::parse(
            "content://com.android.externalstorage.documents/tree/primary%3AGTASAUF/document/primary%3AGTASAUF%2FGTASAsf1.b",
        );
        assert_eq!(doc.document_id(), Some("primary:GTASAUF/GTASAsf1.b"));

        let path = resolve_to_path(doc.raw()).unwrap();
        assert_eq!(
            path,
            PathBuf::from("/storage/emulated/0/GTASAUF/GTASAsf1.b")
        );
    }
}
