//! Browse screen state and its transition function.
//!
//! All mutable screen state (view mode, list entries, picker bookkeeping)
//! lives in `BrowseState`. User actions and task deliveries are fed
//! through `transition`, which returns the next state plus the side
//! effects the app must execute. The function itself touches nothing
//! outside its arguments, so every ordering of actions can be tested
//! directly.
//!
//! Listings are guarded by a generation counter: starting any listing
//! bumps it, and a `ListingFinished` delivery whose tag does not match
//! the current generation is discarded unchanged. A scan that was
//! superseded by a toggle or a newer scan can therefore never overwrite
//! the list.

use std::path::PathBuf;

use crate::config::SearchMethod;
use crate::docuri;
use crate::source::{LocalScan, SavegameEntry, SourceKind};

/// Which side of the toggle the screen shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Local,
    Remote,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Local => Self::Remote,
            Self::Remote => Self::Local,
        }
    }

    /// Lowercase label for the title bar
    pub fn label(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }

    /// The source kind a listing in this mode is backed by
    pub fn source_kind(&self) -> SourceKind {
        match self {
            Self::Local => SourceKind::Local,
            Self::Remote => SourceKind::Remote,
        }
    }
}

/// Which picker a result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
    File,
    Directory,
}

/// Snapshot of the settings the transition function needs
#[derive(Debug, Clone)]
pub struct BrowseSettings {
    pub search_method: SearchMethod,
    pub scan_root: Option<PathBuf>,
}

/// Browse screen state
#[derive(Debug, Clone)]
pub struct BrowseState {
    /// Current side of the local/remote toggle
    pub mode: ViewMode,
    /// Entries of the visible list
    pub entries: Vec<SavegameEntry>,
    /// Tag of the newest listing; deliveries with older tags are stale
    pub generation: u64,
    /// Whether a listing is in flight for the current generation
    pub loading: bool,
    /// The document reference the user last picked
    pub last_picked: Option<String>,
    /// Whether the picker hint was already shown this session
    pub hint_shown: bool,
    /// Whether the picker hint dialog is on screen right now
    pub hint_open: bool,
    /// Error from the last failed listing
    pub error: Option<String>,
}

impl BrowseState {
    pub fn new() -> Self {
        Self {
            mode: ViewMode::Local,
            entries: Vec::new(),
            generation: 0,
            loading: false,
            last_picked: None,
            hint_shown: false,
            hint_open: false,
            error: None,
        }
    }

    /// The "no results" placeholder is visible when the list is empty and
    /// nothing is on the way
    pub fn show_placeholder(&self) -> bool {
        self.entries.is_empty() && !self.loading
    }
}

impl Default for BrowseState {
    fn default() -> Self {
        Self::new()
    }
}

/// User actions and task deliveries the browse screen reacts to
#[derive(Debug)]
pub enum BrowseAction {
    /// Flip between local and remote view
    ToggleViewMode,
    /// Re-run the current mode's listing
    Refresh,
    /// User dismissed the picker hint dialog
    HintAcknowledged,
    /// A picker returned a document reference
    Picked { kind: PickerKind, reference: String },
    /// A listing task delivered its result
    ListingFinished {
        generation: u64,
        outcome: Result<Vec<SavegameEntry>, String>,
    },
}

/// What a listing task should collect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingTarget {
    Local {
        root: Option<PathBuf>,
        scan: LocalScan,
    },
    Remote,
}

/// Side effects for the app to execute after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseEffect {
    /// Spawn a listing task tagged with `generation`
    StartListing {
        generation: u64,
        target: ListingTarget,
    },
    /// Open the native picker
    OpenPicker(PickerKind),
    /// Update the status message
    StatusMessage(String),
}

/// Advance the browse state by one action.
///
/// Returns the next state and the effects to execute. Never blocks, never
/// touches the filesystem or network.
pub fn transition(
    state: &BrowseState,
    settings: &BrowseSettings,
    action: BrowseAction,
) -> (BrowseState, Vec<BrowseEffect>) {
    match action {
        BrowseAction::ToggleViewMode => {
            let mut next = state.clone();
            next.mode = next.mode.toggled();
            next.entries.clear();
            next.error = None;
            begin_listing(next, settings)
        }
        BrowseAction::Refresh => begin_listing(state.clone(), settings),
        BrowseAction::HintAcknowledged => {
            let mut next = state.clone();
            next.hint_open = false;
            let effects = picker_for(settings.search_method)
                .map(BrowseEffect::OpenPicker)
                .into_iter()
                .collect();
            (next, effects)
        }
        BrowseAction::Picked { kind, reference } => picked(state, kind, reference),
        BrowseAction::ListingFinished {
            generation,
            outcome,
        } => listing_finished(state, generation, outcome),
    }
}

fn picker_for(method: SearchMethod) -> Option<PickerKind> {
    match method {
        SearchMethod::PickFile => Some(PickerKind::File),
        SearchMethod::PickDirectory => Some(PickerKind::Directory),
        SearchMethod::ScanFind | SearchMethod::ScanWalk => None,
    }
}

/// Kick off whatever the current mode and settings call for.
fn begin_listing(
    mut next: BrowseState,
    settings: &BrowseSettings,
) -> (BrowseState, Vec<BrowseEffect>) {
    match next.mode {
        ViewMode::Remote => {
            next.generation += 1;
            next.loading = true;
            next.error = None;
            let effects = vec![BrowseEffect::StartListing {
                generation: next.generation,
                target: ListingTarget::Remote,
            }];
            (next, effects)
        }
        ViewMode::Local => match settings.search_method {
            SearchMethod::ScanWalk | SearchMethod::ScanFind => {
                next.generation += 1;
                next.loading = true;
                next.error = None;
                let scan = match settings.search_method {
                    SearchMethod::ScanFind => LocalScan::Find,
                    _ => LocalScan::Walk,
                };
                let effects = vec![BrowseEffect::StartListing {
                    generation: next.generation,
                    target: ListingTarget::Local {
                        root: settings.scan_root.clone(),
                        scan,
                    },
                }];
                (next, effects)
            }
            SearchMethod::PickFile | SearchMethod::PickDirectory => {
                if !next.hint_shown {
                    // First picker use this session gets an explanation;
                    // the picker opens once the user acknowledges it
                    next.hint_shown = true;
                    next.hint_open = true;
                    (next, Vec::new())
                } else if let Some(reference) = next.last_picked.clone() {
                    // A remembered pick is re-resolved instead of
                    // prompting again
                    let kind = match settings.search_method {
                        SearchMethod::PickDirectory => PickerKind::Directory,
                        _ => PickerKind::File,
                    };
                    picked(&next, kind, reference)
                } else {
                    let effects = picker_for(settings.search_method)
                        .map(BrowseEffect::OpenPicker)
                        .into_iter()
                        .collect();
                    (next, effects)
                }
            }
        },
    }
}

fn picked(
    state: &BrowseState,
    kind: PickerKind,
    reference: String,
) -> (BrowseState, Vec<BrowseEffect>) {
    let mut next = state.clone();
    next.last_picked = Some(reference.clone());

    match kind {
        PickerKind::File => match docuri::resolve_savegame(&reference) {
            Some(save) => {
                let already_listed = next
                    .entries
                    .iter()
                    .any(|e| e.local().map(|l| l.path == save.path).unwrap_or(false));
                if already_listed {
                    let message = format!("{} is already listed", save.name());
                    return (next, vec![BrowseEffect::StatusMessage(message)]);
                }
                let message = format!("Found {}", save.name());
                next.entries.push(SavegameEntry::Local(save));
                (next, vec![BrowseEffect::StatusMessage(message)])
            }
            None => {
                let message = format!("Not a recognized savegame: {}", reference);
                (next, vec![BrowseEffect::StatusMessage(message)])
            }
        },
        PickerKind::Directory => match docuri::resolve_to_path(&reference) {
            Some(dir) => {
                next.generation += 1;
                next.loading = true;
                next.error = None;
                let effects = vec![BrowseEffect::StartListing {
                    generation: next.generation,
                    target: ListingTarget::Local {
                        root: Some(dir),
                        scan: LocalScan::Listing,
                    },
                }];
                (next, effects)
            }
            None => {
                let message = format!("Could not resolve folder: {}", reference);
                (next, vec![BrowseEffect::StatusMessage(message)])
            }
        },
    }
}

fn listing_finished(
    state: &BrowseState,
    generation: u64,
    outcome: Result<Vec<SavegameEntry>, String>,
) -> (BrowseState, Vec<BrowseEffect>) {
    if generation != state.generation {
        // Superseded while in flight; the delivery must not touch the list
        return (state.clone(), Vec::new());
    }

    let mut next = state.clone();
    next.loading = false;
    match outcome {
        Ok(entries) => {
            let message = match entries.len() {
                0 => "No savegames found".to_string(),
                1 => "Found 1 savegame".to_string(),
                n => format!("Found {} savegames", n),
            };
            // A finished listing replaces the list instead of appending,
            // so repeated searches cannot pile up duplicates
            next.entries = entries;
            (next, vec![BrowseEffect::StatusMessage(message)])
        }
        Err(message) => {
            next.error = Some(message.clone());
            let effects = vec![BrowseEffect::StatusMessage(format!("Error: {}", message))];
            (next, effects)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::savegame::SavegameRef;

    fn scan_settings() -> BrowseSettings {
        BrowseSettings {
            search_method: SearchMethod::ScanWalk,
            scan_root: Some(PathBuf::from("/saves")),
        }
    }

    fn picker_settings() -> BrowseSettings {
        BrowseSettings {
            search_method: SearchMethod::PickFile,
            scan_root: None,
        }
    }

    fn local_entry(path: &str) -> SavegameEntry {
        SavegameEntry::Local(SavegameRef::from_path(PathBuf::from(path)))
    }

    fn entry_names(state: &BrowseState) -> Vec<String> {
        state.entries.iter().map(|e| e.name()).collect()
    }

    #[test]
    fn test_toggle_twice_returns_to_original_mode() {
        let settings = scan_settings();
        let start = BrowseState::new();
        assert_eq!(start.mode, ViewMode::Local);

        let (after_one, effects_one) =
            transition(&start, &settings, BrowseAction::ToggleViewMode);
        assert_eq!(after_one.mode, ViewMode::Remote);
        assert_eq!(after_one.mode.source_kind(), SourceKind::Remote);
        assert!(effects_one.iter().any(|e| matches!(
            e,
            BrowseEffect::StartListing {
                target: ListingTarget::Remote,
                ..
            }
        )));

        let (after_two, effects_two) =
            transition(&after_one, &settings, BrowseAction::ToggleViewMode);
        assert_eq!(after_two.mode, start.mode);
        assert_eq!(after_two.mode.source_kind(), start.mode.source_kind());
        assert!(effects_two.iter().any(|e| matches!(
            e,
            BrowseEffect::StartListing {
                target: ListingTarget::Local { .. },
                ..
            }
        )));
    }

    #[test]
    fn test_refresh_starts_configured_scan() {
        let settings = scan_settings();
        let (next, effects) = transition(&BrowseState::new(), &settings, BrowseAction::Refresh);

        assert!(next.loading);
        assert_eq!(next.generation, 1);
        assert_eq!(
            effects,
            vec![BrowseEffect::StartListing {
                generation: 1,
                target: ListingTarget::Local {
                    root: Some(PathBuf::from("/saves")),
                    scan: LocalScan::Walk,
                },
            }]
        );
    }

    #[test]
    fn test_find_strategy_selected() {
        let settings = BrowseSettings {
            search_method: SearchMethod::ScanFind,
            scan_root: Some(PathBuf::from("/saves")),
        };
        let (_, effects) = transition(&BrowseState::new(), &settings, BrowseAction::Refresh);

        assert_eq!(
            effects,
            vec![BrowseEffect::StartListing {
                generation: 1,
                target: ListingTarget::Local {
                    root: Some(PathBuf::from("/saves")),
                    scan: LocalScan::Find,
                },
            }]
        );
    }

    #[test]
    fn test_stale_delivery_leaves_state_unchanged() {
        let settings = scan_settings();
        let mut state = BrowseState::new();
        state.generation = 5;
        state.loading = true;
        state.entries.push(local_entry("/saves/GTASAsf1.b"));

        let (next, effects) = transition(
            &state,
            &settings,
            BrowseAction::ListingFinished {
                generation: 4,
                outcome: Ok(vec![
                    local_entry("/old/GTASAsf2.b"),
                    local_entry("/old/GTASAsf3.b"),
                ]),
            },
        );

        assert!(effects.is_empty());
        assert!(next.loading);
        assert_eq!(entry_names(&next), vec!["GTASAsf1.b"]);
    }

    #[test]
    fn test_current_delivery_replaces_entries() {
        let settings = scan_settings();
        let mut state = BrowseState::new();
        state.generation = 5;
        state.loading = true;
        state.entries.push(local_entry("/saves/GTASAsf1.b"));

        let (next, effects) = transition(
            &state,
            &settings,
            BrowseAction::ListingFinished {
                generation: 5,
                outcome: Ok(vec![
                    local_entry("/saves/GTASAsf1.b"),
                    local_entry("/saves/GTASAsf2.b"),
                ]),
            },
        );

        assert!(!next.loading);
        assert_eq!(entry_names(&next), vec!["GTASAsf1.b", "GTASAsf2.b"]);
        assert!(effects.contains(&BrowseEffect::StatusMessage(
            "Found 2 savegames".to_string()
        )));
    }

    #[test]
    fn test_superseded_refresh_applies_newest_only() {
        let settings = scan_settings();
        let state = BrowseState::new();

        let (state, _) = transition(&state, &settings, BrowseAction::Refresh);
        let first_generation = state.generation;
        let (state, _) = transition(&state, &settings, BrowseAction::Refresh);
        let second_generation = state.generation;
        assert!(second_generation > first_generation);

        // The superseded scan lands first and is ignored
        let (state, _) = transition(
            &state,
            &settings,
            BrowseAction::ListingFinished {
                generation: first_generation,
                outcome: Ok(vec![local_entry("/stale/GTASAsf8.b")]),
            },
        );
        assert!(state.entries.is_empty());
        assert!(state.loading);

        let (state, _) = transition(
            &state,
            &settings,
            BrowseAction::ListingFinished {
                generation: second_generation,
                outcome: Ok(vec![local_entry("/saves/GTASAsf1.b")]),
            },
        );
        assert_eq!(entry_names(&state), vec!["GTASAsf1.b"]);
        assert!(!state.loading);
    }

    #[test]
    fn test_failed_listing_sets_error() {
        let settings = scan_settings();
        let mut state = BrowseState::new();
        state.generation = 1;
        state.loading = true;

        let (next, effects) = transition(
            &state,
            &settings,
            BrowseAction::ListingFinished {
                generation: 1,
                outcome: Err("connection refused".to_string()),
            },
        );

        assert!(!next.loading);
        assert_eq!(next.error.as_deref(), Some("connection refused"));
        assert!(effects.contains(&BrowseEffect::StatusMessage(
            "Error: connection refused".to_string()
        )));
    }

    #[test]
    fn test_picker_hint_shown_once() {
        let settings = picker_settings();
        let state = BrowseState::new();

        // First refresh shows the hint instead of the picker
        let (state, effects) = transition(&state, &settings, BrowseAction::Refresh);
        assert!(state.hint_open);
        assert!(state.hint_shown);
        assert!(effects.is_empty());

        // Acknowledging it opens the picker
        let (state, effects) = transition(&state, &settings, BrowseAction::HintAcknowledged);
        assert!(!state.hint_open);
        assert_eq!(effects, vec![BrowseEffect::OpenPicker(PickerKind::File)]);

        // Later refreshes skip straight to the picker
        let (state, effects) = transition(&state, &settings, BrowseAction::Refresh);
        assert!(!state.hint_open);
        assert_eq!(effects, vec![BrowseEffect::OpenPicker(PickerKind::File)]);
    }

    #[test]
    fn test_picked_file_appended_and_remembered() {
        let settings = picker_settings();
        let reference = "content://com.android.externalstorage.documents/document/primary%3AGTASAsf3.b";

        let (state, _) = transition(
            &BrowseState::new(),
            &settings,
            BrowseAction::Picked {
                kind: PickerKind::File,
                reference: reference.to_string(),
            },
        );

        assert_eq!(entry_names(&state), vec!["GTASAsf3.b"]);
        assert_eq!(state.last_picked.as_deref(), Some(reference));
        let save = state.entries[0].local().unwrap();
        assert_eq!(save.path, PathBuf::from("/storage/emulated/0/GTASAsf3.b"));
    }

    #[test]
    fn test_repicking_same_file_does_not_duplicate() {
        let settings = picker_settings();
        let reference = "content://com.android.externalstorage.documents/document/primary%3AGTASAsf3.b";

        let pick = || BrowseAction::Picked {
            kind: PickerKind::File,
            reference: reference.to_string(),
        };
        let (state, _) = transition(&BrowseState::new(), &settings, pick());
        let (state, effects) = transition(&state, &settings, pick());

        assert_eq!(state.entries.len(), 1);
        assert!(effects.contains(&BrowseEffect::StatusMessage(
            "GTASAsf3.b is already listed".to_string()
        )));
    }

    #[test]
    fn test_picked_file_outside_allow_list_rejected() {
        let settings = picker_settings();
        let (state, effects) = transition(
            &BrowseState::new(),
            &settings,
            BrowseAction::Picked {
                kind: PickerKind::File,
                reference: "file:///tmp/notes.txt".to_string(),
            },
        );

        assert!(state.entries.is_empty());
        assert!(matches!(
            effects.as_slice(),
            [BrowseEffect::StatusMessage(m)] if m.starts_with("Not a recognized savegame")
        ));
    }

    #[test]
    fn test_picked_directory_starts_listing() {
        let settings = BrowseSettings {
            search_method: SearchMethod::PickDirectory,
            scan_root: None,
        };
        let reference =
            "content://com.android.externalstorage.documents/tree/primary%3AGTASAUF";

        let (state, effects) = transition(
            &BrowseState::new(),
            &settings,
            BrowseAction::Picked {
                kind: PickerKind::Directory,
                reference: reference.to_string(),
            },
        );

        assert!(state.loading);
        assert_eq!(state.last_picked.as_deref(), Some(reference));
        assert_eq!(
            effects,
            vec![BrowseEffect::StartListing {
                generation: 1,
                target: ListingTarget::Local {
                    root: Some(PathBuf::from("/storage/emulated/0/GTASAUF")),
                    scan: LocalScan::Listing,
                },
            }]
        );
    }

    #[test]
    fn test_refresh_reresolves_remembered_file_pick() {
        let settings = picker_settings();
        let reference = "file:///saves/GTASAsf5.b";

        let (state, _) = transition(
            &BrowseState::new(),
            &settings,
            BrowseAction::Picked {
                kind: PickerKind::File,
                reference: reference.to_string(),
            },
        );
        let mut state = state;
        state.hint_shown = true;

        let (next, effects) = transition(&state, &settings, BrowseAction::Refresh);

        // The cached reference is resolved again; no picker opens and the
        // entry is not duplicated
        assert!(!effects.iter().any(|e| matches!(e, BrowseEffect::OpenPicker(_))));
        assert_eq!(next.entries.len(), 1);
        assert!(effects.contains(&BrowseEffect::StatusMessage(
            "GTASAsf5.b is already listed".to_string()
        )));
    }

    #[test]
    fn test_refresh_reresolves_remembered_directory_pick() {
        let settings = BrowseSettings {
            search_method: SearchMethod::PickDirectory,
            scan_root: None,
        };
        let mut state = BrowseState::new();
        state.hint_shown = true;
        state.last_picked =
            Some("content://com.android.externalstorage.documents/tree/primary%3AGTASAUF".to_string());

        let (next, effects) = transition(&state, &settings, BrowseAction::Refresh);

        assert!(next.loading);
        assert_eq!(
            effects,
            vec![BrowseEffect::StartListing {
                generation: 1,
                target: ListingTarget::Local {
                    root: Some(PathBuf::from("/storage/emulated/0/GTASAUF")),
                    scan: LocalScan::Listing,
                },
            }]
        );
    }

    #[test]
    fn test_toggle_clears_entries_and_error() {
        let settings = scan_settings();
        let mut state = BrowseState::new();
        state.entries.push(local_entry("/saves/GTASAsf1.b"));
        state.error = Some("old error".to_string());

        let (next, _) = transition(&state, &settings, BrowseAction::ToggleViewMode);
        assert!(next.entries.is_empty());
        assert!(next.error.is_none());
    }

    #[test]
    fn test_placeholder_visibility() {
        let mut state = BrowseState::new();
        assert!(state.show_placeholder());

        state.loading = true;
        assert!(!state.show_placeholder());

        state.loading = false;
        state.entries.push(local_entry("/saves/GTASAsf1.b"));
        assert!(!state.show_placeholder());
    }
}
