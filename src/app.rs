use eframe::egui::{self, RichText};

use crate::config::Config;
use crate::service::ServiceClient;
use crate::source::{SavegameEntry, SavegameSource};
use crate::state::{
    transition, BrowseAction, BrowseEffect, BrowseSettings, BrowseState, ListingTarget,
    PickerKind, StateEvent, TransferState, ViewMode,
};
use crate::task::{poll_tagged, TaggedPoll, TaggedTask};
use crate::ui::{self, Theme};

type ListingHandle = TaggedTask<Result<Vec<SavegameEntry>, String>>;

/// Main application state
pub struct SasyncApp {
    /// Application configuration
    pub config: Config,
    /// Client for the sync service
    pub client: ServiceClient,
    /// Browse screen state
    pub browse: BrowseState,
    /// Upload/download state
    pub transfers: TransferState,
    /// Active theme colors
    pub theme: Theme,
    /// Re-apply the theme on the next frame
    pub theme_dirty: bool,
    /// Whether the settings window is open
    pub settings_open: bool,
    /// Status message for the status bar
    status_message: String,
    /// Async task for the newest local listing
    local_task: Option<ListingHandle>,
    /// Async task for the newest remote fetch
    remote_task: Option<ListingHandle>,
}

impl SasyncApp {
    /// Create a new application instance
    pub fn new(_cc: &eframe::CreationContext<'_>, config: Config, client: ServiceClient) -> Self {
        let theme = Theme::for_dark_mode(config.ui.dark_theme);

        let mut app = Self {
            config,
            client,
            browse: BrowseState::new(),
            transfers: TransferState::default(),
            theme,
            theme_dirty: true,
            settings_open: false,
            status_message: "Ready".to_string(),
            local_task: None,
            remote_task: None,
        };

        // Populate the local view right away
        app.dispatch(BrowseAction::Refresh);

        app
    }

    fn browse_settings(&self) -> BrowseSettings {
        BrowseSettings {
            search_method: self.config.browser.search_method,
            scan_root: self.config.scan_root(),
        }
    }

    /// Run one action through the transition function and execute the
    /// effects it returns
    pub fn dispatch(&mut self, action: BrowseAction) {
        let settings = self.browse_settings();
        let (next, effects) = transition(&self.browse, &settings, action);
        self.browse = next;
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: BrowseEffect) {
        match effect {
            BrowseEffect::StatusMessage(message) => self.status_message = message,
            BrowseEffect::OpenPicker(kind) => self.open_picker(kind),
            BrowseEffect::StartListing { generation, target } => {
                self.start_listing(generation, target)
            }
        }
    }

    /// Spawn the listing task for `target`, replacing any older task of
    /// the same kind. Superseded tasks keep running; their deliveries are
    /// discarded by the generation check in the transition.
    fn start_listing(&mut self, generation: u64, target: ListingTarget) {
        match target {
            ListingTarget::Local { root, scan } => {
                let handle = tokio::spawn(async move {
                    let Some(root) = root else {
                        tracing::warn!("No scan directory configured or detected");
                        return Ok(Vec::new());
                    };
                    let source = SavegameSource::Local { root, scan };
                    source.list_entries().await.map_err(|e| e.to_string())
                });
                self.local_task = Some(TaggedTask::new(generation, handle));
            }
            ListingTarget::Remote => {
                let client = self.client.clone();
                let handle = tokio::spawn(async move {
                    let source = SavegameSource::Remote { client };
                    source.list_entries().await.map_err(|e| e.to_string())
                });
                self.remote_task = Some(TaggedTask::new(generation, handle));
            }
        }
    }

    /// Open the native picker and feed its result back as an action
    fn open_picker(&mut self, kind: PickerKind) {
        let start_dir = self.config.scan_root();

        match kind {
            PickerKind::File => {
                let mut dialog = rfd::FileDialog::new().set_title("Select a savegame");
                if let Some(dir) = start_dir {
                    dialog = dialog.set_directory(dir);
                }
                if let Some(path) = dialog.pick_file() {
                    let reference = format!("file://{}", path.display());
                    self.dispatch(BrowseAction::Picked { kind, reference });
                }
            }
            PickerKind::Directory => {
                let mut dialog = rfd::FileDialog::new().set_title("Select your savegame folder");
                if let Some(dir) = start_dir {
                    dialog = dialog.set_directory(dir);
                }
                if let Some(path) = dialog.pick_folder() {
                    let reference = format!("file://{}", path.display());
                    self.dispatch(BrowseAction::Picked { kind, reference });
                }
            }
        }
    }

    fn poll_listing_slot(
        slot: &mut Option<ListingHandle>,
        ctx: &egui::Context,
    ) -> Option<(u64, Result<Vec<SavegameEntry>, String>)> {
        match poll_tagged(slot) {
            TaggedPoll::Complete { generation, result } => match result {
                Ok(outcome) => Some((generation, outcome)),
                Err(e) => {
                    tracing::error!("Listing task panicked: {}", e);
                    Some((generation, Err("Listing task failed".to_string())))
                }
            },
            TaggedPoll::Pending => {
                ctx.request_repaint();
                None
            }
            TaggedPoll::NoTask => None,
        }
    }

    /// Poll async tasks and feed finished ones back into the state
    fn poll_tasks(&mut self, ctx: &egui::Context) {
        if let Some((generation, outcome)) = Self::poll_listing_slot(&mut self.local_task, ctx) {
            self.dispatch(BrowseAction::ListingFinished {
                generation,
                outcome,
            });
        }
        if let Some((generation, outcome)) = Self::poll_listing_slot(&mut self.remote_task, ctx) {
            self.dispatch(BrowseAction::ListingFinished {
                generation,
                outcome,
            });
        }

        for event in self.transfers.poll(ctx) {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: StateEvent) {
        match event {
            StateEvent::StatusMessage(message) => self.status_message = message,
            StateEvent::LogError(message) => tracing::error!("{}", message),
            StateEvent::RefreshLocal => self.refresh_local_after_transfer(),
        }
    }

    /// A download changed the local directory; bring the list up to date.
    /// The transition re-resolves a remembered pick instead of reopening
    /// the picker.
    fn refresh_local_after_transfer(&mut self) {
        if self.browse.mode != ViewMode::Local {
            return;
        }
        self.dispatch(BrowseAction::Refresh);
    }

    /// Upload the list entry at `index` to the service
    pub fn upload_entry(&mut self, index: usize) {
        let Some(save) = self
            .browse
            .entries
            .get(index)
            .and_then(|e| e.local())
            .cloned()
        else {
            return;
        };

        let name = save.name();
        if let Some(event) = self.transfers.start_upload(&self.client, save.path, name) {
            self.handle_event(event);
        }
    }

    /// Download the remote entry at `index` into the download directory
    pub fn download_entry(&mut self, index: usize) {
        let Some(name) = self
            .browse
            .entries
            .get(index)
            .and_then(|e| e.remote())
            .map(|r| r.name.clone())
        else {
            return;
        };

        let dest = match self.config.download_dir() {
            Ok(dir) => dir,
            Err(e) => {
                self.status_message = format!("Error: {}", e);
                return;
            }
        };

        if let Some(event) = self.transfers.start_download(&self.client, name, dest) {
            self.handle_event(event);
        }
    }

    /// Show the entry's directory in the system file manager
    pub fn reveal_entry(&mut self, index: usize) {
        let Some(path) = self
            .browse
            .entries
            .get(index)
            .and_then(|e| e.local())
            .map(|l| l.path.clone())
        else {
            return;
        };

        let target = path.parent().map(|p| p.to_path_buf()).unwrap_or(path);
        if let Err(e) = open::that(&target) {
            self.status_message = format!("Could not open {}: {}", target.display(), e);
        }
    }

    /// Open directory picker and update the scan root
    pub fn browse_for_scan_root(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_title("Select Scan Directory")
            .pick_folder()
        {
            self.config.browser.scan_root = Some(path.to_string_lossy().to_string());
            self.save_config();
        }
    }

    /// Open directory picker and update the download directory
    pub fn browse_for_download_dir(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_title("Select Download Directory")
            .pick_folder()
        {
            self.config.browser.download_dir = Some(path.to_string_lossy().to_string());
            self.save_config();
        }
    }

    /// Save configuration to disk
    pub fn save_config(&self) {
        if let Err(e) = self.config.save() {
            tracing::error!("Failed to save config: {}", e);
        }
    }
}

impl eframe::App for SasyncApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.theme_dirty {
            self.theme.apply(ctx, self.config.ui.dark_theme);
            self.theme_dirty = false;
        }

        // Poll async tasks
        self.poll_tasks(ctx);

        let theme = self.theme.clone();

        // Title bar: endpoint plus current view, toggle on the right
        egui::TopBottomPanel::top("title_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                let title = format!("{} ({})", self.client.endpoint(), self.browse.mode.label());
                ui.label(
                    RichText::new(title)
                        .color(theme.text_primary)
                        .size(16.0)
                        .strong(),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Settings").clicked() {
                        self.settings_open = !self.settings_open;
                    }

                    let action_label = match self.browse.mode {
                        ViewMode::Local => "Search",
                        ViewMode::Remote => "Refresh",
                    };
                    if ui.button(action_label).clicked() {
                        self.dispatch(BrowseAction::Refresh);
                    }

                    let toggle_label = match self.browse.mode {
                        ViewMode::Local => "Remote view",
                        ViewMode::Remote => "Local view",
                    };
                    if ui.button(toggle_label).clicked() {
                        self.dispatch(BrowseAction::ToggleViewMode);
                    }
                });
            });
            ui.add_space(4.0);
        });

        // Status bar at bottom
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status_message);

                if let Some(active) = self.transfers.active.clone() {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(RichText::new(active).color(theme.text_muted));
                        ui.spinner();
                    });
                }
            });
        });

        // Savegame list
        egui::CentralPanel::default().show(ctx, |ui| {
            ui::render_browse(self, ui);
        });

        ui::render_hint_dialog(self, ctx);
        ui::render_settings_window(self, ctx);
    }
}
