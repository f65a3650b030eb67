//! Browse list rendering

use eframe::egui::{self, RichText};

use crate::app::SasyncApp;
use crate::config::SearchMethod;
use crate::state::{BrowseAction, ViewMode};
use crate::util::{format_size, format_timestamp};

struct Row {
    name: String,
    slot: Option<usize>,
    size: Option<u64>,
    modified: String,
    location: String,
    is_local: bool,
}

enum RowAction {
    Upload,
    Download,
    Reveal,
}

/// Render the savegame list
pub fn render_browse(app: &mut SasyncApp, ui: &mut egui::Ui) {
    let theme = app.theme.clone();

    if let Some(error) = app.browse.error.clone() {
        ui.label(RichText::new(format!("Error: {}", error)).color(theme.error));
        ui.add_space(8.0);
    }

    if app.browse.loading {
        ui.horizontal(|ui| {
            ui.spinner();
            let text = match app.browse.mode {
                ViewMode::Local => "Searching for savegames...",
                ViewMode::Remote => "Fetching remote savegames...",
            };
            ui.label(RichText::new(text).color(theme.text_muted));
        });
        ui.add_space(8.0);
    }

    if app.browse.show_placeholder() {
        ui.add_space(48.0);
        ui.vertical_centered(|ui| {
            let text = match app.browse.mode {
                ViewMode::Local => "No savegames found",
                ViewMode::Remote => "No savegames on the service",
            };
            ui.label(RichText::new(text).color(theme.text_muted).size(16.0));

            if app.browse.mode == ViewMode::Local {
                let hint = match app.config.browser.search_method {
                    SearchMethod::PickFile => "Use Search to pick a savegame file",
                    SearchMethod::PickDirectory => "Use Search to pick your savegame folder",
                    _ => "Use Search to scan again, or change the scan root in Settings",
                };
                ui.add_space(4.0);
                ui.label(RichText::new(hint).color(theme.text_muted).size(11.0));
            }
        });
        return;
    }

    let endpoint = app.client.endpoint().to_string();
    let rows: Vec<Row> = app
        .browse
        .entries
        .iter()
        .map(|entry| Row {
            name: entry.name(),
            slot: entry.slot(),
            size: entry.size(),
            modified: format_timestamp(entry.modified()),
            location: match entry.local() {
                Some(save) => save.uri.clone(),
                None => format!("on {}", endpoint),
            },
            is_local: entry.local().is_some(),
        })
        .collect();
    let busy = app.transfers.busy();

    let mut clicked: Option<(usize, RowAction)> = None;

    egui::ScrollArea::vertical()
        .id_salt("browse_scroll")
        .show(ui, |ui| {
            for (i, row) in rows.iter().enumerate() {
                egui::Frame::none()
                    .fill(theme.bg_medium)
                    .rounding(6.0)
                    .inner_margin(12.0)
                    .stroke(egui::Stroke::new(1.0, theme.border))
                    .show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.horizontal(|ui| {
                            ui.vertical(|ui| {
                                ui.horizontal(|ui| {
                                    ui.label(
                                        RichText::new(&row.name)
                                            .color(theme.text_primary)
                                            .size(16.0)
                                            .strong(),
                                    );
                                    if let Some(slot) = row.slot {
                                        ui.label(
                                            RichText::new(format!("Slot {}", slot))
                                                .color(theme.accent)
                                                .size(11.0),
                                        );
                                    }
                                });

                                let size = row
                                    .size
                                    .map(format_size)
                                    .unwrap_or_else(|| "unknown size".to_string());
                                ui.label(
                                    RichText::new(format!("{}, modified {}", size, row.modified))
                                        .color(theme.text_muted)
                                        .size(11.0),
                                );
                                ui.label(
                                    RichText::new(&row.location)
                                        .color(theme.text_muted)
                                        .size(10.0),
                                );
                            });

                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    if row.is_local {
                                        if ui
                                            .add_enabled(!busy, egui::Button::new("Upload"))
                                            .clicked()
                                        {
                                            clicked = Some((i, RowAction::Upload));
                                        }
                                        if ui.button("Reveal").clicked() {
                                            clicked = Some((i, RowAction::Reveal));
                                        }
                                    } else if ui
                                        .add_enabled(!busy, egui::Button::new("Download"))
                                        .clicked()
                                    {
                                        clicked = Some((i, RowAction::Download));
                                    }
                                },
                            );
                        });
                    });
                ui.add_space(8.0);
            }
        });

    match clicked {
        Some((i, RowAction::Upload)) => app.upload_entry(i),
        Some((i, RowAction::Download)) => app.download_entry(i),
        Some((i, RowAction::Reveal)) => app.reveal_entry(i),
        None => {}
    }
}

/// Render the one-time picker explanation dialog
pub fn render_hint_dialog(app: &mut SasyncApp, ctx: &egui::Context) {
    if !app.browse.hint_open {
        return;
    }

    let theme = app.theme.clone();
    let mut acknowledged = false;

    egui::Window::new("Select savegames")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            let text = match app.config.browser.search_method {
                SearchMethod::PickDirectory => {
                    "Pick the folder that holds your savegames. Its entries are \
                     filtered down to the recognized savegame names."
                }
                _ => {
                    "Pick a savegame file (GTASAsf1.b through GTASAsf8.b). \
                     Anything else is rejected."
                }
            };
            ui.label(RichText::new(text).color(theme.text_primary));
            ui.add_space(12.0);
            ui.vertical_centered(|ui| {
                if ui.button("OK").clicked() {
                    acknowledged = true;
                }
            });
        });

    if acknowledged {
        app.dispatch(BrowseAction::HintAcknowledged);
    }
}
