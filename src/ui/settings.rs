//! Settings window rendering

use eframe::egui::{self, RichText};

use crate::app::SasyncApp;
use crate::config::{Config, SearchMethod};
use crate::ui::theme::Theme;

/// Render the settings window
pub fn render_settings_window(app: &mut SasyncApp, ctx: &egui::Context) {
    if !app.settings_open {
        return;
    }

    let theme = app.theme.clone();
    let mut open = app.settings_open;

    egui::Window::new("Settings")
        .open(&mut open)
        .resizable(false)
        .default_width(420.0)
        .show(ctx, |ui| {
            ui.label(
                RichText::new("Search")
                    .color(theme.accent)
                    .size(13.0)
                    .strong(),
            );
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                ui.label(RichText::new("Method:").color(theme.text_muted));

                let current = app.config.browser.search_method;
                egui::ComboBox::from_id_salt("search_method_select")
                    .selected_text(current.as_str())
                    .show_ui(ui, |ui| {
                        for method in SearchMethod::ALL {
                            if ui
                                .selectable_label(current == method, method.as_str())
                                .clicked()
                            {
                                app.config.browser.search_method = method;
                                app.save_config();
                            }
                        }
                    });
            });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.label(RichText::new("Scan root:").color(theme.text_muted));
                let text = app
                    .config
                    .browser
                    .scan_root
                    .as_deref()
                    .unwrap_or("Auto-detect");
                ui.label(RichText::new(text).color(theme.text_primary));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Browse...").clicked() {
                        app.browse_for_scan_root();
                    }
                    if app.config.browser.scan_root.is_some() && ui.button("Clear").clicked() {
                        app.config.browser.scan_root = None;
                        app.save_config();
                    }
                });
            });
            if app.config.browser.scan_root.is_none() {
                let detected = app
                    .config
                    .scan_root()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "no game directory detected".to_string());
                ui.label(
                    RichText::new(format!("  Detected: {}", detected))
                        .color(theme.text_muted)
                        .size(11.0),
                );
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.label(RichText::new("Download to:").color(theme.text_muted));
                let text = app
                    .config
                    .browser
                    .download_dir
                    .as_deref()
                    .unwrap_or("Scan root");
                ui.label(RichText::new(text).color(theme.text_primary));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Browse...").clicked() {
                        app.browse_for_download_dir();
                    }
                    if app.config.browser.download_dir.is_some() && ui.button("Clear").clicked() {
                        app.config.browser.download_dir = None;
                        app.save_config();
                    }
                });
            });

            ui.add_space(16.0);
            ui.label(
                RichText::new("Appearance")
                    .color(theme.accent)
                    .size(13.0)
                    .strong(),
            );
            ui.add_space(8.0);

            if ui
                .checkbox(&mut app.config.ui.dark_theme, "Dark theme")
                .changed()
            {
                app.theme = Theme::for_dark_mode(app.config.ui.dark_theme);
                app.theme_dirty = true;
                app.save_config();
            }

            ui.add_space(16.0);
            if let Ok(path) = Config::config_path() {
                ui.label(
                    RichText::new(path.display().to_string())
                        .color(theme.text_muted)
                        .size(10.0),
                );
            }
        });

    app.settings_open = open;
}
