//! UI modules for the savegame browser
//!
//! This module contains the extracted UI rendering code.

mod browse;
mod settings;
pub mod theme;

pub use browse::{render_browse, render_hint_dialog};
pub use settings::render_settings_window;
pub use theme::Theme;
