use eframe::egui::{self, Color32, Stroke, Visuals};

/// Theme color definitions
#[derive(Debug, Clone)]
pub struct Theme {
    pub bg_dark: Color32,
    pub bg_medium: Color32,
    pub bg_light: Color32,

    pub text_primary: Color32,
    pub text_muted: Color32,

    pub accent: Color32,

    pub success: Color32,
    pub warning: Color32,
    pub error: Color32,

    pub border: Color32,
}

impl Theme {
    /// Dark theme with a sand accent
    pub fn dark() -> Self {
        Self {
            bg_dark: Color32::from_rgb(24, 24, 27),
            bg_medium: Color32::from_rgb(32, 32, 36),
            bg_light: Color32::from_rgb(48, 48, 54),

            text_primary: Color32::from_rgb(250, 250, 250),
            text_muted: Color32::from_rgb(140, 140, 140),

            accent: Color32::from_rgb(234, 153, 57),

            success: Color32::from_rgb(34, 197, 94),
            warning: Color32::from_rgb(234, 179, 8),
            error: Color32::from_rgb(239, 68, 68),

            border: Color32::from_rgb(63, 63, 70),
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            bg_dark: Color32::from_rgb(245, 245, 244),
            bg_medium: Color32::from_rgb(250, 250, 249),
            bg_light: Color32::from_rgb(231, 229, 228),

            text_primary: Color32::from_rgb(28, 25, 23),
            text_muted: Color32::from_rgb(120, 113, 108),

            accent: Color32::from_rgb(194, 112, 16),

            success: Color32::from_rgb(22, 163, 74),
            warning: Color32::from_rgb(202, 138, 4),
            error: Color32::from_rgb(220, 38, 38),

            border: Color32::from_rgb(214, 211, 209),
        }
    }

    pub fn for_dark_mode(dark: bool) -> Self {
        if dark {
            Self::dark()
        } else {
            Self::light()
        }
    }

    /// Apply this theme to egui's visuals
    pub fn apply(&self, ctx: &egui::Context, dark: bool) {
        let mut visuals = if dark {
            Visuals::dark()
        } else {
            Visuals::light()
        };

        visuals.window_fill = self.bg_dark;
        visuals.panel_fill = self.bg_dark;
        visuals.faint_bg_color = self.bg_medium;

        visuals.widgets.noninteractive.bg_fill = self.bg_medium;
        visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, self.border);
        visuals.widgets.inactive.bg_fill = self.bg_medium;
        visuals.widgets.inactive.weak_bg_fill = self.bg_light;
        visuals.widgets.hovered.bg_fill = self.bg_light;
        visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, self.accent);
        visuals.widgets.active.bg_stroke = Stroke::new(1.0, self.accent);

        visuals.selection.bg_fill = self.accent.gamma_multiply(0.3);
        visuals.selection.stroke = Stroke::new(1.0, self.accent);
        visuals.hyperlink_color = self.accent;

        visuals.window_stroke = Stroke::new(1.0, self.border);
        visuals.window_shadow = egui::epaint::Shadow::NONE;
        visuals.popup_shadow = egui::epaint::Shadow::NONE;

        ctx.set_visuals(visuals);
    }
}
