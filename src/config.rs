//! Configuration of the egui console overlay.

use bevy::prelude::*;
use bevy_egui::egui::{self, Color32, FontId, TextFormat};

use crate::core::LogSeverity;

/// Keys and look of the console overlay.
#[derive(Resource, Reflect, Debug, Clone)]
#[reflect(Resource)]
pub struct ConsoleConfig {
    /// Opens and closes the console.
    pub open_key: KeyCode,
    /// Executes the input line.
    pub submit_key: KeyCode,
    /// Completes the highlighted suggestion.
    pub complete_key: KeyCode,
    /// Whether the console starts open.
    pub start_open: bool,
    pub title: String,
    #[reflect(ignore)]
    pub theme: ConsoleTheme,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            open_key: KeyCode::Backquote,
            submit_key: KeyCode::Enter,
            complete_key: KeyCode::Tab,
            start_open: false,
            title: "Developer Console".to_string(),
            theme: ConsoleTheme::default(),
        }
    }
}

/// Font and colors.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleTheme {
    pub font: FontId,
    pub text_color: Color32,
    /// Timestamps, prompts and other secondary text.
    pub dark: Color32,
    pub log: Color32,
    pub warning: Color32,
    pub error: Color32,
    pub exception: Color32,
    pub assert: Color32,
}

impl Default for ConsoleTheme {
    fn default() -> Self {
        Self {
            font: FontId::monospace(14.0),
            text_color: Color32::from_rgb(220, 220, 220),
            dark: Color32::from_rgb(130, 130, 130),
            log: Color32::from_rgb(160, 200, 240),
            warning: Color32::from_rgb(240, 200, 90),
            error: Color32::from_rgb(240, 90, 90),
            exception: Color32::from_rgb(255, 60, 140),
            assert: Color32::from_rgb(200, 120, 255),
        }
    }
}

impl ConsoleTheme {
    /// Color used for a severity tag.
    pub fn severity_color(&self, severity: LogSeverity) -> Color32 {
        match severity {
            LogSeverity::Log => self.log,
            LogSeverity::Warning => self.warning,
            LogSeverity::Error => self.error,
            LogSeverity::Exception => self.exception,
            LogSeverity::Assert => self.assert,
        }
    }

    pub fn format_text(&self) -> TextFormat {
        TextFormat::simple(self.font.clone(), self.text_color)
    }

    pub fn format_dark(&self) -> TextFormat {
        TextFormat::simple(self.font.clone(), self.dark)
    }

    /// Highlighted characters of a suggestion.
    pub fn format_bold(&self) -> TextFormat {
        TextFormat {
            underline: egui::Stroke::new(1.0, self.text_color),
            ..TextFormat::simple(self.font.clone(), Color32::WHITE)
        }
    }

    pub fn format_severity(&self, severity: LogSeverity) -> TextFormat {
        TextFormat::simple(self.font.clone(), self.severity_color(severity))
    }
}
