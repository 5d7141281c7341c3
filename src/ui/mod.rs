//! The module that handles the user interface of the console.

use std::time::Duration;

use bevy::prelude::*;
use bevy_egui::egui::text::{CCursor, CCursorRange, LayoutJob};
use bevy_egui::*;

use crate::config::ConsoleConfig;
use crate::core::{ConsoleInputEvent, ConsoleSession, ConsoleToggleEvent, LogEntry, LogSeverity};

mod completions;
pub use completions::split_match;

/// Overlay state that isn't part of the console session.
#[derive(Default, Resource)]
pub struct ConsoleUiState {
    /// Give the input field keyboard focus on the next frame.
    pub(crate) request_focus: bool,
}

/// Format an elapsed time as `MM:SS.mmm`.
fn format_time(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!(
        "{:02}:{:02}.{:03} ",
        secs / 60,
        secs % 60,
        elapsed.subsec_millis()
    )
}

pub(crate) fn apply_start_open(
    config: Res<ConsoleConfig>,
    mut session: ResMut<ConsoleSession>,
    mut state: ResMut<ConsoleUiState>,
    mut toggles: MessageWriter<ConsoleToggleEvent>,
) {
    if config.start_open && session.set_enabled(true) {
        state.request_focus = true;
        toggles.write(ConsoleToggleEvent::opened());
    }
}

pub(crate) fn open_close_ui(
    mut session: ResMut<ConsoleSession>,
    mut state: ResMut<ConsoleUiState>,
    key: Res<ButtonInput<KeyCode>>,
    config: Res<ConsoleConfig>,
    mut toggles: MessageWriter<ConsoleToggleEvent>,
) {
    if key.just_pressed(config.open_key) {
        let open = session.toggle();
        state.request_focus = open;
        toggles.write(ConsoleToggleEvent { open });
    }
}

pub(crate) fn render_ui_system(
    mut contexts: EguiContexts,
    mut session: ResMut<ConsoleSession>,
    mut state: ResMut<ConsoleUiState>,
    key: Res<ButtonInput<KeyCode>>,
    config: Res<ConsoleConfig>,
    mut input_events: MessageWriter<ConsoleInputEvent>,
) -> Result<(), BevyError> {
    egui::Window::new(config.title.as_str())
        .collapsible(false)
        .default_width(900.)
        .show(contexts.ctx_mut()?, |ui| {
            render_ui(
                ui,
                &mut session,
                &mut state,
                &key,
                &config,
                &mut input_events,
            )
        });
    Ok(())
}

/// The function that renders the UI of the developer console.
pub fn render_ui(
    ui: &mut egui::Ui,
    session: &mut ConsoleSession,
    state: &mut ConsoleUiState,
    key: &ButtonInput<KeyCode>,
    config: &ConsoleConfig,
    input_events: &mut MessageWriter<ConsoleInputEvent>,
) {
    let text_edit_id = egui::Id::new("console_input");

    // Navigation keys are consumed before the text field sees them.
    if ui.memory(|mem| mem.has_focus(text_edit_id)) {
        let consume = |ui: &mut egui::Ui, egui_key: egui::Key| {
            ui.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui_key))
        };
        if consume(ui, egui::Key::ArrowUp) {
            session.input_mut().arrow_up();
        }
        if consume(ui, egui::Key::ArrowDown) {
            session.input_mut().arrow_down();
        }
        if consume(ui, egui::Key::Tab) || key.just_pressed(config.complete_key) {
            session.complete_input();
        }
        if consume(ui, egui::Key::Escape) {
            session.input_mut().clear_input();
        }
    }

    if key.just_pressed(config.submit_key) {
        submit_command(session, state, input_events);
    }

    // Log filter controls
    egui::TopBottomPanel::top("filter panel")
        .frame(egui::Frame::NONE.outer_margin(egui::Margin::symmetric(5, 2)))
        .show_inside(ui, |ui| {
            ui.horizontal(|ui| {
                let counts = session.log().severity_counts();
                for (severity, count) in LogSeverity::ALL.into_iter().zip(counts) {
                    let shown = session.log_mut().filters_mut().shown_mut(severity);
                    ui.checkbox(shown, format!("{severity} ({count})"));
                }

                ui.separator();
                let mut search = session.log().filters().search().to_string();
                let search_edit = egui::TextEdit::singleline(&mut search)
                    .hint_text("Search")
                    .desired_width(160.0);
                if ui.add(search_edit).changed() {
                    session.log_mut().filters_mut().set_search(search);
                }

                ui.checkbox(
                    &mut session.log_mut().settings_mut().collapse_duplicates,
                    "Collapse",
                );
                if ui.button("Clear").clicked() {
                    session.log_mut().clear();
                }
            });
        });

    egui::TopBottomPanel::bottom("bottom panel")
        .frame(egui::Frame::NONE.outer_margin(egui::Margin {
            left: 5,
            right: 5,
            top: 11,
            bottom: 5,
        }))
        .show_inside(ui, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Submit").clicked() {
                    submit_command(session, state, input_events);
                }

                // The session owns the text; the widget edits a copy.
                let sync = session.input_mut().take_sync();
                let mut command = session.input().text().to_string();
                let text_edit = egui::TextEdit::singleline(&mut command)
                    .id(text_edit_id)
                    .desired_width(ui.available_width())
                    .margin(egui::Vec2::splat(4.0))
                    .font(config.theme.font.clone())
                    .lock_focus(true)
                    .show(ui);

                // Ignore the character typed by the open key.
                if text_edit.response.changed() && !key.just_pressed(config.open_key) {
                    session.edit_input(command);
                }

                if let Some(sync) = sync {
                    let mut text_edit_state = text_edit.state.clone();
                    text_edit_state
                        .cursor
                        .set_char_range(Some(CCursorRange::one(CCursor::new(sync.cursor))));
                    egui::TextEdit::store_state(ui.ctx(), text_edit_id, text_edit_state);
                }

                completions::completions(&text_edit, session.input(), ui, config);

                if std::mem::take(&mut state.request_focus)
                    || session.input_mut().take_focus_request()
                {
                    ui.ctx().memory_mut(|mem| mem.request_focus(text_edit_id));
                }
            });
        });

    egui::ScrollArea::new([false, true])
        .auto_shrink([false, true])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            ui.vertical(|ui| {
                for entry in session.log().iter_visible().rev() {
                    add_log(ui, entry, config);
                }
            });
        });
}

fn submit_command(
    session: &mut ConsoleSession,
    state: &mut ConsoleUiState,
    input_events: &mut MessageWriter<ConsoleInputEvent>,
) {
    if let Some(line) = session.input_mut().submit() {
        input_events.write(ConsoleInputEvent::new(line));
    }
    // Enter drops focus from a single line edit.
    state.request_focus = true;
}

fn add_log(ui: &mut egui::Ui, entry: &LogEntry, config: &ConsoleConfig) {
    ui.push_id(entry.sequence(), |ui| {
        let label = ui.label(format_line(config, entry));

        // Copy message to clipboard on click
        if label.clicked() {
            ui.ctx().copy_text(entry.message().to_string());
        }

        label.on_hover_ui(|ui| {
            ui.label("Click to copy message");
            ui.separator();

            let theme = &config.theme;
            let mut text = LayoutJob::default();
            text.append("Frame: ", 0.0, theme.format_text());
            text.append(&entry.frame().to_string(), 0.0, theme.format_dark());
            text.append("\nRepeated: ", 0.0, theme.format_text());
            text.append(&entry.count().to_string(), 0.0, theme.format_dark());
            text.append("\nTrace: ", 0.0, theme.format_text());
            if entry.stack_trace().is_empty() {
                text.append("(none)", 0.0, theme.format_dark());
            } else {
                text.append(&format!("\n{}", entry.stack_trace()), 0.0, theme.format_dark());
            }
            ui.label(text);
        });
    });
}

fn format_line(config: &ConsoleConfig, entry: &LogEntry) -> LayoutJob {
    let theme = &config.theme;
    let mut text = LayoutJob::default();
    text.append(&format_time(entry.timestamp()), 0.0, theme.format_dark());
    text.append(
        &format!("{:<9}", entry.severity().name()),
        0.0,
        theme.format_severity(entry.severity()),
    );
    text.append(entry.message(), 6.0, theme.format_text());
    if entry.count() > 1 {
        text.append(&format!("x{}", entry.count()), 8.0, theme.format_dark());
    }
    text
}
