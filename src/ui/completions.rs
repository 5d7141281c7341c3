//! Autocomplete UI widget.

use std::ops::Range;

use bevy_egui::egui;

use crate::config::ConsoleConfig;
use crate::core::{InputController, Suggestion};

/// Split `name` around the matched byte range: before, matched, after.
///
/// An out-of-bounds range leaves the whole name unmatched.
pub fn split_match(name: &str, range: Range<usize>) -> (&str, &str, &str) {
    match (name.get(..range.start), name.get(range.clone()), name.get(range.end..)) {
        (Some(before), Some(matched), Some(after)) => (before, matched, after),
        _ => (name, "", ""),
    }
}

fn suggestion_layout(suggestion: &Suggestion, config: &ConsoleConfig) -> egui::text::LayoutJob {
    let theme = &config.theme;
    let (before, matched, after) = split_match(suggestion.name(), suggestion.matched.range.clone());

    let mut layout = egui::text::LayoutJob::default();
    layout.append(before, 0.0, theme.format_text());
    layout.append(matched, 0.0, theme.format_bold());
    layout.append(after, 0.0, theme.format_text());

    let command = &suggestion.command;
    for param in command.params() {
        layout.append(&param.usage(), 6.0, theme.format_dark());
    }
    if !command.description().is_empty() {
        layout.append(command.description(), 12.0, theme.format_dark());
    }
    layout
}

/// Show the suggestion popup below the input field.
pub fn completions(
    text_edit: &egui::text_edit::TextEditOutput,
    input: &InputController,
    ui: &mut egui::Ui,
    config: &ConsoleConfig,
) {
    let text_edit_complete_id = ui.make_persistent_id("text_edit_complete");

    let show = text_edit.response.has_focus()
        && input.is_user_edited()
        && !input.suggestions().is_empty();
    if show {
        egui::Popup::open_id(ui.ctx(), text_edit_complete_id);
    } else if egui::Popup::is_id_open(ui.ctx(), text_edit_complete_id) {
        egui::Popup::close_id(ui.ctx(), text_edit_complete_id);
    }

    egui::Popup::from_response(&text_edit.response)
        .id(text_edit_complete_id)
        .close_behavior(egui::PopupCloseBehavior::CloseOnClickOutside)
        .align(egui::RectAlign::TOP_START)
        .show(|ui| {
            ui.vertical(|ui| {
                for (i, suggestion) in input.suggestions().iter().enumerate() {
                    let res = ui.label(suggestion_layout(suggestion, config));
                    if input.selected_index() == Some(i) {
                        res.highlight();
                    }
                }
            })
        });
}
