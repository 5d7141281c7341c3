//! Console input line state: suggestions, history and completion.
//!
//! The controller owns the canonical input text. A text widget is only a
//! view of it: user edits are pushed in with
//! [`InputController::on_text_edited`], and programmatic edits are pulled out
//! with [`InputController::take_sync`].

use std::collections::VecDeque;
use std::sync::Arc;

use super::matcher::{MatchResult, match_and_sort};
use super::registry::{CommandDescriptor, CommandRegistry};
use super::tokenizer::{first_token, first_token_range};

/// Upper bound on the number of suggestions shown.
pub const MAX_SUGGESTIONS: usize = 10;

/// Default number of remembered command lines.
pub const DEFAULT_HISTORY_CAPACITY: usize = 64;

/// Input settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "persist", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "persist", serde(default))]
pub struct InputSettings {
    /// Lines kept in history (at least 1).
    pub history_capacity: usize,
    /// Suggestions shown, at most [`MAX_SUGGESTIONS`].
    pub max_suggestions: usize,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            max_suggestions: MAX_SUGGESTIONS,
        }
    }
}

/// Bounded history of submitted lines, oldest first.
#[derive(Debug, Clone)]
pub struct CommandHistory {
    lines: VecDeque<String>,
    capacity: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl CommandHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a line, evicting the oldest when full.
    ///
    /// Returns `false` when `line` repeats the newest entry and was skipped.
    pub fn push(&mut self, line: impl Into<String>) -> bool {
        let line = line.into();
        if self.lines.back() == Some(&line) {
            return false;
        }
        while self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
        true
    }

    /// Entry by index, `0` being the oldest.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    #[inline]
    pub fn newest(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity, dropping the oldest lines if needed.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.lines.iter().map(String::as_str)
    }
}

/// What the arrow keys currently do. Derived from the state on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavMode {
    /// Move the highlighted suggestion.
    Suggestions,
    /// Walk through submitted lines.
    History,
}

/// A command suggested for the current query.
#[derive(Debug, Clone)]
pub struct Suggestion {
    pub command: Arc<CommandDescriptor>,
    pub matched: MatchResult,
}

impl Suggestion {
    #[inline]
    pub fn name(&self) -> &str {
        self.command.name()
    }
}

/// Text the widget must adopt after a programmatic edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSync {
    pub text: String,
    /// Cursor position in characters.
    pub cursor: usize,
}

impl TextSync {
    fn at_end(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.chars().count(),
        }
    }
}

/// The input line state machine.
#[derive(Debug)]
pub struct InputController {
    text: String,
    user_edited: bool,
    history: CommandHistory,
    history_index: Option<usize>,
    last_query: Option<String>,
    suggestions: Vec<Suggestion>,
    selected: Option<usize>,
    max_suggestions: usize,
    pending_sync: Option<TextSync>,
    focus_requested: bool,
}

impl Default for InputController {
    fn default() -> Self {
        Self::new(&InputSettings::default())
    }
}

impl InputController {
    pub fn new(settings: &InputSettings) -> Self {
        Self {
            text: String::new(),
            user_edited: false,
            history: CommandHistory::new(settings.history_capacity),
            history_index: None,
            last_query: None,
            suggestions: Vec::new(),
            selected: None,
            max_suggestions: settings.max_suggestions.clamp(1, MAX_SUGGESTIONS),
            pending_sync: None,
            focus_requested: false,
        }
    }

    /// Pick up changed settings.
    pub fn apply_settings(&mut self, settings: &InputSettings) {
        self.history.set_capacity(settings.history_capacity);
        self.max_suggestions = settings.max_suggestions.clamp(1, MAX_SUGGESTIONS);
        self.suggestions.truncate(self.max_suggestions);
        self.clamp_selection();
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the current text came from the user rather than from
    /// history navigation or completion.
    #[inline]
    pub fn is_user_edited(&self) -> bool {
        self.user_edited
    }

    #[inline]
    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    #[inline]
    pub fn history_mut(&mut self) -> &mut CommandHistory {
        &mut self.history
    }

    /// Selected history entry, `0` being the oldest.
    #[inline]
    pub fn history_index(&self) -> Option<usize> {
        self.history_index
    }

    #[inline]
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    #[inline]
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_suggestion(&self) -> Option<&Suggestion> {
        self.suggestions.get(self.selected?)
    }

    /// The first token of the input.
    #[inline]
    pub fn query(&self) -> &str {
        first_token(&self.text)
    }

    /// Current arrow-key mode.
    pub fn nav_mode(&self) -> NavMode {
        if self.query().is_empty() {
            NavMode::History
        } else if self.selected_suggestion().is_some() {
            NavMode::Suggestions
        } else {
            NavMode::History
        }
    }

    /// The user changed the text.
    pub fn on_text_edited(&mut self, text: impl Into<String>, registry: &CommandRegistry) {
        self.text = text.into();
        self.user_edited = true;
        self.refresh_suggestions(registry, false);
    }

    /// Recompute suggestions for the current query.
    ///
    /// Without `force`, nothing happens while the query is unchanged.
    pub fn refresh_suggestions(&mut self, registry: &CommandRegistry, force: bool) {
        let query = self.query();
        if !force && self.last_query.as_deref() == Some(query) {
            return;
        }
        let query = query.to_string();

        let previous = self.selected_suggestion().map(|s| s.name().to_string());
        let previous_index = self.selected;

        self.suggestions = match_and_sort(&query, registry.sorted().iter().map(|cmd| cmd.name()))
            .into_iter()
            .take(self.max_suggestions)
            .filter_map(|(name, matched)| {
                registry.try_get(name).map(|command| Suggestion {
                    command: Arc::clone(command),
                    matched,
                })
            })
            .collect();

        self.selected = previous
            .and_then(|name| self.suggestions.iter().position(|s| s.name() == name))
            .or(previous_index);
        if self.selected.is_none() && !self.suggestions.is_empty() {
            self.selected = Some(0);
        }
        self.clamp_selection();
        self.last_query = Some(query);
    }

    fn clamp_selection(&mut self) {
        self.selected = match self.suggestions.len() {
            0 => None,
            len => self.selected.map(|i| i.min(len - 1)),
        };
    }

    /// Up arrow.
    pub fn arrow_up(&mut self) {
        match self.nav_mode() {
            NavMode::Suggestions => {
                self.selected = self.selected.map(|i| i.saturating_sub(1));
            }
            NavMode::History => {
                if self.history.is_empty() {
                    return;
                }
                let index = match self.history_index {
                    None => self.history.len() - 1,
                    Some(i) => i.saturating_sub(1),
                };
                self.select_history(Some(index));
            }
        }
    }

    /// Down arrow.
    pub fn arrow_down(&mut self) {
        match self.nav_mode() {
            NavMode::Suggestions => {
                let last = self.suggestions.len().saturating_sub(1);
                self.selected = self.selected.map(|i| (i + 1).min(last));
            }
            NavMode::History => match self.history_index {
                None => {}
                Some(i) if i + 1 >= self.history.len() => self.select_history(None),
                Some(i) => self.select_history(Some(i + 1)),
            },
        }
    }

    fn select_history(&mut self, index: Option<usize>) {
        self.history_index = index;
        let line = index
            .and_then(|i| self.history.get(i))
            .unwrap_or_default()
            .to_string();
        self.set_programmatic_text(line);
        self.suggestions.clear();
        self.selected = None;
    }

    /// Tab completion.
    ///
    /// Replaces the first token with the highlighted suggestion, keeping the
    /// rest of the line. Returns `false` when there was nothing to complete.
    pub fn complete(&mut self, registry: &CommandRegistry) -> bool {
        self.refresh_suggestions(registry, true);
        let index = self.selected.unwrap_or(0);
        let Some(name) = self.suggestions.get(index).map(|s| s.name().to_string()) else {
            return false;
        };

        let mut text = std::mem::take(&mut self.text);
        text.replace_range(first_token_range(&text), &name);
        self.set_programmatic_text(text);
        self.suggestions.clear();
        self.selected = None;
        self.focus_requested = true;
        true
    }

    /// Enter key.
    ///
    /// Returns the line to execute, or `None` for blank input. The line is
    /// added to history and all transient state is reset.
    pub fn submit(&mut self) -> Option<String> {
        if self.text.trim().is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.text);
        self.history.push(line.as_str());
        self.clear_input();
        Some(line)
    }

    /// Escape key: drop the text and every transient state.
    pub fn clear_input(&mut self) {
        self.history_index = None;
        self.set_programmatic_text(String::new());
        self.suggestions.clear();
        self.selected = None;
        self.last_query = None;
    }

    fn set_programmatic_text(&mut self, text: String) {
        self.user_edited = false;
        self.last_query = Some(first_token(&text).to_string());
        self.pending_sync = Some(TextSync::at_end(&text));
        self.text = text;
    }

    /// Text the widget must adopt, if a programmatic edit happened.
    pub fn take_sync(&mut self) -> Option<TextSync> {
        self.pending_sync.take()
    }

    /// Whether the input field should grab keyboard focus.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CommandTable, ConCommand};

    fn registry(names: &[&str]) -> CommandRegistry {
        let mut table = CommandTable::new();
        for name in names {
            table.add(ConCommand::new(*name, |_, _| Ok(None)));
        }
        CommandRegistry::from_commands(&table)
    }

    fn names(input: &InputController) -> Vec<&str> {
        input.suggestions().iter().map(|s| s.name()).collect()
    }

    fn submitted(lines: &[&str]) -> InputController {
        let mut input = InputController::new(&InputSettings::default());
        let reg = registry(&[]);
        for line in lines {
            input.on_text_edited(*line, &reg);
            input.submit();
        }
        input
    }

    #[test]
    fn test_history_skips_adjacent_duplicates() {
        let mut history = CommandHistory::new(8);
        assert!(history.push("help"));
        assert!(!history.push("help"));
        assert!(history.push("clear"));
        assert!(history.push("help"));
        assert_eq!(history.iter().collect::<Vec<_>>(), vec!["help", "clear", "help"]);
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut history = CommandHistory::new(2);
        history.push("a");
        history.push("b");
        history.push("c");
        assert_eq!(history.iter().collect::<Vec<_>>(), vec!["b", "c"]);

        history.set_capacity(1);
        assert_eq!(history.newest(), Some("c"));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_suggestions_prefix_alphabetical() {
        let reg = registry(&["scene.reload", "log", "scene.load"]);
        let mut input = InputController::new(&InputSettings::default());
        input.on_text_edited("sce", &reg);
        assert_eq!(names(&input), vec!["scene.load", "scene.reload"]);
        assert_eq!(input.selected_index(), Some(0));
        assert!(input.is_user_edited());
    }

    #[test]
    fn test_suggestions_prefix_before_token_boundary() {
        let reg = registry(&["scene.reload", "reload"]);
        let mut input = InputController::new(&InputSettings::default());
        input.on_text_edited("re", &reg);
        assert_eq!(names(&input), vec!["reload", "scene.reload"]);
    }

    #[test]
    fn test_exact_name_not_suggested() {
        let reg = registry(&["help", "help.all"]);
        let mut input = InputController::new(&InputSettings::default());
        input.on_text_edited("HELP", &reg);
        assert_eq!(names(&input), vec!["help.all"]);
    }

    #[test]
    fn test_suggestions_capped() {
        let many: Vec<String> = (0..15).map(|i| format!("cmd{i:02}")).collect();
        let refs: Vec<&str> = many.iter().map(String::as_str).collect();
        let reg = registry(&refs);
        let mut input = InputController::new(&InputSettings::default());
        input.on_text_edited("cmd", &reg);
        assert_eq!(input.suggestions().len(), MAX_SUGGESTIONS);
        assert_eq!(input.suggestions()[0].name(), "cmd00");
    }

    #[test]
    fn test_highlight_preserved_by_name() {
        let reg = registry(&["scale", "scene.load", "scene.reload"]);
        let mut input = InputController::new(&InputSettings::default());
        input.on_text_edited("sc", &reg);
        assert_eq!(names(&input), vec!["scale", "scene.load", "scene.reload"]);
        input.arrow_down();
        input.arrow_down();
        assert_eq!(input.selected_suggestion().unwrap().name(), "scene.reload");

        input.on_text_edited("sce", &reg);
        assert_eq!(names(&input), vec!["scene.load", "scene.reload"]);
        assert_eq!(input.selected_suggestion().unwrap().name(), "scene.reload");
    }

    #[test]
    fn test_highlight_clamped_when_lost() {
        let reg = registry(&["scale", "scene.load", "scene.reload"]);
        let mut input = InputController::new(&InputSettings::default());
        input.on_text_edited("sc", &reg);
        input.arrow_down();
        input.arrow_down();

        input.on_text_edited("sca", &reg);
        assert_eq!(names(&input), vec!["scale"]);
        assert_eq!(input.selected_index(), Some(0));
    }

    #[test]
    fn test_unchanged_query_skips_rescan() {
        let reg = registry(&["scene.load", "scene.reload"]);
        let mut input = InputController::new(&InputSettings::default());
        input.on_text_edited("sce", &reg);
        input.arrow_down();

        // Typing arguments keeps the query, so the highlight stays put.
        input.on_text_edited("sce foo", &reg);
        assert_eq!(input.selected_index(), Some(1));

        // A registry change is only seen once forced.
        let other = registry(&["scenery"]);
        input.on_text_edited("sce foo bar", &other);
        assert_eq!(names(&input), vec!["scene.load", "scene.reload"]);
        input.refresh_suggestions(&other, true);
        assert_eq!(names(&input), vec!["scenery"]);
    }

    #[test]
    fn test_suggestion_navigation_clamped() {
        let reg = registry(&["scene.load", "scene.reload"]);
        let mut input = InputController::new(&InputSettings::default());
        input.on_text_edited("sce", &reg);
        assert_eq!(input.nav_mode(), NavMode::Suggestions);

        input.arrow_up();
        assert_eq!(input.selected_index(), Some(0));
        input.arrow_down();
        input.arrow_down();
        input.arrow_down();
        assert_eq!(input.selected_index(), Some(1));
        assert_eq!(input.text(), "sce");
    }

    #[test]
    fn test_history_navigation() {
        let mut input = submitted(&["first", "second", "third"]);
        assert_eq!(input.nav_mode(), NavMode::History);

        // Down without a selection does nothing.
        input.arrow_down();
        assert_eq!(input.history_index(), None);
        assert_eq!(input.text(), "");

        input.arrow_up();
        assert_eq!(input.text(), "third");
        assert_eq!(input.history_index(), Some(2));
        assert!(!input.is_user_edited());

        input.arrow_up();
        input.arrow_up();
        input.arrow_up();
        assert_eq!(input.text(), "first");
        assert_eq!(input.history_index(), Some(0));

        input.arrow_down();
        assert_eq!(input.text(), "second");
        input.arrow_down();
        assert_eq!(input.text(), "third");
        input.arrow_down();
        assert_eq!(input.text(), "");
        assert_eq!(input.history_index(), None);
    }

    #[test]
    fn test_history_recall_does_not_suggest() {
        let reg = registry(&["scene.load", "scene.reload"]);
        let mut input = InputController::new(&InputSettings::default());
        input.on_text_edited("sce", &reg);
        input.submit();

        input.arrow_up();
        assert_eq!(input.text(), "sce");
        assert!(input.suggestions().is_empty());
        assert_eq!(input.nav_mode(), NavMode::History);
        assert_eq!(input.take_sync(), Some(TextSync { text: "sce".into(), cursor: 3 }));

        // Re-sending the same text from the widget does not rescan.
        input.on_text_edited("sce", &reg);
        assert!(input.suggestions().is_empty());
        input.arrow_up();
        assert_eq!(input.text(), "sce");
    }

    #[test]
    fn test_complete_replaces_first_token() {
        let reg = registry(&["scene.load", "scene.reload"]);
        let mut input = InputController::new(&InputSettings::default());
        input.on_text_edited("  sce  level1 \"x y\"", &reg);
        input.arrow_down();

        assert!(input.complete(&reg));
        assert_eq!(input.text(), "  scene.reload  level1 \"x y\"");
        assert!(input.suggestions().is_empty());
        assert!(!input.is_user_edited());
        assert!(input.take_focus_request());
        assert!(!input.take_focus_request());

        let sync = input.take_sync().unwrap();
        assert_eq!(sync.text, input.text());
        assert_eq!(sync.cursor, input.text().chars().count());
        assert!(input.take_sync().is_none());
    }

    #[test]
    fn test_complete_without_match_is_noop() {
        let reg = registry(&["help"]);
        let mut input = InputController::new(&InputSettings::default());
        input.on_text_edited("zzz", &reg);
        assert!(!input.complete(&reg));
        assert_eq!(input.text(), "zzz");
        assert!(input.take_sync().is_none());
        assert!(!input.take_focus_request());
    }

    #[test]
    fn test_submit() {
        let reg = registry(&["help", "help.all"]);
        let mut input = InputController::new(&InputSettings::default());

        input.on_text_edited("   ", &reg);
        assert_eq!(input.submit(), None);

        input.on_text_edited("help", &reg);
        assert_eq!(input.submit(), Some("help".to_string()));
        input.on_text_edited("help", &reg);
        assert_eq!(input.submit(), Some("help".to_string()));

        assert_eq!(input.history().len(), 1);
        assert_eq!(input.text(), "");
        assert!(input.suggestions().is_empty());
        assert_eq!(input.history_index(), None);
    }

    #[test]
    fn test_settings_applied() {
        let settings = InputSettings {
            history_capacity: 2,
            max_suggestions: 3,
        };
        let mut input = submitted(&["a", "b", "c"]);
        input.apply_settings(&settings);
        assert_eq!(input.history().iter().collect::<Vec<_>>(), vec!["b", "c"]);

        let reg = registry(&["x1", "x2", "x3", "x4"]);
        input.on_text_edited("x", &reg);
        assert_eq!(input.suggestions().len(), 3);
    }
}
