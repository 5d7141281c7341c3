//! Console messages for communication between layers.
//!
//! - UI or game code -> console: command lines, printed lines, clear requests
//! - console -> game code: open/close notifications, execution results

use bevy::prelude::*;

use super::log_buffer::LogSeverity;
use super::session::ExecutionResult;

/// A command line to execute.
///
/// Lines are executed by an exclusive system with access to the world, so
/// instance commands can reach resources and components.
///
/// # Examples
///
/// ```ignore
/// fn slow_motion(mut lines: MessageWriter<ConsoleInputEvent>) {
///     lines.write(ConsoleInputEvent::new("time.scale 0.25"));
/// }
/// ```
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct ConsoleInputEvent {
    /// The raw command line.
    pub line: String,
}

impl ConsoleInputEvent {
    pub fn new(line: impl Into<String>) -> Self {
        Self { line: line.into() }
    }
}

/// Append a line to the console log without going through `tracing`.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct ConsolePrintEvent {
    pub severity: LogSeverity,
    pub message: String,
}

impl ConsolePrintEvent {
    pub fn new(severity: LogSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn log(message: impl Into<String>) -> Self {
        Self::new(LogSeverity::Log, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(LogSeverity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogSeverity::Error, message)
    }
}

/// Sent after a command line was executed.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct ConsoleExecutedEvent {
    pub line: String,
    pub result: ExecutionResult,
}

/// Sent when the console is opened or closed.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleToggleEvent {
    /// Whether the console is now open.
    pub open: bool,
}

impl ConsoleToggleEvent {
    pub fn opened() -> Self {
        Self { open: true }
    }

    pub fn closed() -> Self {
        Self { open: false }
    }
}

/// Request to clear the console log.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct ConsoleClearEvent;

/// Plugin that registers all console messages.
pub struct ConsoleEventsPlugin;

impl Plugin for ConsoleEventsPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ConsoleInputEvent>()
            .add_message::<ConsolePrintEvent>()
            .add_message::<ConsoleExecutedEvent>()
            .add_message::<ConsoleToggleEvent>()
            .add_message::<ConsoleClearEvent>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_input_event() {
        let event = ConsoleInputEvent::new("time.scale 0.5");
        assert_eq!(event.line, "time.scale 0.5");
    }

    #[test]
    fn test_console_print_event() {
        let event = ConsolePrintEvent::error("Something went wrong");
        assert_eq!(event.severity, LogSeverity::Error);
        assert_eq!(event.message, "Something went wrong");
        assert_eq!(ConsolePrintEvent::warning("w").severity, LogSeverity::Warning);
    }

    #[test]
    fn test_toggle_event() {
        assert!(ConsoleToggleEvent::opened().open);
        assert!(!ConsoleToggleEvent::closed().open);
    }
}
