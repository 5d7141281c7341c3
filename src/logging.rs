//! Custom [LogPlugin](bevy::log::LogPlugin) functionality.
//!
//! Routes every `tracing` event into the console log through the session's
//! [`LogSender`], so lines logged from any thread show up in the console.

use std::fmt::Write as _;

use bevy::log::{BoxedLayer, Level};
use bevy::prelude::*;
use tracing::Subscriber;
use tracing_subscriber::field::Visit;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::core::{ConsoleSession, LogSender, LogSeverity};

/// A function that implements the log reading functionality for the
/// developer console via [`LogPlugin::custom_layer`](bevy::log::LogPlugin::custom_layer).
///
/// Creates the [`ConsoleSession`] resource if it doesn't exist yet;
/// `ConsolePlugin` keeps the existing one.
pub fn custom_log_layer(app: &mut App) -> Option<BoxedLayer> {
    Some(Box::new(create_custom_log_layer(app)))
}

fn create_custom_log_layer(app: &mut App) -> LogCaptureLayer {
    let sender = app
        .world_mut()
        .get_resource_or_init::<ConsoleSession>()
        .log_sender();
    LogCaptureLayer { sender }
}

/// Map a `tracing` level to a console severity.
pub fn severity_of(level: Level) -> LogSeverity {
    match level {
        Level::ERROR => LogSeverity::Error,
        Level::WARN => LogSeverity::Warning,
        _ => LogSeverity::Log,
    }
}

/// A [`Layer`] that forwards log events to a [`LogSender`].
pub struct LogCaptureLayer {
    sender: LogSender,
}

impl LogCaptureLayer {
    pub fn new(sender: LogSender) -> Self {
        Self { sender }
    }
}

impl<S: Subscriber + for<'a> LookupSpan<'a>> Layer<S> for LogCaptureLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut message = None;
        event.record(&mut LogEventVisitor(&mut message));
        let Some(message) = message else { return };

        let metadata = event.metadata();
        let mut trace = format!("at {}", metadata.module_path().unwrap_or(metadata.target()));
        if let (Some(file), Some(line)) = (metadata.file(), metadata.line()) {
            let _ = write!(trace, " ({file}:{line})");
        }
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope {
                let _ = write!(trace, "\nin {}", span.name());
            }
        }

        // The session is gone during shutdown; nothing left to show the line.
        let _ = self.sender.send(severity_of(*metadata.level()), message, trace);
    }
}

/// A [`Visit`]or that records the `message` field of an event.
struct LogEventVisitor<'a>(&'a mut Option<String>);

impl Visit for LogEventVisitor<'_> {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            *self.0 = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        // Only log out messages
        if field.name() == "message" {
            *self.0 = Some(format!("{value:?}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_severity_mapping() {
        assert_eq!(severity_of(Level::ERROR), LogSeverity::Error);
        assert_eq!(severity_of(Level::WARN), LogSeverity::Warning);
        assert_eq!(severity_of(Level::INFO), LogSeverity::Log);
        assert_eq!(severity_of(Level::TRACE), LogSeverity::Log);
    }

    #[test]
    fn test_layer_forwards_events_with_trace() {
        let mut session = ConsoleSession::default();
        session.log_mut().settings_mut().capture_log_traces = true;
        let subscriber =
            tracing_subscriber::registry().with(LogCaptureLayer::new(session.log_sender()));

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("loading");
            let _guard = span.enter();
            tracing::warn!("disk is slow");
            tracing::info!(answer = 42, "computed");
        });

        assert_eq!(session.drain_logs(), 2);
        let info = session.log().get_newest(0);
        assert_eq!(info.message(), "computed");
        assert_eq!(info.severity(), LogSeverity::Log);
        assert!(info.stack_trace().starts_with("at "));
        assert!(info.stack_trace().ends_with("\nin loading"));

        // Warning traces are dropped unless captured.
        let warning = session.log().get_newest(1);
        assert_eq!(warning.severity(), LogSeverity::Warning);
        assert_eq!(warning.stack_trace(), "");
    }

    #[test]
    fn test_command_failures_reported_as_errors() {
        use crate::core::{CommandError, ConCommand, NoTargets};

        let mut session = ConsoleSession::default();
        session.register(ConCommand::new("fail", |_, _| Err(CommandError::new("nope"))));
        session.register(ConCommand::new("boom", |_, _| panic!("kaboom")));
        session.repopulate();
        let subscriber =
            tracing_subscriber::registry().with(LogCaptureLayer::new(session.log_sender()));

        tracing::subscriber::with_default(subscriber, || {
            assert!(!session.execute_line("fail", &mut NoTargets).success);
            assert!(!session.execute_line("boom", &mut NoTargets).success);
        });

        session.drain_logs();
        let captured: Vec<_> = session
            .log()
            .iter_newest()
            .filter(|e| e.severity() == LogSeverity::Error && !e.stack_trace().is_empty())
            .map(|e| e.message().to_string())
            .collect();
        assert!(captured.contains(&"Command 'fail' failed: nope".to_string()));
        assert!(captured.contains(&"Command 'boom' panicked: kaboom".to_string()));
    }
}
