//! The console session: log, registry and input line in one place.
//!
//! [`ConsoleSession`] is what a host drives each frame. Log lines coming from
//! other threads go through a [`LogSender`] and are drained into the
//! [`LogBuffer`] by [`ConsoleSession::begin_frame`].

use std::any::Any;
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use bevy::prelude::*;

use super::concommand::ConCommand;
use super::input::{InputController, InputSettings};
use super::log_buffer::{LogBuffer, LogSettings, LogSeverity};
use super::registry::{CommandRegistry, CommandTable, ExecError};
use super::target::{TargetEnvironment, TargetType};
use super::tokenizer::split_command_line;

/// Prefix of the echoed command line in the log.
pub const COMMAND_ECHO_PREFIX: &str = "$ ";

/// A log line waiting to be drained into the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLog {
    pub severity: LogSeverity,
    pub message: String,
    pub stack_trace: String,
}

/// Thread-safe producer side of the log queue. Never blocks.
#[derive(Debug, Clone)]
pub struct LogSender(mpsc::Sender<RawLog>);

impl LogSender {
    /// Queue a line. Returns `false` once the session is gone.
    pub fn send(
        &self,
        severity: LogSeverity,
        message: impl Into<String>,
        stack_trace: impl Into<String>,
    ) -> bool {
        self.0
            .send(RawLog {
                severity,
                message: message.into(),
                stack_trace: stack_trace.into(),
            })
            .is_ok()
    }
}

/// Multiple-producer, single-consumer queue of [`RawLog`]s.
#[derive(Debug)]
pub struct LogQueue {
    sender: mpsc::Sender<RawLog>,
    // Only locked through `&mut self`, so never contended.
    receiver: Mutex<mpsc::Receiver<RawLog>>,
}

impl Default for LogQueue {
    fn default() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver: Mutex::new(receiver),
        }
    }
}

impl LogQueue {
    pub fn sender(&self) -> LogSender {
        LogSender(self.sender.clone())
    }

    /// Move every queued line into `log`, returning how many were drained.
    ///
    /// Stack traces of severities the settings don't capture are dropped.
    pub fn drain_into(&mut self, log: &mut LogBuffer) -> usize {
        let receiver = self
            .receiver
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);

        let mut drained = 0;
        for raw in receiver.try_iter() {
            let trace = log
                .settings()
                .captures_trace(raw.severity)
                .then_some(raw.stack_trace.as_str());
            log.push(raw.severity, &raw.message, trace);
            drained += 1;
        }
        drained
    }
}

/// Outcome of [`ConsoleSession::execute_line`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub success: bool,
    /// Command output on success, the failure reason otherwise.
    pub output: String,
}

/// What a static command handler can reach.
pub struct CommandContext<'a> {
    pub session: &'a mut ConsoleSession,
    pub targets: &'a mut dyn TargetEnvironment,
}

impl CommandContext<'_> {
    /// The shared instance of `T`, if the environment exposes one.
    pub fn shared<T: Any>(&mut self) -> Option<&mut T> {
        self.targets
            .shared_instance(TargetType::of::<T>())?
            .downcast_mut()
    }
}

/// An interactive console session.
///
/// # Examples
///
/// ```
/// use bevy_dev_console::core::{ConCommand, ConsoleSession, NoTargets, ParamSpec};
///
/// let mut session = ConsoleSession::default();
/// session.register(
///     ConCommand::new("add", |args, _| {
///         Ok(Some((args.int(0).unwrap_or(0) + args.int(1).unwrap_or(0)).to_string()))
///     })
///     .param(ParamSpec::int("a"))
///     .param(ParamSpec::int("b")),
/// );
/// session.repopulate();
///
/// let result = session.execute_line("add 2 3", &mut NoTargets);
/// assert!(result.success);
/// assert_eq!(result.output, "5");
/// assert_eq!(session.log().get_newest(1).message(), "$ add 2 3");
/// ```
#[derive(Resource, Debug)]
pub struct ConsoleSession {
    log: LogBuffer,
    registry: Arc<CommandRegistry>,
    commands: CommandTable,
    input: InputController,
    input_settings: InputSettings,
    queue: LogQueue,
    enabled: bool,
    repopulate_requested: bool,
}

impl Default for ConsoleSession {
    fn default() -> Self {
        Self::new(LogSettings::default(), InputSettings::default())
    }
}

impl ConsoleSession {
    pub fn new(log_settings: LogSettings, input_settings: InputSettings) -> Self {
        Self {
            log: LogBuffer::new(log_settings),
            registry: Arc::default(),
            commands: CommandTable::new(),
            input: InputController::new(&input_settings),
            input_settings,
            queue: LogQueue::default(),
            enabled: false,
            repopulate_requested: false,
        }
    }

    #[inline]
    pub fn log(&self) -> &LogBuffer {
        &self.log
    }

    #[inline]
    pub fn log_mut(&mut self) -> &mut LogBuffer {
        &mut self.log
    }

    #[inline]
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Registration candidates.
    #[inline]
    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    #[inline]
    pub fn input(&self) -> &InputController {
        &self.input
    }

    #[inline]
    pub fn input_mut(&mut self) -> &mut InputController {
        &mut self.input
    }

    #[inline]
    pub fn input_settings(&self) -> &InputSettings {
        &self.input_settings
    }

    pub fn set_input_settings(&mut self, settings: InputSettings) {
        self.input.apply_settings(&settings);
        self.input_settings = settings;
    }

    /// A handle for queueing log lines from any thread.
    pub fn log_sender(&self) -> LogSender {
        self.queue.sender()
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns `true` if the state changed.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        let changed = self.enabled != enabled;
        self.enabled = enabled;
        changed
    }

    /// Flip the enabled flag, returning the new state.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    /// Add a command candidate. It becomes callable after the next repopulate.
    pub fn register(&mut self, command: ConCommand) {
        self.commands.add(command);
        self.repopulate_requested = true;
    }

    /// Remove all candidates named `name`, returning how many were removed.
    pub fn unregister(&mut self, name: &str) -> usize {
        let removed = self.commands.remove(name);
        if removed > 0 {
            self.repopulate_requested = true;
        }
        removed
    }

    /// Rebuild the registry at the next frame boundary.
    ///
    /// This is the way for a running command to trigger a rebuild.
    pub fn request_repopulate(&mut self) {
        self.repopulate_requested = true;
    }

    #[inline]
    pub fn is_repopulate_pending(&self) -> bool {
        self.repopulate_requested
    }

    /// Rebuild the registry from the registered candidates now.
    pub fn repopulate(&mut self) -> usize {
        self.repopulate_requested = false;
        let registry = CommandRegistry::from_commands(&self.commands);
        let count = registry.len();
        self.registry = Arc::new(registry);
        self.input.refresh_suggestions(&self.registry, true);
        debug!("Console registry rebuilt with {} commands", count);
        count
    }

    /// Per-frame housekeeping.
    ///
    /// Stamps the clock, applies a changed log capacity, runs a pending
    /// repopulate and drains queued log lines. Returns the number drained.
    pub fn begin_frame(&mut self, elapsed: Duration, frame: u64) -> usize {
        self.log.set_clock(elapsed, frame);
        self.log.apply_settings();
        if self.repopulate_requested {
            self.repopulate();
        }
        self.drain_logs()
    }

    /// Move queued log lines into the buffer.
    pub fn drain_logs(&mut self) -> usize {
        self.queue.drain_into(&mut self.log)
    }

    /// Append a line to the log directly.
    pub fn print(&mut self, severity: LogSeverity, message: &str) {
        self.log.push(severity, message, None);
    }

    /// Execute one command line.
    ///
    /// The line is echoed first, then split into name and argument text and
    /// executed. Output goes to the log: plain on success, as an error on
    /// failure and as an exception when the handler panicked.
    pub fn execute_line(
        &mut self,
        line: &str,
        targets: &mut dyn TargetEnvironment,
    ) -> ExecutionResult {
        let Some((name, args)) = split_command_line(line) else {
            return ExecutionResult {
                success: false,
                output: String::new(),
            };
        };

        self.log
            .push(LogSeverity::Log, &format!("{COMMAND_ECHO_PREFIX}{line}"), None);

        let registry = Arc::clone(&self.registry);
        let result = registry.try_execute(
            name,
            args,
            &mut CommandContext {
                session: self,
                targets,
            },
        );

        match result {
            Ok(output) => {
                if !output.is_empty() {
                    self.log.push(LogSeverity::Log, &output, None);
                }
                ExecutionResult {
                    success: true,
                    output,
                }
            }
            Err(err) => {
                let severity = match err {
                    ExecError::Panicked(_) => LogSeverity::Exception,
                    _ => LogSeverity::Error,
                };
                let output = err.to_string();
                self.log.push(severity, &output, None);
                ExecutionResult {
                    success: false,
                    output,
                }
            }
        }
    }

    /// Submit the input line, executing it if it isn't blank.
    pub fn submit_input(&mut self, targets: &mut dyn TargetEnvironment) -> Option<ExecutionResult> {
        let line = self.input.submit()?;
        Some(self.execute_line(&line, targets))
    }

    /// Forward a user edit of the input text.
    pub fn edit_input(&mut self, text: impl Into<String>) {
        self.input.on_text_edited(text, &self.registry);
    }

    /// Tab completion on the input line.
    pub fn complete_input(&mut self) -> bool {
        self.input.complete(&self.registry)
    }
}
