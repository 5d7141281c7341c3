//! Terminal backend for headless/dedicated server console.
//!
//! Lines read from stdin are executed as console commands, and new log
//! entries are written to stdout once each.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use bevy::prelude::*;

use crate::core::{ConsoleInputEvent, ConsoleSession, LogBuffer, LogEntry, LogSeverity};

/// Plugin that adds terminal (stdin/stdout) console support.
pub struct TerminalPlugin;

impl Plugin for TerminalPlugin {
    fn build(&self, app: &mut App) {
        let (sender, receiver) = mpsc::channel();
        let _handle = spawn_stdin_reader(sender);

        app.insert_resource(StdinReceiver(Mutex::new(receiver)))
            .init_resource::<TerminalConfig>()
            .init_resource::<PrintedUpTo>()
            .add_systems(PreUpdate, read_stdin)
            .add_systems(Last, write_stdout);
    }
}

/// Configuration for terminal behavior.
#[derive(Resource)]
pub struct TerminalConfig {
    /// Whether to use colored output (ANSI escape codes).
    pub colored: bool,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        // Some terminals mangle ANSI escapes.
        Self { colored: false }
    }
}

#[derive(Resource)]
struct StdinReceiver(Mutex<Receiver<String>>);

/// Sequence index of the next entry to print.
#[derive(Resource, Default)]
struct PrintedUpTo(u64);

fn spawn_stdin_reader(sender: Sender<String>) -> JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        let handle = stdin.lock();

        for line in handle.lines().map_while(Result::ok) {
            let text = line.trim().to_string();
            if !text.is_empty() && sender.send(text).is_err() {
                break;
            }
        }
    })
}

fn read_stdin(mut receiver: ResMut<StdinReceiver>, mut events: MessageWriter<ConsoleInputEvent>) {
    let rx = receiver.0.get_mut().unwrap_or_else(PoisonError::into_inner);
    while let Ok(line) = rx.try_recv() {
        events.write(ConsoleInputEvent::new(line));
    }
}

/// Entries with a sequence index of at least `from`, oldest first.
fn unprinted(log: &LogBuffer, from: u64) -> impl Iterator<Item = &LogEntry> {
    let fresh: Vec<&LogEntry> = log
        .iter_newest()
        .take_while(|entry| entry.sequence() >= from)
        .collect();
    fresh.into_iter().rev()
}

fn write_stdout(
    session: Res<ConsoleSession>,
    config: Res<TerminalConfig>,
    mut printed: ResMut<PrintedUpTo>,
) {
    let log = session.log();
    if log.next_sequence() == printed.0 {
        return;
    }

    let mut stdout = io::stdout().lock();
    for entry in unprinted(log, printed.0) {
        let line = format_entry(entry, config.colored);
        if writeln!(stdout, "{}", line).is_err() {
            break;
        }
    }
    let _ = stdout.flush();
    printed.0 = log.next_sequence();
}

fn format_entry(entry: &LogEntry, colored: bool) -> String {
    let mut line = match entry.severity() {
        LogSeverity::Log => entry.message().to_string(),
        severity => format!("[{}] {}", severity, entry.message()),
    };
    if !entry.stack_trace().is_empty() {
        line.push('\n');
        line.push_str(entry.stack_trace());
    }
    if colored {
        let color = match entry.severity() {
            LogSeverity::Log => "\x1b[0m",
            LogSeverity::Warning => "\x1b[33m",
            LogSeverity::Error => "\x1b[31m",
            LogSeverity::Exception | LogSeverity::Assert => "\x1b[35m",
        };
        line = format!("{}{}\x1b[0m", color, line);
    }
    line
}
