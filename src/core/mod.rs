//! Core console types with zero optional dependencies.
//!
//! This module provides the fundamental building blocks:
//! - [`LogBuffer`] - Bounded log ring with duplicate collapsing and filters
//! - [`tokenize`] and [`bind`] - Argument tokenizer and typed binder
//! - [`ConCommand`] - Command candidates with static or instance handlers
//! - [`CommandRegistry`] - Case-insensitive registry and command execution
//! - [`InputController`] - Input line with suggestions, history and completion
//! - [`ConsoleSession`] - Everything above, driven once per frame
//! - Messages for communication between layers

mod log_buffer;
mod tokenizer;
mod binder;
mod concommand;
mod target;
mod registry;
mod matcher;
mod input;
mod session;
mod events;

pub use log_buffer::{
    LogSeverity, LogEntry, LogSettings, LogFilters, LogBuffer, clamp_capacity,
    MIN_LOG_ENTRIES, MAX_LOG_ENTRIES, DEFAULT_LOG_ENTRIES,
};
pub use tokenizer::{tokenize, get_remainder, split_command_line, first_token, first_token_range};
pub use binder::{
    ParamKind, EnumKind, ParamSpec, ArgValue, CommandArgs, BindError, can_bind_parameters, bind,
};
pub use concommand::{
    ConCommand, CommandHandler, CommandError, HandlerResult, ReturnKind, StaticHandler,
    InstanceHandler,
};
pub use target::{TargetType, TargetPolicy, TargetEnvironment, InstancePool, NoTargets};
pub use registry::{CommandDescriptor, ArgMode, CommandRegistry, CommandTable, ExecError};
pub use matcher::{
    compare_matches, match_and_sort, match_command, MatchKind, MatchResult, SEPARATORS,
};
pub use input::{
    InputController, InputSettings, CommandHistory, NavMode, Suggestion, TextSync,
    MAX_SUGGESTIONS, DEFAULT_HISTORY_CAPACITY,
};
pub use session::{
    ConsoleSession, CommandContext, ExecutionResult, LogQueue, LogSender, RawLog,
    COMMAND_ECHO_PREFIX,
};
pub use events::{
    ConsoleInputEvent, ConsolePrintEvent, ConsoleExecutedEvent, ConsoleToggleEvent,
    ConsoleClearEvent, ConsoleEventsPlugin,
};
