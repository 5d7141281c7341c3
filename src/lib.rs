//! An in-game developer console for Bevy.
//!
//! bevy_dev_console provides:
//!
//! - **LogBuffer**: Bounded log ring with duplicate collapsing, severity filters and search
//! - **ConCommand**: Commands with typed, tokenized arguments and static or instance handlers
//! - **InputController**: Input line with ranked suggestions, history and tab completion
//! - **Console**: System parameter for registering and running commands from game code
//!
//! # Features
//!
//! - `egui` (default): egui overlay with log capture
//! - `capture`: route `tracing` events into the console log
//! - `terminal`: stdin/stdout backend for dedicated servers
//! - `persist`: RON settings file (`console.save`, `exec`)
//! - `full`: Enable egui + persist
//!
//! # Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_dev_console::prelude::*;
//!
//! #[derive(Component)]
//! struct Health(f32);
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins.set(bevy::log::LogPlugin {
//!             custom_layer: bevy_dev_console::logging::custom_log_layer,
//!             ..default()
//!         }))
//!         .add_plugins(ConsolePlugin::default())
//!         .add_systems(Startup, setup_console)
//!         .run();
//! }
//!
//! fn setup_console(mut console: Console) {
//!     console.expose_component::<Health>();
//!     console.register(
//!         ConCommand::instance::<Health, _>("heal", TargetPolicy::AllLiveInstances, |hp, args| {
//!             hp.0 += args.float(0).unwrap_or(10.0) as f32;
//!             Ok(None)
//!         })
//!         .param(ParamSpec::float("amount").default_value(ArgValue::Float(10.0)))
//!         .description("Heal every entity with health"),
//!     );
//! }
//! ```

use bevy::diagnostic::FrameCount;
use bevy::ecs::message::{MessageCursor, Messages};
use bevy::prelude::*;

// Core module (always available, zero optional deps)
pub mod core;
pub mod world;

// Re-export core types at crate root for convenience
pub use crate::core::{
    LogSeverity, LogEntry, LogSettings, LogFilters, LogBuffer,
    ParamKind, ParamSpec, ArgValue, CommandArgs, BindError,
    ConCommand, CommandHandler, CommandError, HandlerResult, ReturnKind,
    TargetType, TargetPolicy, TargetEnvironment, InstancePool, NoTargets,
    CommandDescriptor, CommandRegistry, CommandTable, ExecError,
    InputController, InputSettings, CommandHistory, NavMode,
    ConsoleSession, CommandContext, ExecutionResult, LogSender,
    ConsoleInputEvent, ConsolePrintEvent, ConsoleExecutedEvent, ConsoleToggleEvent,
    ConsoleClearEvent, ConsoleEventsPlugin,
};
pub use world::{Console, ConsoleRef, ConsoleTargets, WorldTargets};

// Log capture (feature-gated)
#[cfg(feature = "capture")]
pub mod logging;

// UI modules (feature-gated)
#[cfg(feature = "egui")]
pub mod config;
#[cfg(feature = "egui")]
pub mod ui;

// Terminal backend (feature-gated)
#[cfg(feature = "terminal")]
pub mod terminal;

// Persistence module (feature-gated)
#[cfg(feature = "persist")]
pub mod persist;

// Re-exports
#[cfg(feature = "egui")]
pub use config::{ConsoleConfig, ConsoleTheme};

#[cfg(feature = "persist")]
pub use persist::{ConsoleSettingsFile, ConfigPath, ConfigError};

#[cfg(feature = "terminal")]
pub use terminal::{TerminalPlugin, TerminalConfig};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::core::{
        ArgValue, CommandArgs, CommandContext, CommandError, ConCommand, ConsoleExecutedEvent,
        ConsoleInputEvent, ConsolePrintEvent, ConsoleToggleEvent, LogSeverity, ParamKind,
        ParamSpec, ReturnKind, TargetPolicy,
    };
    pub use crate::world::{Console, ConsoleRef};
    pub use crate::ConsolePlugin;
}

/// Main console plugin.
///
/// # Configuration
///
/// ```ignore
/// ConsolePlugin {
///     log_settings: LogSettings { max_entries: 5000, ..default() },
///     ..default()
/// }
/// ```
#[derive(Default)]
pub struct ConsolePlugin {
    pub log_settings: LogSettings,
    pub input_settings: InputSettings,
}

impl Plugin for ConsolePlugin {
    fn build(&self, app: &mut App) {
        // The log layer may already have created the session.
        app.init_resource::<ConsoleSession>()
            .init_resource::<ConsoleTargets>()
            .add_plugins(crate::core::ConsoleEventsPlugin);

        {
            let mut session = app.world_mut().resource_mut::<ConsoleSession>();
            *session.log_mut().settings_mut() = self.log_settings.clone();
            session.set_input_settings(self.input_settings.clone());
            register_builtin_commands(&mut session);
            #[cfg(feature = "persist")]
            persist::register_commands(&mut session);
        }

        app.world_mut()
            .resource_mut::<ConsoleTargets>()
            .expose_resource::<Time<Virtual>>()
            .expose_resource::<Messages<AppExit>>();

        // Frame pipeline:
        // 1. begin_console_frame: clock, capacity changes, deferred repopulate, log drain
        // 2. apply_console_messages: print and clear requests
        // 3. execute_console_input: run submitted lines with exclusive World access
        app.add_systems(First, begin_console_frame)
            .add_systems(Update, (apply_console_messages, execute_console_input).chain());

        // Persistence (feature-gated)
        #[cfg(feature = "persist")]
        {
            app.init_resource::<persist::ConfigPath>()
                .add_systems(PreStartup, persist::load_settings_on_startup);
            app.world_mut()
                .resource_mut::<ConsoleTargets>()
                .expose_resource::<persist::ConfigPath>();
        }

        // egui UI (feature-gated)
        #[cfg(feature = "egui")]
        {
            use bevy_egui::EguiPrimaryContextPass;
            use config::ConsoleConfig;

            app.init_resource::<ConsoleConfig>()
                .init_resource::<ui::ConsoleUiState>()
                .register_type::<ConsoleConfig>()
                .add_systems(PostStartup, ui::apply_start_open)
                .add_systems(Update, ui::open_close_ui.before(execute_console_input))
                .add_systems(
                    EguiPrimaryContextPass,
                    ui::render_ui_system.run_if(|c: ConsoleRef| c.is_open()),
                );
        }

        // Terminal backend (feature-gated)
        #[cfg(feature = "terminal")]
        {
            app.add_plugins(terminal::TerminalPlugin);
        }
    }
}

/// Severity names accepted by `log.filter`.
const SEVERITY_NAMES: &[&str] = &["Log", "Warning", "Error", "Exception", "Assert"];
/// Severities whose trace capture is configurable.
const TRACE_KIND_NAMES: &[&str] = &["Log", "Warning"];

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

/// Register built-in console commands.
pub(crate) fn register_builtin_commands(session: &mut ConsoleSession) {
    // help - Show usage of a command, or how to get started
    session.register(
        ConCommand::new("help", |args, ctx| {
            let name = args.text(0).unwrap_or("").trim();
            let registry = ctx.session.registry();
            if name.is_empty() {
                return Ok(Some(format!(
                    "{} commands available. Type 'commands' to list them, 'help <command>' for usage. \
                     Tab completes, up/down cycles suggestions or history.",
                    registry.len()
                )));
            }
            let command = registry
                .try_get(name)
                .ok_or_else(|| CommandError::new(format!("Unknown command: '{}'", name)))?;
            let description = match command.description() {
                "" => "No description",
                desc => desc,
            };
            Ok(Some(format!("{}\n  {}", command.usage(), description)))
        })
        .param(ParamSpec::text("command").default_value(ArgValue::Text(String::new())))
        .description("Show usage of a command"),
    );

    // commands - List every registered command
    session.register(
        ConCommand::new("commands", |_args, ctx| {
            let registry = ctx.session.registry();
            let mut out = format!("{} commands:", registry.len());
            for command in registry.sorted() {
                out.push_str("\n  ");
                out.push_str(command.name());
                if !command.description().is_empty() {
                    out.push_str(" - ");
                    out.push_str(command.description());
                }
            }
            Ok(Some(out))
        })
        .description("List all commands"),
    );

    // echo - Print text verbatim
    session.register(
        ConCommand::new("echo", |args, _ctx| Ok(Some(args.raw().to_string())))
            .param(ParamSpec::text("text"))
            .description("Print text to the console"),
    );

    session.register(
        ConCommand::new("clear", |_args, ctx| {
            ctx.session.log_mut().clear();
            Ok(None)
        })
        .returns(ReturnKind::Unit)
        .description("Clear console output"),
    );

    session.register(
        ConCommand::new("history", |_args, ctx| {
            let history = ctx.session.input().history();
            if history.is_empty() {
                return Ok(Some("History is empty".to_string()));
            }
            let lines: Vec<String> = history
                .iter()
                .enumerate()
                .map(|(i, line)| format!("{:>3}  {}", i + 1, line))
                .collect();
            Ok(Some(lines.join("\n")))
        })
        .description("Show submitted command lines, oldest first"),
    );

    // log.max_entries - Resize the log; applied at the next frame
    session.register(
        ConCommand::new("log.max_entries", |args, ctx| {
            let requested = args.uint(0).unwrap_or_default();
            let capacity =
                crate::core::clamp_capacity(usize::try_from(requested).unwrap_or(usize::MAX));
            ctx.session.log_mut().settings_mut().max_entries = capacity;
            Ok(Some(format!("log.max_entries = {}", capacity)))
        })
        .param(ParamSpec::new("count", ParamKind::U32))
        .description("Set how many log entries are kept"),
    );

    session.register(
        ConCommand::new("log.collapse", |args, ctx| {
            let settings = ctx.session.log_mut().settings_mut();
            if let Some(on) = args.bool(0) {
                settings.collapse_duplicates = on;
            }
            Ok(Some(format!("log.collapse = {}", on_off(settings.collapse_duplicates))))
        })
        .param(ParamSpec::optional("enabled", ParamKind::Bool))
        .description("Merge repeated log lines into one entry"),
    );

    session.register(
        ConCommand::new("log.traces", |args, ctx| {
            let kind = args.enum_index(0).unwrap_or_default();
            let settings = ctx.session.log_mut().settings_mut();
            let flag = if kind == 0 {
                &mut settings.capture_log_traces
            } else {
                &mut settings.capture_warning_traces
            };
            if let Some(on) = args.bool(1) {
                *flag = on;
            }
            Ok(Some(format!("log.traces {} = {}", TRACE_KIND_NAMES[kind], on_off(*flag))))
        })
        .param(ParamSpec::new("kind", ParamKind::enumeration("LogTraceKind", TRACE_KIND_NAMES)))
        .param(ParamSpec::optional("enabled", ParamKind::Bool))
        .description("Keep stack traces of plain logs or warnings"),
    );

    // log.filter - Show or hide a severity; toggles when no value is given
    session.register(
        ConCommand::new("log.filter", |args, ctx| {
            let severity = LogSeverity::ALL[args.enum_index(0).unwrap_or_default()];
            let filters = ctx.session.log_mut().filters_mut();
            let shown = args.bool(1).unwrap_or(!filters.shows(severity));
            filters.set_shown(severity, shown);
            Ok(Some(format!(
                "{} entries {}",
                severity,
                if shown { "shown" } else { "hidden" }
            )))
        })
        .param(ParamSpec::new("severity", ParamKind::enumeration("LogSeverity", SEVERITY_NAMES)))
        .param(ParamSpec::optional("shown", ParamKind::Bool))
        .description("Show or hide log entries of a severity"),
    );

    session.register(
        ConCommand::new("log.search", |args, ctx| {
            let search = args.raw().trim();
            ctx.session.log_mut().filters_mut().set_search(search);
            Ok(Some(if search.is_empty() {
                "Search cleared".to_string()
            } else {
                format!("Searching for '{}'", search)
            }))
        })
        .param(ParamSpec::text("text"))
        .description("Only show log entries containing text"),
    );

    session.register(
        ConCommand::new("console.reload", |_args, ctx| {
            ctx.session.request_repopulate();
            Ok(Some("Commands will be reloaded next frame".to_string()))
        })
        .description("Rebuild the command registry"),
    );

    // time.scale - Get or set the virtual clock speed
    session.register(
        ConCommand::instance::<Time<Virtual>, _>(
            "time.scale",
            TargetPolicy::WellKnownAccessor,
            |time, args| {
                if let Some(scale) = args.float(0) {
                    let scale = scale as f32;
                    if !scale.is_finite() || scale < 0.0 {
                        return Err(CommandError::new(format!(
                            "time scale must be a non-negative number, got {}",
                            scale
                        )));
                    }
                    time.set_relative_speed(scale);
                }
                Ok(Some(format!("time.scale = {}", time.relative_speed())))
            },
        )
        .param(ParamSpec::optional("scale", ParamKind::F32))
        .description("Get or set the game time scale"),
    );

    session.register(
        ConCommand::instance::<Messages<AppExit>, _>(
            "quit",
            TargetPolicy::WellKnownAccessor,
            |exit, _args| {
                exit.write(AppExit::Success);
                Ok(None)
            },
        )
        .returns(ReturnKind::Unit)
        .description("Exit the application"),
    );
}

/// Stamp the clock, apply settings changes and drain captured logs.
fn begin_console_frame(
    mut session: ResMut<ConsoleSession>,
    time: Option<Res<Time<Real>>>,
    frame: Option<Res<FrameCount>>,
) {
    let elapsed = time.map(|t| t.elapsed()).unwrap_or_default();
    let frame = frame.map(|f| u64::from(f.0)).unwrap_or_default();
    session.begin_frame(elapsed, frame);
}

/// Apply print and clear requests.
fn apply_console_messages(
    mut session: ResMut<ConsoleSession>,
    mut prints: MessageReader<ConsolePrintEvent>,
    mut clears: MessageReader<ConsoleClearEvent>,
) {
    if clears.read().count() > 0 {
        session.log_mut().clear();
    }
    for print in prints.read() {
        session.print(print.severity, &print.message);
    }
}

/// Exclusive system that executes submitted lines with full World access.
fn execute_console_input(world: &mut World, mut cursor: Local<MessageCursor<ConsoleInputEvent>>) {
    let lines: Vec<String> = {
        let messages = world.resource::<Messages<ConsoleInputEvent>>();
        cursor.read(messages).map(|event| event.line.clone()).collect()
    };
    if lines.is_empty() {
        return;
    }

    let executed = world.resource_scope(|world, mut session: Mut<ConsoleSession>| {
        let mut targets = WorldTargets::new(world);
        lines
            .into_iter()
            .map(|line| {
                let result = session.execute_line(&line, &mut targets);
                ConsoleExecutedEvent { line, result }
            })
            .collect::<Vec<_>>()
    });

    for event in executed {
        world.write_message(event);
    }
}
