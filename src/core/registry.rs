//! Command registry.
//!
//! The registry is rebuilt wholesale from a [`CommandTable`] of candidates.
//! Lookup is case-insensitive and the first registration of a name wins.

use std::any::Any;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use bevy::prelude::*;

use super::binder::{
    ArgValue, BindError, CommandArgs, ParamKind, ParamSpec, bind, can_bind_parameters,
};
use super::concommand::{CommandHandler, ConCommand, HandlerResult, InstanceHandler, ReturnKind};
use super::session::CommandContext;
use super::target::{TargetPolicy, TargetType};

/// How the argument text of a command reaches its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgMode {
    /// A single text parameter receiving the raw argument text.
    Legacy,
    /// Tokenized and bound to the declared parameters.
    Token,
}

/// A registered command.
#[derive(Debug)]
pub struct CommandDescriptor {
    name: Box<str>,
    key: String,
    description: Box<str>,
    params: Vec<ParamSpec>,
    mode: ArgMode,
    returns: ReturnKind,
    handler: CommandHandler,
}

impl CommandDescriptor {
    fn from_candidate(candidate: &ConCommand, key: String, mode: ArgMode) -> Self {
        Self {
            name: candidate.name().into(),
            key,
            description: candidate.get_description().into(),
            params: candidate.get_params().to_vec(),
            mode,
            returns: candidate.get_returns(),
            handler: candidate.handler().clone(),
        }
    }

    /// The name as declared.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[inline]
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    #[inline]
    pub fn mode(&self) -> ArgMode {
        self.mode
    }

    #[inline]
    pub fn returns(&self) -> ReturnKind {
        self.returns
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.handler.is_static()
    }

    /// Target type and policy of an instance command.
    #[inline]
    pub fn target(&self) -> Option<(TargetType, TargetPolicy)> {
        self.handler.target()
    }

    /// One-line usage: the name followed by each parameter.
    ///
    /// ```
    /// use bevy_dev_console::core::{CommandRegistry, ConCommand, ParamSpec};
    ///
    /// let registry = CommandRegistry::from_commands(&[
    ///     ConCommand::new("spawn", |_, _| Ok(None))
    ///         .param(ParamSpec::text("kind"))
    ///         .param(ParamSpec::int("count")),
    /// ]);
    /// assert_eq!(registry.try_get("spawn").unwrap().usage(), "spawn <kind:text> <count:i32>");
    /// ```
    pub fn usage(&self) -> String {
        let mut usage = self.name.to_string();
        for param in &self.params {
            usage.push(' ');
            usage.push_str(&param.usage());
        }
        usage
    }
}

/// Why a command line could not be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// No command with that name is registered.
    UnknownCommand(String),
    /// The argument text did not bind.
    Bind(BindError),
    /// The target instance(s) could not be resolved.
    Target(String),
    /// The handler returned an error.
    Handler(String),
    /// The handler panicked.
    Panicked(String),
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::UnknownCommand(name) => write!(f, "Unknown command: '{}'", name),
            ExecError::Bind(err) => write!(f, "{}", err),
            ExecError::Target(reason) => f.write_str(reason),
            ExecError::Handler(message) => f.write_str(message),
            ExecError::Panicked(message) => write!(f, "command panicked: {}", message),
        }
    }
}

impl std::error::Error for ExecError {}

impl From<BindError> for ExecError {
    fn from(err: BindError) -> Self {
        ExecError::Bind(err)
    }
}

/// Command candidates known to the console.
///
/// This is the discovery source for [`CommandRegistry::repopulate`].
/// Candidates are kept in registration order.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    commands: Vec<ConCommand>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a candidate.
    pub fn add(&mut self, command: ConCommand) -> &mut Self {
        self.commands.push(command);
        self
    }

    /// Builder form of [`add`](Self::add).
    pub fn with(mut self, command: ConCommand) -> Self {
        self.commands.push(command);
        self
    }

    /// Remove every candidate with `name` (case-insensitive).
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.commands.len();
        let key = name.to_lowercase();
        self.commands.retain(|cmd| cmd.name().to_lowercase() != key);
        before - self.commands.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConCommand> {
        self.commands.iter()
    }
}

impl<'a> IntoIterator for &'a CommandTable {
    type Item = &'a ConCommand;
    type IntoIter = std::slice::Iter<'a, ConCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

/// Registered commands, looked up by case-insensitive name.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    by_name: HashMap<String, Arc<CommandDescriptor>>,
    sorted: Vec<Arc<CommandDescriptor>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from candidates.
    pub fn from_commands<'a>(candidates: impl IntoIterator<Item = &'a ConCommand>) -> Self {
        let mut registry = Self::new();
        registry.repopulate(candidates);
        registry
    }

    /// Replace every registration with the eligible `candidates`.
    ///
    /// Candidates are skipped when their name is empty or contains
    /// whitespace, when they return something other than text or nothing,
    /// or when a parameter type cannot be bound. A name already taken
    /// (ignoring case) keeps its first registration.
    ///
    /// Returns the number of registered commands.
    pub fn repopulate<'a>(
        &mut self,
        candidates: impl IntoIterator<Item = &'a ConCommand>,
    ) -> usize {
        self.by_name.clear();
        self.sorted.clear();

        for candidate in candidates {
            let name = candidate.name();
            if name.is_empty() || name.contains(char::is_whitespace) {
                debug!("Skipping command with invalid name '{}'", name);
                continue;
            }

            if let ReturnKind::Other(ty) = candidate.get_returns() {
                debug!("Skipping command '{}': unsupported return type '{}'", name, ty);
                continue;
            }

            let params = candidate.get_params();
            let mode = if params.len() == 1 && params[0].kind == ParamKind::Text {
                ArgMode::Legacy
            } else if can_bind_parameters(params) {
                ArgMode::Token
            } else {
                debug!("Skipping command '{}': unsupported parameter type", name);
                continue;
            };

            let key = name.to_lowercase();
            match self.by_name.entry(key) {
                Entry::Occupied(existing) => {
                    debug!(
                        "Skipping command '{}': name already registered by '{}'",
                        name,
                        existing.get().name()
                    );
                }
                Entry::Vacant(slot) => {
                    let key = slot.key().clone();
                    let descriptor =
                        Arc::new(CommandDescriptor::from_candidate(candidate, key, mode));
                    self.sorted.push(Arc::clone(&descriptor));
                    slot.insert(descriptor);
                }
            }
        }

        self.sorted
            .sort_by(|a, b| a.key.cmp(&b.key).then_with(|| a.name.cmp(&b.name)));
        self.sorted.len()
    }

    /// Look up a command, ignoring case.
    pub fn try_get(&self, name: &str) -> Option<&Arc<CommandDescriptor>> {
        self.by_name.get(&name.to_lowercase())
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.try_get(name).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// All commands, ordered by lowercased name.
    #[inline]
    pub fn sorted(&self) -> &[Arc<CommandDescriptor>] {
        &self.sorted
    }

    /// Execute `name` with the raw argument text.
    ///
    /// On success returns the command's output text, empty when the command
    /// returns nothing. Handler panics are caught and reported as
    /// [`ExecError::Panicked`]. For [`TargetPolicy::AllLiveInstances`] the
    /// first failing instance stops the fan-out.
    pub fn try_execute(
        &self,
        name: &str,
        raw_args: &str,
        ctx: &mut CommandContext<'_>,
    ) -> Result<String, ExecError> {
        let descriptor = self
            .try_get(name)
            .ok_or_else(|| ExecError::UnknownCommand(name.to_string()))?;

        let args = match descriptor.mode {
            ArgMode::Legacy => CommandArgs::new(
                raw_args,
                vec![descriptor.params[0].name.clone()],
                vec![ArgValue::Text(raw_args.to_string())],
            ),
            ArgMode::Token => bind(raw_args, &descriptor.params)?,
        };

        let output = match &descriptor.handler {
            CommandHandler::Static(handler) => {
                run_guarded(descriptor.name(), || handler(&args, ctx))?
            }
            CommandHandler::Instance {
                target,
                policy,
                handler,
            } => run_instance(descriptor.name(), *target, *policy, handler, &args, ctx)?,
        };

        Ok(match descriptor.returns {
            ReturnKind::Text => output.unwrap_or_default(),
            ReturnKind::Unit | ReturnKind::Other(_) => String::new(),
        })
    }
}

fn run_instance(
    name: &str,
    target: TargetType,
    policy: TargetPolicy,
    handler: &InstanceHandler,
    args: &CommandArgs,
    ctx: &mut CommandContext<'_>,
) -> Result<Option<String>, ExecError> {
    match policy {
        TargetPolicy::WellKnownAccessor => {
            let instance = ctx.targets.shared_instance(target).ok_or_else(|| {
                ExecError::Target(format!("no shared instance of {} is available", target.name()))
            })?;
            run_guarded(name, || handler(instance, args))
        }
        TargetPolicy::UniqueLiveInstance => {
            let mut instances = ctx.targets.live_instances(target);
            if instances.len() != 1 {
                return Err(ExecError::Target(format!(
                    "expected exactly one live instance of {}, found {}",
                    target.name(),
                    instances.len()
                )));
            }
            match instances.pop() {
                Some(instance) => run_guarded(name, || handler(instance, args)),
                None => Err(ExecError::Target(format!(
                    "no live instance of {}",
                    target.name()
                ))),
            }
        }
        TargetPolicy::AllLiveInstances => {
            let instances = ctx.targets.live_instances(target);
            let count = instances.len();
            for instance in instances {
                run_guarded(name, || handler(instance, args))?;
            }
            trace!("Command '{}' ran on {} instance(s) of {}", name, count, target.name());
            Ok(None)
        }
    }
}

/// Run a handler, converting its error or panic into an [`ExecError`].
fn run_guarded(
    name: &str,
    handler: impl FnOnce() -> HandlerResult,
) -> Result<Option<String>, ExecError> {
    match catch_unwind(AssertUnwindSafe(handler)) {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(err)) => {
            error!("Command '{}' failed: {}", name, err);
            Err(ExecError::Handler(err.to_string()))
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!("Command '{}' panicked: {}", name, message);
            Err(ExecError::Panicked(message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        CommandError, ConsoleSession, EnumKind, InstancePool, NoTargets, TargetEnvironment,
    };

    struct Player {
        hp: i64,
    }

    struct Weather {
        rain: bool,
    }

    fn execute(
        registry: &CommandRegistry,
        line: (&str, &str),
        targets: &mut dyn TargetEnvironment,
    ) -> Result<String, ExecError> {
        let mut session = ConsoleSession::default();
        let mut ctx = CommandContext {
            session: &mut session,
            targets,
        };
        registry.try_execute(line.0, line.1, &mut ctx)
    }

    fn sample_table() -> CommandTable {
        CommandTable::new()
            .with(
                ConCommand::new("say", |args, _| Ok(Some(args.text(0).unwrap_or("").to_string())))
                    .param(ParamSpec::text("message")),
            )
            .with(
                ConCommand::new("add", |args, _| {
                    let sum = args.int(0).unwrap_or(0) + args.int(1).unwrap_or(0);
                    Ok(Some(sum.to_string()))
                })
                .param(ParamSpec::int("a"))
                .param(ParamSpec::int("b").default_value(ArgValue::Int(10))),
            )
            .with(
                ConCommand::new("noop", |_, _| Ok(Some("ignored".into())))
                    .returns(ReturnKind::Unit),
            )
            .with(ConCommand::new("fail", |_, _| Err(CommandError::new("nope"))))
            .with(ConCommand::new("boom", |_, _| panic!("kaboom")))
    }

    #[test]
    fn test_repopulate_registers_and_sorts() {
        let table = sample_table()
            .with(ConCommand::new("Zeta", |_, _| Ok(None)))
            .with(ConCommand::new("alpha", |_, _| Ok(None)));
        let registry = CommandRegistry::from_commands(&table);

        let names: Vec<_> = registry.sorted().iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["add", "alpha", "boom", "fail", "noop", "say", "Zeta"]);
        assert_eq!(registry.len(), 7);
    }

    #[test]
    fn test_repopulate_skips_invalid() {
        let table = CommandTable::new()
            .with(ConCommand::new("", |_, _| Ok(None)))
            .with(ConCommand::new("two words", |_, _| Ok(None)))
            .with(ConCommand::new("vec", |_, _| Ok(None)).returns(ReturnKind::Other("Vec<u8>")))
            .with(
                ConCommand::new("weird", |_, _| Ok(None))
                    .param(ParamSpec::new("x", ParamKind::Unsupported("Vec3"))),
            )
            .with(ConCommand::new("ok", |_, _| Ok(None)));
        let registry = CommandRegistry::from_commands(&table);

        assert_eq!(registry.len(), 1);
        assert!(registry.contains("ok"));
        assert!(!registry.contains("weird"));
        assert!(!registry.contains("vec"));
    }

    #[test]
    fn test_first_registration_wins() {
        let table = CommandTable::new()
            .with(ConCommand::new("Reload", |_, _| Ok(Some("first".into()))))
            .with(ConCommand::new("reload", |_, _| Ok(Some("second".into()))));
        let registry = CommandRegistry::from_commands(&table);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.try_get("RELOAD").unwrap().name(), "Reload");
        assert_eq!(execute(&registry, ("reload", ""), &mut NoTargets).unwrap(), "first");
    }

    #[test]
    fn test_repopulate_replaces_previous() {
        let mut registry = CommandRegistry::from_commands(&sample_table());
        let table = CommandTable::new().with(ConCommand::new("only", |_, _| Ok(None)));
        assert_eq!(registry.repopulate(&table), 1);
        assert!(!registry.contains("say"));
        assert!(registry.contains("only"));
    }

    #[test]
    fn test_arg_modes() {
        let registry = CommandRegistry::from_commands(&sample_table());
        assert_eq!(registry.try_get("say").unwrap().mode(), ArgMode::Legacy);
        assert_eq!(registry.try_get("add").unwrap().mode(), ArgMode::Token);
        assert_eq!(registry.try_get("noop").unwrap().mode(), ArgMode::Token);
    }

    #[test]
    fn test_legacy_receives_raw_text() {
        let registry = CommandRegistry::from_commands(&sample_table());
        let out = execute(&registry, ("say", r#"hello   "quoted" world"#), &mut NoTargets);
        assert_eq!(out.unwrap(), r#"hello   "quoted" world"#);
    }

    #[test]
    fn test_token_binding_and_defaults() {
        let registry = CommandRegistry::from_commands(&sample_table());
        assert_eq!(execute(&registry, ("add", "1 2"), &mut NoTargets).unwrap(), "3");
        assert_eq!(execute(&registry, ("ADD", "5"), &mut NoTargets).unwrap(), "15");
        assert_eq!(
            execute(&registry, ("add", "x"), &mut NoTargets),
            Err(ExecError::Bind(BindError::InvalidValue {
                param: "a".into(),
                expected: "i32".into(),
                value: "x".into(),
            }))
        );
        assert_eq!(
            execute(&registry, ("add", "1 2 3"), &mut NoTargets),
            Err(ExecError::Bind(BindError::TooManyArguments))
        );
    }

    #[test]
    fn test_unit_return_discards_output() {
        let registry = CommandRegistry::from_commands(&sample_table());
        assert_eq!(execute(&registry, ("noop", ""), &mut NoTargets).unwrap(), "");
    }

    #[test]
    fn test_unknown_command() {
        let registry = CommandRegistry::from_commands(&sample_table());
        let err = execute(&registry, ("missing", ""), &mut NoTargets).unwrap_err();
        assert_eq!(err, ExecError::UnknownCommand("missing".into()));
        assert_eq!(err.to_string(), "Unknown command: 'missing'");
    }

    #[test]
    fn test_handler_error_and_panic() {
        let registry = CommandRegistry::from_commands(&sample_table());
        assert_eq!(
            execute(&registry, ("fail", ""), &mut NoTargets),
            Err(ExecError::Handler("nope".into()))
        );
        assert_eq!(
            execute(&registry, ("boom", ""), &mut NoTargets),
            Err(ExecError::Panicked("kaboom".into()))
        );
    }

    #[test]
    fn test_enum_parameter() {
        const MODES: &[&str] = &["Easy", "Normal", "Hard"];
        let table = CommandTable::new().with(
            ConCommand::new("difficulty", |args, _| {
                Ok(Some(format!("{:?}", args.enum_index(0))))
            })
            .param(ParamSpec::new(
                "level",
                ParamKind::Enum(EnumKind {
                    name: "Difficulty",
                    variants: MODES,
                }),
            )),
        );
        let registry = CommandRegistry::from_commands(&table);
        assert_eq!(execute(&registry, ("difficulty", "hard"), &mut NoTargets).unwrap(), "Some(2)");
        assert_eq!(execute(&registry, ("difficulty", "1"), &mut NoTargets).unwrap(), "Some(1)");
        assert!(execute(&registry, ("difficulty", "insane"), &mut NoTargets).is_err());
    }

    #[test]
    fn test_shared_instance_policy() {
        let table = CommandTable::new().with(
            ConCommand::instance::<Weather, _>("rain", TargetPolicy::WellKnownAccessor, |w, args| {
                w.rain = args.bool(0).unwrap_or(true);
                Ok(Some(format!("rain = {}", w.rain)))
            })
            .param(ParamSpec::bool("on")),
        );
        let registry = CommandRegistry::from_commands(&table);

        let mut pool = InstancePool::new();
        assert_eq!(
            execute(&registry, ("rain", "on"), &mut pool),
            Err(ExecError::Target("no shared instance of Weather is available".into()))
        );

        pool.insert_shared(Weather { rain: false });
        assert_eq!(execute(&registry, ("rain", "on"), &mut pool).unwrap(), "rain = true");
        assert!(pool.shared::<Weather>().unwrap().rain);
    }

    #[test]
    fn test_unique_instance_policy() {
        let table = CommandTable::new().with(
            ConCommand::instance::<Player, _>("heal", TargetPolicy::UniqueLiveInstance, |p, args| {
                p.hp += args.int(0).unwrap_or(0);
                Ok(Some(p.hp.to_string()))
            })
            .param(ParamSpec::int("amount")),
        );
        let registry = CommandRegistry::from_commands(&table);
        let mut pool = InstancePool::new();

        let err = execute(&registry, ("heal", "5"), &mut pool).unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected exactly one live instance of Player, found 0"
        );

        pool.spawn(Player { hp: 10 });
        assert_eq!(execute(&registry, ("heal", "5"), &mut pool).unwrap(), "15");

        pool.spawn(Player { hp: 1 });
        let err = execute(&registry, ("heal", "5"), &mut pool).unwrap_err();
        assert!(matches!(err, ExecError::Target(_)));
    }

    #[test]
    fn test_all_instances_policy() {
        let table = CommandTable::new().with(
            ConCommand::instance::<Player, _>("damage", TargetPolicy::AllLiveInstances, |p, args| {
                p.hp -= args.int(0).unwrap_or(1);
                Ok(Some("discarded".into()))
            })
            .param(ParamSpec::int("amount")),
        );
        let registry = CommandRegistry::from_commands(&table);
        let mut pool = InstancePool::new();

        // No instances is not an error.
        assert_eq!(execute(&registry, ("damage", "1"), &mut pool).unwrap(), "");

        pool.spawn(Player { hp: 10 });
        pool.spawn(Player { hp: 20 });
        assert_eq!(execute(&registry, ("damage", "3"), &mut pool).unwrap(), "");

        let hp: Vec<_> = pool.live::<Player>().map(|p| p.hp).collect();
        assert_eq!(hp, vec![7, 17]);
    }

    #[test]
    fn test_all_instances_stops_at_first_error() {
        let table = CommandTable::new().with(ConCommand::instance::<Player, _>(
            "drain",
            TargetPolicy::AllLiveInstances,
            |p, _| {
                if p.hp <= 0 {
                    return Err(CommandError::new("already dead"));
                }
                p.hp = 0;
                Ok(None)
            },
        ));
        let registry = CommandRegistry::from_commands(&table);
        let mut pool = InstancePool::new();
        pool.spawn(Player { hp: 5 });
        pool.spawn(Player { hp: 0 });
        pool.spawn(Player { hp: 9 });

        assert_eq!(
            execute(&registry, ("drain", ""), &mut pool),
            Err(ExecError::Handler("already dead".into()))
        );
        let hp: Vec<_> = pool.live::<Player>().map(|p| p.hp).collect();
        assert_eq!(hp, vec![0, 0, 9]);
    }

    #[test]
    fn test_command_table_remove() {
        let mut table = sample_table();
        let before = table.len();
        assert_eq!(table.remove("SAY"), 1);
        assert_eq!(table.len(), before - 1);
        assert_eq!(table.remove("say"), 0);
    }
}
