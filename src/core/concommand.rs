//! Console command (ConCommand) candidates.
//!
//! A [`ConCommand`] describes a callable the registry may register: its name,
//! description, declared parameters, return kind and handler. Candidates live
//! in a [`CommandTable`](super::CommandTable) until the registry is
//! repopulated from it.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::binder::{CommandArgs, ParamSpec};
use super::session::CommandContext;
use super::target::{TargetPolicy, TargetType};

/// Error returned by a command handler.
///
/// Converted from any [`std::error::Error`], so handlers can use `?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl<E: std::error::Error> From<E> for CommandError {
    fn from(err: E) -> Self {
        Self::new(err.to_string())
    }
}

/// Outcome of a handler: optional output text, or an error.
pub type HandlerResult = Result<Option<String>, CommandError>;

/// Handler of a static command.
pub type StaticHandler =
    Arc<dyn Fn(&CommandArgs, &mut CommandContext<'_>) -> HandlerResult + Send + Sync>;

/// Type-erased handler of an instance command.
pub type InstanceHandler = Arc<dyn Fn(&mut dyn Any, &CommandArgs) -> HandlerResult + Send + Sync>;

/// What a command returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnKind {
    /// Nothing; any output is discarded.
    Unit,
    /// Text shown in the console.
    #[default]
    Text,
    /// Any other return type. Such commands are never registered.
    Other(&'static str),
}

/// The callable part of a command.
#[derive(Clone)]
pub enum CommandHandler {
    /// A free function with access to the console session and the targets.
    Static(StaticHandler),
    /// A function bound to instances of `target`.
    Instance {
        target: TargetType,
        policy: TargetPolicy,
        handler: InstanceHandler,
    },
}

impl CommandHandler {
    #[inline]
    pub fn is_static(&self) -> bool {
        matches!(self, CommandHandler::Static(_))
    }

    /// The target type and policy of an instance command.
    pub fn target(&self) -> Option<(TargetType, TargetPolicy)> {
        match self {
            CommandHandler::Static(_) => None,
            CommandHandler::Instance { target, policy, .. } => Some((*target, *policy)),
        }
    }
}

impl fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandHandler::Static(_) => f.write_str("Static"),
            CommandHandler::Instance { target, policy, .. } => f
                .debug_struct("Instance")
                .field("target", target)
                .field("policy", policy)
                .finish_non_exhaustive(),
        }
    }
}

/// A console command candidate.
///
/// # Examples
///
/// ```
/// use bevy_dev_console::core::{ConCommand, ParamSpec, TargetPolicy};
///
/// let greet = ConCommand::new("greet", |args, _ctx| {
///     Ok(Some(format!("hello {}", args.text(0).unwrap_or("world"))))
/// })
/// .description("Say hello")
/// .param(ParamSpec::text("name"));
///
/// struct Player { hp: i64 }
///
/// let heal = ConCommand::instance::<Player, _>("heal", TargetPolicy::UniqueLiveInstance, |player, args| {
///     player.hp += args.int(0).unwrap_or(0);
///     Ok(None)
/// })
/// .param(ParamSpec::int("amount"));
///
/// assert_eq!(greet.name(), "greet");
/// assert!(!heal.handler().is_static());
/// ```
#[derive(Clone)]
pub struct ConCommand {
    name: Box<str>,
    description: Box<str>,
    params: Vec<ParamSpec>,
    returns: ReturnKind,
    handler: CommandHandler,
}

impl ConCommand {
    /// Create a static command returning text.
    pub fn new<F>(name: impl Into<Box<str>>, handler: F) -> Self
    where
        F: Fn(&CommandArgs, &mut CommandContext<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        Self::with_handler(name, CommandHandler::Static(Arc::new(handler)))
    }

    /// Create a command bound to instances of `T`.
    ///
    /// The handler runs on the instance(s) chosen by `policy`.
    pub fn instance<T, F>(name: impl Into<Box<str>>, policy: TargetPolicy, handler: F) -> Self
    where
        T: Any,
        F: Fn(&mut T, &CommandArgs) -> HandlerResult + Send + Sync + 'static,
    {
        let target = TargetType::of::<T>();
        let erased: InstanceHandler = Arc::new(move |instance: &mut dyn Any, args: &CommandArgs| {
            match instance.downcast_mut::<T>() {
                Some(instance) => handler(instance, args),
                None => Err(CommandError::new(format!(
                    "target is not a {}",
                    target.name()
                ))),
            }
        });
        Self::with_handler(
            name,
            CommandHandler::Instance {
                target,
                policy,
                handler: erased,
            },
        )
    }

    fn with_handler(name: impl Into<Box<str>>, handler: CommandHandler) -> Self {
        Self {
            name: name.into(),
            description: "".into(),
            params: Vec::new(),
            returns: ReturnKind::default(),
            handler,
        }
    }

    /// Set the description.
    pub fn description(mut self, desc: impl Into<Box<str>>) -> Self {
        self.description = desc.into();
        self
    }

    /// Declare the next parameter.
    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Declare several parameters at once.
    pub fn params(mut self, params: impl IntoIterator<Item = ParamSpec>) -> Self {
        self.params.extend(params);
        self
    }

    /// Set the return kind.
    pub fn returns(mut self, returns: ReturnKind) -> Self {
        self.returns = returns;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn get_description(&self) -> &str {
        &self.description
    }

    #[inline]
    pub fn get_params(&self) -> &[ParamSpec] {
        &self.params
    }

    #[inline]
    pub fn get_returns(&self) -> ReturnKind {
        self.returns
    }

    #[inline]
    pub fn handler(&self) -> &CommandHandler {
        &self.handler
    }
}

impl fmt::Debug for ConCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConCommand")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .field("handler", &self.handler)
            .finish()
    }
}
