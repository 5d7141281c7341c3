//! Bevy world integration.
//!
//! The [`Console`] system parameter wraps the [`ConsoleSession`] resource,
//! and [`WorldTargets`] lets instance commands reach resources (the shared
//! instance of a type) and components (its live instances).

use std::any::{Any, TypeId};
use std::collections::HashMap;

use bevy::ecs::component::Mutable;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::core::{
    CommandRegistry, ConCommand, ConsoleInputEvent, ConsoleSession, ConsoleToggleEvent,
    LogBuffer, LogSeverity, TargetEnvironment, TargetType,
};

type SharedAccessor = fn(&mut World) -> Option<&mut dyn Any>;
type LiveAccessor = fn(&mut World) -> Vec<&mut dyn Any>;

/// Types instance commands may target.
///
/// A resource type acts as the well-known shared instance of its type; a
/// component type's live instances are the entities carrying it.
#[derive(Resource, Default, Clone)]
pub struct ConsoleTargets {
    shared: HashMap<TypeId, SharedAccessor>,
    live: HashMap<TypeId, LiveAccessor>,
}

impl ConsoleTargets {
    /// Expose resource `T` as the shared instance of `T`.
    pub fn expose_resource<T: Resource>(&mut self) -> &mut Self {
        self.shared.insert(TypeId::of::<T>(), shared_resource::<T>);
        self
    }

    /// Expose every entity with component `T` as a live instance of `T`.
    pub fn expose_component<T: Component<Mutability = Mutable>>(&mut self) -> &mut Self {
        self.live.insert(TypeId::of::<T>(), live_components::<T>);
        self
    }

    pub fn is_shared_exposed(&self, target: TargetType) -> bool {
        self.shared.contains_key(&target.id())
    }

    pub fn is_live_exposed(&self, target: TargetType) -> bool {
        self.live.contains_key(&target.id())
    }
}

impl std::fmt::Debug for ConsoleTargets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleTargets")
            .field("shared", &self.shared.len())
            .field("live", &self.live.len())
            .finish()
    }
}

fn shared_resource<T: Resource>(world: &mut World) -> Option<&mut dyn Any> {
    let value: &mut dyn Any = world.get_resource_mut::<T>()?.into_inner();
    Some(value)
}

fn live_components<T: Component<Mutability = Mutable>>(world: &mut World) -> Vec<&mut dyn Any> {
    let mut query = world.query::<&mut T>();
    query
        .iter_mut(world)
        .map(|component| {
            let value: &mut dyn Any = component.into_inner();
            value
        })
        .collect()
}

/// A [`TargetEnvironment`] backed by a Bevy [`World`].
pub struct WorldTargets<'w> {
    world: &'w mut World,
    targets: ConsoleTargets,
}

impl<'w> WorldTargets<'w> {
    /// Resolve targets in `world` using its [`ConsoleTargets`] resource.
    pub fn new(world: &'w mut World) -> Self {
        let targets = world
            .get_resource::<ConsoleTargets>()
            .cloned()
            .unwrap_or_default();
        Self { world, targets }
    }
}

impl TargetEnvironment for WorldTargets<'_> {
    fn shared_instance(&mut self, target: TargetType) -> Option<&mut dyn Any> {
        let accessor = *self.targets.shared.get(&target.id())?;
        accessor(self.world)
    }

    fn live_instances(&mut self, target: TargetType) -> Vec<&mut dyn Any> {
        match self.targets.live.get(&target.id()) {
            Some(accessor) => accessor(self.world),
            None => Vec::new(),
        }
    }
}

/// Console system parameter for game code.
///
/// # Examples
///
/// ```ignore
/// fn setup_console(mut console: Console) {
///     console.expose_component::<Health>();
///     console.register(
///         ConCommand::instance::<Health, _>("heal", TargetPolicy::AllLiveInstances, |hp, args| {
///             hp.0 += args.int(0).unwrap_or(10) as f32;
///             Ok(None)
///         })
///         .param(ParamSpec::int("amount").default_value(ArgValue::Int(10)))
///         .description("Heal every entity"),
///     );
///     console.execute("heal 25");
/// }
/// ```
#[derive(SystemParam)]
pub struct Console<'w> {
    session: ResMut<'w, ConsoleSession>,
    targets: ResMut<'w, ConsoleTargets>,
    lines: MessageWriter<'w, ConsoleInputEvent>,
    toggles: MessageWriter<'w, ConsoleToggleEvent>,
}

impl Console<'_> {
    /// Add a command. It becomes callable at the start of the next frame.
    pub fn register(&mut self, command: ConCommand) {
        self.session.register(command);
    }

    /// Remove a command by name.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.session.unregister(name) > 0
    }

    /// Let instance commands on `T` use resource `T`.
    pub fn expose_resource<T: Resource>(&mut self) -> &mut Self {
        self.targets.expose_resource::<T>();
        self
    }

    /// Let instance commands on `T` use entities with component `T`.
    pub fn expose_component<T: Component<Mutability = Mutable>>(&mut self) -> &mut Self {
        self.targets.expose_component::<T>();
        self
    }

    /// Queue a command line. It runs later this frame with world access.
    pub fn execute(&mut self, line: impl Into<String>) {
        self.lines.write(ConsoleInputEvent::new(line));
    }

    /// Append a line to the log.
    pub fn print(&mut self, severity: LogSeverity, message: &str) {
        self.session.print(severity, message);
    }

    /// Clear the log.
    pub fn clear(&mut self) {
        self.session.log_mut().clear();
    }

    pub fn is_open(&self) -> bool {
        self.session.is_enabled()
    }

    /// Open or close the console.
    pub fn set_open(&mut self, open: bool) {
        if self.session.set_enabled(open) {
            self.toggles.write(ConsoleToggleEvent { open });
        }
    }

    /// Flip the console open or closed, returning the new state.
    pub fn toggle(&mut self) -> bool {
        let open = self.session.toggle();
        self.toggles.write(ConsoleToggleEvent { open });
        open
    }

    pub fn log(&self) -> &LogBuffer {
        self.session.log()
    }

    pub fn registry(&self) -> &CommandRegistry {
        self.session.registry()
    }

    pub fn session(&self) -> &ConsoleSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ConsoleSession {
        &mut self.session
    }
}

/// Read-only console access.
#[derive(SystemParam)]
pub struct ConsoleRef<'w> {
    session: Res<'w, ConsoleSession>,
}

impl ConsoleRef<'_> {
    pub fn is_open(&self) -> bool {
        self.session.is_enabled()
    }

    pub fn log(&self) -> &LogBuffer {
        self.session.log()
    }

    pub fn registry(&self) -> &CommandRegistry {
        self.session.registry()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.session.registry().contains(name)
    }
}
