//! Target resolution for instance commands.
//!
//! A command can be bound to a type instead of being a free function. When it
//! runs, the registry asks a [`TargetEnvironment`] for the instance(s) of that
//! type according to the command's [`TargetPolicy`].

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// The declaring type of an instance command.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetType {
    id: TypeId,
    name: &'static str,
}

impl TargetType {
    /// Describe the type `T`.
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: short_type_name(std::any::type_name::<T>()),
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Short type name for messages.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TargetType").field(&self.name).finish()
    }
}

/// Strip the module path, keeping generic arguments intact.
fn short_type_name(full: &'static str) -> &'static str {
    let base_end = full.find('<').unwrap_or(full.len());
    match full[..base_end].rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}

/// How the target of an instance command is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPolicy {
    /// A single shared instance reachable through a well-known accessor.
    WellKnownAccessor,
    /// Exactly one live instance must exist.
    UniqueLiveInstance,
    /// Run on every live instance; return values are discarded.
    AllLiveInstances,
}

impl TargetPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            TargetPolicy::WellKnownAccessor => "shared",
            TargetPolicy::UniqueLiveInstance => "unique",
            TargetPolicy::AllLiveInstances => "all",
        }
    }
}

/// Source of command targets.
///
/// Implemented by the host: [`InstancePool`] for plain Rust hosts and tests,
/// and a world-backed implementation for Bevy apps.
pub trait TargetEnvironment {
    /// The shared instance of `target`, if one is exposed.
    fn shared_instance(&mut self, target: TargetType) -> Option<&mut dyn Any>;

    /// All live instances of `target`, in discovery order.
    fn live_instances(&mut self, target: TargetType) -> Vec<&mut dyn Any>;
}

/// An environment without any targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTargets;

impl TargetEnvironment for NoTargets {
    fn shared_instance(&mut self, _target: TargetType) -> Option<&mut dyn Any> {
        None
    }

    fn live_instances(&mut self, _target: TargetType) -> Vec<&mut dyn Any> {
        Vec::new()
    }
}

/// In-memory [`TargetEnvironment`].
///
/// # Examples
///
/// ```
/// use bevy_dev_console::core::{InstancePool, TargetEnvironment, TargetType};
///
/// struct Enemy { hp: u32 }
///
/// let mut pool = InstancePool::new();
/// pool.spawn(Enemy { hp: 10 });
/// pool.spawn(Enemy { hp: 20 });
///
/// assert_eq!(pool.live_instances(TargetType::of::<Enemy>()).len(), 2);
/// assert_eq!(pool.live::<Enemy>().map(|e| e.hp).sum::<u32>(), 30);
/// ```
#[derive(Default)]
pub struct InstancePool {
    shared: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    live: HashMap<TypeId, Vec<Box<dyn Any + Send + Sync>>>,
}

impl InstancePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose `value` as the shared instance of its type, replacing any previous one.
    pub fn insert_shared<T: Any + Send + Sync>(&mut self, value: T) {
        self.shared.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Remove the shared instance of `T`.
    pub fn remove_shared<T: Any + Send + Sync>(&mut self) -> Option<T> {
        self.shared
            .remove(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    /// Get the shared instance of `T`.
    pub fn shared<T: Any>(&self) -> Option<&T> {
        self.shared.get(&TypeId::of::<T>())?.downcast_ref()
    }

    /// Add a live instance.
    pub fn spawn<T: Any + Send + Sync>(&mut self, value: T) {
        self.live
            .entry(TypeId::of::<T>())
            .or_default()
            .push(Box::new(value));
    }

    /// Remove every live instance of `T`, returning how many were removed.
    pub fn despawn_all<T: Any>(&mut self) -> usize {
        self.live
            .remove(&TypeId::of::<T>())
            .map_or(0, |instances| instances.len())
    }

    /// Iterate over live instances of `T`.
    pub fn live<T: Any>(&self) -> impl Iterator<Item = &T> {
        self.live
            .get(&TypeId::of::<T>())
            .into_iter()
            .flatten()
            .filter_map(|boxed| boxed.downcast_ref::<T>())
    }
}

impl TargetEnvironment for InstancePool {
    fn shared_instance(&mut self, target: TargetType) -> Option<&mut dyn Any> {
        let boxed = self.shared.get_mut(&target.id())?;
        let instance: &mut dyn Any = &mut **boxed;
        Some(instance)
    }

    fn live_instances(&mut self, target: TargetType) -> Vec<&mut dyn Any> {
        match self.live.get_mut(&target.id()) {
            Some(instances) => instances
                .iter_mut()
                .map(|boxed| {
                    let instance: &mut dyn Any = &mut **boxed;
                    instance
                })
                .collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Player(u32);

    struct Settings;

    #[test]
    fn test_target_type_name() {
        assert_eq!(TargetType::of::<Player>().name(), "Player");
        assert_eq!(TargetType::of::<Vec<u8>>().name(), "Vec<u8>");
        assert_eq!(TargetType::of::<u32>().name(), "u32");
    }

    #[test]
    fn test_pool_shared() {
        let mut pool = InstancePool::new();
        assert!(pool.shared_instance(TargetType::of::<Settings>()).is_none());

        pool.insert_shared(Player(1));
        let instance = pool.shared_instance(TargetType::of::<Player>()).unwrap();
        instance.downcast_mut::<Player>().unwrap().0 = 5;
        assert_eq!(pool.shared::<Player>(), Some(&Player(5)));

        assert_eq!(pool.remove_shared::<Player>(), Some(Player(5)));
        assert!(pool.shared::<Player>().is_none());
    }

    #[test]
    fn test_pool_live_instances_in_order() {
        let mut pool = InstancePool::new();
        pool.spawn(Player(1));
        pool.spawn(Player(2));
        pool.spawn(Player(3));

        for instance in pool.live_instances(TargetType::of::<Player>()) {
            instance.downcast_mut::<Player>().unwrap().0 *= 10;
        }

        let values: Vec<_> = pool.live::<Player>().map(|p| p.0).collect();
        assert_eq!(values, vec![10, 20, 30]);
        assert_eq!(pool.despawn_all::<Player>(), 3);
        assert!(pool.live_instances(TargetType::of::<Player>()).is_empty());
    }

    #[test]
    fn test_no_targets() {
        let mut env = NoTargets;
        assert!(env.shared_instance(TargetType::of::<Player>()).is_none());
        assert!(env.live_instances(TargetType::of::<Player>()).is_empty());
    }
}
