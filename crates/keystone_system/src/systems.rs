//! The composed-systems container.
//!
//! [`Systems`] owns everything an injection pass reads: the default world,
//! any number of named worlds, an optional shared context object, and the
//! ordered list of systems. It also drives the system lifecycle.
//!
//! # Lifecycle
//!
//! 1. **Compose** - register worlds, the shared context and systems
//! 2. **Inject** - populate tagged fields ([`InjectExt::inject`](crate::inject::InjectExt::inject))
//! 3. **Init** - call [`System::init`] in registration order
//! 4. **Run** - call [`System::run`] in registration order, once per tick
//! 5. **Destroy** - call [`System::destroy`] in reverse order
//!
//! ```
//! use keystone_system::prelude::*;
//!
//! #[derive(Injectable)]
//! struct Spawner {
//!     #[world("events")]
//!     events: Option<World>,
//! }
//!
//! impl System for Spawner {
//!     fn run(&mut self) -> Result<(), SystemError> {
//!         if let Some(events) = &self.events {
//!             events.spawn();
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let events = World::new();
//! let mut systems = Systems::new(World::new());
//! systems
//!     .add_world("events", events.clone())
//!     .add(Spawner { events: None });
//!
//! systems.inject(())?.init()?;
//! systems.run()?;
//! systems.run()?;
//! systems.destroy()?;
//!
//! assert_eq!(events.entity_count(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use hashbrown::HashMap;

use crate::inject::{
    ComposedSystems, DEFAULT_WORLD, Dependency, InjectionScope, IntoDependency, WorldLookup,
};
use crate::system::{BoxedSystem, IntoSystems, System, SystemError};
use crate::world::{World, WorldError};

/// Errors that can occur while driving the system lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SystemsError {
    /// [`Systems::init`] was called more than once.
    #[error("systems are already initialized")]
    AlreadyInitialized,

    /// [`Systems::run`] or [`Systems::destroy`] was called before [`Systems::init`].
    #[error("systems are not initialized")]
    NotInitialized,

    /// A lifecycle method was called after [`Systems::destroy`].
    #[error("systems have been destroyed")]
    Destroyed,

    /// A system hook returned an error.
    #[error("system {name} failed: {source}")]
    System {
        /// Name of the failing system.
        name: &'static str,
        /// The hook's error.
        #[source]
        source: SystemError,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Worlds
// ─────────────────────────────────────────────────────────────────────────────

/// The default world plus any number of named worlds.
///
/// The empty name always refers to the default world.
#[derive(Debug, Clone)]
pub struct Worlds {
    default: World,
    named: HashMap<String, World>,
}

impl Worlds {
    /// Creates a set holding only `default`.
    #[must_use]
    pub fn new(default: World) -> Self {
        Self {
            default,
            named: HashMap::new(),
        }
    }

    /// Registers `world` under `name`, returning the world it replaced.
    ///
    /// Registering under the empty name replaces the default world.
    pub fn insert(&mut self, name: impl Into<String>, world: World) -> Option<World> {
        let name = name.into();
        if name == DEFAULT_WORLD {
            return Some(core::mem::replace(&mut self.default, world));
        }
        self.named.insert(name, world)
    }

    /// Returns the world registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&World> {
        if name == DEFAULT_WORLD {
            return Some(&self.default);
        }
        self.named.get(name)
    }

    /// Returns the default world.
    #[must_use]
    pub fn default_world(&self) -> &World {
        &self.default
    }

    /// Returns the names of all named worlds, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.named.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of worlds, including the default one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.named.len() + 1
    }

    /// Always `false`; the default world is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl WorldLookup for Worlds {
    fn world(&self, name: &str) -> Result<World, WorldError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| WorldError::NotFound(name.to_owned()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Systems
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle state of a [`Systems`] container.
///
/// Progresses linearly: `Composing` → `Running` → `Destroyed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Lifecycle {
    /// Systems are being registered (initial state).
    #[default]
    Composing,
    /// [`Systems::init`] has completed.
    Running,
    /// [`Systems::destroy`] has been called.
    Destroyed,
}

/// An ordered collection of systems together with the worlds and shared
/// context they are injected from.
pub struct Systems {
    worlds: Worlds,

    /// The shared context object, injected into `#[shared]` fields.
    shared: Option<Dependency>,

    /// Systems in registration order.
    systems: Vec<BoxedSystem>,

    /// How many leading entries of `systems` have been initialized.
    ///
    /// Systems added while running are initialized before the next tick.
    initialized: usize,

    lifecycle: Lifecycle,
}

impl Systems {
    /// Creates an empty container with `world` as the default world.
    #[must_use]
    pub fn new(world: World) -> Self {
        Self {
            worlds: Worlds::new(world),
            shared: None,
            systems: Vec::new(),
            initialized: 0,
            lifecycle: Lifecycle::Composing,
        }
    }

    /// Sets the shared context object.
    #[must_use]
    pub fn with_shared(mut self, shared: impl IntoDependency) -> Self {
        self.set_shared(shared);
        self
    }

    /// Replaces the shared context object.
    pub fn set_shared(&mut self, shared: impl IntoDependency) -> &mut Self {
        let shared = shared.into_dependency();
        tracing::debug!(type_name = shared.type_name(), "set shared context");
        self.shared = Some(shared);
        self
    }

    /// Registers a named world. The empty name replaces the default world.
    pub fn add_world(&mut self, name: impl Into<String>, world: World) -> &mut Self {
        let name = name.into();
        tracing::debug!(world = %name, "added world");
        self.worlds.insert(name, world);
        self
    }

    /// Adds a system.
    ///
    /// Accepts a single [`System`] or a tuple of systems.
    pub fn add(&mut self, systems: impl IntoSystems) -> &mut Self {
        for system in systems.into_systems() {
            tracing::debug!(system = system.name(), "added system");
            self.systems.push(system);
        }
        self
    }

    /// Adds a tuple of systems. Equivalent to [`add`](Self::add).
    pub fn add_systems(&mut self, systems: impl IntoSystems) -> &mut Self {
        self.add(systems)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Access
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the world registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NotFound`] if no such world exists.
    pub fn world(&self, name: &str) -> Result<World, WorldError> {
        self.worlds.world(name)
    }

    /// Returns the default world.
    #[must_use]
    pub fn default_world(&self) -> &World {
        self.worlds.default_world()
    }

    /// Returns all registered worlds.
    #[must_use]
    pub fn worlds(&self) -> &Worlds {
        &self.worlds
    }

    /// Returns the shared context object, if any.
    #[must_use]
    pub fn shared(&self) -> Option<&Dependency> {
        self.shared.as_ref()
    }

    /// Returns all systems in registration order.
    #[must_use]
    pub fn all_systems(&self) -> &[BoxedSystem] {
        &self.systems
    }

    /// Returns the first system of type `S`.
    #[must_use]
    pub fn system<S: System>(&self) -> Option<&S> {
        self.systems
            .iter()
            .find_map(|system| system.downcast_ref::<S>())
    }

    /// Returns the first system of type `S` for writing.
    pub fn system_mut<S: System>(&mut self) -> Option<&mut S> {
        self.systems
            .iter_mut()
            .find_map(|system| system.downcast_mut::<S>())
    }

    /// Returns the number of systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Returns `true` if no systems are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Returns `true` once [`init`](Self::init) has completed and until
    /// [`destroy`](Self::destroy) is called.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Initializes every system in registration order.
    ///
    /// If a system fails, the systems before it stay initialized and the
    /// container stays in the composing state, so `init` may be retried.
    ///
    /// # Errors
    ///
    /// - [`SystemsError::AlreadyInitialized`] if called twice
    /// - [`SystemsError::Destroyed`] after [`destroy`](Self::destroy)
    /// - [`SystemsError::System`] if a system's `init` fails
    pub fn init(&mut self) -> Result<(), SystemsError> {
        match self.lifecycle {
            Lifecycle::Composing => {}
            Lifecycle::Running => return Err(SystemsError::AlreadyInitialized),
            Lifecycle::Destroyed => return Err(SystemsError::Destroyed),
        }

        self.init_pending()?;
        self.lifecycle = Lifecycle::Running;
        tracing::debug!(systems = self.systems.len(), "systems initialized");
        Ok(())
    }

    /// Runs every system once, in registration order.
    ///
    /// Systems added since the last tick are initialized first.
    ///
    /// # Errors
    ///
    /// - [`SystemsError::NotInitialized`] before [`init`](Self::init)
    /// - [`SystemsError::Destroyed`] after [`destroy`](Self::destroy)
    /// - [`SystemsError::System`] for the first failing system; later
    ///   systems do not run this tick
    pub fn run(&mut self) -> Result<(), SystemsError> {
        match self.lifecycle {
            Lifecycle::Running => {}
            Lifecycle::Composing => return Err(SystemsError::NotInitialized),
            Lifecycle::Destroyed => return Err(SystemsError::Destroyed),
        }

        self.init_pending()?;
        for system in &mut self.systems {
            system.run().map_err(|source| SystemsError::System {
                name: system.name(),
                source,
            })?;
        }
        Ok(())
    }

    /// Destroys every initialized system in reverse registration order.
    ///
    /// Every system is given the chance to clean up even if an earlier one
    /// fails; the first failure is returned.
    ///
    /// # Errors
    ///
    /// - [`SystemsError::NotInitialized`] before [`init`](Self::init)
    /// - [`SystemsError::Destroyed`] if called twice
    /// - [`SystemsError::System`] for the first failing system
    pub fn destroy(&mut self) -> Result<(), SystemsError> {
        match self.lifecycle {
            Lifecycle::Running => {}
            Lifecycle::Composing => return Err(SystemsError::NotInitialized),
            Lifecycle::Destroyed => return Err(SystemsError::Destroyed),
        }

        self.lifecycle = Lifecycle::Destroyed;
        let mut first_error = None;
        for system in self.systems[..self.initialized].iter_mut().rev() {
            if let Err(source) = system.destroy() {
                tracing::debug!(system = system.name(), error = %source, "system destroy failed");
                if first_error.is_none() {
                    first_error = Some(SystemsError::System {
                        name: system.name(),
                        source,
                    });
                }
            }
        }
        tracing::debug!(systems = self.initialized, "systems destroyed");

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn init_pending(&mut self) -> Result<(), SystemsError> {
        for system in &mut self.systems[self.initialized..] {
            system.init().map_err(|source| SystemsError::System {
                name: system.name(),
                source,
            })?;
            self.initialized += 1;
        }
        Ok(())
    }
}

impl ComposedSystems for Systems {
    fn injection_scope(&mut self) -> InjectionScope<'_> {
        InjectionScope {
            worlds: &self.worlds,
            shared: self.shared.as_ref(),
            systems: &mut self.systems,
        }
    }
}

impl core::fmt::Debug for Systems {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let names: Vec<&str> = self.systems.iter().map(|system| system.name()).collect();
        f.debug_struct("Systems")
            .field("worlds", &self.worlds)
            .field("shared", &self.shared)
            .field("systems", &names)
            .field("lifecycle", &self.lifecycle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::inject::{FieldVisitor, InjectError, Injectable};

    type Journal = Arc<Mutex<Vec<String>>>;

    struct Tracked {
        label: &'static str,
        journal: Journal,
        fail_init: bool,
        fail_destroy: bool,
    }

    impl Tracked {
        fn new(label: &'static str, journal: &Journal) -> Self {
            Self {
                label,
                journal: Arc::clone(journal),
                fail_init: false,
                fail_destroy: false,
            }
        }

        fn log(&self, hook: &str) {
            self.journal.lock().push(format!("{hook} {}", self.label));
        }
    }

    impl Injectable for Tracked {
        fn visit_fields(&mut self, _visitor: &mut dyn FieldVisitor) -> Result<(), InjectError> {
            Ok(())
        }
    }

    impl System for Tracked {
        fn name(&self) -> &'static str {
            self.label
        }

        fn init(&mut self) -> Result<(), SystemError> {
            self.log("init");
            if self.fail_init {
                return Err(SystemError::ExecutionError("init".into()));
            }
            Ok(())
        }

        fn run(&mut self) -> Result<(), SystemError> {
            self.log("run");
            Ok(())
        }

        fn destroy(&mut self) -> Result<(), SystemError> {
            self.log("destroy");
            if self.fail_destroy {
                return Err(SystemError::ExecutionError("destroy".into()));
            }
            Ok(())
        }
    }

    fn journal() -> Journal {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[test]
    fn world_lookup_handles_default_and_named() {
        let default = World::new();
        let events = World::new();
        let mut systems = Systems::new(default.clone());
        systems.add_world("events", events.clone());

        assert!(systems.world("").unwrap().ptr_eq(&default));
        assert!(systems.world("events").unwrap().ptr_eq(&events));
        assert_eq!(
            systems.world("missing").unwrap_err(),
            WorldError::NotFound("missing".into())
        );
        assert_eq!(systems.worlds().names(), vec!["events"]);
        assert_eq!(systems.worlds().len(), 2);
    }

    #[test]
    fn empty_name_replaces_default_world() {
        let replacement = World::new();
        let mut systems = Systems::new(World::new());
        systems.add_world("", replacement.clone());

        assert!(systems.default_world().ptr_eq(&replacement));
        assert!(systems.worlds().names().is_empty());
    }

    #[test]
    fn shared_context_is_stored() {
        let systems = Systems::new(World::new()).with_shared(Arc::new(7_u32));
        assert!(systems.shared().unwrap().is::<Arc<u32>>());
    }

    #[test]
    fn lifecycle_runs_in_order_and_destroys_in_reverse() {
        let journal = journal();
        let mut systems = Systems::new(World::new());
        systems.add((Tracked::new("a", &journal), Tracked::new("b", &journal)));

        systems.init().unwrap();
        systems.run().unwrap();
        systems.destroy().unwrap();

        assert_eq!(
            *journal.lock(),
            ["init a", "init b", "run a", "run b", "destroy b", "destroy a"]
        );
    }

    #[test]
    fn lifecycle_state_is_enforced() {
        let mut systems = Systems::new(World::new());

        assert_eq!(systems.run(), Err(SystemsError::NotInitialized));
        assert_eq!(systems.destroy(), Err(SystemsError::NotInitialized));

        systems.init().unwrap();
        assert!(systems.is_initialized());
        assert_eq!(systems.init(), Err(SystemsError::AlreadyInitialized));

        systems.destroy().unwrap();
        assert!(!systems.is_initialized());
        assert_eq!(systems.run(), Err(SystemsError::Destroyed));
        assert_eq!(systems.init(), Err(SystemsError::Destroyed));
        assert_eq!(systems.destroy(), Err(SystemsError::Destroyed));
    }

    #[test]
    fn failed_init_can_be_retried() {
        let journal = journal();
        let mut failing = Tracked::new("b", &journal);
        failing.fail_init = true;

        let mut systems = Systems::new(World::new());
        systems.add((Tracked::new("a", &journal), failing));

        let err = systems.init().unwrap_err();
        assert_eq!(
            err,
            SystemsError::System {
                name: "b",
                source: SystemError::ExecutionError("init".into()),
            }
        );
        assert!(!systems.is_initialized());

        systems.systems[1].downcast_mut::<Tracked>().unwrap().fail_init = false;
        systems.init().unwrap();

        assert!(systems.is_initialized());
        assert_eq!(*journal.lock(), ["init a", "init b", "init b"]);
    }

    #[test]
    fn systems_added_while_running_are_initialized_before_next_tick() {
        let journal = journal();
        let mut systems = Systems::new(World::new());
        systems.add(Tracked::new("a", &journal));
        systems.init().unwrap();

        systems.add(Tracked::new("late", &journal));
        systems.run().unwrap();

        assert_eq!(*journal.lock(), ["init a", "init late", "run a", "run late"]);
    }

    #[test]
    fn destroy_continues_after_failure() {
        let journal = journal();
        let mut failing = Tracked::new("a", &journal);
        failing.fail_destroy = true;

        let mut systems = Systems::new(World::new());
        systems.add((failing, Tracked::new("b", &journal)));
        systems.init().unwrap();

        let err = systems.destroy().unwrap_err();

        assert!(matches!(err, SystemsError::System { name: "a", .. }));
        assert_eq!(
            *journal.lock(),
            ["init a", "init b", "destroy b", "destroy a"]
        );
    }

    #[test]
    fn system_lookup_by_type() {
        let journal = journal();
        let mut systems = Systems::new(World::new());
        systems.add_systems((Tracked::new("a", &journal), Tracked::new("b", &journal)));

        assert_eq!(systems.len(), 2);
        assert!(!systems.is_empty());
        assert_eq!(systems.system::<Tracked>().unwrap().label, "a");

        systems.system_mut::<Tracked>().unwrap().label = "renamed";
        assert_eq!(systems.all_systems()[0].name(), "renamed");
    }
}
