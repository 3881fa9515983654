//! The injection engine.

use core::cell::RefCell;

use super::{AccessorCache, Claim, Dependency, Field, FieldVisitor, Injects, ResolveContext, Resolver};
use crate::system::BoxedSystem;
use crate::world::{World, WorldError};

/// Errors that can occur during injection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InjectError {
    /// A tagged field named a world the collaborator could not provide.
    #[error("system {system} field `{field}`: {source}")]
    World {
        /// Name of the system being injected.
        system: &'static str,
        /// Name of the field being resolved.
        field: &'static str,
        /// The lookup failure.
        #[source]
        source: WorldError,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Collaborator seam
// ─────────────────────────────────────────────────────────────────────────────

/// Resolves worlds by name.
///
/// The empty name ([`DEFAULT_WORLD`](super::DEFAULT_WORLD)) denotes the
/// default world. Failure behavior is up to the implementor; the engine
/// propagates it unchanged.
pub trait WorldLookup {
    /// Returns the world registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NotFound`] if no such world exists.
    fn world(&self, name: &str) -> Result<World, WorldError>;
}

/// Everything the engine needs from a composed-systems container for one pass.
pub struct InjectionScope<'a> {
    /// World lookup by name.
    pub worlds: &'a dyn WorldLookup,
    /// The shared context object, if any.
    pub shared: Option<&'a Dependency>,
    /// The systems, in injection order.
    pub systems: &'a mut [BoxedSystem],
}

/// A container whose systems can be injected.
pub trait ComposedSystems {
    /// Splits the container into the parts an injection pass reads and writes.
    fn injection_scope(&mut self) -> InjectionScope<'_>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Injector
// ─────────────────────────────────────────────────────────────────────────────

/// Summary of one injection pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InjectionReport {
    /// Systems visited.
    pub systems: usize,
    /// Fields visited across all systems.
    pub fields: usize,
    /// Fields that received a value.
    pub assigned: usize,
    /// Fields claimed by a resolver but left untouched.
    pub claimed: usize,
    /// Fields no resolver claimed.
    pub unclaimed: usize,
}

impl InjectionReport {
    fn record(&mut self, claim: Claim) {
        match claim {
            Claim::Assigned => self.assigned += 1,
            Claim::Claimed => self.claimed += 1,
            Claim::Unclaimed => self.unclaimed += 1,
        }
    }
}

/// Populates tagged system fields from worlds, pools, the shared context and
/// custom injects.
///
/// The injector owns the accessor cache, so reusing one injector across
/// passes binds each component type only once. Most callers go through
/// [`InjectExt::inject`], which uses a per-thread default injector.
///
/// # Example
///
/// ```
/// use keystone_system::prelude::*;
///
/// struct Position(f32);
///
/// #[derive(Injectable)]
/// struct Movement {
///     #[pool]
///     positions: Option<Pool<Position>>,
/// }
///
/// impl System for Movement {}
///
/// let mut systems = Systems::new(World::new());
/// systems.add(Movement { positions: None });
///
/// let mut injector = Injector::new();
/// let report = injector.inject(&mut systems, ()).unwrap();
///
/// assert_eq!(report.assigned, 1);
/// assert!(systems.system::<Movement>().unwrap().positions.is_some());
/// ```
#[derive(Debug, Default)]
pub struct Injector {
    cache: AccessorCache,
}

impl Injector {
    /// Creates an injector with a default-sized cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an injector whose cache has room for `capacity` component types.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: AccessorCache::with_capacity(capacity),
        }
    }

    /// Returns the accessor cache.
    #[must_use]
    pub fn cache(&self) -> &AccessorCache {
        &self.cache
    }

    /// Runs one injection pass over every system in `systems`.
    ///
    /// Systems are visited in order and fields in declaration order. Each
    /// field is offered to the resolvers in [`Resolver::ORDER`] until one
    /// claims it. Fields that match no resolver, or whose type matches no
    /// candidate value, are left as they are.
    ///
    /// # Errors
    ///
    /// Returns [`InjectError::World`] if a tagged field names a world the
    /// container cannot provide. Fields visited before the failure keep the
    /// values they received.
    pub fn inject<S>(
        &mut self,
        systems: &mut S,
        injects: impl Injects,
    ) -> Result<InjectionReport, InjectError>
    where
        S: ComposedSystems + ?Sized,
    {
        let injects = injects.into_dependencies();
        let scope = systems.injection_scope();
        let mut ctx = ResolveContext {
            worlds: scope.worlds,
            shared: scope.shared,
            injects: &injects,
            cache: &mut self.cache,
        };
        let mut report = InjectionReport::default();

        for system in scope.systems.iter_mut() {
            let name = system.name();
            let mut resolver = FieldResolver {
                system: name,
                ctx: &mut ctx,
                report: &mut report,
            };
            system.visit_fields(&mut resolver)?;
            report.systems += 1;
            tracing::debug!(system = name, "injected system");
        }

        tracing::debug!(
            systems = report.systems,
            fields = report.fields,
            assigned = report.assigned,
            claimed = report.claimed,
            unclaimed = report.unclaimed,
            injects = injects.len(),
            "injection pass complete"
        );
        Ok(report)
    }
}

/// Offers each visited field to the resolvers in order.
struct FieldResolver<'r, 'c> {
    system: &'static str,
    ctx: &'r mut ResolveContext<'c>,
    report: &'r mut InjectionReport,
}

impl FieldVisitor for FieldResolver<'_, '_> {
    fn visit_field(&mut self, mut field: Field<'_>) -> Result<(), InjectError> {
        let name = field.name();
        self.report.fields += 1;

        for resolver in Resolver::ORDER {
            let claim = resolver
                .resolve(&mut field, &mut *self.ctx)
                .map_err(|source| InjectError::World {
                    system: self.system,
                    field: name,
                    source,
                })?;

            if claim.is_claimed() {
                tracing::trace!(
                    system = self.system,
                    field = name,
                    ?resolver,
                    ?claim,
                    "field claimed"
                );
                self.report.record(claim);
                return Ok(());
            }
        }

        tracing::trace!(
            system = self.system,
            field = name,
            type_name = field.slot().type_name(),
            "field unclaimed"
        );
        self.report.record(Claim::Unclaimed);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Default injector
// ─────────────────────────────────────────────────────────────────────────────

thread_local! {
    static DEFAULT_INJECTOR: RefCell<Injector> = RefCell::new(Injector::new());
}

/// Runs `f` with this thread's default injector.
///
/// The default injector, and its accessor cache, lives as long as the thread.
///
/// # Panics
///
/// Panics if called from within `f` itself.
pub fn with_default_injector<R>(f: impl FnOnce(&mut Injector) -> R) -> R {
    DEFAULT_INJECTOR.with_borrow_mut(f)
}

/// Fluent injection on any [`ComposedSystems`].
///
/// ```
/// use keystone_system::prelude::*;
///
/// #[derive(Injectable)]
/// struct Tick {
///     #[world]
///     world: Option<World>,
/// }
///
/// impl System for Tick {}
///
/// let mut systems = Systems::new(World::new());
/// systems.add(Tick { world: None });
/// systems.inject(())?.init()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait InjectExt: ComposedSystems {
    /// Injects every system using the thread's default injector.
    ///
    /// # Errors
    ///
    /// See [`Injector::inject`].
    fn inject(&mut self, injects: impl Injects) -> Result<&mut Self, InjectError>;
}

impl<S: ComposedSystems + ?Sized> InjectExt for S {
    fn inject(&mut self, injects: impl Injects) -> Result<&mut Self, InjectError> {
        with_default_injector(|injector| injector.inject(&mut *self, injects))?;
        Ok(self)
    }
}
