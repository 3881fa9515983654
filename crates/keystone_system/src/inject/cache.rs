//! Pool accessor cache.
//!
//! Fetching a pool from a world is generic over the component type. A pool
//! field only knows its component type at runtime (as a [`ComponentType`]),
//! so the injector binds a [`PoolAccessor`] for that type once and reuses it
//! for every later field requesting the same component, in any world.
//!
//! The cache is append-only: entries are never evicted or invalidated.
//! It has no internal locking; the owning [`Injector`](super::Injector)
//! takes `&mut self` for population, so concurrent first-time resolution
//! cannot happen without external serialization.

use core::any::{Any, TypeId};
use core::fmt;
use core::hash::{Hash, Hasher};

use hashbrown::HashMap;

use crate::world::{Component, World};

/// A type-erased pool, as returned by a [`PoolAccessor`].
pub type BoxedPool = Box<dyn Any + Send + Sync>;

/// Fetches the pool for one component type from a world.
pub type PoolAccessor = fn(&World) -> BoxedPool;

/// Capacity reserved by [`AccessorCache::new`].
pub const DEFAULT_CAPACITY: usize = 256;

/// Runtime description of a component type.
///
/// Carries the binding step that produces the [`PoolAccessor`] for the
/// component; the cache runs that step at most once per type.
#[derive(Clone, Copy)]
pub struct ComponentType {
    id: TypeId,
    name: &'static str,
    resolve: fn() -> PoolAccessor,
}

impl ComponentType {
    /// Describes component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
            resolve: bind_accessor::<T>,
        }
    }

    /// Returns the component's `TypeId`.
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the component's type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentType {}

impl Hash for ComponentType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentType").field(&self.name).finish()
    }
}

fn bind_accessor<T: Component>() -> PoolAccessor {
    fetch_pool::<T>
}

fn fetch_pool<T: Component>(world: &World) -> BoxedPool {
    Box::new(world.pool::<T>())
}

/// Memoized pool accessors, keyed by component type.
pub struct AccessorCache {
    accessors: HashMap<TypeId, PoolAccessor>,
    resolutions: usize,
}

impl Default for AccessorCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessorCache {
    /// Creates an empty cache with [`DEFAULT_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty cache with room for `capacity` component types.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            accessors: HashMap::with_capacity(capacity),
            resolutions: 0,
        }
    }

    /// Returns the accessor for `component`, binding it on first request.
    pub fn accessor(&mut self, component: &ComponentType) -> PoolAccessor {
        if let Some(accessor) = self.accessors.get(&component.id) {
            return *accessor;
        }

        let accessor = (component.resolve)();
        self.resolutions += 1;
        self.accessors.insert(component.id, accessor);
        tracing::debug!(
            component = component.name,
            cached = self.accessors.len(),
            "bound pool accessor"
        );
        accessor
    }

    /// Returns `true` if an accessor for `component` is cached.
    #[must_use]
    pub fn contains(&self, component: &ComponentType) -> bool {
        self.accessors.contains_key(&component.id)
    }

    /// Returns the number of cached accessors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }

    /// Returns how many times an accessor was bound.
    ///
    /// Equals [`len`](Self::len), since each component type is bound once.
    #[must_use]
    pub fn resolutions(&self) -> usize {
        self.resolutions
    }
}

impl fmt::Debug for AccessorCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorCache")
            .field("len", &self.accessors.len())
            .field("resolutions", &self.resolutions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Pool;

    struct Position;
    struct Velocity;

    #[test]
    fn first_request_binds_accessor() {
        let mut cache = AccessorCache::new();
        let position = ComponentType::of::<Position>();

        assert!(!cache.contains(&position));
        let _ = cache.accessor(&position);

        assert!(cache.contains(&position));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.resolutions(), 1);
    }

    #[test]
    fn repeated_requests_reuse_binding() {
        let mut cache = AccessorCache::new();
        let position = ComponentType::of::<Position>();

        for _ in 0..5 {
            let _ = cache.accessor(&position);
        }

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.resolutions(), 1);
    }

    #[test]
    fn distinct_types_bind_separately() {
        let mut cache = AccessorCache::with_capacity(4);

        let _ = cache.accessor(&ComponentType::of::<Position>());
        let _ = cache.accessor(&ComponentType::of::<Velocity>());
        let _ = cache.accessor(&ComponentType::of::<Position>());

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.resolutions(), 2);
    }

    #[test]
    fn accessor_fetches_pool_from_given_world() {
        let mut cache = AccessorCache::new();
        let accessor = cache.accessor(&ComponentType::of::<Position>());

        let a = World::new();
        let b = World::new();
        let from_a = accessor(&a).downcast::<Pool<Position>>().unwrap();
        let from_b = accessor(&b).downcast::<Pool<Position>>().unwrap();

        assert!(from_a.ptr_eq(&a.pool::<Position>()));
        assert!(from_b.ptr_eq(&b.pool::<Position>()));
        assert!(!from_a.ptr_eq(&from_b));
    }

    #[test]
    fn component_type_equality_by_id() {
        assert_eq!(
            ComponentType::of::<Position>(),
            ComponentType::of::<Position>()
        );
        assert_ne!(
            ComponentType::of::<Position>(),
            ComponentType::of::<Velocity>()
        );
        assert!(ComponentType::of::<Position>().name().contains("Position"));
    }
}
