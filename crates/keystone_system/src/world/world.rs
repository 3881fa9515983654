//! The world handle.

use core::any::TypeId;
use core::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock};

use super::{Component, Entity, EntityAllocator, Pool, PoolStorage};

/// A container of entities and their component pools.
///
/// `World` is a cheap, clonable handle. All clones refer to the same entities
/// and pools, so a world can be handed to any number of systems without
/// copying storage.
///
/// Pools are created on first access through [`pool`](Self::pool) and live as
/// long as the world does.
#[derive(Clone, Default)]
pub struct World {
    inner: Arc<WorldInner>,
}

#[derive(Default)]
struct WorldInner {
    entities: Mutex<EntityAllocator>,
    pools: RwLock<HashMap<TypeId, Box<dyn PoolStorage>>>,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a new entity with no components.
    pub fn spawn(&self) -> Entity {
        self.inner.entities.lock().allocate()
    }

    /// Despawns an entity and drops all of its components.
    ///
    /// Returns `false` if the entity was already dead.
    pub fn despawn(&self, entity: Entity) -> bool {
        if !self.inner.entities.lock().free(entity) {
            return false;
        }

        for pool in self.inner.pools.read().values() {
            pool.remove_entity(entity);
        }
        true
    }

    /// Returns `true` if the entity is alive in this world.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.inner.entities.lock().is_alive(entity)
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.inner.entities.lock().len()
    }

    /// Returns the pool for component type `T`, creating it on first access.
    ///
    /// Every call for the same `T` returns a handle to the same storage.
    pub fn pool<T: Component>(&self) -> Pool<T> {
        let id = TypeId::of::<T>();

        if let Some(pool) = self.existing_pool::<T>() {
            return pool;
        }

        let mut pools = self.inner.pools.write();
        // Another handle may have created the pool between the two locks.
        if let Some(pool) = pools
            .get(&id)
            .and_then(|storage| storage.downcast_ref::<Pool<T>>())
        {
            return pool.clone();
        }

        let pool = Pool::<T>::new();
        pools.insert(id, Box::new(pool.clone()));
        pool
    }

    /// Returns `true` if a pool for component type `T` has been created.
    #[must_use]
    pub fn has_pool<T: Component>(&self) -> bool {
        self.inner.pools.read().contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of pools created in this world.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.inner.pools.read().len()
    }

    /// Returns `true` if both handles refer to the same world.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn existing_pool<T: Component>(&self) -> Option<Pool<T>> {
        self.inner
            .pools
            .read()
            .get(&TypeId::of::<T>())
            .and_then(|storage| storage.downcast_ref::<Pool<T>>())
            .cloned()
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entity_count())
            .field("pools", &self.pool_count())
            .finish()
    }
}
