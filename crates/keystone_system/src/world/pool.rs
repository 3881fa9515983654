//! Typed component pools.

use core::fmt;
use std::sync::Arc;

use downcast_rs::{DowncastSync, impl_downcast};
use hashbrown::HashMap;
use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use super::{Component, Entity, WorldError};

/// Typed access to the storage of one component type inside a world.
///
/// A `Pool<T>` is obtained from [`World::pool`](super::World::pool) and is a
/// cheap handle: clones share the same storage. Access goes through RAII
/// guards backed by a `RwLock`, so a pool may be read from several places at
/// once but written from only one.
///
/// # Example
///
/// ```
/// use keystone_system::world::World;
///
/// struct Health(u32);
///
/// let world = World::new();
/// let entity = world.spawn();
/// let health = world.pool::<Health>();
///
/// health.add(entity, Health(10)).unwrap();
/// health.get_mut(entity).unwrap().0 -= 3;
///
/// assert_eq!(health.get(entity).unwrap().0, 7);
/// ```
pub struct Pool<T: Component> {
    storage: Arc<RwLock<HashMap<Entity, T>>>,
}

impl<T: Component> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<T: Component> Pool<T> {
    /// Creates an empty, unattached pool.
    pub(crate) fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Adds a component to an entity.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ComponentExists`] if the entity already has a
    /// component of this type.
    pub fn add(&self, entity: Entity, component: T) -> Result<(), WorldError> {
        let mut storage = self.storage.write();
        if storage.contains_key(&entity) {
            return Err(WorldError::ComponentExists {
                entity,
                component: core::any::type_name::<T>(),
            });
        }
        storage.insert(entity, component);
        Ok(())
    }

    /// Inserts or replaces a component, returning the previous value.
    pub fn set(&self, entity: Entity, component: T) -> Option<T> {
        self.storage.write().insert(entity, component)
    }

    /// Returns `true` if the entity has a component of this type.
    #[must_use]
    pub fn has(&self, entity: Entity) -> bool {
        self.storage.read().contains_key(&entity)
    }

    /// Borrows an entity's component immutably.
    ///
    /// Returns `None` if the entity has no component of this type.
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<MappedRwLockReadGuard<'_, T>> {
        RwLockReadGuard::try_map(self.storage.read(), |storage| storage.get(&entity)).ok()
    }

    /// Borrows an entity's component mutably.
    ///
    /// Returns `None` if the entity has no component of this type.
    #[must_use]
    pub fn get_mut(&self, entity: Entity) -> Option<MappedRwLockWriteGuard<'_, T>> {
        RwLockWriteGuard::try_map(self.storage.write(), |storage| storage.get_mut(&entity)).ok()
    }

    /// Removes an entity's component and returns it.
    pub fn remove(&self, entity: Entity) -> Option<T> {
        self.storage.write().remove(&entity)
    }

    /// Returns the entities that have this component, in ascending order.
    #[must_use]
    pub fn entities(&self) -> Vec<Entity> {
        let mut entities: Vec<Entity> = self.storage.read().keys().copied().collect();
        entities.sort_unstable();
        entities
    }

    /// Returns the number of stored components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.read().len()
    }

    /// Returns `true` if no components are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.read().is_empty()
    }

    /// Returns `true` if both handles point at the same storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }
}

impl<T: Component> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("component", &core::any::type_name::<T>())
            .field("len", &self.len())
            .finish()
    }
}

/// Type-erased pool, as stored in a world's pool table.
pub(crate) trait PoolStorage: DowncastSync {
    /// Drops the entity's component, if any.
    fn remove_entity(&self, entity: Entity);
}

impl_downcast!(sync PoolStorage);

impl<T: Component> PoolStorage for Pool<T> {
    fn remove_entity(&self, entity: Entity) {
        self.remove(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::EntityAllocator;

    #[derive(Debug, PartialEq)]
    struct Position {
        x: i32,
    }

    fn entities(count: usize) -> Vec<Entity> {
        let mut allocator = EntityAllocator::default();
        (0..count).map(|_| allocator.allocate()).collect()
    }

    #[test]
    fn add_and_get() {
        let pool = Pool::<Position>::new();
        let a = entities(1)[0];

        pool.add(a, Position { x: 3 }).unwrap();

        assert!(pool.has(a));
        assert_eq!(*pool.get(a).unwrap(), Position { x: 3 });
    }

    #[test]
    fn add_twice_fails() {
        let pool = Pool::<Position>::new();
        let a = entities(1)[0];

        pool.add(a, Position { x: 1 }).unwrap();
        let result = pool.add(a, Position { x: 2 });

        assert!(matches!(result, Err(WorldError::ComponentExists { .. })));
        assert_eq!(pool.get(a).unwrap().x, 1);
    }

    #[test]
    fn set_replaces() {
        let pool = Pool::<Position>::new();
        let a = entities(1)[0];

        assert!(pool.set(a, Position { x: 1 }).is_none());
        assert_eq!(pool.set(a, Position { x: 2 }), Some(Position { x: 1 }));
    }

    #[test]
    fn get_mut_modifies() {
        let pool = Pool::<Position>::new();
        let a = entities(1)[0];
        pool.add(a, Position { x: 1 }).unwrap();

        pool.get_mut(a).unwrap().x += 10;

        assert_eq!(pool.get(a).unwrap().x, 11);
    }

    #[test]
    fn missing_component_is_none() {
        let pool = Pool::<Position>::new();
        let a = entities(1)[0];

        assert!(pool.get(a).is_none());
        assert!(pool.get_mut(a).is_none());
        assert!(pool.remove(a).is_none());
    }

    #[test]
    fn clones_share_storage() {
        let pool = Pool::<Position>::new();
        let other = pool.clone();
        let a = entities(1)[0];

        other.add(a, Position { x: 5 }).unwrap();

        assert!(pool.ptr_eq(&other));
        assert_eq!(pool.len(), 1);
        assert!(!pool.ptr_eq(&Pool::new()));
    }

    #[test]
    fn entities_are_sorted() {
        let pool = Pool::<Position>::new();
        let all = entities(3);
        for entity in all.iter().rev() {
            pool.add(*entity, Position { x: 0 }).unwrap();
        }

        assert_eq!(pool.entities(), all);
    }

    #[test]
    fn erased_storage_removes_and_downcasts() {
        let pool = Pool::<Position>::new();
        let a = entities(1)[0];
        pool.add(a, Position { x: 1 }).unwrap();

        let erased: Box<dyn PoolStorage> = Box::new(pool.clone());
        erased.remove_entity(a);

        assert!(pool.is_empty());
        assert!(erased.downcast_ref::<Pool<Position>>().is_some());
        assert!(erased.downcast_ref::<Pool<u8>>().is_none());
    }
}
