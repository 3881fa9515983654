//! Entity and component storage.
//!
//! This module provides the ECS storage that systems operate on:
//!
//! - [`World`] - A container of entities and their component pools
//! - [`Pool<T>`] - Typed access to one component type's storage in a world
//! - [`Entity`] - A generational entity handle
//! - [`Component`] - Marker trait for storable component types
//!
//! Both [`World`] and [`Pool<T>`] are cheap, clonable handles. Cloning a
//! handle never copies storage; two handles compare equal under
//! [`World::ptr_eq`] / [`Pool::ptr_eq`] when they point at the same storage.
//!
//! # Example
//!
//! ```
//! use keystone_system::world::World;
//!
//! struct Position { x: f32, y: f32 }
//!
//! let world = World::new();
//! let entity = world.spawn();
//!
//! let positions = world.pool::<Position>();
//! positions.add(entity, Position { x: 1.0, y: 2.0 }).unwrap();
//!
//! // Repeated lookups return a handle to the same storage.
//! assert!(world.pool::<Position>().ptr_eq(&positions));
//! assert_eq!(positions.get(entity).unwrap().x, 1.0);
//! ```

mod entity;
mod pool;
#[expect(
    clippy::module_inception,
    reason = "world.rs contains the World handle, world/mod.rs only wires the module"
)]
mod world;

pub use entity::Entity;
pub use pool::Pool;
pub use world::World;

pub(crate) use entity::EntityAllocator;
pub(crate) use pool::PoolStorage;

/// A value that can be stored in a [`Pool`].
///
/// Any type that is `Send + Sync + 'static` automatically implements `Component`.
pub trait Component: Send + Sync + 'static {}

// Blanket implementation for all compatible types
impl<T: Send + Sync + 'static> Component for T {}

/// Errors that can occur during world and pool operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// No world is registered under the requested name.
    #[error("world not found: {0:?}")]
    NotFound(String),

    /// The entity already has a component of this type.
    #[error("entity {entity} already has component {component}")]
    ComponentExists {
        /// The entity the component was added to.
        entity: Entity,
        /// The component type name.
        component: &'static str,
    },
}
