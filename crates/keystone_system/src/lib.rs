//! Declarative dependency injection for ECS systems.
//!
//! `keystone_system` lets systems declare what they need through tagged
//! fields and fills those fields in one pass:
//!
//! - [`world`] - Entity and component storage (worlds and pools)
//! - [`mod@system`] - The `System` trait and its lifecycle hooks
//! - [`systems`] - The composed-systems container
//! - [`inject`] - Field descriptors, resolvers and the injector
//! - [`macro@Injectable`] - Derive macro generating field descriptors
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use keystone_system::prelude::*;
//!
//! struct Position { x: f32 }
//! struct Velocity { dx: f32 }
//! struct Settings { dt: f32 }
//!
//! #[derive(Injectable)]
//! struct Movement {
//!     #[pool]
//!     positions: Option<Pool<Position>>,
//!     #[pool]
//!     velocities: Option<Pool<Velocity>>,
//!     #[shared]
//!     settings: Option<Arc<Settings>>,
//! }
//!
//! impl System for Movement {
//!     fn run(&mut self) -> Result<(), SystemError> {
//!         let (Some(positions), Some(velocities), Some(settings)) =
//!             (&self.positions, &self.velocities, &self.settings)
//!         else {
//!             return Err(SystemError::ExecutionError("not injected".into()));
//!         };
//!         for entity in velocities.entities() {
//!             let dx = velocities.get(entity).map_or(0.0, |v| v.dx);
//!             if let Some(mut position) = positions.get_mut(entity) {
//!                 position.x += dx * settings.dt;
//!             }
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let world = World::new();
//! let entity = world.spawn();
//! world.pool::<Position>().add(entity, Position { x: 0.0 })?;
//! world.pool::<Velocity>().add(entity, Velocity { dx: 2.0 })?;
//!
//! let mut systems = Systems::new(world.clone()).with_shared(Arc::new(Settings { dt: 0.5 }));
//! systems.add(Movement { positions: None, velocities: None, settings: None });
//!
//! systems.inject(())?.init()?;
//! systems.run()?;
//!
//! assert_eq!(world.pool::<Position>().get(entity).unwrap().x, 1.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Self-reference so `#[derive(Injectable)]` output can use `keystone_system::`
// paths within this crate.
extern crate self as keystone_system;

/// Declarative field injection.
pub mod inject;

/// System trait and lifecycle hooks.
pub mod system;

/// Composed-systems container.
pub mod systems;

/// Entity and component storage.
pub mod world;

pub use inject::Injectable;

/// Re-export the `#[derive(Injectable)]` macro.
pub use keystone_system_macros::Injectable;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::Injectable;
    pub use crate::inject::{
        Dependency, InjectError, InjectExt, InjectionReport, Injector, IntoDependency,
    };
    pub use crate::system::{BoxedSystem, System, SystemError};
    pub use crate::systems::{Systems, SystemsError};
    pub use crate::world::{Component, Entity, Pool, World, WorldError};
}
