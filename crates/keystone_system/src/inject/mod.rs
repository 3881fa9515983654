//! Declarative field injection.
//!
//! Systems declare what they need through tagged fields; the injector fills
//! them in one sequential pass over a [`ComposedSystems`] container.
//!
//! | Tag | Field type | Receives |
//! |-----|------------|----------|
//! | `#[world]`, `#[world("name")]` | `Option<World>` | the named world |
//! | `#[pool]`, `#[pool("name")]` | `Option<Pool<T>>` | the `T` pool of the named world |
//! | `#[shared]` | `Option<F>` | the shared context, if it is an `F` |
//! | `#[inject]` | `Option<F>` | the first custom inject that is an `F` |
//!
//! Omitting the name selects the default world. Fields the injector cannot
//! match keep their current value; the only error is a tag naming a world
//! the container does not have.
//!
//! ```
//! use std::sync::Arc;
//! use keystone_system::prelude::*;
//!
//! struct Position { x: f32 }
//! struct Config { gravity: f32 }
//!
//! #[derive(Injectable)]
//! struct Physics {
//!     #[world]
//!     world: Option<World>,
//!     #[pool]
//!     positions: Option<Pool<Position>>,
//!     #[shared]
//!     config: Option<Arc<Config>>,
//!     #[inject]
//!     label: Option<Arc<str>>,
//! }
//!
//! impl System for Physics {}
//!
//! let mut systems = Systems::new(World::new()).with_shared(Arc::new(Config { gravity: 9.8 }));
//! systems.add(Physics { world: None, positions: None, config: None, label: None });
//!
//! let label: Arc<str> = Arc::from("physics");
//! systems.inject(label)?;
//!
//! let physics = systems.system::<Physics>().unwrap();
//! assert!(physics.world.is_some());
//! assert!(physics.positions.is_some());
//! assert_eq!(physics.config.as_ref().unwrap().gravity, 9.8);
//! assert_eq!(physics.label.as_deref(), Some("physics"));
//! # Ok::<(), InjectError>(())
//! ```

mod cache;
mod dependency;
mod field;
mod injector;
mod resolve;
#[doc(hidden)]
pub mod select;
mod tags;

pub use cache::{AccessorCache, BoxedPool, ComponentType, DEFAULT_CAPACITY, PoolAccessor};
pub use dependency::{Dependency, IntoDependency, Injects};
pub use field::{Field, FieldSlot, FieldVisitor, Injectable, PoolSlot, ValueSlot};
pub use injector::{
    ComposedSystems, InjectError, InjectExt, InjectionReport, InjectionScope, Injector,
    WorldLookup, with_default_injector,
};
pub use resolve::{Claim, Resolver};
pub(crate) use resolve::ResolveContext;
pub use tags::{DEFAULT_WORLD, FieldTag};
