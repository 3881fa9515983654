//! System primitives.
//!
//! A system is a plain struct whose tagged fields are filled by the
//! [injector](crate::inject) and whose lifecycle hooks are driven by
//! [`Systems`](crate::systems::Systems).
//!
//! # Example
//!
//! ```
//! use keystone_system::prelude::*;
//!
//! struct Health(u32);
//!
//! #[derive(Injectable)]
//! struct Regeneration {
//!     #[pool]
//!     health: Option<Pool<Health>>,
//!     ticks: u64,
//! }
//!
//! impl System for Regeneration {
//!     fn run(&mut self) -> Result<(), SystemError> {
//!         let health = self
//!             .health
//!             .as_ref()
//!             .ok_or_else(|| SystemError::ExecutionError("health pool missing".into()))?;
//!         for entity in health.entities() {
//!             if let Some(mut hp) = health.get_mut(entity) {
//!                 hp.0 += 1;
//!             }
//!         }
//!         self.ticks += 1;
//!         Ok(())
//!     }
//! }
//! ```

use downcast_rs::{Downcast, impl_downcast};
use variadics_please::all_tuples;

use crate::inject::Injectable;

/// Errors that can occur during system execution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SystemError {
    /// The system encountered an error during execution.
    #[error("execution error: {0}")]
    ExecutionError(String),
}

/// A unit of behavior with injectable fields.
///
/// All hooks default to doing nothing, so a system only overrides the
/// phases it participates in. Hooks are called by
/// [`Systems`](crate::systems::Systems) in registration order, except
/// [`destroy`](Self::destroy), which runs in reverse.
pub trait System: Injectable + Downcast + Send {
    /// Returns the system's name for debugging and tracing.
    fn name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }

    /// Called once, after injection, before the first [`run`](Self::run).
    ///
    /// # Errors
    ///
    /// Returns [`SystemError`] if the system cannot start.
    fn init(&mut self) -> Result<(), SystemError> {
        Ok(())
    }

    /// Called once per tick.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError`] if execution fails.
    fn run(&mut self) -> Result<(), SystemError> {
        Ok(())
    }

    /// Called once when the container shuts down.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError`] if teardown fails.
    fn destroy(&mut self) -> Result<(), SystemError> {
        Ok(())
    }
}

impl_downcast!(System);

/// Boxed type-erased system.
pub type BoxedSystem = Box<dyn System>;

/// Types that can be added to a [`Systems`](crate::systems::Systems)
/// container: a single system or a tuple of systems.
pub trait IntoSystems {
    /// Boxes the systems in order.
    fn into_systems(self) -> Vec<BoxedSystem>;
}

impl<S: System> IntoSystems for S {
    fn into_systems(self) -> Vec<BoxedSystem> {
        vec![Box::new(self)]
    }
}

macro_rules! impl_into_systems_for_tuple {
    ($($S:ident),*) => {
        impl<$($S: System),*> IntoSystems for ($($S,)*) {
            #[expect(non_snake_case, reason = "tuple elements are bound by their type names")]
            fn into_systems(self) -> Vec<BoxedSystem> {
                let ($($S,)*) = self;
                vec![$(Box::new($S) as BoxedSystem),*]
            }
        }
    };
}

// Generate implementations for tuples from 2 to 16 elements
all_tuples!(impl_into_systems_for_tuple, 2, 16, S);
