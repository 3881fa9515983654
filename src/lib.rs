//! Declarative field injection for systems running inside an ECS runtime.
//!

pub use keystone_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use keystone_internal::prelude::*;
}
