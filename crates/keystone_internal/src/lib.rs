//! # Keystone Internal Library
//!
//! Re-exports the core Keystone crates for convenience.

/// Worlds, systems and declarative field injection.
pub use keystone_system;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use keystone_system::prelude::*;
}
