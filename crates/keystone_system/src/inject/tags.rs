//! Field tags.
//!
//! Tags are attached to system fields by `#[derive(Injectable)]` and carry no
//! behavior of their own. The resolvers read them to decide whether a claimed
//! field receives a value.

use core::fmt;

/// The name of the default world.
pub const DEFAULT_WORLD: &str = "";

/// A marker attached to a system field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldTag {
    /// Receive the shared context object (`#[shared]`).
    Shared,
    /// Receive the first custom inject whose type matches (`#[inject]`).
    Inject,
    /// Receive the named world (`#[world]` / `#[world("name")]`).
    World(&'static str),
    /// Receive the pool from the named world (`#[pool]` / `#[pool("name")]`).
    Pool(&'static str),
}

impl FieldTag {
    /// A `World` tag for the default world.
    pub const DEFAULT_WORLD: Self = Self::World(DEFAULT_WORLD);

    /// A `Pool` tag for the default world.
    pub const DEFAULT_POOL: Self = Self::Pool(DEFAULT_WORLD);

    /// Returns the world name carried by a `World` or `Pool` tag.
    #[must_use]
    pub fn world_name(self) -> Option<&'static str> {
        match self {
            Self::World(name) | Self::Pool(name) => Some(name),
            Self::Shared | Self::Inject => None,
        }
    }
}

impl fmt::Display for FieldTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shared => f.write_str("#[shared]"),
            Self::Inject => f.write_str("#[inject]"),
            Self::World(DEFAULT_WORLD) => f.write_str("#[world]"),
            Self::World(name) => write!(f, "#[world({name:?})]"),
            Self::Pool(DEFAULT_WORLD) => f.write_str("#[pool]"),
            Self::Pool(name) => write!(f, "#[pool({name:?})]"),
        }
    }
}
