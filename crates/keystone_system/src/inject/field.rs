//! Field descriptors.
//!
//! A system exposes its fields to the injector through [`Injectable`]. Each
//! field is described by a [`Field`]: its name, its tags and a [`FieldSlot`]
//! that both carries the field's shape and gives write access to it.
//!
//! Implementations are normally generated by `#[derive(Injectable)]`, which
//! lets the compiler pick the slot from the field's resolved type:
//!
//! | Declared type | Slot |
//! |---------------|------|
//! | `Option<World>` | [`FieldSlot::World`] |
//! | `Option<Pool<T>>` | [`FieldSlot::Pool`] |
//! | `Option<F>` tagged `#[shared]` / `#[inject]` | [`FieldSlot::Value`] |
//! | anything else | [`FieldSlot::Opaque`] |

use core::any::Any;

use super::{ComponentType, Dependency, FieldTag, InjectError};
use crate::world::{Component, Pool, World};

/// A type whose fields can be populated by the injector.
///
/// Usually derived:
///
/// ```
/// use keystone_system::Injectable;
/// use keystone_system::world::{Pool, World};
///
/// struct Position { x: f32 }
///
/// #[derive(Injectable)]
/// struct Movement {
///     #[world]
///     world: Option<World>,
///     #[pool("physics")]
///     positions: Option<Pool<Position>>,
///     speed: f32,
/// }
/// ```
pub trait Injectable {
    /// Visits every field in declaration order.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by the visitor.
    fn visit_fields(&mut self, visitor: &mut dyn FieldVisitor) -> Result<(), InjectError>;
}

/// Receives the fields of an [`Injectable`].
pub trait FieldVisitor {
    /// Called once per field.
    ///
    /// # Errors
    ///
    /// Returning an error stops the walk over the remaining fields.
    fn visit_field(&mut self, field: Field<'_>) -> Result<(), InjectError>;
}

/// A single field of a system, with write access to its value.
pub struct Field<'a> {
    name: &'static str,
    tags: &'static [FieldTag],
    slot: FieldSlot<'a>,
}

impl<'a> Field<'a> {
    /// Creates a field descriptor.
    #[must_use]
    pub fn new(name: &'static str, tags: &'static [FieldTag], slot: FieldSlot<'a>) -> Self {
        Self { name, tags, slot }
    }

    /// Returns the field name (the index for tuple fields).
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the tags attached to the field.
    #[must_use]
    pub fn tags(&self) -> &'static [FieldTag] {
        self.tags
    }

    /// Returns `true` if the field carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: FieldTag) -> bool {
        self.tags.contains(&tag)
    }

    /// Returns the world name of the field's `World` tag, if any.
    #[must_use]
    pub fn world_tag(&self) -> Option<&'static str> {
        self.tags.iter().find_map(|tag| match tag {
            FieldTag::World(name) => Some(*name),
            _ => None,
        })
    }

    /// Returns the world name of the field's `Pool` tag, if any.
    #[must_use]
    pub fn pool_tag(&self) -> Option<&'static str> {
        self.tags.iter().find_map(|tag| match tag {
            FieldTag::Pool(name) => Some(*name),
            _ => None,
        })
    }

    /// Returns the field's slot.
    #[must_use]
    pub fn slot(&self) -> &FieldSlot<'a> {
        &self.slot
    }

    /// Returns the field's slot for writing.
    pub fn slot_mut(&mut self) -> &mut FieldSlot<'a> {
        &mut self.slot
    }
}

/// The shape of a field together with write access to it.
pub enum FieldSlot<'a> {
    /// A field declared as `Option<World>`.
    World(&'a mut Option<World>),
    /// A field declared as `Option<Pool<T>>`.
    Pool(&'a mut dyn PoolSlot),
    /// Any other `Option<F>` field that can receive a [`Dependency`].
    Value(&'a mut dyn ValueSlot),
    /// A field the injector can never write; carries the declared type name.
    Opaque(&'static str),
}

impl<'a> FieldSlot<'a> {
    /// Slot for a world field.
    pub fn world(slot: &'a mut Option<World>) -> Self {
        Self::World(slot)
    }

    /// Slot for a pool field.
    pub fn pool<T: Component>(slot: &'a mut Option<Pool<T>>) -> Self {
        Self::Pool(slot)
    }

    /// Slot for a field receiving shared or custom values.
    pub fn value<F: Clone + Any>(slot: &'a mut Option<F>) -> Self {
        Self::Value(slot)
    }

    /// Slot for a field of type `F` that is never written.
    #[must_use]
    pub fn opaque<F: ?Sized>() -> Self {
        Self::Opaque(core::any::type_name::<F>())
    }

    /// Returns the declared type of the slot's value.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::World(_) => core::any::type_name::<World>(),
            Self::Pool(slot) => slot.type_name(),
            Self::Value(slot) => slot.type_name(),
            Self::Opaque(type_name) => type_name,
        }
    }

    /// Returns `true` if the slot currently holds a value.
    ///
    /// Opaque slots always report `false`.
    #[must_use]
    pub fn is_set(&self) -> bool {
        match self {
            Self::World(slot) => slot.is_some(),
            Self::Pool(slot) => slot.is_set(),
            Self::Value(slot) => slot.is_set(),
            Self::Opaque(_) => false,
        }
    }

    /// Assigns the dependency's value if its type matches the slot exactly.
    ///
    /// Returns `true` if the slot was written.
    pub fn assign_from(&mut self, dependency: &Dependency) -> bool {
        match self {
            Self::World(slot) => match dependency.get::<World>() {
                Some(world) => {
                    **slot = Some(world);
                    true
                }
                None => false,
            },
            Self::Pool(slot) => slot.assign_from(dependency),
            Self::Value(slot) => slot.assign_from(dependency),
            Self::Opaque(_) => false,
        }
    }
}

/// An `Option<F>` field that can be written from a [`Dependency`].
pub trait ValueSlot {
    /// Returns the type name of `F`.
    fn type_name(&self) -> &'static str;

    /// Returns `true` if the field holds a value.
    fn is_set(&self) -> bool;

    /// Writes the dependency's value into the field if it is an `F`.
    ///
    /// Returns `true` if the field was written.
    fn assign_from(&mut self, dependency: &Dependency) -> bool;
}

impl<F: Clone + Any> ValueSlot for Option<F> {
    fn type_name(&self) -> &'static str {
        core::any::type_name::<F>()
    }

    fn is_set(&self) -> bool {
        self.is_some()
    }

    fn assign_from(&mut self, dependency: &Dependency) -> bool {
        match dependency.get::<F>() {
            Some(value) => {
                *self = Some(value);
                true
            }
            None => false,
        }
    }
}

/// An `Option<Pool<T>>` field.
pub trait PoolSlot: ValueSlot {
    /// Returns the component type `T`.
    fn component(&self) -> ComponentType;

    /// Writes a type-erased pool into the field if it is a `Pool<T>`.
    ///
    /// Returns `true` if the field was written.
    fn assign_pool(&mut self, pool: Box<dyn Any + Send + Sync>) -> bool;
}

impl<T: Component> PoolSlot for Option<Pool<T>> {
    fn component(&self) -> ComponentType {
        ComponentType::of::<T>()
    }

    fn assign_pool(&mut self, pool: Box<dyn Any + Send + Sync>) -> bool {
        match pool.downcast::<Pool<T>>() {
            Ok(pool) => {
                *self = Some(*pool);
                true
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    struct Position;

    #[derive(Debug, PartialEq)]
    struct Config {
        name: &'static str,
    }

    #[test]
    fn tag_lookup() {
        const TAGS: &[FieldTag] = &[FieldTag::Shared, FieldTag::Pool("events")];
        let mut value: Option<u32> = None;
        let field = Field::new("value", TAGS, FieldSlot::value(&mut value));

        assert!(field.has_tag(FieldTag::Shared));
        assert!(!field.has_tag(FieldTag::Inject));
        assert_eq!(field.pool_tag(), Some("events"));
        assert_eq!(field.world_tag(), None);
        assert_eq!(field.name(), "value");
    }

    #[test]
    fn value_slot_assigns_exact_type() {
        let mut config: Option<Arc<Config>> = None;
        let dependency = Dependency::new(Arc::new(Config { name: "main" }));

        assert!(FieldSlot::value(&mut config).assign_from(&dependency));
        assert_eq!(config.unwrap().name, "main");
    }

    #[test]
    fn value_slot_rejects_other_types() {
        let mut config: Option<Arc<Config>> = None;
        let dependency = Dependency::new(Config { name: "unboxed" });

        assert!(!FieldSlot::value(&mut config).assign_from(&dependency));
        assert!(config.is_none());
    }

    #[test]
    fn pool_slot_reports_component_and_assigns() {
        let world = World::new();
        let mut positions: Option<Pool<Position>> = None;

        {
            let slot: &mut dyn PoolSlot = &mut positions;
            assert_eq!(slot.component(), ComponentType::of::<Position>());
            assert!(!slot.assign_pool(Box::new(world.pool::<u8>())));
            assert!(slot.assign_pool(Box::new(world.pool::<Position>())));
        }

        assert!(positions.unwrap().ptr_eq(&world.pool::<Position>()));
    }

    #[test]
    fn world_slot_accepts_world_dependency() {
        let world = World::new();
        let mut slot_value: Option<World> = None;

        let mut slot = FieldSlot::world(&mut slot_value);
        assert!(!slot.is_set());
        assert!(slot.assign_from(&Dependency::new(world.clone())));
        assert!(slot.is_set());

        assert!(slot_value.unwrap().ptr_eq(&world));
    }

    #[test]
    fn opaque_slot_is_never_written() {
        let mut slot = FieldSlot::opaque::<f32>();

        assert!(!slot.assign_from(&Dependency::new(1.0_f32)));
        assert_eq!(slot.type_name(), "f32");
        assert!(!slot.is_set());
    }
}
