//! Slot selection for `#[derive(Injectable)]`.
//!
//! The derive cannot know whether a field's type is this crate's [`World`] or
//! [`Pool<T>`] from its spelling alone, so it asks the compiler instead:
//!
//! ```ignore
//! (&&&SlotSelector::<FieldType, VALUE>::new()).field_slot(&mut self.field)
//! ```
//!
//! Method lookup peels one reference per step, so the first matching trait
//! wins:
//!
//! 1. [`SelectWorld`] / [`SelectPool`] on `&&SlotSelector` for `Option<World>`
//!    and `Option<Pool<T>>`
//! 2. [`SelectValue`] on `&SlotSelector` for `Option<F: Clone + 'static>` when
//!    `VALUE` is `true` (the field is tagged `#[shared]` or `#[inject]`)
//! 3. [`SelectOpaque`] on `SlotSelector` for anything else

use core::any::Any;
use core::marker::PhantomData;

use super::FieldSlot;
use crate::world::{Component, Pool, World};

/// Zero-sized selector for a field of type `F`.
pub struct SlotSelector<F, const VALUE: bool>(PhantomData<fn() -> F>);

impl<F, const VALUE: bool> SlotSelector<F, VALUE> {
    /// Creates the selector.
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<F, const VALUE: bool> Default for SlotSelector<F, VALUE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Selects [`FieldSlot::World`].
pub trait SelectWorld {
    /// Builds the slot for `field`.
    fn field_slot<'a>(&self, field: &'a mut Option<World>) -> FieldSlot<'a>;
}

impl<const VALUE: bool> SelectWorld for &&SlotSelector<Option<World>, VALUE> {
    fn field_slot<'a>(&self, field: &'a mut Option<World>) -> FieldSlot<'a> {
        FieldSlot::world(field)
    }
}

/// Selects [`FieldSlot::Pool`].
pub trait SelectPool {
    /// The field's declared type.
    type Field;

    /// Builds the slot for `field`.
    fn field_slot<'a>(&self, field: &'a mut Self::Field) -> FieldSlot<'a>;
}

impl<T: Component, const VALUE: bool> SelectPool for &&SlotSelector<Option<Pool<T>>, VALUE> {
    type Field = Option<Pool<T>>;

    fn field_slot<'a>(&self, field: &'a mut Option<Pool<T>>) -> FieldSlot<'a> {
        FieldSlot::pool(field)
    }
}

/// Selects [`FieldSlot::Value`].
pub trait SelectValue {
    /// The field's declared type.
    type Field;

    /// Builds the slot for `field`.
    fn field_slot<'a>(&self, field: &'a mut Self::Field) -> FieldSlot<'a>;
}

impl<F: Clone + Any> SelectValue for &SlotSelector<Option<F>, true> {
    type Field = Option<F>;

    fn field_slot<'a>(&self, field: &'a mut Option<F>) -> FieldSlot<'a> {
        FieldSlot::value(field)
    }
}

/// Selects [`FieldSlot::Opaque`].
pub trait SelectOpaque {
    /// The field's declared type.
    type Field;

    /// Builds the slot for `field`.
    fn field_slot<'a>(&self, field: &'a mut Self::Field) -> FieldSlot<'a>;
}

impl<F, const VALUE: bool> SelectOpaque for SlotSelector<F, VALUE> {
    type Field = F;

    fn field_slot<'a>(&self, _field: &'a mut F) -> FieldSlot<'a> {
        FieldSlot::opaque::<F>()
    }
}
