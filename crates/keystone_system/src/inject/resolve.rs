//! Field resolvers.
//!
//! Every field is offered to the four resolvers in [`Resolver::ORDER`]. The
//! first resolver that claims the field is the only one that ever sees it.
//!
//! - **World** and **Pool** claim by shape alone. A field declared
//!   `Option<World>` or `Option<Pool<T>>` is claimed even without its tag,
//!   in which case it is left untouched.
//! - **Shared** claims tagged fields only while a shared context exists, and
//!   keeps the claim even when the context's type does not match.
//! - **Custom** claims tagged fields only when custom injects were supplied,
//!   and assigns the first inject whose type matches.

use super::{AccessorCache, Dependency, Field, FieldSlot, FieldTag, WorldLookup};
use crate::world::WorldError;

/// The outcome of offering a field to a resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// The resolver does not handle this field.
    Unclaimed,
    /// The resolver owns the field but wrote nothing.
    Claimed,
    /// The resolver owns the field and wrote a value.
    Assigned,
}

impl Claim {
    /// Returns `true` for [`Claimed`](Self::Claimed) and [`Assigned`](Self::Assigned).
    #[must_use]
    pub fn is_claimed(self) -> bool {
        !matches!(self, Self::Unclaimed)
    }

    fn assigned_if(assigned: bool) -> Self {
        if assigned {
            Self::Assigned
        } else {
            Self::Claimed
        }
    }
}

/// The four injection categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolver {
    /// Fields declared `Option<World>`.
    World,
    /// Fields declared `Option<Pool<T>>`.
    Pool,
    /// `#[shared]` fields.
    Shared,
    /// `#[inject]` fields.
    Custom,
}

impl Resolver {
    /// The order in which resolvers see each field.
    pub const ORDER: [Self; 4] = [Self::World, Self::Pool, Self::Shared, Self::Custom];

    /// Offers `field` to this resolver.
    pub(crate) fn resolve(
        self,
        field: &mut Field<'_>,
        ctx: &mut ResolveContext<'_>,
    ) -> Result<Claim, WorldError> {
        match self {
            Self::World => resolve_world(field, ctx),
            Self::Pool => resolve_pool(field, ctx),
            Self::Shared => Ok(resolve_shared(field, ctx)),
            Self::Custom => Ok(resolve_custom(field, ctx)),
        }
    }
}

/// Everything a resolver may read or populate during one injection pass.
pub(crate) struct ResolveContext<'a> {
    pub(crate) worlds: &'a dyn WorldLookup,
    pub(crate) shared: Option<&'a Dependency>,
    pub(crate) injects: &'a [Dependency],
    pub(crate) cache: &'a mut AccessorCache,
}

fn resolve_world(field: &mut Field<'_>, ctx: &ResolveContext<'_>) -> Result<Claim, WorldError> {
    let tag = field.world_tag();
    let FieldSlot::World(slot) = field.slot_mut() else {
        return Ok(Claim::Unclaimed);
    };
    let Some(name) = tag else {
        return Ok(Claim::Claimed);
    };

    **slot = Some(ctx.worlds.world(name)?);
    Ok(Claim::Assigned)
}

fn resolve_pool(field: &mut Field<'_>, ctx: &mut ResolveContext<'_>) -> Result<Claim, WorldError> {
    let tag = field.pool_tag();
    let FieldSlot::Pool(slot) = field.slot_mut() else {
        return Ok(Claim::Unclaimed);
    };
    let Some(name) = tag else {
        return Ok(Claim::Claimed);
    };

    let world = ctx.worlds.world(name)?;
    let accessor = ctx.cache.accessor(&slot.component());
    Ok(Claim::assigned_if(slot.assign_pool(accessor(&world))))
}

fn resolve_shared(field: &mut Field<'_>, ctx: &ResolveContext<'_>) -> Claim {
    let Some(shared) = ctx.shared else {
        return Claim::Unclaimed;
    };
    if !field.has_tag(FieldTag::Shared) {
        return Claim::Unclaimed;
    }

    Claim::assigned_if(field.slot_mut().assign_from(shared))
}

fn resolve_custom(field: &mut Field<'_>, ctx: &ResolveContext<'_>) -> Claim {
    if ctx.injects.is_empty() || !field.has_tag(FieldTag::Inject) {
        return Claim::Unclaimed;
    }

    let slot = field.slot_mut();
    Claim::assigned_if(ctx.injects.iter().any(|inject| slot.assign_from(inject)))
}
