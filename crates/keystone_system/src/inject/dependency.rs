//! Injectable values.
//!
//! A [`Dependency`] wraps an arbitrary value handed to the injector, either
//! as the shared context or as a custom inject. Rust has no subtyping, so a
//! field accepts a dependency only when the field's inner type is exactly the
//! type of the wrapped value, or of one of its views.
//!
//! Views let one object be injected under several types, typically a
//! concrete `Arc<T>` and the trait object it implements:
//!
//! ```
//! use std::sync::Arc;
//! use keystone_system::inject::Dependency;
//!
//! trait Log: Send + Sync {}
//! struct Console;
//! impl Log for Console {}
//!
//! let console = Arc::new(Console);
//! let dependency = Dependency::new(Arc::clone(&console))
//!     .with_view(console as Arc<dyn Log>);
//!
//! assert!(dependency.get::<Arc<Console>>().is_some());
//! assert!(dependency.get::<Arc<dyn Log>>().is_some());
//! ```

use core::any::Any;
use core::fmt;
use std::sync::Arc;

use variadics_please::all_tuples;

type BoxedValue = Box<dyn Any + Send + Sync>;

/// A value offered to system fields by the injector.
pub struct Dependency {
    type_name: &'static str,
    value: BoxedValue,
    views: Vec<BoxedValue>,
}

impl Dependency {
    /// Wraps a value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: core::any::type_name::<T>(),
            value: Box::new(value),
            views: Vec::new(),
        }
    }

    /// Adds another type under which this dependency can be injected.
    ///
    /// Views are tried after the wrapped value, in insertion order.
    #[must_use]
    pub fn with_view<V: Any + Send + Sync>(mut self, view: V) -> Self {
        self.views.push(Box::new(view));
        self
    }

    /// Returns the type name of the wrapped value.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the value or one of its views is an `F`.
    #[must_use]
    pub fn is<F: Any>(&self) -> bool {
        self.downcast_ref::<F>().is_some()
    }

    /// Borrows the value, or the first view, that is an `F`.
    #[must_use]
    pub fn downcast_ref<F: Any>(&self) -> Option<&F> {
        core::iter::once(&self.value)
            .chain(&self.views)
            .find_map(|value| value.downcast_ref::<F>())
    }

    /// Clones out the value, or the first view, that is an `F`.
    #[must_use]
    pub fn get<F: Any + Clone>(&self) -> Option<F> {
        self.downcast_ref::<F>().cloned()
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency")
            .field("type_name", &self.type_name)
            .field("views", &self.views.len())
            .finish()
    }
}

/// Converts a value into a [`Dependency`].
pub trait IntoDependency {
    /// Performs the conversion.
    fn into_dependency(self) -> Dependency;
}

impl IntoDependency for Dependency {
    fn into_dependency(self) -> Dependency {
        self
    }
}

/// Any `Arc`, including trait objects such as `Arc<dyn Log>`.
impl<T: ?Sized + Send + Sync + 'static> IntoDependency for Arc<T> {
    fn into_dependency(self) -> Dependency {
        Dependency::new(self)
    }
}

/// The ordered sequence of custom injects for one injection pass.
///
/// Implemented for:
/// - `()` - no custom injects
/// - `Option<I>` - `None` is treated as empty
/// - `Vec<Dependency>`
/// - any single [`IntoDependency`] value
/// - tuples of [`IntoDependency`] values, up to 12
pub trait Injects {
    /// Returns the dependencies in order.
    fn into_dependencies(self) -> Vec<Dependency>;
}

impl Injects for () {
    fn into_dependencies(self) -> Vec<Dependency> {
        Vec::new()
    }
}

impl Injects for Vec<Dependency> {
    fn into_dependencies(self) -> Vec<Dependency> {
        self
    }
}

impl<I: Injects> Injects for Option<I> {
    fn into_dependencies(self) -> Vec<Dependency> {
        self.map(Injects::into_dependencies).unwrap_or_default()
    }
}

impl<D: IntoDependency> Injects for D {
    fn into_dependencies(self) -> Vec<Dependency> {
        vec![self.into_dependency()]
    }
}

macro_rules! impl_injects_tuple {
    ($($D:ident),*) => {
        impl<$($D: IntoDependency),*> Injects for ($($D,)*) {
            #[expect(non_snake_case, reason = "tuple elements are bound by their type names")]
            fn into_dependencies(self) -> Vec<Dependency> {
                let ($($D,)*) = self;
                vec![$($D.into_dependency()),*]
            }
        }
    };
}

// Generate impls for tuples of size 1 to 12
all_tuples!(impl_injects_tuple, 1, 12, D);
