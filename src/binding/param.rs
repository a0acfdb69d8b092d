//! Handler argument contract.

use crate::binding::capability::Capabilities;
use crate::binding::error::BindError;
use crate::binding::source::Source;

/// A type that can appear as a handler argument.
///
/// Implementors declare which capabilities they carry and how to build
/// themselves from the [`Source`] the chosen extractor produced. Serde types
/// normally use the [`param!`](crate::param) macro instead of a manual impl.
pub trait Param: Sized + Send + 'static {
    /// Capabilities this type declares.
    fn capabilities() -> Capabilities;

    /// Build a fresh value from `source`.
    fn decode(source: Source) -> Result<Self, BindError>;

    /// True when the argument is a boxed indirection over the bound type.
    fn indirect() -> bool {
        false
    }

    /// True only for the request context itself.
    ///
    /// Declaring [`Capability::Context`](crate::binding::Capability::Context)
    /// without being the context is rejected at registration.
    fn is_context() -> bool {
        false
    }
}

impl<T: Param> Param for Box<T> {
    fn capabilities() -> Capabilities {
        T::capabilities()
    }

    fn decode(source: Source) -> Result<Self, BindError> {
        T::decode(source).map(Box::new)
    }

    fn indirect() -> bool {
        true
    }

    fn is_context() -> bool {
        T::is_context()
    }
}

/// Static facts about one handler parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub type_name: &'static str,
    pub capabilities: Capabilities,
    pub indirect: bool,
    pub context: bool,
}

impl ParamSpec {
    pub fn of<T: Param>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            capabilities: T::capabilities(),
            indirect: T::indirect(),
            context: T::is_context(),
        }
    }
}

/// Declare the capabilities of a serde type and make it a handler argument.
///
/// ```ignore
/// #[derive(Deserialize)]
/// struct UserPath { id: u64 }
/// dessert::param!(UserPath: PathParam);
/// ```
///
/// Capabilities are `StructuredData`, `PathParam` and `Header`. An empty list,
/// or `Context`, compiles but the type is rejected when a handler using it is
/// registered.
#[macro_export]
macro_rules! param {
    ($ty:ty : $($capability:ident),* $(,)?) => {
        impl $crate::binding::Param for $ty {
            fn capabilities() -> $crate::binding::Capabilities {
                $crate::binding::Capabilities::EMPTY
                    $(.with($crate::binding::Capability::$capability))*
            }

            fn decode(
                source: $crate::binding::Source,
            ) -> ::std::result::Result<Self, $crate::binding::BindError> {
                source.deserialize()
            }
        }
    };
}
