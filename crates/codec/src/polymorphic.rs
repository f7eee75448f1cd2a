//! Trait objects as field types

/// Make `Box<dyn Trait>` storable as a field or root value
///
/// The trait must have [`Persist`](crate::Persist) as a supertrait, and every
/// implementor that may be stored must be listed. The concrete type is
/// recorded at each reference site, so a field declared as `Box<dyn Shape>`
/// comes back as the same `Circle` or `Square` that was written. Listed
/// types are registered whenever a field or root of the trait-object type
/// is read, so their records stay readable after a restart.
///
/// ```
/// use quire_codec::{polymorphic, Codec, DecodeContext, EncodeContext, Node, Persist, Result};
///
/// trait Shape: Persist {
///     fn area(&self) -> f64;
/// }
///
/// struct Square(f64);
///
/// impl Codec for Square {
///     fn encode(&self, ctx: &mut EncodeContext<'_>) -> Result<Node> {
///         self.0.encode(ctx)
///     }
///     fn decode(node: &Node, ctx: &mut DecodeContext<'_>) -> Result<Self> {
///         f64::decode(node, ctx).map(Square)
///     }
///     fn placeholder() -> Self {
///         Square(0.0)
///     }
/// }
///
/// impl Shape for Square {
///     fn area(&self) -> f64 {
///         self.0 * self.0
///     }
/// }
///
/// polymorphic!(dyn Shape => Square);
/// ```
#[macro_export]
macro_rules! polymorphic {
    (dyn $trait:ident => $first:ty $(, $rest:ty)* $(,)?) => {
        impl $crate::Codec for ::std::boxed::Box<dyn $trait> {
            fn encode(
                &self,
                ctx: &mut $crate::EncodeContext<'_>,
            ) -> $crate::Result<$crate::Node> {
                $crate::encode_tagged($crate::Persist::concrete(&**self), ctx)
            }

            fn decode(
                node: &$crate::Node,
                ctx: &mut $crate::DecodeContext<'_>,
            ) -> $crate::Result<Self> {
                <Self as $crate::Codec>::register_known(ctx.registry())?;
                let value = $crate::decode_tagged(node, ctx)?;
                <Self as $crate::Codec>::from_persist(value).map_err(|value| {
                    $crate::Error::type_mismatch(
                        concat!("dyn ", stringify!($trait)),
                        $crate::Persist::persist_tag(&*value).to_string(),
                    )
                })
            }

            fn placeholder() -> Self {
                ::std::boxed::Box::new(<$first as $crate::Codec>::placeholder())
            }

            fn type_tag() -> $crate::TypeTag {
                $crate::TypeTag::new(concat!("dyn ", stringify!($trait)))
            }

            fn register_known(registry: &$crate::Registry) -> $crate::Result<()> {
                registry.register::<$first>()?;
                $( registry.register::<$rest>()?; )*
                ::std::result::Result::Ok(())
            }

            fn as_dyn(&self) -> ::std::option::Option<&dyn $crate::Persist> {
                ::std::option::Option::Some($crate::Persist::concrete(&**self))
            }

            fn into_dyn(
                self,
            ) -> ::std::result::Result<::std::boxed::Box<dyn $crate::Persist>, Self> {
                ::std::result::Result::Ok($crate::Persist::into_concrete(self))
            }

            fn from_persist(
                value: ::std::boxed::Box<dyn $crate::Persist>,
            ) -> ::std::result::Result<Self, ::std::boxed::Box<dyn $crate::Persist>> {
                let value = match value.downcast::<$first>() {
                    ::std::result::Result::Ok(v) => {
                        return ::std::result::Result::Ok(v as ::std::boxed::Box<dyn $trait>)
                    }
                    ::std::result::Result::Err(value) => value,
                };
                $(
                    let value = match value.downcast::<$rest>() {
                        ::std::result::Result::Ok(v) => {
                            return ::std::result::Result::Ok(v as ::std::boxed::Box<dyn $trait>)
                        }
                        ::std::result::Result::Err(value) => value,
                    };
                )*
                ::std::result::Result::Err(value)
            }
        }
    };
}
