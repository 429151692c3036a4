//! Declarative helpers for wiring host models into the fetcher.

/// Implement [`Member`](crate::Member) for each payload of a model enum.
///
/// Each `Variant => Type` pair requires the model enum `E` to have a tuple
/// variant `E::Variant(Type)` and the kind enum `K` a unit variant
/// `K::Variant`.
///
/// # Examples
///
/// ```rust
/// use weave_fetch::{Entity, Member, members};
///
/// #[derive(Debug, Clone)]
/// struct Actor { id: u32 }
///
/// #[derive(Debug, Clone)]
/// enum Model { Actor(Actor) }
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Kind { Actor }
///
/// impl Entity for Model {
///     type Kind = Kind;
///     type Id = u32;
///     fn kind(&self) -> Kind { Kind::Actor }
/// }
///
/// members!(Model: Kind { Actor => Actor });
///
/// assert_eq!(<Actor as Member<Model>>::KIND, Kind::Actor);
/// ```
#[macro_export]
macro_rules! members {
    ($entity:ident : $kind:ident { $($variant:ident => $member:ty),+ $(,)? }) => {
        $(
            impl $crate::Member<$entity> for $member {
                const KIND: <$entity as $crate::Entity>::Kind = $kind::$variant;

                fn into_entity(self) -> $entity {
                    $entity::$variant(self)
                }

                #[allow(unreachable_patterns)]
                fn from_entity(entity: $entity) -> ::std::result::Result<Self, $entity> {
                    match entity {
                        $entity::$variant(value) => ::std::result::Result::Ok(value),
                        other => ::std::result::Result::Err(other),
                    }
                }

                #[allow(unreachable_patterns)]
                fn as_member(entity: &$entity) -> ::std::option::Option<&Self> {
                    match entity {
                        $entity::$variant(value) => ::std::option::Option::Some(value),
                        _ => ::std::option::Option::None,
                    }
                }
            }
        )+
    };
}
