//! Arena storage with small-integer handles.
//!
//! The handle pattern follows `cranelift_entity`: graphs hand out opaque
//! `u32`-backed newtypes which index into flat arrays.
pub mod arena;
pub mod static_arena;

pub use arena::Arena;
pub use static_arena::StaticArena;

/// An index newtype usable as an arena handle.
pub trait EntityIndex: Copy + Eq + Default {
    /// Creates the index, panicking when `index` exceeds the backing type.
    fn new(index: usize) -> Self {
        Self::try_new(index).expect("index out of range for entity type")
    }

    /// Creates the index if it fits the backing type.
    fn try_new(index: usize) -> Option<Self>;

    /// The index as a plain `usize`.
    fn index(self) -> usize;
}

/// Defines `u32`-backed index newtypes implementing [`EntityIndex`].
#[macro_export]
macro_rules! make_entity {
    ($($(#[$doc:meta])* pub struct $entity:ident(u32);)*) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
                     ::serde::Serialize, ::serde::Deserialize)]
            #[serde(transparent)]
            pub struct $entity(u32);

            impl $crate::memory::EntityIndex for $entity {
                #[inline(always)]
                fn try_new(index: usize) -> Option<Self> {
                    if index <= u32::MAX as usize {
                        Some($entity(index as u32))
                    } else {
                        None
                    }
                }

                #[inline(always)]
                fn index(self) -> usize {
                    self.0 as usize
                }
            }

            impl ::std::fmt::Display for $entity {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )*
    };
}
