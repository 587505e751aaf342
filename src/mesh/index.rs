//! Index types for mesh elements.
//!
//! Vertices, half-edges and faces live in flat arenas and refer to each other
//! by index only. The wrappers here keep the three index spaces apart at
//! compile time and are generic over the underlying integer type, so small
//! meshes can use `u16` and massive ones `u64`.

use std::fmt::{self, Debug};
use std::hash::Hash;

use crate::error::{Element, MeshError, Result};

/// Trait for types that can be used as mesh indices.
///
/// Implemented for `u16`, `u32` and `u64`. The all-ones value is reserved as
/// the "no element" sentinel used for absent links inside the arenas.
pub trait MeshIndex:
    Copy + Clone + Eq + PartialEq + Ord + PartialOrd + Hash + Debug + Send + Sync + 'static
{
    /// The maximum valid index value.
    const MAX: Self;

    /// A sentinel value representing an invalid/null index.
    const INVALID: Self;

    /// Convert from usize to this index type.
    ///
    /// Values above [`MeshIndex::MAX`] are a caller bug and trip a debug assertion.
    fn from_usize(v: usize) -> Self;

    /// Convert to usize.
    fn to_usize(self) -> usize;

    /// Number of distinct valid indices, saturated at `usize::MAX`.
    fn capacity() -> usize;

    /// Name of the integer type, for error messages.
    fn type_name() -> &'static str;

    /// Check if this is a valid (non-sentinel) index.
    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

macro_rules! impl_mesh_index {
    ($($t:ty),*) => {$(
        impl MeshIndex for $t {
            const MAX: Self = <$t>::MAX - 1;
            const INVALID: Self = <$t>::MAX;

            #[inline]
            fn from_usize(v: usize) -> Self {
                debug_assert!(
                    v as u128 <= <Self as MeshIndex>::MAX as u128,
                    "index {} does not fit in {}",
                    v,
                    stringify!($t)
                );
                v as $t
            }

            #[inline]
            fn to_usize(self) -> usize {
                self as usize
            }

            #[inline]
            fn capacity() -> usize {
                usize::try_from(<Self as MeshIndex>::MAX as u128 + 1).unwrap_or(usize::MAX)
            }

            fn type_name() -> &'static str {
                stringify!($t)
            }
        }
    )*};
}

impl_mesh_index!(u16, u32, u64);

/// Fails unless `count` slots of `element` can all be addressed by `I`.
pub(crate) fn ensure_capacity<I: MeshIndex>(element: Element, count: usize) -> Result<()> {
    if count <= I::capacity() {
        Ok(())
    } else {
        Err(MeshError::CapacityExceeded {
            element,
            count,
            index_type: I::type_name(),
        })
    }
}

/// A type-safe vertex index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId<I: MeshIndex = u32>(I);

/// A type-safe half-edge index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId<I: MeshIndex = u32>(I);

/// A type-safe face index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Create a new index from a raw value.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// Create an invalid/null index.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::INVALID)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// Get the raw value of the underlying type.
            #[inline]
            pub fn raw(self) -> I {
                self.0
            }

            /// Check if this is a valid (non-null) index.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0.is_valid()
            }

            /// `Some(self)` for a valid index, `None` for the sentinel.
            #[inline]
            pub fn valid(self) -> Option<Self> {
                if self.is_valid() {
                    Some(self)
                } else {
                    None
                }
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }

        impl<I: MeshIndex> Default for $name<I> {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl<I: MeshIndex> From<usize> for $name<I> {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(HalfEdgeId, "HE");
impl_index_type!(FaceId, "F");

/// An unordered vertex pair, stored smaller index first.
///
/// This is the key under which an undirected edge is known to the
/// non-manifold and winding-conflict side tables.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VertexPair<I: MeshIndex = u32>(VertexId<I>, VertexId<I>);

impl<I: MeshIndex> VertexPair<I> {
    /// Build the canonical pair for an edge between `a` and `b`.
    #[inline]
    pub fn new(a: VertexId<I>, b: VertexId<I>) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    /// The smaller vertex of the pair.
    #[inline]
    pub fn low(self) -> VertexId<I> {
        self.0
    }

    /// The larger vertex of the pair.
    #[inline]
    pub fn high(self) -> VertexId<I> {
        self.1
    }

    /// Returns `true` if `v` is one of the two endpoints.
    #[inline]
    pub fn contains(self, v: VertexId<I>) -> bool {
        self.0 == v || self.1 == v
    }
}
