//! Identifiers that address an edge.
//!
//! Each identifier is a thin newtype over the integer width the key layout
//! reserves for it. Keeping them distinct types prevents a ranking from being
//! passed where a destination vertex is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! int_id {
    ($(#[$meta:meta])* $name:ident, $inner:ty, $getter:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
        )]
        pub struct $name($inner);

        impl $name {
            #[doc = concat!("Create a new `", stringify!($name), "` from its raw value.")]
            #[inline]
            #[must_use]
            pub const fn new(raw: $inner) -> Self {
                Self(raw)
            }

            /// Get the raw value.
            #[inline]
            #[must_use]
            pub const fn $getter(self) -> $inner {
                self.0
            }
        }

        impl From<$inner> for $name {
            #[inline]
            fn from(raw: $inner) -> Self {
                Self::new(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

int_id!(
    /// Identifier of a graph space (the namespace a schema belongs to).
    SpaceId,
    u32,
    as_u32
);

int_id!(
    /// Identifier of a partition, the unit of write dispatch and failure reporting.
    PartitionId,
    u32,
    as_u32
);

int_id!(
    /// Identifier of a vertex. Used for both the source and destination of an edge.
    VertexId,
    i64,
    as_i64
);

int_id!(
    /// Schema-defined edge type.
    EdgeType,
    i32,
    as_i32
);

int_id!(
    /// Ranking that distinguishes parallel edges between the same pair of vertices.
    Ranking,
    i64,
    as_i64
);

/// Version of a stored edge record.
///
/// Larger versions are newer. The key codec stores the bitwise complement,
/// so an ascending byte scan visits the newest version first.
///
/// `Version::ZERO` is reserved as the exclusive end of a version range and is
/// never stored. Single-slot edge types always write at [`Version::SINGLE_SLOT`];
/// versioned edge types are assigned versions above it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Version(u64);

impl Version {
    /// Reserved sentinel that sorts after every stored version.
    pub const ZERO: Self = Self(0);

    /// Fixed version used by every write to a single-slot edge type.
    pub const SINGLE_SLOT: Self = Self(1);

    /// The newest representable version.
    pub const MAX: Self = Self(u64::MAX);

    /// Create a new `Version` from a raw u64 value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw u64 value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Whether this version may appear in a stored key.
    #[inline]
    #[must_use]
    pub const fn is_storable(self) -> bool {
        self.0 != Self::ZERO.0
    }
}

impl From<u64> for Version {
    #[inline]
    fn from(raw: u64) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}
