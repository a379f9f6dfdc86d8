//! Strongly typed, zero-cost identifier wrappers.
//!
//! Arena ids (`CellId`, `VehicleId`, `LaneId`) are dense `u32` indices into
//! the graph and simulation tables, so `id.index()` is a direct `Vec` index.
//! Map ids (`RawNodeId`, `WayId`) are the signed 64-bit identifiers of the
//! source map data and are never used as indices.

use std::fmt;

/// Generate a typed arena index around a `u32`.
macro_rules! arena_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub u32);

        impl $name {
            /// Sentinel meaning "no valid ID" (`u32::MAX`).
            pub const INVALID: $name = $name(u32::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                u32::try_from(n).map($name)
            }
        }
    };
}

/// Generate an opaque identifier for source-map entities.
macro_rules! map_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

arena_id! {
    /// Index of a road cell in the `CellGraph` arena.
    pub struct CellId;
}

arena_id! {
    /// Vehicle identifier.  Allocated sequentially and never reused in a run.
    pub struct VehicleId;
}

arena_id! {
    /// Index of a lane in the `CellGraph` lane table.
    pub struct LaneId;
}

map_id! {
    /// Identifier of a raw map node (an OSM node id, typically).
    pub struct RawNodeId;
}

map_id! {
    /// Identifier of a raw map way.
    pub struct WayId;
}
