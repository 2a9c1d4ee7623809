//! Stable entity identifiers.
//!
//! Ids are assigned from monotonic per-kind counters and are never reused
//! within the lifetime of a [`BRepMesh`](crate::BRepMesh), so a stale id is
//! detected by its absence from the store rather than by collision.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub u32);

        impl $name {
            /// Raw id value.
            #[inline]
            #[must_use]
            pub const fn get(self) -> u32 {
                self.0
            }

            /// Arena slot for this id.
            #[inline]
            #[must_use]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`Vertex`](crate::Vertex).
    VertexId,
    "v"
);

entity_id!(
    /// Identifier of an [`Edge`](crate::Edge).
    EdgeId,
    "e"
);

entity_id!(
    /// Identifier of a [`Face`](crate::Face).
    FaceId,
    "f"
);

/// Unordered vertex pair used to look edges up.
///
/// The smaller id always comes first.
#[inline]
#[must_use]
pub fn edge_key(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a < b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_kind_prefix() {
        assert_eq!(VertexId(3).to_string(), "v3");
        assert_eq!(EdgeId(0).to_string(), "e0");
        assert_eq!(FaceId(12).to_string(), "f12");
    }

    #[test]
    fn edge_key_is_order_independent() {
        assert_eq!(
            edge_key(VertexId(5), VertexId(2)),
            edge_key(VertexId(2), VertexId(5))
        );
        assert_eq!(edge_key(VertexId(5), VertexId(2)).0, VertexId(2));
    }
}
