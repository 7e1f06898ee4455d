//! Identifier newtypes.
//!
//! All three identifier kinds are drawn from a single unsigned integer
//! space administered by the identity manager; distinctness across kinds is
//! by usage, not by value. The newtypes exist so that an object identity,
//! a snapshot identity and a frame identity can never be mixed up in an API
//! signature.

use std::fmt;

macro_rules! def_id {
    ($(#[$docs:meta])* $name:ident) => {
        $(#[$docs])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw identifier value.
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// The raw identifier value.
            pub const fn raw(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

def_id!(
    /// Identity shared by all versions of the same conceptual object.
    ObjectId
);

def_id!(
    /// Identity of a single version of an object.
    SnapshotId
);

def_id!(
    /// Identity of a stable frame.
    FrameId
);
